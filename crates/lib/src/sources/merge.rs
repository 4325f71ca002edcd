//! Order-stable merge of overlapping file listings.

use std::collections::HashSet;

/// One input to [`merge_listings`]: a single path or a nested sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing {
  Path(String),
  Nested(Vec<Listing>),
}

impl Listing {
  fn flatten_into<'a>(&'a self, out: &mut Vec<&'a str>) {
    match self {
      Listing::Path(p) => out.push(p),
      Listing::Nested(items) => {
        for item in items {
          item.flatten_into(out);
        }
      }
    }
  }
}

impl From<&str> for Listing {
  fn from(value: &str) -> Self {
    Listing::Path(value.to_string())
  }
}

impl From<String> for Listing {
  fn from(value: String) -> Self {
    Listing::Path(value)
  }
}

impl<T: Into<Listing>> From<Vec<T>> for Listing {
  fn from(value: Vec<T>) -> Self {
    Listing::Nested(value.into_iter().map(Into::into).collect())
  }
}

/// Merge listings into the canonical file set.
///
/// Nested sequences are flattened, every entry is trimmed, and each distinct
/// entry is kept once at the position of its first occurrence. Blank entries
/// are not dropped; they deduplicate like any other string.
pub fn merge_listings<I>(listings: I) -> Vec<String>
where
  I: IntoIterator,
  I::Item: Into<Listing>,
{
  let listings: Vec<Listing> = listings.into_iter().map(Into::into).collect();

  let mut flat = Vec::new();
  for listing in &listings {
    listing.flatten_into(&mut flat);
  }

  let mut seen: HashSet<&str> = HashSet::with_capacity(flat.len());
  let mut merged = Vec::new();
  for entry in flat {
    let entry = entry.trim();
    if seen.insert(entry) {
      merged.push(entry.to_string());
    }
  }
  merged
}
