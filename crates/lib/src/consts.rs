//! Shared constants.

/// Application name, used for the default work directory and log targets.
pub const APP_NAME: &str = "dbrecipe";

/// Default recipe file looked up next to a checkout.
pub const RECIPE_FILE: &str = "recipe.lua";

/// Name of the digest manifest written into export and package directories.
pub const MANIFEST_FILE: &str = "dbrecipe-manifest.txt";

/// Environment variable overriding the `git` executable.
pub const GIT_ENV: &str = "DBRECIPE_GIT";

/// Environment variable overriding the `cmake` executable.
pub const CMAKE_ENV: &str = "DBRECIPE_CMAKE";

/// Fixed timestamp handed to build tools (1980-01-01T00:00:00Z, the ZIP epoch).
pub const SOURCE_DATE_EPOCH: &str = "315532800";

/// Value written for every enabled feature definition.
pub const DEFINITION_ON: &str = "ON";

/// Value written for a disabled toolchain switch.
pub const DEFINITION_OFF: &str = "OFF";
