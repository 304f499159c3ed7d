//! Shared constants.

/// Default build file name, resolved relative to the working directory.
pub const BUILD_FILE_NAME: &str = "build.ninja";
