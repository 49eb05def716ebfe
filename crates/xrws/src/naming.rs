//! Derive the extraction directory from the name of a downloaded archive.
//!
//! Steam Workshop downloads are named `extensions_<name>_v<version>.dat`, the extension
//! is unpacked into a directory called `<name>`.

use tracing::debug;

use crate::error::NamingError;

/// Prefix every downloaded archive name starts with
pub const NAME_PREFIX: &str = "extensions_";

/// Extension every downloaded archive name ends with
pub const NAME_EXTENSION: &str = ".dat";

/// Start of the version suffix, the last `_` of the name must be followed by `v`
const VERSION_MARKER: char = 'v';

/// Get the name of the directory an archive should be extracted into
///
/// Any leading directories of `archive_path` are ignored, `/` takes priority over `\`.
///
/// A name with nothing between the prefix and the version suffix, such as
/// `extensions__v3.dat`, is rejected with [`NamingError::EmptyName`] so that files are never
/// unpacked straight into the output directory.
///
/// ```
/// assert_eq!(xrws::output_dir_name("downloads/extensions_myMod_v3.dat"), Ok("myMod"));
/// assert!(xrws::output_dir_name("mod_v1.dat").is_err());
/// ```
pub fn output_dir_name(archive_path: &str) -> Result<&str, NamingError> {
    let file_name = archive_path
        .rsplit_once('/')
        .or_else(|| archive_path.rsplit_once('\\'))
        .map_or(archive_path, |(_, name)| name);

    let name = file_name
        .strip_prefix(NAME_PREFIX)
        .ok_or_else(|| NamingError::MissingPrefix(file_name.to_owned()))?;

    let name = name
        .strip_suffix(NAME_EXTENSION)
        .ok_or_else(|| NamingError::MissingExtension(file_name.to_owned()))?;

    let (name, version) = name
        .rsplit_once('_')
        .filter(|(_, version)| version.starts_with(VERSION_MARKER))
        .ok_or_else(|| NamingError::MissingVersion(file_name.to_owned()))?;

    if name.is_empty() {
        return Err(NamingError::EmptyName(file_name.to_owned()));
    }

    debug!(name, version, "resolved output directory");
    Ok(name)
}
