//! Error types that can be emitted from this library

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent warpper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// Transparent warpper for [`binrw::Error`]
    #[error(transparent)]
    BinRWError(#[from] binrw::Error),

    /// file is not a xrws archive
    #[error("file is not a xrws archive")]
    InvalidArchive,

    /// archive has unsupported xrws version {0}
    #[error("archive has unsupported xrws version {0}")]
    UnsupportedVersion(u32),

    /// name block holds {found} of {expected} names
    #[error("name block holds {found} of {expected} names")]
    InvalidNameTable {
        /// Number of entries declared by the header
        expected: u32,
        /// Number of null terminated names found in the block
        found: u32,
    },

    /// entry name {0} is not valid utf-8
    #[error("entry name {0} is not valid utf-8")]
    InvalidEntryName(String),

    /// Transparent wrapper for [`NamingError`]
    #[error(transparent)]
    #[diagnostic(transparent)]
    InvalidName(#[from] NamingError),

    /// read {actual} bytes but the header declares {expected}
    #[error("read {actual} bytes but the header declares {expected}")]
    #[diagnostic(help("the archive is probably corrupted, extracted files may be incomplete"))]
    SizeMismatch {
        /// Archive size computed from the header
        expected: u64,
        /// Bytes actually consumed from the archive
        actual: u64,
    },
}

/// Error type to provide further information when the output directory cannot be derived
/// from the archive file name
#[derive(Error, Diagnostic, Debug, PartialEq)]
pub enum NamingError {
    /// {0} does not start with "extensions_"
    #[error("{0} does not start with \"extensions_\"")]
    #[diagnostic(help("do not rename files downloaded from the Steam Workshop"))]
    MissingPrefix(String),

    /// {0} does not end with ".dat"
    #[error("{0} does not end with \".dat\"")]
    MissingExtension(String),

    /// {0} has no version suffix
    #[error("{0} has no version suffix")]
    #[diagnostic(help("do not rename files downloaded from the Steam Workshop"))]
    MissingVersion(String),

    /// {0} has an empty extension name
    #[error("{0} has an empty extension name")]
    EmptyName(String),
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
