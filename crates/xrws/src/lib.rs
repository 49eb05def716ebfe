//! This library handles reading and unpacking **XRWS** files downloaded from the *X Rebirth* Steam Workshop.
//!
//! # XRWS Archive Format Documentation
//!
//! This crate provides utilities to read and extract data from the **XRWS** archive format used to
//! package *X Rebirth* Steam Workshop content. An XRWS file bundles the files of a single extension
//! together with its `content.xml` description. Downloaded XRWS files are named
//! `extensions_<name>_v<version>.dat`.
//!
//! ## File Structure
//!
//! An XRWS file consists of a header, followed by a size table, a name block and the payload.
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Magic number           | 4 bytes: 0x58525753 ("XRWS")                               |
//! | 0x0004         | Version                | 4 bytes: Fixed value 0x00000001                            |
//! | 0x0008         | Entry Count            | 4 bytes: Number of entries in the archive                  |
//! | 0x000C         | Name Block Size        | 4 bytes: Size of the name block                            |
//! | 0x0010         | Payload Size           | 4 bytes: Size of the payload                               |
//!
//! ### Header
//!
//! - **Magic Number**: A 4-byte identifier set to `0x58525753`, which is the ASCII code for "XRWS".
//! - **Version**: A 4-byte unsigned integer representing the version of the XRWS format. Only version
//!   `1` is known.
//! - **Entry Count**: A 4-byte unsigned integer indicating the number of entries in the archive.
//! - **Name Block Size**: A 4-byte unsigned integer specifying the size of the name block in bytes.
//! - **Payload Size**: A 4-byte unsigned integer specifying the size of the payload, including the
//!   trailing `content.xml` document.
//!
//! ### Size Table
//!
//! Directly after the header, one 4-byte unsigned integer per entry holds the size of the entry's data.
//!
//! ### Name Block
//!
//! The name block stores the file name of each entry, in the same order as the size table. The names
//! are stored back to back, each ending with a null terminator, with no padding.
//!
//! ### Payload
//!
//! The data of every entry, in table order and without any separators. Whatever follows the last
//! entry is the `content.xml` document of the extension.
//!
//! ## Additional Information
//!
//! - **File Extension**: `.dat`
//! - **Endianness**: Big-endian for all multi-byte integers
//! - **Compression**: None
//!

pub mod error;
pub mod extract;
pub mod naming;
pub mod read;
pub mod types;

pub use extract::{ExtractOptions, ExtractSummary};
pub use naming::output_dir_name;
pub use read::XrwsArchive;
pub use types::XrwsHeader;

/// The only supported version of the XRWS format
pub const XRWS_VERSION: u32 = 1;

/// The name of the file the trailing metadata document is written to
pub const METADATA_FILE_NAME: &str = "content.xml";
