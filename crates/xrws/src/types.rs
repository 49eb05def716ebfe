//! Base types for structure of XRWS file.

use binrw::{BinRead, BinWrite};

/// Size of [`XrwsHeader`] on disk, magic included
pub const HEADER_SIZE: u64 = 20;

/// Size of a single size table entry on disk
pub const SIZE_ENTRY_SIZE: u64 = 4;

/// XRWS file header
///
/// Defines the header of the XRWS file which always starts with "XRWS".
/// All data is stored in big endian format
#[derive(BinRead, BinWrite, Debug, Copy, Clone, PartialEq)]
#[brw(magic = b"XRWS", big)]
pub struct XrwsHeader {
    /// The version of the format, see [`crate::XRWS_VERSION`]
    pub version: u32,

    /// The number of entries stored in the file
    pub entries: u32,

    /// The size of the block of null terminated file names
    pub names_length: u32,

    /// The size of all entry data plus the trailing metadata document
    pub payload_length: u32,
}

impl Default for XrwsHeader {
    fn default() -> Self {
        Self {
            version: crate::XRWS_VERSION,
            entries: Default::default(),
            names_length: Default::default(),
            payload_length: Default::default(),
        }
    }
}

impl XrwsHeader {
    /// Offset from the start of the file where the payload begins
    pub fn payload_start(&self) -> u64 {
        HEADER_SIZE + self.entries as u64 * SIZE_ENTRY_SIZE + self.names_length as u64
    }

    /// Size of the whole archive as declared by this header
    pub fn expected_length(&self) -> u64 {
        self.payload_start() + self.payload_length as u64
    }
}
