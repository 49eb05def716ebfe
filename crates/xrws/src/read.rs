//! Types for reading XRWS archives
//!

use binrw::BinRead;
use byteorder::{BigEndian, ReadBytesExt};
use std::{
    borrow::Cow,
    fmt::{self, Debug},
    io::{self, Read, Seek, SeekFrom},
};
use tracing::{debug, instrument, warn};

use crate::{
    error::{Error, Result},
    types::XrwsHeader,
    METADATA_FILE_NAME, XRWS_VERSION,
};

/// A struct for reading an entry from a XRWS file
pub struct XrwsFile<'a, R: Read + Seek> {
    data: Cow<'a, XrwsFileData>,
    reader: io::Take<&'a mut R>,
}

impl<'a, R: Read + Seek> Debug for XrwsFile<'a, R> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "XrwsFile({:#?})", self.get_metadata())
    }
}

/// Methods for retrieving information on XRWS file entries
impl<'a, R: Read + Seek> XrwsFile<'a, R> {
    /// Get the name of the file
    ///
    /// # Warnings
    ///
    /// The name is taken from the archive as is. It may contain an absolute path
    /// (`/etc/shadow`), or break out of the current directory (`../runtime`).
    ///
    pub fn name(&self) -> &str {
        &self.get_metadata().file_name
    }

    /// Get the name of the file, in the raw (internal) byte representation.
    ///
    /// The encoding of this data is currently undefined.
    pub fn name_raw(&self) -> &[u8] {
        &self.get_metadata().file_name_raw
    }

    /// Get the size of the file, in bytes, as declared by the archive
    ///
    /// For the metadata document this is what remains of the declared payload, the reader
    /// itself continues until the end of the archive.
    pub fn size(&self) -> u64 {
        self.get_metadata().size
    }

    /// Get the starting offset of the data of the file
    pub fn data_start(&self) -> u64 {
        self.get_metadata().data_start
    }

    /// Whether this is the trailing metadata document rather than a listed entry
    pub fn is_metadata(&self) -> bool {
        self.get_metadata().is_metadata
    }

    fn get_metadata(&self) -> &XrwsFileData {
        self.data.as_ref()
    }
}

impl<R: Read + Seek> Read for XrwsFile<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}

/// Structure representing a XRWS file entry.
#[derive(Debug, Clone, Default)]
pub struct XrwsFileData {
    /// Size of the file
    pub size: u64,
    /// Name of the file
    pub file_name: Box<str>,
    /// Raw file name. To be used when file_name was incorrectly decoded.
    pub file_name_raw: Box<[u8]>,
    /// Specifies where the data of the file starts
    pub data_start: u64,
    /// Set for the trailing metadata document
    pub is_metadata: bool,
}

/// XRWS archive reader
///
/// Entries can only be read in the order they are stored, followed by the trailing
/// metadata document.
///
/// ```no_run
/// use std::io::prelude::*;
///
/// fn list_xrws_contents(reader: impl Read + Seek) -> xrws::error::Result<()> {
///     let mut xrws = xrws::XrwsArchive::new(reader)?;
///
///     while let Some(mut file) = xrws.next_file()? {
///         println!("Filename: {}", file.name());
///         std::io::copy(&mut file, &mut std::io::stdout())?;
///     }
///
///     Ok(())
/// }
/// ```
pub struct XrwsArchive<R> {
    reader: R,
    header: XrwsHeader,
    files: Vec<XrwsFileData>,
    next: usize,
}

impl<R> XrwsArchive<R> {
    /// Number of entries contained in this XRWS, not counting the metadata document.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether this XRWS archive contains no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The validated header of the archive
    pub fn header(&self) -> &XrwsHeader {
        &self.header
    }

    /// Returns an iterator over all the entry names in this archive, in stored order.
    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(|f| f.file_name.as_ref())
    }

    /// Get the metadata of an entry by index
    pub fn entry(&self, index: usize) -> Option<&XrwsFileData> {
        self.files.get(index)
    }

    /// Offset from the start of the archive where the entry data begins
    pub fn payload_start(&self) -> u64 {
        self.header.payload_start()
    }

    /// Total size of the listed entries, without the metadata document.
    pub fn entries_length(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }

    /// Unwrap and return the inner reader object
    pub fn into_inner(self) -> R {
        self.reader
    }

    fn metadata(&self) -> XrwsFileData {
        let data_start = self.payload_start() + self.entries_length();
        XrwsFileData {
            size: self.header.expected_length().saturating_sub(data_start),
            file_name: METADATA_FILE_NAME.into(),
            file_name_raw: METADATA_FILE_NAME.as_bytes().into(),
            data_start,
            is_metadata: true,
        }
    }
}

impl<R: Read + Seek> XrwsArchive<R> {
    /// Read a XRWS archive collecting the entries it contains.
    ///
    /// The reader is expected at the start of the archive and is left at the start of the payload.
    #[instrument(skip(reader), err)]
    pub fn new(mut reader: R) -> Result<XrwsArchive<R>> {
        let header = Self::get_header(&mut reader)?;
        let sizes = Self::get_sizes(&mut reader, &header)?;
        let names = Self::get_names(&mut reader, &header)?;

        let mut data_start = header.payload_start();
        let files = sizes
            .into_iter()
            .zip(names)
            .map(|(size, name)| {
                let file = XrwsFileData {
                    size,
                    file_name: String::from_utf8_lossy(&name).into(),
                    file_name_raw: name.into(),
                    data_start,
                    is_metadata: false,
                };
                data_start += size;
                file
            })
            .collect::<Vec<_>>();

        debug!("found {} entries", files.len());

        Ok(XrwsArchive {
            reader,
            header,
            files,
            next: 0,
        })
    }

    /// Get the next file of the archive
    ///
    /// Listed entries are returned in stored order, then the metadata document, then `None`.
    /// Entries that were not read to their end are skipped over.
    pub fn next_file(&mut self) -> Result<Option<XrwsFile<'_, R>>> {
        let index = self.next;
        if index > self.files.len() {
            return Ok(None);
        }
        self.next += 1;

        let (data, limit) = match self.files.get(index) {
            Some(data) => (Cow::Borrowed(data), data.size),
            None => (Cow::Owned(self.metadata()), u64::MAX),
        };

        if self.reader.stream_position()? != data.data_start {
            self.reader.seek(SeekFrom::Start(data.data_start))?;
        }

        Ok(Some(XrwsFile {
            data,
            reader: self.reader.by_ref().take(limit),
        }))
    }

    /// Check that the bytes consumed from the archive match the size declared by the header.
    #[instrument(skip(self), err)]
    pub fn verify(&mut self) -> Result<()> {
        let expected = self.header.expected_length();
        let actual = self.reader.stream_position()?;
        if expected != actual {
            warn!(expected, actual, "archive size does not match its header");
            return Err(Error::SizeMismatch { expected, actual });
        }
        Ok(())
    }

    fn get_header(reader: &mut R) -> Result<XrwsHeader> {
        let header = XrwsHeader::read(reader).map_err(|e| match e {
            binrw::Error::Io(e) => Error::IOError(e),
            e if matches!(e.root_cause(), binrw::Error::BadMagic { .. }) => Error::InvalidArchive,
            e => Error::BinRWError(e),
        })?;
        debug!(?header, "read header");

        if header.version != XRWS_VERSION {
            return Err(Error::UnsupportedVersion(header.version));
        }
        Ok(header)
    }

    fn get_sizes(reader: &mut R, header: &XrwsHeader) -> Result<Vec<u64>> {
        (0..header.entries)
            .map(|_| {
                reader
                    .read_u32::<BigEndian>()
                    .map(u64::from)
                    .map_err(Error::from)
            })
            .collect()
    }

    fn get_names(reader: &mut R, header: &XrwsHeader) -> Result<Vec<Vec<u8>>> {
        let mut block = Vec::new();
        reader
            .by_ref()
            .take(header.names_length as u64)
            .read_to_end(&mut block)?;
        if block.len() != header.names_length as usize {
            return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into());
        }

        split_names(&block, header.entries)
    }
}

/// Split a name block into exactly `count` null terminated names.
///
/// Bytes following the last expected terminator are ignored.
fn split_names(block: &[u8], count: u32) -> Result<Vec<Vec<u8>>> {
    let found = block.iter().filter(|b| **b == b'\0').count();
    if found < count as usize {
        return Err(Error::InvalidNameTable {
            expected: count,
            found: found as u32,
        });
    }

    Ok(block
        .split(|b| *b == b'\0')
        .take(count as usize)
        .map(<[u8]>::to_vec)
        .collect())
}

#[cfg(test)]
mod test {
    use std::io::prelude::*;

    use pretty_assertions::assert_eq;

    use super::split_names;
    use crate::{
        error::{Error, Result},
        read::XrwsArchive,
    };
    use std::io::Cursor;

    #[rustfmt::skip]
    const TWO_ENTRIES: [u8; 53] = [
        // Header (20)
        0x58, 0x52, 0x57, 0x53, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00,
        0x00, 0x10, 0x00, 0x00, 0x00, 0x09,
        // Sizes (8)
        0x00, 0x00, 0x00, 0x05, 0x00, 0x00, 0x00, 0x00,
        // Names (16)
        0x68, 0x65, 0x6C, 0x6C, 0x6F, 0x2E, 0x74, 0x78, 0x74, 0x00, 0x61, 0x2E, 0x62, 0x69,
        0x6E, 0x00,
        // Data (5)
        0x48, 0x65, 0x6C, 0x6C, 0x6F,
        // Metadata (4)
        0x3C, 0x78, 0x2F, 0x3E,
    ];

    #[test]
    fn read_invalid_magic() {
        #[rustfmt::skip]
        let input = [
            0x58, 0x52, 0x57, 0x54, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        ];

        let archive = XrwsArchive::new(Cursor::new(input));
        assert!(matches!(archive, Err(Error::InvalidArchive)));
    }

    #[test]
    fn read_unsupported_version() {
        #[rustfmt::skip]
        let input = [
            0x58, 0x52, 0x57, 0x53, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        ];

        let archive = XrwsArchive::new(Cursor::new(input));
        assert!(matches!(archive, Err(Error::UnsupportedVersion(2))));
    }

    #[test]
    fn read_truncated_header() {
        let input = [0x58, 0x52, 0x57, 0x53, 0x00, 0x00];

        let archive = XrwsArchive::new(Cursor::new(input));
        assert!(matches!(
            archive,
            Err(Error::IOError(_) | Error::BinRWError(_))
        ));
    }

    #[test]
    fn read_empty_archive() -> Result<()> {
        #[rustfmt::skip]
        let input = [
            0x58, 0x52, 0x57, 0x53, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x03, 0x61, 0x62, 0x63,
        ];

        let mut archive = XrwsArchive::new(Cursor::new(input))?;
        assert!(archive.is_empty());
        assert_eq!(archive.payload_start(), 20);

        let mut buffer = Vec::new();
        let mut metadata = archive.next_file()?.expect("metadata document");
        assert!(metadata.is_metadata());
        assert_eq!(metadata.name(), "content.xml");
        assert_eq!(metadata.size(), 3);
        metadata.read_to_end(&mut buffer)?;
        assert_eq!(buffer, b"abc");

        assert!(archive.next_file()?.is_none());
        archive.verify()?;

        Ok(())
    }

    #[test]
    fn read_archive_with_entries() -> Result<()> {
        let mut archive = XrwsArchive::new(Cursor::new(TWO_ENTRIES))?;
        assert_eq!(archive.len(), 2);
        assert_eq!(
            archive.file_names().collect::<Vec<_>>(),
            vec!["hello.txt", "a.bin"]
        );
        assert_eq!(archive.entries_length(), 5);

        let mut buffer = Vec::new();

        let mut first = archive.next_file()?.expect("first entry");
        assert_eq!(first.name(), "hello.txt");
        assert_eq!(first.data_start(), 44);
        assert_eq!(first.size(), 5);
        first.read_to_end(&mut buffer)?;
        assert_eq!(buffer, b"Hello");
        buffer.clear();

        let mut second = archive.next_file()?.expect("second entry");
        assert_eq!(second.name(), "a.bin");
        assert_eq!(second.data_start(), 49);
        second.read_to_end(&mut buffer)?;
        assert!(buffer.is_empty());

        let mut metadata = archive.next_file()?.expect("metadata document");
        assert!(metadata.is_metadata());
        assert_eq!(metadata.data_start(), 49);
        assert_eq!(metadata.size(), 4);
        metadata.read_to_end(&mut buffer)?;
        assert_eq!(buffer, b"<x/>");

        assert!(archive.next_file()?.is_none());
        archive.verify()?;

        Ok(())
    }

    #[test]
    fn skip_unread_entries() -> Result<()> {
        let mut archive = XrwsArchive::new(Cursor::new(TWO_ENTRIES))?;

        let mut first = archive.next_file()?.expect("first entry");
        let mut partial = [0u8; 2];
        first.read_exact(&mut partial)?;
        assert_eq!(&partial, b"He");

        archive.next_file()?.expect("second entry");

        let mut buffer = Vec::new();
        archive
            .next_file()?
            .expect("metadata document")
            .read_to_end(&mut buffer)?;
        assert_eq!(buffer, b"<x/>");

        Ok(())
    }

    #[test]
    fn verify_detects_trailing_bytes() -> Result<()> {
        let mut input = TWO_ENTRIES.to_vec();
        input.extend_from_slice(b"junk");

        let mut archive = XrwsArchive::new(Cursor::new(input))?;
        while let Some(mut file) = archive.next_file()? {
            std::io::copy(&mut file, &mut std::io::sink())?;
        }

        assert!(matches!(
            archive.verify(),
            Err(Error::SizeMismatch {
                expected: 53,
                actual: 57
            })
        ));

        Ok(())
    }

    #[test]
    fn read_short_name_block() {
        #[rustfmt::skip]
        let input = [
            // Header (20), two entries with a 6 byte name block
            0x58, 0x52, 0x57, 0x53, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00,
            0x00, 0x06, 0x00, 0x00, 0x00, 0x00,
            // Sizes (8)
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            // Names (6), only one terminator
            0x61, 0x2E, 0x62, 0x69, 0x6E, 0x00,
        ];

        let archive = XrwsArchive::new(Cursor::new(input));
        assert!(matches!(
            archive,
            Err(Error::InvalidNameTable {
                expected: 2,
                found: 1
            })
        ));
    }

    #[test]
    fn read_truncated_name_block() {
        #[rustfmt::skip]
        let input = [
            0x58, 0x52, 0x57, 0x53, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00,
            0x00, 0x10, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x61, 0x00,
        ];

        let archive = XrwsArchive::new(Cursor::new(input));
        assert!(matches!(archive, Err(Error::IOError(_))));
    }

    #[test]
    fn split_names_in_order() -> Result<()> {
        let names = split_names(b"a.txt\0b.bin\0c.dat\0", 3)?;
        assert_eq!(
            names,
            vec![b"a.txt".to_vec(), b"b.bin".to_vec(), b"c.dat".to_vec()]
        );
        Ok(())
    }

    #[test]
    fn split_names_ignores_trailing_bytes() -> Result<()> {
        let names = split_names(b"a\0\0rest", 2)?;
        assert_eq!(names, vec![b"a".to_vec(), Vec::new()]);
        Ok(())
    }

    #[test]
    fn split_names_without_terminator() {
        assert!(matches!(
            split_names(b"a.txt", 1),
            Err(Error::InvalidNameTable {
                expected: 1,
                found: 0
            })
        ));
    }
}
