//! Unpacking XRWS archives into a directory
//!

use bon::Builder;
use std::{
    fs::{self, File},
    io::{self, Read, Seek},
    path::{Path, PathBuf},
};
use tracing::{info, instrument, warn};

use crate::{error::Result, read::XrwsArchive, METADATA_FILE_NAME};

/// Options for how the archive should be extracted
#[derive(Debug, Clone, Copy, Default, Builder)]
pub struct ExtractOptions {
    /// Fail instead of overwriting files that already exist in the target directory
    #[builder(default)]
    pub keep_existing: bool,
}

/// What an extraction has written
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractSummary {
    /// The directory the files were written to
    pub directory: PathBuf,

    /// Name and size of every listed entry, in stored order
    pub files: Vec<(String, u64)>,

    /// Size of the written metadata document
    pub metadata_size: u64,
}

impl ExtractSummary {
    /// Number of written files, the metadata document included
    pub fn file_count(&self) -> usize {
        self.files.len() + 1
    }

    /// Bytes written across all files, the metadata document included
    pub fn total_size(&self) -> u64 {
        self.files.iter().map(|(_, size)| size).sum::<u64>() + self.metadata_size
    }
}

impl<R: Read + Seek> XrwsArchive<R> {
    /// Write every entry and the metadata document into `directory`
    ///
    /// The directory is created if needed. Files are written one after the other, streaming
    /// from the archive. On failure, files written so far, including a partially written one,
    /// are left in place. The size check against the header runs once everything is written.
    ///
    /// ```no_run
    /// # fn doit() -> xrws::error::Result<()>
    /// # {
    /// use xrws::{ExtractOptions, XrwsArchive};
    ///
    /// let file = std::fs::File::open("extensions_myMod_v3.dat")?;
    /// let mut xrws = XrwsArchive::new(file)?;
    /// let summary = xrws.extract("myMod", ExtractOptions::default())?;
    /// println!("wrote {} files", summary.file_count());
    /// # Ok(())
    /// # }
    /// ```
    #[instrument(skip_all, fields(directory = %directory.as_ref().display()), err)]
    pub fn extract(
        &mut self,
        directory: impl AsRef<Path>,
        options: ExtractOptions,
    ) -> Result<ExtractSummary> {
        let directory = directory.as_ref();
        fs::create_dir_all(directory)?;

        let mut summary = ExtractSummary {
            directory: directory.to_path_buf(),
            ..Default::default()
        };

        while let Some(mut file) = self.next_file()? {
            let path = entry_path(directory, file.name_raw())?;
            info!("writing {}", path.display());

            if !file.is_metadata() && file.name_raw() == METADATA_FILE_NAME.as_bytes() {
                warn!(
                    "entry {} will be overwritten by the metadata document",
                    METADATA_FILE_NAME
                );
            }

            let written = {
                let mut out = create_file(&path, options.keep_existing)?;
                io::copy(&mut file, &mut out)?
            };

            if file.is_metadata() {
                summary.metadata_size = written;
                continue;
            }

            if written != file.size() {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!(
                        "archive ended after {} of {} bytes of {}",
                        written,
                        file.size(),
                        file.name()
                    ),
                )
                .into());
            }
            summary.files.push((file.name().to_owned(), written));
        }

        self.verify()?;

        Ok(summary)
    }
}

#[cfg(unix)]
fn entry_path(directory: &Path, name: &[u8]) -> Result<PathBuf> {
    use std::{ffi::OsStr, os::unix::ffi::OsStrExt};

    Ok(directory.join(OsStr::from_bytes(name)))
}

#[cfg(not(unix))]
fn entry_path(directory: &Path, name: &[u8]) -> Result<PathBuf> {
    let name = std::str::from_utf8(name)
        .map_err(|_| {
            crate::error::Error::InvalidEntryName(String::from_utf8_lossy(name).into_owned())
        })?;

    Ok(directory.join(name))
}

fn create_file(path: &Path, keep_existing: bool) -> io::Result<File> {
    let file = if keep_existing {
        File::create_new(path)
    } else {
        File::create(path)
    };

    file.map_err(|e| io::Error::new(e.kind(), format!("creating {}: {}", path.display(), e)))
}
