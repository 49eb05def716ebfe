use clap::Args;
use miette::{Context, IntoDiagnostic, Result};
use owo_colors::{OwoColorize, Stream};
use std::{
    fs::File,
    path::{Path, PathBuf},
};
use tracing::info;
use xrws::{output_dir_name, ExtractOptions, XrwsArchive};

#[derive(Args, Debug)]
pub struct UnpackArgs {
    /// An input XRWS .dat file as downloaded from the Steam Workshop
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// A target directory, the extension is unpacked into a directory of its own inside it
    #[arg(value_name = "OUT_DIR", value_parser = writable_dir)]
    directory: Option<PathBuf>,

    /// Fail instead of overwriting files that already exist
    #[arg(long, default_value_t = false)]
    keep_existing: bool,
}

impl UnpackArgs {
    pub fn handle(&self) -> Result<()> {
        let f = File::open(&self.file)
            .into_diagnostic()
            .context(format!("path: {}", &self.file.display()))?;
        let mut xrws = XrwsArchive::new(f).context(format!("reading {}", &self.file.display()))?;

        let file_name = self.file.to_string_lossy();
        let target = self
            .directory
            .as_deref()
            .unwrap_or(Path::new("."))
            .join(output_dir_name(&file_name)?);
        info!(
            "unpacking {} entries into {}",
            xrws.len(),
            target.display()
        );

        let summary = xrws
            .extract(
                &target,
                ExtractOptions::builder()
                    .keep_existing(self.keep_existing)
                    .build(),
            )
            .context(format!("unpacking {}", &self.file.display()))?;

        println!(
            "{} {} files ({} bytes) into {}",
            "unpacked".if_supports_color(Stream::Stdout, |t| t.green()),
            summary.file_count(),
            summary.total_size(),
            summary.directory.display()
        );

        Ok(())
    }
}

fn writable_dir(value: &str) -> std::result::Result<PathBuf, String> {
    let path = PathBuf::from(value);
    let metadata = path
        .metadata()
        .map_err(|e| format!("cannot access {}: {}", value, e))?;

    if !metadata.is_dir() {
        return Err(format!("{} is not a directory", value));
    }
    if metadata.permissions().readonly() {
        return Err(format!("{} is not writable", value));
    }
    Ok(path)
}
