//! `proofnest download` — fetch stored bytes with the owner's passkey.

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use proofnest_protocol::{Download, ProofRegistry};

use crate::EXIT_OK;

#[derive(Args, Debug)]
pub struct DownloadArgs {
    /// Hex SHA-256 fingerprint of the record.
    pub hash: String,

    /// The owner's passkey (date of birth).
    #[arg(long, env = "PROOFNEST_PASSKEY", hide_env_values = true, default_value = "")]
    pub passkey: String,

    /// Where to write the bytes. Defaults to the record's name in the
    /// current directory.
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Overwrite an existing output file.
    #[arg(long)]
    pub force: bool,
}

/// File name to save a download under when no path was given.
///
/// Only the last path component of the stored name is used, so a record
/// name cannot point outside the working directory.
fn default_output(download: &Download) -> PathBuf {
    let name = Path::new(&download.name)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| download.hash.to_hex());
    PathBuf::from(name)
}

/// Write `content` to `path`. Without `force` the file must not exist yet;
/// the check and the create are one filesystem operation.
fn write_output(path: &Path, content: &[u8], force: bool) -> Result<()> {
    if force {
        return std::fs::write(path, content).with_context(|| format!("cannot write {}", path.display()));
    }
    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            bail!("{} already exists (use --force to overwrite)", path.display())
        }
        Err(e) => return Err(e).with_context(|| format!("cannot write {}", path.display())),
    };
    file.write_all(content)
        .with_context(|| format!("cannot write {}", path.display()))
}

pub async fn run_download(
    args: &DownloadArgs,
    registry: &ProofRegistry,
    out: &mut impl Write,
) -> Result<u8> {
    let download = registry.download(&args.hash, &args.passkey).await?;

    let path = args.output.clone().unwrap_or_else(|| default_output(&download));
    write_output(&path, &download.content, args.force)?;

    tracing::info!(hash = %download.hash, path = %path.display(), "downloaded");
    writeln!(out, "wrote {} bytes to {}", download.content.len(), path.display())?;
    Ok(EXIT_OK)
}
