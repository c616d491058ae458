//! `proofnest hash` — print SHA-256 fingerprints of local files.
//!
//! Output follows `sha256sum`: lowercase hex, two spaces, path. Works
//! offline and accepts files of any size.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use proofnest_protocol::ProofRegistry;

use crate::EXIT_OK;

#[derive(Args, Debug)]
pub struct HashArgs {
    /// Files to fingerprint.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

pub fn run_hash(args: &HashArgs, out: &mut impl Write) -> Result<u8> {
    for path in &args.files {
        let bytes = std::fs::read(path).with_context(|| format!("cannot read {}", path.display()))?;
        let digest = ProofRegistry::compute_hash(&bytes);
        writeln!(out, "{digest}  {}", path.display())?;
    }
    Ok(EXIT_OK)
}
