//! `proofnest register` — register a local file on the ledger.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use proofnest_core::{CallerSession, Principal, RoyaltyInfo};
use proofnest_protocol::{ProofRegistry, RegisterOutcome, RegistrationMetadata};

use crate::{read_payload, EXIT_ALREADY_REGISTERED, EXIT_OK};

#[derive(Args, Debug)]
pub struct RegisterArgs {
    /// File to register.
    pub file: PathBuf,

    /// Principal recorded as owner. Anonymous when omitted.
    #[arg(long, env = "PROOFNEST_PRINCIPAL")]
    pub principal: Option<String>,

    /// Display name. Defaults to the file name.
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    /// Owner's display name.
    #[arg(long)]
    pub owner_name: Option<String>,

    /// Owner's date of birth. Becomes the download passkey.
    #[arg(long, env = "PROOFNEST_OWNER_DOB", hide_env_values = true)]
    pub owner_dob: Option<String>,

    /// MIME type of the file.
    #[arg(long)]
    pub content_type: Option<String>,

    /// Declare royalty terms (informational only).
    #[arg(long)]
    pub has_royalty: bool,

    #[arg(long, requires = "has_royalty")]
    pub royalty_fee: Option<String>,

    #[arg(long, requires = "has_royalty")]
    pub contact_details: Option<String>,

    /// Record the fingerprint only; do not store the bytes.
    #[arg(long)]
    pub no_store_content: bool,
}

impl RegisterArgs {
    fn session(&self) -> Result<CallerSession> {
        match self.principal.as_deref().filter(|p| !p.trim().is_empty()) {
            Some(raw) => Ok(CallerSession::new(Principal::new(raw)?)),
            None => Ok(CallerSession::anonymous()),
        }
    }

    fn metadata(&self) -> RegistrationMetadata {
        let name = self.name.clone().or_else(|| {
            self.file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
        });
        RegistrationMetadata {
            name,
            description: self.description.clone(),
            owner_name: self.owner_name.clone(),
            owner_dob: self.owner_dob.clone(),
            content_type: self.content_type.clone(),
            royalty: RoyaltyInfo::new(
                self.has_royalty,
                self.royalty_fee.clone(),
                self.contact_details.clone(),
            ),
            store_content: !self.no_store_content,
        }
    }
}

pub async fn run_register(
    args: &RegisterArgs,
    registry: &ProofRegistry,
    out: &mut impl Write,
) -> Result<u8> {
    let session = args.session()?;
    let content = read_payload(&args.file)?;
    let outcome = registry
        .register(&content, args.metadata(), &session)
        .await
        .with_context(|| format!("failed to register {}", args.file.display()))?;

    match outcome {
        RegisterOutcome::Registered(receipt) => {
            writeln!(out, "{}", receipt.message)?;
            writeln!(out, "hash:      {}", receipt.hash)?;
            writeln!(out, "timestamp: {}", receipt.timestamp.display())?;
            Ok(EXIT_OK)
        }
        RegisterOutcome::AlreadyRegistered { hash } => {
            writeln!(out, "hash already registered: {hash}")?;
            Ok(EXIT_ALREADY_REGISTERED)
        }
    }
}
