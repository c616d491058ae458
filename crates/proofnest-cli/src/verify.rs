//! `proofnest verify` — look up a fingerprint or a local file.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgGroup, Args};
use proofnest_protocol::{ProofRegistry, VerifiedProof, VerifyOptions, VerifyOutcome};
use serde_json::json;

use crate::{read_payload, EXIT_NOT_FOUND, EXIT_OK};

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("target").required(true).args(["hash", "file"])))]
pub struct VerifyArgs {
    /// Hex SHA-256 fingerprint to look up.
    #[arg(long)]
    pub hash: Option<String>,

    /// Local file to hash and look up.
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Include stored bytes (base64) when the record is unprotected.
    #[arg(long)]
    pub include_content: bool,

    /// Print the result as JSON.
    #[arg(long)]
    pub json: bool,
}

pub async fn run_verify(
    args: &VerifyArgs,
    registry: &ProofRegistry,
    out: &mut impl Write,
) -> Result<u8> {
    let options = VerifyOptions {
        include_content: args.include_content,
    };
    let outcome = match (&args.hash, &args.file) {
        (Some(hash), _) => registry.verify_by_hash(hash, options).await?,
        (None, Some(path)) => {
            let content = read_payload(path)?;
            registry
                .verify_by_file(&content, options)
                .await
                .with_context(|| format!("failed to verify {}", path.display()))?
        }
        (None, None) => anyhow::bail!("either --hash or --file is required"),
    };

    match outcome {
        VerifyOutcome::Found(proof) => {
            if args.json {
                let mut body = serde_json::to_value(&*proof)?;
                if let Some(map) = body.as_object_mut() {
                    map.insert("verified".into(), json!(true));
                    map.insert("timestampDisplay".into(), json!(proof.timestamp.display()));
                }
                writeln!(out, "{}", serde_json::to_string_pretty(&body)?)?;
            } else {
                print_proof(&proof, out)?;
            }
            Ok(EXIT_OK)
        }
        VerifyOutcome::NotFound { hash } => {
            if args.json {
                let body = json!({ "verified": false, "message": "not found", "hash": hash });
                writeln!(out, "{}", serde_json::to_string_pretty(&body)?)?;
            } else {
                writeln!(out, "not found: {hash}")?;
            }
            Ok(EXIT_NOT_FOUND)
        }
    }
}

fn print_proof(proof: &VerifiedProof, out: &mut impl Write) -> Result<()> {
    writeln!(out, "verified:  {}", proof.hash)?;
    writeln!(out, "name:      {}", proof.name)?;
    writeln!(out, "owner:     {}", proof.owner)?;
    if let Some(owner_name) = &proof.owner_name {
        writeln!(out, "ownerName: {owner_name}")?;
    }
    writeln!(out, "timestamp: {}", proof.timestamp.display())?;
    if proof.is_degraded() {
        writeln!(out, "warning:   record carries placeholder identity fields")?;
    }
    if proof.royalty.has_royalty {
        writeln!(
            out,
            "royalty:   {} ({})",
            proof.royalty.royalty_fee.as_deref().unwrap_or("unspecified"),
            proof.royalty.contact_details.as_deref().unwrap_or("no contact"),
        )?;
    }
    if proof.passkey_protected {
        writeln!(out, "content:   passkey protected")?;
    } else if proof.has_content {
        writeln!(out, "content:   stored")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proofnest_core::{CallerSession, Principal};
    use proofnest_ledger_client::MemoryLedger;
    use proofnest_protocol::RegistrationMetadata;
    use std::sync::Arc;

    async fn seeded() -> ProofRegistry {
        let registry = ProofRegistry::new(Arc::new(MemoryLedger::with_fixed_timestamp(
            1_700_000_000_000_000_000,
        )));
        let session = CallerSession::new(Principal::new("bob").unwrap());
        registry
            .register(b"contract v1", RegistrationMetadata::named("contract.txt"), &session)
            .await
            .unwrap();
        registry
    }

    fn args(hash: Option<String>, file: Option<PathBuf>, json: bool) -> VerifyArgs {
        VerifyArgs {
            hash,
            file,
            include_content: false,
            json,
        }
    }

    #[tokio::test]
    async fn hash_and_file_lookups_agree() {
        let registry = seeded().await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("contract.txt");
        std::fs::write(&path, b"contract v1").unwrap();

        let mut by_file = Vec::new();
        let code = run_verify(&args(None, Some(path), true), &registry, &mut by_file)
            .await
            .unwrap();
        assert_eq!(code, EXIT_OK);

        let hash = ProofRegistry::compute_hash(b"contract v1").to_hex();
        let mut by_hash = Vec::new();
        run_verify(&args(Some(hash.to_uppercase()), None, true), &registry, &mut by_hash)
            .await
            .unwrap();
        assert_eq!(by_file, by_hash);

        let body: serde_json::Value = serde_json::from_slice(&by_hash).unwrap();
        assert_eq!(body["verified"], true);
        assert_eq!(body["owner"], "bob");
        assert_eq!(body["hash"], hash);
        assert_eq!(body["timestamp"], 1_700_000_000_000u64);
        assert_eq!(body["timestampDisplay"], "2023-11-14T22:13:20.000Z");
    }

    #[tokio::test]
    async fn unknown_hash_exits_not_found() {
        let registry = seeded().await;
        let missing = ProofRegistry::compute_hash(b"never registered").to_hex();
        let mut out = Vec::new();
        let code = run_verify(&args(Some(missing.clone()), None, false), &registry, &mut out)
            .await
            .unwrap();
        assert_eq!(code, EXIT_NOT_FOUND);
        assert_eq!(String::from_utf8(out).unwrap().trim(), format!("not found: {missing}"));
    }

    #[tokio::test]
    async fn malformed_hash_is_error() {
        let registry = seeded().await;
        let err = run_verify(&args(Some("xyz".into()), None, false), &registry, &mut Vec::new())
            .await
            .unwrap_err();
        assert_eq!(crate::exit_code_for(&err), crate::EXIT_ERROR);
    }
}
