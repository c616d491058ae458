//! `proofnest files` — search and page through registered proofs.

use std::io::Write;

use anyhow::Result;
use clap::Args;
use proofnest_protocol::catalog::DEFAULT_PER_PAGE;
use proofnest_protocol::{ListQuery, ProofRegistry, SortDirection, SortField};

use crate::EXIT_OK;

#[derive(Args, Debug)]
pub struct FilesArgs {
    /// Case-insensitive match on name, owner name and description.
    #[arg(long)]
    pub search: Option<String>,

    /// Sort field: name, timestamp or ownerName.
    #[arg(long, default_value = "timestamp")]
    pub sort_by: SortField,

    /// asc or desc.
    #[arg(long, default_value = "desc")]
    pub direction: SortDirection,

    #[arg(long, default_value_t = 1)]
    pub page: u32,

    #[arg(long, default_value_t = DEFAULT_PER_PAGE)]
    pub per_page: u32,

    /// Print the page as JSON.
    #[arg(long)]
    pub json: bool,
}

impl FilesArgs {
    fn query(&self) -> ListQuery {
        ListQuery {
            search: self.search.clone(),
            sort_by: self.sort_by,
            direction: self.direction,
            page: self.page,
            per_page: self.per_page,
        }
    }
}

pub async fn run_files(args: &FilesArgs, registry: &ProofRegistry, out: &mut impl Write) -> Result<u8> {
    let page = registry.list_records(&args.query()).await?;

    if args.json {
        writeln!(out, "{}", serde_json::to_string_pretty(&page)?)?;
        return Ok(EXIT_OK);
    }

    for file in &page.files {
        let lock = if file.passkey_protected { " [protected]" } else { "" };
        writeln!(
            out,
            "{}  {}  {}{lock}",
            file.hash,
            file.timestamp.display(),
            file.name
        )?;
    }
    writeln!(
        out,
        "page {}/{} ({} total)",
        page.page,
        page.total_pages.max(1),
        page.total
    )?;
    Ok(EXIT_OK)
}
