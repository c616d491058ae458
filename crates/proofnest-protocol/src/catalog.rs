//! Public listing of registered proofs: search, sort, paginate.
//!
//! Listings are built from [`RecordSummary`] views, so stored bytes and
//! passkeys never leave through this path.

use std::cmp::Ordering;

use proofnest_core::{ProofError, ProofRecord, RecordSummary};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PER_PAGE: u32 = 10;
pub const MAX_PER_PAGE: u32 = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    Name,
    #[default]
    Timestamp,
    OwnerName,
}

impl std::str::FromStr for SortField {
    type Err = ProofError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "name" => Ok(Self::Name),
            "timestamp" => Ok(Self::Timestamp),
            "ownerName" | "owner_name" | "owner-name" => Ok(Self::OwnerName),
            other => Err(ProofError::MalformedInput(format!("unknown sort field: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl std::str::FromStr for SortDirection {
    type Err = ProofError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(ProofError::MalformedInput(format!("unknown sort direction: {other}"))),
        }
    }
}

/// Listing request. `page` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub search: Option<String>,
    pub sort_by: SortField,
    pub direction: SortDirection,
    pub page: u32,
    pub per_page: u32,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            search: None,
            sort_by: SortField::default(),
            direction: SortDirection::default(),
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub files: Vec<T>,
    pub total: usize,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
}

fn matches_search(summary: &RecordSummary, needle: &str) -> bool {
    let hit = |field: &str| field.to_lowercase().contains(needle);
    hit(summary.name.as_str())
        || summary.owner_name.as_deref().is_some_and(hit)
        || summary.description.as_deref().is_some_and(hit)
}

fn compare(a: &RecordSummary, b: &RecordSummary, field: SortField) -> Ordering {
    let primary = match field {
        SortField::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        SortField::Timestamp => a.timestamp.cmp(&b.timestamp),
        SortField::OwnerName => {
            let key = |s: &RecordSummary| s.owner_name.as_deref().unwrap_or("").to_lowercase();
            key(a).cmp(&key(b))
        }
    };
    // Hash tie-break keeps pages stable across calls.
    primary.then_with(|| a.hash.cmp(&b.hash))
}

/// Filter, sort and slice a set of records.
pub fn paginate(records: Vec<ProofRecord>, query: &ListQuery) -> Page<RecordSummary> {
    let per_page = query.per_page.clamp(1, MAX_PER_PAGE);
    let page = query.page.max(1);
    let needle = query
        .search
        .as_deref()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());

    let mut summaries: Vec<RecordSummary> = records
        .iter()
        .map(ProofRecord::summary)
        .filter(|s| needle.as_deref().map_or(true, |n| matches_search(s, n)))
        .collect();

    summaries.sort_by(|a, b| {
        let ord = compare(a, b, query.sort_by);
        match query.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });

    let total = summaries.len();
    let total_pages = u32::try_from(total.div_ceil(per_page as usize)).unwrap_or(u32::MAX);
    let start = (page as usize - 1).saturating_mul(per_page as usize);
    let files = summaries
        .into_iter()
        .skip(start)
        .take(per_page as usize)
        .collect();

    Page {
        files,
        total,
        page,
        per_page,
        total_pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proofnest_core::{ContentDigest, LedgerEntry, Principal, RoyaltyInfo};

    fn rec(name: &str, owner_name: Option<&str>, description: Option<&str>, ts: u64) -> ProofRecord {
        ProofRecord::from_entry(
            LedgerEntry {
                hash: ContentDigest::of(name.as_bytes()),
                owner: Principal::new("P1").unwrap(),
                name: name.into(),
                description: description.map(Into::into),
                owner_name: owner_name.map(Into::into),
                owner_dob: None,
                content_type: None,
                content: None,
                royalty: RoyaltyInfo::default(),
            },
            ts,
        )
    }

    fn names(page: &Page<RecordSummary>) -> Vec<&str> {
        page.files.iter().map(|s| s.name.as_str()).collect()
    }

    #[test]
    fn default_is_newest_first_ten_per_page() {
        let records = (0..25).map(|i| rec(&format!("f{i:02}"), None, None, i)).collect();
        let page = paginate(records, &ListQuery::default());
        assert_eq!(page.total, 25);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.files.len(), 10);
        assert_eq!(page.files[0].name, "f24");
    }

    #[test]
    fn last_page_is_partial_and_past_end_is_empty() {
        let records: Vec<_> = (0..25).map(|i| rec(&format!("f{i:02}"), None, None, i)).collect();
        let q = ListQuery {
            page: 3,
            ..ListQuery::default()
        };
        assert_eq!(paginate(records.clone(), &q).files.len(), 5);
        let q = ListQuery {
            page: 9,
            ..ListQuery::default()
        };
        assert!(paginate(records, &q).files.is_empty());
    }

    #[test]
    fn search_covers_name_owner_and_description() {
        let records = vec![
            rec("Contract.pdf", None, None, 1),
            rec("a.txt", Some("Contractor Ltd"), None, 2),
            rec("b.txt", None, Some("draft contract"), 3),
            rec("c.txt", Some("Ada"), Some("holiday"), 4),
        ];
        let q = ListQuery {
            search: Some("  CONTRACT ".into()),
            sort_by: SortField::Timestamp,
            direction: SortDirection::Asc,
            ..ListQuery::default()
        };
        let page = paginate(records, &q);
        assert_eq!(names(&page), vec!["Contract.pdf", "a.txt", "b.txt"]);
    }

    #[test]
    fn sort_by_name_is_case_insensitive() {
        let records = vec![
            rec("beta", None, None, 1),
            rec("Alpha", None, None, 2),
            rec("gamma", None, None, 3),
        ];
        let q = ListQuery {
            sort_by: SortField::Name,
            direction: SortDirection::Asc,
            ..ListQuery::default()
        };
        assert_eq!(names(&paginate(records, &q)), vec!["Alpha", "beta", "gamma"]);
    }

    #[test]
    fn sort_by_owner_name_desc() {
        let records = vec![
            rec("x", Some("Bob"), None, 1),
            rec("y", Some("alice"), None, 2),
            rec("z", None, None, 3),
        ];
        let q = ListQuery {
            sort_by: SortField::OwnerName,
            direction: SortDirection::Desc,
            ..ListQuery::default()
        };
        assert_eq!(names(&paginate(records, &q)), vec!["x", "y", "z"]);
    }

    #[test]
    fn per_page_is_clamped() {
        let records = (0..150).map(|i| rec(&format!("f{i}"), None, None, i)).collect();
        let q = ListQuery {
            per_page: 1000,
            ..ListQuery::default()
        };
        let page = paginate(records, &q);
        assert_eq!(page.per_page, MAX_PER_PAGE);
        assert_eq!(page.files.len(), MAX_PER_PAGE as usize);
    }

    #[test]
    fn parse_sort_options() {
        assert_eq!("ownerName".parse::<SortField>().unwrap(), SortField::OwnerName);
        assert_eq!("ASC".parse::<SortDirection>().unwrap(), SortDirection::Asc);
        assert!("size".parse::<SortField>().is_err());
        assert!("sideways".parse::<SortDirection>().is_err());
    }
}
