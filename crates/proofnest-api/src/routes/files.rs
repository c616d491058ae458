//! `GET /files`: the public listing.
//!
//! Query parameters: `search`, `sortBy` (`name` | `timestamp` |
//! `ownerName`), `direction` (`asc` | `desc`), `page`, `perPage`.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use proofnest_core::RecordSummary;
use proofnest_protocol::catalog::DEFAULT_PER_PAGE;
use proofnest_protocol::{ListQuery, Page};
use serde::Deserialize;

use crate::error::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/files", get(list_files))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilesParams {
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub direction: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl FilesParams {
    fn into_query(self) -> Result<ListQuery, AppError> {
        Ok(ListQuery {
            search: self.search,
            sort_by: self.sort_by.as_deref().map(str::parse).transpose()?.unwrap_or_default(),
            direction: self.direction.as_deref().map(str::parse).transpose()?.unwrap_or_default(),
            page: self.page.unwrap_or(1),
            per_page: self.per_page.unwrap_or(DEFAULT_PER_PAGE),
        })
    }
}

async fn list_files(
    State(state): State<AppState>,
    params: Result<Query<FilesParams>, QueryRejection>,
) -> Result<Json<Page<RecordSummary>>, AppError> {
    let Query(params) = params?;
    let query = params.into_query()?;
    Ok(Json(state.registry.list_records(&query).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proofnest_protocol::{SortDirection, SortField};

    #[test]
    fn empty_params_use_defaults() {
        let query = FilesParams::default().into_query().unwrap();
        assert_eq!(query, ListQuery::default());
    }

    #[test]
    fn explicit_params_parse() {
        let params = FilesParams {
            search: Some("contract".into()),
            sort_by: Some("ownerName".into()),
            direction: Some("asc".into()),
            page: Some(2),
            per_page: Some(25),
        };
        let query = params.into_query().unwrap();
        assert_eq!(query.sort_by, SortField::OwnerName);
        assert_eq!(query.direction, SortDirection::Asc);
        assert_eq!((query.page, query.per_page), (2, 25));
    }

    #[test]
    fn unknown_sort_field_is_rejected() {
        let params = FilesParams {
            sort_by: Some("size".into()),
            ..FilesParams::default()
        };
        assert!(matches!(params.into_query(), Err(AppError::Proof(_))));
    }
}
