//! # Gated Download
//!
//! `POST /download` with `{hash, passkey}` returns the stored bytes as an
//! attachment. Every passkey failure is the same 403 body; an absent
//! passkey is treated as a wrong one.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use proofnest_protocol::Download;
use serde::Deserialize;

use crate::error::AppError;
use crate::state::AppState;

const OCTET_STREAM: &str = "application/octet-stream";

pub fn router() -> Router<AppState> {
    Router::new().route("/download", post(download))
}

#[derive(Debug, Deserialize)]
pub struct DownloadRequest {
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(default)]
    pub passkey: Option<String>,
}

/// Filename safe to embed in a quoted `Content-Disposition` parameter.
fn attachment_name(download: &Download) -> String {
    let cleaned: String = download
        .name
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        download.hash.to_hex()
    } else {
        cleaned.to_string()
    }
}

fn into_attachment(download: Download) -> Response {
    let content_type = download
        .content_type
        .as_deref()
        .and_then(|ct| HeaderValue::from_str(ct).ok())
        .unwrap_or_else(|| HeaderValue::from_static(OCTET_STREAM));
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", attachment_name(&download)))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        download.content,
    )
        .into_response()
}

async fn download(
    State(state): State<AppState>,
    body: Result<Json<DownloadRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(request) = body?;
    let hash = request
        .hash
        .ok_or_else(|| AppError::bad_request("hash is required"))?;
    let passkey = request.passkey.unwrap_or_default();

    let download = state.registry.download(&hash, &passkey).await?;
    Ok(into_attachment(download))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proofnest_core::ContentDigest;

    fn dl(name: &str) -> Download {
        Download {
            hash: ContentDigest::of(b"x"),
            name: name.into(),
            content_type: None,
            content: b"x".to_vec(),
        }
    }

    #[test]
    fn attachment_name_strips_quotes_and_controls() {
        assert_eq!(attachment_name(&dl("report \"final\".pdf")), "report _final_.pdf");
        assert_eq!(attachment_name(&dl("a\r\nb.txt")), "a__b.txt");
        assert_eq!(attachment_name(&dl("résumé.pdf")), "r_sum_.pdf");
    }

    #[test]
    fn blank_name_falls_back_to_hash() {
        assert_eq!(attachment_name(&dl("")), ContentDigest::of(b"x").to_hex());
    }

    #[test]
    fn missing_content_type_is_octet_stream() {
        let resp = into_attachment(dl("a.bin"));
        assert_eq!(resp.headers()[header::CONTENT_TYPE], OCTET_STREAM);
        assert_eq!(
            resp.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"a.bin\""
        );
    }
}
