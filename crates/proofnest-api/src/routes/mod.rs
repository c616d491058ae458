//! # API Route Modules
//!
//! - `register`: multipart registration (`POST /register`).
//! - `verify`: lookup by hash or by uploaded file (`POST /verify`,
//!   `POST /verify-file`).
//! - `download`: passkey-gated content download (`POST /download`).
//! - `files`: searchable, paginated listing (`GET /files`).
//! - `form`: multipart parsing shared by the upload routes.

pub mod download;
pub mod files;
pub mod form;
pub mod register;
pub mod verify;
