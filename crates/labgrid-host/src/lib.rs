//! File-backed document host for labgrid.
//!
//! Stores grid documents as JSON files ([`DocumentFile`]) and exposes a
//! [`JsonSession`] implementing the engine's session trait, so the
//! orchestrators run against files the same way they would against a live
//! spreadsheet host.

pub mod document;
pub mod error;
pub mod session;

pub use document::{CellRecord, DocumentFile, RegionRecord};
pub use error::{Error, Result};
pub use session::JsonSession;
