//! Schema ID constants for JSON output contracts.
//!
//! JSON emitted by the PAL diagnostics (`regislex-pal info --json`,
//! `regislex-pal ls --json`) carries a `schema_id` field referencing the
//! schema that describes its shape. These constants define the canonical IDs.
//!
//! ## URI Structure
//!
//! ```text
//! https://schemas.regislex.dev/pal/<topic>/<version>/<filename>
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use regislex_core::schema::SYSTEM_INFO_V1;
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Report {
//!     schema_id: &'static str,
//!     hostname: String,
//! }
//! ```

/// Schema ID for the system information snapshot (v1.0.0).
///
/// Schema location: `schemas/system/v1.0.0/system-info.schema.json`
pub const SYSTEM_INFO_V1: &str =
    "https://schemas.regislex.dev/pal/system/v1.0.0/system-info.schema.json";

/// Schema ID for a directory listing (v1.0.0).
///
/// Schema location: `schemas/fs/v1.0.0/dir-listing.schema.json`
pub const DIR_LISTING_V1: &str =
    "https://schemas.regislex.dev/pal/fs/v1.0.0/dir-listing.schema.json";
