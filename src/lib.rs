//! # Configuration drift checker
//!
//! Authenticates against the cloud management API, fetches the live
//! configuration of a group or a single device, and compares it with a
//! template or a previously saved snapshot.
//!
//! Modules:
//! - `cache`: persisted credential record and its stores
//! - `sources`: transport capability, token lifecycle, configuration API client
//! - `exemptions`: removal of exempt blocks and lines before comparison
//! - `diff`: canonical form and unified line diff
//! - `runner`: the end-to-end check and its exit statuses

pub mod cache;
pub mod config;
pub mod diff;
pub mod error;
pub mod exemptions;
pub mod helpers;
pub mod report;
pub mod runner;
pub mod sources;
pub mod tests;
pub mod utils;

pub use crate::error::{AuthError, DriftError, DriftResult, TransportError};
