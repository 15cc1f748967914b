//! Cloudflare R2 storage for finished clips.
//!
//! This crate provides:
//! - The [`ObjectStore`] put-object contract the pipeline uploads through
//! - An R2 (S3 API) implementation
//! - Deterministic clip keys, content types and public URL derivation

pub mod client;
pub mod error;
pub mod keys;
pub mod store;

pub use client::{R2Client, R2Config};
pub use error::{StorageError, StorageResult};
pub use keys::{clip_key, content_type_for, public_url};
pub use store::ObjectStore;
