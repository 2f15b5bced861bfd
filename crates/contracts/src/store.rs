//! RemoteStore trait - control plane access interface
//!
//! The remote store is a hierarchical JSON document tree. Writes are either a
//! full replace of a subtree (`put_json`) or a merge-patch of named fields
//! (`patch_json`) - never a positional array edit.

use serde_json::Value;

use crate::CoreError;

/// Remote key-value store access
///
/// Paths are slash-separated node paths without leading slash, e.g.
/// `users/{account}/rides/0/ride_data`.
#[trait_variant::make(RemoteStore: Send)]
pub trait LocalRemoteStore {
    /// Read the document at `path`.
    ///
    /// Returns `Ok(None)` for an explicit "not found" (null document), which
    /// callers treat differently from a malformed response.
    async fn get_json(&self, path: &str) -> Result<Option<Value>, CoreError>;

    /// Merge-patch named fields into the document at `path`
    async fn patch_json(&self, path: &str, value: &Value) -> Result<(), CoreError>;

    /// Replace the entire subtree at `path` in a single logical operation
    async fn put_json(&self, path: &str, value: &Value) -> Result<(), CoreError>;
}
