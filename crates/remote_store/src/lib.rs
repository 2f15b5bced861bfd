//! # Remote Store
//!
//! Control-plane access: HTTP key-value client with credential provider,
//! path layout resolution, ride id allocation, and retry helpers.
//!
//! The deployed store is a hierarchical JSON tree addressed by slash paths;
//! several historical path layouts are still live (see `contracts::PathLayout`).

mod allocator;
mod auth;
mod client;
mod mock;
mod resolver;
mod retry;

pub use allocator::next_ride_id;
pub use auth::{CredentialProvider, Credentials, PasswordCredentials, StaticToken};
pub use client::{HttpStore, HttpStoreConfig};
pub use mock::MockStore;
pub use resolver::{resolve, resolve_control, Resolution};
pub use retry::retry_with_backoff;
