//! # Contracts
//!
//! Frozen interface contracts (ICD), defining inter-module data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Uses device wall-clock epoch milliseconds (i64) as primary clock
//! - Row ordering within a ride is capture order, never re-sorted

mod blueprint;
mod control;
mod error;
mod hazard;
mod paths;
mod row;
mod runtime_config;
mod sample;
mod sink;
mod sources;
mod store;

pub use blueprint::*;
pub use control::*;
pub use error::*;
pub use hazard::*;
pub use paths::*;
pub use row::*;
pub use runtime_config::*;
pub use sample::*;
pub use sink::*;
pub use sources::{FrameSource, MotionSource, PositionSource, SpeedLimitLookup};
pub use store::RemoteStore;
