//! # Sync Engine
//!
//! Ride lifecycle and remote-control synchronization:
//!
//! - `ControlPoller` turns the remote control node into a de-duplicated,
//!   edge-detected event stream
//! - `TelemetryBuffer` accumulates rows for the active ride (with a durable
//!   write-through journal)
//! - `SyncEngine` drives the `Idle -> Active -> Finalizing -> Idle` state
//!   machine and the all-or-nothing finalize upload

mod buffer;
mod engine;
mod journal;
mod poller;

pub use buffer::TelemetryBuffer;
pub use engine::{EngineConfig, SyncEngine};
pub use journal::RideJournal;
pub use poller::{ControlEvent, ControlPoller};
