//! # Ingestion
//!
//! Sensor sampling at the collaborator boundary.
//!
//! A fixed-rate sampler snapshots the latest motion/position/frame values
//! into immutable `TelemetrySample`s and fans them into a bounded channel.
//! Remote I/O never runs on the sampling path; the only network call here
//! (speed-limit lookup) is rate-limited and its result cached between
//! refreshes.

mod mock;
mod replay;
mod sampler;
mod speed_limit;

pub use mock::{FixedSpeedLimit, MockFrameSource, MockMotionSource, MockPositionSource};
pub use replay::{ReplayConfig, ReplayFeed, ReplayHandle};
pub use sampler::{Sampler, SamplerHandle};
pub use speed_limit::HttpSpeedLimitLookup;
