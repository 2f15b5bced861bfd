//! ControlIntent - remote ride control flags
//!
//! Read from, and partially written back to, the control plane.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Ride identifier: non-negative, unique within an account, monotonically
/// allocated, never reused.
pub type RideId = u64;

/// Account identifier (opaque, never mutated by this core)
pub type AccountId = String;

/// Remote-supplied control directives for one account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ControlIntent {
    /// Whether a ride should be recording
    pub is_active: bool,

    /// One-shot finalize/compute trigger; the device clears the remote flag
    /// after honoring it
    #[serde(rename = "calculate_model")]
    pub compute_requested: bool,
}

/// Shape violation in a remote ride_status document
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct MalformedControl(pub String);

impl ControlIntent {
    /// Parse a remote `ride_status` document.
    ///
    /// Missing boolean fields default to `false` (older writers omit
    /// `calculate_model`); a present-but-non-boolean field or a non-object
    /// document is a shape violation, reported distinctly so the caller can
    /// refuse to fall through to a lower-priority layout.
    pub fn from_document(value: &Value) -> Result<Self, MalformedControl> {
        let object = value
            .as_object()
            .ok_or_else(|| MalformedControl(format!("expected object, got {}", type_name(value))))?;

        Ok(Self {
            is_active: bool_field(object, "is_active")?,
            compute_requested: bool_field(object, "calculate_model")?,
        })
    }
}

fn bool_field(
    object: &serde_json::Map<String, Value>,
    field: &str,
) -> Result<bool, MalformedControl> {
    match object.get(field) {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(other) => Err(MalformedControl(format!(
            "field '{field}' expected boolean, got {}",
            type_name(other)
        ))),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Ride lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RideState {
    /// No ride active
    #[default]
    Idle,
    /// Collecting samples
    Active,
    /// Draining and uploading
    Finalizing,
}
