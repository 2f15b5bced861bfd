//! Remote path layouts
//!
//! Several schema generations are still live on deployed accounts. Paths are
//! built verbatim from these static templates; nothing is synthesized from
//! probe responses.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::RideId;

/// One historical remote schema convention
///
/// Probe order is ride-scoped first, then the legacy per-user tree, then the
/// oldest top-level tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathLayout {
    /// `users/{account}/rides/{ride}/...` (current)
    RideScoped,
    /// `users/{account}/rider_control/...`
    LegacyPerUser,
    /// `{account}/ride_control/...` (oldest)
    LegacyTopLevel,
}

impl PathLayout {
    /// Deterministic probe order, highest priority first
    pub const PROBE_ORDER: [PathLayout; 3] = [
        PathLayout::RideScoped,
        PathLayout::LegacyPerUser,
        PathLayout::LegacyTopLevel,
    ];

    /// Control node path for this layout
    ///
    /// Returns `None` for the ride-scoped layout when no ride id is supplied.
    pub fn control_path(self, account: &str, ride: Option<RideId>) -> Option<String> {
        match self {
            PathLayout::RideScoped => {
                let ride = ride?;
                Some(format!("users/{account}/rides/{ride}/rider_control/ride_status"))
            }
            PathLayout::LegacyPerUser => Some(format!("users/{account}/rider_control/ride_status")),
            PathLayout::LegacyTopLevel => Some(format!("{account}/ride_control/ride_status")),
        }
    }

    fn ride_data_path(self, account: &str, ride: Option<RideId>) -> Option<String> {
        match self {
            PathLayout::RideScoped => {
                let ride = ride?;
                Some(format!("users/{account}/rides/{ride}/ride_data"))
            }
            PathLayout::LegacyPerUser => Some(format!("users/{account}/ride_data")),
            PathLayout::LegacyTopLevel => Some(format!("{account}/ride_data")),
        }
    }

    fn image_root_path(self, account: &str, ride: Option<RideId>) -> Option<String> {
        match self {
            PathLayout::RideScoped => {
                let ride = ride?;
                Some(format!("users/{account}/rides/{ride}/ride_images_base64"))
            }
            PathLayout::LegacyPerUser => Some(format!("users/{account}/ride_images")),
            PathLayout::LegacyTopLevel => Some(format!("{account}/ride_images")),
        }
    }
}

impl fmt::Display for PathLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PathLayout::RideScoped => "ride_scoped",
            PathLayout::LegacyPerUser => "legacy_per_user",
            PathLayout::LegacyTopLevel => "legacy_top_level",
        };
        f.write_str(name)
    }
}

/// Resolved concrete remote locations for one (account, ride) pair
///
/// Cached for the lifetime of a ride once resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemotePathSet {
    /// Layout the paths were built from
    pub layout: PathLayout,

    /// Control node (`ride_status` document)
    pub control: String,

    /// Ride data collection (bulk-replaced at finalize)
    pub ride_data: String,

    /// Image node prefix; blobs live at `{image_root}/{timestamp_key}`
    pub image_root: String,

    /// Live feed node (layout-independent)
    pub rider_data: String,
}

impl RemotePathSet {
    /// Build the path set for a layout from the static templates
    ///
    /// Returns `None` when the layout needs a ride id and none was supplied.
    pub fn from_layout(layout: PathLayout, account: &str, ride: Option<RideId>) -> Option<Self> {
        Some(Self {
            layout,
            control: layout.control_path(account, ride)?,
            ride_data: layout.ride_data_path(account, ride)?,
            image_root: layout.image_root_path(account, ride)?,
            rider_data: rider_data_path(account),
        })
    }

    /// Image blob path for a timestamp key within this path set
    ///
    /// Keys are made store-safe the way existing writers do ('.' -> '_').
    pub fn image_path(&self, timestamp_key: &str) -> String {
        let key = timestamp_key.replace('.', "_");
        format!("{}/{key}", self.image_root)
    }
}

/// Live rider data node, shared by every layout generation
pub fn rider_data_path(account: &str) -> String {
    format!("users/{account}/rider_data")
}

/// Ride collection listing path (allocator input)
pub fn rides_path(account: &str) -> String {
    format!("users/{account}/rides")
}
