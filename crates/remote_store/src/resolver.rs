//! Ordered path layout resolution
//!
//! Probes each layout's control node in priority order and accepts the first
//! structurally valid answer. A malformed answer from a higher-priority
//! layout is surfaced as `Ambiguous`, never skipped: falling through could
//! target the wrong account's legacy data.

use contracts::{
    AccountId, ControlIntent, CoreError, PathLayout, RemotePathSet, RemoteStore, RideId,
};
use tracing::{debug, instrument, warn};

/// Outcome of a layout probe sequence
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// A layout answered with a valid control document
    Resolved {
        paths: RemotePathSet,
        intent: ControlIntent,
    },
    /// A higher-priority layout answered with a malformed document
    Ambiguous { layout: PathLayout, reason: String },
    /// No layout has a control node for this account/ride
    NotFound,
}

/// Resolve the authoritative path set for (account, ride)
///
/// Pure function of its inputs plus the static layout templates. Transport
/// errors propagate; the caller decides whether to retry.
#[instrument(name = "resolver_resolve", skip(store), fields(account = %account, ride = ?ride))]
pub async fn resolve<S: RemoteStore>(
    store: &S,
    account: &AccountId,
    ride: Option<RideId>,
) -> Result<Resolution, CoreError> {
    for layout in PathLayout::PROBE_ORDER {
        let Some(paths) = RemotePathSet::from_layout(layout, account, ride) else {
            // Layout needs a ride id we do not have; skip by design, this is
            // not a probe failure.
            continue;
        };

        match store.get_json(&paths.control).await? {
            None => {
                debug!(layout = %layout, "control node absent, trying next layout");
                continue;
            }
            Some(document) => match ControlIntent::from_document(&document) {
                Ok(intent) => {
                    debug!(layout = %layout, "layout resolved");
                    metrics::counter!("ride_syncer_layout_resolved_total", "layout" => layout.to_string())
                        .increment(1);
                    return Ok(Resolution::Resolved { paths, intent });
                }
                Err(shape) => {
                    warn!(layout = %layout, reason = %shape, "malformed control document");
                    metrics::counter!("ride_syncer_layout_ambiguous_total", "layout" => layout.to_string())
                        .increment(1);
                    return Ok(Resolution::Ambiguous {
                        layout,
                        reason: shape.to_string(),
                    });
                }
            },
        }
    }

    Ok(Resolution::NotFound)
}

/// Resolve and return only the control intent, requiring an unambiguous layout
///
/// Convenience wrapper for callers that treat `Ambiguous` as an error and
/// `NotFound` as "no intent yet".
pub async fn resolve_control<S: RemoteStore>(
    store: &S,
    account: &AccountId,
    ride: Option<RideId>,
) -> Result<Option<(RemotePathSet, ControlIntent)>, CoreError> {
    match resolve(store, account, ride).await? {
        Resolution::Resolved { paths, intent } => Ok(Some((paths, intent))),
        Resolution::Ambiguous { layout, reason } => {
            Err(CoreError::layout_ambiguous(layout.to_string(), reason))
        }
        Resolution::NotFound => Ok(None),
    }
}
