//! Ride id allocation
//!
//! Read-then-decide without a distributed lock. A single physical device is
//! the only writer for its account in the deployed topology; concurrent
//! allocation against one account is a documented limitation, not a solved
//! problem (a server-side counter would be needed for multi-device accounts).

use contracts::{rides_path, AccountId, CoreError, RemoteStore, RideId};
use tracing::{debug, instrument};

/// Compute the next unused ride id for an account
///
/// Lists the existing ride collection (keys are allocated ids, not
/// necessarily contiguous) and returns `max + 1`, or `0` when the account
/// has no rides yet. Non-numeric keys are ignored.
#[instrument(name = "allocator_next_ride_id", skip(store), fields(account = %account))]
pub async fn next_ride_id<S: RemoteStore>(
    store: &S,
    account: &AccountId,
) -> Result<RideId, CoreError> {
    let path = rides_path(account);
    let document = store.get_json(&path).await?;

    let next = match document.as_ref().and_then(|d| d.as_object()) {
        None => 0,
        Some(rides) => rides
            .keys()
            .filter_map(|key| key.parse::<RideId>().ok())
            .max()
            .map(|max| max + 1)
            .unwrap_or(0),
    };

    debug!(account = %account, ride_id = next, "allocated ride id");
    Ok(next)
}
