//! Sequence recovery
//!
//! Finds the highest sequence already persisted so a restarted producer
//! continues numbering instead of overwriting earlier documents. Recovery
//! never fails: any problem degrades to starting from zero.

use std::time::Duration;

use agrosense_store::{DocumentStore, StoreError, SEQUENCE_FIELD};
use tracing::{info, warn};

/// Last sequence used by an earlier run, or 0.
///
/// The store call is bounded by `timeout`. Errors and timeouts are logged as
/// warnings because resuming from 0 over existing data reuses document ids.
pub async fn recover(store: &dyn DocumentStore, timeout: Duration) -> u64 {
    let outcome = match tokio::time::timeout(timeout, store.query_max(SEQUENCE_FIELD)).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::Timeout(timeout)),
    };

    match outcome {
        Ok(Some(last)) => {
            info!(sequence = last.sequence, "resuming after last stored reading");
            last.sequence
        }
        Ok(None) => {
            info!("no previous readings found, starting fresh");
            0
        }
        Err(e) => {
            warn!(
                error = %e,
                "sequence recovery failed, starting from 0; documents from earlier runs may be overwritten"
            );
            0
        }
    }
}
