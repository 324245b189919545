pub mod detail_collector;
pub mod list_collector;
pub mod state;

use std::time::Duration;

/// Fixed pause between consecutive requests. Politeness towards the portal,
/// not a retry mechanism.
pub(crate) async fn pause(delay_ms: u64) {
    if delay_ms > 0 {
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }
}
