//! Periodic housekeeping: hotspot re-detection, idle expiry and stopped-session pruning

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::state::AppState;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshReport {
    pub hotspots: usize,
    pub expired_sessions: usize,
    pub pruned_sessions: usize,
    pub pruned_histories: usize,
}

/// One refresh pass at `now`
pub async fn refresh_once(state: &AppState, now: DateTime<Utc>) -> RefreshReport {
    let idle = chrono::Duration::seconds(state.config.idle_timeout_secs);
    let retention = chrono::Duration::seconds(state.config.session_retention_secs);

    let hotspots = state.hotspots.write().await.detect(now).len();
    let pruned_histories = state.behavior.write().await.prune_idle(idle, now);

    let (expired, pruned_sessions) = {
        let mut tracking = state.tracking.write().await;
        let expired = tracking.expire_idle(idle, now);
        let pruned = tracking.prune_stopped(retention, now);
        (expired, pruned)
    };
    state.publish(&expired).await;

    RefreshReport {
        hotspots,
        expired_sessions: expired.len(),
        pruned_sessions,
        pruned_histories,
    }
}

pub fn start_background_refresh(state: AppState) -> JoinHandle<()> {
    let period = Duration::from_secs(state.config.hotspot_refresh_secs.max(1));
    info!("Starting background refresh every {:?}", period);

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            let report = refresh_once(&state, Utc::now()).await;
            debug!(?report, "background refresh complete");
        }
    })
}
