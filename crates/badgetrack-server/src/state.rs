use std::sync::Arc;

use badgetrack_core::{
    config::Config, recorder::VisitRecorder, stats::StatsAggregator, store::Counters,
    store::KvStore,
};

/// Shared application state injected into every Axum handler via
/// [`axum::extract::State`].
///
/// The store is the only shared mutable resource; it is injected here as a
/// trait object so the in-memory backend (or any other `KvStore`) can be
/// swapped in without touching the handlers.
pub struct AppState {
    pub config: Arc<Config>,
    pub recorder: VisitRecorder,
    pub stats: StatsAggregator,
}

impl AppState {
    pub fn new(store: Arc<dyn KvStore>, config: Config) -> Self {
        let counters = Counters::new(store);
        Self {
            config: Arc::new(config),
            recorder: VisitRecorder::new(counters.clone()),
            stats: StatsAggregator::new(counters),
        }
    }
}
