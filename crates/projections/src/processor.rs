//! Projection processor for feeding events to projections.

use event_store::EventStore;
use futures_util::StreamExt;
use tokio::sync::Mutex;

use crate::Result;
use crate::projection::Projection;

/// Feeds stored events to the registered projections.
///
/// - Catch-up: streams the log and delivers every event a projection has not
///   seen yet, so it can be called after each write to bring views current
/// - Rebuild: resets all projections and replays from scratch
///
/// Catch-up runs are serialized so no event is delivered twice.
pub struct ProjectionProcessor<S: EventStore> {
    store: S,
    projections: Vec<Box<dyn Projection>>,
    running: Mutex<()>,
}

impl<S: EventStore> ProjectionProcessor<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            projections: Vec::new(),
            running: Mutex::new(()),
        }
    }

    pub fn register(&mut self, projection: Box<dyn Projection>) {
        self.projections.push(projection);
    }

    /// Delivers every stored event each projection is missing.
    ///
    /// Returns the number of deliveries made.
    #[tracing::instrument(skip(self))]
    pub async fn run_catch_up(&self) -> Result<u64> {
        let _running = self.running.lock().await;
        let mut stream = self.store.stream_all_events().await?;
        let mut delivered: u64 = 0;

        while let Some(result) = stream.next().await {
            let event = result?;

            for projection in &self.projections {
                if !projection.position().await.has_seen(event.position) {
                    projection.handle(&event).await?;
                    delivered += 1;
                    metrics::counter!("projections_events_processed").increment(1);
                }
            }
        }

        if delivered > 0 {
            tracing::debug!(delivered, "catch-up complete");
        }

        Ok(delivered)
    }

    /// Resets all projections and replays all events from the store.
    #[tracing::instrument(skip(self))]
    pub async fn rebuild_all(&self) -> Result<()> {
        for projection in &self.projections {
            tracing::info!(projection = projection.name(), "rebuilding projection");
            projection.reset().await?;
        }
        self.run_catch_up().await?;
        Ok(())
    }
}
