use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    AggregateId, EventEnvelope, EventStoreError, Result, Version,
    store::{AppendOptions, EventStore, EventStream, validate_events_for_append},
};

#[derive(Default)]
struct Log {
    /// Every event in append order; `events[i].position == i + 1`.
    events: Vec<EventEnvelope>,
    /// Indices into `events`, per aggregate, in version order.
    streams: HashMap<AggregateId, Vec<usize>>,
}

impl Log {
    fn version_of(&self, aggregate_id: AggregateId) -> Version {
        self.streams
            .get(&aggregate_id)
            .and_then(|indices| indices.last())
            .map(|&i| self.events[i].version)
            .unwrap_or_else(Version::initial)
    }

    /// Fails with `ConcurrencyConflict` unless `events` continue the stream
    /// they target at the version `options` expects.
    fn check(&self, events: &[EventEnvelope], options: &AppendOptions) -> Result<()> {
        let aggregate_id = events[0].aggregate_id;
        let current = self.version_of(aggregate_id);

        if let Some(expected) = options.expected_version
            && current != expected
        {
            return Err(EventStoreError::ConcurrencyConflict {
                aggregate_id,
                expected,
                actual: current,
            });
        }

        if events[0].version != current.next() {
            return Err(EventStoreError::ConcurrencyConflict {
                aggregate_id,
                expected: events[0].version,
                actual: current,
            });
        }

        Ok(())
    }

    /// Appends a checked batch, assigning log positions. Returns the last version.
    fn push(&mut self, events: Vec<EventEnvelope>) -> Version {
        let mut last = Version::initial();
        for mut event in events {
            let index = self.events.len();
            event.position = index as u64 + 1;
            last = event.version;
            self.streams.entry(event.aggregate_id).or_default().push(index);
            self.events.push(event);
        }
        last
    }

    fn select(&self, predicate: impl Fn(&EventEnvelope) -> bool) -> Vec<EventEnvelope> {
        self.events
            .iter()
            .filter(|e| predicate(e))
            .cloned()
            .collect()
    }
}

/// The process-wide event log. Cloning shares the same log.
#[derive(Clone, Default)]
pub struct InMemoryEventStore {
    log: Arc<RwLock<Log>>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of events stored.
    pub async fn event_count(&self) -> usize {
        self.log.read().await.events.len()
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn append(&self, events: Vec<EventEnvelope>, options: AppendOptions) -> Result<Version> {
        validate_events_for_append(&events)?;

        let aggregate_id = events[0].aggregate_id;
        let count = events.len();
        let mut log = self.log.write().await;
        log.check(&events, &options)?;
        let last = log.push(events);

        metrics::counter!("event_store_events_appended").increment(count as u64);
        tracing::debug!(%aggregate_id, version = %last, count, "events appended");

        Ok(last)
    }

    async fn append_batches(&self, batches: Vec<(Vec<EventEnvelope>, AppendOptions)>) -> Result<()> {
        let mut targets = HashSet::with_capacity(batches.len());
        for (events, _) in &batches {
            validate_events_for_append(events)?;
            if !targets.insert(events[0].aggregate_id) {
                return Err(EventStoreError::InvalidAppend(format!(
                    "aggregate {} appears in more than one batch",
                    events[0].aggregate_id
                )));
            }
        }

        let mut log = self.log.write().await;
        for (events, options) in &batches {
            log.check(events, options)?;
        }

        let aggregates = batches.len();
        let mut count = 0;
        for (events, _) in batches {
            count += events.len();
            log.push(events);
        }

        metrics::counter!("event_store_events_appended").increment(count as u64);
        tracing::debug!(aggregates, count, "batches appended");

        Ok(())
    }

    async fn get_events_for_aggregate(
        &self,
        aggregate_id: AggregateId,
    ) -> Result<Vec<EventEnvelope>> {
        let log = self.log.read().await;
        let events = log
            .streams
            .get(&aggregate_id)
            .map(|indices| indices.iter().map(|&i| log.events[i].clone()).collect())
            .unwrap_or_default();
        Ok(events)
    }

    async fn get_events_by_type(&self, event_type: &str) -> Result<Vec<EventEnvelope>> {
        Ok(self.log.read().await.select(|e| e.event_type == event_type))
    }

    async fn get_events_by_aggregate_type(
        &self,
        aggregate_type: &str,
    ) -> Result<Vec<EventEnvelope>> {
        Ok(self
            .log
            .read()
            .await
            .select(|e| e.aggregate_type == aggregate_type))
    }

    async fn stream_all_events(&self) -> Result<EventStream> {
        use futures_util::stream;

        let events = self.log.read().await.events.clone();
        Ok(Box::pin(stream::iter(events.into_iter().map(Ok))))
    }
}
