//! Loading aggregates from the log and recording the events commands produce.

use std::marker::PhantomData;

use common::AggregateId;
use event_store::{AppendOptions, EventEnvelope, EventStore, Version};

use crate::aggregate::{Aggregate, DomainEvent};
use crate::error::DomainError;

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult<A: Aggregate> {
    /// The aggregate after applying the new events.
    pub aggregate: A,

    /// The events that were recorded.
    pub events: Vec<A::Event>,

    pub new_version: Version,
}

/// Runs commands against one kind of aggregate stored in an [`EventStore`].
pub struct CommandHandler<S, A>
where
    S: EventStore,
    A: Aggregate,
{
    store: S,
    _phantom: PhantomData<A>,
}

impl<S, A> CommandHandler<S, A>
where
    S: EventStore,
    A: Aggregate,
{
    pub fn new(store: S) -> Self {
        Self {
            store,
            _phantom: PhantomData,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Rebuilds an aggregate by replaying its events.
    ///
    /// An aggregate without events comes back as `A::default()`.
    pub async fn load(&self, aggregate_id: AggregateId) -> Result<A, DomainError> {
        let envelopes = self.store.get_events_for_aggregate(aggregate_id).await?;
        replay(envelopes)
    }

    /// Like [`load`](Self::load) but `None` when the aggregate was never created.
    pub async fn load_existing(&self, aggregate_id: AggregateId) -> Result<Option<A>, DomainError> {
        let aggregate = self.load(aggregate_id).await?;
        Ok(aggregate.id().is_some().then_some(aggregate))
    }

    /// Loads the aggregate, runs the command on it and records the events.
    pub async fn execute<F>(
        &self,
        aggregate_id: AggregateId,
        command_fn: F,
    ) -> Result<CommandResult<A>, DomainError>
    where
        F: FnOnce(&A) -> Result<Vec<A::Event>, A::Error>,
        DomainError: From<A::Error>,
    {
        let aggregate = self.load(aggregate_id).await?;
        let events = command_fn(&aggregate)?;
        self.commit(aggregate_id, aggregate, events).await
    }

    /// Records events computed from an aggregate the caller already holds.
    ///
    /// The append expects the stream to still be at `aggregate.version()`, so
    /// the events only land if nobody wrote to the aggregate since it was read.
    pub async fn commit(
        &self,
        aggregate_id: AggregateId,
        mut aggregate: A,
        events: Vec<A::Event>,
    ) -> Result<CommandResult<A>, DomainError> {
        let current_version = aggregate.version();

        if events.is_empty() {
            return Ok(CommandResult {
                aggregate,
                events,
                new_version: current_version,
            });
        }

        let envelopes = build_envelopes::<A>(aggregate_id, current_version, &events)?;
        let new_version = self
            .store
            .append(envelopes, AppendOptions::expect_version(current_version))
            .await?;

        aggregate.apply_events(events.iter().cloned());
        aggregate.set_version(new_version);

        Ok(CommandResult {
            aggregate,
            events,
            new_version,
        })
    }
}

/// Events for several aggregates that are recorded together or not at all.
///
/// Each staged batch expects its aggregate to still be at the version it was
/// read at, so one stale aggregate rejects the whole unit.
#[derive(Debug, Default)]
pub struct UnitOfWork {
    batches: Vec<(Vec<EventEnvelope>, AppendOptions)>,
}

impl UnitOfWork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages `events` produced by a command on `aggregate`.
    pub fn stage<A: Aggregate>(
        &mut self,
        aggregate_id: AggregateId,
        aggregate: &A,
        events: &[A::Event],
    ) -> Result<(), DomainError> {
        if events.is_empty() {
            return Ok(());
        }

        let current_version = aggregate.version();
        let envelopes = build_envelopes::<A>(aggregate_id, current_version, events)?;
        self.batches
            .push((envelopes, AppendOptions::expect_version(current_version)));
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    /// Appends every staged batch in one store write.
    pub async fn commit<S: EventStore>(self, store: &S) -> Result<(), DomainError> {
        if self.batches.is_empty() {
            return Ok(());
        }
        store.append_batches(self.batches).await?;
        Ok(())
    }
}

/// Folds stored envelopes into a fresh aggregate.
pub fn replay<A: Aggregate>(envelopes: Vec<EventEnvelope>) -> Result<A, DomainError> {
    let mut aggregate = A::default();
    for envelope in envelopes {
        let event: A::Event = envelope.decode()?;
        aggregate.apply(event);
        aggregate.set_version(envelope.version);
    }
    Ok(aggregate)
}

fn build_envelopes<A: Aggregate>(
    aggregate_id: AggregateId,
    current_version: Version,
    events: &[A::Event],
) -> Result<Vec<EventEnvelope>, DomainError> {
    let mut envelopes = Vec::with_capacity(events.len());
    let mut version = current_version;

    for event in events {
        version = version.next();
        let envelope = EventEnvelope::builder()
            .aggregate_id(aggregate_id)
            .aggregate_type(A::aggregate_type())
            .event_type(event.event_type())
            .version(version)
            .payload(event)?
            .build()?;
        envelopes.push(envelope);
    }

    Ok(envelopes)
}
