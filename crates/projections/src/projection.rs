//! Core projection trait and position tracking.

use async_trait::async_trait;
use event_store::EventEnvelope;

use crate::Result;

/// The last log position a projection has folded in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct ProjectionPosition {
    pub last_position: u64,
}

impl ProjectionPosition {
    pub fn zero() -> Self {
        Self { last_position: 0 }
    }

    /// Moves forward to `position`. Never moves backwards.
    pub fn advance_to(&self, position: u64) -> Self {
        Self {
            last_position: self.last_position.max(position),
        }
    }

    /// Whether the event at `position` is already reflected.
    pub fn has_seen(&self, position: u64) -> bool {
        position <= self.last_position
    }
}

impl std::fmt::Display for ProjectionPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "position({})", self.last_position)
    }
}

/// A projection that folds stored events into a read model.
#[async_trait]
pub trait Projection: Send + Sync {
    fn name(&self) -> &'static str;

    /// Handles a single event, updating the projection's read model.
    ///
    /// Events the projection does not care about still advance its position.
    async fn handle(&self, event: &EventEnvelope) -> Result<()>;

    async fn position(&self) -> ProjectionPosition;

    /// Clears the read model and rewinds to the start of the log.
    async fn reset(&self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_starts_at_zero() {
        let pos = ProjectionPosition::zero();
        assert_eq!(pos.last_position, 0);
        assert!(!pos.has_seen(1));
    }

    #[test]
    fn position_only_moves_forward() {
        let pos = ProjectionPosition::zero().advance_to(5);
        assert!(pos.has_seen(5));
        assert!(!pos.has_seen(6));
        assert_eq!(pos.advance_to(3), pos);
    }

    #[test]
    fn position_display() {
        let pos = ProjectionPosition { last_position: 42 };
        assert_eq!(pos.to_string(), "position(42)");
    }
}
