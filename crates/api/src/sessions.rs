//! Customer cart sessions.
//!
//! Carts live only in memory. A session that sits untouched for longer than
//! the idle timeout is dropped, and once `capacity` sessions are open the
//! least recently used one makes room for the next.

use std::collections::HashMap;
use std::time::Duration;

use domain::{Cart, CartLine};
use tokio::sync::RwLock;
use tokio::time::Instant;
use uuid::Uuid;

/// Identifies one customer's cart.
pub type SessionId = Uuid;

pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(2 * 60 * 60);
pub const DEFAULT_CAPACITY: usize = 10_000;

struct Session {
    cart: Cart,
    last_seen: Instant,
}

pub struct Sessions {
    carts: RwLock<HashMap<SessionId, Session>>,
    idle_timeout: Duration,
    capacity: usize,
}

impl Sessions {
    pub fn new(idle_timeout: Duration, capacity: usize) -> Self {
        Self {
            carts: RwLock::new(HashMap::new()),
            idle_timeout,
            capacity: capacity.max(1),
        }
    }

    /// Opens an empty cart, dropping idle sessions first.
    pub async fn open(&self) -> SessionId {
        let now = Instant::now();
        let mut carts = self.carts.write().await;

        let before = carts.len();
        carts.retain(|_, session| now.duration_since(session.last_seen) < self.idle_timeout);
        let expired = before - carts.len();
        if expired > 0 {
            metrics::counter!("sessions_expired_total").increment(expired as u64);
            tracing::debug!(expired, "idle sessions dropped");
        }

        if carts.len() >= self.capacity {
            let oldest = carts
                .iter()
                .min_by_key(|(_, session)| session.last_seen)
                .map(|(id, _)| *id);
            if let Some(oldest) = oldest {
                carts.remove(&oldest);
                metrics::counter!("sessions_evicted_total").increment(1);
                tracing::warn!(session = %oldest, "session limit reached, evicted oldest");
            }
        }

        let id = Uuid::new_v4();
        carts.insert(
            id,
            Session {
                cart: Cart::new(),
                last_seen: now,
            },
        );
        id
    }

    /// Runs `f` against the session's cart and marks the session as used.
    ///
    /// Returns `None` for unknown sessions and for sessions that have been
    /// idle past the timeout; the latter are removed on the spot.
    pub async fn with_cart<T>(&self, id: SessionId, f: impl FnOnce(&mut Cart) -> T) -> Option<T> {
        let now = Instant::now();
        let mut carts = self.carts.write().await;
        let session = carts.get_mut(&id)?;
        if now.duration_since(session.last_seen) >= self.idle_timeout {
            carts.remove(&id);
            return None;
        }
        session.last_seen = now;
        Some(f(&mut session.cart))
    }

    /// Takes the submitted units out of the cart.
    ///
    /// Units added after the snapshot was taken stay in the cart.
    pub async fn remove_submitted(&self, id: SessionId, submitted: &[CartLine]) {
        self.with_cart(id, |cart| {
            for line in submitted {
                for _ in 0..line.quantity {
                    cart.remove(line.product_id);
                }
            }
        })
        .await;
    }

    pub async fn len(&self) -> usize {
        self.carts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.carts.read().await.is_empty()
    }
}

impl Default for Sessions {
    fn default() -> Self {
        Self::new(DEFAULT_IDLE_TIMEOUT, DEFAULT_CAPACITY)
    }
}
