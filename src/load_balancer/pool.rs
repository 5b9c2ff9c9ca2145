//! Backend pool and dispatcher.
//!
//! # Responsibilities
//! - Own the ordered, fixed-size backend pool
//! - Pick the next live backend via round-robin
//! - Report `AllBackendsDown` instead of spinning when nothing is alive

use std::sync::Arc;

use crate::load_balancer::backend::Backend;
use crate::load_balancer::round_robin::RoundRobin;

/// Dispatch failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    /// A dispatcher needs at least one backend.
    #[error("backend pool is empty")]
    EmptyPool,

    /// A full rotation found no live backend.
    #[error("all backends are down ({probed} probed)")]
    AllBackendsDown { probed: usize },
}

/// Selects which backend handles each request.
#[derive(Debug)]
pub struct Dispatcher {
    backends: Vec<Arc<dyn Backend>>,
    rotation: RoundRobin,
}

impl Dispatcher {
    /// Create a dispatcher over a non-empty pool, cursor at zero.
    pub fn new(backends: Vec<Arc<dyn Backend>>) -> Result<Self, DispatchError> {
        if backends.is_empty() {
            return Err(DispatchError::EmptyPool);
        }

        Ok(Self {
            backends,
            rotation: RoundRobin::new(),
        })
    }

    /// Select the next live backend in rotation order.
    ///
    /// Each call advances the cursor once per slot it visits, so dead backends still
    /// consume their turn. At most `len()` slots are probed.
    pub fn select_next(&self) -> Result<Arc<dyn Backend>, DispatchError> {
        match self.rotation.select(&self.backends, |b| b.is_alive()) {
            Some(index) => Ok(Arc::clone(&self.backends[index])),
            None => {
                tracing::debug!(backend_count = self.backends.len(), "No live backend in pool");
                for b in &self.backends {
                    tracing::debug!(address = %b.address(), alive = b.is_alive(), "Backend status");
                }
                Err(DispatchError::AllBackendsDown {
                    probed: self.backends.len(),
                })
            }
        }
    }

    /// The pool, in rotation order.
    pub fn backends(&self) -> &[Arc<dyn Backend>] {
        &self.backends
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    /// Always false; construction rejects an empty pool.
    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    /// Snapshot of the rotation cursor.
    pub fn cursor(&self) -> u64 {
        self.rotation.cursor()
    }
}
