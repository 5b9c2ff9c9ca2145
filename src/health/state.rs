//! Liveness predicates.
//!
//! # States
//! - Alive: backend takes part in rotation
//! - Down: backend slot is consumed by the scan but never selected
//!
//! A predicate never fails. Anything that cannot decide reports alive.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

/// Decides whether a backend should currently receive traffic.
pub trait Liveness: Send + Sync + fmt::Debug {
    /// Returns the current liveness. Must be side-effect free.
    fn is_alive(&self) -> bool;
}

/// Predicate that reports every backend alive.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysAlive;

impl Liveness for AlwaysAlive {
    fn is_alive(&self) -> bool {
        true
    }
}

/// A static on/off flag.
///
/// Flipped by whoever owns it (configuration, an embedding application, tests).
/// Nothing in the proxy flips it on its own.
#[derive(Debug)]
pub struct LivenessSwitch {
    alive: AtomicBool,
}

impl LivenessSwitch {
    pub fn new(alive: bool) -> Self {
        Self {
            alive: AtomicBool::new(alive),
        }
    }

    /// Put the backend back into rotation.
    pub fn mark_alive(&self) {
        self.alive.store(true, Ordering::Relaxed);
    }

    /// Take the backend out of rotation.
    pub fn mark_down(&self) {
        self.alive.store(false, Ordering::Relaxed);
    }

    pub fn set(&self, alive: bool) {
        self.alive.store(alive, Ordering::Relaxed);
    }
}

impl Default for LivenessSwitch {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Liveness for LivenessSwitch {
    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Relaxed)
    }
}
