//! Readiness gate consulted before every save and load.
//!
//! The gate is owned by whatever sequences the scene (intro cutscenes, level
//! streaming). The save system only ever reads it.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Predicate reporting whether the scene has finished initializing.
pub trait ReadinessGate: Send + Sync {
    fn is_ready(&self) -> bool;
}

impl<F> ReadinessGate for F
where
    F: Fn() -> bool + Send + Sync,
{
    fn is_ready(&self) -> bool {
        self()
    }
}

/// Gate that is always open. Used when a host has no sequencing step.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysReady;

impl ReadinessGate for AlwaysReady {
    fn is_ready(&self) -> bool {
        true
    }
}

/// Shared flag flipped by the sequencing collaborator.
///
/// Clones observe the same flag, so the sequencer keeps one clone and hands
/// another to the save system.
#[derive(Debug, Clone, Default)]
pub struct ReadyFlag {
    ready: Arc<AtomicBool>,
}

impl ReadyFlag {
    /// Creates a closed gate.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&self) {
        self.ready.store(true, Ordering::Release);
    }

    pub fn close(&self) {
        self.ready.store(false, Ordering::Release);
    }
}

impl ReadinessGate for ReadyFlag {
    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_clones_share_state() {
        let flag = ReadyFlag::new();
        let observer = flag.clone();
        assert!(!observer.is_ready());

        flag.open();
        assert!(observer.is_ready());

        flag.close();
        assert!(!observer.is_ready());
    }

    #[test]
    fn closures_are_gates() {
        let gate = || false;
        assert!(!gate.is_ready());
        assert!(AlwaysReady.is_ready());
    }
}
