//! The capture/restore contract implemented by persistable behaviors.

use std::sync::{Arc, RwLock};

use crate::capsule::StateCapsule;
use crate::error::CapsuleError;

/// A persistable behavior attached to an entity.
///
/// # Contract
///
/// - [`capture`](Capability::capture) is a pure function of current state and
///   records only what is needed to reconstruct behavior. Caches, lookups and
///   in-flight timers stay out unless the behavior depends on them.
/// - [`restore`](Capability::restore) applies a capsule produced by `capture`.
///   It may toggle visibility or enablement and re-derive dependent runtime
///   state (for example, move a body while collision response is suppressed).
///   Restoring the same capsule twice must leave the same observable state.
/// - A capsule of the wrong shape is a build or content defect. Return the
///   [`CapsuleError`] unchanged; callers treat it as fatal.
///
/// # Example
///
/// ```
/// use save_core::{Capability, CapsuleError, StateCapsule};
///
/// struct Battery {
///     charge: f32,
/// }
///
/// impl Capability for Battery {
///     fn kind(&self) -> &'static str {
///         "battery"
///     }
///
///     fn capture(&self) -> StateCapsule {
///         StateCapsule::builder().field("charge", self.charge).build()
///     }
///
///     fn restore(&mut self, capsule: &StateCapsule) -> Result<(), CapsuleError> {
///         self.charge = capsule.get_f32("charge")?;
///         Ok(())
///     }
/// }
/// ```
pub trait Capability: Send + Sync {
    /// Stable bundle key for this capability's capsules.
    ///
    /// Declared by the implementor and persisted verbatim; it must not be
    /// derived from the Rust type name.
    fn kind(&self) -> &'static str;

    fn capture(&self) -> StateCapsule;

    fn restore(&mut self, capsule: &StateCapsule) -> Result<(), CapsuleError>;
}

/// Shared handle to a capability.
///
/// The entity keeps one clone for persistence while gameplay code keeps
/// another to drive the behavior between saves.
pub type CapabilityHandle = Arc<RwLock<dyn Capability>>;

/// Wraps a capability so it can be attached to an entity and still be
/// reached by gameplay code.
pub fn shared<C: Capability>(capability: C) -> Arc<RwLock<C>> {
    Arc::new(RwLock::new(capability))
}
