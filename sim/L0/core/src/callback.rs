//! User hooks a rigid body runs while syncing a step.
//!
//! Each hook type wraps one body-specific signature behind an `Arc`, so a
//! hook can be shared between bodies and the body keeps its `Debug` derive.
//! Hooks are `Fn`; state a hook mutates lives behind the caller's own cell.

use std::fmt;
use std::sync::Arc;

use body_contact::ContactEvent;
use body_server::DirectBodyState;

use crate::rigid_body::ContactDispatch;

/// Custom force integration for a rigid body.
///
/// Called once per step with the in-flight direct state, after the body has
/// mirrored the post-step transform and velocities and before contacts are
/// diffed. Velocity writes to the state are committed back to the server.
#[derive(Clone)]
pub struct IntegrateForcesFn(Arc<dyn Fn(&mut DirectBodyState) + Send + Sync>);

impl IntegrateForcesFn {
    /// Wrap a force-integration closure.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut DirectBodyState) + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Run the hook on `state`.
    pub fn call(&self, state: &mut DirectBodyState) {
        (self.0)(state);
    }
}

impl fmt::Debug for IntegrateForcesFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("IntegrateForcesFn(<fn>)")
    }
}

/// Handler for contact events, run while the contact monitor is locked.
///
/// The handler sees each event in dispatch order together with a
/// [`ContactDispatch`] through which it may read the monitor or request a
/// deferred monitor change.
#[derive(Clone)]
pub struct ContactHandlerFn(Arc<dyn Fn(&ContactEvent, &mut ContactDispatch<'_>) + Send + Sync>);

impl ContactHandlerFn {
    /// Wrap a contact handler closure.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&ContactEvent, &mut ContactDispatch<'_>) + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Run the handler for one event.
    pub fn call(&self, event: &ContactEvent, dispatch: &mut ContactDispatch<'_>) {
        (self.0)(event, dispatch);
    }
}

impl fmt::Debug for ContactHandlerFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ContactHandlerFn(<fn>)")
    }
}
