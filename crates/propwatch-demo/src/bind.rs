#![forbid(unsafe_code)]

//! Scope-bound observation for display elements.
//!
//! The core hands out manual [`Subscription`] tokens. A [`Binding`] owns one
//! and invalidates it when the binding is released or dropped, so a display
//! element can never outlive its observation.

use propwatch_core::{ChangeEvent, ObservableProperty, Subscription};
use tracing::trace;

/// A named subscription that is cancelled on drop.
#[derive(Debug)]
pub struct Binding {
    label: &'static str,
    subscription: Option<Subscription>,
}

impl Binding {
    /// Observe `property` on behalf of the element called `label`.
    pub fn new<T>(
        label: &'static str,
        property: &ObservableProperty<T>,
        on_change: impl Fn(&ChangeEvent<T>) + 'static,
    ) -> Self
    where
        T: Clone + 'static,
    {
        trace!(label, "binding");
        Self {
            label,
            subscription: Some(property.observe(on_change)),
        }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        self.label
    }

    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.subscription.as_ref().is_some_and(Subscription::is_active)
    }

    /// Cancel now instead of at drop. Idempotent.
    pub fn release(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.invalidate();
            trace!(label = self.label, "binding released");
        }
    }
}

impl Drop for Binding {
    fn drop(&mut self) {
        self.release();
    }
}
