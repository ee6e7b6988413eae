#![forbid(unsafe_code)]

//! Observable property with synchronous change delivery and manual
//! subscription tokens.
//!
//! # Design
//!
//! [`ObservableProperty<T>`] keeps its value and subscriber list in shared,
//! reference-counted storage (`Rc<RefCell<..>>`). Every assignment builds a
//! [`ChangeEvent`] and hands it to each live subscriber in registration order
//! before `set` returns.
//!
//! A [`Subscription`] holds only a `Weak` back-reference to the property, so
//! it never keeps the property alive. Dropping a `Subscription` does **not**
//! cancel it: the token must be invalidated explicitly. Callers that want
//! scope-bound observation wrap the token in their own guard.
//!
//! # Delivery
//!
//! The subscriber list is snapshotted at the start of each notification
//! pass and no borrow is held while callbacks run, so a callback may freely
//! call `get`, `set`, `observe` or `cancel` on the same property:
//!
//! - a nested `set` runs its whole pass before the outer pass resumes;
//! - a subscriber added mid-pass only sees later assignments;
//! - a subscriber cancelled mid-pass is skipped for the rest of the pass.
//!
//! # Performance
//!
//! | Operation     | Complexity                 |
//! |---------------|----------------------------|
//! | `get()`       | O(1) + clone of `T`        |
//! | `set()`       | O(S) where S = subscribers |
//! | `observe()`   | O(1) amortized             |
//! | `cancel()`    | O(S)                       |
//!
//! # Failure Modes
//!
//! - **Mutation from `with`/`update` closures**: the value is borrowed while
//!   those closures run; calling `set`, `observe` or `cancel` on the same
//!   property from inside them panics (RefCell borrow rules).
//! - **Forgotten tokens**: a `Subscription` that is dropped without being
//!   invalidated keeps its callback registered for the life of the property.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{debug, trace};

type Callback<T> = Rc<dyn Fn(&ChangeEvent<T>)>;

/// Identifier of one registration, unique within its property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A single assignment, as seen by subscribers.
///
/// Built once per `set`/`update` and dropped after delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent<T> {
    pub old_value: T,
    pub new_value: T,
}

struct Subscriber<T> {
    id: SubscriptionId,
    callback: Callback<T>,
    /// Cleared by `cancel`; checked before every delivery.
    live: Cell<bool>,
}

struct PropertyInner<T> {
    value: T,
    version: u64,
    next_id: u64,
    subscribers: Vec<Rc<Subscriber<T>>>,
}

/// Type-erased view of a property's subscriber list, held weakly by
/// [`Subscription`] so the handle need not carry `T`.
trait Registry {
    fn remove(&self, id: SubscriptionId) -> bool;
}

impl<T> Registry for RefCell<PropertyInner<T>> {
    fn remove(&self, id: SubscriptionId) -> bool {
        let removed = {
            let mut inner = self.borrow_mut();
            let index = inner.subscribers.iter().position(|s| s.id == id);
            index.map(|index| inner.subscribers.remove(index))
        };
        // Dropped after the borrow ends: the callback may own guards that
        // cancel other subscriptions on this property.
        match removed {
            Some(subscriber) => {
                subscriber.live.set(false);
                true
            }
            None => false,
        }
    }
}

/// A mutable value that notifies subscribers on every assignment.
///
/// Cloning an `ObservableProperty` creates a new handle to the **same**
/// value and subscriber list.
///
/// # Invariants
///
/// 1. Every `set`/`update` notifies, even when the new value equals the old.
/// 2. `version` increments by exactly 1 per assignment.
/// 3. Subscribers are notified in registration order.
/// 4. A cancelled subscriber is never invoked again.
pub struct ObservableProperty<T> {
    inner: Rc<RefCell<PropertyInner<T>>>,
}

// Manual Clone: shares the same Rc.
impl<T> Clone for ObservableProperty<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ObservableProperty<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("ObservableProperty")
            .field("value", &inner.value)
            .field("version", &inner.version)
            .field("subscriber_count", &inner.subscribers.len())
            .finish()
    }
}

impl<T: Default + Clone + 'static> Default for ObservableProperty<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + 'static> ObservableProperty<T> {
    /// Create a property holding `value`, at version 0, with no subscribers.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(PropertyInner {
                value,
                version: 0,
                next_id: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    /// Get a clone of the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }

    /// Access the current value by reference without cloning.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.borrow().value)
    }

    /// Store `value` and notify every live subscriber with the old and new
    /// values. No equality check is made.
    pub fn set(&self, value: T) {
        let event = {
            let mut inner = self.inner.borrow_mut();
            let old_value = std::mem::replace(&mut inner.value, value.clone());
            inner.version += 1;
            ChangeEvent {
                old_value,
                new_value: value,
            }
        };
        self.notify(&event);
    }

    /// Modify the value in place, then notify as [`set`](Self::set) would.
    ///
    /// # Panics
    ///
    /// Panics if `f` touches this property.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let event = {
            let mut inner = self.inner.borrow_mut();
            let old_value = inner.value.clone();
            f(&mut inner.value);
            inner.version += 1;
            ChangeEvent {
                old_value,
                new_value: inner.value.clone(),
            }
        };
        self.notify(&event);
    }

    /// Register `callback` for all future assignments.
    ///
    /// Safe to call from inside another subscriber's callback; the new
    /// subscriber misses the pass in progress.
    #[must_use = "dropping a Subscription does not cancel it; keep it to invalidate later"]
    pub fn observe(&self, callback: impl Fn(&ChangeEvent<T>) + 'static) -> Subscription {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = SubscriptionId(inner.next_id);
            inner.next_id += 1;
            inner.subscribers.push(Rc::new(Subscriber {
                id,
                callback: Rc::new(callback),
                live: Cell::new(true),
            }));
            id
        };
        debug!(%id, "subscriber registered");
        let weak = Rc::downgrade(&self.inner);
        let registry: Weak<dyn Registry> = weak;
        Subscription {
            id,
            registry,
            active: Cell::new(true),
        }
    }

    /// Cancel `subscription` if it was issued by this property.
    ///
    /// Foreign and already-cancelled handles are ignored.
    pub fn cancel(&self, subscription: &Subscription) {
        if !self.owns(subscription) {
            trace!(id = %subscription.id, "cancel ignored: foreign subscription");
            return;
        }
        subscription.invalidate();
    }

    /// Whether `subscription` was issued by this property (or a clone of it).
    #[must_use]
    pub fn owns(&self, subscription: &Subscription) -> bool {
        std::ptr::addr_eq(subscription.registry.as_ptr(), Rc::as_ptr(&self.inner))
    }

    /// Number of assignments made so far.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// Number of subscribers that have not been cancelled.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }

    fn notify(&self, event: &ChangeEvent<T>) {
        // Snapshot so callbacks can observe/cancel/set without a live borrow.
        let (snapshot, version): (Vec<Rc<Subscriber<T>>>, u64) = {
            let inner = self.inner.borrow();
            (inner.subscribers.clone(), inner.version)
        };
        trace!(version, subscribers = snapshot.len(), "notifying");
        for subscriber in &snapshot {
            if subscriber.live.get() {
                (subscriber.callback)(event);
            }
        }
    }
}

/// Handle for one registration made with [`ObservableProperty::observe`].
///
/// Holds a weak back-reference to its property. The handle stays registered
/// until [`invalidate`](Self::invalidate) (or the property's `cancel`) is
/// called; dropping it is not enough.
pub struct Subscription {
    id: SubscriptionId,
    registry: Weak<dyn Registry>,
    active: Cell<bool>,
}

impl Subscription {
    #[must_use]
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// True until invalidated or until the property is dropped.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.get() && self.registry.strong_count() > 0
    }

    /// Remove this subscriber from its property. Idempotent.
    ///
    /// Takes effect immediately, including for a notification pass that is
    /// already running.
    pub fn invalidate(&self) {
        if !self.active.replace(false) {
            return;
        }
        match self.registry.upgrade() {
            Some(registry) => {
                let removed = registry.remove(self.id);
                debug!(id = %self.id, removed, "subscription invalidated");
            }
            None => trace!(id = %self.id, "property already dropped"),
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
