#![forbid(unsafe_code)]

//! Observable properties with manual, cancellable subscriptions.
//!
//! # Role in propwatch
//! `propwatch-core` is the whole observation contract. Presentation, input
//! and trigger layers (see `propwatch-demo`) only ever call into it.
//!
//! # Primary responsibilities
//! - **ObservableProperty**: a value that synchronously notifies subscribers
//!   with a [`ChangeEvent`] on every assignment.
//! - **Subscription**: a manual token; observation lasts until it is
//!   invalidated.
//! - **Subject**: an owner of properties addressed by [`PropertyKind`], with
//!   cyclic sample updates through [`update_property`].
//!
//! # Threading
//! Everything here is single-threaded (`Rc`/`RefCell`). Hosts that share a
//! property across threads must wrap it in their own lock.

pub mod error;
pub mod observable;
pub mod subject;

pub use error::SubjectError;
pub use observable::{ChangeEvent, ObservableProperty, Subscription, SubscriptionId};
pub use subject::{
    CursorStore, PropertyKind, PropertyValue, SAMPLE_AGES, SAMPLE_NAMES, Subject, User, advance,
    update_property,
};
