#![forbid(unsafe_code)]

//! Subjects: owners of observable properties, updated by property kind.
//!
//! A [`Subject`] declares which [`PropertyKind`]s it owns and stores
//! type-erased [`PropertyValue`]s into the matching property.
//! [`update_property`] drives a subject through a cyclic sample sequence,
//! keeping one cursor per kind in a [`CursorStore`].
//!
//! # Invariants
//!
//! 1. **Cursor wraps**: `advance` on the last index yields cursor 0.
//! 2. **All or nothing**: a rejected `update_property` leaves every property
//!    and every cursor untouched.
//! 3. **Closed kinds**: a kind the subject does not own is an error, never a
//!    silent no-op.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Unsupported kind | Subject has no such property | `UnsupportedKind` |
//! | Empty sequence | No samples to cycle | `EmptySequence` |
//! | Stale cursor | Cursor beyond sequence length | `CursorOutOfBounds` |
//! | Wrong value shape | e.g. text for `Age` | `ValueMismatch` |

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use tracing::{debug, warn};

use crate::error::SubjectError;
use crate::observable::ObservableProperty;

/// Sample names cycled by the name trigger.
pub const SAMPLE_NAMES: [&str; 4] = ["Maria", "Jade", "Christina", "Ash"];

/// Sample ages cycled by the age trigger.
pub const SAMPLE_AGES: [u32; 4] = [36, 27, 52, 48];

/// Identifies one observable property across all subjects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PropertyKind {
    Name,
    Age,
    InputText,
}

impl PropertyKind {
    pub const ALL: [PropertyKind; 3] = [Self::Name, Self::Age, Self::InputText];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Age => "age",
            Self::InputText => "input-text",
        }
    }
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PropertyKind {
    type Err = SubjectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(Self::Name),
            "age" => Ok(Self::Age),
            "input-text" | "input_text" | "text" => Ok(Self::InputText),
            _ => Err(SubjectError::UnknownKind(s.to_string())),
        }
    }
}

/// A value headed for a property whose concrete type is picked by kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    Text(String),
    Number(i64),
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<u32> for PropertyValue {
    fn from(value: u32) -> Self {
        Self::Number(i64::from(value))
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

/// Next-index bookkeeping, one cursor per property kind.
///
/// Kinds never advanced read as cursor 0.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CursorStore {
    cursors: BTreeMap<PropertyKind, usize>,
}

impl CursorStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, kind: PropertyKind) -> usize {
        self.cursors.get(&kind).copied().unwrap_or(0)
    }

    pub fn set(&mut self, kind: PropertyKind, cursor: usize) {
        self.cursors.insert(kind, cursor);
    }

    /// Rewind every cursor to 0.
    pub fn reset(&mut self) {
        self.cursors.clear();
    }
}

/// Return `sequence[cursor]` and the cursor to use next, wrapping to 0
/// after the last element.
pub fn advance<T: Clone>(sequence: &[T], cursor: usize) -> Result<(T, usize), SubjectError> {
    if sequence.is_empty() {
        return Err(SubjectError::EmptySequence);
    }
    let value = sequence
        .get(cursor)
        .cloned()
        .ok_or(SubjectError::CursorOutOfBounds {
            cursor,
            len: sequence.len(),
        })?;
    let next = if cursor + 1 < sequence.len() {
        cursor + 1
    } else {
        0
    };
    Ok((value, next))
}

/// An owner of one or more observable properties addressed by kind.
pub trait Subject {
    /// The kinds this subject owns. Anything else is rejected.
    fn kinds(&self) -> &[PropertyKind];

    /// Store `value` into the property for `kind`, notifying its observers.
    ///
    /// Implementations must validate before assigning: an `Err` means no
    /// property changed.
    fn assign(&self, kind: PropertyKind, value: PropertyValue) -> Result<(), SubjectError>;

    fn owns_kind(&self, kind: PropertyKind) -> bool {
        self.kinds().contains(&kind)
    }
}

/// Assign the next sample of `sequence` to the `kind` property of `subject`
/// and move that kind's cursor forward.
///
/// Returns the value that was assigned.
pub fn update_property<S>(
    subject: &S,
    kind: PropertyKind,
    sequence: &[PropertyValue],
    cursors: &mut CursorStore,
) -> Result<PropertyValue, SubjectError>
where
    S: Subject + ?Sized,
{
    if !subject.owns_kind(kind) {
        warn!(%kind, "update rejected: subject does not own property");
        return Err(SubjectError::UnsupportedKind(kind));
    }
    let cursor = cursors.get(kind);
    let (value, next) = advance(sequence, cursor).inspect_err(|err| {
        warn!(%kind, cursor, error = %err, "update rejected");
    })?;
    subject.assign(kind, value.clone()).inspect_err(|err| {
        warn!(%kind, error = %err, "update rejected");
    })?;
    cursors.set(kind, next);
    debug!(%kind, %value, cursor = next, "property updated");
    Ok(value)
}

/// The demo's person record: a name and an age.
#[derive(Debug, Clone, Default)]
pub struct User {
    name: ObservableProperty<String>,
    age: ObservableProperty<u32>,
}

impl User {
    const KINDS: [PropertyKind; 2] = [PropertyKind::Name, PropertyKind::Age];

    #[must_use]
    pub fn new(name: impl Into<String>, age: u32) -> Self {
        Self {
            name: ObservableProperty::new(name.into()),
            age: ObservableProperty::new(age),
        }
    }

    #[must_use]
    pub fn name(&self) -> &ObservableProperty<String> {
        &self.name
    }

    #[must_use]
    pub fn age(&self) -> &ObservableProperty<u32> {
        &self.age
    }
}

impl Subject for User {
    fn kinds(&self) -> &[PropertyKind] {
        &Self::KINDS
    }

    fn assign(&self, kind: PropertyKind, value: PropertyValue) -> Result<(), SubjectError> {
        match (kind, value) {
            (PropertyKind::Name, PropertyValue::Text(name)) => self.name.set(name),
            (PropertyKind::Name, PropertyValue::Number(_)) => {
                return Err(SubjectError::ValueMismatch {
                    kind,
                    expected: "text",
                });
            }
            (PropertyKind::Age, PropertyValue::Number(n)) => {
                let age = u32::try_from(n).map_err(|_| SubjectError::ValueMismatch {
                    kind,
                    expected: "a number in 0..=4294967295",
                })?;
                self.age.set(age);
            }
            (PropertyKind::Age, PropertyValue::Text(_)) => {
                return Err(SubjectError::ValueMismatch {
                    kind,
                    expected: "a number",
                });
            }
            (PropertyKind::InputText, _) => return Err(SubjectError::UnsupportedKind(kind)),
        }
        Ok(())
    }
}
