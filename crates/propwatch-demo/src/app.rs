#![forbid(unsafe_code)]

//! Headless view controller: the name/age screen without a screen.
//!
//! The controller plays the three consumer roles of the core:
//!
//! - **presentation**: [`ViewController::load`] binds the input-text, name and
//!   age labels to their properties; [`ViewController::unload`] tears the
//!   bindings down.
//! - **input**: [`ViewController::text_changed`] pushes raw text into the
//!   input-text property.
//! - **trigger**: [`ViewController::trigger`] cycles a property through its
//!   sample sequence by kind.
//!
//! [`run_session`] feeds text commands through [`ViewController::execute`] and
//! prints the labels after each one.

use std::cell::RefCell;
use std::fmt;
use std::io::{self, Write};
use std::rc::Rc;
use std::str::FromStr;

use propwatch_core::{
    CursorStore, ObservableProperty, PropertyKind, PropertyValue, SAMPLE_AGES, SAMPLE_NAMES,
    SubjectError, User, update_property,
};
use tracing::{debug, info, warn};

use crate::bind::Binding;

/// Text shown by the three display elements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Labels {
    pub input_text: String,
    pub name: String,
    pub age: String,
}

/// One parsed line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Cycle `kind` to its next sample (`name`, `age`, `update <kind>`).
    Trigger(PropertyKind),
    /// Replace the input text (`text <s>`).
    Text(String),
    /// Clear the input text (`clear`).
    Clear,
    Load,
    Unload,
    Show,
    Quit,
}

/// Whether the session keeps reading commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    Quit,
}

/// Errors from parsing or executing a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    Empty,
    Unknown(String),
    MissingArgument(&'static str),
    Subject(SubjectError),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty command"),
            Self::Unknown(cmd) => write!(f, "unknown command: {cmd}"),
            Self::MissingArgument(cmd) => write!(f, "'{cmd}' needs an argument"),
            Self::Subject(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for CommandError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Subject(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SubjectError> for CommandError {
    fn from(err: SubjectError) -> Self {
        Self::Subject(err)
    }
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (head, rest) = match line.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (line, ""),
        };
        match head.to_ascii_lowercase().as_str() {
            "" => Err(CommandError::Empty),
            "name" => Ok(Self::Trigger(PropertyKind::Name)),
            "age" => Ok(Self::Trigger(PropertyKind::Age)),
            "update" if rest.is_empty() => Err(CommandError::MissingArgument("update")),
            "update" => Ok(Self::Trigger(rest.parse::<PropertyKind>()?)),
            // Raw input: everything after the first space, verbatim.
            "text" => Ok(Self::Text(rest.to_string())),
            "clear" => Ok(Self::Clear),
            "load" => Ok(Self::Load),
            "unload" => Ok(Self::Unload),
            "show" => Ok(Self::Show),
            "quit" | "exit" => Ok(Self::Quit),
            _ => Err(CommandError::Unknown(head.to_string())),
        }
    }
}

/// Sample sequence cycled by the trigger for `kind`.
///
/// Kinds without samples get an empty sequence.
#[must_use]
pub fn samples(kind: PropertyKind) -> Vec<PropertyValue> {
    match kind {
        PropertyKind::Name => SAMPLE_NAMES.iter().map(|&n| PropertyValue::from(n)).collect(),
        PropertyKind::Age => SAMPLE_AGES.iter().map(|&a| PropertyValue::from(a)).collect(),
        PropertyKind::InputText => Vec::new(),
    }
}

pub struct ViewController {
    user: User,
    input_text: ObservableProperty<Option<String>>,
    labels: Rc<RefCell<Labels>>,
    bindings: Vec<Binding>,
    cursors: CursorStore,
}

impl Default for ViewController {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ViewController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewController")
            .field("user", &self.user)
            .field("input_text", &self.input_text)
            .field("labels", &self.labels.borrow())
            .field("bindings", &self.bindings.len())
            .field("cursors", &self.cursors)
            .finish()
    }
}

impl ViewController {
    #[must_use]
    pub fn new() -> Self {
        Self {
            user: User::default(),
            input_text: ObservableProperty::new(None),
            labels: Rc::new(RefCell::new(Labels::default())),
            bindings: Vec::new(),
            cursors: CursorStore::new(),
        }
    }

    #[must_use]
    pub fn user(&self) -> &User {
        &self.user
    }

    #[must_use]
    pub fn input_text(&self) -> &ObservableProperty<Option<String>> {
        &self.input_text
    }

    #[must_use]
    pub fn cursors(&self) -> &CursorStore {
        &self.cursors
    }

    #[must_use]
    pub fn labels(&self) -> Labels {
        self.labels.borrow().clone()
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        !self.bindings.is_empty()
    }

    /// Bind every label to its property. A no-op when already loaded.
    pub fn load(&mut self) {
        if self.is_loaded() {
            debug!("load skipped: already bound");
            return;
        }
        let labels = Rc::clone(&self.labels);
        self.bindings
            .push(Binding::new("input_text", &self.input_text, move |event| {
                // A cleared field keeps showing the last text.
                if let Some(text) = &event.new_value {
                    labels.borrow_mut().input_text = text.clone();
                }
            }));
        let labels = Rc::clone(&self.labels);
        self.bindings
            .push(Binding::new("name", self.user.name(), move |event| {
                labels.borrow_mut().name = event.new_value.clone();
            }));
        let labels = Rc::clone(&self.labels);
        self.bindings
            .push(Binding::new("age", self.user.age(), move |event| {
                labels.borrow_mut().age = event.new_value.to_string();
            }));
        info!(bindings = self.bindings.len(), "view loaded");
    }

    /// Release every binding; labels keep their last text.
    pub fn unload(&mut self) {
        let released = self.bindings.len();
        self.bindings.clear();
        info!(released, "view unloaded");
    }

    /// Input layer: the text field changed.
    pub fn text_changed(&self, text: Option<String>) {
        self.input_text.set(text);
    }

    /// Trigger layer: advance `kind` to its next sample.
    pub fn trigger(&mut self, kind: PropertyKind) -> Result<PropertyValue, SubjectError> {
        update_property(&self.user, kind, &samples(kind), &mut self.cursors)
    }

    pub fn execute(&mut self, command: Command) -> Result<Outcome, CommandError> {
        debug!(?command, "execute");
        match command {
            Command::Trigger(kind) => {
                self.trigger(kind)?;
            }
            Command::Text(text) => self.text_changed(Some(text)),
            Command::Clear => self.text_changed(None),
            Command::Load => self.load(),
            Command::Unload => self.unload(),
            Command::Show => {}
            Command::Quit => return Ok(Outcome::Quit),
        }
        Ok(Outcome::Continue)
    }

    pub fn execute_line(&mut self, line: &str) -> Result<Outcome, CommandError> {
        let command: Command = line.parse()?;
        self.execute(command)
    }

    /// The labels as three display lines.
    #[must_use]
    pub fn render(&self) -> String {
        let labels = self.labels.borrow();
        format!(
            "input: {}\nname:  {}\nage:   {}",
            labels.input_text, labels.name, labels.age
        )
    }
}

/// Run commands until input ends or `quit`, writing the labels after each
/// command and a one-line message for each rejected one.
///
/// Blank lines are skipped. Only I/O failures abort the session.
pub fn run_session<I, W>(controller: &mut ViewController, lines: I, out: &mut W) -> io::Result<()>
where
    I: IntoIterator<Item = io::Result<String>>,
    W: Write,
{
    for line in lines {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match controller.execute_line(&line) {
            Ok(Outcome::Quit) => break,
            Ok(Outcome::Continue) => writeln!(out, "{}", controller.render())?,
            Err(err) => {
                warn!(%line, error = %err, "command rejected");
                writeln!(out, "error: {err}")?;
            }
        }
    }
    out.flush()
}
