#![forbid(unsafe_code)]

//! Headless demo for `propwatch-core`.
//!
//! A name/age "screen" with no rendering: labels are plain strings bound to
//! observable properties, buttons are text commands, and the text field is
//! the `text` command.

pub mod app;
pub mod bind;
pub mod cli;

pub use app::{Command, CommandError, Labels, Outcome, ViewController, run_session};
pub use bind::Binding;
