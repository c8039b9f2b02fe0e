//! Editing of PS2 PSU save archives.
//!
//! [`Archive`] is the in-memory model of one archive; [`cli`] and [`shell`]
//! drive it from the command line.

mod archive;
pub mod cli;
mod error;
pub mod listing;
mod settings;
pub mod shell;

pub use archive::Archive;
pub use error::Error;
pub use settings::{load_settings, Settings};
