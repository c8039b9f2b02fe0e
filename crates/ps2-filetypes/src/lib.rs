mod common;
mod parser;
mod writer;

pub use chrono;
pub use common::*;
pub use parser::*;
pub use writer::*;
