mod error;
mod psu;
mod timestamp;

pub use error::*;
pub use psu::*;
pub use timestamp::*;
