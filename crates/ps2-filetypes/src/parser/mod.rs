mod psu;

pub use psu::*;
