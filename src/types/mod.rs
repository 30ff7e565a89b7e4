//! Common types used across the Wavefleet client library.

pub mod date_range;
pub mod readings;

pub use date_range::DateRange;
pub use readings::*;
