//! Adapter implementations of the port traits.
//!
//! - `live`: runs commands for real.
//! - `recording`: wraps another executor and appends every call to a cassette.
//! - `replaying`: answers calls from a previously recorded cassette.

pub mod live;
pub mod recording;
pub mod replaying;
