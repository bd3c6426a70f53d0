//! Turns declared phases into segments and drives waves of virtual users
//! through them.
mod executor;
mod phase;
mod segment;


pub use executor::{ClientFactory, Executor, Plan, RunReport, reqwest_client_factory};
pub use phase::{Segment, resolve_phase};
pub use segment::{SegmentRunner, SegmentStats};
