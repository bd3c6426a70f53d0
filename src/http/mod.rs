//! HTTP execution: the executor seam used by the segment runner and its
//! reqwest-backed implementation.
mod client;
mod execution;
mod request;


pub use client::{HttpExecutor, HttpOutcome, ReqwestExecutor};
pub use request::build_request;
