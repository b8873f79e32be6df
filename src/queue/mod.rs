//! # Serialized task queue.
//!
//! - [`SerialQueue`] single-worker FIFO execution lane
//! - [`Lane`] shared slot through which listeners reach the current queue
//!
//! Every side effect of the core funnels through one lane, which is what makes
//! the flow-state and API traffic race-free without explicit locks around the
//! collaborators.

mod lane;
mod serial;

pub use lane::Lane;
pub use serial::SerialQueue;
