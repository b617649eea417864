//! Runs many matches at once: the shared store, the per-match locking, the
//! broadcast fan-out, the transport session bookkeeping and the background
//! timeout sweep.

pub use clock::*;
pub use config::*;
pub use registry::*;
pub use service::*;
pub use sink::*;
pub use store::*;
pub use sweeper::*;

mod clock;
mod config;
mod registry;
mod service;
mod sink;
mod store;
mod sweeper;
