//! What crosses the wire: the JSON match snapshot pushed to clients, the
//! request payloads clients send, and the per-match topic names.

pub use error::*;
pub use request::*;
pub use snapshot::*;
pub use topic::*;

mod error;
mod request;
mod snapshot;
mod topic;
