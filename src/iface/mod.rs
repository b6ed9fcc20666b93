//! Link-layer abstraction
//!
//! - `link`: the traits the resolver is written against, plus ethertype dispatch
//! - `tap`: a TAP device implementation

pub mod link;
pub mod tap;

// Re-export commonly used items
pub use link::{FrameHandler, HandlerTable, LinkLayer};
pub use tap::TapLink;
