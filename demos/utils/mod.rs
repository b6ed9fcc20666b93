//! Utility functions for the demos
//!
//! Host-side interface setup shared by the TAP demos.

pub mod network;

pub use network::*;
