//! Capture loop, cancellation and session plumbing for fbscii.
//!
//! The `fbscii` binary is a thin layer over these modules.

pub mod benchmark;
pub mod cancel;
pub mod capture;
pub mod cli;
pub mod hotreload;
pub mod source;
