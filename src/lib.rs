//! Chatlate - Live Chat Translation
//!
//! Polls a live stream's chat feed, deduplicates messages, and fans
//! each one out to concurrent translation requests against one of two
//! interchangeable backends.

pub mod cli;
pub mod config;
pub mod workflow;
pub mod source;
pub mod translate;
pub mod filter;
pub mod dispatch;
pub mod poller;
pub mod sink;
pub mod overlay;
pub mod error;
