//! # Status Client
//!
//! Clock status acquisition module.
//!
//! Responsibilities:
//! - HTTP `StatusSource` against the remote clock service
//! - Lenient wire decoding (case-insensitive keys, trailing separators)
//! - Scripted mock source for tests without a network

mod decode;
mod http;
mod mock;

pub use decode::decode_status;
pub use http::HttpStatusSource;
pub use mock::{MockStatusSource, ScriptedPoll};

pub use contracts::{ClockStatus, StatusSource};
