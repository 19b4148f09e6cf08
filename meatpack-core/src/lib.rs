//! Platform-agnostic MeatPack ingestion: byte sources, line sinks and the
//! bridge that decodes between them.
//!
//! This crate provides the transport-facing half of a MeatPack receiver
//! without any platform-specific dependencies. It can be used both in
//! embedded `no_std` environments and on host for testing.
//!
//! # Overview
//!
//! - [`input`]: Byte source trait ([`ByteSource`])
//! - [`output`]: G-code line sink trait ([`LineSink`])
//! - [`bridge`]: Decodes source bytes into lines for the sink ([`MeatpackBridge`])
//!
//! The decoder itself lives in the [`meatpack`] crate and is re-exported here.
//!
//! # Data Flow
//!
//! ```text
//! ByteSource --bytes--> Decoder --chars--> line buffer --lines--> LineSink
//!                          |                                        ^
//!                          +-------- QueryState status report ------+
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Enable defmt formatting and bridge logging (for embedded targets)
//! - **`embedded-io`**: Enable `Status::report_io` for writing reports to a port
//!
//! `Status::report_to_vec` is always available, since this crate already
//! depends on `heapless` for its line buffer.
//!
//! # No-std Support
//!
//! This crate is `#![no_std]` by default and uses no heap allocations,
//! making it suitable for embedded systems with limited resources.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

pub mod bridge;
pub mod input;
pub mod output;

// Re-export main types at crate root
pub use bridge::{BridgeError, MeatpackBridge, MAX_LINE_LENGTH, RX_CHUNK_SIZE};
pub use input::{ByteSource, InputError};
pub use meatpack::{Command, Decoder, Status};
pub use output::{LineSink, OutputError};
