//! MeatPack packing for G-code streams.
//!
//! Most G-code is drawn from a small alphabet: digits, `.`, space, line feed,
//! `G` and `X`. MeatPack gives each of those fifteen characters a 4-bit code
//! and packs two of them per byte, so a serial link carries close to twice the
//! commands at the same baud rate. Characters outside the alphabet travel
//! full-width behind an escape code.
//!
//! This crate provides:
//!
//! - **Decoding**: [`Decoder`], a byte-at-a-time state machine for the
//!   receiving firmware, including the in-band command channel
//! - **Encoding**: [`encode()`], [`pack_line()`] and [`write_command()`] for the sending host
//! - **Commands**: [`Command`], the control opcodes
//! - **Reports**: [`Status`], the answer to [`Command::QueryState`]
//!
//! # Wire Format
//!
//! ```text
//! packed byte      [second:4][first:4]     codes 0-14 index the table
//! full-width       code 15 in a nibble     character follows as a raw byte
//! full-width pair  FF <first> <second>     both nibbles escaped
//! command          FF FF <opcode>
//! ```
//!
//! # Example
//!
//! ```
//! use meatpack::{encode, write_command, Command, Decoder};
//!
//! let mut stream = [0u8; 64];
//! let mut len = write_command(Command::EnablePacking, &mut stream).unwrap();
//! len += encode(b"G1 X10.5\nM84\n", &mut stream[len..]).unwrap();
//!
//! let mut decoder = Decoder::new();
//! let mut text = [0u8; 64];
//! let totals = decoder.decode(&stream[..len], &mut text);
//! assert_eq!(&text[..totals.written], b"G1 X10.5\nM84\n");
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Enable defmt formatting and decoder logging (for embedded targets)
//! - **`heapless`**: Enable `Status::report_to_vec`
//! - **`embedded-io`**: Enable `Status::report_io` for I/O peripherals
//!
//! # No-std Support
//!
//! This crate is `#![no_std]` by default and uses no heap allocations.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

pub mod command;
pub mod decoder;
pub mod encoder;
pub mod report;
pub mod table;

// Re-export main types at crate root
pub use command::{Command, UnknownCommand, ALL_COMMANDS};
pub use decoder::{Decoded, Decoder};
pub use encoder::{encode, pack_line, packed_len, write_command, EncodeError};
pub use report::{ReportError, Status, MAX_REPORT_SIZE, PROTOCOL_VERSION};
pub use table::{ESCAPE_NIBBLE, LOOKUP_TABLE, SENTINEL};
