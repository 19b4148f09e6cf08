//! Byte-at-a-time MeatPack decoder.
//!
//! The decoder owns all unpacking state and is fed one received byte per
//! call. Each call yields zero, one or two characters, always in the order
//! they were packed. It never blocks and never allocates, so it can be
//! driven from a UART interrupt or a tight polling loop.
//!
//! # Example
//!
//! ```
//! use meatpack::{Command, Decoder};
//!
//! let mut decoder = Decoder::new();
//! let mut out = [0u8; 2];
//!
//! for byte in Command::EnablePacking.sequence() {
//!     assert_eq!(decoder.handle_rx_char(byte, &mut out), 0);
//! }
//! assert!(decoder.is_packing_enabled());
//!
//! // 'G' (13) in the low nibble, '1' (1) in the high nibble.
//! let n = decoder.handle_rx_char(0x1D, &mut out);
//! assert_eq!(&out[..n], b"G1");
//! ```

use crate::command::Command;
use crate::report::Status;
use crate::table::{self, SENTINEL};

/// Progress through a `FF FF <opcode>` command prelude.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum CommandState {
    /// No sentinel pending.
    Idle,
    /// One sentinel seen; the next byte decides between data and command.
    SawSentinel,
    /// Two sentinels seen; the next byte is an opcode.
    AwaitingOpcode,
}

/// Outcome of [`Decoder::decode`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Decoded {
    /// Input bytes consumed.
    pub consumed: usize,
    /// Characters written to the output.
    pub written: usize,
}

/// Output slot for a single call, holding at most two characters.
struct CharOut<'a> {
    buf: &'a mut [u8; 2],
    len: usize,
}

impl<'a> CharOut<'a> {
    #[inline]
    fn new(buf: &'a mut [u8; 2]) -> Self {
        Self { buf, len: 0 }
    }

    /// Append a character. A sentinel arriving inside a full-width run can
    /// produce more than two; the surplus is dropped.
    #[inline]
    fn push(&mut self, ch: u8) {
        if let Some(slot) = self.buf.get_mut(self.len) {
            *slot = ch;
            self.len += 1;
        } else {
            #[cfg(feature = "defmt")]
            defmt::warn!("meatpack: dropped character {=u8:#x}", ch);
        }
    }
}

/// MeatPack decode context for one serial channel.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Decoder {
    packing_enabled: bool,
    /// Raw bytes still expected unpacked (0..=2).
    full_width_pending: u8,
    /// Second character of a pair whose first half travels full-width.
    held_char: Option<u8>,
    command_state: CommandState,
    /// Status captured when the last unanswered query arrived.
    status_request: Option<Status>,
}

impl Decoder {
    /// Create a decoder with packing disabled.
    #[must_use]
    pub const fn new() -> Self {
        Self::with_packing(false)
    }

    /// Create a decoder with the packing flag preset, for transports that
    /// start a channel in a known mode.
    #[must_use]
    pub const fn with_packing(packing_enabled: bool) -> Self {
        Self {
            packing_enabled,
            full_width_pending: 0,
            held_char: None,
            command_state: CommandState::Idle,
            status_request: None,
        }
    }

    /// Feed one received byte.
    ///
    /// Writes the recovered characters to the front of `out` and returns how
    /// many were written (0, 1 or 2).
    pub fn handle_rx_char(&mut self, byte: u8, out: &mut [u8; 2]) -> usize {
        let mut out = CharOut::new(out);

        match self.command_state {
            CommandState::Idle => {
                if byte == SENTINEL {
                    self.command_state = CommandState::SawSentinel;
                } else {
                    self.unpack(byte, &mut out);
                }
            }
            CommandState::SawSentinel => {
                if byte == SENTINEL {
                    self.command_state = CommandState::AwaitingOpcode;
                } else {
                    // The lone sentinel was data after all.
                    self.command_state = CommandState::Idle;
                    self.unpack(SENTINEL, &mut out);
                    self.unpack(byte, &mut out);
                }
            }
            CommandState::AwaitingOpcode => {
                // Sentinel is never an opcode; keep waiting.
                if byte != SENTINEL {
                    self.command_state = CommandState::Idle;
                    self.execute(Command::from_byte(byte));
                }
            }
        }

        out.len
    }

    /// Decode as much of `input` as fits into `output`.
    ///
    /// Stops before any byte that could overflow `output`, so at least two
    /// free slots are required per consumed byte.
    pub fn decode(&mut self, input: &[u8], output: &mut [u8]) -> Decoded {
        let mut totals = Decoded::default();
        let mut chars = [0u8; 2];

        for &byte in input {
            if output.len() - totals.written < chars.len() {
                break;
            }
            let n = self.handle_rx_char(byte, &mut chars);
            output[totals.written..totals.written + n].copy_from_slice(&chars[..n]);
            totals.written += n;
            totals.consumed += 1;
        }

        totals
    }

    /// Clear all transient decode state.
    ///
    /// The packing flag and any unanswered status request survive.
    pub fn reset_state(&mut self) {
        self.full_width_pending = 0;
        self.held_char = None;
        self.command_state = CommandState::Idle;
    }

    /// Apply a command directly, without a `FF FF <opcode>` sequence.
    pub fn trigger_cmd(&mut self, cmd: Command) {
        self.execute(cmd);
    }

    /// Whether incoming bytes are currently unpacked.
    #[inline]
    #[must_use]
    pub const fn is_packing_enabled(&self) -> bool {
        self.packing_enabled
    }

    /// Number of raw bytes still expected to pass through unpacked.
    #[inline]
    #[must_use]
    pub const fn pending_full_width(&self) -> u8 {
        self.full_width_pending
    }

    /// Whether a sentinel or command prelude is awaiting its next byte.
    #[inline]
    #[must_use]
    pub fn is_mid_sequence(&self) -> bool {
        self.command_state != CommandState::Idle
    }

    /// Current state as reported to the host.
    #[inline]
    #[must_use]
    pub const fn status(&self) -> Status {
        Status {
            packing_enabled: self.packing_enabled,
        }
    }

    /// Take the pending status request raised by [`Command::QueryState`].
    ///
    /// Returns the state as it was when the query was decoded, once per
    /// query. Commands decoded afterwards do not change the answer.
    pub fn take_status_request(&mut self) -> Option<Status> {
        self.status_request.take()
    }

    fn execute(&mut self, cmd: Command) {
        #[cfg(feature = "defmt")]
        defmt::trace!("meatpack: command {}", cmd);

        match cmd {
            Command::None => {}
            Command::TogglePacking => self.packing_enabled = !self.packing_enabled,
            Command::EnablePacking => self.packing_enabled = true,
            Command::DisablePacking => self.packing_enabled = false,
            Command::ResetState => self.reset_state(),
            Command::QueryState => self.status_request = Some(self.status()),
        }
    }

    /// Data path for one byte that is not part of a command prelude.
    fn unpack(&mut self, byte: u8, out: &mut CharOut<'_>) {
        if !self.packing_enabled {
            out.push(byte);
            return;
        }

        if self.full_width_pending > 0 {
            out.push(byte);
            if let Some(ch) = self.held_char.take() {
                out.push(ch);
            }
            self.full_width_pending -= 1;
            return;
        }

        let (first, second) = table::split(byte);
        match table::lookup(first) {
            None => {
                self.full_width_pending += 1;
                match table::lookup(second) {
                    Some(ch) => self.held_char = Some(ch),
                    None => self.full_width_pending += 1,
                }
            }
            Some(ch) => {
                out.push(ch);
                // The nibble after a line terminator is padding.
                if ch != b'\n' {
                    match table::lookup(second) {
                        Some(ch) => out.push(ch),
                        None => self.full_width_pending += 1,
                    }
                }
            }
        }
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}
