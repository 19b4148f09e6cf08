//! Line sink trait and error types.

use core::future::Future;
use meatpack::Status;

/// Error type for output operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputError {
    /// Communication I/O error.
    Io,
    /// Consumer not ready (e.g., command queue full).
    NotReady,
    /// Line dropped by the consumer.
    Dropped,
}

impl core::fmt::Display for OutputError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Io => write!(f, "I/O error"),
            Self::NotReady => write!(f, "not ready"),
            Self::Dropped => write!(f, "line dropped"),
        }
    }
}

/// Async trait for consumers of decoded G-code.
///
/// The sink receives complete lines and answers status queries back to the
/// host, typically over the same serial link the bytes arrived on.
///
/// # `no_std` Compatibility
///
/// All implementations must be `#![no_std]` compatible with no heap allocation.
pub trait LineSink {
    /// Hand one decoded line to the consumer, without its line ending.
    fn send_line(&mut self, line: &[u8]) -> impl Future<Output = Result<(), OutputError>>;

    /// Report the packing state to the host.
    ///
    /// [`Status::write_report`] formats the standard report line.
    fn report_status(&mut self, status: Status) -> impl Future<Output = Result<(), OutputError>>;

    /// Check if the sink is ready to accept lines.
    fn is_ready(&self) -> bool;
}
