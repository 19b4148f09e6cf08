//! Byte source trait and error types.

use core::future::Future;

/// Error type for input operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InputError {
    /// UART/communication I/O error.
    Io,
    /// Connection lost / timeout.
    Disconnected,
    /// Receiver overrun; bytes were lost.
    Overrun,
    /// UART framing error.
    Framing,
}

impl core::fmt::Display for InputError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Io => write!(f, "I/O error"),
            Self::Disconnected => write!(f, "disconnected"),
            Self::Overrun => write!(f, "receiver overrun"),
            Self::Framing => write!(f, "framing error"),
        }
    }
}

/// Async trait for raw byte sources (serial port, SD card reader, ...).
///
/// # `no_std` Compatibility
///
/// All implementations must be `#![no_std]` compatible with no heap allocation.
pub trait ByteSource {
    /// Wait for and read the next chunk of received bytes into `buf`.
    ///
    /// Returns the number of bytes read, which is at least one on success.
    fn receive(&mut self, buf: &mut [u8]) -> impl Future<Output = Result<usize, InputError>>;

    /// Check if the source is connected/ready.
    fn is_connected(&self) -> bool;
}
