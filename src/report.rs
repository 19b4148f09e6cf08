//! Status reports answering a `QueryState` command.
//!
//! # Format
//!
//! ```text
//! [MP] PV01 ON\n
//! [MP] PV01 OFF\n
//! ```
//!
//! `PV01` is the protocol version; the last word is the packing flag.
//!
//! # Example
//!
//! ```
//! use meatpack::Status;
//!
//! let status = Status { packing_enabled: true };
//! let mut buf = [0u8; 32];
//! let len = status.write_report(&mut buf).unwrap();
//! assert_eq!(&buf[..len], b"[MP] PV01 ON\n");
//! ```

/// Protocol version announced in status reports.
pub const PROTOCOL_VERSION: &str = "PV01";

/// Prefix of every status report line.
const REPORT_PREFIX: &[u8] = b"[MP] ";

/// Maximum size of a serialized status report.
///
/// Breakdown: prefix(5) + version(4) + space(1) + OFF(3) + \n(1) = 14
pub const MAX_REPORT_SIZE: usize = 14;

/// Snapshot of the decoder state reported back to the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Status {
    /// Whether incoming bytes are being unpacked.
    pub packing_enabled: bool,
}

/// Error type for report serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReportError {
    /// The output buffer is too small to hold the report.
    BufferTooSmall,
    /// A write operation failed (for I/O adapters).
    WriteError,
}

impl core::fmt::Display for ReportError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::BufferTooSmall => write!(f, "buffer too small"),
            Self::WriteError => write!(f, "write error"),
        }
    }
}

impl Status {
    /// Word describing the packing flag.
    #[inline]
    #[must_use]
    pub const fn packing_word(&self) -> &'static str {
        if self.packing_enabled {
            "ON"
        } else {
            "OFF"
        }
    }

    /// Write the report line into `buf`.
    ///
    /// Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::BufferTooSmall`] if the line does not fit.
    pub fn write_report(&self, buf: &mut [u8]) -> Result<usize, ReportError> {
        let word = self.packing_word().as_bytes();
        let version = PROTOCOL_VERSION.as_bytes();
        let len = REPORT_PREFIX.len() + version.len() + 1 + word.len() + 1;
        if buf.len() < len {
            return Err(ReportError::BufferTooSmall);
        }

        let parts: [&[u8]; 5] = [REPORT_PREFIX, version, b" ", word, b"\n"];
        let mut pos = 0;
        for part in parts {
            buf[pos..pos + part.len()].copy_from_slice(part);
            pos += part.len();
        }

        Ok(pos)
    }

    /// Write the report line to a `core::fmt::Write` implementation.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::WriteError`] if the write fails.
    pub fn report_fmt<W: core::fmt::Write>(&self, writer: &mut W) -> Result<(), ReportError> {
        let mut buf = [0u8; MAX_REPORT_SIZE];
        let len = self.write_report(&mut buf)?;

        let s = core::str::from_utf8(&buf[..len]).map_err(|_| ReportError::WriteError)?;
        writer.write_str(s).map_err(|_| ReportError::WriteError)
    }

    /// Write the report line to an `embedded_io::Write` implementation, such
    /// as the UART the commands arrived on.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::WriteError`] if the write fails.
    #[cfg(feature = "embedded-io")]
    pub fn report_io<W: embedded_io::Write>(&self, writer: &mut W) -> Result<(), ReportError> {
        let mut buf = [0u8; MAX_REPORT_SIZE];
        let len = self.write_report(&mut buf)?;
        writer
            .write_all(&buf[..len])
            .map_err(|_| ReportError::WriteError)
    }

    /// Write the report line into a new `heapless::Vec`.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::BufferTooSmall`] if `N` is not large enough.
    #[cfg(feature = "heapless")]
    pub fn report_to_vec<const N: usize>(&self) -> Result<heapless::Vec<u8, N>, ReportError> {
        let mut vec = heapless::Vec::new();
        vec.resize(N, 0)
            .map_err(|_| ReportError::BufferTooSmall)?;
        let len = self.write_report(&mut vec)?;
        vec.truncate(len);
        Ok(vec)
    }
}

impl core::fmt::Display for Status {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "[MP] {} {}", PROTOCOL_VERSION, self.packing_word())
    }
}
