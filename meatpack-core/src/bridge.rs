//! MeatpackBridge: connects a byte source to a line sink through a decoder.

use crate::input::{ByteSource, InputError};
use crate::output::{LineSink, OutputError};
use heapless::Vec;
use meatpack::Decoder;

/// Maximum decoded line length, excluding the line terminator.
pub const MAX_LINE_LENGTH: usize = 96;

/// Number of bytes requested from the source per [`MeatpackBridge::process_one`].
pub const RX_CHUNK_SIZE: usize = 32;

/// A bridge that decodes bytes from a source and forwards complete G-code
/// lines to a sink.
///
/// # Error Handling
///
/// On input errors the bridge resets the decoder and drops the partial line,
/// so a gap in the byte stream cannot leave stale escape or command state
/// behind. Lines longer than [`MAX_LINE_LENGTH`] are discarded up to their
/// terminator.
pub struct MeatpackBridge<I, O> {
    input: I,
    output: O,
    decoder: Decoder,
    line: Vec<u8, MAX_LINE_LENGTH>,
    /// Set while skipping the rest of an overlong line.
    discarding: bool,
}

impl<I: ByteSource, O: LineSink> MeatpackBridge<I, O> {
    /// Create a new bridge with packing initially disabled.
    pub fn new(input: I, output: O) -> Self {
        Self::with_decoder(input, output, Decoder::new())
    }

    /// Create a new bridge around an existing decoder.
    pub fn with_decoder(input: I, output: O, decoder: Decoder) -> Self {
        Self {
            input,
            output,
            decoder,
            line: Vec::new(),
            discarding: false,
        }
    }

    /// Run the bridge, forwarding lines indefinitely.
    ///
    /// This method never returns under normal operation.
    pub async fn run(&mut self) -> ! {
        loop {
            let _ = self.process_one().await;
        }
    }

    /// Receive one chunk of bytes and forward every line it completes.
    ///
    /// Returns the number of lines forwarded. The whole chunk is always
    /// decoded; the first error encountered is returned afterwards.
    pub async fn process_one(&mut self) -> Result<usize, BridgeError> {
        let mut chunk = [0u8; RX_CHUNK_SIZE];
        let received = match self.input.receive(&mut chunk).await {
            Ok(n) => n.min(chunk.len()),
            Err(e) => {
                #[cfg(feature = "defmt")]
                defmt::error!("Input error: {:?}", e);
                self.reset();
                return Err(BridgeError::Input(e));
            }
        };

        let mut forwarded = 0;
        let mut first_error = None;
        let mut chars = [0u8; 2];

        for &byte in &chunk[..received] {
            let count = self.decoder.handle_rx_char(byte, &mut chars);

            for &ch in &chars[..count] {
                if ch != b'\n' {
                    if !self.discarding && self.line.push(ch).is_err() {
                        #[cfg(feature = "defmt")]
                        defmt::warn!("Line exceeds {} bytes, discarding", MAX_LINE_LENGTH);
                        self.discarding = true;
                        first_error.get_or_insert(BridgeError::LineTooLong);
                    }
                    continue;
                }

                if self.discarding {
                    self.discarding = false;
                } else {
                    match self.output.send_line(strip_cr(&self.line)).await {
                        Ok(()) => forwarded += 1,
                        Err(e) => {
                            first_error.get_or_insert(BridgeError::Output(e));
                        }
                    }
                }
                self.line.clear();
            }

            if let Some(status) = self.decoder.take_status_request() {
                if let Err(e) = self.output.report_status(status).await {
                    first_error.get_or_insert(BridgeError::Output(e));
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(forwarded),
        }
    }

    /// Drop all partial state: decoder escapes, command preludes and the
    /// line under assembly. The packing flag is kept.
    pub fn reset(&mut self) {
        self.decoder.reset_state();
        self.line.clear();
        self.discarding = false;
    }

    /// Get a reference to the decoder.
    pub fn decoder(&self) -> &Decoder {
        &self.decoder
    }

    /// Get a mutable reference to the decoder, e.g. to force a mode with
    /// [`Decoder::trigger_cmd`].
    pub fn decoder_mut(&mut self) -> &mut Decoder {
        &mut self.decoder
    }

    /// Get a reference to the input source.
    pub fn input(&self) -> &I {
        &self.input
    }

    /// Get a mutable reference to the input source.
    pub fn input_mut(&mut self) -> &mut I {
        &mut self.input
    }

    /// Get a reference to the output sink.
    pub fn output(&self) -> &O {
        &self.output
    }

    /// Get a mutable reference to the output sink.
    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }

    /// Decompose the bridge into its input, output and decoder.
    pub fn into_parts(self) -> (I, O, Decoder) {
        (self.input, self.output, self.decoder)
    }
}

/// Strip a trailing CR left over from a CRLF line ending.
#[inline]
fn strip_cr(line: &[u8]) -> &[u8] {
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Error type for bridge operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BridgeError {
    /// Error from the byte source.
    Input(InputError),
    /// Error from the line sink.
    Output(OutputError),
    /// A decoded line exceeded [`MAX_LINE_LENGTH`] and was discarded.
    LineTooLong,
}

impl From<InputError> for BridgeError {
    fn from(e: InputError) -> Self {
        BridgeError::Input(e)
    }
}

impl From<OutputError> for BridgeError {
    fn from(e: OutputError) -> Self {
        BridgeError::Output(e)
    }
}

impl core::fmt::Display for BridgeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Input(e) => write!(f, "input: {}", e),
            Self::Output(e) => write!(f, "output: {}", e),
            Self::LineTooLong => write!(f, "line longer than {} bytes", MAX_LINE_LENGTH),
        }
    }
}
