//! Host-side packing of G-code text into the MeatPack wire format.
//!
//! # Packing rules
//!
//! Characters are taken two at a time; the first goes into the low nibble.
//!
//! | First | Second | Bytes on the wire |
//! |-------|--------|-------------------|
//! | packable | packable | `second << 4 \| first` |
//! | packable | full-width | `0xF0 \| first`, `second` |
//! | full-width | packable | `second << 4 \| 0x0F`, `first` |
//! | full-width | full-width | `0xFF`, `first`, `second` |
//!
//! A line terminator always closes its byte: when it lands in the low nibble
//! the high nibble is padding, so every line starts on a fresh byte.
//!
//! # Example
//!
//! ```
//! use meatpack::{encode, Decoder};
//!
//! let mut packed = [0u8; 32];
//! let len = encode(b"G1 X10\n", &mut packed).unwrap();
//! assert_eq!(len, 4);
//!
//! let mut decoder = Decoder::with_packing(true);
//! let mut text = [0u8; 32];
//! let totals = decoder.decode(&packed[..len], &mut text);
//! assert_eq!(&text[..totals.written], b"G1 X10\n");
//! ```

use crate::command::Command;
use crate::table::{index_of, join, ESCAPE_NIBBLE, PADDING_CODE, SENTINEL};

/// Code of the line terminator.
const NEWLINE_CODE: u8 = 12;

/// Error type for packing operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EncodeError {
    /// The output buffer is too small to hold the packed data.
    BufferTooSmall,
    /// The input contains the sentinel byte, which the wire format cannot carry.
    SentinelInData,
}

impl core::fmt::Display for EncodeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::BufferTooSmall => write!(f, "buffer too small"),
            Self::SentinelInData => write!(f, "sentinel byte in input"),
        }
    }
}

/// How the end of the input is closed.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Terminate {
    /// Append a line terminator whenever the input lacks one.
    Always,
    /// Append one only to complete a lone final character.
    IfOdd,
}

/// Pack a buffer of G-code lines into `out`.
///
/// Each line starts on a fresh byte. A final line without terminator is
/// packed as is when its length is even; otherwise a line terminator is
/// appended to complete the last byte. Empty input packs to nothing.
/// Returns the number of bytes written.
///
/// # Errors
///
/// Returns [`EncodeError::SentinelInData`] if `input` contains `0xFF`, and
/// [`EncodeError::BufferTooSmall`] if `out` cannot hold the result (see
/// [`packed_len`]).
pub fn encode(input: &[u8], out: &mut [u8]) -> Result<usize, EncodeError> {
    write_packed(input, Terminate::IfOdd, out)
}

/// Pack one G-code line into `out`, terminating it with `'\n'` if needed.
///
/// An empty line packs to a single terminator byte. The result is at most
/// one byte longer than [`packed_len`] of `line`.
///
/// # Errors
///
/// Same as [`encode`].
pub fn pack_line(line: &[u8], out: &mut [u8]) -> Result<usize, EncodeError> {
    write_packed(line, Terminate::Always, out)
}

/// Exact number of bytes [`encode`] produces for `input`.
///
/// # Errors
///
/// Returns [`EncodeError::SentinelInData`] if `input` contains `0xFF`.
pub fn packed_len(input: &[u8]) -> Result<usize, EncodeError> {
    let mut len = 0;
    pack_with(input, Terminate::IfOdd, |_| {
        len += 1;
        Ok(())
    })?;
    Ok(len)
}

fn write_packed(
    text: &[u8],
    terminate: Terminate,
    out: &mut [u8],
) -> Result<usize, EncodeError> {
    let mut pos = 0;
    pack_with(text, terminate, |byte| {
        let slot = out.get_mut(pos).ok_or(EncodeError::BufferTooSmall)?;
        *slot = byte;
        pos += 1;
        Ok(())
    })?;
    Ok(pos)
}

/// Write the `FF FF <opcode>` sequence for `cmd` into `out`.
///
/// # Errors
///
/// Returns [`EncodeError::BufferTooSmall`] if `out` is shorter than 3 bytes.
pub fn write_command(cmd: Command, out: &mut [u8]) -> Result<usize, EncodeError> {
    let seq = cmd.sequence();
    out.get_mut(..seq.len())
        .ok_or(EncodeError::BufferTooSmall)?
        .copy_from_slice(&seq);
    Ok(seq.len())
}

fn pack_with<F>(text: &[u8], terminate: Terminate, mut emit: F) -> Result<(), EncodeError>
where
    F: FnMut(u8) -> Result<(), EncodeError>,
{
    if text.contains(&SENTINEL) {
        return Err(EncodeError::SentinelInData);
    }

    // Characters after the last terminator. Every line starts on a fresh
    // byte, so this alone decides whether the last byte is complete.
    let tail = text
        .iter()
        .rposition(|&ch| ch == b'\n')
        .map_or(text.len(), |last| text.len() - last - 1);
    let append = match terminate {
        Terminate::Always => tail > 0 || text.is_empty(),
        Terminate::IfOdd => tail % 2 == 1,
    };
    let len = text.len() + usize::from(append);
    let char_at = |i: usize| text.get(i).copied().unwrap_or(b'\n');

    let mut i = 0;
    while i < len {
        let first = char_at(i);
        if first == b'\n' {
            emit(join(NEWLINE_CODE, PADDING_CODE))?;
            i += 1;
            continue;
        }

        // An unterminated tail has even length, so a non-terminator always
        // has a successor.
        let second = char_at(i + 1);
        match (index_of(first), index_of(second)) {
            (Some(a), Some(b)) => emit(join(a, b))?,
            (Some(a), None) => {
                emit(join(a, ESCAPE_NIBBLE))?;
                emit(second)?;
            }
            (None, Some(b)) => {
                emit(join(ESCAPE_NIBBLE, b))?;
                emit(first)?;
            }
            (None, None) => {
                emit(SENTINEL)?;
                emit(first)?;
                emit(second)?;
            }
        }
        i += 2;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::decoder::Decoder;
    use crate::table::LOOKUP_TABLE;
    use std::vec::Vec;

    fn pack_vec(text: &[u8]) -> Vec<u8> {
        let mut out = std::vec![0u8; packed_len(text).unwrap()];
        let len = encode(text, &mut out).unwrap();
        assert_eq!(len, out.len());
        out
    }

    fn unpack_vec(decoder: &mut Decoder, packed: &[u8]) -> Vec<u8> {
        let mut text = Vec::new();
        let mut out = [0u8; 2];
        for &b in packed {
            let n = decoder.handle_rx_char(b, &mut out);
            text.extend_from_slice(&out[..n]);
        }
        text
    }

    fn round_trip(text: &[u8]) -> Vec<u8> {
        let mut decoder = Decoder::with_packing(true);
        let decoded = unpack_vec(&mut decoder, &pack_vec(text));
        assert_eq!(decoder.pending_full_width(), 0);
        assert!(!decoder.is_mid_sequence());
        decoded
    }

    #[test]
    fn test_alphabet_halves_size() {
        let text = b"G1 X10.5 X2.25\n";
        let packed = pack_vec(text);
        assert_eq!(packed.len(), (text.len() + 1) / 2);
        assert_eq!(round_trip(text), text);
    }

    #[test]
    fn test_every_alphabet_pair_round_trips() {
        for &a in &LOOKUP_TABLE[..15] {
            for &b in &LOOKUP_TABLE[..15] {
                let text = [a, b, b'\n'];
                assert_eq!(round_trip(&text), text, "pair {:?}", (a, b));
            }
        }
    }

    #[test]
    fn test_full_width_first() {
        let text = b"M1\n";
        let packed = pack_vec(text);
        assert_eq!(packed[0] & 0x0F, ESCAPE_NIBBLE);
        assert_eq!(packed[1], b'M');
        assert_eq!(round_trip(text), text);
    }

    #[test]
    fn test_full_width_second() {
        let text = b"1M\n";
        let packed = pack_vec(text);
        assert_eq!(packed[0] >> 4, ESCAPE_NIBBLE);
        assert_eq!(packed[1], b'M');
        assert_eq!(round_trip(text), text);
    }

    #[test]
    fn test_full_width_pair_uses_sentinel() {
        let text = b";M104 S200\n";
        let packed = pack_vec(text);
        assert_eq!(&packed[..3], &[SENTINEL, b';', b'M']);
        assert_eq!(round_trip(text), text);
    }

    #[test]
    fn test_escape_at_every_position() {
        let base = b"G1 X10.5 Y2.0";
        for pos in 0..base.len() {
            let mut text = base.to_vec();
            text[pos] = b'E';
            text.push(b'\n');
            assert_eq!(round_trip(&text), text, "escape at {}", pos);
        }
    }

    #[test]
    fn test_even_unterminated_text_is_exact() {
        assert_eq!(pack_vec(b"G1"), std::vec![join(13, 1)]);
        assert_eq!(round_trip(b"G1"), b"G1");
        assert_eq!(round_trip(b"G28\nX1.5"), b"G28\nX1.5");
        assert_eq!(round_trip(b"M1"), b"M1");
    }

    #[test]
    fn test_odd_unterminated_text_gets_terminator() {
        assert_eq!(round_trip(b"G28"), b"G28\n");
        assert_eq!(round_trip(b"G1\nX"), b"G1\nX\n");
    }

    #[test]
    fn test_alphabet_strings_round_trip() {
        // Exact unless the last line ends on a lone character.
        let source: Vec<u8> = LOOKUP_TABLE[..15].iter().cycle().take(64).copied().collect();
        for start in 0..15 {
            for len in 1..=32 {
                let text = &source[start..start + len];
                let tail = text
                    .iter()
                    .rposition(|&ch| ch == b'\n')
                    .map_or(len, |last| len - last - 1);
                let mut expected = text.to_vec();
                if tail % 2 == 1 {
                    expected.push(b'\n');
                }
                assert_eq!(round_trip(text), expected, "text {:?}", text);
            }
        }
    }

    #[test]
    fn test_pack_line_always_terminates() {
        let mut out = [0u8; 8];
        let len = pack_line(b"G2", &mut out).unwrap();
        assert_eq!(&out[..len], &[join(13, 2), join(NEWLINE_CODE, PADDING_CODE)]);

        let len = pack_line(b"G28", &mut out).unwrap();
        let mut decoder = Decoder::with_packing(true);
        assert_eq!(unpack_vec(&mut decoder, &out[..len]), b"G28\n");

        let len = pack_line(b"G1\n", &mut out).unwrap();
        assert_eq!(len, packed_len(b"G1\n").unwrap());
    }

    #[test]
    fn test_pack_line_empty_is_terminator() {
        let mut out = [0u8; 1];
        assert_eq!(pack_line(b"", &mut out), Ok(1));
        assert_eq!(out[0], join(NEWLINE_CODE, PADDING_CODE));
    }

    #[test]
    fn test_odd_line_is_padded() {
        let packed = pack_vec(b"G\n");
        assert_eq!(packed, std::vec![join(13, NEWLINE_CODE)]);

        let packed = pack_vec(b"G1\n");
        assert_eq!(packed[1], join(NEWLINE_CODE, PADDING_CODE));
    }

    #[test]
    fn test_multiple_lines() {
        let text = b"G28\nG1 Z0.2 F1200\nM104 S0\n\n;done\r\n";
        assert_eq!(round_trip(text), text);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(packed_len(b"").unwrap(), 0);
        assert_eq!(encode(b"", &mut []), Ok(0));
    }

    #[test]
    fn test_sentinel_rejected() {
        let mut out = [0u8; 16];
        assert_eq!(encode(b"G1\xFF\n", &mut out), Err(EncodeError::SentinelInData));
        assert_eq!(pack_line(b"\xFF", &mut out), Err(EncodeError::SentinelInData));
    }

    #[test]
    fn test_buffer_too_small() {
        let mut out = [0u8; 2];
        assert_eq!(encode(b"G1 X10\n", &mut out), Err(EncodeError::BufferTooSmall));
    }

    #[test]
    fn test_commands_between_lines() {
        let mut stream = Vec::new();
        let mut cmd = [0u8; 3];

        stream.extend_from_slice(b"G28\n");
        let n = write_command(Command::EnablePacking, &mut cmd).unwrap();
        stream.extend_from_slice(&cmd[..n]);
        stream.extend_from_slice(&pack_vec(b"G1 X5\n"));
        write_command(Command::QueryState, &mut cmd).unwrap();
        stream.extend_from_slice(&cmd);
        stream.extend_from_slice(&pack_vec(b"M84\n"));
        write_command(Command::DisablePacking, &mut cmd).unwrap();
        stream.extend_from_slice(&cmd);
        stream.extend_from_slice(b"M117 done\n");

        let mut decoder = Decoder::new();
        let text = unpack_vec(&mut decoder, &stream);
        assert_eq!(text, b"G28\nG1 X5\nM84\nM117 done\n");
        assert!(!decoder.is_packing_enabled());
        assert_eq!(
            decoder.take_status_request(),
            Some(crate::report::Status {
                packing_enabled: true
            })
        );
    }

    #[test]
    fn test_write_command_buffer_too_small() {
        let mut out = [0u8; 2];
        assert_eq!(
            write_command(Command::ResetState, &mut out),
            Err(EncodeError::BufferTooSmall)
        );
    }
}
