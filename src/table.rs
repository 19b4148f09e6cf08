//! The packing alphabet and nibble layout shared by encoder and decoder.
//!
//! Fifteen characters cover the bulk of sliced G-code. Each is addressed by a
//! 4-bit code; the sixteenth code marks a character that travels full-width.

/// Byte that opens a command prelude (`FF FF <opcode>`).
///
/// As a packed byte it carries two escape nibbles, so it also introduces a
/// pair of full-width characters.
pub const SENTINEL: u8 = 0xFF;

/// Nibble code meaning "this character follows as a raw byte".
pub const ESCAPE_NIBBLE: u8 = 0b1111;

/// Mask selecting the nibble that holds the first character of a pair.
pub const FIRST_NIBBLE_MASK: u8 = 0b0000_1111;

/// Mask selecting the nibble that holds the second character of a pair.
pub const SECOND_NIBBLE_MASK: u8 = 0b1111_0000;

/// Code-to-character table. The last slot is the escape code and never
/// decodes to a character.
pub const LOOKUP_TABLE: [u8; 16] = [
    b'0', b'1', b'2', b'3', b'4', b'5', b'6', b'7', b'8', b'9', b'.', b' ', b'\n', b'G', b'X', 0,
];

/// Code of the space character, used to pad an odd line after its terminator.
pub const PADDING_CODE: u8 = 11;

/// Resolve a 4-bit code to its character.
///
/// Returns `None` for the escape code. Only the low four bits of `code` are
/// considered.
#[inline]
#[must_use]
pub const fn lookup(code: u8) -> Option<u8> {
    let code = code & FIRST_NIBBLE_MASK;
    if code == ESCAPE_NIBBLE {
        None
    } else {
        Some(LOOKUP_TABLE[code as usize])
    }
}

/// Find the 4-bit code for a character, if it is part of the alphabet.
#[inline]
#[must_use]
pub const fn index_of(ch: u8) -> Option<u8> {
    let mut i = 0;
    while i < ESCAPE_NIBBLE as usize {
        if LOOKUP_TABLE[i] == ch {
            return Some(i as u8);
        }
        i += 1;
    }
    None
}

/// Split a packed byte into `(first, second)` codes.
///
/// The low nibble carries the first character of the pair.
#[inline]
#[must_use]
pub const fn split(byte: u8) -> (u8, u8) {
    (byte & FIRST_NIBBLE_MASK, (byte & SECOND_NIBBLE_MASK) >> 4)
}

/// Join two codes into a packed byte; inverse of [`split`].
#[inline]
#[must_use]
pub const fn join(first: u8, second: u8) -> u8 {
    (first & FIRST_NIBBLE_MASK) | ((second & FIRST_NIBBLE_MASK) << 4)
}
