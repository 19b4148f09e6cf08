//! In-band control commands.
//!
//! A command travels as two sentinel bytes followed by one opcode:
//!
//! ```text
//! FF FF <opcode>
//! ```
//!
//! Two sentinels in a row never occur in packed data, since a `0xFF` packed
//! byte is always followed by two non-sentinel full-width characters.

use crate::table::SENTINEL;

/// Control command understood by the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Command {
    /// No operation.
    None = 0b0000_0000,
    /// Invert the packing flag.
    TogglePacking = 0b1111_1101,
    /// Interpret incoming bytes as packed.
    EnablePacking = 0b1111_1011,
    /// Pass incoming bytes through unchanged.
    DisablePacking = 0b1111_1010,
    /// Clear transient decode state.
    ResetState = 0b1111_1001,
    /// Ask the firmware to report its packing state.
    QueryState = 0b1111_1000,
}

/// Every command, in opcode order of the table above.
pub const ALL_COMMANDS: [Command; 6] = [
    Command::None,
    Command::TogglePacking,
    Command::EnablePacking,
    Command::DisablePacking,
    Command::ResetState,
    Command::QueryState,
];

/// An opcode byte that names no command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UnknownCommand(pub u8);

impl core::fmt::Display for UnknownCommand {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "unknown command opcode 0x{:02X}", self.0)
    }
}

impl Command {
    /// Wire opcode of this command.
    #[inline]
    #[must_use]
    pub const fn opcode(self) -> u8 {
        self as u8
    }

    /// Decode an opcode, treating anything unrecognised as [`Command::None`].
    #[inline]
    #[must_use]
    pub fn from_byte(byte: u8) -> Self {
        match Self::try_from(byte) {
            Ok(cmd) => cmd,
            Err(_unknown) => {
                #[cfg(feature = "defmt")]
                defmt::debug!("meatpack: {}", _unknown);
                Command::None
            }
        }
    }

    /// Full wire sequence for this command.
    #[inline]
    #[must_use]
    pub const fn sequence(self) -> [u8; 3] {
        [SENTINEL, SENTINEL, self.opcode()]
    }
}

impl TryFrom<u8> for Command {
    type Error = UnknownCommand;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        match byte {
            0b0000_0000 => Ok(Command::None),
            0b1111_1101 => Ok(Command::TogglePacking),
            0b1111_1011 => Ok(Command::EnablePacking),
            0b1111_1010 => Ok(Command::DisablePacking),
            0b1111_1001 => Ok(Command::ResetState),
            0b1111_1000 => Ok(Command::QueryState),
            other => Err(UnknownCommand(other)),
        }
    }
}

impl From<Command> for u8 {
    fn from(cmd: Command) -> Self {
        cmd.opcode()
    }
}
