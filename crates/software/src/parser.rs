//! Reassembles a stream of wire bytes into [`Message`]s.
//!
//! The framing is deliberately narrow: every status is assumed to carry exactly two data bytes, which holds for the
//! note and raw-write messages the bridge acts upon. Once a status has been latched, further pairs of data bytes are
//! read as more messages under that status (running status). A new status byte always starts over, discarding any
//! half-received message.

use tinyvec::ArrayVec;
use wmidi::{Channel, U7};

/// Set on status bytes, clear on data bytes.
const STATUS_BIT: u8 = 0x80;

/// Number of data bytes following every status.
const DATA_BYTES: usize = 2;

/// A complete status-plus-two-data-bytes message.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Message {
    /// The status byte as received, channel nibble included.
    pub status: u8,
    /// First data byte; a note number for note messages, a register address for raw writes.
    pub data1: U7,
    /// Second data byte; a velocity for note messages, a register value for raw writes.
    pub data2: U7,
}

impl Message {
    /// Constructs a [`Message`], discarding the high bit of either data byte.
    pub fn new(status: u8, data1: u8, data2: u8) -> Self {
        Self {
            status,
            data1: U7::from_u8_lossy(data1),
            data2: U7::from_u8_lossy(data2),
        }
    }

    /// The command, i.e., the high nibble of the status.
    pub fn command(&self) -> u8 {
        self.status & 0xF0
    }

    /// The channel, i.e., the low nibble of the status.
    pub fn channel(&self) -> Channel {
        Channel::from_index(self.status & 0x0F).unwrap_or(Channel::Ch1)
    }
}

/// Where the [`MessageParser`] is within a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParserState {
    /// No status has been received; data bytes are noise.
    Idle,
    /// A status has been latched and this many of its data bytes have arrived.
    AwaitingData(u8),
}

/// A byte-at-a-time message framer.
#[derive(Clone, Debug, Default)]
pub struct MessageParser {
    /// The latched status, if any.
    status: Option<u8>,
    /// Data bytes received so far for the current message.
    data: ArrayVec<[u8; DATA_BYTES]>,
}

impl MessageParser {
    /// Constructs an idle [`MessageParser`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes one byte, returning a [`Message`] if the byte completed one.
    pub fn feed(&mut self, byte: u8) -> Option<Message> {
        if byte & STATUS_BIT != 0 {
            if !self.data.is_empty() {
                trace!("Discarding partial message after new status {=u8:#x}", byte);
            }
            self.status = Some(byte);
            self.data.clear();
            return None;
        }

        let Some(status) = self.status else {
            trace!("Ignoring data byte {=u8:#x} received without a status", byte);
            return None;
        };

        // the buffer is cleared whenever it fills, so there is always room
        self.data.push(byte);
        if self.data.len() < DATA_BYTES {
            return None;
        }

        let message = Message::new(status, self.data[0], self.data[1]);
        self.data.clear();
        Some(message)
    }

    /// Returns the parser's position within the current message.
    pub fn state(&self) -> ParserState {
        match self.status {
            None => ParserState::Idle,
            // at most `DATA_BYTES - 1` bytes are ever held between calls
            Some(_) => ParserState::AwaitingData(self.data.len() as u8),
        }
    }

    /// Forgets the latched status and any partial message.
    pub fn reset(&mut self) {
        self.status = None;
        self.data.clear();
    }
}
