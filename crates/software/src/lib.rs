//! This crate contains architecture-agnostic logic for PSG Bridge, a device which plays a
//! [YM2149](https://en.wikipedia.org/wiki/General_Instrument_AY-3-8910) programmable sound generator (PSG) as a
//! three-voice synthesizer by translating [MIDI](https://midi.org/midi-1-0) channel-voice messages into register
//! writes.
//!
//! Bytes arrive one at a time from a [`ByteSource`][transport::ByteSource]. The [`parser`] reassembles them into
//! messages, the [`dispatcher`] routes each message to the [`voice_pool`], and the pool programs the chip through a
//! [`RegisterSink`][psg::RegisterSink]. Because a note-off may be lost on the wire, a [`watchdog`] periodically
//! silences voices which have been held for too long. [`Bridge`] owns all of it and runs one scheduler iteration
//! per call to [`Bridge::poll`].
//!
//! Nothing in this crate fails outward: malformed input, exhausted voices and missing note-offs are all handled
//! locally. The device runs unattended, so every entry point is total.

#![deny(missing_docs)]
#![no_std]

mod fmt;

mod bridge;
pub use bridge::*;

pub mod configuration;
pub mod dispatcher;
pub mod frequency_table;

mod operation;
pub use operation::*;

pub mod parser;
pub mod psg;
pub mod transport;
pub mod voice_pool;
pub mod watchdog;

#[cfg(test)]
mod test_support;
