//! Routes parsed [`Message`]s to the [`VoicePool`] or straight to the chip.

use crate::{
    Operation,
    configuration::Amplitude,
    parser::Message,
    psg::{MIXER_TONE_ALL, RegisterSink, register},
    voice_pool::VoicePool,
};
use wmidi::Note;

/// Note Off command nibble.
pub const NOTE_OFF: u8 = 0x80;
/// Note On command nibble.
pub const NOTE_ON: u8 = 0x90;
/// Status byte of the raw register write escape: `data1` is a register address, `data2` its value.
///
/// Matched against the whole status, ahead of the command nibble; it therefore takes the place of Note Off on
/// channel 6.
pub const RAW_WRITE: u8 = 0x85;

/// Acts upon a single [`Message`], returning what was done.
///
/// Except for raw writes, the mixer is reprogrammed before every message so that tone output is restored even if
/// something else on the bus has disturbed it. Unrecognized commands are otherwise ignored.
pub fn dispatch<S: RegisterSink>(
    message: Message,
    voices: &mut VoicePool,
    sink: &mut S,
    amplitude: Amplitude,
    now: u32,
) -> Operation {
    if message.status == RAW_WRITE {
        let (address, value) = (u8::from(message.data1), u8::from(message.data2));
        debug!("Raw write: register {=u8:#x}, value {=u8:#x}", address, value);
        sink.write_register(address, value);
        return Operation::RawWrite;
    }

    sink.write_register(register::MIXER, MIXER_TONE_ALL);

    let note = Note::from(message.data1);
    match message.command() {
        NOTE_ON => {
            debug!(
                "Received NoteOn: channel {}, note {}, velocity: {}",
                message.channel().number(),
                note.to_str(),
                u8::from(message.data2)
            );
            voices.allocate(note, message.data2, amplitude, now, sink)
        }
        NOTE_OFF => {
            debug!(
                "Received NoteOff: channel {}, note {}, velocity: {}",
                message.channel().number(),
                note.to_str(),
                u8::from(message.data2)
            );
            voices.release(note, sink)
        }
        _ => {
            trace!("Ignoring unsupported status {=u8:#x}", message.status);
            Operation::none()
        }
    }
}
