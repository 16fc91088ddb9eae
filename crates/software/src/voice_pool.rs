//! Provides [`VoicePool`], which assigns sounding notes to the chip's three tone channels and programs their
//! registers accordingly.
//!
//! Allocation is first-fit in a fixed order. A note-on which finds every voice busy with some other note is dropped
//! rather than stealing a voice, and a note-on for a note which is already sounding re-triggers that same voice.

use crate::{
    Operation,
    configuration::Amplitude,
    frequency_table,
    psg::{LEVEL_OFF, RegisterSink, ToneChannel, tone_period_bytes},
};
use wmidi::{Note, Velocity};

/// Number of notes the chip can sound at once.
pub const VOICE_COUNT: usize = 3;

/// Channel B comes first because it is centered when the chip is wired for ABC stereo, so a single melody line
/// plays from the middle.
const CHANNEL_ORDER: [ToneChannel; VOICE_COUNT] = [ToneChannel::B, ToneChannel::A, ToneChannel::C];

/// One tone channel and the note it is sounding, if any.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Voice {
    channel: ToneChannel,
    note: Option<Note>,
    /// Tick at which `note` began. Meaningless while the voice is free.
    started_at: u32,
}

impl Voice {
    const fn new(channel: ToneChannel) -> Self {
        Self {
            channel,
            note: None,
            started_at: 0,
        }
    }

    /// Getter.
    pub fn channel(&self) -> ToneChannel {
        self.channel
    }

    /// Returns the note this voice is sounding, or `None` if it is free.
    pub fn note(&self) -> Option<Note> {
        self.note
    }

    /// Getter.
    pub fn started_at(&self) -> u32 {
        self.started_at
    }

    /// Determines whether the voice is available for a new note.
    pub fn is_free(&self) -> bool {
        self.note.is_none()
    }

    /// Ticks elapsed since the current note started, tolerating a wrapped tick counter.
    pub fn age(&self, now: u32) -> u32 {
        now.wrapping_sub(self.started_at)
    }

    fn sound<S: RegisterSink>(&mut self, note: Note, period: u16, level: u8, now: u32, sink: &mut S) {
        let registers = self.channel.registers();
        let (lsb, msb) = tone_period_bytes(period);
        sink.write_register(registers.level, level);
        sink.write_register(registers.freq_lsb, lsb);
        sink.write_register(registers.freq_msb, msb);
        self.note = Some(note);
        self.started_at = now;
    }

    fn silence<S: RegisterSink>(&mut self, sink: &mut S) {
        sink.write_register(self.channel.registers().level, LEVEL_OFF);
        self.note = None;
        self.started_at = 0;
    }
}

/// The chip's voices, in allocation order.
///
/// No two voices ever hold the same note.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VoicePool {
    voices: [Voice; VOICE_COUNT],
}

impl Default for VoicePool {
    fn default() -> Self {
        Self::new()
    }
}

impl VoicePool {
    /// Constructs a [`VoicePool`] with every voice free.
    pub const fn new() -> Self {
        Self {
            voices: [
                Voice::new(CHANNEL_ORDER[0]),
                Voice::new(CHANNEL_ORDER[1]),
                Voice::new(CHANNEL_ORDER[2]),
            ],
        }
    }

    /// Starts sounding `note`, re-triggering the voice already sounding it or else taking the first free voice.
    ///
    /// A `velocity` of zero is a note-off, per MIDI convention. Notes the chip has no pitch for, and notes which
    /// arrive while every voice is busy with another note, are dropped.
    pub fn allocate<S: RegisterSink>(
        &mut self,
        note: Note,
        velocity: Velocity,
        amplitude: Amplitude,
        now: u32,
        sink: &mut S,
    ) -> Operation {
        if u8::from(velocity) == 0 {
            return self.release(note, sink);
        }

        let period = frequency_table::tone_period(note);
        if period == 0 {
            debug!("Dropping {}, which has no pitch on the chip", note.to_str());
            return Operation::NoteDropped;
        }

        // a voice already sounding the note wins over an earlier free one, or the note would sound twice
        let Some(index) = self
            .find(note)
            .or_else(|| self.voices.iter().position(Voice::is_free))
        else {
            warn!("All voices busy, dropping {}", note.to_str());
            return Operation::NoteDropped;
        };

        self.voices[index].sound(note, period, amplitude.level(velocity), now, sink);
        Operation::VoiceChange
    }

    /// Silences the voice sounding `note`. Releasing a note which isn't sounding does nothing.
    pub fn release<S: RegisterSink>(&mut self, note: Note, sink: &mut S) -> Operation {
        match self.find(note) {
            Some(index) => {
                self.voices[index].silence(sink);
                Operation::VoiceChange
            }
            None => Operation::none(),
        }
    }

    /// Silences every sounding voice for which `predicate` returns `true`, returning the notes released, indexed by
    /// slot.
    pub fn release_where<S: RegisterSink>(
        &mut self,
        mut predicate: impl FnMut(&Voice) -> bool,
        sink: &mut S,
    ) -> [Option<Note>; VOICE_COUNT] {
        let mut released = [None; VOICE_COUNT];
        for (voice, note) in self.voices.iter_mut().zip(released.iter_mut()) {
            if !voice.is_free() && predicate(&*voice) {
                *note = voice.note;
                voice.silence(sink);
            }
        }
        released
    }

    /// Silences every channel, sounding or not, so the chip ends up in a known state.
    pub fn release_all<S: RegisterSink>(&mut self, sink: &mut S) -> Operation {
        let was_sounding = !self.is_idle();
        self.voices.iter_mut().for_each(|voice| voice.silence(sink));
        if was_sounding {
            Operation::VoiceChange
        } else {
            Operation::none()
        }
    }

    /// Returns the index of the voice sounding `note`.
    pub fn find(&self, note: Note) -> Option<usize> {
        self.voices
            .iter()
            .position(|voice| voice.note == Some(note))
    }

    /// Returns the voice at `index`.
    pub fn slot(&self, index: usize) -> Option<&Voice> {
        self.voices.get(index)
    }

    /// Returns an [`Iterator`] over the notes currently sounding, in allocation order.
    pub fn sounding(&self) -> impl Iterator<Item = Note> + '_ {
        self.voices.iter().filter_map(Voice::note)
    }

    /// Determines whether every voice is free.
    pub fn is_idle(&self) -> bool {
        self.voices.iter().all(Voice::is_free)
    }
}
