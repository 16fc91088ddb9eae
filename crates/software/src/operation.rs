use bitmask_enum::bitmask;

/// Operations that may be performed while handling a byte or a tick. Returned by every entry point of the
/// [`Bridge`][crate::Bridge] so that callers can react (e.g., by updating an activity indicator) without
/// inspecting the voice pool after every call.
#[bitmask(u8)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Operation {
    /// A voice started sounding, was re-triggered, or was silenced by a note-off.
    VoiceChange,
    /// A note-on could not be voiced, either because every voice was busy or because the note has no pitch on the chip.
    NoteDropped,
    /// A register was written on behalf of a raw register write message.
    RawWrite,
    /// The watchdog silenced at least one hung voice.
    Eviction,
    /// The tick counter advanced.
    Tick,
}
