//! Recovers voices whose note-off never arrived.
//!
//! The watchdog is a sampling check rather than a timer: it only looks at the voices on ticks divisible by the
//! [interval][WatchdogTiming::interval], so a hung note is released somewhere between
//! [`timeout`][WatchdogTiming::timeout] and `timeout + interval` ticks after it started.

use crate::{Operation, configuration::WatchdogTiming, psg::RegisterSink, voice_pool::VoicePool};

/// Silences every voice that has been sounding for at least the configured timeout, provided the watchdog is due
/// on tick `now`.
pub fn sweep<S: RegisterSink>(
    voices: &mut VoicePool,
    sink: &mut S,
    timing: &WatchdogTiming,
    now: u32,
) -> Operation {
    if !timing.is_due(now) {
        return Operation::none();
    }

    let mut operation = Operation::none();
    let released = voices.release_where(|voice| timing.is_expired(voice.age(now)), sink);
    for note in released.into_iter().flatten() {
        warn!("Releasing hung note {} at tick {}", note.to_str(), now);
        operation |= Operation::Eviction;
    }
    operation
}
