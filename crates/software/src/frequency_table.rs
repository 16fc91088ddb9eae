//! Maps MIDI notes to the tone periods which make the chip sound them.
//!
//! A tone period is the divisor the chip applies to its master clock: a channel sounds at
//! `CLOCK_HZ / (16 * period)`. The table is computed for [`CLOCK_HZ`] and tuned to A4 = 440 Hz. Notes below
//! B♭0 would need a period wider than 12 bits and have no entry; their slot holds 0, meaning "no pitch".

use crate::psg::CLOCK_HZ;
use measurements::Frequency;
use wmidi::Note;

/// Tone periods indexed by MIDI note number.
#[rustfmt::skip]
const TONE_PERIODS: [u16; 128] = [
       0,    0,    0,    0,    0,    0,    0,    0,    0,    0,    0,    0, // 0..11
       0,    0,    0,    0,    0,    0,    0,    0,    0,    0, 3954, 3732, // 12..23
    3523, 3325, 3138, 2962, 2796, 2639, 2491, 2351, 2219, 2095, 1977, 1866, // 24..35
    1761, 1662, 1569, 1481, 1398, 1319, 1245, 1176, 1110, 1047,  988,  933, // 36..47
     881,  831,  785,  741,  699,  660,  623,  588,  555,  524,  494,  467, // 48..59
     440,  416,  392,  370,  349,  330,  311,  294,  277,  262,  247,  233, // 60..71
     220,  208,  196,  185,  175,  165,  156,  147,  139,  131,  124,  117, // 72..83
     110,  104,   98,   93,   87,   82,   78,   73,   69,   65,   62,   58, // 84..95
      55,   52,   49,   46,   44,   41,   39,   37,   35,   33,   31,   29, // 96..107
      28,   26,   25,   23,   22,   21,   19,   18,   17,   16,   15,   15, // 108..119
      14,   13,   12,   12,   11,   10,   10,    9, // 120..127
];

/// Returns the tone period for `note`, or 0 if the chip cannot sound it.
///
/// A 0 must never be written to a tone register as though it were a pitch; see [`is_supported`].
pub fn tone_period(note: Note) -> u16 {
    TONE_PERIODS[usize::from(u8::from(note))]
}

/// Determines whether the chip can sound `note`.
pub fn is_supported(note: Note) -> bool {
    tone_period(note) != 0
}

/// Returns the [`Frequency`] the chip actually produces for `note`, which differs slightly from equal temperament
/// because tone periods are integers.
pub fn output_frequency(note: Note) -> Option<Frequency> {
    match tone_period(note) {
        0 => None,
        period => Some(Frequency::from_hertz(CLOCK_HZ / (16.0 * f64::from(period)))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hertz(note: Note) -> f64 {
        output_frequency(note)
            .expect("note should be supported")
            .as_hertz()
    }

    #[test]
    fn concert_a() {
        assert_eq!(262, tone_period(Note::A4), "Expected left but got right");
        let a4 = hertz(Note::A4);
        assert!(a4 > 439.0 && a4 < 441.0, "A4 should sound at 440 Hz, got {}", a4);
    }

    #[test]
    fn octaves_halve_the_period() {
        let a3 = hertz(Note::A3);
        let a5 = hertz(Note::A5);
        assert!(a3 > 219.0 && a3 < 221.0, "A3 should sound at 220 Hz, got {}", a3);
        assert!(a5 > 878.0 && a5 < 882.0, "A5 should sound at 880 Hz, got {}", a5);
    }

    #[test]
    fn lowest_supported_note() {
        assert!(!is_supported(Note::A0));
        assert!(is_supported(Note::Bb0));
        assert_eq!(3954, tone_period(Note::Bb0), "Expected left but got right");
    }

    #[test]
    fn unsupported_notes_have_no_frequency() {
        assert_eq!(0, tone_period(Note::CMinus1));
        assert!(output_frequency(Note::CMinus1).is_none());
    }

    #[test]
    fn periods_fit_twelve_bits_and_never_rise() {
        let supported = TONE_PERIODS.iter().filter(|&&period| period != 0);
        assert!(supported.clone().all(|&period| period <= 0x0FFF));
        assert!(
            supported
                .clone()
                .zip(supported.skip(1))
                .all(|(lower, higher)| higher <= lower),
            "Higher notes should never need a longer period"
        );
    }

    #[test]
    fn highest_note() {
        assert_eq!(9, tone_period(Note::G9), "Expected left but got right");
    }
}
