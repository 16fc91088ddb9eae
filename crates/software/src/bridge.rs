use crate::{
    Operation,
    configuration::BridgeConfig,
    dispatcher,
    parser::{MessageParser, ParserState},
    psg::{MIXER_TONE_ALL, RegisterSink, register},
    transport::ByteSource,
    voice_pool::VoicePool,
    watchdog,
};

/// Everything needed to turn a MIDI byte stream into sound: the message parser, the voices, the tick counter, and
/// the chip.
///
/// The bridge is driven by a single loop which calls [`poll`][Self::poll] forever. Each call is one scheduler
/// iteration: a waiting byte is consumed, otherwise the tick counter advances and the watchdog may run. Nothing here
/// blocks, and there is exactly one owner, so no synchronization is involved.
///
/// Ticks are a count of idle iterations rather than a measure of time; how long the watchdog's timeout lasts is up to
/// how often the caller ticks.
pub struct Bridge<S> {
    parser: MessageParser,
    voices: VoicePool,
    config: BridgeConfig,
    ticks: u32,
    sink: S,
}

impl<S: RegisterSink> Bridge<S> {
    /// Constructs a [`Bridge`] which programs `sink`. Call [`reset`][Self::reset] before use to put the chip into a
    /// known state.
    pub fn new(sink: S, config: BridgeConfig) -> Self {
        Self {
            parser: MessageParser::new(),
            voices: VoicePool::new(),
            config,
            ticks: 0,
            sink,
        }
    }

    /// Runs one scheduler iteration: reads a byte from `source` if one is waiting, otherwise ticks.
    pub fn poll<B: ByteSource>(&mut self, source: &mut B) -> Operation {
        if source.available() {
            let byte = source.read();
            self.receive(byte)
        } else {
            self.tick()
        }
    }

    /// Feeds one wire byte through the parser, acting upon the message it completes, if any.
    pub fn receive(&mut self, byte: u8) -> Operation {
        match self.parser.feed(byte) {
            Some(message) => dispatcher::dispatch(
                message,
                &mut self.voices,
                &mut self.sink,
                self.config.amplitude,
                self.ticks,
            ),
            None => Operation::none(),
        }
    }

    /// Advances the tick counter, wrapping on overflow, and runs the watchdog if it is due.
    pub fn tick(&mut self) -> Operation {
        self.ticks = self.ticks.wrapping_add(1);
        Operation::Tick
            | watchdog::sweep(
                &mut self.voices,
                &mut self.sink,
                &self.config.watchdog,
                self.ticks,
            )
    }

    /// Silences every channel, enables tone output, and forgets any partially received message.
    pub fn reset(&mut self) -> Operation {
        self.parser.reset();
        self.sink.write_register(register::MIXER, MIXER_TONE_ALL);
        self.voices.release_all(&mut self.sink)
    }

    /// Getter.
    pub fn voices(&self) -> &VoicePool {
        &self.voices
    }

    /// Getter.
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Allows settings to be changed between iterations.
    pub fn config_mut(&mut self) -> &mut BridgeConfig {
        &mut self.config
    }

    /// Returns the current value of the tick counter.
    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    /// Returns where the parser is within the current message.
    pub fn parser_state(&self) -> ParserState {
        self.parser.state()
    }

    /// Getter.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Gives back the sink.
    pub fn into_sink(self) -> S {
        self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        configuration::{Amplitude, WatchdogTiming},
        psg::{LEVEL_OFF, register},
        test_support::RecordingSink,
    };
    use wmidi::Note;

    fn bridge() -> Bridge<RecordingSink> {
        Bridge::new(RecordingSink::default(), BridgeConfig::default())
    }

    fn receive_all(bridge: &mut Bridge<RecordingSink>, bytes: &[u8]) -> Operation {
        bytes
            .iter()
            .fold(Operation::none(), |operation, &byte| operation | bridge.receive(byte))
    }

    #[test]
    fn note_on_then_running_status() {
        let mut bridge = bridge();

        receive_all(&mut bridge, &[0x90, 60, 127, 61, 100]);

        let mut sounding = bridge.voices().sounding();
        assert_eq!(Some(Note::C4), sounding.next());
        assert_eq!(Some(Note::Db4), sounding.next());
        assert_eq!(None, sounding.next());
    }

    #[test]
    fn channel_6_note_off_is_a_raw_write() {
        let mut bridge = bridge();
        receive_all(&mut bridge, &[0x90, 60, 127]);
        bridge.sink.take();

        let operation = receive_all(&mut bridge, &[0x85, 60, 0]);

        assert!(operation.contains(Operation::RawWrite));
        assert_eq!(Some(0), bridge.voices().find(Note::C4), "Note should still be sounding");
        assert_eq!(&[(60, 0)], bridge.sink().writes());
    }

    #[test]
    fn stray_data_bytes_do_nothing() {
        let mut bridge = bridge();

        let operation = receive_all(&mut bridge, &[45, 50]);

        assert!(operation.is_none());
        assert!(bridge.sink().writes().is_empty());
        assert_eq!(ParserState::Idle, bridge.parser_state());
    }

    #[test]
    fn concert_a_frequency() {
        let mut bridge = bridge();

        receive_all(&mut bridge, &[0x90, 69, 127]);

        let writes = bridge.sink().writes();
        assert!(writes.contains(&(register::FREQ_B_LSB, (262 & 0xFF) as u8)));
        assert!(writes.contains(&(register::FREQ_B_MSB, (262 >> 8) as u8)));
    }

    #[test]
    fn raw_write_is_a_single_write() {
        let mut bridge = bridge();

        let operation = receive_all(&mut bridge, &[0x85, 0x07, 0x38]);

        assert!(operation.contains(Operation::RawWrite));
        assert_eq!(&[(0x07, 0x38)], bridge.sink().writes());
        assert!(bridge.voices().is_idle());
    }

    #[test]
    fn poll_prefers_bytes_over_ticks() {
        let mut bridge = bridge();
        let bytes = [0x90, 60, 127];
        let mut source = bytes.iter();

        for _ in 0..bytes.len() {
            assert!(!bridge.poll(&mut source).contains(Operation::Tick));
        }
        assert_eq!(0, bridge.ticks());
        assert_eq!(Some(0), bridge.voices().find(Note::C4));

        assert!(bridge.poll(&mut source).contains(Operation::Tick));
        assert_eq!(1, bridge.ticks());
    }

    #[test]
    fn hung_note_is_released_by_watchdog() {
        let mut bridge = bridge();
        receive_all(&mut bridge, &[0x90, 60, 127]);

        let mut operation = Operation::none();
        for _ in 0..3999 {
            operation |= bridge.tick();
        }
        assert!(!operation.contains(Operation::Eviction));
        assert_eq!(Some(0), bridge.voices().find(Note::C4));

        // the timeout has passed at 4000, and the watchdog is due on that same tick
        assert!(bridge.tick().contains(Operation::Eviction));
        assert!(bridge.voices().is_idle());
        assert_eq!(Some(&(register::LEVEL_B, LEVEL_OFF)), bridge.sink().writes().last());
    }

    #[test]
    fn eviction_waits_for_sampling_tick() {
        let mut bridge = bridge();
        for _ in 0..10 {
            bridge.tick();
        }
        receive_all(&mut bridge, &[0x90, 60, 127]);

        for _ in 10..4000 {
            bridge.tick();
        }
        assert_eq!(Some(0), bridge.voices().find(Note::C4), "Held for 3990 ticks only");

        for _ in 4000..5000 {
            bridge.tick();
        }
        assert!(bridge.voices().is_idle(), "Released on the pass at tick 5000");
    }

    #[test]
    fn tick_counter_wraps() {
        let mut bridge = Bridge::new(
            RecordingSink::default(),
            BridgeConfig {
                amplitude: Amplitude::Fixed,
                watchdog: WatchdogTiming {
                    interval: 0,
                    timeout: 4000,
                },
            },
        );
        bridge.ticks = u32::MAX;

        bridge.tick();

        assert_eq!(0, bridge.ticks());
    }

    #[test]
    fn config_changes_apply_to_next_note() {
        let mut bridge = bridge();
        bridge.config_mut().amplitude = Amplitude::Velocity;

        receive_all(&mut bridge, &[0x90, 60, 64]);

        assert!(bridge.sink().writes().contains(&(register::LEVEL_B, 8)));
    }

    #[test]
    fn reset_silences_and_clears_parser() {
        let mut bridge = bridge();
        receive_all(&mut bridge, &[0x90, 60, 127, 64]);
        bridge.sink.take();

        let operation = bridge.reset();

        assert!(operation.contains(Operation::VoiceChange));
        assert!(bridge.voices().is_idle());
        assert_eq!(ParserState::Idle, bridge.parser_state());
        assert_eq!(
            &[
                (register::MIXER, MIXER_TONE_ALL),
                (register::LEVEL_B, LEVEL_OFF),
                (register::LEVEL_A, LEVEL_OFF),
                (register::LEVEL_C, LEVEL_OFF),
            ],
            bridge.into_sink().writes()
        );
    }
}
