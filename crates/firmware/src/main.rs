//! PSG Bridge is [Embassy](https://embassy.dev)-based firmware for a MIDI adapter which plays a
//! [YM2149](https://en.wikipedia.org/wiki/General_Instrument_AY-3-8910) programmable sound generator as a
//! three-voice synthesizer. The firmware runs on the [Nucleo-F767ZI development
//! board](https://www.st.com/en/evaluation-tools/nucleo-f767zi.html), which is powered by an F7-series
//! STM32 microcontroller.
//!
//! MIDI arrives over USB and is queued byte by byte. A single synth task drains the queue through a
//! [`Bridge`], which allocates notes to the chip's three tone channels and writes its registers over a parallel bus.
//! When the queue is empty the task ticks once per millisecond, which is what the bridge's hung-note watchdog counts.

#![no_std]
#![no_main]

mod amplitude;
mod ym2149;

use crate::{
    amplitude::{AMPLITUDE_SYNC, AmplitudeSpy, amplitude_config},
    ym2149::Ym2149,
};
use defmt::{panic, *};
use embassy_executor::Spawner;
use embassy_futures::yield_now;
use embassy_stm32::{
    Config, bind_interrupts,
    exti::ExtiInput,
    gpio::{Level, Output, Pull, Speed},
    peripherals,
    time::Hertz,
    usb,
};
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, channel::Channel};
use embassy_time::{Duration, Ticker};
use embassy_usb::{Builder, UsbDevice, class::midi::MidiClass, driver::EndpointError};
use psg_bridge_lib::{
    Bridge, Operation,
    configuration::BridgeConfig,
    transport::{ByteSource, usb_midi_bytes},
};
use static_cell::StaticCell;

use {defmt_rtt as _, panic_probe as _};

bind_interrupts!(
    #[doc(hidden)]
    struct Irqs {
        OTG_FS => usb::InterruptHandler<peripherals::USB_OTG_FS>;
    }
);

type UsbDriver = usb::Driver<'static, peripherals::USB_OTG_FS>;

/// Length of one tick. With the default watchdog timing, notes are checked every second and a note held for four
/// seconds is considered hung.
const TICK: Duration = Duration::from_millis(1);

const MIDI_QUEUE_LEN: usize = 256;

/// MIDI bytes received over USB, waiting to be handled by the synth task.
static MIDI_BYTES: Channel<CriticalSectionRawMutex, u8, MIDI_QUEUE_LEN> = Channel::new();

/// The synth task's view of [`MIDI_BYTES`].
struct QueuedBytes;

impl ByteSource for QueuedBytes {
    fn available(&mut self) -> bool {
        !MIDI_BYTES.is_empty()
    }

    fn read(&mut self) -> u8 {
        // the synth task is the only receiver, so a byte seen as available is still there
        MIDI_BYTES.try_receive().unwrap_or_default()
    }
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Initializing PSG Bridge");

    let mut config = Config::default();
    {
        use embassy_stm32::rcc::*;
        // hse: high-speed external clock
        config.rcc.hse = Some(Hse {
            freq: Hertz(8_000_000),
            mode: HseMode::Bypass,
        });

        // pll: phase-locked loop, crucial for dividing clock
        config.rcc.pll_src = PllSource::HSE;
        config.rcc.pll = Some(Pll {
            prediv: PllPreDiv::DIV4,
            mul: PllMul::MUL216,
            divp: Some(PllPDiv::DIV2), // 8mhz / 4 * 216 / 2 = 216Mhz
            // the 48MHz clock used for USB OTG FS is derived from the main PLL VCO (PLLQ clock), see RM0410 section 5.2
            divq: Some(PllQDiv::DIV9), // 8mhz / 4 * 216 / 9 = 48Mhz
            divr: None,
        });
        config.rcc.ahb_pre = AHBPrescaler::DIV1;
        config.rcc.apb1_pre = APBPrescaler::DIV4;
        config.rcc.apb2_pre = APBPrescaler::DIV2;
        config.rcc.sys = Sysclk::PLL1_P;
        config.rcc.mux.clk48sel = mux::Clk48sel::PLL1_Q;
    }
    let p = embassy_stm32::init(config);

    let button = ExtiInput::new(p.PC13, p.EXTI13, Pull::None);
    let blue_led = Output::new(p.PB7, Level::Low, Speed::Low);
    unwrap!(spawner.spawn(amplitude_config(
        button,
        blue_led,
        AMPLITUDE_SYNC.sender()
    )));

    let ym = Ym2149::new(
        [
            Output::new(p.PE0, Level::Low, Speed::VeryHigh),
            Output::new(p.PE1, Level::Low, Speed::VeryHigh),
            Output::new(p.PE2, Level::Low, Speed::VeryHigh),
            Output::new(p.PE3, Level::Low, Speed::VeryHigh),
            Output::new(p.PE4, Level::Low, Speed::VeryHigh),
            Output::new(p.PE5, Level::Low, Speed::VeryHigh),
            Output::new(p.PE6, Level::Low, Speed::VeryHigh),
            Output::new(p.PE7, Level::Low, Speed::VeryHigh),
        ],
        Output::new(p.PF0, Level::Low, Speed::VeryHigh),
        Output::new(p.PF1, Level::Low, Speed::VeryHigh),
    );
    let red_led = Output::new(p.PB14, Level::Low, Speed::Low);
    unwrap!(spawner.spawn(synth_task(ym, red_led, AMPLITUDE_SYNC.anon_receiver())));

    // Create the driver, from the HAL.
    static ENDPOINT_OUT_BUFFER: StaticCell<[u8; 256]> = StaticCell::new();
    let mut config = embassy_stm32::usb::Config::default();

    // USB devices which are self-powered (i.e., that can stay powered on if unplugged from the host)
    // need to enable vbus_detection to comply with the USB spec. Per section 6.10 of the Nucleo board
    // manual (UM1974), CN13 (the USB port) cannot power the board; external power is necessary.
    config.vbus_detection = true;

    let driver = usb::Driver::new_fs(
        p.USB_OTG_FS,
        Irqs,
        p.PA12,
        p.PA11,
        ENDPOINT_OUT_BUFFER.init([0; 256]),
        config,
    );

    // per https://pid.codes, FOSS projects can apply to be listed under the vendor ID owned by InterBiometrics
    let vendor_id = 0x1209;
    let product_id = 0x2149;

    let mut config = embassy_usb::Config::new(vendor_id, product_id);
    config.manufacturer = Some("Pawpaw Works");
    config.product = Some("PSG Bridge");
    config.self_powered = true;
    config.max_power = 0;

    // descriptor buffers for the device builder
    static CONFIG_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
    static BOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
    static CONTROL_BUFFER: StaticCell<[u8; 64]> = StaticCell::new();

    let mut builder = Builder::new(
        driver,
        config,
        CONFIG_DESCRIPTOR.init([0; 256]),
        BOS_DESCRIPTOR.init([0; 256]),
        &mut [], // no msos descriptors
        CONTROL_BUFFER.init([0; 64]),
    );

    let class = MidiClass::new(&mut builder, 0, 1, 64);
    let usb = builder.build();

    unwrap!(spawner.spawn(usb_task(usb)));
    unwrap!(spawner.spawn(midi_task(class)));
}

/// Task which owns the [`Bridge`] and, through it, the chip.
///
/// Each loop is one scheduler iteration. After handling a byte the task only yields, so a burst of MIDI is drained
/// promptly; after a tick it waits for the next tick. The red LED is lit while any voice is sounding.
#[embassy_executor::task]
async fn synth_task(
    ym: Ym2149<'static>,
    mut activity_led: Output<'static>,
    mut amplitude: AmplitudeSpy<'static>,
) -> ! {
    let mut bridge = Bridge::new(ym, BridgeConfig::default());
    bridge.reset();

    let mut source = QueuedBytes;
    let mut ticker = Ticker::every(TICK);
    loop {
        if let Some(selected) = amplitude.try_get() {
            bridge.config_mut().amplitude = selected;
        }

        let operation = bridge.poll(&mut source);

        if operation.contains(Operation::NoteDropped) {
            debug!("Note dropped at tick {}", bridge.ticks());
        }
        if operation.contains(Operation::VoiceChange) || operation.contains(Operation::Eviction) {
            if bridge.voices().is_idle() {
                activity_led.set_low();
            } else {
                activity_led.set_high();
            }
        }

        if operation.contains(Operation::Tick) {
            ticker.next().await;
        } else {
            yield_now().await;
        }
    }
}

#[embassy_executor::task]
async fn usb_task(mut usb: UsbDevice<'static, UsbDriver>) -> ! {
    usb.run().await
}

#[embassy_executor::task]
async fn midi_task(mut class: MidiClass<'static, UsbDriver>) -> ! {
    loop {
        class.wait_connection().await;
        info!("USB connected");
        let _ = process_midi(&mut class).await;
        info!("USB disconnected");
    }
}

#[doc(hidden)]
struct Disconnected {}

impl From<EndpointError> for Disconnected {
    fn from(val: EndpointError) -> Self {
        match val {
            EndpointError::BufferOverflow => panic!("Buffer overflow"),
            EndpointError::Disabled => Disconnected {},
        }
    }
}

/// Helper function which unpacks USB-MIDI Event Packets and queues the MIDI bytes they carry for the synth task.
///
/// Bytes which don't fit in the queue are dropped; the parser recovers at the next status byte.
async fn process_midi<'d, T: usb::Instance + 'd>(
    class: &mut MidiClass<'d, usb::Driver<'d, T>>,
) -> Result<(), Disconnected> {
    let mut buf = [0; 64];
    loop {
        let n = class.read_packet(&mut buf).await?;
        for byte in usb_midi_bytes(&buf[..n]) {
            if MIDI_BYTES.try_send(byte).is_err() {
                warn!("MIDI queue full, dropping byte {=u8:#x}", byte);
            }
        }
    }
}
