//! Tasks and types related to the [amplitude](`Amplitude`) setting.

use embassy_stm32::{exti::ExtiInput, gpio::Output};
use embassy_sync::{
    blocking_mutex::raw::CriticalSectionRawMutex,
    watch::{AnonReceiver, Sender, Watch},
};
use psg_bridge_lib::configuration::{Amplitude, CycleConfig};

const AMPLITUDE_RECEIVER_CNT: usize = 0;
/// Syncs the [amplitude](`Amplitude`) setting across tasks.
pub static AMPLITUDE_SYNC: Watch<CriticalSectionRawMutex, Amplitude, AMPLITUDE_RECEIVER_CNT> =
    Watch::new_with(Amplitude::Fixed);
pub type AmplitudeSender<'a> =
    Sender<'a, CriticalSectionRawMutex, Amplitude, AMPLITUDE_RECEIVER_CNT>;
pub type AmplitudeSpy<'a> =
    AnonReceiver<'a, CriticalSectionRawMutex, Amplitude, AMPLITUDE_RECEIVER_CNT>;

/// Input and status indicator for the amplitude setting.
///
/// Each press of the user button toggles between fixed volume (no LED) and velocity-scaled volume (solid blue LED).
/// Notes which are already sounding keep their level; the setting applies from the next note-on.
#[embassy_executor::task]
pub async fn amplitude_config(
    mut button: ExtiInput<'static>,
    mut led: Output<'static>,
    amplitude: AmplitudeSender<'static>,
) -> ! {
    loop {
        button.wait_for_rising_edge().await;

        let new_state = amplitude.try_get().unwrap_or_default().cycle();
        amplitude.send(new_state);

        match new_state {
            Amplitude::Fixed => {
                led.set_low();
            }
            Amplitude::Velocity => {
                led.set_high();
            }
        }
    }
}
