/// How often the [watchdog][crate::watchdog] looks for hung notes, and how long a note may sound before it is
/// considered hung. Both are measured in ticks, i.e., scheduler iterations, so their duration in seconds depends on
/// how fast the caller ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WatchdogTiming {
    /// The watchdog only runs on ticks divisible by this number. Zero disables the watchdog.
    pub interval: u32,
    /// A voice which has sounded for at least this many ticks is released when the watchdog runs.
    pub timeout: u32,
}

impl WatchdogTiming {
    /// Ticks between watchdog passes.
    pub const INTERVAL: u32 = 1000;
    /// Ticks after which a held note is considered hung.
    pub const TIMEOUT: u32 = 4000;

    /// Determines whether the watchdog should run on tick `now`.
    pub fn is_due(&self, now: u32) -> bool {
        now.checked_rem(self.interval) == Some(0)
    }

    /// Determines whether a voice which has sounded for `age` ticks has been held too long.
    pub fn is_expired(&self, age: u32) -> bool {
        age >= self.timeout
    }
}

impl Default for WatchdogTiming {
    fn default() -> Self {
        Self {
            interval: Self::INTERVAL,
            timeout: Self::TIMEOUT,
        }
    }
}
