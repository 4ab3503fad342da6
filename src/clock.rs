use std::thread;
use std::time::{Duration, Instant};

/// Millisecond time source and delay provider consumed by the driver.
///
/// The counter wraps at 2^32 ms; the sampling scheduler treats a negative
/// elapsed time as stale, so a wrapped counter costs at most one extra
/// conversion.
pub trait Clock {
    fn now_millis(&self) -> u32;
    fn delay_millis(&mut self, ms: u32);
}

/// `Clock` backed by the OS monotonic clock.
pub struct SystemClock {
    epoch: Instant,
}

impl SystemClock {
    pub fn new() -> SystemClock {
        SystemClock { epoch: Instant::now() }
    }
}

impl Clock for SystemClock {
    fn now_millis(&self) -> u32 {
        self.epoch.elapsed().as_millis() as u32
    }

    fn delay_millis(&mut self, ms: u32) {
        thread::sleep(Duration::from_millis(ms as u64));
    }
}
