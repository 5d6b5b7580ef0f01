use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Sleep in short slices so a stop request is honored within ~50 ms.
pub(crate) fn sleep_interruptible(stop: &AtomicBool, ms: u64) {
    let mut remaining = ms;
    while remaining > 0 {
        if stop.load(Ordering::SeqCst) {
            return;
        }
        let step = remaining.min(50);
        std::thread::sleep(Duration::from_millis(step));
        remaining -= step;
    }
}

pub(crate) fn scaled_delay_ms(delta_secs: f64, time_scale: f64) -> u64 {
    let ms = delta_secs * time_scale * 1000.0;
    if ms.is_finite() && ms > 0.0 {
        ms.round() as u64
    } else {
        0
    }
}
