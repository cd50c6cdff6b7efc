//! Human-readable helpers for artifact comments.

/// Format a tick count as time, e.g. `262.144 ms`.
pub fn human_time(ticks: u64, timer_frequency_hz: u64) -> String {
    if timer_frequency_hz == 0 {
        return format!("{} ticks", ticks);
    }
    let seconds = ticks as f64 / timer_frequency_hz as f64;
    if seconds >= 1.0 {
        format!("{:.3} s", seconds)
    } else if seconds >= 1e-3 {
        format!("{:.3} ms", seconds * 1e3)
    } else {
        format!("{:.1} us", seconds * 1e6)
    }
}

/// Format a timer frequency, e.g. `8 MHz`.
pub fn human_frequency(hz: u64) -> String {
    if hz >= 1_000_000 && hz % 1_000_000 == 0 {
        format!("{} MHz", hz / 1_000_000)
    } else if hz >= 1_000 && hz % 1_000 == 0 {
        format!("{} kHz", hz / 1_000)
    } else {
        format!("{} Hz", hz)
    }
}

pub fn human_power(dbm: i8) -> String {
    format!("{} dBm", dbm)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_human_time() {
        assert_eq!(human_time(1 << 29, 8_000_000), "67.109 s");
        assert_eq!(human_time(1 << 21, 8_000_000), "262.144 ms");
        assert_eq!(human_time(4, 8_000_000), "0.5 us");
        assert_eq!(human_time(0, 8_000_000), "0.0 us");
        assert_eq!(human_time(7, 0), "7 ticks");
    }

    #[test]
    fn test_human_frequency() {
        assert_eq!(human_frequency(8_000_000), "8 MHz");
        assert_eq!(human_frequency(32_000), "32 kHz");
        assert_eq!(human_frequency(32_768), "32768 Hz");
    }

    #[test]
    fn test_human_power() {
        assert_eq!(human_power(-9), "-9 dBm");
        assert_eq!(human_power(22), "22 dBm");
    }
}
