use std::time::Duration;

/// Periods of the two background processes driving a timer session.
#[derive(Debug, Clone, Copy)]
pub struct TimerConfig {
    /// Clock advance period.
    pub tick_interval: Duration,

    /// Half-period of the overtime blink.
    pub blink_interval: Duration,

    /// Log every tick at debug level.
    pub trace_ticks: bool,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(1),
            blink_interval: Duration::from_millis(500),
            trace_ticks: false,
        }
    }
}

impl TimerConfig {
    /// Defaults, with tick tracing switched on by `PITCHPERFECT_DEBUG`.
    pub fn from_env() -> Self {
        let trace_ticks = std::env::var("PITCHPERFECT_DEBUG")
            .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Self {
            trace_ticks,
            ..Self::default()
        }
    }
}
