//! # Periodic Pacer
//!
//! Fixed-period scheduling for the link workers. Each iteration measures how
//! long its work took and sleeps the remainder of the period. When the work
//! ate most of the period, the worker sleeps a full period instead of
//! spinning on a near-zero remainder.

use tokio::time::{sleep, Duration, Instant};

/// Share of the period, in tenths, that triggers a full-period sleep once exceeded
pub const OVERRUN_TENTHS: u32 = 7;

/// Sleep needed after one unit of work to keep a fixed period.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use headtracker_link::pacer::pacing_delay;
///
/// let period = Duration::from_millis(10);
/// assert_eq!(pacing_delay(period, Duration::from_millis(2)), Duration::from_millis(8));
/// assert_eq!(pacing_delay(period, Duration::from_millis(8)), period);
/// ```
pub fn pacing_delay(period: Duration, elapsed: Duration) -> Duration {
    if elapsed * 10 > period * OVERRUN_TENTHS {
        period
    } else {
        period - elapsed
    }
}

/// Async driver around [`pacing_delay`].
///
/// Call [`begin`](Self::begin) before the work and [`wait`](Self::wait)
/// after it.
#[derive(Debug)]
pub struct PeriodicPacer {
    period: Duration,
    started: Instant,
    overruns: u64,
}

impl PeriodicPacer {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            started: Instant::now(),
            overruns: 0,
        }
    }

    /// Pacer for a rate in Hz.
    pub fn from_hz(rate_hz: u32) -> Self {
        Self::new(Duration::from_secs(1) / rate_hz.max(1))
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Iterations whose work overran the period threshold.
    pub fn overruns(&self) -> u64 {
        self.overruns
    }

    /// Marks the start of one unit of work.
    pub fn begin(&mut self) {
        self.started = Instant::now();
    }

    /// Sleeps until the next period boundary.
    pub async fn wait(&mut self) {
        let elapsed = self.started.elapsed();
        let delay = pacing_delay(self.period, elapsed);
        if delay == self.period && !elapsed.is_zero() {
            self.overruns += 1;
        }
        sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PERIOD: Duration = Duration::from_micros(12_500);

    #[test]
    fn test_short_work_sleeps_remainder() {
        assert_eq!(pacing_delay(PERIOD, Duration::from_micros(2_500)), Duration::from_micros(10_000));
        assert_eq!(pacing_delay(PERIOD, Duration::ZERO), PERIOD);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        // Exactly 70% still sleeps the remainder
        assert_eq!(pacing_delay(PERIOD, Duration::from_micros(8_750)), Duration::from_micros(3_750));
        assert_eq!(pacing_delay(PERIOD, Duration::from_micros(8_751)), PERIOD);
    }

    #[test]
    fn test_overrun_sleeps_full_period() {
        assert_eq!(pacing_delay(PERIOD, Duration::from_micros(12_000)), PERIOD);
        assert_eq!(pacing_delay(PERIOD, Duration::from_millis(50)), PERIOD);
    }

    #[test]
    fn test_from_hz() {
        assert_eq!(PeriodicPacer::from_hz(80).period(), Duration::from_micros(12_500));
        assert_eq!(PeriodicPacer::from_hz(0).period(), Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_completes_period() {
        let period = Duration::from_millis(10);
        let mut pacer = PeriodicPacer::new(period);
        let start = Instant::now();

        pacer.begin();
        tokio::time::advance(Duration::from_millis(2)).await;
        pacer.wait().await;

        assert_eq!(start.elapsed(), period);
        assert_eq!(pacer.overruns(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_after_overrun() {
        let period = Duration::from_millis(10);
        let mut pacer = PeriodicPacer::new(period);
        let start = Instant::now();

        pacer.begin();
        tokio::time::advance(Duration::from_millis(8)).await;
        pacer.wait().await;

        assert_eq!(start.elapsed(), Duration::from_millis(18));
        assert_eq!(pacer.overruns(), 1);
    }
}
