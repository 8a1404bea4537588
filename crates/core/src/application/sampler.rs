// Time-windowed sampler
use crate::application::constants::{DEFAULT_SAMPLE_COUNT, DEFAULT_SAMPLE_WINDOW, SAMPLE_TIMEOUT};
use crate::domain::TelemetryError;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Window over which one metric is sampled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleWindow {
    /// Number of measurements (at least 1)
    pub count: usize,
    /// Total span; measurements are `window / count` apart
    pub window: Duration,
    /// Per-measurement timeout
    pub sample_timeout: Duration,
}

impl Default for SampleWindow {
    fn default() -> Self {
        Self {
            count: DEFAULT_SAMPLE_COUNT,
            window: DEFAULT_SAMPLE_WINDOW,
            sample_timeout: SAMPLE_TIMEOUT,
        }
    }
}

impl SampleWindow {
    pub fn interval(&self) -> Duration {
        self.window / self.count.max(1) as u32
    }
}

/// One measurement; invalid samples are kept only to count attempts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub value: f64,
    pub valid: bool,
}

impl Sample {
    pub fn valid(value: f64) -> Self {
        Self { value, valid: true }
    }

    pub fn invalid() -> Self {
        Self {
            value: 0.0,
            valid: false,
        }
    }
}

/// Reduced window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleSummary {
    /// Mean of valid samples, 0 when none succeeded
    pub average: f64,
    pub samples_count: usize,
    pub attempted: usize,
}

/// Arithmetic mean of the valid samples
pub fn reduce(samples: &[Sample]) -> SampleSummary {
    let valid: Vec<f64> = samples.iter().filter(|s| s.valid).map(|s| s.value).collect();
    let average = if valid.is_empty() {
        0.0
    } else {
        valid.iter().sum::<f64>() / valid.len() as f64
    };

    SampleSummary {
        average,
        samples_count: valid.len(),
        attempted: samples.len(),
    }
}

/// Takes paced, individually fallible measurements and averages them
#[derive(Debug, Clone, Copy, Default)]
pub struct Sampler {
    window: SampleWindow,
}

impl Sampler {
    pub fn new(window: SampleWindow) -> Self {
        Self { window }
    }

    pub fn window(&self) -> SampleWindow {
        self.window
    }

    /// Sample `query` `count` times, `interval` apart
    ///
    /// A failed or timed-out measurement is dropped, never retried, and does not
    /// stop the window. Measurements run sequentially; there is no delay after
    /// the last one.
    pub async fn sample<F, Fut>(&self, metric: &str, mut query: F) -> SampleSummary
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<f64, TelemetryError>>,
    {
        let count = self.window.count.max(1);
        let interval = self.window.interval();
        let mut samples = Vec::with_capacity(count);

        for index in 0..count {
            let outcome = match tokio::time::timeout(self.window.sample_timeout, query()).await {
                Ok(result) => result,
                Err(_) => Err(TelemetryError::SampleTimeout(
                    self.window.sample_timeout.as_millis() as u64,
                )),
            };

            match outcome {
                Ok(value) => samples.push(Sample::valid(value)),
                Err(e) => {
                    debug!(metric = %metric, sample = index, error = %e, "Sample dropped");
                    samples.push(Sample::invalid());
                }
            }

            if index + 1 < count {
                tokio::time::sleep(interval).await;
            }
        }

        let summary = reduce(&samples);
        if summary.samples_count == 0 {
            warn!(
                metric = %metric,
                attempted = summary.attempted,
                "Every sample in the window failed"
            );
        } else {
            debug!(
                metric = %metric,
                average = summary.average,
                samples = summary.samples_count,
                attempted = summary.attempted,
                "Sample window reduced"
            );
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::CommandError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn fast_window(count: usize) -> SampleWindow {
        SampleWindow {
            count,
            window: Duration::from_millis(count as u64 * 2),
            sample_timeout: Duration::from_millis(50),
        }
    }

    #[test]
    fn test_default_window_paces_250ms() {
        let window = SampleWindow::default();
        assert_eq!(window.count, 8);
        assert_eq!(window.interval(), Duration::from_millis(250));
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_is_paced_without_trailing_sleep() {
        let window = SampleWindow {
            count: 4,
            window: Duration::from_millis(400),
            sample_timeout: Duration::from_millis(50),
        };
        let taken = std::sync::Mutex::new(Vec::new());
        let started = tokio::time::Instant::now();

        Sampler::new(window)
            .sample("cpu", || {
                taken.lock().unwrap().push(started.elapsed());
                async { Ok(1.0) }
            })
            .await;
        let elapsed = started.elapsed();

        // Timer wheel resolution is 1ms
        let slack = Duration::from_millis(2);
        let taken = taken.into_inner().unwrap();
        assert_eq!(taken.len(), 4);
        for (index, at) in taken.iter().enumerate() {
            let expected = Duration::from_millis(100) * index as u32;
            assert!(*at >= expected && *at < expected + slack * (index as u32 + 1));
        }
        assert!(elapsed >= Duration::from_millis(300));
        assert!(elapsed < Duration::from_millis(400));
    }

    #[test]
    fn test_reduce_ignores_invalid() {
        let summary = reduce(&[Sample::valid(10.0), Sample::invalid(), Sample::valid(20.0)]);
        assert_eq!(summary.average, 15.0);
        assert_eq!(summary.samples_count, 2);
        assert_eq!(summary.attempted, 3);
    }

    #[tokio::test]
    async fn test_constant_input_is_idempotent() {
        let sampler = Sampler::new(fast_window(8));
        let summary = sampler.sample("cpu", || async { Ok(37.5) }).await;
        assert_eq!(summary.average, 37.5);
        assert_eq!(summary.samples_count, 8);
    }

    #[tokio::test]
    async fn test_all_failures_yield_zero() {
        let sampler = Sampler::new(fast_window(8));
        let summary = sampler
            .sample("cpu", || async {
                Err(TelemetryError::Command(CommandError::Timeout(2000)))
            })
            .await;
        assert_eq!(summary.average, 0.0);
        assert_eq!(summary.samples_count, 0);
        assert_eq!(summary.attempted, 8);
    }

    #[tokio::test]
    async fn test_partial_failures_are_dropped_not_retried() {
        let calls = AtomicUsize::new(0);
        let sampler = Sampler::new(fast_window(4));

        let summary = sampler
            .sample("cpu", || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n % 2 == 0 {
                        Ok(40.0)
                    } else {
                        Err(TelemetryError::Unsupported("cpu"))
                    }
                }
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(summary.average, 40.0);
        assert_eq!(summary.samples_count, 2);
    }

    #[tokio::test]
    async fn test_slow_sample_times_out() {
        let calls = AtomicUsize::new(0);
        let sampler = Sampler::new(fast_window(3));

        let summary = sampler
            .sample("cpu", || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n == 1 {
                        tokio::time::sleep(Duration::from_secs(30)).await;
                    }
                    Ok(12.0)
                }
            })
            .await;

        assert_eq!(summary.samples_count, 2);
        assert_eq!(summary.average, 12.0);
    }
}
