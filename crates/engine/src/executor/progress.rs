//! Client-side progress estimate for a pending workflow request.
//!
//! Workflow backends do not report progress. The estimate here is driven only
//! by elapsed time: it climbs towards [`ESTIMATE_CEILING`] and reaches 100
//! only when the caller marks the request complete. Front ends must present
//! it as an estimate.

use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Highest percentage reachable before the response arrives.
pub const ESTIMATE_CEILING: f64 = 90.0;

/// Label front ends show next to the percentage.
pub const ESTIMATE_LABEL: &str = "estimated (client-side)";

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProgressEstimate {
    pub percent: f64,
    pub complete: bool,
}

impl ProgressEstimate {
    pub fn started() -> Self {
        Self {
            percent: 0.0,
            complete: false,
        }
    }

    pub fn finished() -> Self {
        Self {
            percent: 100.0,
            complete: true,
        }
    }

    pub fn label(&self) -> &'static str {
        ESTIMATE_LABEL
    }
}

/// Time-based curve mapping elapsed time to a percentage.
#[derive(Debug, Clone, Copy)]
pub struct ProgressEstimator {
    /// Elapsed time at which the estimate reaches about 63% of the ceiling.
    pub time_constant: Duration,
}

impl Default for ProgressEstimator {
    fn default() -> Self {
        Self {
            time_constant: Duration::from_secs(20),
        }
    }
}

impl ProgressEstimator {
    pub fn new(time_constant: Duration) -> Self {
        Self { time_constant }
    }

    /// Estimated percentage after `elapsed`; at most [`ESTIMATE_CEILING`].
    pub fn estimate_at(&self, elapsed: Duration) -> f64 {
        let tau = self.time_constant.as_secs_f64().max(f64::EPSILON);
        let ratio = elapsed.as_secs_f64() / tau;
        let percent = ESTIMATE_CEILING * (1.0 - (-ratio).exp());
        percent.clamp(0.0, ESTIMATE_CEILING)
    }
}

/// Background timer publishing estimates on a watch channel.
#[derive(Debug)]
pub struct ProgressTicker {
    sender: watch::Sender<ProgressEstimate>,
    handle: JoinHandle<()>,
}

impl ProgressTicker {
    /// Start publishing an estimate every `interval`.
    pub fn start(estimator: ProgressEstimator, interval: Duration) -> (Self, watch::Receiver<ProgressEstimate>) {
        let (sender, receiver) = watch::channel(ProgressEstimate::started());
        let task_sender = sender.clone();
        let handle = tokio::spawn(async move {
            let started = Instant::now();
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let estimate = ProgressEstimate {
                    percent: estimator.estimate_at(started.elapsed()),
                    complete: false,
                };
                if task_sender.send(estimate).is_err() {
                    break;
                }
            }
        });
        (Self { sender, handle }, receiver)
    }

    /// Stop the timer and publish 100%.
    pub fn complete(self) {
        self.handle.abort();
        self.sender.send_replace(ProgressEstimate::finished());
    }

    /// Stop the timer without claiming completion.
    pub fn cancel(self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimate_climbs_and_stops_at_ceiling() {
        let estimator = ProgressEstimator::new(Duration::from_secs(10));

        assert_eq!(estimator.estimate_at(Duration::ZERO), 0.0);
        let early = estimator.estimate_at(Duration::from_secs(5));
        let late = estimator.estimate_at(Duration::from_secs(60));
        assert!(early > 0.0 && early < late);
        assert!(late < ESTIMATE_CEILING);
        assert_eq!(estimator.estimate_at(Duration::from_secs(86_400)), ESTIMATE_CEILING);
    }

    #[tokio::test]
    async fn ticker_publishes_and_completes() {
        let (ticker, mut receiver) = ProgressTicker::start(ProgressEstimator::default(), Duration::from_millis(5));

        receiver.changed().await.unwrap();
        assert!(!receiver.borrow().complete);

        ticker.complete();
        let last = *receiver.borrow_and_update();
        assert_eq!(last, ProgressEstimate::finished());
        assert_eq!(last.label(), "estimated (client-side)");
    }
}
