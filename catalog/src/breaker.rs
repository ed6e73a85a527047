//! Circuit breaker guarding the similar-ids call.
//!
//! Closed records each logical call outcome into a rolling window of the
//! last `window_size` calls. Once the window holds at least
//! `minimum_calls` outcomes and the failure ratio reaches
//! `failure_rate_threshold`, the breaker opens and refuses calls for
//! `open_duration`. It then admits up to `half_open_max_calls` trial
//! calls: all of them succeeding closes the breaker with a fresh window,
//! any failure reopens it and restarts the timer. The breaker cycles
//! indefinitely and is process-scoped.

use crate::config::BreakerConfig;
use crate::metrics_defs::BREAKER_OPENED;
use parking_lot::Mutex;
use shared::counter;
use std::collections::VecDeque;
use std::time::Instant;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

struct Inner {
    state: CircuitState,
    /// Rolling outcome window; `true` marks a failure.
    window: VecDeque<bool>,
    opened_at: Instant,
    trials_admitted: usize,
    trials_succeeded: usize,
}

pub struct CircuitBreaker {
    config: BreakerConfig,
    inner: Mutex<Inner>,
}

impl CircuitBreaker {
    pub fn new(config: BreakerConfig) -> Self {
        let window = VecDeque::with_capacity(config.window_size);
        CircuitBreaker {
            config,
            inner: Mutex::new(Inner {
                state: CircuitState::Closed,
                window,
                opened_at: Instant::now(),
                trials_admitted: 0,
                trials_succeeded: 0,
            }),
        }
    }

    /// Whether a call may proceed. While open, the elapsed timer is
    /// checked here and the breaker moves to half-open in the same
    /// transition, admitting the caller as the first trial. Callers that
    /// get `false` must take the fallback path without touching the
    /// network.
    pub fn try_acquire(&self) -> bool {
        let mut inner = self.inner.lock();
        match inner.state {
            CircuitState::Closed => true,
            CircuitState::Open => {
                if inner.opened_at.elapsed() >= self.config.open_duration() {
                    tracing::info!("circuit breaker half-open, admitting trial calls");
                    inner.state = CircuitState::HalfOpen;
                    inner.trials_admitted = 1;
                    inner.trials_succeeded = 0;
                    true
                } else {
                    false
                }
            }
            CircuitState::HalfOpen => {
                if inner.trials_admitted < self.config.half_open_max_calls {
                    inner.trials_admitted += 1;
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Record one logical call outcome. Retried attempts must be folded
    /// into a single call before reaching this point.
    pub fn record_success(&self) {
        let mut inner = self.inner.lock();
        match inner.state {
            CircuitState::Closed => self.push_outcome(&mut inner, false),
            CircuitState::HalfOpen => {
                inner.trials_succeeded += 1;
                if inner.trials_succeeded >= self.config.half_open_max_calls {
                    tracing::info!("circuit breaker closed after successful trials");
                    inner.state = CircuitState::Closed;
                    inner.window.clear();
                }
            }
            // A straggler admitted before the transition; its outcome no
            // longer belongs to any window.
            CircuitState::Open => {}
        }
    }

    pub fn record_failure(&self) {
        let mut inner = self.inner.lock();
        match inner.state {
            CircuitState::Closed => {
                self.push_outcome(&mut inner, true);
                if self.should_open(&inner) {
                    self.open(&mut inner);
                }
            }
            CircuitState::HalfOpen => self.open(&mut inner),
            CircuitState::Open => {}
        }
    }

    pub fn state(&self) -> CircuitState {
        self.inner.lock().state
    }

    fn push_outcome(&self, inner: &mut Inner, failed: bool) {
        if inner.window.len() == self.config.window_size {
            inner.window.pop_front();
        }
        inner.window.push_back(failed);
    }

    fn should_open(&self, inner: &Inner) -> bool {
        if inner.window.len() < self.config.minimum_calls {
            return false;
        }
        let failures = inner.window.iter().filter(|failed| **failed).count();
        failures as f64 / inner.window.len() as f64 >= self.config.failure_rate_threshold
    }

    fn open(&self, inner: &mut Inner) {
        tracing::warn!("circuit breaker opened for the similar-ids call");
        inner.state = CircuitState::Open;
        inner.opened_at = Instant::now();
        inner.trials_admitted = 0;
        inner.trials_succeeded = 0;
        counter!(BREAKER_OPENED).increment(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn breaker(minimum_calls: usize, open_duration_secs: u64) -> CircuitBreaker {
        CircuitBreaker::new(BreakerConfig {
            failure_rate_threshold: 0.5,
            minimum_calls,
            window_size: minimum_calls * 2,
            open_duration_secs,
            half_open_max_calls: 2,
        })
    }

    /// Breaker with a millisecond-scale open duration for recovery tests.
    fn fast_breaker() -> CircuitBreaker {
        CircuitBreaker::new(BreakerConfig {
            failure_rate_threshold: 0.5,
            minimum_calls: 2,
            window_size: 4,
            open_duration_secs: 0,
            half_open_max_calls: 2,
        })
    }

    fn trip(breaker: &CircuitBreaker, failures: usize) {
        for _ in 0..failures {
            assert!(breaker.try_acquire());
            breaker.record_failure();
        }
    }

    #[test]
    fn stays_closed_below_minimum_volume() {
        let breaker = breaker(5, 60);

        trip(&breaker, 4);
        assert_eq!(breaker.state(), CircuitState::Closed);
        assert!(breaker.try_acquire());
    }

    #[test]
    fn opens_at_failure_threshold() {
        let breaker = breaker(4, 60);

        breaker.record_success();
        breaker.record_success();
        trip(&breaker, 2);
        // 2 failures out of 4 hits the 0.5 ratio at minimum volume.
        assert_eq!(breaker.state(), CircuitState::Open);
        assert!(!breaker.try_acquire());
    }

    #[test]
    fn refuses_calls_while_open() {
        let breaker = breaker(2, 60);

        trip(&breaker, 2);
        assert_eq!(breaker.state(), CircuitState::Open);
        for _ in 0..10 {
            assert!(!breaker.try_acquire());
        }
    }

    #[test]
    fn half_open_after_open_duration() {
        let breaker = fast_breaker();

        trip(&breaker, 2);
        assert_eq!(breaker.state(), CircuitState::Open);

        std::thread::sleep(Duration::from_millis(10));
        assert!(breaker.try_acquire());
        assert_eq!(breaker.state(), CircuitState::HalfOpen);
    }

    #[test]
    fn half_open_admits_a_bounded_number_of_trials() {
        let breaker = fast_breaker();

        trip(&breaker, 2);
        std::thread::sleep(Duration::from_millis(10));

        // half_open_max_calls = 2: two trials pass, the third is refused.
        assert!(breaker.try_acquire());
        assert!(breaker.try_acquire());
        assert!(!breaker.try_acquire());
    }

    #[test]
    fn closes_after_successful_trials() {
        let breaker = fast_breaker();

        trip(&breaker, 2);
        std::thread::sleep(Duration::from_millis(10));

        assert!(breaker.try_acquire());
        assert!(breaker.try_acquire());
        breaker.record_success();
        breaker.record_success();
        assert_eq!(breaker.state(), CircuitState::Closed);

        // The window was reset: old failures no longer count.
        breaker.record_failure();
        assert_eq!(breaker.state(), CircuitState::Closed);
    }

    #[test]
    fn reopens_when_a_trial_fails() {
        let breaker = fast_breaker();

        trip(&breaker, 2);
        std::thread::sleep(Duration::from_millis(10));

        assert!(breaker.try_acquire());
        breaker.record_failure();
        assert_eq!(breaker.state(), CircuitState::Open);
    }

    #[test]
    fn window_rolls_old_outcomes_out() {
        let breaker = CircuitBreaker::new(BreakerConfig {
            failure_rate_threshold: 0.5,
            minimum_calls: 2,
            window_size: 4,
            open_duration_secs: 60,
            half_open_max_calls: 1,
        });

        // Two early failures, then enough successes to push them out of
        // the 4-slot window.
        breaker.record_failure();
        assert_eq!(breaker.state(), CircuitState::Closed);
        for _ in 0..4 {
            breaker.record_success();
        }
        breaker.record_failure();
        // Window is [s, s, s, f]: ratio 0.25, stays closed.
        assert_eq!(breaker.state(), CircuitState::Closed);
    }
}
