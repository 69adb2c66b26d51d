use crate::types::{DEFAULT_RECONNECT_INITIAL, DEFAULT_RECONNECT_MAX, NotifyError, Result};
use rand::Rng;
use std::time::Duration;

/// Whether a subscription reconnects after losing its transport
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ReconnectPolicy {
    /// Never reconnect; notifications stop after the first close
    #[default]
    Never,
    /// Reconnect with exponential backoff
    Backoff(BackoffConfig),
}

impl ReconnectPolicy {
    pub fn backoff() -> Self {
        Self::Backoff(BackoffConfig::default())
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Never => Ok(()),
            Self::Backoff(config) => config.validate(),
        }
    }
}

/// Exponential backoff parameters
#[derive(Debug, Clone, PartialEq)]
pub struct BackoffConfig {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    /// Give up after this many consecutive failed attempts
    pub max_attempts: Option<u32>,
    /// Fraction (0.0..=1.0) the delay may deviate either way
    pub jitter: f64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(DEFAULT_RECONNECT_INITIAL),
            max_delay: Duration::from_millis(DEFAULT_RECONNECT_MAX),
            max_attempts: None,
            jitter: 0.2,
        }
    }
}

impl BackoffConfig {
    pub fn validate(&self) -> Result<()> {
        if self.initial_delay.is_zero() {
            return Err(NotifyError::Config(
                "reconnect initial delay must be greater than zero".to_string(),
            ));
        }
        if self.max_delay < self.initial_delay {
            return Err(NotifyError::Config(
                "reconnect max delay must not be smaller than the initial delay".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.jitter) {
            return Err(NotifyError::Config(format!(
                "reconnect jitter must be within 0.0..=1.0, got {}",
                self.jitter
            )));
        }
        Ok(())
    }
}

/// Timer for reconnection logic with exponential backoff
pub struct Timer {
    attempts: u32,
    policy: ReconnectPolicy,
}

impl Timer {
    pub fn new(policy: ReconnectPolicy) -> Self {
        Self {
            attempts: 0,
            policy,
        }
    }

    /// Number of attempts handed out since the last reset
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Get the next delay, or `None` when the policy gives up
    pub fn next_delay(&mut self) -> Option<Duration> {
        let ReconnectPolicy::Backoff(config) = &self.policy else {
            return None;
        };

        if let Some(max) = config.max_attempts
            && self.attempts >= max
        {
            return None;
        }

        let exponent = self.attempts.min(31);
        let base = config
            .initial_delay
            .saturating_mul(2u32.saturating_pow(exponent))
            .min(config.max_delay);

        self.attempts += 1;
        Some(apply_jitter(base, config.jitter).min(config.max_delay))
    }

    /// Reset the timer (after a successful connection)
    pub fn reset(&mut self) {
        self.attempts = 0;
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new(ReconnectPolicy::default())
    }
}

fn apply_jitter(delay: Duration, jitter: f64) -> Duration {
    if jitter <= 0.0 || delay.is_zero() {
        return delay;
    }
    let factor = rand::thread_rng().gen_range((1.0 - jitter)..=(1.0 + jitter));
    delay.mul_f64(factor)
}
