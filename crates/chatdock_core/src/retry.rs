use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Bounded fixed-delay retry budget for element resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            delay_ms: 200,
        }
    }
}

impl RetryPolicy {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    pub fn chain(&self) -> RetryChain {
        RetryChain {
            policy: *self,
            attempts: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryStep {
    /// Wait this long, then make another attempt.
    Wait(Duration),
    /// Budget spent after this many attempts.
    Exhausted { attempts: u32 },
}

/// State of one retry sequence. Independent per directive; dropped when the
/// element is found or the budget runs out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryChain {
    policy: RetryPolicy,
    attempts: u32,
}

impl RetryChain {
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Records a failed attempt and says what to do next.
    pub fn record_miss(&mut self) -> RetryStep {
        self.attempts += 1;
        if self.attempts >= self.policy.max_attempts.max(1) {
            RetryStep::Exhausted {
                attempts: self.attempts,
            }
        } else {
            RetryStep::Wait(self.policy.delay())
        }
    }
}
