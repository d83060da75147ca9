//! # Simulated Verifier
//!
//! Stand-in for the ledger integrity check. Returns a fixed outcome after
//! an optional delay; it inspects nothing. Real signature verification
//! plugs in behind the same [`PassportVerifier`] trait.

use std::time::Duration;

use async_trait::async_trait;

use crate::traits::{PassportVerifier, VerifyError};

/// A verifier with a preset outcome.
#[derive(Debug, Clone)]
pub struct SimulatedVerifier {
    outcome: bool,
    delay: Duration,
}

impl SimulatedVerifier {
    /// Always report `outcome`.
    pub fn new(outcome: bool) -> Self {
        Self {
            outcome,
            delay: Duration::ZERO,
        }
    }

    /// Delay each verification by `delay`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

impl Default for SimulatedVerifier {
    fn default() -> Self {
        Self::new(true)
    }
}

#[async_trait]
impl PassportVerifier for SimulatedVerifier {
    async fn verify(&self, battery_id: &str) -> Result<bool, VerifyError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        tracing::debug!(battery_id, outcome = self.outcome, "simulated verification");
        Ok(self.outcome)
    }

    fn verifier_name(&self) -> &str {
        "SimulatedVerifier"
    }
}
