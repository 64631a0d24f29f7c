//! Health evaluation configuration

use serde::Deserialize;

use crate::domain::health::{HealthSignals, HealthThresholds};

/// Baseline signals for the static signal source, plus thresholds
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HealthConfig {
    #[serde(default)]
    pub baseline: HealthSignals,

    #[serde(default)]
    pub thresholds: HealthThresholds,
}
