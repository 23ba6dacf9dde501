//! Mitigation run configuration.
//!
//! Supports loading configuration from:
//! 1. YAML files (`.yaml`, `.yml`)
//! 2. JSON files (`.json`)
//!
//! Every field has a default, so an empty document is a valid configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use qmit_compile::{DurationTable, FoldPolicy, PulseSequence, ScaleFactor};

use crate::error::{MitigationError, QmitResult};

/// How the executions of a run are dispatched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dispatch {
    /// All executions are started together once every circuit is built.
    #[default]
    Concurrent,
    /// Stages run one after another in RAW, DD, ZNE, HYBRID order, checking
    /// for cancellation before each.
    Sequential,
}

/// Configuration of a mitigation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MitigationConfig {
    /// Shots per execution.
    #[serde(default = "default_shots")]
    pub shots: u32,

    /// Noise-scale factors. The first must be 1; every further factor adds
    /// one folded execution to the ZNE and HYBRID stages.
    #[serde(default = "default_scale_factors")]
    pub scale_factors: Vec<u32>,

    /// Folding policy for the ZNE and HYBRID circuits.
    #[serde(default)]
    pub fold_policy: FoldPolicy,

    /// Pulses inserted into idle windows.
    #[serde(default)]
    pub pulse_sequence: PulseSequence,

    /// Device timings used to schedule the decoupled circuit.
    #[serde(default = "DurationTable::ibm_eagle")]
    pub durations: DurationTable,

    /// Target outcome over the classical bits, highest bit first. `None`
    /// means all ones. Consumed by executors built from this configuration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    /// Per-execution timeout in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,

    /// Dispatch mode.
    #[serde(default)]
    pub dispatch: Dispatch,

    /// Seed for sampling executors built from this configuration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

fn default_shots() -> u32 {
    2048
}

fn default_scale_factors() -> Vec<u32> {
    vec![1, 3]
}

impl Default for MitigationConfig {
    fn default() -> Self {
        Self {
            shots: default_shots(),
            scale_factors: default_scale_factors(),
            fold_policy: FoldPolicy::default(),
            pulse_sequence: PulseSequence::default(),
            durations: DurationTable::ibm_eagle(),
            target: None,
            timeout_ms: None,
            dispatch: Dispatch::default(),
            seed: None,
        }
    }
}

impl MitigationConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the shot count.
    #[must_use]
    pub fn with_shots(mut self, shots: u32) -> Self {
        self.shots = shots;
        self
    }

    /// Set the scale factors.
    #[must_use]
    pub fn with_scale_factors(mut self, scales: impl Into<Vec<u32>>) -> Self {
        self.scale_factors = scales.into();
        self
    }

    /// Set the folding policy.
    #[must_use]
    pub fn with_fold_policy(mut self, policy: FoldPolicy) -> Self {
        self.fold_policy = policy;
        self
    }

    /// Set the pulse sequence.
    #[must_use]
    pub fn with_pulse_sequence(mut self, sequence: PulseSequence) -> Self {
        self.pulse_sequence = sequence;
        self
    }

    /// Set the duration table.
    #[must_use]
    pub fn with_durations(mut self, durations: DurationTable) -> Self {
        self.durations = durations;
        self
    }

    /// Set the target outcome.
    #[must_use]
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Set the per-execution timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(timeout.as_millis().try_into().unwrap_or(u64::MAX));
        self
    }

    /// Set the dispatch mode.
    #[must_use]
    pub fn with_dispatch(mut self, dispatch: Dispatch) -> Self {
        self.dispatch = dispatch;
        self
    }

    /// Set the sampling seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Per-execution timeout, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Scale factors above 1, i.e. the ones that need folded circuits.
    pub fn folded_scales(&self) -> impl Iterator<Item = u32> + '_ {
        self.scale_factors.iter().copied().skip(1)
    }

    /// Parse a YAML document.
    pub fn from_yaml_str(s: &str) -> QmitResult<Self> {
        let config: Self = serde_yaml_ng::from_str(s)
            .map_err(|e| MitigationError::InvalidConfig(format!("YAML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON document.
    pub fn from_json_str(s: &str) -> QmitResult<Self> {
        let config: Self = serde_json::from_str(s)
            .map_err(|e| MitigationError::InvalidConfig(format!("JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file, choosing the format by extension.
    pub fn from_path<P: AsRef<Path>>(path: P) -> QmitResult<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        let contents = std::fs::read_to_string(path)?;
        match extension.as_deref() {
            Some("yaml" | "yml") => Self::from_yaml_str(&contents),
            Some("json") => Self::from_json_str(&contents),
            _ => Err(MitigationError::InvalidConfig(format!(
                "Unrecognized config format: {}",
                path.display()
            ))),
        }
    }

    /// Check the configuration before any circuit is built or executed.
    pub fn validate(&self) -> QmitResult<()> {
        let invalid = |msg: String| Err(MitigationError::InvalidConfig(msg));

        if self.shots == 0 {
            return invalid("shots must be positive".into());
        }

        if self.scale_factors.len() < 2 {
            return Err(MitigationError::DegenerateScales {
                scales: self.scale_factors.clone(),
            });
        }
        for &s in &self.scale_factors {
            ScaleFactor::new(s).map_err(MitigationError::InvalidScale)?;
        }
        if self.scale_factors[0] != 1 {
            return invalid(format!(
                "first scale factor must be 1, got {}",
                self.scale_factors[0]
            ));
        }
        for pair in self.scale_factors.windows(2) {
            if pair[1] == pair[0] {
                return Err(MitigationError::DegenerateScales {
                    scales: self.scale_factors.clone(),
                });
            }
            if pair[1] < pair[0] {
                return invalid(format!(
                    "scale factors must be increasing, got {} after {}",
                    pair[1], pair[0]
                ));
            }
        }

        self.pulse_sequence
            .validate()
            .map_err(|e| MitigationError::InvalidConfig(e.to_string()))?;

        if let Some(target) = &self.target {
            if target.is_empty() || target.chars().any(|c| c != '0' && c != '1') {
                return invalid(format!("target '{target}' is not a bitstring"));
            }
        }

        if self.timeout_ms == Some(0) {
            return invalid("timeout must be positive".into());
        }

        Ok(())
    }
}
