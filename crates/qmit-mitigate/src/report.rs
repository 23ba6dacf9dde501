//! Serializable summary of a mitigation run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::config::MitigationConfig;
use crate::error::QmitResult;
use crate::orchestrator::{ExecutionRecord, MitigationResult, MitigationRun};

/// A mitigation run ready to be written to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MitigationReport {
    /// Name of the base circuit.
    pub circuit: String,
    /// Name of the executor.
    pub executor: String,
    /// When the report was created.
    pub generated_at: DateTime<Utc>,
    /// Configuration the run used.
    pub config: MitigationConfig,
    /// The four estimates and any warnings.
    pub result: MitigationResult,
    /// Every executor call.
    pub executions: Vec<ExecutionRecord>,
    /// R² of the ZNE fit.
    pub zne_fit_quality: f64,
    /// R² of the HYBRID fit.
    pub hybrid_fit_quality: f64,
}

impl MitigationReport {
    /// Build a report stamped with the current time.
    pub fn from_run(
        circuit: impl Into<String>,
        executor: impl Into<String>,
        config: &MitigationConfig,
        run: &MitigationRun,
    ) -> Self {
        Self {
            circuit: circuit.into(),
            executor: executor.into(),
            generated_at: Utc::now(),
            config: config.clone(),
            result: run.result.clone(),
            executions: run.executions.clone(),
            zne_fit_quality: run.zne.fit_quality,
            hybrid_fit_quality: run.hybrid.fit_quality,
        }
    }

    /// Pretty-printed JSON.
    pub fn to_json_pretty(&self) -> QmitResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write pretty-printed JSON to `path`.
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> QmitResult<()> {
        std::fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extrapolate::extrapolate;
    use crate::stage::{CircuitRole, Stage};

    fn sample_run() -> MitigationRun {
        let zne = extrapolate(&[(1.0, 0.6), (3.0, 0.5)]).unwrap();
        let hybrid = extrapolate(&[(1.0, 0.7), (3.0, 0.65)]).unwrap();
        MitigationRun {
            result: MitigationResult {
                raw: 0.6,
                zne: zne.value,
                dd: 0.7,
                hybrid: hybrid.value,
                warnings: vec![],
            },
            zne,
            hybrid,
            executions: vec![ExecutionRecord {
                role: CircuitRole::Base,
                stage: Stage::Raw,
                scale: 1,
                probability: 0.6,
                num_instructions: 4,
                elapsed_ms: 2,
            }],
        }
    }

    #[test]
    fn test_report_json() {
        let report =
            MitigationReport::from_run("bell", "stub", &MitigationConfig::default(), &sample_run());
        let json = report.to_json_pretty().unwrap();
        assert!(json.contains("\"circuit\": \"bell\""));
        assert!(json.contains("\"stage\": \"RAW\""));

        let parsed: MitigationReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.config, report.config);
        assert_eq!(parsed.executions, report.executions);
        assert!((parsed.result.zne - 0.65).abs() < 1e-9);
    }

    #[test]
    fn test_write_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let report =
            MitigationReport::from_run("bell", "stub", &MitigationConfig::default(), &sample_run());
        report.write_json(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let parsed: MitigationReport = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.circuit, "bell");
        assert_eq!(parsed.generated_at, report.generated_at);
        assert!((parsed.hybrid_fit_quality - 1.0).abs() < 1e-12);
    }
}
