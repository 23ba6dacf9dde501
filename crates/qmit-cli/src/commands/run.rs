//! Run command implementation.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use qmit_adapter_sim::IdealExecutor;
use qmit_mitigate::{
    Dispatch, MitigationConfig, MitigationReport, MitigationRun, Mitigator, Stage,
};

use super::common::{describe, load_circuit, load_config, parse_sequence};

/// Command-line values that take precedence over the configuration file.
#[derive(Debug, Default)]
pub struct Overrides {
    pub shots: Option<u32>,
    pub scales: Option<Vec<u32>>,
    pub sequence: Option<String>,
    pub target: Option<String>,
    pub seed: Option<u64>,
    pub sequential: bool,
}

impl Overrides {
    /// Apply the overrides and validate the result.
    pub fn apply(self, mut config: MitigationConfig) -> Result<MitigationConfig> {
        if let Some(shots) = self.shots {
            config = config.with_shots(shots);
        }
        if let Some(scales) = self.scales {
            config = config.with_scale_factors(scales);
        }
        if let Some(name) = self.sequence.as_deref() {
            config = config.with_pulse_sequence(parse_sequence(name)?);
        }
        if let Some(target) = self.target {
            config = config.with_target(target);
        }
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        if self.sequential {
            config = config.with_dispatch(Dispatch::Sequential);
        }
        config.validate()?;
        Ok(config)
    }
}

/// Execute the run command.
pub async fn execute(
    input: &str,
    config_path: Option<&str>,
    overrides: Overrides,
    export: Option<&str>,
) -> Result<()> {
    let circuit = load_circuit(input)?;
    let config = overrides.apply(load_config(config_path)?)?;

    println!(
        "{} Mitigating {} ({} shots, scales {:?}, {} pulses)",
        style("→").cyan().bold(),
        style(circuit.name()).green(),
        config.shots,
        config.scale_factors,
        style(config.pulse_sequence.name()).yellow()
    );
    println!("  Loaded: {}", describe(&circuit));

    let executor = IdealExecutor::from_config(&config);
    let mitigator = Mitigator::new(Arc::new(executor), config.clone());

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.set_message(format!(
        "Executing {} circuits on {}...",
        2 * config.scale_factors.len(),
        mitigator.executor().name()
    ));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let outcome = mitigator.run(&circuit).await;
    spinner.finish_and_clear();
    let run = outcome?;

    print_summary(&run);

    if let Some(path) = export {
        let report =
            MitigationReport::from_run(circuit.name(), mitigator.executor().name(), &config, &run);
        report.write_json(path)?;
        println!(
            "\n{} Report written to {}",
            style("✓").green().bold(),
            style(path).green()
        );
    }

    Ok(())
}

/// Print the four estimates, the executions behind them, and any warnings.
pub fn print_summary(run: &MitigationRun) {
    println!("\n{} Mitigation results:", style("✓").green().bold());
    println!("  {:<8} {:>10}  {}", "Stage", "Estimate", "Circuits");
    for stage in Stage::ALL {
        let circuits: Vec<String> = run
            .executions
            .iter()
            .filter(|e| stage_uses(stage, e.stage))
            .map(|e| e.role.to_string())
            .collect();
        println!(
            "  {:<8} {:>10.6}  {}",
            style(stage).cyan(),
            run.result.get(stage),
            style(circuits.join(", ")).dim()
        );
    }

    if run.zne.points.len() > 2 {
        println!(
            "\n  Fit quality (R²): ZNE {:.4}, HYBRID {:.4}",
            run.zne.fit_quality, run.hybrid.fit_quality
        );
    }

    for warning in &run.result.warnings {
        println!("  {} {}", style("warning:").yellow().bold(), warning);
    }
}

/// ZNE reuses the RAW execution at scale 1; HYBRID reuses DD.
fn stage_uses(stage: Stage, dispatched_by: Stage) -> bool {
    match stage {
        Stage::Zne => matches!(dispatched_by, Stage::Raw | Stage::Zne),
        Stage::Hybrid => matches!(dispatched_by, Stage::Dd | Stage::Hybrid),
        other => other == dispatched_by,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_take_precedence() {
        let overrides = Overrides {
            shots: Some(100),
            scales: Some(vec![1, 3, 5]),
            sequence: Some("xy4".into()),
            target: Some("11".into()),
            seed: Some(7),
            sequential: true,
        };
        let config = overrides.apply(MitigationConfig::default()).unwrap();
        assert_eq!(config.shots, 100);
        assert_eq!(config.scale_factors, vec![1, 3, 5]);
        assert_eq!(config.pulse_sequence.name(), "xy4");
        assert_eq!(config.target.as_deref(), Some("11"));
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.dispatch, Dispatch::Sequential);
    }

    #[test]
    fn test_empty_overrides_keep_config() {
        let base = MitigationConfig::default().with_shots(512);
        let config = Overrides::default().apply(base.clone()).unwrap();
        assert_eq!(config, base);
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        let overrides = Overrides {
            scales: Some(vec![1, 2]),
            ..Overrides::default()
        };
        assert!(overrides.apply(MitigationConfig::default()).is_err());

        let overrides = Overrides {
            sequence: Some("cpmg".into()),
            ..Overrides::default()
        };
        assert!(overrides.apply(MitigationConfig::default()).is_err());
    }

    #[test]
    fn test_stage_uses() {
        assert!(stage_uses(Stage::Zne, Stage::Raw));
        assert!(stage_uses(Stage::Hybrid, Stage::Dd));
        assert!(!stage_uses(Stage::Raw, Stage::Zne));
        assert!(!stage_uses(Stage::Dd, Stage::Hybrid));
    }

    #[tokio::test]
    async fn test_execute_builtin_and_export() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let path = path.to_str().unwrap();
        execute("bell", None, Overrides::default(), Some(path))
            .await
            .unwrap();

        let report: MitigationReport =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(report.circuit, "bell");
        assert_eq!(report.executor, "ideal-statevector");
        assert_eq!(report.executions.len(), 4);
        assert!((report.result.hybrid - 0.5).abs() < 1e-9);
    }
}
