//! Shared helpers for CLI commands.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use console::style;
use tracing::debug;

use qmit_compile::{DD_LABEL, FoldPolicy, PulseSequence};
use qmit_ir::Circuit;
use qmit_mitigate::MitigationConfig;

/// Load a circuit from a JSON file or by built-in name.
///
/// Built-ins: `bell`, `ghz` (3 qubits), `ghz<N>`, `grover3`. A path that
/// exists on disk always wins over a built-in of the same name.
pub fn load_circuit(input: &str) -> Result<Circuit> {
    let path = Path::new(input);
    if path.exists() {
        let source =
            fs::read_to_string(path).with_context(|| format!("Failed to read file: {input}"))?;
        let circuit: Circuit =
            serde_json::from_str(&source).with_context(|| format!("Invalid circuit JSON: {input}"))?;
        return Ok(circuit);
    }

    builtin_circuit(input)
}

/// Look up a built-in benchmark circuit.
pub fn builtin_circuit(name: &str) -> Result<Circuit> {
    let lower = name.to_lowercase();
    let circuit = match lower.as_str() {
        "bell" => Circuit::bell(),
        "ghz" => Circuit::ghz(3),
        "grover3" | "grover" => Circuit::grover3(),
        other => match other.strip_prefix("ghz").map(str::parse::<u32>) {
            Some(Ok(n)) => Circuit::ghz(n),
            _ => {
                if lower.ends_with(".json") {
                    anyhow::bail!("File not found: {name}");
                }
                anyhow::bail!(
                    "Unknown circuit: '{name}'. Pass a JSON file or one of: bell, ghz, ghz<N>, grover3"
                );
            }
        },
    };
    circuit.map_err(|e| anyhow::anyhow!("Failed to build '{name}': {e}"))
}

/// Load a configuration file, or the defaults when none is given.
pub fn load_config(path: Option<&str>) -> Result<MitigationConfig> {
    match path {
        Some(p) => {
            let config = MitigationConfig::from_path(p)
                .map_err(|e| anyhow::anyhow!("Failed to load config '{p}': {e}"))?;
            debug!("Loaded configuration from {p}");
            Ok(config)
        }
        None => Ok(MitigationConfig::default()),
    }
}

/// Parse a pulse-sequence preset name.
pub fn parse_sequence(name: &str) -> Result<PulseSequence> {
    match name.to_lowercase().as_str() {
        "xx" => Ok(PulseSequence::Xx),
        "xy4" => Ok(PulseSequence::Xy4),
        other => anyhow::bail!("Unknown pulse sequence: '{other}'. Available: xx, xy4"),
    }
}

/// Parse a folding policy name.
pub fn parse_policy(name: &str) -> Result<FoldPolicy> {
    match name.to_lowercase().as_str() {
        "exact" => Ok(FoldPolicy::Exact),
        "local" => Ok(FoldPolicy::Local),
        other => anyhow::bail!("Unknown folding policy: '{other}'. Available: exact, local"),
    }
}

/// Number of decoupling pulses in a circuit.
pub fn count_pulses(circuit: &Circuit) -> usize {
    circuit
        .instructions()
        .iter()
        .filter_map(|inst| inst.as_gate())
        .filter(|gate| gate.label.as_deref() == Some(DD_LABEL))
        .count()
}

/// Write a circuit as pretty-printed JSON.
pub fn write_circuit(circuit: &Circuit, path: &str) -> Result<()> {
    let json = serde_json::to_string_pretty(circuit)?;
    fs::write(path, json).with_context(|| format!("Failed to write file: {path}"))?;
    println!("{} Written to {}", style("✓").green().bold(), style(path).green());
    Ok(())
}

/// One-line shape summary of a circuit.
pub fn describe(circuit: &Circuit) -> String {
    format!(
        "{} qubits, {} instructions ({} unitary), depth {}",
        circuit.num_qubits(),
        circuit.len(),
        circuit.num_unitary_ops(),
        circuit.depth()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_names() {
        assert_eq!(builtin_circuit("bell").unwrap().num_qubits(), 2);
        assert_eq!(builtin_circuit("GHZ").unwrap().num_qubits(), 3);
        assert_eq!(builtin_circuit("ghz5").unwrap().num_qubits(), 5);
        assert_eq!(builtin_circuit("grover3").unwrap().num_qubits(), 3);
    }

    #[test]
    fn test_unknown_builtin() {
        let err = builtin_circuit("qft").unwrap_err().to_string();
        assert!(err.contains("Unknown circuit"));
        let err = load_circuit("missing.json").unwrap_err().to_string();
        assert!(err.contains("File not found"));
    }

    #[test]
    fn test_load_circuit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bell.json");
        let bell = Circuit::bell().unwrap();
        std::fs::write(&path, serde_json::to_string(&bell).unwrap()).unwrap();
        assert_eq!(load_circuit(path.to_str().unwrap()).unwrap(), bell);

        let narrow = serde_json::to_string(&bell)
            .unwrap()
            .replace("\"num_qubits\":2", "\"num_qubits\":1");
        std::fs::write(&path, narrow).unwrap();
        assert!(load_circuit(path.to_str().unwrap()).is_err());
    }

    #[test]
    fn test_parse_names() {
        assert_eq!(parse_sequence("XY4").unwrap(), PulseSequence::Xy4);
        assert!(parse_sequence("cpmg").is_err());
        assert_eq!(parse_policy("local").unwrap(), FoldPolicy::Local);
        assert!(parse_policy("global").is_err());
    }

    #[test]
    fn test_count_pulses() {
        let padded = qmit_compile::insert_decoupling(
            &Circuit::grover3().unwrap(),
            &PulseSequence::Xx,
            &qmit_compile::DurationTable::ibm_eagle(),
        )
        .unwrap();
        assert_eq!(count_pulses(&Circuit::grover3().unwrap()), 0);
        assert!(count_pulses(&padded) > 0);
        assert_eq!(count_pulses(&padded) % 2, 0);
    }
}
