//! Pad command implementation.

use anyhow::Result;
use console::style;

use qmit_compile::{PassManagerBuilder, Schedule, alap_schedule};
use qmit_ir::QubitId;

use super::common::{count_pulses, describe, load_circuit, load_config, parse_sequence, write_circuit};

/// Execute the pad command.
pub fn execute(
    input: &str,
    config_path: Option<&str>,
    sequence: Option<&str>,
    output: Option<&str>,
) -> Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(name) = sequence {
        config = config.with_pulse_sequence(parse_sequence(name)?);
    }

    let base = load_circuit(input)?;
    println!(
        "{} Padding {} with {} pulses",
        style("→").cyan().bold(),
        style(base.name()).green(),
        style(config.pulse_sequence.name()).yellow()
    );
    println!("  Input:  {}", describe(&base));

    let before = alap_schedule(&base, &config.durations)?;

    let (pm, mut properties) = PassManagerBuilder::new()
        .with_durations(config.durations.clone())
        .with_decoupling(config.pulse_sequence.clone())
        .build();
    let mut padded = base.clone();
    pm.run(&mut padded, &mut properties)?;

    println!("  Output: {}", describe(&padded));
    println!("  Inserted {} pulses", count_pulses(&padded));

    if let Some(after) = properties.get::<Schedule>() {
        print_schedule(&before, after, padded.num_qubits());
    }

    if let Some(path) = output {
        write_circuit(&padded, path)?;
    }

    Ok(())
}

/// Per-qubit idle time before and after padding.
fn print_schedule(before: &Schedule, after: &Schedule, num_qubits: u32) {
    println!(
        "\n{} Schedule (total duration {} → {}):",
        style("✓").green().bold(),
        before.total_duration,
        after.total_duration
    );
    println!("  {:<6} {:>12} {:>12}", "Qubit", "Idle before", "Idle after");
    for q in 0..num_qubits {
        let qubit = QubitId(q);
        let idle_before: u64 = before.idle_on(qubit).map(|w| w.len()).sum();
        let idle_after: u64 = after.idle_on(qubit).map(|w| w.len()).sum();
        println!(
            "  {:<6} {:>12} {:>12}",
            style(format!("q{q}")).cyan(),
            idle_before,
            idle_after
        );
    }
    println!(
        "  {:<6} {:>12} {:>12}",
        "total",
        before.total_idle(),
        after.total_idle()
    );
}
