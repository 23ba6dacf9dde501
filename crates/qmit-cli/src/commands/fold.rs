//! Fold command implementation.

use anyhow::Result;
use console::style;

use qmit_compile::{PassManagerBuilder, ScaleFactor};

use super::common::{describe, load_circuit, parse_policy, write_circuit};

/// Execute the fold command.
pub fn execute(input: &str, scale: u32, policy: &str, output: Option<&str>) -> Result<()> {
    let scale = ScaleFactor::new(scale)?;
    let policy = parse_policy(policy)?;

    println!(
        "{} Folding {} to scale {} ({:?})",
        style("→").cyan().bold(),
        style(input).green(),
        style(scale).yellow(),
        policy
    );

    let mut circuit = load_circuit(input)?;
    println!("  Input:  {}", describe(&circuit));

    let (pm, mut properties) = PassManagerBuilder::new()
        .with_folding_policy(scale, policy)
        .build();
    pm.run(&mut circuit, &mut properties)?;

    println!("  Output: {}", describe(&circuit));

    match output {
        Some(path) => write_circuit(&circuit, path)?,
        None => println!("{}", serde_json::to_string_pretty(&circuit)?),
    }

    Ok(())
}
