//! Version command implementation.

use console::style;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - hybrid zero-noise extrapolation and dynamical decoupling",
        style("qmit").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  qmit-ir           Circuit model");
    println!("  qmit-compile      Folding, scheduling and decoupling passes");
    println!("  qmit-mitigate     Extrapolation and the mitigation pipeline");
    println!("  qmit-adapter-sim  Ideal statevector executor");
    println!("  qmit-cli          Command-line interface");
    println!();
    println!(
        "Repository: {}",
        style(env!("CARGO_PKG_REPOSITORY")).underlined()
    );
    println!("License:    {}", style(env!("CARGO_PKG_LICENSE")).dim());
}
