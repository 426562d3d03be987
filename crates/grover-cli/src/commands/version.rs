//! Version command implementation.

use console::style;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - Grover search on simulators and IBM Quantum hardware",
        style("grover").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  grover-ir       Circuit intermediate representation");
    println!("  grover-qasm3    OpenQASM 3 emitter");
    println!("  grover-compile  Basis translation for IBM devices");
    println!("  grover-hal      Backend abstraction");
    println!("  grover-search   Search pipeline and analysis");
    println!();
    println!("License:    {}", style("Apache-2.0").dim());
}
