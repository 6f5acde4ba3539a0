//! Check command implementation.

use anyhow::Result;
use console::style;

/// Parse the input and report the declared registers, gates and the
/// program length.
pub fn execute(input: &str, json: bool) -> Result<()> {
    let parser = super::load(input)?;

    let instructions = parser.program().instructions.len();

    if json {
        let report = serde_json::json!({
            "file": input,
            "qubits": parser.qubit_space(),
            "clbits": parser.clbit_space(),
            "gates": parser.declared_gates().len(),
            "instructions": instructions,
            "sources": parser.headers().len(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "{} {} parses cleanly",
        style("✓").green().bold(),
        style(input).green()
    );
    println!("  qubits:       {}", parser.qubit_space());
    println!("  clbits:       {}", parser.clbit_space());
    println!("  gates:        {}", parser.declared_gates().len());
    println!("  instructions: {instructions}");
    println!("  sources:      {}", parser.headers().len());
    Ok(())
}
