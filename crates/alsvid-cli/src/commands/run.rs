//! Run command implementation.

use anyhow::Result;
use console::style;
use tracing::info;

/// Parse the input and execute its global program.
pub fn execute(input: &str) -> Result<()> {
    let parser = super::load(input)?;
    let n = parser.program().instructions.len();

    info!(input, instructions = n, "executing program");
    parser.run()?;

    println!(
        "{} Executed {} instruction{} from {}",
        style("✓").green().bold(),
        n,
        if n == 1 { "" } else { "s" },
        style(input).green()
    );
    Ok(())
}
