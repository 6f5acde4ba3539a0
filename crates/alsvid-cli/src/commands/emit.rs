//! Emit command implementation.

use std::fs;

use anyhow::{Context, Result};
use console::style;

/// Parse the input and write it back as normalized source.
pub fn execute(input: &str, output: Option<&str>) -> Result<()> {
    let parser = super::load(input)?;
    let text = parser.to_text();

    match output {
        Some(path) => {
            fs::write(path, &text).with_context(|| format!("cannot write {path}"))?;
            println!(
                "{} Wrote {}",
                style("✓").green().bold(),
                style(path).green()
            );
        }
        None => print!("{text}"),
    }
    Ok(())
}
