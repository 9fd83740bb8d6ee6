//! Techniques command implementation
//!
//! Lists the technique catalogue with its properties.

use crate::anonymization::technique::{Technique, TechniqueRegistry};
use crate::cli::OutputFormat;
use anyhow::Context;
use clap::Args;

/// Arguments for the techniques command
#[derive(Args, Debug)]
pub struct TechniquesArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

impl TechniquesArgs {
    /// Execute the techniques command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        let techniques = TechniqueRegistry::list();
        match self.format {
            OutputFormat::Text => print!("{}", format_table(techniques)),
            OutputFormat::Json => println!(
                "{}",
                serde_json::to_string_pretty(techniques)
                    .context("Failed to serialize technique list")?
            ),
        }
        Ok(0)
    }
}

fn flag(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "-"
    }
}

fn format_table(techniques: &[Technique]) -> String {
    let mut output = format!(
        "{:12} {:16} {:8} {:8} {:11} {:14}  {}\n",
        "ID", "CATEGORY", "FORMAT", "LENGTH", "REVERSIBLE", "DETERMINISTIC", "DESCRIPTION"
    );
    for t in techniques {
        output.push_str(&format!(
            "{:12} {:16} {:8} {:8} {:11} {:14}  {}\n",
            t.id.as_str(),
            t.category.to_string(),
            flag(t.preserves_format),
            flag(t.preserves_length),
            flag(t.reversible),
            flag(t.deterministic),
            t.description
        ));
    }
    output
}
