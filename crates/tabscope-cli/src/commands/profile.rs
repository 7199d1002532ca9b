//! Profile command - show the inferred type of every column in a file.

use std::path::PathBuf;

use colored::Colorize;
use tabscope::{AnalysisEngine, InferredType, Loader};

pub fn run(file: PathBuf, json_output: bool, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }

    let loaded = Loader::new().load_file(&file)?;
    let profiles = AnalysisEngine::new().profile_columns(&loaded.table);

    if json_output {
        println!("{}", serde_json::to_string_pretty(&profiles)?);
        return Ok(());
    }

    println!(
        "{} {} ({} rows, {} columns, {})",
        "Profile of".cyan().bold(),
        loaded.source.table.white(),
        loaded.source.row_count,
        loaded.source.column_count,
        loaded.source.format.label()
    );
    println!();

    for profile in profiles.values() {
        let type_name = format!("{:?}", profile.inferred_type);
        let type_name = match profile.inferred_type {
            InferredType::Unknown => type_name.red(),
            InferredType::Identifier => type_name.green(),
            _ => type_name.normal(),
        };
        let pattern = profile
            .pattern
            .map(|p| format!("{:?}", p))
            .unwrap_or_default();

        println!(
            "  {:20} {:12} {:>5.1}%  nulls {:>5.1}%  {}",
            profile.name,
            type_name,
            profile.confidence * 100.0,
            profile.null_ratio * 100.0,
            pattern.yellow()
        );

        if verbose {
            if let Some(numeric) = &profile.statistics.numeric {
                println!(
                    "      min {:.3}  max {:.3}  mean {:.3}  std {:.3}",
                    numeric.min, numeric.max, numeric.mean, numeric.std
                );
            }
            for top in &profile.statistics.top_values {
                println!("      {:>6}  {}", top.count, top.value);
            }
            if !profile.missing_markers.is_empty() {
                println!(
                    "      {} {}",
                    "missing markers:".yellow(),
                    profile.missing_markers.join(", ")
                );
            }
        }
    }

    Ok(())
}
