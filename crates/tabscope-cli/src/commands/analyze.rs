//! Analyze command - analyze data files as one dataset and write the report.

use std::path::PathBuf;

use colored::Colorize;
use tabscope::{AbortSignal, AnalysisEngine, AnalysisReport, Dataset, Loader};

use super::load_config;

pub fn run(
    files: Vec<PathBuf>,
    output: Option<PathBuf>,
    config: Option<PathBuf>,
    dataset_id: Option<String>,
    pretty: bool,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    for file in &files {
        if !file.exists() {
            return Err(format!("File not found: {}", file.display()).into());
        }
    }

    let engine = AnalysisEngine::with_config(load_config(config.as_deref())?);

    let loader = Loader::new();
    let mut tables = Vec::with_capacity(files.len());
    let mut first_hash = None;
    for file in &files {
        eprintln!(
            "{} {}",
            "Loading".cyan().bold(),
            file.display().to_string().white()
        );
        let loaded = loader.load_file(file)?;
        first_hash.get_or_insert_with(|| loaded.source.hash.clone());
        tables.push(loaded.table);
    }
    tracing::debug!(tables = tables.len(), "loaded all files");

    // Default id: short content hash of the first file.
    let dataset_id = dataset_id.unwrap_or_else(|| {
        first_hash
            .as_deref()
            .and_then(|h| h.strip_prefix("sha256:"))
            .map(|h| h.chars().take(12).collect())
            .unwrap_or_else(|| "dataset".to_string())
    });
    let dataset = Dataset::new(dataset_id, tables);

    let abort = AbortSignal::new();
    let handler_abort = abort.clone();
    ctrlc::set_handler(move || handler_abort.abort())?;

    let report = engine.analyze_with_abort(&dataset, &abort)?;

    let json = if pretty {
        report.to_json_pretty()?
    } else {
        report.to_json()?
    };

    match output {
        Some(path) => {
            std::fs::write(&path, json)
                .map_err(|e| format!("Cannot write {}: {}", path.display(), e))?;
            print_summary(&report, verbose);
            println!();
            println!(
                "{} {}",
                "Saved to".green().bold(),
                path.display().to_string().white()
            );
        }
        None => println!("{}", json),
    }

    Ok(())
}

fn print_summary(report: &AnalysisReport, verbose: bool) {
    let summary = &report.summary;
    println!(
        "Analyzed {} tables ({} rows, {} columns)",
        summary.total_tables.to_string().white().bold(),
        summary.total_rows,
        summary.total_columns
    );

    for (name, table) in &report.tables {
        match &table.error {
            Some(error) => println!("  {:20} {}", name, error.red()),
            None => println!(
                "  {:20} quality {:>5.1}  outlier rows {}",
                name,
                table.quality.overall(),
                table.outlier_rows().to_string().yellow()
            ),
        }
        if verbose {
            for recommendation in &table.recommendations {
                println!("      - {}", recommendation);
            }
        }
    }

    println!(
        "Found {} correlations and {} relationships",
        summary.total_correlations.to_string().white().bold(),
        summary.total_relationships.to_string().white().bold()
    );
    for relationship in &report.relationships {
        println!(
            "  {} {} {} ({:?}, confidence {:.2})",
            relationship.source.to_string().cyan(),
            "->".dimmed(),
            relationship.target.to_string().cyan(),
            relationship.cardinality,
            relationship.confidence
        );
    }

    println!();
    println!("Data quality score: {:.0}%", summary.data_quality_score);
    println!("{}", summary.recommendation);
}
