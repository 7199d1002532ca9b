//! Example: Analyze one or more tabular data files as a dataset.
//!
//! Usage:
//!   cargo run --example analyze -- <file_path>...
//!
//! Example:
//!   cargo run --example analyze -- customers.csv orders.tsv

use std::env;
use std::path::Path;

use tabscope::{AnalysisEngine, Dataset, Loader};

fn main() -> tabscope::Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();

    if args.is_empty() {
        eprintln!("Usage: cargo run --example analyze -- <file_path>...");
        eprintln!("\nExample:");
        eprintln!("  cargo run --example analyze -- customers.csv orders.tsv");
        std::process::exit(1);
    }

    let loader = Loader::new();
    let mut tables = Vec::new();
    for file_path in &args {
        let path = Path::new(file_path);
        if !path.exists() {
            eprintln!("Error: File not found: {}", file_path);
            std::process::exit(1);
        }
        tables.push(loader.load_file(path)?.table);
    }

    let separator = "=".repeat(80);
    println!("{}", separator);
    println!("Tabscope Analysis: {}", args.join(", "));
    println!("{}", separator);
    println!();

    let report = AnalysisEngine::new().analyze(&Dataset::new("example", tables))?;

    for (name, table) in &report.tables {
        println!("## {} ({} rows)", name, table.row_count);
        println!();

        if let Some(error) = &table.error {
            println!("  Failed: {}", error);
            println!();
            continue;
        }

        for profile in table.columns.values() {
            println!(
                "  {:20} {:12} confidence={:.0}% nulls={:.0}%",
                profile.name,
                format!("{:?}", profile.inferred_type),
                profile.confidence * 100.0,
                profile.null_ratio * 100.0
            );
        }
        println!();

        println!(
            "  Quality: {:.1} (completeness {:.1}, uniqueness {:.1})",
            table.quality.overall(),
            table.quality.completeness,
            table.quality.uniqueness
        );
        println!("  Outlier rows: {}", table.outlier_rows());
        if !table.candidate_keys.is_empty() {
            println!("  Candidate keys: {}", table.candidate_keys.join(", "));
        }
        for insight in &table.insights {
            println!("  * {}", insight);
        }
        for recommendation in &table.recommendations {
            println!("  - {}", recommendation);
        }
        println!();
    }

    println!("## Correlations ({} total)", report.correlations.len());
    println!();
    for entry in &report.correlations {
        println!(
            "  {} ~ {}: {:+.3} ({:?})",
            entry.left, entry.right, entry.coefficient, entry.strength
        );
    }
    println!();

    println!("## Relationships ({} total)", report.relationships.len());
    println!();
    for (i, relationship) in report.relationships.iter().enumerate() {
        println!(
            "  {}. {} -> {} {:?} (confidence: {:.0}%, join: {:?})",
            i + 1,
            relationship.source,
            relationship.target,
            relationship.cardinality,
            relationship.confidence * 100.0,
            relationship.suggested_join
        );
    }
    println!();

    println!("## Summary");
    println!(
        "  Data Quality Score: {:.1}%",
        report.summary.data_quality_score
    );
    println!("  Recommendation: {}", report.summary.recommendation);
    println!();

    println!("{}", separator);

    Ok(())
}
