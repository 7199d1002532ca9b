//! Tabscope: analysis engine for tabular datasets.
//!
//! Tabscope takes a dataset of one or more tables and produces a structured
//! report: the semantic type of every column, outliers, correlations and a
//! quality score per table, and candidate relationships across tables.
//!
//! # Core Principles
//!
//! - **Pure**: the engine maps an immutable dataset to a fresh report
//! - **Isolated failures**: a broken table is reported inline, the rest is analysed
//! - **Serializable**: the report round-trips through JSON unchanged
//!
//! # Example
//!
//! ```no_run
//! use tabscope::{AnalysisEngine, Dataset, Loader};
//!
//! let loader = Loader::new();
//! let customers = loader.load_file("customers.csv").unwrap().table;
//! let orders = loader.load_file("orders.csv").unwrap().table;
//!
//! let dataset = Dataset::new("session-1", vec![customers, orders]);
//! let report = AnalysisEngine::new().analyze(&dataset).unwrap();
//!
//! for relationship in &report.relationships {
//!     println!("{} -> {}", relationship.source, relationship.target);
//! }
//! ```

pub mod dataset;
pub mod error;
pub mod input;
pub mod pattern;
pub mod profile;
pub mod relationship;

mod engine;
mod report;
mod stats;

pub use dataset::{CellValue, Column, ColumnRef, Dataset, Table};
pub use engine::{AbortSignal, AnalysisEngine, EngineConfig};
pub use error::{AnalysisError, Result};
pub use input::{LoadedTable, Loader, LoaderConfig, SourceFormat, SourceMetadata};
pub use pattern::{
    CorrelationEntry, CorrelationMethod, MissingSummary, OutlierMethod, OutlierReport,
    PatternAnalysis, PatternAnalyzer, PatternConfig, QualityScore,
};
pub use profile::{ColumnProfile, InferredType, PatternKind, ProfilerConfig, TypeProfiler};
pub use relationship::{
    Cardinality, JoinKind, Relationship, RelationshipAnalyzer, RelationshipConfig,
};
pub use report::{AnalysisReport, ReportSummary, TableReport};
