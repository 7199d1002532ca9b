//! The analysis engine: runs profiling, pattern analysis and relationship
//! discovery in dependency order and assembles the report.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use indexmap::IndexMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::dataset::{Dataset, Table};
use crate::error::{AnalysisError, Result};
use crate::pattern::{PatternAnalysis, PatternAnalyzer, PatternConfig};
use crate::profile::{ColumnProfile, ProfilerConfig, TypeProfiler};
use crate::relationship::{DatasetProfiles, RelationshipAnalyzer, RelationshipConfig};
use crate::report::{AnalysisReport, ReportSummary, TableReport};

/// Configuration for a whole analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub profiler: ProfilerConfig,
    pub pattern: PatternConfig,
    pub relationship: RelationshipConfig,
    /// Largest dataset, in cells, analysed in memory.
    pub max_cells: usize,
    /// Spread work over the rayon thread pool.
    pub parallel: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            profiler: ProfilerConfig::default(),
            pattern: PatternConfig::default(),
            relationship: RelationshipConfig::default(),
            max_cells: 50_000_000,
            parallel: true,
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that thresholds are within their valid ranges.
    pub fn validate(&self) -> Result<()> {
        let ratios = [
            ("profiler.min_match_ratio", self.profiler.min_match_ratio),
            ("profiler.categorical_ratio", self.profiler.categorical_ratio),
            ("profiler.identifier_ratio", self.profiler.identifier_ratio),
            ("pattern.high_confidence", self.pattern.high_confidence),
            ("pattern.min_abs_correlation", self.pattern.min_abs_correlation),
            (
                "pattern.missing_correlation_threshold",
                self.pattern.missing_correlation_threshold,
            ),
            ("relationship.min_overlap", self.relationship.min_overlap),
            ("relationship.min_named_overlap", self.relationship.min_named_overlap),
            ("relationship.near_unique_ratio", self.relationship.near_unique_ratio),
        ];
        for (name, value) in ratios {
            if !(0.0..=1.0).contains(&value) {
                return Err(AnalysisError::Config(format!(
                    "{name} must be between 0 and 1, got {value}"
                )));
            }
        }
        let positives = [
            ("pattern.iqr_multiplier", self.pattern.iqr_multiplier),
            ("pattern.zscore_threshold", self.pattern.zscore_threshold),
            (
                "pattern.modified_zscore_threshold",
                self.pattern.modified_zscore_threshold,
            ),
        ];
        for (name, value) in positives {
            if !(value.is_finite() && value > 0.0) {
                return Err(AnalysisError::Config(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        if self.max_cells == 0 {
            return Err(AnalysisError::Config("max_cells must be positive".to_string()));
        }
        Ok(())
    }
}

/// Cooperative cancellation flag shared between a caller and running analyses.
///
/// Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct AbortSignal(Arc<AtomicBool>);

impl AbortSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask running analyses to stop at the next checkpoint.
    pub fn abort(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_aborted(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub(crate) fn check(&self, stage: &'static str) -> Result<()> {
        if self.is_aborted() {
            Err(AnalysisError::Aborted { stage })
        } else {
            Ok(())
        }
    }
}

type TableProfiles = IndexMap<String, ColumnProfile>;

/// Outcome of the profiling stage for one table.
enum TableStage {
    Profiled(TableProfiles),
    Skipped(String),
}

/// Runs the full analysis over a dataset.
///
/// The engine holds configuration only; every call builds a fresh report.
pub struct AnalysisEngine {
    config: EngineConfig,
    profiler: TypeProfiler,
    patterns: PatternAnalyzer,
    relationships: RelationshipAnalyzer,
}

impl AnalysisEngine {
    /// Create an engine with default configuration.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Create an engine with custom configuration.
    pub fn with_config(config: EngineConfig) -> Self {
        let mut relationship = config.relationship.clone();
        relationship.parallel &= config.parallel;

        Self {
            profiler: TypeProfiler::with_config(config.profiler.clone()),
            patterns: PatternAnalyzer::with_config(config.pattern.clone()),
            relationships: RelationshipAnalyzer::with_config(relationship),
            config,
        }
    }

    /// Replace the type profiler, e.g. to add custom matchers.
    pub fn with_profiler(mut self, profiler: TypeProfiler) -> Self {
        self.profiler = profiler;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Analyse a dataset.
    pub fn analyze(&self, dataset: &Dataset) -> Result<AnalysisReport> {
        self.analyze_with_abort(dataset, &AbortSignal::new())
    }

    /// Analyse a dataset, stopping with [`AnalysisError::Aborted`] once the
    /// signal is raised.
    #[instrument(skip_all, fields(dataset = %dataset.id, tables = dataset.tables.len()))]
    pub fn analyze_with_abort(
        &self,
        dataset: &Dataset,
        abort: &AbortSignal,
    ) -> Result<AnalysisReport> {
        self.validate(dataset)?;

        // Stage 1: column profiles.
        let staged: Vec<TableStage> = self
            .map_ordered(&dataset.tables, |table| self.profile_stage(table, abort))
            .into_iter()
            .collect::<Result<_>>()?;
        debug!("profiling complete");

        // Stage 2: per-table patterns.
        let jobs: Vec<(&Table, &TableStage)> = dataset.tables.iter().zip(&staged).collect();
        let analyses: Vec<Option<PatternAnalysis>> = self
            .map_ordered(&jobs, |&(table, stage)| -> Result<Option<PatternAnalysis>> {
                abort.check("pattern analysis")?;
                Ok(match stage {
                    TableStage::Profiled(profiles) => Some(self.patterns.analyze(table, profiles)),
                    TableStage::Skipped(_) => None,
                })
            })
            .into_iter()
            .collect::<Result<_>>()?;
        debug!("pattern analysis complete");

        // Stage 3: relationships across the whole dataset.
        let dataset_profiles: DatasetProfiles = dataset
            .tables
            .iter()
            .zip(&staged)
            .filter_map(|(table, stage)| match stage {
                TableStage::Profiled(profiles) => Some((table, profiles)),
                TableStage::Skipped(_) => None,
            })
            .flat_map(|(table, profiles)| {
                profiles
                    .iter()
                    .map(|(column, profile)| ((table.name.clone(), column.clone()), profile.clone()))
            })
            .collect();
        let relationships = self
            .relationships
            .discover_with_abort(dataset, &dataset_profiles, abort)?;

        // Stage 4: assemble.
        let mut tables = IndexMap::with_capacity(dataset.tables.len());
        let mut correlations = Vec::new();
        for ((table, stage), analysis) in dataset.tables.iter().zip(staged).zip(analyses) {
            let report = match (stage, analysis) {
                (TableStage::Profiled(profiles), Some(mut analysis)) => {
                    correlations.append(&mut analysis.correlations);
                    TableReport::build(
                        table.row_count(),
                        profiles,
                        analysis,
                        self.config.relationship.near_unique_ratio,
                    )
                }
                (TableStage::Skipped(reason), _) => TableReport::failed(table.row_count(), reason),
                (TableStage::Profiled(_), None) => {
                    TableReport::failed(table.row_count(), "table was not analysed")
                }
            };
            tables.insert(table.name.clone(), report);
        }

        let summary = ReportSummary::compute(&tables, correlations.len(), relationships.len());
        info!(
            columns = summary.total_columns,
            relationships = summary.total_relationships,
            quality = summary.data_quality_score,
            "analysis complete"
        );

        Ok(AnalysisReport {
            dataset_id: dataset.id.clone(),
            tables,
            correlations,
            relationships,
            summary,
        })
    }

    /// Profile every column of a table, in column order.
    pub fn profile_columns(&self, table: &Table) -> IndexMap<String, ColumnProfile> {
        let rows = table.row_count();
        self.map_ordered(&table.columns, |column| {
            (column.name.clone(), self.profiler.profile_with_rows(column, rows))
        })
        .into_iter()
        .collect()
    }

    /// Dataset-level checks that abort the whole call.
    fn validate(&self, dataset: &Dataset) -> Result<()> {
        if dataset.tables.is_empty() {
            return Err(AnalysisError::EmptyDataset(dataset.id.clone()));
        }

        let mut names = HashSet::new();
        for table in &dataset.tables {
            if !names.insert(table.name.as_str()) {
                return Err(AnalysisError::DuplicateTable(table.name.clone()));
            }
        }

        let cells = dataset.cell_count();
        if cells > self.config.max_cells {
            return Err(AnalysisError::ResourceExhausted {
                cells,
                limit: self.config.max_cells,
            });
        }

        Ok(())
    }

    fn profile_stage(&self, table: &Table, abort: &AbortSignal) -> Result<TableStage> {
        abort.check("profiling")?;

        if table.columns.is_empty() {
            warn!(table = %table.name, "skipping table without columns");
            return Ok(TableStage::Skipped("table has no columns".to_string()));
        }

        let mut names = HashSet::new();
        if let Some(column) = table.columns.iter().find(|c| !names.insert(c.name.as_str())) {
            warn!(table = %table.name, column = %column.name, "skipping table with duplicate column");
            return Ok(TableStage::Skipped(format!(
                "duplicate column name '{}'",
                column.name
            )));
        }

        Ok(TableStage::Profiled(self.profile_columns(table)))
    }

    /// Map over items, on the rayon pool when enabled. Output keeps input order.
    fn map_ordered<I, T, F>(&self, items: &[I], f: F) -> Vec<T>
    where
        I: Sync,
        T: Send,
        F: Fn(&I) -> T + Sync + Send,
    {
        if self.config.parallel {
            items.par_iter().map(f).collect()
        } else {
            items.iter().map(f).collect()
        }
    }
}

impl Default for AnalysisEngine {
    fn default() -> Self {
        Self::new()
    }
}
