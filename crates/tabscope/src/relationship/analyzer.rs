//! Cross-table relationship discovery.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::dataset::{Column, ColumnRef, Dataset};
use crate::engine::AbortSignal;
use crate::error::Result;
use crate::profile::{ColumnProfile, InferredType};

use super::similarity::{column_similarity, containment, jaccard};

/// Profiles of a whole dataset keyed by `(table, column)`.
pub type DatasetProfiles = IndexMap<(String, String), ColumnProfile>;

/// Configuration for relationship discovery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelationshipConfig {
    /// Overlap at which a pair is a candidate regardless of names.
    pub min_overlap: f64,
    /// Name similarity counted as high.
    pub high_name_similarity: f64,
    /// Overlap required alongside a high name similarity.
    pub min_named_overlap: f64,
    /// Containment into a key column that makes a pair a candidate.
    pub min_containment: f64,
    /// Distinct ratio at which a column counts as near-unique.
    pub near_unique_ratio: f64,
    /// Distinct values per column considered for overlap.
    pub max_distinct_values: usize,
    pub overlap_weight: f64,
    pub name_weight: f64,
    pub containment_weight: f64,
    /// Compare table pairs on the rayon pool.
    pub parallel: bool,
}

impl Default for RelationshipConfig {
    fn default() -> Self {
        Self {
            min_overlap: 0.5,
            high_name_similarity: 0.8,
            min_named_overlap: 0.2,
            min_containment: 0.95,
            near_unique_ratio: 0.95,
            max_distinct_values: 10_000,
            overlap_weight: 0.5,
            name_weight: 0.2,
            containment_weight: 0.3,
            parallel: true,
        }
    }
}

/// Estimated cardinality of a relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    OneToOne,
    OneToMany,
    ManyToMany,
}

/// Join suggested for a relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinKind {
    /// Every target value exists in the source.
    Inner,
    /// Some target values have no match in the source.
    Left,
}

/// Evidence behind a relationship.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RelationshipEvidence {
    /// Jaccard similarity of the distinct value sets.
    pub value_overlap: f64,
    pub name_similarity: f64,
    /// Share of the target's distinct values present in the source.
    pub containment: f64,
}

/// A candidate link between columns of two tables.
///
/// For one-to-many links the source is the "one" side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub source: ColumnRef,
    pub target: ColumnRef,
    pub cardinality: Cardinality,
    /// Weighted evidence score in `[0, 1]`.
    pub confidence: f64,
    pub evidence: RelationshipEvidence,
    pub suggested_join: JoinKind,
}

impl Relationship {
    /// Whether this relationship links the two columns, in either direction.
    pub fn links(&self, a: &ColumnRef, b: &ColumnRef) -> bool {
        (&self.source == a && &self.target == b) || (&self.source == b && &self.target == a)
    }

    fn pair_key(&self) -> (ColumnRef, ColumnRef) {
        if self.source <= self.target {
            (self.source.clone(), self.target.clone())
        } else {
            (self.target.clone(), self.source.clone())
        }
    }
}

/// A column eligible for relationship matching.
struct Candidate<'a> {
    table: &'a str,
    column: &'a str,
    profile: &'a ColumnProfile,
    keys: HashSet<String>,
}

/// Discovers candidate foreign-key style links across tables.
pub struct RelationshipAnalyzer {
    config: RelationshipConfig,
}

impl RelationshipAnalyzer {
    /// Create an analyzer with default settings.
    pub fn new() -> Self {
        Self::with_config(RelationshipConfig::default())
    }

    /// Create an analyzer with custom configuration.
    pub fn with_config(config: RelationshipConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RelationshipConfig {
        &self.config
    }

    /// Discover relationships between columns of different tables.
    ///
    /// Columns without a profile, and tables without key-like or categorical
    /// columns, contribute nothing. Each unordered column pair appears at most once.
    pub fn discover(&self, dataset: &Dataset, profiles: &DatasetProfiles) -> Vec<Relationship> {
        self.discover_with_abort(dataset, profiles, &AbortSignal::new())
            .unwrap_or_default()
    }

    /// Like [`RelationshipAnalyzer::discover`], but stops comparing table pairs
    /// once the signal is raised and returns [`crate::AnalysisError::Aborted`].
    pub fn discover_with_abort(
        &self,
        dataset: &Dataset,
        profiles: &DatasetProfiles,
        abort: &AbortSignal,
    ) -> Result<Vec<Relationship>> {
        let candidates: Vec<Vec<Candidate<'_>>> = dataset
            .tables
            .iter()
            .map(|table| {
                table
                    .columns
                    .iter()
                    .filter_map(|column| {
                        let profile = profiles.get(&(table.name.clone(), column.name.clone()))?;
                        is_matchable(profile.inferred_type).then(|| Candidate {
                            table: &table.name,
                            column: &column.name,
                            profile,
                            keys: self.distinct_keys(column),
                        })
                    })
                    .collect()
            })
            .collect();

        let table_pairs: Vec<(usize, usize)> = (0..candidates.len())
            .flat_map(|i| (0..candidates.len()).filter(move |&j| j != i).map(move |j| (i, j)))
            .collect();

        let compare = |&(i, j): &(usize, usize)| -> Vec<Relationship> {
            if abort.is_aborted() {
                return Vec::new();
            }
            candidates[i]
                .iter()
                .flat_map(|source| {
                    candidates[j]
                        .iter()
                        .filter_map(move |target| self.evaluate(source, target))
                })
                .collect()
        };

        let found: Vec<Relationship> = if self.config.parallel {
            table_pairs.par_iter().flat_map_iter(compare).collect()
        } else {
            table_pairs.iter().flat_map(compare).collect()
        };

        abort.check("relationship discovery")?;

        let relationships = deduplicate(found);
        tracing::debug!(
            tables = dataset.tables.len(),
            relationships = relationships.len(),
            "relationship discovery complete"
        );
        Ok(relationships)
    }

    /// First `max_distinct_values` distinct keys of a column, in row order.
    fn distinct_keys(&self, column: &Column) -> HashSet<String> {
        let mut keys = HashSet::new();
        for (_, value) in column.non_null() {
            if keys.len() >= self.config.max_distinct_values {
                break;
            }
            keys.insert(value.key());
        }
        keys
    }

    /// Score `source -> target`, if the pair qualifies in this direction.
    fn evaluate(&self, source: &Candidate<'_>, target: &Candidate<'_>) -> Option<Relationship> {
        let source_type = source.profile.inferred_type;
        let target_type = target.profile.inferred_type;
        if !compatible(source_type, target_type) {
            return None;
        }

        let overlap = jaccard(&source.keys, &target.keys);
        if overlap <= 0.0 {
            return None;
        }
        let contained = containment(&source.keys, &target.keys);
        let name = column_similarity(source.table, source.column, target.table, target.column);

        let source_unique = source.profile.is_near_unique(self.config.near_unique_ratio);
        let target_unique = target.profile.is_near_unique(self.config.near_unique_ratio);

        let cardinality = match (source_unique, target_unique) {
            (true, true) => Cardinality::OneToOne,
            (true, false) => Cardinality::OneToMany,
            // The reverse direction reports this pair with the "one" side as source.
            (false, true) => return None,
            (false, false) => Cardinality::ManyToMany,
        };

        let high_name = name >= self.config.high_name_similarity;
        let keyed_containment = source_type == InferredType::Identifier
            && source_unique
            && contained >= self.config.min_containment
            && overlap >= self.config.min_named_overlap;
        let qualifies = overlap >= self.config.min_overlap
            || (high_name && overlap >= self.config.min_named_overlap)
            || keyed_containment;
        if !qualifies {
            return None;
        }

        // Surrogate keys of unrelated tables overlap by construction.
        if cardinality == Cardinality::OneToOne
            && source_type == InferredType::Identifier
            && target_type == InferredType::Identifier
            && !high_name
        {
            return None;
        }

        let confidence = (self.config.overlap_weight * overlap
            + self.config.name_weight * name
            + self.config.containment_weight * contained)
            .clamp(0.0, 1.0);

        Some(Relationship {
            source: ColumnRef::new(source.table, source.column),
            target: ColumnRef::new(target.table, target.column),
            cardinality,
            confidence,
            evidence: RelationshipEvidence {
                value_overlap: overlap,
                name_similarity: name,
                containment: contained,
            },
            suggested_join: if contained >= self.config.min_containment {
                JoinKind::Inner
            } else {
                JoinKind::Left
            },
        })
    }
}

impl Default for RelationshipAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

fn is_matchable(inferred_type: InferredType) -> bool {
    matches!(
        inferred_type,
        InferredType::Identifier | InferredType::Integer | InferredType::Categorical
    )
}

/// Identifier-identifier, identifier-integer (either order) or categorical-categorical.
fn compatible(a: InferredType, b: InferredType) -> bool {
    use InferredType::*;
    matches!(
        (a, b),
        (Identifier, Identifier)
            | (Identifier, Integer)
            | (Integer, Identifier)
            | (Categorical, Categorical)
    )
}

/// Keep the highest-confidence direction per unordered column pair.
///
/// Output keeps the order in which pairs were first found.
fn deduplicate(found: Vec<Relationship>) -> Vec<Relationship> {
    let mut kept: Vec<Relationship> = Vec::new();
    let mut index: HashMap<(ColumnRef, ColumnRef), usize> = HashMap::new();

    for relationship in found {
        let key = relationship.pair_key();
        match index.get(&key) {
            Some(&at) if kept[at].confidence >= relationship.confidence => {}
            Some(&at) => kept[at] = relationship,
            None => {
                index.insert(key, kept.len());
                kept.push(relationship);
            }
        }
    }

    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Table;
    use crate::profile::TypeProfiler;

    fn profile_all(dataset: &Dataset) -> DatasetProfiles {
        let profiler = TypeProfiler::new();
        dataset
            .tables
            .iter()
            .flat_map(|t| {
                t.columns
                    .iter()
                    .map(|c| ((t.name.clone(), c.name.clone()), profiler.profile(c)))
            })
            .collect()
    }

    fn discover(dataset: &Dataset) -> Vec<Relationship> {
        RelationshipAnalyzer::new().discover(dataset, &profile_all(dataset))
    }

    #[test]
    fn test_one_to_many_source_is_unique_side() {
        let dataset = Dataset::new(
            "d",
            vec![
                Table::new("t1", vec![Column::new("id", 1..=100i64)]),
                Table::new(
                    "t2",
                    vec![Column::new("ref", (0..250i64).map(|i| i % 100 + 1))],
                ),
            ],
        );
        let relationships = discover(&dataset);

        assert_eq!(relationships.len(), 1);
        let r = &relationships[0];
        assert_eq!(r.source, ColumnRef::new("t1", "id"));
        assert_eq!(r.target, ColumnRef::new("t2", "ref"));
        assert_eq!(r.cardinality, Cardinality::OneToMany);
        assert_eq!(r.suggested_join, JoinKind::Inner);
        assert!((0.0..=1.0).contains(&r.confidence));

        let id = ColumnRef::new("t1", "id");
        let reference = ColumnRef::new("t2", "ref");
        assert!(r.links(&id, &reference));
        assert!(r.links(&reference, &id));
        assert!(!r.links(&id, &ColumnRef::new("t2", "other")));
    }

    #[test]
    fn test_raised_signal_stops_discovery() {
        let dataset = Dataset::new(
            "d",
            vec![
                Table::new("t1", vec![Column::new("id", 1..=100i64)]),
                Table::new(
                    "t2",
                    vec![Column::new("ref", (0..250i64).map(|i| i % 100 + 1))],
                ),
            ],
        );
        let profiles = profile_all(&dataset);
        let abort = AbortSignal::new();
        abort.abort();

        let result = RelationshipAnalyzer::new().discover_with_abort(&dataset, &profiles, &abort);
        assert!(matches!(
            result,
            Err(crate::AnalysisError::Aborted { stage: "relationship discovery" })
        ));
    }

    #[test]
    fn test_unrelated_surrogate_keys_are_ignored() {
        let dataset = Dataset::new(
            "d",
            vec![
                Table::new("customers", vec![Column::new("id", 1..=20i64)]),
                Table::new("orders", vec![Column::new("order_id", 1..=40i64)]),
            ],
        );
        assert!(discover(&dataset).is_empty());
    }

    #[test]
    fn test_categorical_pair_deduplicated() {
        let regions = ["north", "south", "east", "west"];
        let dataset = Dataset::new(
            "d",
            vec![
                Table::new(
                    "stores",
                    vec![Column::new("region", (0..40).map(|i| regions[i % 4]))],
                ),
                Table::new(
                    "sales",
                    vec![Column::new("region", (0..60).map(|i| regions[i % 4]))],
                ),
            ],
        );
        let relationships = discover(&dataset);

        assert_eq!(relationships.len(), 1);
        assert_eq!(relationships[0].cardinality, Cardinality::ManyToMany);
        assert_eq!(relationships[0].evidence.value_overlap, 1.0);
    }

    #[test]
    fn test_same_table_pairs_excluded() {
        let dataset = Dataset::new(
            "d",
            vec![Table::new(
                "t",
                vec![Column::new("id", 1..=50i64), Column::new("parent_id", 1..=50i64)],
            )],
        );
        assert!(discover(&dataset).is_empty());
    }

    #[test]
    fn test_sequential_matches_parallel() {
        let dataset = Dataset::new(
            "d",
            vec![
                Table::new("customers", vec![Column::new("id", 1..=30i64)]),
                Table::new(
                    "orders",
                    vec![
                        Column::new("order_id", 1..=90i64),
                        Column::new("customer_id", (0..90i64).map(|i| i % 30 + 1)),
                    ],
                ),
            ],
        );
        let profiles = profile_all(&dataset);
        let parallel = RelationshipAnalyzer::new().discover(&dataset, &profiles);
        let sequential = RelationshipAnalyzer::with_config(RelationshipConfig {
            parallel: false,
            ..RelationshipConfig::default()
        })
        .discover(&dataset, &profiles);

        assert_eq!(parallel, sequential);
    }
}
