//! Relationship discovery across the tables of a dataset.

mod analyzer;
mod similarity;

pub use analyzer::{
    Cardinality, DatasetProfiles, JoinKind, Relationship, RelationshipAnalyzer,
    RelationshipConfig, RelationshipEvidence,
};
pub use similarity::{
    column_similarity, containment, jaccard, levenshtein, levenshtein_similarity,
    name_similarity, name_tokens, normalize_name, qualified_name, singular,
};
