//! Column type profiling.

mod matcher;
mod profiler;
mod types;

pub use matcher::{
    default_matchers, parse_date, BooleanMatcher, DateMatcher, FloatMatcher, IntegerMatcher,
    MatchKind, Matcher, RegexMatcher,
};
pub use profiler::{is_identifier_name, ProfilerConfig, TypeProfiler};
pub use types::{
    ColumnProfile, ColumnStatistics, DateRange, InferredType, NumericStatistics, PatternKind,
    PatternMatch, StringStatistics, ValueCount,
};
