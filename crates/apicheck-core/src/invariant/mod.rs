//! Invariant module - pure predicates over extracted values and their verdicts

mod checks;
mod verdict;

pub use checks::{
    Direction, JsonType, Predicate, all_satisfy, boolean_typed, compare_scalars, count_equals,
    member_of, set_equals, sorted, subset, unique,
};
pub use verdict::{InvariantError, Offender, Verdict, VerdictDetails};
