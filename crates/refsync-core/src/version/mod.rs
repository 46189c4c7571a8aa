//! Semantic version constraints and tag selection.

mod constraint;

pub use constraint::{SemverConstraint, compare_precedence, parse_tag_version, select_latest};
