//! Classification of the canonical set against the destination set.

mod calendar_diff;
mod diff_kind;

pub use calendar_diff::{DESCRIPTION_COMPARE_LIMIT, DiffResult, diff};
pub use diff_kind::DiffKind;
