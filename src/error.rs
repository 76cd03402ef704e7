//! Error types of the modeling core.

use std::{fmt::Debug, ops::RangeBounds};

/// Failure of a single rate or engine computation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    #[error("{name} must be in the range {range}, but is {value}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        range: String,
    },

    #[error("{name} is degenerate: {value}")]
    NumericDegeneracy { name: &'static str, value: f64 },
}

/// Failure of a condition run, identifying the condition that aborted it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RunError {
    #[error("condition {index} ({label}) failed")]
    Condition {
        index: usize,
        label: String,
        #[source]
        source: ModelError,
    },
}

/// Check that `num` lies in `range`, failing with [`ModelError::InvalidParameter`].
///
/// NaN never lies in any range.
pub fn check_num<R>(name: &'static str, num: f64, range: R) -> Result<(), ModelError>
where
    R: RangeBounds<f64> + Debug,
{
    if !range.contains(&num) {
        return Err(ModelError::InvalidParameter {
            name,
            value: num,
            range: format!("{range:?}"),
        });
    }
    Ok(())
}

/// Check that `num` is strictly positive.
pub fn check_pos(name: &'static str, num: f64) -> Result<(), ModelError> {
    if !(num > 0.0) {
        return Err(ModelError::InvalidParameter {
            name,
            value: num,
            range: "(0.0, inf)".to_string(),
        });
    }
    Ok(())
}
