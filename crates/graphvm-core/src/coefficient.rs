use serde::{Serialize, de::DeserializeOwned};
use std::fmt;

///
/// Coefficient
///
/// Multiplicity/weight threaded through traversers and instructions. Bulk
/// counting folds duplicates into one traverser with a combined coefficient
/// instead of materializing each duplicate.
///

pub trait Coefficient:
    Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// The multiplicative identity; the coefficient of a fresh traverser.
    fn unity() -> Self;

    /// Combine two coefficients additively (merging duplicate traversers).
    #[must_use]
    fn sum(&self, other: &Self) -> Self;

    /// Combine two coefficients multiplicatively (stage application).
    #[must_use]
    fn multiply(&self, other: &Self) -> Self;

    /// The bulk this coefficient stands for when results are materialized.
    fn count(&self) -> u64;
}

///
/// LongCoefficient
///
/// Stock integer coefficient. Arithmetic saturates; a negative coefficient
/// counts as zero bulk.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LongCoefficient(i64);

impl LongCoefficient {
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl Coefficient for LongCoefficient {
    fn unity() -> Self {
        Self(1)
    }

    fn sum(&self, other: &Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    fn multiply(&self, other: &Self) -> Self {
        Self(self.0.saturating_mul(other.0))
    }

    fn count(&self) -> u64 {
        u64::try_from(self.0).unwrap_or(0)
    }
}

impl Default for LongCoefficient {
    fn default() -> Self {
        Self::unity()
    }
}

impl fmt::Display for LongCoefficient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

///
/// TESTS
///
