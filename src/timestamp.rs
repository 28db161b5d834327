//! Timestamp keys and the integer ids they map to.

use crate::error::{Result, TimegraphError};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Dense id assigned to a live timestamp within one dictionary.
pub type SlotId = u32;

/// Stable id of a node or edge inside the surrounding graph store.
pub type StoreId = u32;

/// A finite point in time.
///
/// Timestamps are opaque real numbers: no unit, calendar or zone is implied.
/// The wrapped value is always finite, which makes total ordering and hashing
/// well defined. `-0.0` is normalised to `0.0` so both spellings resolve to the
/// same slot, matching `==` on `f64`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Timestamp(f64);

impl Timestamp {
    /// Validate and wrap a raw value.
    pub fn new(value: f64) -> Result<Self> {
        check_finite(value)?;
        Ok(Self(if value == 0.0 { 0.0 } else { value }))
    }

    #[inline]
    pub fn value(self) -> f64 {
        self.0
    }
}

/// Reject NaN and infinities.
#[inline]
pub fn check_finite(value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(TimegraphError::InvalidTimestamp(value))
    }
}

impl PartialEq for Timestamp {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for Timestamp {}

impl Hash for Timestamp {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl PartialOrd for Timestamp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timestamp {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl TryFrom<f64> for Timestamp {
    type Error = TimegraphError;

    fn try_from(value: f64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Timestamp> for f64 {
    fn from(ts: Timestamp) -> Self {
        ts.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashSet;

    #[test]
    fn test_rejects_non_finite() {
        assert_eq!(
            Timestamp::new(f64::NAN).map(|_| ()).unwrap_err().to_string(),
            TimegraphError::InvalidTimestamp(f64::NAN).to_string()
        );
        assert!(Timestamp::new(f64::INFINITY).is_err());
        assert!(Timestamp::new(f64::NEG_INFINITY).is_err());
        assert!(Timestamp::new(-1e300).is_ok());
    }

    #[test]
    fn test_negative_zero_is_zero() {
        let a = Timestamp::new(0.0).unwrap();
        let b = Timestamp::new(-0.0).unwrap();
        assert_eq!(a, b);

        let mut set = FxHashSet::default();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn test_ordering_follows_values() {
        let mut values: Vec<Timestamp> = [3.5, -2.0, 0.0, 1e-9, 2.5]
            .into_iter()
            .map(|v| Timestamp::new(v).unwrap())
            .collect();
        values.sort();
        let raw: Vec<f64> = values.into_iter().map(f64::from).collect();
        assert_eq!(raw, vec![-2.0, 0.0, 1e-9, 2.5, 3.5]);
    }

    #[test]
    fn test_serde_rejects_nan_payload() {
        let ts: Timestamp = serde_json::from_str("1.5").unwrap();
        assert_eq!(ts.value(), 1.5);
        // JSON has no NaN literal; a bare out-of-range string is rejected too.
        assert!(serde_json::from_str::<Timestamp>("\"x\"").is_err());
    }
}
