//! Growth policy: decides when a table rebuilds into a larger bucket store.

use crate::error::{MapError, Result};

/// Bucket count used when none is requested.
pub const DEFAULT_CAPACITY: usize = 19;

/// Fill-ratio threshold used by the default policy.
pub const DEFAULT_THRESHOLD: f64 = 0.82;

/// When to double the bucket store after an insertion.
///
/// Both variants compare `len` against `capacity` after every successful
/// insertion; they differ only in how the ratio is computed.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum GrowthPolicy {
    /// Grow when the true fractional fill ratio `len / capacity` exceeds
    /// the threshold. With the default threshold and 19 buckets, the 16th
    /// insertion triggers the first rehash.
    LoadFactor(f64),
    /// Grow when the integer quotient `len / capacity` exceeds the
    /// threshold. For any threshold below 1.0 this means growth happens
    /// only once `len >= capacity`.
    Truncated(f64),
}

impl GrowthPolicy {
    pub fn threshold(&self) -> f64 {
        match *self {
            GrowthPolicy::LoadFactor(t) | GrowthPolicy::Truncated(t) => t,
        }
    }

    pub(crate) fn validate(self) -> Result<Self> {
        let t = self.threshold();
        if t.is_finite() && t > 0.0 {
            Ok(self)
        } else {
            Err(MapError::InvalidThreshold(t))
        }
    }

    /// True if a table holding `len` entries in `capacity` buckets should grow.
    #[inline]
    pub fn should_grow(&self, len: usize, capacity: usize) -> bool {
        debug_assert!(capacity > 0);
        match *self {
            GrowthPolicy::LoadFactor(t) => len as f64 / capacity as f64 > t,
            GrowthPolicy::Truncated(t) => (len / capacity) as f64 > t,
        }
    }
}

impl Default for GrowthPolicy {
    fn default() -> Self {
        GrowthPolicy::LoadFactor(DEFAULT_THRESHOLD)
    }
}

/// Capacity after one growth step. Saturates instead of overflowing.
#[inline]
pub(crate) fn next_capacity(capacity: usize) -> usize {
    capacity.saturating_mul(2)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// First `len` at which the policy asks to grow, inserting one at a time.
    fn first_growth(policy: GrowthPolicy, capacity: usize) -> usize {
        (1..=capacity * 4)
            .find(|&len| policy.should_grow(len, capacity))
            .expect("policy never grows")
    }

    #[test]
    fn load_factor_grows_past_threshold() {
        let p = GrowthPolicy::default();
        assert!(!p.should_grow(15, 19)); // 0.789
        assert!(p.should_grow(16, 19)); // 0.842
        assert_eq!(first_growth(p, 19), 16);
        assert_eq!(first_growth(p, 100), 83);
    }

    #[test]
    fn truncated_grows_only_at_capacity() {
        let p = GrowthPolicy::Truncated(DEFAULT_THRESHOLD);
        assert!(!p.should_grow(18, 19));
        assert!(p.should_grow(19, 19));
        assert_eq!(first_growth(p, 19), 19);
        assert_eq!(first_growth(p, 1), 1);
    }

    #[test]
    fn truncated_with_threshold_above_one_waits_for_quotient() {
        // Quotient must reach 2 before it exceeds 1.5.
        let p = GrowthPolicy::Truncated(1.5);
        assert_eq!(first_growth(p, 10), 20);
    }

    #[test]
    fn validate_rejects_bad_thresholds() {
        assert!(GrowthPolicy::LoadFactor(0.5).validate().is_ok());
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                GrowthPolicy::Truncated(bad).validate(),
                Err(MapError::InvalidThreshold(_))
            ));
        }
    }

    #[test]
    fn next_capacity_doubles_and_saturates() {
        assert_eq!(next_capacity(19), 38);
        assert_eq!(next_capacity(usize::MAX), usize::MAX);
    }
}
