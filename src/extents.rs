//! Running per-axis minimum and maximum since the creature last woke.

/// Element types an [`ExtentsTracker`] can follow.
///
/// `LOWEST` and `HIGHEST` seed a fresh tracker so that the first observed
/// value replaces both bounds.
pub trait Extent: Copy + PartialOrd {
    const LOWEST: Self;
    const HIGHEST: Self;
}

impl Extent for f32 {
    const LOWEST: Self = f32::NEG_INFINITY;
    const HIGHEST: Self = f32::INFINITY;
}

impl Extent for i32 {
    const LOWEST: Self = i32::MIN;
    const HIGHEST: Self = i32::MAX;
}

/// Per-axis `(min, max)` that only ever widens until [`reset`](Self::reset).
#[derive(Debug, Clone, PartialEq)]
pub struct ExtentsTracker<T: Extent, const N: usize> {
    bounds: [(T, T); N],
}

impl<T: Extent, const N: usize> ExtentsTracker<T, N> {
    pub fn new() -> Self {
        Self {
            bounds: [(T::HIGHEST, T::LOWEST); N],
        }
    }

    /// Return every axis to the sentinel pair.
    pub fn reset(&mut self) {
        self.bounds = [(T::HIGHEST, T::LOWEST); N];
    }

    /// Widen each axis to include the matching value.
    ///
    /// Extra values beyond `N` are ignored; a shorter slice leaves the
    /// remaining axes untouched.
    pub fn observe(&mut self, values: &[T]) {
        for ((min, max), &v) in self.bounds.iter_mut().zip(values) {
            if v < *min {
                *min = v;
            }
            if v > *max {
                *max = v;
            }
        }
    }

    /// `(min, max)` for `axis`, or `None` if nothing was observed since the
    /// last reset.
    pub fn get(&self, axis: usize) -> Option<(T, T)> {
        let (min, max) = self.bounds[axis];
        (min <= max).then_some((min, max))
    }

    /// `true` while every axis still holds the sentinel pair.
    pub fn is_pristine(&self) -> bool {
        self.bounds
            .iter()
            .all(|&(min, max)| min == T::HIGHEST && max == T::LOWEST)
    }
}

impl<T: Extent, const N: usize> Default for ExtentsTracker<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_tracker_is_pristine() {
        let t: ExtentsTracker<f32, 3> = ExtentsTracker::new();
        assert!(t.is_pristine());
        assert_eq!(t.get(0), None);
    }

    #[test]
    fn test_bounds_only_widen() {
        let mut t: ExtentsTracker<f32, 2> = ExtentsTracker::new();
        t.observe(&[1.0, -2.0]);
        assert_eq!(t.get(0), Some((1.0, 1.0)));

        t.observe(&[3.0, -1.0]);
        t.observe(&[2.0, -5.0]);
        assert_eq!(t.get(0), Some((1.0, 3.0)));
        assert_eq!(t.get(1), Some((-5.0, -1.0)));
    }

    #[test]
    fn test_reset_restores_sentinels() {
        let mut t: ExtentsTracker<i32, 5> = ExtentsTracker::new();
        t.observe(&[10, 20, 30, 40, 50]);
        assert!(!t.is_pristine());
        t.reset();
        assert!(t.is_pristine());
        t.observe(&[7, 7, 7, 7, 7]);
        assert_eq!(t.get(4), Some((7, 7)));
    }

    #[test]
    fn test_short_slice_leaves_tail_untouched() {
        let mut t: ExtentsTracker<i32, 3> = ExtentsTracker::new();
        t.observe(&[1]);
        assert_eq!(t.get(0), Some((1, 1)));
        assert_eq!(t.get(2), None);
    }
}
