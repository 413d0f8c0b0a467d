use ndarray::Array3;
use ndarray::ArrayView2;
use ndarray::s;

/// Modality rescale applied at display time: `hu = raw * slope + intercept`.
///
/// Raw-array volumes carry the identity rescale, so their samples pass
/// through unchanged.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RescaleInfo {
    pub slope: f32,
    pub intercept: f32,
}

impl Default for RescaleInfo {
    fn default() -> Self {
        Self {
            slope: 1.0,
            intercept: 0.0,
        }
    }
}

impl RescaleInfo {
    pub fn new(slope: f32, intercept: f32) -> Self {
        Self { slope, intercept }
    }

    #[inline]
    pub fn apply(&self, raw: i32) -> f32 {
        raw as f32 * self.slope + self.intercept
    }
}

/// An ordered stack of 2-D integer slices with shape (slice, height, width).
///
/// Immutable once built; a new load replaces the volume wholesale.
pub struct Volume {
    data: Array3<i32>,
    rescale: RescaleInfo,
}

impl Volume {
    pub fn new(data: Array3<i32>, rescale: RescaleInfo) -> Self {
        Self { data, rescale }
    }

    /// Build a volume from a raw stacked array, with no modality rescale.
    pub fn from_raw(data: Array3<i32>) -> Self {
        Self::new(data, RescaleInfo::default())
    }

    /// Get the dimensions of the volume (slices, height, width)
    pub fn dim(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    pub fn num_slices(&self) -> usize {
        self.data.dim().0
    }

    /// Get a reference to the underlying data
    pub fn data(&self) -> &Array3<i32> {
        &self.data
    }

    pub fn rescale(&self) -> RescaleInfo {
        self.rescale
    }

    /// Get the 2-D slice at `index`, or `None` when out of range.
    pub fn slice(&self, index: usize) -> Option<ArrayView2<'_, i32>> {
        if index >= self.num_slices() {
            return None;
        }
        Some(self.data.slice(s![index, .., ..]))
    }

    /// Minimum and maximum raw sample values, or `None` for an empty volume.
    pub fn value_range(&self) -> Option<(i32, i32)> {
        let mut iter = self.data.iter();
        let first = *iter.next()?;
        let (min, max) = iter.fold((first, first), |(min, max), &v| (min.min(v), max.max(v)));
        Some((min, max))
    }

    /// Sample range in display units, after the modality rescale.
    ///
    /// A negative slope flips the raw ordering; the bounds are re-ordered
    /// so that `lo <= hi` always holds. Empty volumes report `(0.0, 1.0)`.
    pub fn hu_bounds(&self) -> (f32, f32) {
        match self.value_range() {
            Some((min, max)) => {
                let a = self.rescale.apply(min);
                let b = self.rescale.apply(max);
                (a.min(b), a.max(b))
            }
            None => (0.0, 1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn test_volume() -> Volume {
        Volume::from_raw(array![[[0, 1], [2, 3]], [[4, 5], [6, 7]], [[8, 9], [10, 11]]])
    }

    #[test]
    fn slice_extracts_plane() {
        let volume = test_volume();
        let slice = volume.slice(1).unwrap();
        assert_eq!(slice, array![[4, 5], [6, 7]]);
    }

    #[test]
    fn slice_out_of_range_is_none() {
        let volume = test_volume();
        assert!(volume.slice(3).is_none());
    }

    #[test]
    fn value_range_spans_data() {
        let volume = test_volume();
        assert_eq!(volume.value_range(), Some((0, 11)));
    }

    #[test]
    fn hu_bounds_apply_rescale() {
        let data = array![[[0, 1000], [2000, 3000]]];
        let volume = Volume::new(data, RescaleInfo::new(1.0, -1024.0));
        let (lo, hi) = volume.hu_bounds();
        assert_abs_diff_eq!(lo, -1024.0);
        assert_abs_diff_eq!(hi, 1976.0);
    }

    #[test]
    fn hu_bounds_reorder_on_negative_slope() {
        let data = array![[[0, 100]]];
        let volume = Volume::new(data, RescaleInfo::new(-1.0, 0.0));
        let (lo, hi) = volume.hu_bounds();
        assert_abs_diff_eq!(lo, -100.0);
        assert_abs_diff_eq!(hi, 0.0);
    }
}
