//! Bookkeeping that keeps the four linked windowing controls consistent.
//!
//! The level/width pair and the min/max pair describe the same window.
//! Every edit goes through a pure value-to-value function that returns a
//! fully synchronized snapshot; the caller refreshes all dependent widgets
//! from the snapshot unconditionally, so there is no re-entrant
//! notification to suppress.

/// Growth margins applied when a synchronized value leaves its displayed
/// slider range. The defaults are ad hoc; override them per call site if
/// a different growth feel is wanted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RangePolicy {
    /// Padding added beyond an out-of-range min/max value.
    pub hu_margin: i32,
    /// Padding added beyond an out-of-range level value.
    pub level_margin: i32,
    /// Multiplier applied to the width range upper bound until it fits.
    pub width_growth: i32,
}

impl Default for RangePolicy {
    fn default() -> Self {
        Self {
            hu_margin: 100,
            level_margin: 500,
            width_growth: 2,
        }
    }
}

/// Inclusive bounds of one slider.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SliderRange {
    pub min: i32,
    pub max: i32,
}

impl SliderRange {
    pub fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: i32) -> bool {
        self.min <= value && value <= self.max
    }

    /// Grow the range so `value` fits, padding by `margin` on the side that
    /// overflowed. Never shrinks.
    fn padded_to_include(self, value: i32, margin: i32) -> Self {
        let mut range = self;
        if value < range.min {
            range.min = value.saturating_sub(margin);
        }
        if value > range.max {
            range.max = value.saturating_add(margin);
        }
        range
    }

    /// Grow the upper bound geometrically until `value` fits. Never shrinks.
    fn scaled_to_include(self, value: i32, factor: i32) -> Self {
        let mut range = self;
        while range.max < value {
            range.max = range.max.saturating_mul(factor.max(2));
        }
        range
    }
}

/// Displayed bounds of the three windowing sliders. Bounds only ever grow.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ControlRanges {
    pub level: SliderRange,
    pub width: SliderRange,
    pub hu: SliderRange,
}

impl ControlRanges {
    /// Initial ranges for a data span `[lo, hi]`: level and min/max sliders
    /// cover the data, the width slider covers `[1, hi - lo]`.
    pub fn from_data_bounds(lo: i32, hi: i32) -> Self {
        let span = (hi - lo).max(1);
        Self {
            level: SliderRange::new(lo, hi),
            width: SliderRange::new(1, span),
            hu: SliderRange::new(lo, hi),
        }
    }

    /// Expand whichever ranges no longer contain the synchronized values.
    pub fn accommodate(self, controls: WindowControls, policy: RangePolicy) -> Self {
        Self {
            level: self
                .level
                .padded_to_include(controls.level, policy.level_margin),
            width: self.width.scaled_to_include(controls.width, policy.width_growth),
            hu: self
                .hu
                .padded_to_include(controls.hu_min, policy.hu_margin)
                .padded_to_include(controls.hu_max, policy.hu_margin),
        }
    }
}

/// The four linked edit surfaces in integer (slider/spin box) units.
///
/// The min/max pair derives from level/width with floor-division halves,
/// so an odd width drifts one unit from `hu_max - hu_min`. Edits through
/// the min/max pair keep `width == hu_max - hu_min` exact. `hu_min <
/// hu_max` holds after every edit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowControls {
    pub level: i32,
    pub width: i32,
    pub hu_min: i32,
    pub hu_max: i32,
}

impl WindowControls {
    /// Synchronized snapshot for a level/width edit. Width is silently
    /// clamped to at least 1.
    pub fn from_window(level: i32, width: i32) -> Self {
        let width = width.max(1);
        let half = width.div_euclid(2);
        let hu_min = level - half;
        let mut hu_max = level + half;
        if hu_max <= hu_min {
            hu_max = hu_min + 1;
        }
        Self {
            level,
            width,
            hu_min,
            hu_max,
        }
    }

    /// Synchronized snapshot for a min/max edit. `max <= min` is corrected
    /// silently by pushing the max up one unit.
    pub fn from_hu(min: i32, max: i32) -> Self {
        let max = if max <= min { min + 1 } else { max };
        Self {
            level: (min + max).div_euclid(2),
            width: max - min,
            hu_min: min,
            hu_max: max,
        }
    }

    pub fn with_level(self, level: i32) -> Self {
        Self::from_window(level, self.width)
    }

    pub fn with_width(self, width: i32) -> Self {
        Self::from_window(self.level, width)
    }

    /// Edit the lower bound. Raising it to or past the upper bound nudges
    /// the upper bound up one unit instead of failing.
    pub fn with_hu_min(self, min: i32) -> Self {
        let max = if min >= self.hu_max {
            min + 1
        } else {
            self.hu_max
        };
        Self::from_hu(min, max)
    }

    /// Edit the upper bound. Lowering it to or past the lower bound nudges
    /// the lower bound down one unit instead of failing.
    pub fn with_hu_max(self, max: i32) -> Self {
        let min = if max <= self.hu_min {
            max - 1
        } else {
            self.hu_min
        };
        Self::from_hu(min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_width_edit_derives_bounds() {
        let controls = WindowControls::from_window(40, 400);
        assert_eq!(controls.hu_min, -160);
        assert_eq!(controls.hu_max, 240);
    }

    #[test]
    fn odd_width_floor_drifts_at_most_one() {
        for width in 1..=9 {
            for level in [-50, 0, 37] {
                let controls = WindowControls::from_window(level, width);
                let derived = controls.hu_max - controls.hu_min;
                assert!((controls.width - derived).abs() <= 1);
                assert!(controls.hu_min < controls.hu_max);
            }
        }
    }

    #[test]
    fn hu_round_trip_within_one_unit() {
        for width in 1..=7 {
            for level in [-100, -3, 0, 75] {
                let forward = WindowControls::from_window(level, width);
                let back = WindowControls::from_hu(forward.hu_min, forward.hu_max);
                assert!((back.level - level).abs() <= 1);
                assert!((back.width - width).abs() <= 1);
            }
        }
    }

    #[test]
    fn hu_edit_keeps_width_exact() {
        let controls = WindowControls::from_window(75, 100).with_hu_min(10);
        assert_eq!(controls.width, controls.hu_max - controls.hu_min);
        assert_eq!(controls.hu_min, 10);
        assert_eq!(controls.hu_max, 125);
        assert_eq!(controls.level, 67);
    }

    #[test]
    fn raising_min_past_max_nudges_max_up() {
        let controls = WindowControls::from_hu(0, 100).with_hu_min(150);
        assert_eq!(controls.hu_min, 150);
        assert_eq!(controls.hu_max, 151);
        assert_eq!(controls.width, 1);
    }

    #[test]
    fn lowering_max_past_min_nudges_min_down() {
        let controls = WindowControls::from_hu(0, 100).with_hu_max(-20);
        assert_eq!(controls.hu_min, -21);
        assert_eq!(controls.hu_max, -20);
        assert_eq!(controls.width, 1);
    }

    #[test]
    fn width_clamps_to_one() {
        let controls = WindowControls::from_window(50, 0);
        assert_eq!(controls.width, 1);
        assert!(controls.hu_min < controls.hu_max);
    }

    #[test]
    fn edit_sequences_keep_invariants() {
        let mut controls = WindowControls::from_window(0, 1);
        let edits: [fn(WindowControls) -> WindowControls; 6] = [
            |c| c.with_level(-300),
            |c| c.with_width(7),
            |c| c.with_hu_min(500),
            |c| c.with_hu_max(-500),
            |c| c.with_width(0),
            |c| c.with_level(42),
        ];
        for edit in edits {
            controls = edit(controls);
            assert!(controls.hu_min < controls.hu_max);
            assert!(controls.width >= 1);
            assert!((controls.width - (controls.hu_max - controls.hu_min)).abs() <= 1);
        }
    }

    #[test]
    fn ranges_expand_with_margin_and_never_shrink() {
        let policy = RangePolicy::default();
        let ranges = ControlRanges::from_data_bounds(0, 1000);

        let controls = WindowControls::from_hu(-50, 900);
        let expanded = ranges.accommodate(controls, policy);
        assert_eq!(expanded.hu, SliderRange::new(-150, 1000));

        // A later in-range edit keeps the expanded bounds.
        let settled = expanded.accommodate(WindowControls::from_hu(0, 100), policy);
        assert_eq!(settled.hu, expanded.hu);
    }

    #[test]
    fn level_range_pads_by_level_margin() {
        let ranges = ControlRanges::from_data_bounds(0, 100);
        let expanded =
            ranges.accommodate(WindowControls::from_window(300, 10), RangePolicy::default());
        assert_eq!(expanded.level, SliderRange::new(0, 800));
    }

    #[test]
    fn width_range_doubles_until_it_fits() {
        let ranges = ControlRanges::from_data_bounds(0, 100);
        let expanded =
            ranges.accommodate(WindowControls::from_window(50, 900), RangePolicy::default());
        assert_eq!(expanded.width, SliderRange::new(1, 1600));
    }
}
