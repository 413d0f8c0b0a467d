//! Viewer session state and its event-driven transitions.
//!
//! All mutable viewer state lives in one [`ViewerState`] value owned by
//! the UI thread. Input handlers reduce to `state.apply(event)`; the UI
//! then redraws every dependent widget from the returned snapshot.

use crate::sync::{ControlRanges, RangePolicy, WindowControls};
use crate::volume::Volume;
use crate::windowing::WindowParams;

/// One viewer input, normalized away from any widget toolkit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Event {
    SetSlice(usize),
    /// Wheel or drag-accumulated slice stepping.
    StepSlice(i32),
    SetLevel(i32),
    SetWidth(i32),
    SetHuMin(i32),
    SetHuMax(i32),
    /// Absolute pointer windowing: cursor position within the rendered
    /// raster. Horizontal maps to width, vertical to level.
    DragTo {
        x: f32,
        y: f32,
        image_width: u32,
        image_height: u32,
    },
    /// Relative pointer windowing: accumulated drag deltas.
    DragBy { dx: i32, dy: i32 },
}

/// Snapshot of everything the slice display depends on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewerState {
    pub current_slice: usize,
    pub num_slices: usize,
    pub controls: WindowControls,
    pub ranges: ControlRanges,
    pub policy: RangePolicy,
    /// Data span in display units, fixed at load time. Absolute drag maps
    /// onto this span so it stays independent of the slider ranges.
    pub data_min: i32,
    pub data_max: i32,
}

impl ViewerState {
    /// Initial state for a freshly loaded volume: the window covers the
    /// full data range and the view starts at the center slice.
    pub fn from_volume(volume: &Volume) -> Self {
        let (lo, hi) = volume.hu_bounds();
        let data_min = lo.floor() as i32;
        let data_max = (hi.ceil() as i32).max(data_min + 1);
        let level = (data_min + data_max).div_euclid(2);
        let width = data_max - data_min;
        let num_slices = volume.num_slices();
        Self {
            current_slice: num_slices / 2,
            num_slices,
            controls: WindowControls::from_window(level, width),
            ranges: ControlRanges::from_data_bounds(data_min, data_max),
            policy: RangePolicy::default(),
            data_min,
            data_max,
        }
    }

    fn data_span(&self) -> i32 {
        (self.data_max - self.data_min).max(1)
    }

    /// Float window for the rendering engine.
    pub fn window_params(&self) -> WindowParams {
        WindowParams::new(self.controls.level as f32, self.controls.width as f32)
    }

    /// The metadata overlay drawn on top of the slice.
    pub fn overlay_line(&self) -> String {
        format!(
            "slice {}/{}  WL {}  WW {}  [{}, {}]",
            self.current_slice,
            self.num_slices.saturating_sub(1),
            self.controls.level,
            self.controls.width,
            self.controls.hu_min,
            self.controls.hu_max,
        )
    }

    fn with_controls(self, controls: WindowControls) -> Self {
        Self {
            controls,
            ranges: self.ranges.accommodate(controls, self.policy),
            ..self
        }
    }

    fn with_slice(self, slice: usize) -> Self {
        Self {
            current_slice: slice.min(self.num_slices.saturating_sub(1)),
            ..self
        }
    }

    /// Apply one input event, returning the next synchronized state.
    #[must_use]
    pub fn apply(self, event: Event) -> Self {
        match event {
            Event::SetSlice(index) => self.with_slice(index),
            Event::StepSlice(delta) => {
                let index = (self.current_slice as i64 + i64::from(delta)).max(0) as usize;
                self.with_slice(index)
            }
            Event::SetLevel(level) => self.with_controls(self.controls.with_level(level)),
            Event::SetWidth(width) => self.with_controls(self.controls.with_width(width)),
            Event::SetHuMin(min) => self.with_controls(self.controls.with_hu_min(min)),
            Event::SetHuMax(max) => self.with_controls(self.controls.with_hu_max(max)),
            Event::DragTo {
                x,
                y,
                image_width,
                image_height,
            } => {
                let span = self.data_span();
                let norm_x = (x / image_width.max(1) as f32).clamp(0.0, 1.0);
                let norm_y = (y / image_height.max(1) as f32).clamp(0.0, 1.0);
                // Left edge is the narrowest window, top edge the highest level.
                let width = 1 + (norm_x * (span - 1) as f32).round() as i32;
                let level = self.data_max - (norm_y * span as f32).round() as i32;
                self.with_controls(WindowControls::from_window(level, width))
            }
            Event::DragBy { dx, dy } => {
                let level = self.controls.level + dx;
                let width = self.controls.width - dy;
                self.with_controls(WindowControls::from_window(level, width))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    fn test_volume() -> Volume {
        // 10 slices of 512x512, values spanning 0..=1000.
        let data = Array3::from_shape_fn((10, 512, 512), |(s, h, w)| {
            ((s * 101 + h + w) % 1001) as i32
        });
        Volume::from_raw(data)
    }

    #[test]
    fn defaults_cover_data_range_and_center_slice() {
        let state = ViewerState::from_volume(&test_volume());
        assert_eq!(state.current_slice, 5);
        assert_eq!(state.num_slices, 10);
        assert_eq!(state.controls.level, 500);
        assert_eq!(state.controls.width, 1000);
        assert_eq!(state.data_min, 0);
        assert_eq!(state.data_max, 1000);
    }

    #[test]
    fn slice_stepping_clamps_at_both_ends() {
        let state = ViewerState::from_volume(&test_volume());
        let at_start = state.apply(Event::StepSlice(-20));
        assert_eq!(at_start.current_slice, 0);
        let at_end = at_start.apply(Event::StepSlice(100));
        assert_eq!(at_end.current_slice, 9);
    }

    #[test]
    fn hu_min_edit_past_max_nudges_instead_of_failing() {
        let state = ViewerState::from_volume(&test_volume());
        let edited = state.apply(Event::SetHuMax(100)).apply(Event::SetHuMin(150));
        assert_eq!(edited.controls.hu_min, 150);
        assert_eq!(edited.controls.hu_max, 151);
    }

    #[test]
    fn absolute_drag_corners_hit_extremes() {
        let state = ViewerState::from_volume(&test_volume());
        let top_left = state.apply(Event::DragTo {
            x: 0.0,
            y: 0.0,
            image_width: 512,
            image_height: 512,
        });
        assert_eq!(top_left.controls.width, 1);
        assert_eq!(top_left.controls.level, 1000);

        let bottom_right = state.apply(Event::DragTo {
            x: 512.0,
            y: 512.0,
            image_width: 512,
            image_height: 512,
        });
        assert_eq!(bottom_right.controls.width, 1000);
        assert_eq!(bottom_right.controls.level, 0);
    }

    #[test]
    fn relative_drag_shifts_level_and_width() {
        let state = ViewerState::from_volume(&test_volume());
        let dragged = state.apply(Event::DragBy { dx: 10, dy: 25 });
        assert_eq!(dragged.controls.level, 510);
        assert_eq!(dragged.controls.width, 975);
    }

    #[test]
    fn edits_expand_ranges_monotonically() {
        let state = ViewerState::from_volume(&test_volume());
        let edited = state.apply(Event::SetLevel(5000));
        assert!(edited.ranges.level.contains(5000));
        assert_eq!(edited.ranges.level.max, 5500);
        // Ranges survive a later in-range edit.
        let settled = edited.apply(Event::SetLevel(500));
        assert_eq!(settled.ranges.level, edited.ranges.level);
    }

    #[test]
    fn overlay_reports_window_and_bounds() {
        let state = ViewerState::from_volume(&test_volume());
        let line = state.overlay_line();
        assert!(line.contains("slice 5/9"));
        assert!(line.contains("WL 500"));
        assert!(line.contains("WW 1000"));
    }
}
