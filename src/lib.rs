//! # DICOM-window library
//!
//! This crate is the windowing core shared by grayscale slice viewers for
//! volumetric data
//!
//! It covers the non-UI half of such a viewer: loading a stack of DICOM
//! files (or a raw 3-D array) into a [`Volume`], mapping slices to 8-bit
//! grayscale with a window level/width transform, and keeping the four
//! linked windowing controls (level, width, min, max) consistent under
//! direct edits, pointer drags, and range auto-expansion. Widget layout,
//! dialogs, and drawing belong to the embedding application; it feeds
//! input events into [`ViewerState`] and redraws from the returned
//! snapshot.
//!
//! A background directory scan is available through [`ScanJob`]: it walks
//! a tree off the owning thread, groups DICOM files into series, and
//! reports progress over a channel with cooperative cancellation.
//!
//! # Examples
//!
//! ## Windowing the center slice of a CT series
//!
//! Load all DICOM files from the ct/ directory ordered by slice location,
//! then render the center slice with the data-range default window.
//!
//! ```no_run
//! # use dicom_window::enums::SortBy;
//! # use dicom_window::state::ViewerState;
//! # use dicom_window::volume_loader::VolumeLoader;
//! # use dicom_window::windowing::render_slice;
//! # use std::path::PathBuf;
//! let volume = VolumeLoader::load_from_directory(&PathBuf::from("ct"), SortBy::SliceLocation)
//!     .expect("should have loaded files from directory");
//! let state = ViewerState::from_volume(&volume);
//! let slice = volume
//!     .slice(state.current_slice)
//!     .expect("center slice is in range");
//! let image = render_slice(slice, volume.rescale(), state.window_params())
//!     .expect("slice dimensions form an image");
//! image.save("slice.png");
//! ```
//!
//! [`Volume`]: crate::volume::Volume
//! [`ViewerState`]: crate::state::ViewerState
//! [`ScanJob`]: crate::scanner::ScanJob

pub mod enums;
pub mod scanner;
pub mod state;
pub mod sync;
pub mod volume;
pub mod volume_loader;
pub mod windowing;
