use crate::enums::SortBy;
use crate::volume::{RescaleInfo, Volume};

use dicom::{
    object::{FileDicomObject, InMemDicomObject, open_file},
    pixeldata::{ConvertOptions, ModalityLutOption, PixelDecoder},
};
use dicom_dictionary_std::tags;
use log::warn;
use ndarray::{Array2, Array3, s};
use std::{fs, path::Path};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VolumeLoaderError {
    #[error("No valid DICOM images found")]
    NoValidImages,

    #[error("Inconsistent image dimensions")]
    InconsistentDimensions,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub struct VolumeLoader;

impl VolumeLoader {
    /// Load a volume from DICOM objects
    ///
    /// Undecodable objects are skipped with a warning; the load fails only
    /// when nothing decodes or the decoded slices disagree on shape.
    ///
    /// # Errors
    ///
    /// Returns error if no valid images found or dimensions are inconsistent
    pub fn load_from_dicom_objects(
        dicom_objects: &[FileDicomObject<InMemDicomObject>],
        sort_by: SortBy,
    ) -> Result<Volume, VolumeLoaderError> {
        let mut images_with_order: Vec<_> = dicom_objects
            .iter()
            .enumerate()
            .filter_map(|(index, dicom_object)| {
                let extracted = Self::extract_image_with_order(dicom_object, &sort_by);
                if extracted.is_none() {
                    warn!("skipping undecodable DICOM object at index {index}");
                }
                extracted
            })
            .collect();

        if images_with_order.is_empty() {
            return Err(VolumeLoaderError::NoValidImages);
        }

        Self::sort_images(&mut images_with_order, sort_by);

        let images: Vec<_> = images_with_order
            .into_iter()
            .map(|(_, image)| image)
            .collect();

        Self::validate_dimensions(&images)?;

        let volume_array = Self::build_volume_array(&images);
        let rescale = Self::get_rescale(dicom_objects);

        Ok(Volume::new(volume_array, rescale))
    }

    /// Load a volume from file paths
    ///
    /// Unreadable files are skipped with a warning rather than aborting
    /// the batch.
    pub fn load_from_file_paths(
        paths: &[impl AsRef<Path>],
        sort_by: SortBy,
    ) -> Result<Volume, VolumeLoaderError> {
        let objects: Vec<_> = paths
            .iter()
            .filter_map(|path| {
                let path = path.as_ref();
                match open_file(path) {
                    Ok(object) => Some(object),
                    Err(err) => {
                        warn!("skipping unreadable file {}: {err}", path.display());
                        None
                    }
                }
            })
            .collect();

        if objects.is_empty() {
            return Err(VolumeLoaderError::NoValidImages);
        }

        Self::load_from_dicom_objects(&objects, sort_by)
    }

    /// Load a volume from a directory containing .dcm files
    pub fn load_from_directory(
        path: impl AsRef<Path>,
        sort_by: SortBy,
    ) -> Result<Volume, VolumeLoaderError> {
        let paths: Vec<_> = fs::read_dir(path.as_ref())?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                path.extension()
                    .and_then(|s| s.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("dcm"))
            })
            .collect();

        if paths.is_empty() {
            return Err(VolumeLoaderError::NoValidImages);
        }

        Self::load_from_file_paths(&paths, sort_by)
    }

    fn extract_image_with_order(
        dicom_object: &FileDicomObject<InMemDicomObject>,
        sort_by: &SortBy,
    ) -> Option<(Option<f32>, Array2<i32>)> {
        let order = Self::get_sort_order(dicom_object, sort_by)?;
        let image_2d = Self::decode_image(dicom_object)?;
        Some((order, image_2d))
    }

    fn get_sort_order(
        dicom_object: &FileDicomObject<InMemDicomObject>,
        sort_by: &SortBy,
    ) -> Option<Option<f32>> {
        match sort_by {
            SortBy::SliceLocation => {
                let location = dicom_object
                    .element(tags::SLICE_LOCATION)
                    .ok()?
                    .to_float32()
                    .ok();
                Some(location)
            }
            SortBy::InstanceNumber => {
                let num = dicom_object
                    .element(tags::INSTANCE_NUMBER)
                    .ok()?
                    .to_int::<i32>()
                    .ok()
                    .map(|n| n as f32);
                Some(num)
            }
            SortBy::None => Some(Some(0.0)),
        }
    }

    // Raw stored values only: the modality rescale is tracked in
    // RescaleInfo and applied by the windowing engine at display time.
    fn decode_image(dicom_object: &FileDicomObject<InMemDicomObject>) -> Option<Array2<i32>> {
        let pixel_data = dicom_object.decode_pixel_data().ok()?;
        let options = ConvertOptions::new().with_modality_lut(ModalityLutOption::None);
        pixel_data
            .to_ndarray_with_options::<i32>(&options)
            .ok()
            .map(|arr| arr.slice_move(s![0, .., .., 0]))
    }

    // Stable sort: slices with equal keys keep their input order.
    fn sort_images(images_with_order: &mut [(Option<f32>, Array2<i32>)], sort_by: SortBy) {
        if !matches!(sort_by, SortBy::None) {
            images_with_order
                .sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        }
    }

    fn validate_dimensions(images: &[Array2<i32>]) -> Result<(), VolumeLoaderError> {
        let first_dim = images[0].dim();
        if images.iter().any(|img| img.dim() != first_dim) {
            return Err(VolumeLoaderError::InconsistentDimensions);
        }
        Ok(())
    }

    fn build_volume_array(images: &[Array2<i32>]) -> Array3<i32> {
        let (height, width) = images[0].dim();
        let depth = images.len();
        let mut volume = Array3::<i32>::zeros((depth, height, width));

        for (i, image) in images.iter().enumerate() {
            volume.slice_mut(s![i, .., ..]).assign(image);
        }

        volume
    }

    fn get_rescale(dicom_objects: &[FileDicomObject<InMemDicomObject>]) -> RescaleInfo {
        dicom_objects
            .iter()
            .find_map(|dicom_object| {
                let slope = dicom_object
                    .element(tags::RESCALE_SLOPE)
                    .ok()?
                    .to_float32()
                    .ok()?;
                let intercept = dicom_object
                    .element(tags::RESCALE_INTERCEPT)
                    .ok()?
                    .to_float32()
                    .ok()?;
                Some(RescaleInfo::new(slope, intercept))
            })
            .unwrap_or_default()
    }
}
