use std::path::PathBuf;

use dicom_window::{
    enums::SortBy, state::ViewerState, volume_loader::VolumeLoader, windowing::render_slice,
};

fn main() {
    env_logger::init();

    let dir = std::env::args().nth(1).unwrap_or_else(|| "dicom".to_owned());
    let volume = VolumeLoader::load_from_directory(&PathBuf::from(dir), SortBy::SliceLocation)
        .expect("should have loaded files from directory");
    let state = ViewerState::from_volume(&volume);
    let slice = volume
        .slice(state.current_slice)
        .expect("center slice is in range");
    let image = render_slice(slice, volume.rescale(), state.window_params())
        .expect("slice dimensions form an image");

    println!("{}", state.overlay_line());
    image
        .save("slice.png")
        .expect("should have saved slice.png");
}
