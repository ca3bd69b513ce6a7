use hue_bands::error::RenderError;
use hue_bands::renderer::{DebugRenderer, compose_debug_view};
use image::{Rgb, RgbImage};
use opencv::{
    core::{self, Mat, Scalar},
    highgui,
    prelude::*,
};

/// Shows the original frame next to its reconstructed bands and waits for a key.
pub struct HighGuiWindow {
    title: String,
}

impl HighGuiWindow {
    pub fn new(title: impl Into<String>) -> Result<Self, RenderError> {
        let title = title.into();
        highgui::named_window(&title, highgui::WINDOW_AUTOSIZE).map_err(backend)?;
        Ok(Self { title })
    }
}

impl DebugRenderer for HighGuiWindow {
    fn render(&mut self, frame: &RgbImage, colors: &[Rgb<u8>], bands: usize) -> Result<(), RenderError> {
        let view = compose_debug_view(frame, colors, bands)?;
        let mat = rgb_image_to_bgr_mat(&view)?;
        highgui::imshow(&self.title, &mat).map_err(backend)?;
        // Blocks until any key is pressed in the window.
        highgui::wait_key(0).map_err(backend)?;
        Ok(())
    }
}

impl Drop for HighGuiWindow {
    fn drop(&mut self) {
        let _ = highgui::destroy_window(&self.title);
    }
}

fn backend(e: opencv::Error) -> RenderError {
    RenderError::Backend(e.to_string())
}

/// Copies an RGB image into a freshly allocated BGR `Mat`.
fn rgb_image_to_bgr_mat(image: &RgbImage) -> Result<Mat, RenderError> {
    let size = core::Size::new(image.width() as i32, image.height() as i32);
    let mut mat = Mat::new_size_with_default(size, core::CV_8UC3, Scalar::all(0.0)).map_err(backend)?;

    let destination = mat.data_bytes_mut().map_err(backend)?;
    for (bgr, rgb) in destination.chunks_exact_mut(3).zip(image.pixels()) {
        let [red, green, blue] = rgb.0;
        bgr.copy_from_slice(&[blue, green, red]);
    }
    Ok(mat)
}
