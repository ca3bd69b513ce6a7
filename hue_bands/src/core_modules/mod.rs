#[allow(non_snake_case)]
pub mod D1;
pub mod band;
pub mod band_splitter;
pub mod hue_bucket;
