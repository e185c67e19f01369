//! Source decoding for the upload pipeline.
//!
//! This module provides functionality for:
//! - Sniffing and decoding JPEG, PNG and WebP uploads
//! - Applying EXIF orientation so rasters are upright
//! - Flattening transparency onto white
//! - Resampling rasters between dimension tiers
//!
//! All operations are synchronous and single-threaded; the same code runs in
//! a backend service and inside WASM in the browser.

mod raster;
mod resize;
mod types;

pub use raster::decode_image;
pub use resize::resize;
pub(crate) use types::Orientation;
pub use types::{DecodeError, FilterType, RasterImage};
