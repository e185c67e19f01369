//! Output encoding for the upload pipeline.
//!
//! Every upload leaves the pipeline as a baseline JPEG, regardless of the
//! format it arrived in, so storage and downstream consumers only ever see
//! one format.

mod jpeg;

pub use jpeg::{encode_jpeg, jpeg_quality, EncodeError};

/// MIME type of every transcoded output.
pub const OUTPUT_MIME_TYPE: &str = "image/jpeg";

/// File extension matching [`OUTPUT_MIME_TYPE`].
pub const OUTPUT_EXTENSION: &str = "jpg";
