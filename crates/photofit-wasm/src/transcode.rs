//! Upload transcoding WASM bindings.
//!
//! # Example
//!
//! ```typescript
//! import { transcode } from '@photofit/wasm';
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! try {
//!   const out = transcode(bytes, file.type, file.name, { targetBytes: 1_500_000 });
//!   await upload(new Blob([out.bytes()], { type: out.mimeType }), out.filename);
//! } catch (e) {
//!   if (e.kind === 'SourceTooLarge') {
//!     showError(`Max ${e.limit} bytes, got ${e.actual}`);
//!   }
//! }
//! ```

use photofit_core::{BudgetConfig, SourceImage, Transcoder};
use wasm_bindgen::prelude::*;

use crate::types::{to_js_error, JsTranscodeResult};

/// Transcode an upload into a JPEG that fits the byte budget.
///
/// # Arguments
///
/// * `bytes` - The uploaded file as a `Uint8Array`
/// * `mime_type` - MIME type declared by the browser (`File.type`)
/// * `filename` - Original filename (`File.name`)
/// * `config` - Optional partial budget config (camelCase keys); omitted keys use defaults
///
/// # Errors
///
/// Throws an `Error` whose `kind` is one of `UnsupportedFormat`,
/// `SourceTooLarge`, `DecodeFailure`, `EncodeFailure`, `BudgetExceeded` or
/// `InvalidConfig`. Size-related errors also carry numeric `limit` and
/// `actual` properties. `UnsupportedFormat` adds `mimeType` and `accepted`;
/// `BudgetExceeded` adds `attempts`, `width` and `height`.
#[wasm_bindgen]
pub fn transcode(
    bytes: Vec<u8>,
    mime_type: &str,
    filename: &str,
    config: JsValue,
) -> Result<JsTranscodeResult, JsValue> {
    let config = parse_config(config)?;
    let transcoder = Transcoder::new(config).map_err(|e| to_js_error(&e))?;

    let source = SourceImage::new(bytes, mime_type, filename);
    transcoder
        .transcode(&source)
        .map(JsTranscodeResult::from_result)
        .map_err(|e| to_js_error(&e))
}

/// The default budget configuration as a plain object.
///
/// Useful for showing limits in the upload form before a file is picked.
#[wasm_bindgen(js_name = defaultConfig)]
pub fn default_config() -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(&BudgetConfig::default())
        .map_err(|e| JsValue::from_str(&format!("Failed to serialize config: {}", e)))
}

fn parse_config(value: JsValue) -> Result<BudgetConfig, JsValue> {
    if value.is_undefined() || value.is_null() {
        return Ok(BudgetConfig::default());
    }
    serde_wasm_bindgen::from_value(value)
        .map_err(|e| JsValue::from_str(&format!("Invalid budget config: {}", e)))
}
