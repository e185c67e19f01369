//! WASM-compatible wrapper types for transcode results and errors.

use photofit_core::{TranscodeError, TranscodeResult};
use wasm_bindgen::prelude::*;

/// A transcoded upload, ready for the storage uploader.
///
/// # Memory Management
///
/// The encoded bytes live in WASM memory. `bytes()` copies them into a
/// `Uint8Array`; call it once and hand the array to the upload request.
#[wasm_bindgen]
pub struct JsTranscodeResult {
    inner: TranscodeResult,
}

#[wasm_bindgen]
impl JsTranscodeResult {
    /// Encoded JPEG bytes (copied to JavaScript memory).
    pub fn bytes(&self) -> Vec<u8> {
        self.inner.bytes.clone()
    }

    #[wasm_bindgen(getter, js_name = mimeType)]
    pub fn mime_type(&self) -> String {
        self.inner.mime_type.to_string()
    }

    #[wasm_bindgen(getter)]
    pub fn filename(&self) -> String {
        self.inner.filename.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.inner.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.inner.height
    }

    /// Quality (0-1) of the attempt that met the budget.
    #[wasm_bindgen(getter)]
    pub fn quality(&self) -> f32 {
        self.inner.quality
    }

    #[wasm_bindgen(getter)]
    pub fn attempts(&self) -> u32 {
        self.inner.attempts
    }

    #[wasm_bindgen(getter, js_name = byteLength)]
    pub fn byte_length(&self) -> usize {
        self.inner.byte_length()
    }

    #[wasm_bindgen(getter, js_name = sourceBytes)]
    pub fn source_bytes(&self) -> usize {
        self.inner.source_bytes
    }

    /// Creation time as an RFC 3339 string.
    #[wasm_bindgen(getter, js_name = createdAt)]
    pub fn created_at(&self) -> String {
        self.inner.created_at.to_rfc3339()
    }

    /// Explicitly free WASM memory.
    ///
    /// This is optional - wasm-bindgen's finalizer will handle cleanup automatically.
    pub fn free(self) {
        // Dropping self releases the memory
    }
}

impl JsTranscodeResult {
    pub(crate) fn from_result(inner: TranscodeResult) -> Self {
        Self { inner }
    }
}

/// Plain-data view of a [`TranscodeError`] for building the thrown JS error.
#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct ErrorDetails {
    pub kind: &'static str,
    pub message: String,
    pub limit: Option<f64>,
    pub actual: Option<f64>,
    pub mime_type: Option<String>,
    pub accepted: Option<Vec<String>>,
    pub attempts: Option<u32>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl From<&TranscodeError> for ErrorDetails {
    fn from(err: &TranscodeError) -> Self {
        let (limit, actual) = match err.limit_and_actual() {
            Some((limit, actual)) => (Some(limit as f64), Some(actual as f64)),
            None => (None, None),
        };
        let mut details = Self {
            kind: err.kind(),
            message: err.to_string(),
            limit,
            actual,
            ..Self::default()
        };

        match err {
            TranscodeError::UnsupportedFormat {
                mime_type,
                accepted,
            } => {
                details.mime_type = Some(mime_type.clone());
                details.accepted = Some(accepted.clone());
            }
            TranscodeError::BudgetExceeded {
                attempts,
                width,
                height,
                ..
            } => {
                details.attempts = Some(*attempts);
                details.width = Some(*width);
                details.height = Some(*height);
            }
            _ => {}
        }
        details
    }
}

/// Build a JS `Error` carrying `kind` plus whichever of `limit`, `actual`,
/// `mimeType`, `accepted`, `attempts`, `width` and `height` apply.
pub(crate) fn to_js_error(err: &TranscodeError) -> JsValue {
    let details = ErrorDetails::from(err);
    let js_err = js_sys::Error::new(&details.message);
    js_err.set_name(details.kind);

    let mut props: Vec<(&str, JsValue)> = vec![("kind", details.kind.into())];
    if let Some(limit) = details.limit {
        props.push(("limit", limit.into()));
    }
    if let Some(actual) = details.actual {
        props.push(("actual", actual.into()));
    }
    if let Some(mime_type) = &details.mime_type {
        props.push(("mimeType", JsValue::from_str(mime_type)));
    }
    if let Some(accepted) = &details.accepted {
        let list: js_sys::Array = accepted.iter().map(|m| JsValue::from_str(m)).collect();
        props.push(("accepted", list.into()));
    }
    for (key, value) in [
        ("attempts", details.attempts),
        ("width", details.width),
        ("height", details.height),
    ] {
        if let Some(value) = value {
            props.push((key, value.into()));
        }
    }

    let target: &JsValue = js_err.as_ref();
    for (key, value) in &props {
        let _ = js_sys::Reflect::set(target, &JsValue::from_str(key), value);
    }

    js_err.into()
}
