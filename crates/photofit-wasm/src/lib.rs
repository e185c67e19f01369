//! Photofit WASM - WebAssembly bindings for the upload transcoder
//!
//! This crate exposes `photofit-core` to the browser upload form so photos are
//! brought under the byte budget before they leave the device.
//!
//! # Module Structure
//!
//! - `transcode` - the `transcode` entry point and default config
//! - `types` - result wrapper and error conversion
//! - `logging` - `log` records forwarded to the browser console
//!
//! # Usage
//!
//! ```typescript
//! import init, { transcode } from '@photofit/wasm';
//!
//! // Initialize WASM module (must call first)
//! await init();
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const out = transcode(bytes, file.type, file.name);
//! console.log(`${out.filename}: ${out.width}x${out.height}, ${out.byteLength} bytes`);
//! ```

use wasm_bindgen::prelude::*;

mod logging;
mod transcode;
mod types;

// Re-export public types
pub use logging::set_log_level;
pub use transcode::{default_config, transcode};
pub use types::JsTranscodeResult;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    logging::init();
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
