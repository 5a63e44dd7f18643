//! Image probing, dimension planning, and encoding.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::image_dimensions` |
//! | **Resize** | Lanczos3 via the `image` crate |
//! | **Encode JPEG/PNG** | `image` crate encoders |
//! | **Encode WebP (lossy)** | libwebp via the `webp` crate |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing encode operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]

pub mod backend;
mod calculations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::fit_within;
pub use params::{
    CodecSettings, EncodeParams, JpegSettings, OutputFormat, PngSettings, Quality,
    UnsupportedFormat, WebPSettings,
};
pub use rust_backend::RustBackend;
