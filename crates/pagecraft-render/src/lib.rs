//! PageCraft Render Library
//!
//! CPU raster export for PageCraft pages, built on tiny-skia.

mod images;
mod raster;
mod renderer;

pub use images::{ImageCache, decode_image};
pub use raster::{RasterRenderer, demultiplied_rgba};
pub use renderer::{ExportOptions, MAX_OUTPUT_SIDE, RenderError, RenderResult, encode_png};
