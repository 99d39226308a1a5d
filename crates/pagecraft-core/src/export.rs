//! Raster export interface.

use crate::layout::RenderPlan;
use crate::page::PageDocument;
use crate::viewport::{Surface, Viewport};

/// Everything a rasterizer needs to draw a page.
#[derive(Debug, Clone, Copy)]
pub struct RasterRequest<'a> {
    pub page: &'a PageDocument,
    /// Resolved placements, committed state only.
    pub plan: &'a RenderPlan,
    /// Logical surface size; output pixels are `surface * scale`.
    pub surface: Surface,
    /// Viewport at export time (neutral).
    pub viewport: Viewport,
    pub scale: f64,
}

impl RasterRequest<'_> {
    /// Output size in whole pixels.
    pub fn output_size(&self) -> (u32, u32) {
        let to_px = |v: f64| (v * self.scale).round().max(0.0) as u32;
        (to_px(self.surface.width), to_px(self.surface.height))
    }
}

/// Backend that turns a page into encoded image bytes.
pub trait RasterTarget {
    type Error: std::error::Error;

    fn rasterize(&mut self, request: &RasterRequest<'_>) -> Result<Vec<u8>, Self::Error>;
}
