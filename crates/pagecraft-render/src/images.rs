//! Decoded image cache.

use crate::renderer::{RenderError, RenderResult};
use pagecraft_core::elements::{ElementId, ImageSource};
use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use tiny_skia::{IntSize, Pixmap};

/// Decode image bytes (PNG, JPEG or WebP) into a premultiplied pixmap.
pub fn decode_image(bytes: &[u8]) -> RenderResult<Pixmap> {
    let decoded = image::load_from_memory(bytes).map_err(|e| RenderError::Image(e.to_string()))?;
    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();
    let size = IntSize::from_wh(width, height)
        .ok_or(RenderError::InvalidSize { width, height })?;

    let mut data = rgba.into_raw();
    for px in data.chunks_exact_mut(4) {
        let a = px[3] as u16;
        for c in &mut px[..3] {
            *c = ((*c as u16 * a + 127) / 255) as u8;
        }
    }
    Pixmap::from_vec(data, size).ok_or(RenderError::InvalidSize { width, height })
}

fn content_key(data: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    data.hash(&mut hasher);
    hasher.finish()
}

/// Decoded pixmaps keyed by asset reference or embedded content.
#[derive(Default)]
pub struct ImageCache {
    assets: HashMap<String, Arc<Pixmap>>,
    embedded: HashMap<u64, Arc<Pixmap>>,
    /// Embedded images that failed to decode, so they are not retried.
    failed: HashSet<u64>,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the bytes behind an asset reference.
    pub fn insert_asset(&mut self, reference: impl Into<String>, bytes: &[u8]) -> RenderResult<()> {
        let reference = reference.into();
        let pixmap = decode_image(bytes)?;
        log::debug!(
            "Cached asset {reference} ({}x{})",
            pixmap.width(),
            pixmap.height()
        );
        self.assets.insert(reference, Arc::new(pixmap));
        Ok(())
    }

    pub fn contains_asset(&self, reference: &str) -> bool {
        self.assets.contains_key(reference)
    }

    pub fn len(&self) -> usize {
        self.assets.len() + self.embedded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.assets.clear();
        self.embedded.clear();
        self.failed.clear();
    }

    /// Pixmap for an image element, decoding embedded data on first use.
    pub(crate) fn get(&mut self, element: ElementId, source: &ImageSource) -> Option<Arc<Pixmap>> {
        match source {
            ImageSource::Asset { reference } => {
                let found = self.assets.get(reference).cloned();
                if found.is_none() {
                    log::debug!("Asset {reference} is not registered");
                }
                found
            }
            ImageSource::Embedded { data_base64, .. } => {
                let key = content_key(data_base64);
                if let Some(cached) = self.embedded.get(&key) {
                    return Some(Arc::clone(cached));
                }
                if self.failed.contains(&key) {
                    return None;
                }
                let decoded = source
                    .embedded_bytes()
                    .ok_or_else(|| RenderError::Image("invalid base64 data".to_string()))
                    .and_then(|bytes| decode_image(&bytes));
                match decoded {
                    Ok(pixmap) => {
                        let pixmap = Arc::new(pixmap);
                        self.embedded.insert(key, Arc::clone(&pixmap));
                        Some(pixmap)
                    }
                    Err(err) => {
                        log::warn!("Failed to decode image of element {element}: {err}");
                        self.failed.insert(key);
                        None
                    }
                }
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::renderer::encode_png;
    use pagecraft_core::elements::{Element, Geometry};

    /// Solid-color PNG for tests.
    pub(crate) fn solid_png(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
        let pixels: Vec<u8> = rgba
            .iter()
            .copied()
            .cycle()
            .take((width * height * 4) as usize)
            .collect();
        encode_png(&pixels, width, height).unwrap()
    }

    fn element_id() -> ElementId {
        Element::sticker(Geometry::default(), "*").id
    }

    #[test]
    fn test_decode_premultiplies() {
        let pixmap = decode_image(&solid_png(2, 2, [255, 0, 0, 128])).unwrap();
        let px = pixmap.pixel(0, 0).unwrap();
        assert_eq!(px.alpha(), 128);
        assert_eq!(px.red(), 128);
    }

    #[test]
    fn test_asset_lookup() {
        let mut cache = ImageCache::new();
        cache.insert_asset("a.png", &solid_png(1, 1, [0, 0, 255, 255])).unwrap();
        assert!(cache.contains_asset("a.png"));

        let id = element_id();
        assert!(cache.get(id, &ImageSource::asset("a.png")).is_some());
        assert!(cache.get(id, &ImageSource::asset("missing.png")).is_none());
    }

    #[test]
    fn test_embedded_decode_is_cached() {
        let mut cache = ImageCache::new();
        let source = ImageSource::embed(&solid_png(3, 1, [0, 255, 0, 255])).unwrap();
        let id = element_id();

        let first = cache.get(id, &source).unwrap();
        let second = cache.get(id, &source).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.width(), 3);
    }

    #[test]
    fn test_invalid_bytes_rejected() {
        assert!(matches!(decode_image(b"not an image"), Err(RenderError::Image(_))));
        let mut cache = ImageCache::new();
        assert!(cache.insert_asset("bad", b"nope").is_err());
        assert!(cache.is_empty());
    }
}
