//! Sticker element: a short glyph token drawn at a scalable size.

use super::clamp_input;
use serde::{Deserialize, Serialize};

pub const MIN_STICKER_SCALE: f64 = 0.1;
pub const MAX_STICKER_SCALE: f64 = 10.0;

fn default_scale() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StickerElement {
    /// Content token, usually a single emoji.
    pub glyph: String,
    /// Glyph size relative to the element box.
    #[serde(default = "default_scale")]
    pub scale: f64,
}

impl StickerElement {
    pub fn new(glyph: impl Into<String>) -> Self {
        Self {
            glyph: glyph.into(),
            scale: 1.0,
        }
    }

    pub(crate) fn apply_patch(&mut self, patch: &StickerPatch) {
        if let Some(glyph) = &patch.glyph {
            self.glyph = glyph.clone();
        }
        if let Some(scale) = patch.scale {
            self.scale = clamp_input(
                "sticker scale",
                scale,
                MIN_STICKER_SCALE,
                MAX_STICKER_SCALE,
                self.scale,
            );
        }
    }
}

/// Partial update for a sticker payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StickerPatch {
    pub glyph: Option<String>,
    pub scale: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_clamped() {
        let mut sticker = StickerElement::new("*");
        sticker.apply_patch(&StickerPatch {
            scale: Some(0.0),
            ..StickerPatch::default()
        });
        assert_eq!(sticker.scale, MIN_STICKER_SCALE);
        assert_eq!(sticker.glyph, "*");
    }
}
