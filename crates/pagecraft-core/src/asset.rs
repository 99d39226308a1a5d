//! Asset resolution: turning image sources into renderable URLs.

use crate::elements::ImageSource;

/// Maps an image source to a URL a renderer can load. The core never
/// fetches bytes itself.
pub trait AssetResolver {
    fn resolve(&self, source: &ImageSource) -> Option<String>;
}

/// Joins asset references onto a base URL; embedded images become `data:` URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixAssetResolver {
    base_url: String,
}

impl PrefixAssetResolver {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl AssetResolver for PrefixAssetResolver {
    fn resolve(&self, source: &ImageSource) -> Option<String> {
        match source {
            ImageSource::Asset { reference } => {
                let reference = reference.trim();
                if reference.is_empty() {
                    return None;
                }
                if reference.contains("://") || reference.starts_with("data:") {
                    return Some(reference.to_string());
                }
                let base = self.base_url.trim_end_matches('/');
                let path = reference.trim_start_matches('/');
                Some(format!("{base}/{path}"))
            }
            ImageSource::Embedded {
                format,
                data_base64,
            } => Some(format!("data:{};base64,{}", format.mime_type(), data_base64)),
        }
    }
}
