//! Render a saved page to a PNG thumbnail.
//!
//! Usage: `pagecraft-thumbnail <page.json> <out.png> [scale]`
//!
//! Asset images are looked up relative to the page file.

use pagecraft_core::elements::{ElementKind, ImageSource};
use pagecraft_core::{AssetResolver, Canvas, PageDocument, PrefixAssetResolver};
use pagecraft_render::RasterRenderer;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

const DEFAULT_SCALE: f64 = 0.25;

struct Args {
    page: PathBuf,
    output: PathBuf,
    scale: f64,
}

fn parse_args() -> Result<Args, String> {
    let mut args = std::env::args().skip(1);
    let usage = "usage: pagecraft-thumbnail <page.json> <out.png> [scale]";
    let page = args.next().ok_or(usage)?;
    let output = args.next().ok_or(usage)?;
    let scale = match args.next() {
        Some(raw) => raw
            .parse::<f64>()
            .ok()
            .filter(|s| s.is_finite() && *s > 0.0)
            .ok_or_else(|| format!("invalid scale: {raw}"))?,
        None => DEFAULT_SCALE,
    };
    Ok(Args {
        page: page.into(),
        output: output.into(),
        scale,
    })
}

/// Load every asset image the page references from disk.
fn register_assets(renderer: &mut RasterRenderer, page: &PageDocument, base: &Path) {
    let resolver = PrefixAssetResolver::new(base.to_string_lossy());
    for element in &page.elements {
        let ElementKind::Image(image) = &element.kind else {
            continue;
        };
        let ImageSource::Asset { reference } = &image.source else {
            continue;
        };
        if renderer.images_mut().contains_asset(reference) {
            continue;
        }
        let Some(location) = resolver.resolve(&image.source) else {
            continue;
        };
        if location.contains("://") {
            log::warn!("Skipping remote asset {location}");
            continue;
        }
        let registered = std::fs::read(&location)
            .map_err(|e| e.to_string())
            .and_then(|bytes| {
                renderer
                    .images_mut()
                    .insert_asset(reference.clone(), &bytes)
                    .map_err(|e| e.to_string())
            });
        if let Err(err) = registered {
            log::warn!("Asset {reference} unavailable ({location}): {err}");
        }
    }
}

fn run(args: Args) -> Result<(), String> {
    let json = std::fs::read_to_string(&args.page)
        .map_err(|e| format!("reading {}: {e}", args.page.display()))?;
    let page = PageDocument::from_json(&json)
        .map_err(|e| format!("parsing {}: {e}", args.page.display()))?;
    log::info!("Loaded page {} ({} elements)", page.id, page.len());

    let mut renderer = RasterRenderer::new();
    let base = args
        .page
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    register_assets(&mut renderer, &page, base);

    let mut canvas = Canvas::new(page);
    let png = canvas
        .render_to_raster(&mut renderer, args.scale)
        .map_err(|e| e.to_string())?;
    std::fs::write(&args.output, &png)
        .map_err(|e| format!("writing {}: {e}", args.output.display()))?;

    log::info!("Wrote {} ({} bytes)", args.output.display(), png.len());
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    match parse_args().and_then(run) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
