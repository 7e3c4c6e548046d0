use std::path::Path;

use anyhow::Context as _;

use crate::foundation::error::{DiagramError, DiagramResult};

/// Rasterizes an SVG document at its own pixel size into premultiplied RGBA8.
pub fn rasterize_svg(svg: &str) -> DiagramResult<(u32, u32, Vec<u8>)> {
    let opts = usvg::Options::default();
    let tree = usvg::Tree::from_str(svg, &opts).context("parse svg tree")?;

    let size = tree.size();
    let width = to_px(size.width())?;
    let height = to_px(size.height())?;

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| DiagramError::export("failed to allocate svg pixmap"))?;
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::default(),
        &mut pixmap.as_mut(),
    );
    Ok((width, height, pixmap.take()))
}

fn to_px(v: f32) -> DiagramResult<u32> {
    if !v.is_finite() || v <= 0.0 {
        return Err(DiagramError::export("svg has invalid width/height"));
    }
    Ok((v.ceil() as u32).max(1))
}

/// Writes RGBA8 pixels as a PNG, creating parent directories.
///
/// Previews are drawn over an opaque background, so premultiplied and straight alpha agree.
pub fn write_png(path: &Path, width: u32, height: u32, rgba: &[u8]) -> DiagramResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        path,
        rgba,
        width,
        height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}
