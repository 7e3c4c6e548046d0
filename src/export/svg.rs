use std::fmt;

use crate::{
    foundation::core::{Affine, Rect},
    foundation::error::{DiagramError, DiagramResult},
    timeline::{ShapeState, Snapshot},
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SvgOptions {
    /// Output width in pixels; height follows the content's aspect ratio.
    pub width_px: u32,
    pub padding_px: f64,
    pub background: [u8; 3],
    pub ink: [u8; 3],
    /// Multiplier on each shape's stroke width.
    pub stroke_scale: f64,
}

impl Default for SvgOptions {
    fn default() -> Self {
        Self {
            width_px: 1920,
            padding_px: 48.0,
            background: [18, 20, 28],
            ink: [255, 255, 255],
            stroke_scale: 1.0,
        }
    }
}

/// Rendered document and its pixel size.
#[derive(Clone, Debug, PartialEq)]
pub struct SvgDocument {
    pub svg: String,
    pub width: u32,
    pub height: u32,
}

/// Draws the revealed shapes of `snapshot`, scaled to fit `opts.width_px`.
///
/// Design space is y-up, so the view transform flips the vertical axis. Partly revealed
/// shapes are drawn faded by their reveal amount.
pub fn render_svg(snapshot: &Snapshot, opts: &SvgOptions) -> DiagramResult<SvgDocument> {
    if opts.width_px == 0 {
        return Err(DiagramError::export("svg width must be > 0"));
    }

    let visible: Vec<_> = snapshot.visible().collect();
    let bounds = visible
        .iter()
        .map(|s| s.shape.bounding_box())
        .reduce(|a, b| a.union(b))
        .unwrap_or(Rect::new(-1.0, -1.0, 1.0, 1.0));

    let (width, height, view) = fit_view(bounds, opts)?;

    let mut out = String::new();
    write_document(&mut out, &visible, view, (width, height), opts)
        .map_err(|e| DiagramError::export(format!("format svg: {e}")))?;

    Ok(SvgDocument {
        svg: out,
        width,
        height,
    })
}

fn write_document(
    out: &mut impl fmt::Write,
    visible: &[&ShapeState],
    view: Affine,
    (width, height): (u32, u32),
    opts: &SvgOptions,
) -> fmt::Result {
    let bg = hex(opts.background);
    let ink = hex(opts.ink);
    writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
    )?;
    writeln!(
        out,
        r#"  <rect x="0" y="0" width="{width}" height="{height}" fill="{bg}"/>"#
    )?;

    for state in visible {
        let shape = &state.shape;
        let mut path = shape.world_path();
        path.apply_affine(view);

        let style = shape.style;
        let stroke_w = style.stroke_width * opts.stroke_scale;
        let stroke_o = style.stroke_opacity * state.reveal;
        write!(
            out,
            r#"  <path d="{}" stroke="{ink}" stroke-width="{stroke_w:.3}" stroke-opacity="{stroke_o:.4}" stroke-linejoin="round" "#,
            path.to_svg()
        )?;
        if shape.geometry.is_closed() && style.fill_opacity > 0.0 {
            writeln!(
                out,
                r#"fill="{ink}" fill-opacity="{:.4}"/>"#,
                style.fill_opacity * state.reveal
            )?;
        } else {
            writeln!(out, r#"fill="none"/>"#)?;
        }
    }
    writeln!(out, "</svg>")
}

/// Maps design-space `bounds` into a padded pixel canvas `opts.width_px` wide.
fn fit_view(bounds: Rect, opts: &SvgOptions) -> DiagramResult<(u32, u32, Affine)> {
    let inner_w = f64::from(opts.width_px) - 2.0 * opts.padding_px;
    if !inner_w.is_finite() || inner_w <= 0.0 {
        return Err(DiagramError::export("padding leaves no room to draw"));
    }
    let scale = inner_w / bounds.width().max(1e-9);
    let height = (bounds.height() * scale + 2.0 * opts.padding_px).ceil().max(1.0);

    // Avoid pathological allocations when the content is a near-vertical sliver.
    const MAX_DIM: f64 = 16_384.0;
    if height > MAX_DIM {
        return Err(DiagramError::export(format!(
            "svg height too large: {height} (max {MAX_DIM})"
        )));
    }

    let view = Affine::translate((
        opts.padding_px - bounds.min_x() * scale,
        opts.padding_px + bounds.max_y() * scale,
    )) * Affine::scale_non_uniform(scale, -scale);
    Ok((opts.width_px, height as u32, view))
}

fn hex([r, g, b]: [u8; 3]) -> String {
    format!("#{r:02x}{g:02x}{b:02x}")
}
