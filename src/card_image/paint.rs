//! Rasterizes a [`CardLayout`] with tiny-skia.

use tiny_skia::{
    ColorU8, FillRule, FilterQuality, Paint, Path, PathBuilder, Pattern, Pixmap, SpreadMode,
    Transform,
};

use crate::card_image::RenderError;
use crate::card_image::icon::{IconBitmap, cover_crop};
use crate::card_image::layout::{CardLayout, Element, Rect, Rgb};
use crate::card_image::text::{self, Font, Glyph};

pub(crate) fn paint(layout: &CardLayout, icon: Option<&IconBitmap>) -> Result<Pixmap, RenderError> {
    let mut pixmap = Pixmap::new(layout.width, layout.height)
        .ok_or(RenderError::Canvas(layout.width, layout.height))?;
    let icon = icon.map(icon_pixmap).transpose()?;

    for element in &layout.elements {
        match element {
            Element::Fill { rect, color } => fill_rect(&mut pixmap, *rect, *color),
            Element::RoundRect {
                rect,
                radius,
                color,
            } => {
                if let Some(path) = rounded_rect(*rect, *radius) {
                    pixmap.fill_path(
                        &path,
                        &solid(*color, true),
                        FillRule::Winding,
                        Transform::identity(),
                        None,
                    );
                }
            }
            Element::Text {
                x,
                y,
                text,
                font,
                color,
            } => draw_text(&mut pixmap, *x, *y, text, *font, *color),
            Element::Icon { slot, radius } => {
                if let Some(icon) = &icon {
                    draw_icon(&mut pixmap, icon, *slot, *radius);
                }
            }
        }
    }
    Ok(pixmap)
}

fn solid(color: Rgb, anti_alias: bool) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.0, color.1, color.2, 255);
    paint.anti_alias = anti_alias;
    paint
}

fn fill_rect(pixmap: &mut Pixmap, rect: Rect, color: Rgb) {
    if let Some(r) = tiny_skia::Rect::from_xywh(rect.x, rect.y, rect.w, rect.h) {
        pixmap.fill_rect(r, &solid(color, false), Transform::identity(), None);
    }
}

fn rounded_rect(rect: Rect, radius: f32) -> Option<Path> {
    let Rect { x, y, w, h } = rect;
    let r = radius.min(w / 2.0).min(h / 2.0).max(0.0);
    let mut pb = PathBuilder::new();
    pb.move_to(x + r, y);
    pb.line_to(x + w - r, y);
    pb.quad_to(x + w, y, x + w, y + r);
    pb.line_to(x + w, y + h - r);
    pb.quad_to(x + w, y + h, x + w - r, y + h);
    pb.line_to(x + r, y + h);
    pb.quad_to(x, y + h, x, y + h - r);
    pb.line_to(x, y + r);
    pb.quad_to(x, y, x + r, y);
    pb.close();
    pb.finish()
}

fn icon_pixmap(icon: &IconBitmap) -> Result<Pixmap, RenderError> {
    let mut pixmap = Pixmap::new(icon.width(), icon.height())
        .ok_or(RenderError::Canvas(icon.width(), icon.height()))?;
    for (dst, src) in pixmap
        .pixels_mut()
        .iter_mut()
        .zip(icon.rgba().chunks_exact(4))
    {
        *dst = ColorU8::from_rgba(src[0], src[1], src[2], src[3]).premultiply();
    }
    Ok(pixmap)
}

/// Cover-fit `icon` into `slot`, clipped by a rounded rectangle.
fn draw_icon(pixmap: &mut Pixmap, icon: &Pixmap, slot: Rect, radius: f32) {
    let Some(path) = rounded_rect(slot, radius) else {
        return;
    };
    let crop = cover_crop(icon.width(), icon.height(), slot.w, slot.h);
    // Maps the crop origin onto the slot origin.
    let transform = Transform::from_row(
        crop.scale,
        0.0,
        0.0,
        crop.scale,
        slot.x - crop.sx * crop.scale,
        slot.y - crop.sy * crop.scale,
    );
    let mut paint = Paint::default();
    paint.anti_alias = true;
    paint.shader = Pattern::new(
        icon.as_ref(),
        SpreadMode::Pad,
        FilterQuality::Bilinear,
        1.0,
        transform,
    );
    pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
}

fn draw_text(pixmap: &mut Pixmap, x: f32, y: f32, content: &str, font: Font, color: Rgb) {
    let paint = solid(color, false);
    let cell = font.cell();
    let top = y + cell;
    let mut pen = x;

    for ch in content.chars() {
        let advance = text::char_advance(ch, font);
        // Wide glyphs are centred in their ten-cell advance.
        let left = if text::is_wide(ch) { pen + cell } else { pen };
        match text::glyph(ch) {
            Glyph::Blank => {}
            Glyph::Bitmap(rows) => {
                for (row, bits) in rows.iter().enumerate() {
                    for col in 0..8 {
                        if bits >> col & 1 == 0 {
                            continue;
                        }
                        let px = left + col as f32 * cell;
                        let py = top + row as f32 * cell;
                        fill_cell(pixmap, &paint, px, py, cell);
                        if font.bold {
                            fill_cell(pixmap, &paint, px + 1.0, py, cell);
                        }
                    }
                }
            }
            Glyph::Fine(rows) => {
                let fine = cell / 2.0;
                for (row, bits) in rows.iter().enumerate() {
                    for col in 0..16 {
                        if bits >> col & 1 == 0 {
                            continue;
                        }
                        let px = left + col as f32 * fine;
                        let py = top + row as f32 * fine;
                        fill_cell(pixmap, &paint, px, py, fine);
                        if font.bold {
                            fill_cell(pixmap, &paint, px + 1.0, py, fine);
                        }
                    }
                }
            }
            Glyph::Missing => {
                let w = advance - cell * 2.0;
                let h = cell * 8.0;
                let t = cell.max(1.0);
                let bx = pen + cell;
                fill_cell_rect(pixmap, &paint, bx, top, w, t);
                fill_cell_rect(pixmap, &paint, bx, top + h - t, w, t);
                fill_cell_rect(pixmap, &paint, bx, top, t, h);
                fill_cell_rect(pixmap, &paint, bx + w - t, top, t, h);
            }
        }
        pen += advance;
    }
}

fn fill_cell(pixmap: &mut Pixmap, paint: &Paint, x: f32, y: f32, side: f32) {
    fill_cell_rect(pixmap, paint, x, y, side, side);
}

fn fill_cell_rect(pixmap: &mut Pixmap, paint: &Paint, x: f32, y: f32, w: f32, h: f32) {
    if let Some(r) = tiny_skia::Rect::from_xywh(x, y, w, h) {
        pixmap.fill_rect(r, paint, Transform::identity(), None);
    }
}
