use anyhow::{Context, Result};
use image::{ImageBuffer, Rgb, Rgba, RgbaImage};
use log::debug;
use resvg::{tiny_skia, usvg};

use crate::vector::{label_svg, LabelRun};
use crate::{IconStyle, LabelFont};

// --- gradient disc ---

fn lerp_channel(from: u8, to: u8, t: f32) -> u8 {
    // Truncates, does not round.
    (from as f32 + (to as f32 - from as f32) * t) as u8
}

fn ring_color(from: Rgb<u8>, to: Rgb<u8>, ring: u32, radius: u32) -> Rgba<u8> {
    let t = ring as f32 / radius as f32;
    Rgba([
        lerp_channel(from.0[0], to.0[0], t),
        lerp_channel(from.0[1], to.0[1], t),
        lerp_channel(from.0[2], to.0[2], t),
        255,
    ])
}

/// Paint concentric rings from `start` at the rim to `end` near the centre.
///
/// Equivalent to filling `radius` shrinking discs outside-in; each pixel keeps
/// the colour of the innermost disc that still covers it.
fn draw_gradient_disc(img: &mut RgbaImage, center: u32, radius: u32, start: Rgb<u8>, end: Rgb<u8>) {
    if radius == 0 {
        return;
    }

    let c = center as f32;
    let r = radius as f32;

    for (x, y, pixel) in img.enumerate_pixels_mut() {
        let dx = x as f32 - c;
        let dy = y as f32 - c;
        let d = (dx * dx + dy * dy).sqrt();
        if d > r {
            continue;
        }

        let ring = ((r - d).floor() as u32).min(radius - 1);
        *pixel = ring_color(start, end, ring, radius);
    }
}

// --- label ---

/// Source-over blend of a straight-alpha colour onto `dst`.
fn blend_over(dst: Rgba<u8>, src: [u8; 4]) -> Rgba<u8> {
    let sa = src[3] as f32 / 255.0;
    if sa <= 0.0 {
        return dst;
    }
    let da = dst.0[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);

    let channel = |s: u8, d: u8| -> u8 {
        let v = (s as f32 * sa + d as f32 * da * (1.0 - sa)) / out_a;
        v.round().clamp(0.0, 255.0) as u8
    };

    Rgba([
        channel(src[0], dst.0[0]),
        channel(src[1], dst.0[1]),
        channel(src[2], dst.0[2]),
        (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
    ])
}

/// Ink bounds of the label relative to its anchor: the left edge of the
/// ascender line, placed at the origin.
fn measure_label(
    opts: &usvg::Options<'_>,
    size: u32,
    family: &str,
    font_size: u32,
    text: &str,
) -> Result<Option<usvg::Rect>> {
    let run = LabelRun {
        text,
        x: 0.0,
        y: 0.0,
        color: Rgba([0, 0, 0, 255]),
    };
    let svg = label_svg(size, family, font_size, &[run])?;
    let tree = usvg::Tree::from_str(&svg, opts).context("Failed to lay out label text")?;

    if !tree.root().has_children() {
        return Ok(None);
    }
    let bbox = tree.root().abs_bounding_box();
    if bbox.width() <= 0.0 || bbox.height() <= 0.0 {
        return Ok(None);
    }
    Ok(Some(bbox))
}

/// Where the label anchor goes: ink width/height centred on the disc, pushed
/// down by `label_offset_ratio`. The ink itself then sits at the anchor plus
/// the measured bearing, so capitals start below the ascender line.
fn label_anchor(size: u32, style: &IconStyle, ink: &usvg::Rect) -> (i64, i64) {
    let center = (size / 2) as i64;
    let text_w = ink.width() as i64;
    let text_h = ink.height() as i64;
    let text_x = center - text_w / 2;
    let text_y = center - text_h / 2 + (size as f32 * style.label_offset_ratio) as i64;
    (text_x, text_y)
}

/// Draw the label on the disc, with an offset shadow underneath.
fn draw_label(img: &mut RgbaImage, size: u32, style: &IconStyle, font: &LabelFont) -> Result<()> {
    let Some(family) = font.family() else {
        return Ok(());
    };
    if style.label.trim().is_empty() {
        return Ok(());
    }

    let font_size = (size as f32 * style.font_ratio) as u32;
    if font_size == 0 {
        return Ok(());
    }

    let opts = font.options();
    let Some(ink) = measure_label(&opts, size, family, font_size, &style.label)? else {
        debug!("label {:?} produced no glyphs at {size}px", style.label);
        return Ok(());
    };

    let (text_x, text_y) = label_anchor(size, style, &ink);
    debug!(
        "label at {size}px: {}x{} ink, anchor ({text_x}, {text_y})",
        ink.width(),
        ink.height()
    );

    let x = text_x as f32;
    let y = text_y as f32;
    let off = style.shadow_offset as f32;

    let runs = [
        LabelRun {
            text: &style.label,
            x: x + off,
            y: y + off,
            color: style.shadow_color,
        },
        LabelRun {
            text: &style.label,
            x,
            y,
            color: style.label_color,
        },
    ];
    let svg = label_svg(size, family, font_size, &runs)?;
    let tree = usvg::Tree::from_str(&svg, &opts).context("Failed to lay out label text")?;

    let mut pixmap = tiny_skia::Pixmap::new(size, size).context("Failed to allocate label canvas")?;
    resvg::render(&tree, tiny_skia::Transform::identity(), &mut pixmap.as_mut());

    for (i, px) in pixmap.pixels().iter().enumerate() {
        if px.alpha() == 0 {
            continue;
        }
        let c = px.demultiply();
        let x = i as u32 % size;
        let y = i as u32 / size;
        let base = *img.get_pixel(x, y);
        img.put_pixel(x, y, blend_over(base, [c.red(), c.green(), c.blue(), c.alpha()]));
    }

    Ok(())
}

/// Raster app icon: transparent square, gradient disc and shadowed label.
pub fn render_icon(size: u32, style: &IconStyle, font: &LabelFont) -> Result<RgbaImage> {
    anyhow::ensure!(size > 0, "Icon size must be positive");

    let mut img: RgbaImage = ImageBuffer::from_pixel(size, size, Rgba([0, 0, 0, 0]));

    let center = size / 2;
    let radius = (size as f32 * style.circle_ratio) as u32;
    draw_gradient_disc(&mut img, center, radius, style.background_start, style.background_end);

    draw_label(&mut img, size, style, font)
        .with_context(|| format!("Failed to draw label on {size}px icon"))?;

    Ok(img)
}

/// Render the raster icon and return it as PNG bytes.
pub fn render_png(size: u32, style: &IconStyle, font: &LabelFont) -> Result<Vec<u8>> {
    let img = render_icon(size, style, font)?;

    let mut out: Vec<u8> = Vec::new();
    let dynimg = image::DynamicImage::ImageRgba8(img);
    dynimg
        .write_to(&mut std::io::Cursor::new(&mut out), image::ImageFormat::Png)
        .context("Failed to encode output PNG")?;

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_colors_run_from_start_to_end() {
        let style = IconStyle::default();
        let (from, to) = (style.background_start, style.background_end);

        assert_eq!(ring_color(from, to, 0, 10), Rgba([102, 126, 234, 255]));
        // 5/10 of the way: 102 + 16 * 0.5, 126 - 51 * 0.5 (truncated), 234 - 72 * 0.5
        assert_eq!(ring_color(from, to, 5, 10), Rgba([110, 100, 198, 255]));
        // The last ring never quite reaches the end colour.
        assert_ne!(ring_color(from, to, 9, 10), Rgba([118, 75, 162, 255]));
    }

    #[test]
    fn disc_leaves_corners_transparent() {
        let style = IconStyle::default();
        let img = render_icon(64, &style, &LabelFont::none()).unwrap();

        assert_eq!(img.dimensions(), (64, 64));
        assert_eq!(img.get_pixel(0, 0).0[3], 0);
        assert_eq!(img.get_pixel(63, 63).0[3], 0);

        // radius = 28, so the rim pixel straight above the centre is ring 0.
        assert_eq!(*img.get_pixel(32, 4), Rgba([102, 126, 234, 255]));
        // Just outside the rim.
        assert_eq!(img.get_pixel(32, 3).0[3], 0);
    }

    #[test]
    fn centre_is_innermost_ring() {
        let style = IconStyle::default();
        let img = render_icon(64, &style, &LabelFont::none()).unwrap();
        let expected = ring_color(style.background_start, style.background_end, 27, 28);
        assert_eq!(*img.get_pixel(32, 32), expected);
    }

    #[test]
    fn tiny_sizes_render() {
        let style = IconStyle::default();
        for size in [1, 2, 3] {
            let img = render_icon(size, &style, &LabelFont::none()).unwrap();
            assert_eq!(img.dimensions(), (size, size));
        }
        assert!(render_icon(0, &style, &LabelFont::none()).is_err());
    }

    #[test]
    fn blend_over_transparent_keeps_source() {
        let out = blend_over(Rgba([0, 0, 0, 0]), [10, 20, 30, 255]);
        assert_eq!(out, Rgba([10, 20, 30, 255]));

        let out = blend_over(Rgba([200, 200, 200, 255]), [0, 0, 0, 0]);
        assert_eq!(out, Rgba([200, 200, 200, 255]));

        let out = blend_over(Rgba([255, 255, 255, 255]), [0, 0, 0, 100]);
        assert_eq!(out.0[3], 255);
        assert!(out.0[0] < 255 && out.0[0] > 100);
    }

    #[test]
    fn png_bytes_decode_back() {
        let style = IconStyle::default();
        let font = LabelFont::resolve(&style.font_candidates);
        let png = render_png(128, &style, &font).unwrap();

        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
        let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (128, 128));
        assert_eq!(decoded.get_pixel(0, 0).0[3], 0);
        // Rim above the centre sits well clear of the label.
        assert_eq!(*decoded.get_pixel(64, 8), Rgba([102, 126, 234, 255]));
    }

    fn near_white(p: &Rgba<u8>) -> bool {
        p.0[..3].iter().all(|&c| c >= 240) && p.0[3] == 255
    }

    /// Installed sans font, or `None` to skip on machines without fonts.
    fn system_font() -> Option<LabelFont> {
        let font = LabelFont::resolve(&[]);
        font.family().is_some().then_some(font)
    }

    #[test]
    fn label_is_drawn_centred_with_shadow() {
        let Some(font) = system_font() else {
            eprintln!("skipping: no system font available");
            return;
        };
        let style = IconStyle::default();
        let size = 256;
        let img = render_icon(size, &style, &font).unwrap();
        let bare = render_icon(size, &style, &LabelFont::none()).unwrap();

        let center = (size / 2) as f32;
        let radius = size as f32 * style.circle_ratio;
        let label: Vec<(u32, u32)> = img
            .enumerate_pixels()
            .filter(|(_, _, p)| near_white(p))
            .map(|(x, y, _)| (x, y))
            .collect();
        assert!(!label.is_empty(), "no label pixels drawn");

        for &(x, y) in &label {
            let (dx, dy) = (x as f32 - center, y as f32 - center);
            assert!((dx * dx + dy * dy).sqrt() <= radius, "label pixel ({x}, {y}) off the disc");
        }

        // Ink is centred on the disc, then carried right by the left bearing.
        let font_size = (size as f32 * style.font_ratio) as u32;
        let family = font.family().unwrap().to_string();
        let ink = measure_label(&font.options(), size, &family, font_size, &style.label)
            .unwrap()
            .expect("label glyphs");
        let (text_x, _) = label_anchor(size, &style, &ink);
        let expected = text_x as f32 + ink.x() + ink.width() / 2.0;
        assert!((expected - center).abs() <= ink.x().abs() + 1.5);

        let min_x = label.iter().map(|p| p.0).min().unwrap();
        let max_x = label.iter().map(|p| p.0).max().unwrap();
        let mid = (min_x + max_x) as f32 / 2.0;
        assert!((mid - expected).abs() <= 3.0, "label centred at {mid}, expected {expected}");

        // The shadow is the label shifted by +offset, painted over the disc.
        let off = style.shadow_offset;
        let darker = label.iter().any(|&(x, y)| {
            let (sx, sy) = (x + off, y + off);
            let shaded = img.get_pixel(sx, sy);
            let ring = bare.get_pixel(sx, sy);
            !near_white(shaded)
                && shaded.0[..3].iter().zip(&ring.0[..3]).all(|(s, r)| s < r)
        });
        assert!(darker, "no shadow pixel darker than the ring beneath it");
    }

    #[test]
    fn label_ink_sits_below_its_anchor_by_the_measured_bearing() {
        let Some(font) = system_font() else {
            eprintln!("skipping: no system font available");
            return;
        };
        let style = IconStyle::default();
        let size = 256;
        let font_size = (size as f32 * style.font_ratio) as u32;
        let family = font.family().unwrap().to_string();
        let ink = measure_label(&font.options(), size, &family, font_size, &style.label)
            .unwrap()
            .expect("label glyphs");
        let (_, text_y) = label_anchor(size, &style, &ink);

        let img = render_icon(size, &style, &font).unwrap();
        let top = img
            .enumerate_pixels()
            .filter(|(_, _, p)| near_white(p))
            .map(|(_, y, _)| y as f32)
            .fold(f32::MAX, f32::min);

        let expected = text_y as f32 + ink.y();
        assert!(
            (top - expected).abs() <= 2.0,
            "label ink top at {top}, expected {expected}"
        );
    }
}
