//! Click-to-pixel mapping and marker drawing.
//!
//! The page reports clicks in display coordinates; the analysis needs the
//! marker at the original image's pixel coordinate, so the click is scaled
//! by the natural/displayed size ratio and a red ring is drawn onto a copy
//! of the image at that point.

use anyhow::Context;
use image::{ImageOutputFormat, Rgba, RgbaImage};

/// Scale a display coordinate to the image's natural pixel grid:
/// `(x·W/w, y·H/h)`, clamped to the image bounds.
pub fn display_to_natural(
    x: f64,
    y: f64,
    display_w: f64,
    display_h: f64,
    natural_w: u32,
    natural_h: u32,
) -> (u32, u32) {
    let nx = (x * natural_w as f64 / display_w).round();
    let ny = (y * natural_h as f64 / display_h).round();
    let clamp = |v: f64, max: u32| -> u32 {
        if v.is_finite() && v > 0.0 {
            (v as u32).min(max.saturating_sub(1))
        } else {
            0
        }
    };
    (clamp(nx, natural_w), clamp(ny, natural_h))
}

/// Decode the image, draw a ring marker at the clicked point and re-encode
/// as PNG. The marked copy is what gets sent for element analysis.
pub fn mark_click(
    bytes: &[u8],
    x: f64,
    y: f64,
    display_w: f64,
    display_h: f64,
) -> anyhow::Result<Vec<u8>> {
    anyhow::ensure!(
        display_w > 0.0 && display_h > 0.0,
        "displayed size must be positive"
    );
    let mut img = image::load_from_memory(bytes)
        .context("mood board image could not be decoded")?
        .to_rgba8();
    let (w, h) = img.dimensions();
    let (cx, cy) = display_to_natural(x, y, display_w, display_h, w, h);
    let radius = (w.min(h) / 40).max(8) as i64;
    draw_ring(&mut img, cx as i64, cy as i64, radius);

    let mut out = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut out), ImageOutputFormat::Png)
        .context("marked image could not be encoded")?;
    Ok(out)
}

/// Red ring with a white halo so the marker reads on any background.
fn draw_ring(img: &mut RgbaImage, cx: i64, cy: i64, radius: i64) {
    let red = Rgba([230u8, 28, 28, 255]);
    let white = Rgba([255u8, 255, 255, 255]);
    let (w, h) = (img.width() as i64, img.height() as i64);
    let reach = radius + 4;
    for dy in -reach..=reach {
        for dx in -reach..=reach {
            let (px, py) = (cx + dx, cy + dy);
            if px < 0 || py < 0 || px >= w || py >= h {
                continue;
            }
            let dist = ((dx * dx + dy * dy) as f64).sqrt() - radius as f64;
            if dist.abs() <= 1.5 {
                img.put_pixel(px as u32, py as u32, red);
            } else if dist > 1.5 && dist <= 3.5 {
                img.put_pixel(px as u32, py as u32, white);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray_png(w: u32, h: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(w, h, Rgba([120, 120, 120, 255]));
        let mut out = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut out), ImageOutputFormat::Png)
            .unwrap();
        out
    }

    #[test]
    fn display_coordinate_scales_by_natural_ratio() {
        // 400x300 display of an 800x600 image: everything doubles.
        assert_eq!(display_to_natural(200.0, 150.0, 400.0, 300.0, 800, 600), (400, 300));
        assert_eq!(display_to_natural(0.0, 0.0, 400.0, 300.0, 800, 600), (0, 0));
    }

    #[test]
    fn coordinates_clamp_to_image_bounds() {
        assert_eq!(display_to_natural(500.0, 400.0, 400.0, 300.0, 800, 600), (799, 599));
        assert_eq!(display_to_natural(-10.0, -10.0, 400.0, 300.0, 800, 600), (0, 0));
    }

    #[test]
    fn mark_click_draws_a_ring_at_the_mapped_point() {
        let src = gray_png(400, 400);
        // Click at display (50, 50) on a 200x200 render maps to (100, 100).
        let marked = mark_click(&src, 50.0, 50.0, 200.0, 200.0).unwrap();
        let img = image::load_from_memory(&marked).unwrap().to_rgba8();
        assert_eq!(img.dimensions(), (400, 400));
        // Radius for a 400px image is 10; the ring passes through (110, 100).
        assert_eq!(*img.get_pixel(110, 100), Rgba([230, 28, 28, 255]));
        // Center stays untouched.
        assert_eq!(*img.get_pixel(100, 100), Rgba([120, 120, 120, 255]));
    }

    #[test]
    fn mark_click_rejects_degenerate_display_size() {
        let src = gray_png(10, 10);
        assert!(mark_click(&src, 1.0, 1.0, 0.0, 0.0).is_err());
    }

    #[test]
    fn mark_click_rejects_garbage_bytes() {
        assert!(mark_click(b"not an image", 1.0, 1.0, 10.0, 10.0).is_err());
    }
}
