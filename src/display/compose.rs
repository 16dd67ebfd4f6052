use font8x8::{BASIC_FONTS, UnicodeFonts};
use image::imageops::{self, FilterType};
use image::{RgbImage, Rgba, RgbaImage};

/// Columns in the live mosaic grid.
pub const MOSAIC_COLUMNS: u32 = 2;

/// Static second prompt line shown during metadata entry.
pub const CONFIRM_HINT: &str = "Press ENTER to confirm, BACKSPACE to delete";

const PROMPT_COLOR: Rgba<u8> = Rgba([0, 255, 0, 255]);
const GLYPH_CELL: i32 = 8;

/// Resizes each frame to one tile and lays them out row-major on a
/// two-column grid. Returns a fresh buffer; the inputs are untouched.
pub fn compose_mosaic(
    frames: &[&RgbImage],
    tile_width: u32,
    tile_height: u32,
) -> RgbaImage {
    let count = frames.len() as u32;
    let columns = MOSAIC_COLUMNS.min(count.max(1));
    let rows = count.div_ceil(columns).max(1);

    let mut canvas = RgbaImage::from_pixel(
        columns * tile_width,
        rows * tile_height,
        Rgba([0, 0, 0, 255]),
    );

    for (index, frame) in frames.iter().enumerate() {
        let tile =
            imageops::resize(*frame, tile_width, tile_height, FilterType::Triangle);
        let tile = image::DynamicImage::ImageRgb8(tile).into_rgba8();

        let x = (index as u32 % columns) * tile_width;
        let y = (index as u32 / columns) * tile_height;
        imageops::replace(&mut canvas, &tile, i64::from(x), i64::from(y));
    }

    canvas
}

/// Returns a copy of `base` with the entry prompt and the confirm hint
/// drawn over the top-left corner.
pub fn overlay_prompt(base: &RgbaImage, prompt: &str) -> RgbaImage {
    let mut out = base.clone();
    draw_text(&mut out, 10, 14, prompt, PROMPT_COLOR, 2);
    draw_text(&mut out, 10, 52, CONFIRM_HINT, PROMPT_COLOR, 1);
    out
}

/// Rasterizes `text` with the 8x8 bitmap font at an integer scale.
/// Pixels falling outside the buffer are clipped, not wrapped.
pub fn draw_text(
    image: &mut RgbaImage,
    x: i32,
    y: i32,
    text: &str,
    color: Rgba<u8>,
    scale: u32,
) {
    let scale = scale.max(1) as i32;
    let mut cursor_x = x;

    for ch in text.chars() {
        let Some(glyph) = BASIC_FONTS.get(ch).or_else(|| BASIC_FONTS.get('?'))
        else {
            cursor_x += GLYPH_CELL * scale;
            continue;
        };

        for (row, bits) in glyph.iter().enumerate() {
            for col in 0..GLYPH_CELL {
                if (*bits >> col) & 1 == 0 {
                    continue;
                }

                for sy in 0..scale {
                    for sx in 0..scale {
                        let px = cursor_x + col * scale + sx;
                        let py = y + row as i32 * scale + sy;

                        if px >= 0
                            && py >= 0
                            && (px as u32) < image.width()
                            && (py as u32) < image.height()
                        {
                            image.put_pixel(px as u32, py as u32, color);
                        }
                    }
                }
            }
        }

        cursor_x += GLYPH_CELL * scale;
    }
}

#[cfg(test)]
mod tests {
    use image::Rgb;

    use super::*;

    fn solid(value: u8) -> RgbImage {
        RgbImage::from_pixel(8, 8, Rgb([value, value, value]))
    }

    fn black() -> Rgba<u8> {
        Rgba([0, 0, 0, 255])
    }

    #[test]
    fn four_frames_fill_a_two_by_two_grid() {
        let frames = [solid(10), solid(60), solid(110), solid(160)];
        let refs: Vec<&RgbImage> = frames.iter().collect();

        let mosaic = compose_mosaic(&refs, 4, 4);

        assert_eq!(mosaic.dimensions(), (8, 8));
        assert_eq!(mosaic.get_pixel(1, 1), &Rgba([10, 10, 10, 255]));
        assert_eq!(mosaic.get_pixel(5, 1), &Rgba([60, 60, 60, 255]));
        assert_eq!(mosaic.get_pixel(1, 5), &Rgba([110, 110, 110, 255]));
        assert_eq!(mosaic.get_pixel(5, 5), &Rgba([160, 160, 160, 255]));
    }

    #[test]
    fn odd_frame_counts_leave_the_last_cell_black() {
        let frames = [solid(200), solid(200), solid(200)];
        let refs: Vec<&RgbImage> = frames.iter().collect();

        let mosaic = compose_mosaic(&refs, 4, 4);

        assert_eq!(mosaic.dimensions(), (8, 8));
        assert_eq!(mosaic.get_pixel(1, 5), &Rgba([200, 200, 200, 255]));
        assert_eq!(mosaic.get_pixel(5, 5), &black());
    }

    #[test]
    fn overlay_draws_on_a_copy_only() {
        let base = RgbaImage::from_pixel(200, 100, black());

        let overlaid = overlay_prompt(&base, "Enter force_z: 1.5");

        assert!(base.pixels().all(|pixel| *pixel == black()));
        assert!(overlaid.pixels().any(|pixel| *pixel == PROMPT_COLOR));
    }

    #[test]
    fn text_past_the_edge_is_clipped_without_panicking() {
        let mut image = RgbaImage::from_pixel(16, 16, black());

        draw_text(&mut image, 12, 12, "888", PROMPT_COLOR, 2);
        draw_text(&mut image, -4, -4, "8", PROMPT_COLOR, 1);

        assert!(image.pixels().any(|pixel| *pixel == PROMPT_COLOR));
    }
}
