//! Draws encoded barcode modules into a PNG image.

use std::io::Cursor;

use image::{DynamicImage, GrayImage, ImageFormat, Luma, Rgb, RgbImage, imageops};

use crate::Error;

/// The width of a single module in millimetres.
const MODULE_WIDTH_MM: f64 = 0.3;
/// The height of the bars in millimetres.
const MODULE_HEIGHT_MM: f64 = 15.0;
/// The blank space to the left and right of the bars in millimetres.
const QUIET_ZONE_MM: f64 = 6.5;
/// The white border added around the finished image, in pixels.
const BORDER_PX: u32 = 20;

const WHITE: u8 = 255;
const BLACK: u8 = 0;

/// Render `modules` at `dpi` and encode the result as PNG.
pub(super) fn render_png(modules: &[bool], dpi: u32) -> Result<Vec<u8>, Error> {
    let bars = draw_bars(modules, dpi)?;
    let image = add_border(DynamicImage::ImageLuma8(bars).to_rgb8())?;

    let mut png = Vec::new();
    DynamicImage::ImageRgb8(image)
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|error| Error::ImageEncoding(error.to_string()))?;

    Ok(png)
}

fn mm_to_px(mm: f64, dpi: u32) -> u32 {
    ((mm * f64::from(dpi) / 25.4).round() as u32).max(1)
}

fn too_large() -> Error {
    Error::ImageEncoding("barcode image dimensions overflow".to_owned())
}

fn draw_bars(modules: &[bool], dpi: u32) -> Result<GrayImage, Error> {
    let module_width = mm_to_px(MODULE_WIDTH_MM, dpi);
    let height = mm_to_px(MODULE_HEIGHT_MM, dpi);
    let quiet_zone = mm_to_px(QUIET_ZONE_MM, dpi);
    let module_count = u32::try_from(modules.len()).map_err(|_| too_large())?;
    let width = module_width
        .checked_mul(module_count)
        .and_then(|bars| quiet_zone.checked_mul(2)?.checked_add(bars))
        .ok_or_else(too_large)?;

    let mut image = GrayImage::from_pixel(width, height, Luma([WHITE]));

    for (index, _) in (0..module_count).zip(modules).filter(|(_, is_bar)| **is_bar) {
        // Cannot overflow: `index * module_width` is below `width`.
        let left = quiet_zone + index * module_width;

        for x in left..left + module_width {
            for y in 0..height {
                image.put_pixel(x, y, Luma([BLACK]));
            }
        }
    }

    Ok(image)
}

fn add_border(image: RgbImage) -> Result<RgbImage, Error> {
    let grow = |length: u32| length.checked_add(2 * BORDER_PX).ok_or_else(too_large);

    let mut bordered = RgbImage::from_pixel(
        grow(image.width())?,
        grow(image.height())?,
        Rgb([WHITE, WHITE, WHITE]),
    );
    imageops::overlay(&mut bordered, &image, i64::from(BORDER_PX), i64::from(BORDER_PX));

    Ok(bordered)
}
