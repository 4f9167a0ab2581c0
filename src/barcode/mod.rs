//! Barcode detection, validation and PNG rendering for loyalty cards.

mod encode;
mod render;
mod symbology;

pub use symbology::{Symbology, detect_type, normalize_code, validate_code, validate_code_for_tag};

use std::ops::RangeInclusive;

use crate::Error;

/// The resolution barcodes are rendered at unless the caller asks otherwise.
pub const DEFAULT_DPI: u32 = 300;

/// The supported barcode resolutions in dots per inch.
pub const DPI_RANGE: RangeInclusive<u32> = 1..=1200;

/// A rendered barcode.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedBarcode {
    /// The code that was drawn, with whitespace removed.
    pub code: String,
    /// The symbology the code was drawn with.
    pub symbology: Symbology,
    /// The PNG encoded image.
    pub png: Vec<u8>,
}

impl GeneratedBarcode {
    /// The file name to store the image under, e.g. "1234567890128.png".
    pub fn filename(&self) -> String {
        format!("{}.png", self.code)
    }
}

/// Draw `code` as a PNG barcode.
///
/// Whitespace around the code and spaces inside it are removed first. When
/// `symbology` is `None` it is detected from the code with [detect_type].
///
/// EAN-13, EAN-8 and UPC-A use the first 12, 7 and 11 digits of the code and
/// append a freshly computed check digit.
///
/// # Errors
///
/// Returns an:
/// - [Error::InvalidDpi] if `dpi` is outside [DPI_RANGE],
/// - [Error::BarcodeEncoding] if the code cannot be drawn with the symbology,
/// - [Error::ImageEncoding] if the PNG could not be written.
pub fn generate_barcode(
    code: &str,
    symbology: Option<Symbology>,
    dpi: u32,
) -> Result<GeneratedBarcode, Error> {
    if !DPI_RANGE.contains(&dpi) {
        tracing::warn!("Rejected barcode resolution of {dpi} dpi");
        return Err(Error::InvalidDpi(dpi));
    }

    let code = normalize_code(code);
    let symbology = symbology.unwrap_or_else(|| detect_type(&code));

    let png = encode::encode(&code, symbology)
        .and_then(|modules| render::render_png(&modules, dpi))
        .inspect_err(|error| tracing::error!("Error generating barcode for \"{code}\": {error}"))?;

    tracing::debug!(
        "Generated {symbology} barcode for \"{code}\" at {dpi} dpi ({} bytes)",
        png.len()
    );

    Ok(GeneratedBarcode {
        code,
        symbology,
        png,
    })
}

/// Draw `code` with the symbology named by `tag`.
///
/// A missing or blank tag detects the symbology from the code. A tag that
/// does not name a supported symbology falls back to Code 128.
///
/// # Errors
/// See [generate_barcode].
pub fn generate_barcode_for_tag(
    code: &str,
    tag: Option<&str>,
    dpi: u32,
) -> Result<GeneratedBarcode, Error> {
    let symbology = match tag.map(str::trim).filter(|tag| !tag.is_empty()) {
        None => None,
        Some(tag) => Some(Symbology::from_tag(tag).unwrap_or_else(|| {
            tracing::warn!("Unknown barcode type \"{tag}\", using Code 128");
            Symbology::Code128
        })),
    };

    generate_barcode(code, symbology, dpi)
}

#[cfg(test)]
mod tests {
    use crate::{
        Error,
        barcode::{
            DEFAULT_DPI, DPI_RANGE, Symbology, detect_type, generate_barcode,
            generate_barcode_for_tag,
        },
    };

    const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn generates_png_with_requested_symbology() {
        let barcode = generate_barcode("ABC123", Some(Symbology::Code128), DEFAULT_DPI)
            .expect("Could not generate barcode");

        assert_eq!(barcode.symbology, Symbology::Code128);
        assert!(barcode.png.starts_with(&PNG_SIGNATURE));
    }

    #[test]
    fn detects_symbology_when_none_given() {
        let barcode = generate_barcode("1234567890123", None, DEFAULT_DPI).unwrap();

        assert_eq!(barcode.symbology, Symbology::Ean13);
        assert!(!barcode.png.is_empty());
    }

    #[test]
    fn strips_spaces_from_code() {
        let barcode = generate_barcode(" 1234 5678 ", None, DEFAULT_DPI).unwrap();

        assert_eq!(barcode.code, "12345678");
        assert_eq!(barcode.symbology, Symbology::Ean8);
        assert_eq!(barcode.filename(), "12345678.png");
    }

    #[test]
    fn unknown_tag_falls_back_to_code128() {
        let barcode = generate_barcode_for_tag("ABC123", Some("invalid_type"), DEFAULT_DPI).unwrap();

        assert_eq!(barcode.symbology, Symbology::Code128);
    }

    #[test]
    fn known_and_missing_tags() {
        let ean = generate_barcode_for_tag("1234567890123", Some("ean13"), DEFAULT_DPI).unwrap();
        let detected = generate_barcode_for_tag("1234", Some("  "), DEFAULT_DPI).unwrap();

        assert_eq!(ean.symbology, Symbology::Ean13);
        assert_eq!(detected.symbology, Symbology::Itf);
    }

    #[test]
    fn encoding_failure_is_reported() {
        let result = generate_barcode("hello@world", Some(Symbology::Code39), DEFAULT_DPI);

        assert!(matches!(
            result,
            Err(Error::BarcodeEncoding {
                symbology: Symbology::Code39,
                ..
            })
        ));
    }

    #[test]
    fn higher_dpi_gives_larger_image() {
        let low = generate_barcode("ABC123", None, 96).unwrap();
        let high = generate_barcode("ABC123", None, 600).unwrap();

        let low = image::load_from_memory(&low.png).unwrap();
        let high = image::load_from_memory(&high.png).unwrap();

        assert!(high.width() > low.width());
        assert!(high.height() > low.height());
    }

    #[test]
    fn rejects_dpi_outside_supported_range() {
        for dpi in [0, 1201, 2_000_000_000, u32::MAX] {
            let result = generate_barcode("ABC123", Some(Symbology::Code128), dpi);

            assert_eq!(result, Err(Error::InvalidDpi(dpi)));
        }
    }

    #[test]
    fn renders_at_the_limits_of_the_dpi_range() {
        for dpi in [*DPI_RANGE.start(), *DPI_RANGE.end()] {
            let barcode = generate_barcode("1234", None, dpi).expect("Could not generate barcode");

            assert!(barcode.png.starts_with(&PNG_SIGNATURE));
        }
    }

    #[test]
    fn detected_symbology_is_used_for_each_code_shape() {
        for code in ["1234", "12345678", "123456789012", "ABC123", "12345"] {
            let barcode = generate_barcode(code, None, DEFAULT_DPI)
                .expect("Could not generate barcode");

            assert_eq!(barcode.symbology, detect_type(code));
            assert!(!barcode.png.is_empty());
        }
    }
}
