//! The barcode formats a loyalty card can be drawn with.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

/// A barcode format.
///
/// Each symbology is stored and exchanged by its lowercase tag, e.g. "ean13".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Symbology {
    /// Code 128, accepts any printable ASCII text.
    Code128,
    /// EAN-13, the common 13 digit retail barcode.
    Ean13,
    /// EAN-8, the short 8 digit retail barcode.
    Ean8,
    /// UPC-A, the 12 digit North American retail barcode.
    UpcA,
    /// Code 39, upper case letters, digits and a few symbols.
    Code39,
    /// Interleaved 2 of 5, an even number of digits.
    Itf,
}

impl Symbology {
    /// Every supported symbology.
    pub const ALL: [Symbology; 6] = [
        Symbology::Code128,
        Symbology::Ean13,
        Symbology::Ean8,
        Symbology::UpcA,
        Symbology::Code39,
        Symbology::Itf,
    ];

    /// The tag used to store the symbology, e.g. "code128".
    pub fn tag(self) -> &'static str {
        match self {
            Symbology::Code128 => "code128",
            Symbology::Ean13 => "ean13",
            Symbology::Ean8 => "ean8",
            Symbology::UpcA => "upca",
            Symbology::Code39 => "code39",
            Symbology::Itf => "itf",
        }
    }

    /// Look up a symbology by its tag, ignoring case and surrounding whitespace.
    ///
    /// Returns `None` for tags that are not supported.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let tag = tag.trim();

        Self::ALL
            .into_iter()
            .find(|symbology| symbology.tag().eq_ignore_ascii_case(tag))
    }

    /// Guess the symbology of a card number.
    ///
    /// All digit codes of 13, 8 or 12 digits are treated as EAN-13, EAN-8
    /// and UPC-A respectively, and any other even number of digits as ITF.
    /// Everything else is Code 128.
    pub fn detect(code: &str) -> Self {
        let code = normalize_code(code);

        if !is_all_digits(&code) {
            return Symbology::Code128;
        }

        match code.len() {
            13 => Symbology::Ean13,
            8 => Symbology::Ean8,
            12 => Symbology::UpcA,
            length if length % 2 == 0 => Symbology::Itf,
            _ => Symbology::Code128,
        }
    }

    /// Whether `code` has the shape this symbology expects.
    ///
    /// This only checks lengths and digits. A Code 39 code may still fail to
    /// encode if it contains characters outside the Code 39 alphabet.
    pub fn validate(self, code: &str) -> bool {
        let code = normalize_code(code);

        match self {
            Symbology::Ean13 => code.len() == 13 && is_all_digits(&code),
            Symbology::Ean8 => code.len() == 8 && is_all_digits(&code),
            Symbology::UpcA => code.len() == 12 && is_all_digits(&code),
            Symbology::Code39 => code.chars().count() <= 43,
            Symbology::Itf => code.len() % 2 == 0 && is_all_digits(&code),
            Symbology::Code128 => !code.is_empty(),
        }
    }
}

impl Display for Symbology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Symbology::Code128 => "Code 128",
            Symbology::Ean13 => "EAN-13",
            Symbology::Ean8 => "EAN-8",
            Symbology::UpcA => "UPC-A",
            Symbology::Code39 => "Code 39",
            Symbology::Itf => "ITF",
        };

        write!(f, "{name}")
    }
}

impl FromStr for Symbology {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tag(s).ok_or_else(|| Error::UnknownCode(s.to_owned()))
    }
}

/// Remove surrounding whitespace and any spaces inside a card number.
///
/// Card numbers are often printed in groups, e.g. "1234 5678", but the
/// spaces are not part of the code.
pub fn normalize_code(code: &str) -> String {
    code.trim().replace(' ', "")
}

/// Guess the symbology of a card number. See [Symbology::detect].
pub fn detect_type(code: &str) -> Symbology {
    Symbology::detect(code)
}

/// Whether `code` has the shape `symbology` expects. See [Symbology::validate].
pub fn validate_code(code: &str, symbology: Symbology) -> bool {
    symbology.validate(code)
}

/// Whether `code` is valid for the symbology with the tag `tag`.
///
/// Unknown tags are never valid.
pub fn validate_code_for_tag(code: &str, tag: &str) -> bool {
    Symbology::from_tag(tag).is_some_and(|symbology| symbology.validate(code))
}

pub(super) fn is_all_digits(code: &str) -> bool {
    !code.is_empty() && code.bytes().all(|byte| byte.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use crate::{
        Error,
        barcode::{Symbology, detect_type, normalize_code, validate_code, validate_code_for_tag},
    };

    #[test]
    fn detects_retail_formats_by_length() {
        assert_eq!(detect_type("1234567890123"), Symbology::Ean13);
        assert_eq!(detect_type("12345678"), Symbology::Ean8);
        assert_eq!(detect_type("123456789012"), Symbology::UpcA);
    }

    #[test]
    fn detects_itf_for_other_even_digit_counts() {
        assert_eq!(detect_type("1234"), Symbology::Itf);
        assert_eq!(detect_type("12345678901234"), Symbology::Itf);
    }

    #[test]
    fn detects_code128_for_everything_else() {
        assert_eq!(detect_type("ABC123"), Symbology::Code128);
        assert_eq!(detect_type("12345"), Symbology::Code128);
        assert_eq!(detect_type(""), Symbology::Code128);
        assert_eq!(detect_type("１２３４"), Symbology::Code128);
    }

    #[test]
    fn detect_ignores_spaces() {
        assert_eq!(detect_type(" 1234567890123 "), Symbology::Ean13);
        assert_eq!(detect_type("1234 5678 9012 3"), Symbology::Ean13);
    }

    #[test]
    fn normalize_strips_spaces() {
        assert_eq!(normalize_code("  12 34\t"), "1234");
    }

    #[test]
    fn validates_retail_formats() {
        assert!(validate_code("1234567890123", Symbology::Ean13));
        assert!(!validate_code("12345", Symbology::Ean13));
        assert!(!validate_code("123456789012A", Symbology::Ean13));
        assert!(validate_code("12345678", Symbology::Ean8));
        assert!(!validate_code("1234567", Symbology::Ean8));
        assert!(validate_code("123456789012", Symbology::UpcA));
        assert!(!validate_code("12345678901", Symbology::UpcA));
    }

    #[test]
    fn validates_itf() {
        assert!(validate_code("1234", Symbology::Itf));
        assert!(!validate_code("123", Symbology::Itf));
        assert!(!validate_code("12AB", Symbology::Itf));
    }

    #[test]
    fn validates_code39_length() {
        assert!(validate_code(&"A".repeat(43), Symbology::Code39));
        assert!(!validate_code(&"A".repeat(44), Symbology::Code39));
    }

    #[test]
    fn validates_code128() {
        assert!(validate_code("ABC123", Symbology::Code128));
        assert!(validate_code("1", Symbology::Code128));
        assert!(!validate_code("", Symbology::Code128));
        assert!(!validate_code("   ", Symbology::Code128));
    }

    #[test]
    fn unknown_tag_is_invalid() {
        assert!(!validate_code_for_tag("ABC123", "qrcode"));
        assert!(validate_code_for_tag("ABC123", "code128"));
        assert!(validate_code_for_tag("1234", "ITF"));
    }

    #[test]
    fn tags_round_trip() {
        for symbology in Symbology::ALL {
            assert_eq!(Symbology::from_tag(symbology.tag()), Some(symbology));
        }

        assert_eq!(Symbology::from_tag("pdf417"), None);
        assert_eq!(
            "pdf417".parse::<Symbology>(),
            Err(Error::UnknownCode("pdf417".to_owned()))
        );
    }
}
