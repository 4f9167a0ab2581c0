//! Turns a code into the sequence of bar and space modules for each symbology.
//!
//! The output of every encoder is one `bool` per module, `true` for a bar,
//! without quiet zones.

use crate::Error;

use super::{Symbology, symbology::is_all_digits};

/// Encode an already normalized `code` as modules.
pub(super) fn encode(code: &str, symbology: Symbology) -> Result<Vec<bool>, Error> {
    let failure = |reason: String| Error::BarcodeEncoding { symbology, reason };

    match symbology {
        Symbology::Ean13 => Ok(encode_ean13(
            &complete_check_digit(code, 12).map_err(failure)?,
        )),
        Symbology::UpcA => {
            // UPC-A is EAN-13 with a leading zero.
            let upc = complete_check_digit(code, 11).map_err(failure)?;
            Ok(encode_ean13(&format!("0{upc}")))
        }
        Symbology::Ean8 => Ok(encode_ean8(&complete_check_digit(code, 7).map_err(failure)?)),
        Symbology::Itf => encode_itf(code).map_err(failure),
        Symbology::Code39 => encode_code39(code).map_err(failure),
        Symbology::Code128 => encode_code128(code).map_err(failure),
    }
}

// ============================================================================
// EAN / UPC
// ============================================================================

/// The odd parity ("L") patterns for the digits 0-9.
///
/// The even parity ("G") and right hand ("R") patterns are derived from these.
const EAN_L_CODES: [&str; 10] = [
    "0001101", "0011001", "0010011", "0111101", "0100011", "0110001", "0101111", "0111011",
    "0110111", "0001011",
];

/// The parity of digits 2-7 of an EAN-13, selected by the first digit.
const EAN13_PARITY: [&str; 10] = [
    "LLLLLL", "LLGLGG", "LLGGLG", "LLGGGL", "LGLLGG", "LGGLLG", "LGGGLL", "LGLGLG", "LGLGGL",
    "LGGLGL",
];

const EAN_GUARD: &str = "101";
const EAN_CENTER_GUARD: &str = "01010";

#[derive(Clone, Copy)]
enum EanSet {
    L,
    G,
    R,
}

/// Take the first `data_digits` digits of `code` and append their check digit.
fn complete_check_digit(code: &str, data_digits: usize) -> Result<String, String> {
    if !is_all_digits(code) {
        return Err(format!("\"{code}\" must contain only digits"));
    }

    if code.len() < data_digits {
        return Err(format!(
            "\"{code}\" must have at least {data_digits} digits"
        ));
    }

    let data = &code[..data_digits];

    Ok(format!("{data}{}", check_digit(data)))
}

/// The modulo 10 check digit shared by EAN-13, EAN-8 and UPC-A.
fn check_digit(data: &str) -> u32 {
    let sum: u32 = data
        .bytes()
        .rev()
        .enumerate()
        .map(|(index, byte)| {
            let digit = u32::from(byte - b'0');
            if index % 2 == 0 { digit * 3 } else { digit }
        })
        .sum();

    (10 - sum % 10) % 10
}

fn ean_digit(digit: u8, set: EanSet) -> Vec<bool> {
    let l_code = pattern_to_modules(EAN_L_CODES[usize::from(digit - b'0')]);

    match set {
        EanSet::L => l_code,
        EanSet::R => l_code.into_iter().map(|module| !module).collect(),
        EanSet::G => l_code.into_iter().rev().map(|module| !module).collect(),
    }
}

fn encode_ean13(digits: &str) -> Vec<bool> {
    let bytes = digits.as_bytes();
    let parity = EAN13_PARITY[usize::from(bytes[0] - b'0')];
    let mut modules = pattern_to_modules(EAN_GUARD);

    for (&digit, set) in bytes[1..7].iter().zip(parity.chars()) {
        let set = if set == 'L' { EanSet::L } else { EanSet::G };
        modules.extend(ean_digit(digit, set));
    }

    modules.extend(pattern_to_modules(EAN_CENTER_GUARD));

    for &digit in &bytes[7..13] {
        modules.extend(ean_digit(digit, EanSet::R));
    }

    modules.extend(pattern_to_modules(EAN_GUARD));

    modules
}

fn encode_ean8(digits: &str) -> Vec<bool> {
    let bytes = digits.as_bytes();
    let mut modules = pattern_to_modules(EAN_GUARD);

    for &digit in &bytes[..4] {
        modules.extend(ean_digit(digit, EanSet::L));
    }

    modules.extend(pattern_to_modules(EAN_CENTER_GUARD));

    for &digit in &bytes[4..8] {
        modules.extend(ean_digit(digit, EanSet::R));
    }

    modules.extend(pattern_to_modules(EAN_GUARD));

    modules
}

// ============================================================================
// ITF
// ============================================================================

/// Narrow (n) and wide (w) elements for the digits 0-9.
const ITF_PATTERNS: [&str; 10] = [
    "nnwwn", "wnnnw", "nwnnw", "wwnnn", "nnwnw", "wnwnn", "nwwnn", "nnnww", "wnnwn", "nwnwn",
];

const ITF_WIDE: u8 = 3;

fn encode_itf(code: &str) -> Result<Vec<bool>, String> {
    if !is_all_digits(code) {
        return Err(format!("\"{code}\" must contain only digits"));
    }

    // Digits are encoded in pairs.
    let code = if code.len() % 2 == 0 {
        code.to_owned()
    } else {
        format!("0{code}")
    };

    let mut modules = pattern_to_modules("1010");

    for pair in code.as_bytes().chunks(2) {
        let bars = ITF_PATTERNS[usize::from(pair[0] - b'0')];
        let spaces = ITF_PATTERNS[usize::from(pair[1] - b'0')];

        for (bar, space) in bars.chars().zip(spaces.chars()) {
            push_element(&mut modules, true, itf_width(bar));
            push_element(&mut modules, false, itf_width(space));
        }
    }

    push_element(&mut modules, true, ITF_WIDE);
    push_element(&mut modules, false, 1);
    push_element(&mut modules, true, 1);

    Ok(modules)
}

fn itf_width(element: char) -> u8 {
    if element == 'w' { ITF_WIDE } else { 1 }
}

// ============================================================================
// CODE 39
// ============================================================================

/// The characters Code 39 can encode, in check value order.
const CODE39_ALPHABET: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ-. $/+%";

/// The wide (1) and narrow (0) elements of each character in
/// [CODE39_ALPHABET], alternating bar and space and starting with a bar.
const CODE39_PATTERNS: [&str; 43] = [
    "000110100", "100100001", "001100001", "101100000", "000110001", "100110000", "001110000",
    "000100101", "100100100", "001100100", "100001001", "001001001", "101001000", "000011001",
    "100011000", "001011000", "000001101", "100001100", "001001100", "000011100", "100000011",
    "001000011", "101000010", "000010011", "100010010", "001010010", "000000111", "100000110",
    "001000110", "000010110", "110000001", "011000001", "111000000", "010010001", "110010000",
    "011010000", "010000101", "110000100", "011000100", "010101000", "010100010", "010001010",
    "000101010",
];

const CODE39_START_STOP: &str = "010010100";
const CODE39_WIDE: u8 = 3;

fn encode_code39(code: &str) -> Result<Vec<bool>, String> {
    let code = code.to_ascii_uppercase();
    let values = code
        .chars()
        .map(|character| {
            CODE39_ALPHABET
                .find(character)
                .ok_or_else(|| format!("the character '{character}' is not allowed"))
        })
        .collect::<Result<Vec<usize>, String>>()?;

    let check_value = values.iter().sum::<usize>() % CODE39_PATTERNS.len();

    let mut modules = Vec::new();
    push_code39_character(&mut modules, CODE39_START_STOP);

    for value in values.into_iter().chain([check_value]) {
        push_code39_character(&mut modules, CODE39_PATTERNS[value]);
    }

    push_code39_character(&mut modules, CODE39_START_STOP);
    // The inter-character gap after the stop character is not part of the symbol.
    modules.pop();

    Ok(modules)
}

fn push_code39_character(modules: &mut Vec<bool>, pattern: &str) {
    for (index, element) in pattern.chars().enumerate() {
        let width = if element == '1' { CODE39_WIDE } else { 1 };
        push_element(modules, index % 2 == 0, width);
    }

    push_element(modules, false, 1);
}

// ============================================================================
// CODE 128
// ============================================================================

/// Bar and space widths for each symbol value, starting with a bar.
const CODE128_WIDTHS: [&str; 107] = [
    "212222", "222122", "222221", "121223", "121322", "131222", "122213", "122312", "132212",
    "221213", "221312", "231212", "112232", "122132", "122231", "113222", "123122", "123221",
    "223211", "221132", "221231", "213212", "223112", "312131", "311222", "321122", "321221",
    "312212", "322112", "322211", "212123", "212321", "232121", "111323", "131123", "131321",
    "112313", "132113", "132311", "211313", "231113", "231311", "112133", "112331", "132131",
    "113123", "113321", "133121", "313121", "211331", "231131", "213113", "213311", "213131",
    "311123", "311321", "331121", "312113", "312311", "332111", "314111", "221411", "431111",
    "111224", "111422", "121124", "121421", "141122", "141221", "112214", "112412", "122114",
    "122411", "142112", "142211", "241211", "221114", "413111", "241112", "134111", "111242",
    "121142", "121241", "114212", "124112", "124211", "411212", "421112", "421211", "212141",
    "214121", "412121", "111143", "111341", "131141", "114113", "114311", "411113", "411311",
    "113141", "114131", "311141", "411131", "211412", "211214", "211232", "2331112",
];

const CODE128_START_B: usize = 104;
const CODE128_START_C: usize = 105;
const CODE128_STOP: usize = 106;

fn encode_code128(code: &str) -> Result<Vec<bool>, String> {
    if code.is_empty() {
        return Err("the code is empty".to_owned());
    }

    // Pairs of digits take a single symbol in code set C.
    let mut values = if is_all_digits(code) && code.len() % 2 == 0 {
        let mut values = vec![CODE128_START_C];
        values.extend(
            code.as_bytes()
                .chunks(2)
                .map(|pair| usize::from((pair[0] - b'0') * 10 + (pair[1] - b'0'))),
        );
        values
    } else {
        let mut values = vec![CODE128_START_B];
        for character in code.chars() {
            match character {
                ' '..='~' => values.push(character as usize - 32),
                _ => return Err(format!("the character '{character}' is not allowed")),
            }
        }
        values
    };

    let check_value = values
        .iter()
        .enumerate()
        .map(|(position, value)| position.max(1) * value)
        .sum::<usize>()
        % 103;

    values.push(check_value);
    values.push(CODE128_STOP);

    let mut modules = Vec::new();

    for value in values {
        for (index, width) in CODE128_WIDTHS[value].bytes().enumerate() {
            push_element(&mut modules, index % 2 == 0, width - b'0');
        }
    }

    Ok(modules)
}

// ============================================================================
// HELPERS
// ============================================================================

fn pattern_to_modules(pattern: &str) -> Vec<bool> {
    pattern.chars().map(|module| module == '1').collect()
}

fn push_element(modules: &mut Vec<bool>, is_bar: bool, width: u8) {
    modules.extend(std::iter::repeat_n(is_bar, usize::from(width)));
}
