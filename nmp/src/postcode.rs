//! Postcode normalization and packed-code conversion.
//!
//! # Normalized Layout
//!
//! Input postcodes are 2–7 characters from `[0-9A-Za-z ]`. They are laid out
//! as a 4-character outward part (left-justified, space padded) optionally
//! followed by the 3-character inward part:
//!
//! | Input | Normalized |
//! |-------|------------|
//! | `M1` | `"M1  "` |
//! | `B11AA` | `"B1  1AA"` |
//! | `SW1A1AA` | `"SW1A1AA"` |
//!
//! # Packed Codes
//!
//! The first two characters select a lookup-table bucket and are not part of
//! the code. The remaining characters are packed into a 24-bit integer:
//!
//! - 4 characters (outward only): `37 * s(c3) + s(c4)`
//! - 7 characters: `6760*37 * s(c3) + 6760 * s(c4) + 676 * d(c5) + 26 * l(c6) + l(c7)`
//!
//! where `s` maps space to 32, digits to 0–9 and letters to 0–25, `d` accepts
//! digits only and `l` accepts uppercase letters only. Because `s` maps digits
//! and letters onto the same range, codes are not unique across character
//! classes: `SW1A` and `SW10` share a code. [`unpack`] returns every spelling.

use std::fmt;
use std::str::FromStr;

use crate::error::{PackError, Result};

/// Length of the outward part once padded.
pub const OUTWARD_LEN: usize = 4;

/// Length of the inward part.
pub const INWARD_LEN: usize = 3;

/// Shortest accepted raw postcode.
pub const MIN_INPUT_LEN: usize = 2;

/// Longest accepted raw postcode.
pub const MAX_INPUT_LEN: usize = OUTWARD_LEN + INWARD_LEN;

/// `enc_space` codomain width: 26 letters or 10 digits, plus the space sentinel.
const SPACE_RADIX: u32 = 37;
const SPACE_VALUE: u32 = b' ' as u32;

const W_LETTER: u32 = 26;
const W_DIGIT_LETTER_LETTER: u32 = 10 * 26 * 26; // 6760
const W_C3: u32 = W_DIGIT_LETTER_LETTER * SPACE_RADIX; // 250120

/// A postcode in the fixed 4+3 layout, ready to be packed or displayed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedPostcode(String);

impl NormalizedPostcode {
    /// The normalized text (4 or 7 ASCII characters).
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `true` when there is no inward part.
    pub fn is_outward_only(&self) -> bool {
        self.0.len() == OUTWARD_LEN
    }

    /// The outward code without padding.
    pub fn outward(&self) -> &str {
        self.0[..OUTWARD_LEN].trim_end()
    }

    /// The inward code, if present.
    pub fn inward(&self) -> Option<&str> {
        self.0.get(OUTWARD_LEN..).filter(|s| !s.is_empty())
    }

    /// The two characters selecting the lookup-table bucket.
    pub fn prefix(&self) -> [u8; 2] {
        let b = self.0.as_bytes();
        [b[0], b[1]]
    }

    /// Human-friendly form with a single space, e.g. `"B1 1AA"`.
    pub fn display_form(&self) -> String {
        match self.inward() {
            Some(inward) => format!("{} {}", self.outward(), inward),
            None => self.outward().to_string(),
        }
    }

    /// Pack this postcode into its numeric code. See [`pack`].
    pub fn code(&self) -> Result<u32> {
        pack(self)
    }
}

impl fmt::Display for NormalizedPostcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for NormalizedPostcode {
    type Err = PackError;

    fn from_str(s: &str) -> Result<Self> {
        normalize(s)
    }
}

impl AsRef<str> for NormalizedPostcode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Validate a raw postcode and lay it out as outward (4) + inward (3).
///
/// No case folding is done: lowercase letters pass validation here but are
/// rejected by [`pack`].
///
/// # Errors
///
/// Returns [`PackError::Format`] unless the input is 2–7 characters from
/// `[0-9A-Za-z ]`.
///
/// # Examples
///
/// ```
/// use nmp::postcode::normalize;
///
/// assert_eq!(normalize("B11AA").unwrap().as_str(), "B1  1AA");
/// assert_eq!(normalize("M1").unwrap().as_str(), "M1  ");
/// assert!(normalize("SW1A 1AA").is_err()); // 8 characters
/// ```
pub fn normalize(input: &str) -> Result<NormalizedPostcode> {
    if input.is_empty()
        || !input
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b' ')
    {
        return Err(PackError::format(input, "expected characters 0-9, A-Z or space"));
    }

    let len = input.len();
    if !(MIN_INPUT_LEN..=MAX_INPUT_LEN).contains(&len) {
        return Err(PackError::format(input, "expected 2 to 7 characters"));
    }

    if len <= OUTWARD_LEN {
        return Ok(NormalizedPostcode(format!("{:<4}", input)));
    }

    let (outward, inward) = input.split_at(len - INWARD_LEN);
    Ok(NormalizedPostcode(format!("{:<4}{}", outward, inward)))
}

fn enc_az(c: u8) -> Option<u32> {
    c.is_ascii_uppercase().then(|| (c - b'A') as u32)
}

fn enc_09(c: u8) -> Option<u32> {
    c.is_ascii_digit().then(|| (c - b'0') as u32)
}

fn enc_space(c: u8) -> Option<u32> {
    if c == b' ' {
        Some(SPACE_VALUE)
    } else {
        enc_az(c).or_else(|| enc_09(c))
    }
}

/// Pack a normalized postcode into its numeric code.
///
/// # Errors
///
/// Returns [`PackError::Format`] when a character does not fit the class
/// required at its position (lowercase letters included).
///
/// # Examples
///
/// ```
/// use nmp::postcode::{normalize, pack};
///
/// assert_eq!(pack(&normalize("SW1A1AA").unwrap()).unwrap(), 250_796);
/// assert_eq!(pack(&normalize("M1").unwrap()).unwrap(), 37 * 32 + 32);
/// ```
pub fn pack(postcode: &NormalizedPostcode) -> Result<u32> {
    let b = postcode.as_str().as_bytes();
    let at = |i: usize, enc: fn(u8) -> Option<u32>, reason: &'static str| {
        enc(b[i]).ok_or_else(|| PackError::format(postcode.as_str(), reason))
    };

    match b.len() {
        OUTWARD_LEN => {
            let c = at(2, enc_space, "3rd character must be 0-9, A-Z or space")?;
            let d = at(3, enc_space, "4th character must be 0-9, A-Z or space")?;
            Ok(SPACE_RADIX * c + d)
        }
        MAX_INPUT_LEN => {
            let c = at(2, enc_space, "3rd character must be 0-9, A-Z or space")?;
            let d = at(3, enc_space, "4th character must be 0-9, A-Z or space")?;
            let e = at(4, enc_09, "inward code must start with a digit")?;
            let f = at(5, enc_az, "inward code must end with two letters")?;
            let g = at(6, enc_az, "inward code must end with two letters")?;
            Ok(W_C3 * c + W_DIGIT_LETTER_LETTER * d + W_LETTER * W_LETTER * e + W_LETTER * f + g)
        }
        _ => Err(PackError::format(
            postcode.as_str(),
            "normalized postcode must be 4 or 7 characters",
        )),
    }
}

/// Every character `enc_space` maps to `value`.
fn space_candidates(value: u32) -> Vec<u8> {
    match value {
        SPACE_VALUE => vec![b' '],
        0..=9 => vec![b'A' + value as u8, b'0' + value as u8],
        10..=25 => vec![b'A' + value as u8],
        _ => Vec::new(),
    }
}

/// Recover the postcodes in bucket `prefix` that pack to `code`.
///
/// Letters `A`–`J` and digits `0`–`9` share packed values in the 3rd and 4th
/// positions, so up to four spellings may be returned. An empty result means
/// `code` is not a valid packed value.
///
/// # Examples
///
/// ```
/// use nmp::postcode::unpack;
///
/// let spellings: Vec<String> = unpack(*b"M1", 37 * 32 + 32, true)
///     .iter()
///     .map(|p| p.to_string())
///     .collect();
/// assert_eq!(spellings, vec!["M1  "]);
/// ```
pub fn unpack(prefix: [u8; 2], code: u32, outward_only: bool) -> Vec<NormalizedPostcode> {
    let (c, d, tail) = if outward_only {
        if code >= SPACE_RADIX * SPACE_RADIX {
            return Vec::new();
        }
        (code / SPACE_RADIX, code % SPACE_RADIX, Vec::new())
    } else {
        let c = code / W_C3;
        let d = (code / W_DIGIT_LETTER_LETTER) % SPACE_RADIX;
        let e = (code / (W_LETTER * W_LETTER)) % 10;
        let f = (code / W_LETTER) % W_LETTER;
        let g = code % W_LETTER;
        (c, d, vec![b'0' + e as u8, b'A' + f as u8, b'A' + g as u8])
    };

    let mut out = Vec::new();
    for c3 in space_candidates(c) {
        for c4 in space_candidates(d) {
            let mut bytes = vec![prefix[0], prefix[1], c3, c4];
            bytes.extend_from_slice(&tail);
            if let Ok(text) = String::from_utf8(bytes) {
                out.push(NormalizedPostcode(text));
            }
        }
    }
    out
}
