//! UCS-2 user data conversion, including the UTF-16 surrogate-pair bridge
//! needed for code points beyond the BMP (emoji and friends).
//!
//! The wire format is a sequence of big-endian 16-bit units. A code point
//! above `0xFFFF` is carried as a surrogate pair, so the decoder has to hold
//! a pending high surrogate between units; that state lives in [`Ucs2Decoder`]
//! and is scoped to a single PDU decode.

use std::char;
use crate::errors::*;
use crate::gsm_encoding::NPC8;

/// Checks that a byte buffer is valid UTF-8 message text.
pub fn text_from_bytes(b: &[u8]) -> PduResult<&str> {
    std::str::from_utf8(b).map_err(|_| PduError::MalformedUtf8)
}

/// Splits a code point into one UCS-2 unit, or two for the astral planes.
pub fn code_point_to_ucs2(c: char) -> (u16, Option<u16>) {
    let cp = c as u32;
    if cp <= 0xFFFF {
        // char can never be a lone surrogate, so this unit is a BMP scalar
        (cp as u16, None)
    } else {
        let cp = cp - 0x1_0000;
        (0xD800 | (cp >> 10) as u16, Some(0xDC00 | (cp & 0x3FF) as u16))
    }
}

/// Encodes message text as big-endian UCS-2 units, returning the octet buffer.
pub fn encode_ucs2(text: &str) -> Vec<u8> {
    let mut ret = Vec::with_capacity(text.len() * 2);
    for c in text.chars() {
        let (first, second) = code_point_to_ucs2(c);
        ret.extend_from_slice(&first.to_be_bytes());
        if let Some(low) = second {
            ret.extend_from_slice(&low.to_be_bytes());
        }
    }
    ret
}

/// UCS-2 to text decoder.
///
/// Create one per PDU; feed it units with [`push`](Ucs2Decoder::push) and
/// call [`finish`](Ucs2Decoder::finish) when the user data runs out. Lone or
/// unpaired surrogates never fail the decode; they come out as [`NPC8`] with
/// a logged warning.
#[derive(Debug, Default)]
pub struct Ucs2Decoder {
    pending: Option<u16>,
}

impl Ucs2Decoder {
    pub fn new() -> Self {
        Ucs2Decoder { pending: None }
    }
    /// Feeds one 16-bit unit, appending any completed character to `out`.
    pub fn push(&mut self, unit: u16, out: &mut String) {
        match (self.pending.take(), unit) {
            (None, 0xD800..=0xDBFF) => {
                self.pending = Some(unit);
            }
            (None, 0xDC00..=0xDFFF) => {
                warn!("unpaired low surrogate {:#06x} in UCS-2 user data", unit);
                out.push(NPC8);
            }
            (None, _) => {
                out.push(char::from_u32(unit as u32).unwrap_or(NPC8));
            }
            (Some(high), 0xDC00..=0xDFFF) => {
                let cp = ((((high & 0x3FF) as u32) << 10) | (unit & 0x3FF) as u32) + 0x1_0000;
                out.push(char::from_u32(cp).unwrap_or(NPC8));
            }
            (Some(high), _) => {
                warn!("high surrogate {:#06x} not followed by a low surrogate", high);
                out.push(NPC8);
                self.push(unit, out);
            }
        }
    }
    /// Flushes a dangling high surrogate at end of user data.
    pub fn finish(&mut self, out: &mut String) {
        if let Some(high) = self.pending.take() {
            warn!("UCS-2 user data ended after high surrogate {:#06x}", high);
            out.push(NPC8);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn decode_units(units: &[u16]) -> String {
        let mut dec = Ucs2Decoder::new();
        let mut out = String::new();
        for &u in units {
            dec.push(u, &mut out);
        }
        dec.finish(&mut out);
        out
    }

    #[test]
    fn bmp_and_astral_split() {
        assert_eq!(code_point_to_ucs2('A'), (0x0041, None));
        assert_eq!(code_point_to_ucs2('¥'), (0x00A5, None));
        assert_eq!(code_point_to_ucs2('א'), (0x05D0, None));
        assert_eq!(code_point_to_ucs2('♠'), (0x2660, None));
        assert_eq!(code_point_to_ucs2('🂡'), (0xD83C, Some(0xDCA1)));
        assert_eq!(code_point_to_ucs2('😀'), (0xD83D, Some(0xDE00)));
    }
    #[test]
    fn encode_is_big_endian() {
        assert_eq!(encode_ucs2("0¥"), vec![0x00, 0x30, 0x00, 0xA5]);
        assert_eq!(encode_ucs2("🂡"), vec![0xD8, 0x3C, 0xDC, 0xA1]);
    }
    #[test]
    fn roundtrip() {
        let text = "hello0¥א♠🂡😀";
        let octets = encode_ucs2(text);
        assert_eq!(octets.len(), 26);
        let units: Vec<u16> = octets
            .chunks(2)
            .map(|p| u16::from_be_bytes([p[0], p[1]]))
            .collect();
        assert_eq!(decode_units(&units), text);
    }
    #[test]
    fn lone_low_surrogate() {
        assert_eq!(decode_units(&[0xDC00, 0x0041]), "?A");
    }
    #[test]
    fn high_surrogate_then_bmp() {
        assert_eq!(decode_units(&[0xD83D, 0x0041]), "?A");
    }
    #[test]
    fn high_surrogate_then_high_surrogate() {
        // first high is abandoned, second pairs normally
        assert_eq!(decode_units(&[0xD83D, 0xD83D, 0xDE00]), "?😀");
    }
    #[test]
    fn dangling_high_surrogate_at_end() {
        assert_eq!(decode_units(&[0x0041, 0xD83D]), "A?");
    }
    #[test]
    fn text_from_bytes_rejects_bad_utf8() {
        assert_eq!(text_from_bytes(b"ok").unwrap(), "ok");
        assert_eq!(text_from_bytes(&[0xE2, 0x82]), Err(PduError::MalformedUtf8));
    }
}
