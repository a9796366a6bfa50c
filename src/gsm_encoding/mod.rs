//! The GSM 03.38 7-bit default alphabet: translating text to and from
//! septets, and packing septets into the octet stream carried on the wire.
//!
//! Everything here works on *unpacked* septets except [`pack_7bit`] and
//! [`unpack_7bit`] themselves; the `pdu` module wires the two halves
//! together when assembling or parsing user data.

use std::convert::TryFrom;
use crate::errors::*;
use crate::pdu::MessageEncoding;
use crate::ucs2::{encode_ucs2, Ucs2Decoder};

mod lookup_tables;
pub mod udh;

pub use self::lookup_tables::{ESCAPE, NPC7, NPC8};
use self::lookup_tables::*;
use self::udh::UserDataHeader;

/// Tries to encode one character, appending one septet (or an escape pair)
/// to `dest`. Returns `false` iff the character forces the UCS-2 alphabet.
///
/// Characters the alphabet only approximates (`á`, typographic quotes, …)
/// are substituted with their close match, as the lookup table prescribes.
pub fn try_gsm_encode_char(c: char, dest: &mut Vec<u8>) -> bool {
    let cp = c as u32;
    if cp < 256 {
        let entry = ASCII8_TO_GSM7[cp as usize];
        if entry == NPC7 && cp >= 0x80 {
            return false;
        }
        if entry >= ESCAPED {
            dest.push(ESCAPE);
            dest.push((entry - ESCAPED) as u8);
        } else {
            dest.push(entry.abs() as u8);
        }
        true
    } else {
        for &(septet, ch) in GSM7_EXTENSION.iter() {
            if ch == c {
                dest.push(ESCAPE);
                dest.push(septet);
                return true;
            }
        }
        false
    }
}

/// Tries to encode a string as unpacked septets, returning `None` iff any
/// character needs UCS-2. This is also the data-coding-scheme classifier:
/// it inspects decoded code points, not raw UTF-8 bytes.
pub fn try_gsm_encode_string(input: &str) -> Option<Vec<u8>> {
    let mut ret = Vec::with_capacity(input.len());
    for c in input.chars() {
        if !try_gsm_encode_char(c, &mut ret) {
            return None;
        }
    }
    Some(ret)
}

/// Decodes unpacked septets into text. Never fails: unmapped extension
/// septets and a dangling escape come out as [`NPC8`].
pub fn gsm_decode_septets(input: &[u8]) -> String {
    let mut ret = String::with_capacity(input.len());
    let mut iter = input.iter();
    while let Some(&s) = iter.next() {
        if s == ESCAPE {
            match iter.next() {
                Some(ext) => match GSM7_EXTENSION.iter().find(|&&(v, _)| v == *ext) {
                    Some(&(_, ch)) => ret.push(ch),
                    None => ret.push(NPC8),
                },
                None => ret.push(NPC8),
            }
        } else {
            ret.push(GSM7_TO_ASCII8[(s & 0x7F) as usize] as char);
        }
    }
    ret
}

/// Packs septets into octets, low bits first, after `fill_bits` zero bits of
/// leading fill. Output length is ⌈(fill + 7·n) / 8⌉ octets.
pub fn pack_7bit(septets: &[u8], fill_bits: usize) -> Vec<u8> {
    let total_bits = fill_bits + septets.len() * 7;
    let mut ret = vec![0u8; (total_bits + 7) / 8];
    let mut bit = fill_bits;
    for &s in septets {
        let s = (s & 0x7F) as u16;
        ret[bit / 8] |= (s << (bit % 8)) as u8;
        if bit % 8 > 1 {
            ret[bit / 8 + 1] |= (s >> (8 - bit % 8)) as u8;
        }
        bit += 7;
    }
    ret
}

/// Unpacks exactly `count` septets from an octet stream, skipping
/// `fill_bits` bits of leading fill. Stray high bits past the last septet
/// are ignored, and a short buffer just yields fewer septets.
pub fn unpack_7bit(octets: &[u8], count: usize, fill_bits: usize) -> Vec<u8> {
    let mut ret = Vec::with_capacity(count);
    let mut bit = fill_bits;
    for _ in 0..count {
        if bit / 8 >= octets.len() {
            break;
        }
        let mut s = (octets[bit / 8] >> (bit % 8)) as u16;
        if bit % 8 > 1 {
            if let Some(&next) = octets.get(bit / 8 + 1) {
                s |= (next as u16) << (8 - bit % 8);
            }
        }
        ret.push((s & 0x7F) as u8);
        bit += 7;
    }
    ret
}

/// The user-data portion of a message: alphabet, raw octets and the length
/// field that goes on the wire (septets for GSM-7, octets for UCS-2).
#[derive(Debug, Clone)]
pub struct GsmMessageData {
    pub(crate) encoding: MessageEncoding,
    pub(crate) udh: bool,
    pub(crate) bytes: Vec<u8>,
    pub(crate) user_data_len: u8,
}

/// A decoded text message, with the user data header if one was present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedMessage {
    pub text: String,
    pub udh: Option<UserDataHeader>,
}

impl GsmMessageData {
    pub fn encoding(&self) -> MessageEncoding {
        self.encoding
    }
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
    pub fn user_data_len(&self) -> u8 {
        self.user_data_len
    }
    /// Encodes message text into user data for a single SMS-SUBMIT.
    ///
    /// Picks GSM-7 whenever every code point maps into the default alphabet
    /// (directly or through the extension table), UCS-2 otherwise. Splitting
    /// an oversize message into concatenated parts is the caller's business;
    /// here it is just an error.
    pub fn encode_message(msg: &str) -> PduResult<GsmMessageData> {
        if let Some(septets) = try_gsm_encode_string(msg) {
            if septets.len() > 160 {
                return Err(PduError::Oversize("more than 160 septets of user data"));
            }
            let user_data_len = septets.len() as u8;
            Ok(GsmMessageData {
                encoding: MessageEncoding::Gsm7Bit,
                udh: false,
                bytes: pack_7bit(&septets, 0),
                user_data_len,
            })
        } else {
            let bytes = encode_ucs2(msg);
            if bytes.len() > 140 {
                return Err(PduError::Oversize("more than 140 octets of UCS-2 user data"));
            }
            let user_data_len = bytes.len() as u8;
            Ok(GsmMessageData {
                encoding: MessageEncoding::Ucs2,
                udh: false,
                bytes,
                user_data_len,
            })
        }
    }
    /// Decodes the user data into text, peeling off the user data header
    /// first when the PDU type octet announced one.
    pub fn decode_message(&self) -> PduResult<DecodedMessage> {
        let mut udh = None;
        let mut start = 0usize;
        let mut fill_bits = 0usize;
        let mut septet_count = self.user_data_len as usize;
        let mut octet_count = self.user_data_len as usize;
        if self.udh {
            let udhl = *self
                .bytes
                .get(0)
                .ok_or(PduError::Truncated("user data header length"))? as usize;
            start = udhl + 1;
            if self.bytes.len() < start {
                return Err(PduError::Truncated("user data header"));
            }
            udh = Some(UserDataHeader::try_from(&self.bytes[1..start])?);
            // the septet stream resumes at the next septet boundary past the
            // header, so the header costs ⌈octets·8 / 7⌉ septets of the
            // declared length
            let udh_bits = start * 8;
            let fill_septets = (udh_bits + 6) / 7;
            fill_bits = fill_septets * 7 - udh_bits;
            septet_count = septet_count.saturating_sub(fill_septets);
            octet_count = octet_count.saturating_sub(start);
        }
        match self.encoding {
            MessageEncoding::Gsm7Bit => {
                let septets = unpack_7bit(&self.bytes[start..], septet_count, fill_bits);
                Ok(DecodedMessage {
                    text: gsm_decode_septets(&septets),
                    udh,
                })
            }
            MessageEncoding::Ucs2 => {
                let data = self
                    .bytes
                    .get(start..start + octet_count)
                    .ok_or(PduError::Truncated("UCS-2 user data"))?;
                if data.len() % 2 != 0 {
                    return Err(PduError::Truncated("UCS-2 user data"));
                }
                let mut text = String::with_capacity(octet_count);
                let mut decoder = Ucs2Decoder::new();
                for pair in data.chunks(2) {
                    decoder.push(u16::from_be_bytes([pair[0], pair[1]]), &mut text);
                }
                decoder.finish(&mut text);
                Ok(DecodedMessage { text, udh })
            }
            MessageEncoding::EightBit => Err(PduError::UnsupportedAlphabet),
        }
    }
}
