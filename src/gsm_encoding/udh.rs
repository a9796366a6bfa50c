//! User Data Header parsing: the tag-length-value block that can prefix the
//! user data, mostly interesting for the concatenated-SMS descriptor.
//!
//! This codec never emits a UDH; multi-part sending is the caller's
//! responsibility. On decode every information element is surfaced, and the
//! two concatenation IEIs get a typed view.

use std::convert::TryFrom;
use crate::errors::*;

/// 8-bit-reference concatenation (GSM 03.40 9.2.3.24.1).
pub const IEI_CONCAT_8: u8 = 0x00;
/// 16-bit-reference concatenation (GSM 03.40 9.2.3.24.8).
pub const IEI_CONCAT_16: u8 = 0x08;

/// One information element: identifier plus raw data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InformationElement {
    pub id: u8,
    pub data: Vec<u8>,
}

/// A parsed User Data Header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserDataHeader {
    pub elements: Vec<InformationElement>,
}

/// Concatenation descriptor: which multi-part message this PDU belongs to,
/// and where in it.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ConcatenatedSmsData {
    /// Reference shared by every part of the message.
    pub reference: u16,
    /// Total number of parts.
    pub parts: u8,
    /// Which part this is, starting from 1.
    pub sequence: u8,
}

impl UserDataHeader {
    /// Returns the concatenation descriptor, if this header carries one.
    pub fn concatenation(&self) -> Option<ConcatenatedSmsData> {
        for el in self.elements.iter() {
            match (el.id, el.data.as_slice()) {
                (IEI_CONCAT_8, &[reference, parts, sequence]) => {
                    return Some(ConcatenatedSmsData {
                        reference: reference as u16,
                        parts,
                        sequence,
                    });
                }
                (IEI_CONCAT_16, &[hi, lo, parts, sequence]) => {
                    return Some(ConcatenatedSmsData {
                        reference: ((hi as u16) << 8) | lo as u16,
                        parts,
                        sequence,
                    });
                }
                _ => {}
            }
        }
        None
    }
}

impl<'a> TryFrom<&'a [u8]> for UserDataHeader {
    type Error = PduError;
    /// Parses a UDH *without* the leading UDH-length octet.
    fn try_from(b: &[u8]) -> PduResult<Self> {
        let mut elements = vec![];
        let mut offset = 0;
        while offset < b.len() {
            let id = b[offset];
            let len = *b
                .get(offset + 1)
                .ok_or(PduError::Truncated("information element length"))?
                as usize;
            let end = offset + 2 + len;
            let data = b
                .get(offset + 2..end)
                .ok_or(PduError::Truncated("information element data"))?
                .to_owned();
            elements.push(InformationElement { id, data });
            offset = end;
        }
        Ok(UserDataHeader { elements })
    }
}
