//! TPDU field codecs and the two message shapes: SMS-SUBMIT going out,
//! SMS-DELIVER coming in.

use std::convert::TryFrom;
use std::fmt;
use std::str::FromStr;
use num::FromPrimitive;

use crate::bcd;
use crate::errors::*;
use crate::gsm_encoding::{self, GsmMessageData};

/// UDHI bit of the PDU-type octet.
const UDHI_MASK: u8 = 0b0100_0000;
/// ISDN/telephone numbering plan, the only one emitted for numeric addresses.
const NPI_ISDN: u8 = 0b0000_0001;
/// Alphabet field of the DCS octet.
const DCS_ALPHABET_MASK: u8 = 0b0000_1100;

/// Type of number, in place within the type-of-address octet (bits 6:4).
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, FromPrimitive)]
pub enum TypeOfNumber {
    International = 0b0_001_0000,
    National = 0b0_010_0000,
    Alphanumeric = 0b0_101_0000,
}

/// How an address length field counts: the SCA prefix is in octets and
/// includes the type-of-address byte; addresses embedded in the TPDU proper
/// are in nibbles (digits).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AddressLength {
    Octets,
    Nibbles,
}

/// A phone number (or alphanumeric sender tag) plus its type of number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PduAddress {
    pub ton: TypeOfNumber,
    pub number: String,
}

impl PduAddress {
    /// Builds an address from user-supplied text: digits, with an optional
    /// leading `+` marking an international number. Anything else is dropped.
    pub fn from_text(st: &str) -> PduAddress {
        let international = st.starts_with('+');
        let number: String = st.chars().filter(|c| c.is_ascii_digit()).collect();
        PduAddress {
            ton: if international {
                TypeOfNumber::International
            } else {
                TypeOfNumber::National
            },
            number,
        }
    }
    /// Serializes as a length byte, type-of-address byte and BCD body.
    pub fn to_bytes(&self, length: AddressLength) -> PduResult<Vec<u8>> {
        if self.number.len() > 20 {
            return Err(PduError::Oversize("address longer than 20 digits"));
        }
        let toa = 0x80 | self.ton as u8
            | match self.ton {
                TypeOfNumber::Alphanumeric => {
                    return Err(PduError::UnsupportedAddressType(0x80 | self.ton as u8));
                }
                _ => NPI_ISDN,
            };
        let body = bcd::digits_to_bcd(&self.number)?;
        let mut ret = Vec::with_capacity(body.len() + 2);
        match length {
            AddressLength::Nibbles => ret.push(self.number.len() as u8),
            AddressLength::Octets => ret.push(body.len() as u8 + 1),
        }
        ret.push(toa);
        ret.extend(body);
        Ok(ret)
    }
    /// Parses an address starting at its length byte, returning it together
    /// with the number of bytes consumed.
    pub fn parse(b: &[u8], length: AddressLength) -> PduResult<(PduAddress, usize)> {
        let raw_len = *b.get(0).ok_or(PduError::Truncated("address length"))? as usize;
        let nibbles = match length {
            AddressLength::Nibbles => raw_len,
            AddressLength::Octets => {
                raw_len
                    .checked_sub(1)
                    .ok_or(PduError::Truncated("type of address"))?
                    * 2
            }
        };
        let toa = *b.get(1).ok_or(PduError::Truncated("type of address"))?;
        if toa & 0x80 == 0 {
            return Err(PduError::UnsupportedAddressType(toa));
        }
        let body_octets = (nibbles + 1) / 2;
        let body = b
            .get(2..2 + body_octets)
            .ok_or(PduError::Truncated("address body"))?;
        let ton = TypeOfNumber::from_u8(toa & 0b0111_0000)
            .ok_or(PduError::UnsupportedAddressType(toa))?;
        let number = match ton {
            TypeOfNumber::International | TypeOfNumber::National => {
                bcd::bcd_to_digits(body, nibbles)?
            }
            TypeOfNumber::Alphanumeric => {
                let septets = gsm_encoding::unpack_7bit(body, body_octets * 8 / 7, 0);
                gsm_encoding::gsm_decode_septets(&septets)
            }
        };
        Ok((PduAddress { ton, number }, 2 + body_octets))
    }
}

impl FromStr for PduAddress {
    type Err = std::convert::Infallible;
    fn from_str(st: &str) -> Result<Self, Self::Err> {
        Ok(PduAddress::from_text(st))
    }
}

impl fmt::Display for PduAddress {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.ton == TypeOfNumber::International {
            write!(f, "+")?;
        }
        write!(f, "{}", self.number)
    }
}

/// Service-centre timestamp: seven swapped-nibble BCD octets straight off
/// the wire.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Scts([u8; 7]);

impl Scts {
    /// The 14 semi-octet digits YYMMDDHHMMSSTZ, low nibble first per octet,
    /// emitted as-is with no calendar or timezone interpretation.
    pub fn digits(&self) -> String {
        let mut ret = String::with_capacity(14);
        for b in self.0.iter() {
            ret.push((b'0' + (b & 0xF)) as char);
            ret.push((b'0' + (b >> 4)) as char);
        }
        ret
    }
}

impl<'a> TryFrom<&'a [u8]> for Scts {
    type Error = PduError;
    fn try_from(b: &[u8]) -> PduResult<Self> {
        if b.len() < 7 {
            return Err(PduError::Truncated("service centre timestamp"));
        }
        let mut octets = [0u8; 7];
        octets.copy_from_slice(&b[..7]);
        Ok(Scts(octets))
    }
}

impl fmt::Display for Scts {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.digits())
    }
}

/// Alphabet selected by the DCS octet, in place within bits 3:2.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, FromPrimitive)]
pub enum MessageEncoding {
    Gsm7Bit = 0b0000_00_00,
    EightBit = 0b0000_01_00,
    Ucs2 = 0b0000_10_00,
}

/// An outgoing SMS-SUBMIT: no validity period, message reference left to
/// the modem.
#[derive(Debug, Clone)]
pub struct SubmitPdu {
    pub sca: Option<PduAddress>,
    pub destination: PduAddress,
    pub data: GsmMessageData,
}

impl SubmitPdu {
    /// Builds a SUBMIT for one recipient, choosing the alphabet from the
    /// message text.
    pub fn new(sca: Option<PduAddress>, recipient: &str, message: &str) -> PduResult<SubmitPdu> {
        Ok(SubmitPdu {
            sca,
            destination: PduAddress::from_text(recipient),
            data: GsmMessageData::encode_message(message)?,
        })
    }
    /// Serializes, returning the binary buffer and the TPDU length — the
    /// buffer length minus the SCA prefix, i.e. the `<n>` of `AT+CMGS=<n>`.
    pub fn as_bytes(&self) -> PduResult<(Vec<u8>, usize)> {
        let mut ret = vec![];
        match self.sca {
            Some(ref sca) => ret.extend(sca.to_bytes(AddressLength::Octets)?),
            None => ret.push(0),
        }
        let sca_len = ret.len();
        ret.push(0x01); // SMS-SUBMIT, no validity period
        ret.push(0x00); // message reference: modem assigns
        ret.extend(self.destination.to_bytes(AddressLength::Nibbles)?);
        ret.push(0x00); // PID: plain SME-to-SME
        ret.push(self.data.encoding() as u8);
        ret.push(self.data.user_data_len());
        ret.extend_from_slice(self.data.as_bytes());
        let tpdu_len = ret.len() - sca_len;
        Ok((ret, tpdu_len))
    }
}

/// An incoming SMS-DELIVER, split into fields. The user data stays raw
/// until [`get_message_data`](DeliverPdu::get_message_data) — header parsing
/// and text decoding can fail independently.
#[derive(Debug, Clone)]
pub struct DeliverPdu {
    pub sca: Option<PduAddress>,
    pub first_octet: u8,
    pub originating_address: PduAddress,
    pub encoding: MessageEncoding,
    pub scts: Scts,
    pub user_data: Vec<u8>,
    pub user_data_len: u8,
}

impl DeliverPdu {
    pub fn has_udh(&self) -> bool {
        self.first_octet & UDHI_MASK != 0
    }
    pub fn get_message_data(&self) -> GsmMessageData {
        GsmMessageData {
            encoding: self.encoding,
            udh: self.has_udh(),
            bytes: self.user_data.clone(),
            user_data_len: self.user_data_len,
        }
    }
}

impl<'a> TryFrom<&'a [u8]> for DeliverPdu {
    type Error = PduError;
    fn try_from(b: &[u8]) -> PduResult<Self> {
        let scalen = *b.get(0).ok_or(PduError::Truncated("SCA length"))? as usize;
        let mut offset = 1;
        let sca = if scalen > 0 {
            let (sca, used) = PduAddress::parse(b, AddressLength::Octets)?;
            offset = used;
            Some(sca)
        } else {
            None
        };
        let first_octet = *b.get(offset).ok_or(PduError::Truncated("PDU type"))?;
        offset += 1;
        let (originating_address, used) =
            PduAddress::parse(&b[offset..], AddressLength::Nibbles)?;
        offset += used;
        // protocol identifier: ignored
        offset += 1;
        let dcs = *b.get(offset).ok_or(PduError::Truncated("data coding scheme"))?;
        offset += 1;
        let encoding = MessageEncoding::from_u8(dcs & DCS_ALPHABET_MASK)
            .ok_or(PduError::UnsupportedAlphabet)?;
        let scts = Scts::try_from(
            b.get(offset..offset + 7)
                .ok_or(PduError::Truncated("service centre timestamp"))?,
        )?;
        offset += 7;
        let user_data_len = *b.get(offset).ok_or(PduError::Truncated("user data length"))?;
        offset += 1;
        let user_data = b.get(offset..).unwrap_or(&[]).to_owned();
        debug!(
            "deliver PDU from {} at {}: {:?}, {} units",
            originating_address, scts, encoding, user_data_len
        );
        Ok(DeliverPdu {
            sca,
            first_octet,
            originating_address,
            encoding,
            scts,
            user_data,
            user_data_len,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::gsm_encoding::pack_7bit;
    use crate::hex::HexData;

    fn deliver(hex: &str) -> DeliverPdu {
        DeliverPdu::try_from(&HexData::decode(hex).unwrap()[..]).unwrap()
    }

    #[test]
    fn address_roundtrip_all_lengths() {
        let digits = "79521402032795214020";
        for n in 1..=digits.len() {
            for &(len, ton) in &[
                (AddressLength::Nibbles, TypeOfNumber::International),
                (AddressLength::Octets, TypeOfNumber::National),
            ] {
                let addr = PduAddress { ton, number: digits[..n].to_owned() };
                let bytes = addr.to_bytes(len).unwrap();
                let (parsed, used) = PduAddress::parse(&bytes, len).unwrap();
                assert_eq!(parsed, addr);
                assert_eq!(used, bytes.len());
            }
        }
    }
    #[test]
    fn address_wire_form() {
        let addr = PduAddress::from_text("+97254120032");
        assert_eq!(
            addr.to_bytes(AddressLength::Octets).unwrap(),
            vec![0x07, 0x91, 0x79, 0x52, 0x14, 0x02, 0x30, 0xF2]
        );
        assert_eq!(
            addr.to_bytes(AddressLength::Nibbles).unwrap(),
            vec![0x0B, 0x91, 0x79, 0x52, 0x14, 0x02, 0x30, 0xF2]
        );
        let national = PduAddress::from_text("6123");
        assert_eq!(
            national.to_bytes(AddressLength::Nibbles).unwrap(),
            vec![0x04, 0xA1, 0x16, 0x32]
        );
    }
    #[test]
    fn address_too_long() {
        let addr = PduAddress::from_text("123456789012345678901");
        assert!(addr.to_bytes(AddressLength::Nibbles).is_err());
    }
    #[test]
    fn address_rejects_clear_ext_bit() {
        assert_eq!(
            PduAddress::parse(&[0x02, 0x11, 0x21], AddressLength::Nibbles),
            Err(PduError::UnsupportedAddressType(0x11))
        );
    }
    #[test]
    fn address_rejects_unknown_ton() {
        assert_eq!(
            PduAddress::parse(&[0x02, 0xB1, 0x21], AddressLength::Nibbles),
            Err(PduError::UnsupportedAddressType(0xB1))
        );
    }
    #[test]
    fn alphanumeric_sender() {
        // "ABC" packed into 3 octets, announced as 6 nibbles
        let mut field = vec![0x06, 0xD0];
        field.extend(pack_7bit(b"ABC", 0));
        let (addr, used) = PduAddress::parse(&field, AddressLength::Nibbles).unwrap();
        assert_eq!(addr.ton, TypeOfNumber::Alphanumeric);
        assert_eq!(addr.number, "ABC");
        assert_eq!(used, 5);
        // an odd nibble count still spans the same whole octets
        field[0] = 0x05;
        let (addr, used) = PduAddress::parse(&field, AddressLength::Nibbles).unwrap();
        assert_eq!(addr.number, "ABC");
        assert_eq!(used, 5);
    }
    #[test]
    fn scts_digits() {
        let scts = Scts::try_from(&[0x12, 0x01, 0x51, 0x11, 0x34, 0x04, 0x21][..]).unwrap();
        assert_eq!(scts.digits(), "21101511434012");
    }
    #[test]
    fn decode_ucs2_deliver() {
        // spec corpus: UCS-2 message with astral pairs and Hebrew tail
        let pdu = deliver(
            "07917952140230F2040C917952777777770008120170016131212200680065006C006C006F0030\
             00A505D02660D83CDCA1D83DDE0005E905DC05D505DD",
        );
        assert_eq!(pdu.sca.as_ref().unwrap().to_string(), "+97254120032");
        assert_eq!(pdu.originating_address.to_string(), "+972577777777");
        assert_eq!(pdu.encoding, MessageEncoding::Ucs2);
        assert_eq!(pdu.scts.digits(), "21100710161312");
        assert!(!pdu.has_udh());
        let msg = pdu.get_message_data().decode_message().unwrap();
        assert_eq!(msg.text, "hello0¥א♠🂡😀שלום");
        assert!(msg.udh.is_none());
    }
    #[test]
    fn decode_gsm7_deliver() {
        let pdu = deliver("07917952140230F2040C9179527777777700001201216123732106CA405B8D6000");
        assert_eq!(pdu.encoding, MessageEncoding::Gsm7Bit);
        assert_eq!(pdu.scts.digits(), "21101216323712");
        let msg = pdu.get_message_data().decode_message().unwrap();
        assert_eq!(msg.text, "J£mjòø");
    }
    #[test]
    fn decode_gsm7_deliver_with_escapes() {
        let pdu =
            deliver("07917952939899F9240C917952630247660000120151113404210A814D79C3DBF8C2E231");
        assert_eq!(pdu.sca.as_ref().unwrap().to_string(), "+97253989999");
        assert_eq!(pdu.originating_address.to_string(), "+972536207466");
        assert_eq!(pdu.scts.digits(), "21101511434012");
        let msg = pdu.get_message_data().decode_message().unwrap();
        assert_eq!(msg.text, "£€[]abc");
    }
    #[test]
    fn decode_rejects_eight_bit_alphabet() {
        let pdu = deliver("0004049116320004120151113404210401020304");
        assert_eq!(
            pdu.get_message_data().decode_message(),
            Err(PduError::UnsupportedAlphabet)
        );
    }
    #[test]
    fn encode_gsm7_submit() {
        let pdu = SubmitPdu::new(
            Some(PduAddress::from_text("+97254120032")),
            "+79523702216",
            "Hello€",
        )
        .unwrap();
        assert_eq!(pdu.data.encoding(), MessageEncoding::Gsm7Bit);
        assert_eq!(pdu.data.user_data_len(), 7);
        let (bytes, tpdu_len) = pdu.as_bytes().unwrap();
        assert_eq!(
            HexData(&bytes).to_string(),
            "07917952140230F201000B919725732012F6000007C8329BFDDE9401"
        );
        assert_eq!(tpdu_len, 20);
    }
    #[test]
    fn encode_ucs2_submit_writes_octet_count() {
        let pdu = SubmitPdu::new(None, "+79527777777", "hello0¥א♠🂡😀").unwrap();
        assert_eq!(pdu.data.encoding(), MessageEncoding::Ucs2);
        let (bytes, tpdu_len) = pdu.as_bytes().unwrap();
        // no SCA: single zero octet prefix
        assert_eq!(bytes[0], 0x00);
        assert_eq!(tpdu_len, bytes.len() - 1);
        // DCS and UD length: UCS-2, 26 octets
        assert_eq!(bytes[12], 0x08);
        assert_eq!(bytes[13], 26);
        assert_eq!(&bytes[14..], &crate::ucs2::encode_ucs2("hello0¥א♠🂡😀")[..]);
    }
    #[test]
    fn eight_bit_deliver_keeps_fields() {
        // the DCS byte parses, only text decoding refuses
        let pdu = deliver("0004049116320004120151113404210401020304");
        assert_eq!(pdu.encoding, MessageEncoding::EightBit);
        assert_eq!(pdu.originating_address.to_string(), "+6123");
        assert_eq!(pdu.user_data, vec![0x01, 0x02, 0x03, 0x04]);
    }
}
