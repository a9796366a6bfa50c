//! The `gsm-pdu` library encodes and decodes the GSM 03.40 SMS PDU format,
//! as exchanged with USB 3G/HSDPA/UMTS modems that speak the Hayes/AT
//! command set in PDU mode.
//!
//! [`PduCodec`] covers the common session flow: configure the service-centre
//! number from `AT+CSCA?`, encode a message into the hex blob `AT+CMGS`
//! wants (plus the length parameter for the command itself), and decode the
//! hex blobs `AT+CMGL`/`+CMT` hand back into sender, timestamp and text.
//! The pieces it is built from — addresses, timestamps, the GSM 7-bit
//! alphabet, septet packing, UCS-2 with surrogate pairs — are all public in
//! their own modules for callers that want to assemble PDUs themselves.
//!
//! Serial I/O and AT command handling are deliberately not here: a PDU goes
//! in as a hex string and comes out as one, and everything in between is
//! pure computation.

#[macro_use]
extern crate log;
#[macro_use]
extern crate failure_derive;
#[macro_use]
extern crate num_derive;

pub mod bcd;
pub mod errors;
pub mod gsm_encoding;
pub mod hex;
pub mod pdu;
pub mod ucs2;

use std::convert::TryFrom;

use crate::gsm_encoding::udh::ConcatenatedSmsData;
use crate::hex::HexData;
use crate::pdu::{DeliverPdu, PduAddress, SubmitPdu};
pub use crate::errors::{PduError, PduResult};

/// One codec session: the configured SCA, the last encoded SUBMIT and the
/// last successfully decoded DELIVER.
///
/// There is no shared or global state behind this — every operation is a
/// pure function over its inputs, and the struct only keeps results around
/// for the accessors. Callers that encode in parallel should give each
/// thread its own `PduCodec` rather than lock one.
#[derive(Debug, Default)]
pub struct PduCodec {
    sca: Option<PduAddress>,
    sms: String,
    decoded: Option<DecodedPdu>,
}

#[derive(Debug)]
struct DecodedPdu {
    sca: String,
    sender: String,
    timestamp: String,
    text: String,
    udh: Option<ConcatenatedSmsData>,
}

impl PduCodec {
    pub fn new() -> PduCodec {
        PduCodec::default()
    }
    /// Sets the service-centre number used by subsequent encodes, typically
    /// whatever `AT+CSCA?` reported. An empty string means "modem default"
    /// and puts a single zero length octet on the wire.
    pub fn set_sca_number(&mut self, number: &str) {
        self.sca = if number.is_empty() {
            None
        } else {
            Some(PduAddress::from_text(number))
        };
    }
    /// Encodes an SMS-SUBMIT to `recipient` and returns the TPDU length in
    /// octets — the `<n>` of `AT+CMGS=<n>`. The hex PDU itself, Ctrl-Z
    /// terminated and ready to follow the command, comes from
    /// [`get_sms`](PduCodec::get_sms).
    ///
    /// The alphabet is chosen per code point: GSM-7 when the whole message
    /// fits the default alphabet, UCS-2 otherwise. Nothing is stored on
    /// failure.
    pub fn encode_pdu(&mut self, recipient: &str, message: &str) -> PduResult<usize> {
        let pdu = SubmitPdu::new(self.sca.clone(), recipient, message)?;
        let (bytes, tpdu_len) = pdu.as_bytes()?;
        let mut sms = HexData(&bytes).to_string();
        sms.push('\x1A');
        self.sms = sms;
        Ok(tpdu_len)
    }
    /// [`encode_pdu`](PduCodec::encode_pdu) for message text that arrived as
    /// raw bytes; fails with `MalformedUtf8` instead of encoding garbage.
    pub fn encode_pdu_bytes(&mut self, recipient: &str, message: &[u8]) -> PduResult<usize> {
        let message = ucs2::text_from_bytes(message)?;
        self.encode_pdu(recipient, message)
    }
    /// The last encoded PDU as an uppercase hex string with a trailing
    /// Ctrl-Z, exactly as `AT+CMGS` expects it.
    pub fn get_sms(&self) -> &str {
        &self.sms
    }
    /// Decodes an SMS-DELIVER hex string into the accessor fields below.
    ///
    /// All or nothing: on any failure this returns `false`, logs why, and
    /// every accessor keeps the value from the previous successful decode.
    pub fn decode_pdu(&mut self, pdu: &str) -> bool {
        match self.try_decode(pdu) {
            Ok(decoded) => {
                self.decoded = Some(decoded);
                true
            }
            Err(e) => {
                debug!("dropping undecodable PDU: {}", e);
                false
            }
        }
    }
    fn try_decode(&self, pdu: &str) -> PduResult<DecodedPdu> {
        let bytes = HexData::decode(pdu.trim_end_matches('\u{1A}'))?;
        let deliver = DeliverPdu::try_from(&bytes[..])?;
        let msg = deliver.get_message_data().decode_message()?;
        Ok(DecodedPdu {
            sca: deliver
                .sca
                .as_ref()
                .map(|s| s.to_string())
                .unwrap_or_default(),
            sender: deliver.originating_address.to_string(),
            timestamp: deliver.scts.digits(),
            text: msg.text,
            udh: msg.udh.as_ref().and_then(|u| u.concatenation()),
        })
    }
    /// Service-centre number of the last decoded PDU.
    pub fn get_sca_number(&self) -> &str {
        self.decoded.as_ref().map(|d| d.sca.as_str()).unwrap_or("")
    }
    /// Sender number (or alphanumeric tag) of the last decoded PDU.
    pub fn get_sender(&self) -> &str {
        self.decoded
            .as_ref()
            .map(|d| d.sender.as_str())
            .unwrap_or("")
    }
    /// Timestamp of the last decoded PDU as 14 semi-octet digits,
    /// YYMMDDHHMMSSTZ.
    pub fn get_timestamp(&self) -> &str {
        self.decoded
            .as_ref()
            .map(|d| d.timestamp.as_str())
            .unwrap_or("")
    }
    /// Message text of the last decoded PDU.
    pub fn get_text(&self) -> &str {
        self.decoded
            .as_ref()
            .map(|d| d.text.as_str())
            .unwrap_or("")
    }
    /// Concatenation descriptor of the last decoded PDU, if it carried one.
    pub fn get_udh(&self) -> Option<ConcatenatedSmsData> {
        self.decoded.as_ref().and_then(|d| d.udh)
    }
}
