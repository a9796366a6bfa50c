use failure::Fail;

#[derive(Fail, Debug, Clone, PartialEq, Eq)]
pub enum PduError {
    #[fail(display = "Non-hex character in PDU data.")]
    MalformedHex,
    #[fail(display = "Non-digit nibble in a BCD number.")]
    MalformedBcd,
    #[fail(display = "Message text is not valid UTF-8.")]
    MalformedUtf8,
    #[fail(display = "Unsupported type-of-address octet: {:#04x}", _0)]
    UnsupportedAddressType(u8),
    #[fail(display = "The data coding scheme selects the 8-bit alphabet, which is not supported.")]
    UnsupportedAlphabet,
    #[fail(display = "Oversize: {}", _0)]
    Oversize(&'static str),
    #[fail(display = "PDU truncated at: {}", _0)]
    Truncated(&'static str),
}

pub type PduResult<T> = Result<T, PduError>;
