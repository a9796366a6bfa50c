//! Translation tables between ISO-8859-1 and the GSM 03.38 default alphabet.
//!
//! `ASCII8_TO_GSM7` entries are either a plain septet (0-127), a negated
//! septet marking a close-match substitution (e.g. `á` falls back to `a`), a
//! septet plus 256 marking a two-septet escape sequence, or [`NPC7`] for
//! characters the alphabet cannot represent at all. `GSM7_TO_ASCII8` is the
//! reverse direction; septet 27 escapes into the extension table.

/// "No printable character" sentinel in the 8-to-7 table.
pub const NPC7: i16 = 63;
/// Replacement character emitted when decoding hits something unmappable.
pub const NPC8: char = '?';
/// Escape septet introducing an extension-table character.
pub const ESCAPE: u8 = 0x1B;
/// Table entries at or above this value encode as `ESCAPE` + (entry - 256).
pub const ESCAPED: i16 = 256;

const N: i16 = NPC7;

pub static ASCII8_TO_GSM7: [i16; 256] = [
    // 0x00-0x1F: controls; only LF, CR and FF (as an escape pair) survive
    N, N, N, N, N, N, N, N, N, N, 10, N, 10 + 256, 13, N, N,
    N, N, N, N, N, N, N, N, N, N, N, N, N, N, N, N,
    // 0x20-0x3F: punctuation and digits, mostly identity; $ is septet 2
    32, 33, 34, 35, 2, 37, 38, 39, 40, 41, 42, 43, 44, 45, 46, 47,
    48, 49, 50, 51, 52, 53, 54, 55, 56, 57, 58, 59, 60, 61, 62, 63,
    // 0x40-0x5F: @ is septet 0; [ \ ] ^ escape; _ is septet 17
    0, 65, 66, 67, 68, 69, 70, 71, 72, 73, 74, 75, 76, 77, 78, 79,
    80, 81, 82, 83, 84, 85, 86, 87, 88, 89, 90, 60 + 256, 47 + 256, 62 + 256, 20 + 256, 17,
    // 0x60-0x7F: { | } ~ escape; ` has no septet, ' substitutes
    -39, 97, 98, 99, 100, 101, 102, 103, 104, 105, 106, 107, 108, 109, 110, 111,
    112, 113, 114, 115, 116, 117, 118, 119, 120, 121, 122, 40 + 256, 64 + 256, 41 + 256, 61 + 256, N,
    // 0x80-0x9F: windows-1252 leftovers, close matches where one exists
    N, N, -39, -102, -34, N, N, N, N, N, -83, -39, -214, N, N, N,
    N, -39, -39, -34, -34, -42, -45, -45, -39, N, -115, -39, -111, N, N, -89,
    // 0xA0-0xBF: ¡ ¿ § and the currency signs map directly
    -32, 64, -99, 1, 36, 3, -33, 95, -34, N, N, -60, N, -45, N, N,
    N, N, -50, -51, -39, -117, N, N, N, -49, N, -62, N, N, N, 96,
    // 0xC0-0xDF: accented capitals; Ä Å Æ Ç É Ñ Ö Ø Ü ß have septets
    -65, -65, -65, -65, 91, 14, 28, 9, -31, 31, -31, -31, -73, -73, -73, -73,
    -68, 93, -79, -79, -79, -79, 92, -42, 11, -85, -85, -85, 94, -89, N, 30,
    // 0xE0-0xFF: accented smalls; à ä å æ ç è é ì ñ ò ö ø ù ü have septets
    127, -97, -97, -97, 123, 15, 29, -9, 4, 5, -101, -101, 7, 7, -105, -105,
    N, 125, 8, -111, -111, -111, 124, -47, 12, 6, -117, -117, 126, -121, N, -121,
];

const Q: u8 = b'?';

pub static GSM7_TO_ASCII8: [u8; 128] = [
    // 0x00-0x1F: @ £ $ ¥ è é ù ì ò Ç LF Ø ø CR Å å, Greek capitals unmapped
    64, 163, 36, 165, 232, 233, 249, 236, 242, 199, 10, 216, 248, 13, 197, 229,
    Q, 95, Q, Q, Q, Q, Q, Q, Q, Q, Q, 27, 198, 230, 223, 201,
    // 0x20-0x3F: ASCII except ¤ at 0x24
    32, 33, 34, 35, 164, 37, 38, 39, 40, 41, 42, 43, 44, 45, 46, 47,
    48, 49, 50, 51, 52, 53, 54, 55, 56, 57, 58, 59, 60, 61, 62, 63,
    // 0x40-0x5F: ¡ then A-Z, then Ä Ö Ñ Ü §
    161, 65, 66, 67, 68, 69, 70, 71, 72, 73, 74, 75, 76, 77, 78, 79,
    80, 81, 82, 83, 84, 85, 86, 87, 88, 89, 90, 196, 214, 209, 220, 167,
    // 0x60-0x7F: ¿ then a-z, then ä ö ñ ü à
    191, 97, 98, 99, 100, 101, 102, 103, 104, 105, 106, 107, 108, 109, 110, 111,
    112, 113, 114, 115, 116, 117, 118, 119, 120, 121, 122, 228, 246, 241, 252, 224,
];

/// Extension table reached through [`ESCAPE`], per GSM 03.38 §6.2.1.1.
pub static GSM7_EXTENSION: [(u8, char); 10] = [
    (0x0A, '\u{0C}'), // form feed
    (0x14, '^'),
    (0x28, '{'),
    (0x29, '}'),
    (0x2F, '\\'),
    (0x3C, '['),
    (0x3D, '~'),
    (0x3E, ']'),
    (0x40, '|'),
    (0x65, '€'),
];
