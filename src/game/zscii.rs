//! Conversions between ZSCII and Unicode.

/// The default extra characters, ZSCII 155 to 223.
const EXTRA_CHARACTERS: [char; 69] = [
    'ä', 'ö', 'ü', 'Ä', 'Ö', 'Ü', 'ß', '»', '«', 'ë', 'ï', 'ÿ', 'Ë', 'Ï', 'á', 'é', 'í', 'ó', 'ú',
    'ý', 'Á', 'É', 'Í', 'Ó', 'Ú', 'Ý', 'à', 'è', 'ì', 'ò', 'ù', 'À', 'È', 'Ì', 'Ò', 'Ù', 'â', 'ê',
    'î', 'ô', 'û', 'Â', 'Ê', 'Î', 'Ô', 'Û', 'å', 'Å', 'ø', 'Ø', 'ã', 'ñ', 'õ', 'Ã', 'Ñ', 'Õ', 'æ',
    'Æ', 'ç', 'Ç', 'þ', 'ð', 'Þ', 'Ð', '£', 'œ', 'Œ', '¡', '¿',
];
const EXTRA_START: u16 = 155;

pub const NEWLINE: u16 = 13;
pub const DELETE: u16 = 8;
pub const ESCAPE: u16 = 27;

/// Map an output ZSCII code to a printable character. Codes with no visible
/// meaning (including 0) yield `None`.
pub fn to_char(zscii: u16) -> Option<char> {
    match zscii {
        9 => Some('\t'),
        11 => Some(' '),
        NEWLINE => Some('\n'),
        32..=126 => char::from_u32(u32::from(zscii)),
        155..=223 => Some(EXTRA_CHARACTERS[(zscii - EXTRA_START) as usize]),
        _ => None,
    }
}

/// Map a character to the ZSCII code the story expects for it.
pub fn from_char(c: char) -> Option<u16> {
    match c {
        '\n' | '\r' => Some(NEWLINE),
        ' '..='~' => Some(c as u16),
        _ => EXTRA_CHARACTERS
            .iter()
            .position(|x| *x == c)
            .map(|i| i as u16 + EXTRA_START),
    }
}

/// Render a run of ZSCII as a string, substituting `?` for unprintable codes.
pub fn to_string(text: &[u16]) -> String {
    text.iter()
        .filter(|c| **c != 0)
        .map(|c| to_char(*c).unwrap_or('?'))
        .collect()
}
