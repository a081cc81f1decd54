use crate::encoding::{reader::Reader, tag::Tag, writer::Writer};
use crate::DecodeError;

/// Minimal big-endian byte count for an unsigned value (1..=4).
pub const fn unsigned_len(value: u32) -> usize {
    match value {
        0..=0xFF => 1,
        0x100..=0xFFFF => 2,
        0x1_0000..=0xFF_FFFF => 3,
        _ => 4,
    }
}

/// Minimal two's-complement byte count for a signed value (1..=4).
pub const fn signed_len(value: i32) -> usize {
    match value {
        -128..=127 => 1,
        -32_768..=32_767 => 2,
        -8_388_608..=8_388_607 => 3,
        _ => 4,
    }
}

pub fn encode_unsigned(w: &mut Writer, value: u32) -> usize {
    let len = unsigned_len(value);
    w.write_all(&value.to_be_bytes()[4 - len..]);
    len
}

pub fn decode_unsigned(r: &mut Reader<'_>, len: usize) -> Result<u32, DecodeError> {
    if !(1..=4).contains(&len) {
        return Err(DecodeError::InvalidLength);
    }
    let bytes = r.read_exact(len)?;
    Ok(bytes.iter().fold(0u32, |acc, b| (acc << 8) | *b as u32))
}

pub fn encode_signed(w: &mut Writer, value: i32) -> usize {
    let len = signed_len(value);
    w.write_all(&value.to_be_bytes()[4 - len..]);
    len
}

pub fn decode_signed(r: &mut Reader<'_>, len: usize) -> Result<i32, DecodeError> {
    if !(1..=4).contains(&len) {
        return Err(DecodeError::InvalidLength);
    }
    let bytes = r.read_exact(len)?;
    let fill = if bytes[0] & 0x80 != 0 { 0xFF } else { 0x00 };
    let mut out = [fill; 4];
    out[4 - len..].copy_from_slice(bytes);
    Ok(i32::from_be_bytes(out))
}

pub fn encode_ctx_unsigned(w: &mut Writer, tag_num: u8, value: u32) {
    let len = unsigned_len(value);
    Tag::Context {
        tag_num,
        len: len as u32,
    }
    .encode(w);
    w.write_all(&value.to_be_bytes()[4 - len..]);
}

pub fn encode_ctx_object_id(w: &mut Writer, tag_num: u8, object_id_raw: u32) {
    Tag::Context { tag_num, len: 4 }.encode(w);
    w.write_be_u32(object_id_raw);
}

/// Reads a context tag `expected` and the unsigned value it carries.
pub fn decode_required_ctx_unsigned(
    r: &mut Reader<'_>,
    expected: u8,
) -> Result<u32, DecodeError> {
    match Tag::decode(r)? {
        Tag::Context { tag_num, len } if tag_num == expected => decode_unsigned(r, len as usize),
        _ => Err(DecodeError::InvalidTag),
    }
}

// Character sets understood by `decode_character_string`.
const CHARSET_UTF8: u8 = 0;
const CHARSET_UCS4: u8 = 3;
const CHARSET_UCS2: u8 = 4;
const CHARSET_ISO_8859_1: u8 = 5;

/// Decodes the body of a character string (charset byte + text).
///
/// UTF-8, UCS-4, UCS-2 and ISO 8859-1 are understood; the double-byte
/// sets (IBM/Microsoft DBCS, JIS X 0208) are `Unsupported`. The body is
/// consumed in every case.
pub fn decode_character_string(r: &mut Reader<'_>, len: usize) -> Result<String, DecodeError> {
    if len == 0 {
        return Err(DecodeError::InvalidLength);
    }
    let raw = r.read_exact(len)?;
    let text = &raw[1..];
    match raw[0] {
        CHARSET_UTF8 => core::str::from_utf8(text)
            .map(str::to_owned)
            .map_err(|_| DecodeError::InvalidValue),
        CHARSET_ISO_8859_1 => Ok(text.iter().copied().map(char::from).collect()),
        CHARSET_UCS2 => {
            if text.len() % 2 != 0 {
                return Err(DecodeError::InvalidLength);
            }
            let units = text.chunks_exact(2).map(|c| u16::from_be_bytes([c[0], c[1]]));
            char::decode_utf16(units)
                .collect::<Result<String, _>>()
                .map_err(|_| DecodeError::InvalidValue)
        }
        CHARSET_UCS4 => {
            if text.len() % 4 != 0 {
                return Err(DecodeError::InvalidLength);
            }
            text.chunks_exact(4)
                .map(|c| char::from_u32(u32::from_be_bytes([c[0], c[1], c[2], c[3]])))
                .collect::<Option<String>>()
                .ok_or(DecodeError::InvalidValue)
        }
        _ => Err(DecodeError::Unsupported),
    }
}
