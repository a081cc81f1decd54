use crate::encoding::{reader::Reader, writer::Writer};
use crate::DecodeError;

const CONTEXT_BIT: u8 = 0b0000_1000;
const EXTENDED_TAG: u8 = 0x0F;
const LEN_EXTENDED: u8 = 5;
const LEN_OPENING: u8 = 6;
const LEN_CLOSING: u8 = 7;

/// Application tag numbers used by the values this crate understands.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppTag {
    Null = 0,
    Boolean = 1,
    UnsignedInt = 2,
    SignedInt = 3,
    Real = 4,
    Double = 5,
    OctetString = 6,
    CharacterString = 7,
    BitString = 8,
    Enumerated = 9,
    Date = 10,
    Time = 11,
    ObjectId = 12,
}

impl AppTag {
    pub fn from_u8(value: u8) -> Result<Self, DecodeError> {
        Ok(match value {
            0 => Self::Null,
            1 => Self::Boolean,
            2 => Self::UnsignedInt,
            3 => Self::SignedInt,
            4 => Self::Real,
            5 => Self::Double,
            6 => Self::OctetString,
            7 => Self::CharacterString,
            8 => Self::BitString,
            9 => Self::Enumerated,
            10 => Self::Date,
            11 => Self::Time,
            12 => Self::ObjectId,
            _ => return Err(DecodeError::InvalidTag),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Application { tag: AppTag, len: u32 },
    Context { tag_num: u8, len: u32 },
    Opening { tag_num: u8 },
    Closing { tag_num: u8 },
}

impl Tag {
    pub fn encode(self, w: &mut Writer) {
        match self {
            Tag::Application { tag, len } => write_header(w, tag as u8, 0, len),
            Tag::Context { tag_num, len } => write_header(w, tag_num, CONTEXT_BIT, len),
            Tag::Opening { tag_num } => write_marker(w, tag_num, LEN_OPENING),
            Tag::Closing { tag_num } => write_marker(w, tag_num, LEN_CLOSING),
        }
    }

    pub fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        let first = r.read_u8()?;
        let is_context = first & CONTEXT_BIT != 0;
        let tag_num = match first >> 4 {
            EXTENDED_TAG => r.read_u8()?,
            n => n,
        };
        let len_code = first & 0x07;

        if is_context {
            match len_code {
                LEN_OPENING => return Ok(Tag::Opening { tag_num }),
                LEN_CLOSING => return Ok(Tag::Closing { tag_num }),
                _ => {}
            }
        }

        let len = read_len(r, len_code)?;
        if is_context {
            Ok(Tag::Context { tag_num, len })
        } else {
            Ok(Tag::Application {
                tag: AppTag::from_u8(tag_num)?,
                len,
            })
        }
    }

    /// Returns true when this is the closing tag `tag_num`.
    pub fn closes(self, tag_num: u8) -> bool {
        self == Tag::Closing { tag_num }
    }
}

fn tag_nibble(tag_num: u8) -> u8 {
    if tag_num < EXTENDED_TAG {
        tag_num << 4
    } else {
        EXTENDED_TAG << 4
    }
}

fn write_header(w: &mut Writer, tag_num: u8, class: u8, len: u32) {
    let len_code = if len <= 4 { len as u8 } else { LEN_EXTENDED };
    w.write_u8(tag_nibble(tag_num) | class | len_code);
    if tag_num >= EXTENDED_TAG {
        w.write_u8(tag_num);
    }
    if len_code == LEN_EXTENDED {
        match len {
            0..=253 => w.write_u8(len as u8),
            254..=65_535 => {
                w.write_u8(254);
                w.write_be_u16(len as u16);
            }
            _ => {
                w.write_u8(255);
                w.write_be_u32(len);
            }
        }
    }
}

fn write_marker(w: &mut Writer, tag_num: u8, len_code: u8) {
    w.write_u8(tag_nibble(tag_num) | CONTEXT_BIT | len_code);
    if tag_num >= EXTENDED_TAG {
        w.write_u8(tag_num);
    }
}

fn read_len(r: &mut Reader<'_>, len_code: u8) -> Result<u32, DecodeError> {
    match len_code {
        0..=4 => Ok(len_code as u32),
        LEN_EXTENDED => match r.read_u8()? {
            254 => Ok(r.read_be_u16()? as u32),
            255 => r.read_be_u32(),
            short => Ok(short as u32),
        },
        _ => Err(DecodeError::InvalidLength),
    }
}
