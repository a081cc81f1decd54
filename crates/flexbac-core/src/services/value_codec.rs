use crate::encoding::{
    primitives::{
        decode_character_string, decode_signed, decode_unsigned, encode_signed, encode_unsigned,
        signed_len, unsigned_len,
    },
    reader::Reader,
    tag::{AppTag, Tag},
    writer::Writer,
};
use crate::types::{BitString, DataValue, Date, ObjectId, Time};
use crate::{DecodeError, EncodeError};

fn u32_len(len: usize) -> Result<u32, EncodeError> {
    u32::try_from(len).map_err(|_| EncodeError::ValueOutOfRange)
}

/// Encodes one application-tagged value. `List` is written as a bare run of
/// its elements, which is how array properties travel inside an
/// opening/closing pair.
pub fn encode_application_data_value(
    w: &mut Writer,
    value: &DataValue,
) -> Result<(), EncodeError> {
    match value {
        DataValue::Null => Tag::Application {
            tag: AppTag::Null,
            len: 0,
        }
        .encode(w),
        DataValue::Boolean(v) => Tag::Application {
            tag: AppTag::Boolean,
            len: u32::from(*v),
        }
        .encode(w),
        DataValue::Unsigned(v) => {
            Tag::Application {
                tag: AppTag::UnsignedInt,
                len: unsigned_len(*v) as u32,
            }
            .encode(w);
            encode_unsigned(w, *v);
        }
        DataValue::Signed(v) => {
            Tag::Application {
                tag: AppTag::SignedInt,
                len: signed_len(*v) as u32,
            }
            .encode(w);
            encode_signed(w, *v);
        }
        DataValue::Real(v) => {
            Tag::Application {
                tag: AppTag::Real,
                len: 4,
            }
            .encode(w);
            w.write_all(&v.to_bits().to_be_bytes());
        }
        DataValue::Double(v) => {
            Tag::Application {
                tag: AppTag::Double,
                len: 8,
            }
            .encode(w);
            w.write_all(&v.to_bits().to_be_bytes());
        }
        DataValue::CharacterString(v) => {
            let bytes = v.as_bytes();
            Tag::Application {
                tag: AppTag::CharacterString,
                len: u32_len(bytes.len().saturating_add(1))?,
            }
            .encode(w);
            w.write_u8(0);
            w.write_all(bytes);
        }
        DataValue::OctetString(bytes) => {
            Tag::Application {
                tag: AppTag::OctetString,
                len: u32_len(bytes.len())?,
            }
            .encode(w);
            w.write_all(bytes);
        }
        DataValue::BitString(bits) => {
            if bits.unused_bits > 7 || (bits.data.is_empty() && bits.unused_bits != 0) {
                return Err(EncodeError::ValueOutOfRange);
            }
            Tag::Application {
                tag: AppTag::BitString,
                len: u32_len(bits.data.len().saturating_add(1))?,
            }
            .encode(w);
            w.write_u8(bits.unused_bits);
            w.write_all(&bits.data);
        }
        DataValue::Date(date) => {
            Tag::Application {
                tag: AppTag::Date,
                len: 4,
            }
            .encode(w);
            w.write_all(&date.to_octets());
        }
        DataValue::Time(time) => {
            Tag::Application {
                tag: AppTag::Time,
                len: 4,
            }
            .encode(w);
            w.write_all(&time.to_octets());
        }
        DataValue::Enumerated(v) => {
            Tag::Application {
                tag: AppTag::Enumerated,
                len: unsigned_len(*v) as u32,
            }
            .encode(w);
            encode_unsigned(w, *v);
        }
        DataValue::ObjectId(v) => {
            Tag::Application {
                tag: AppTag::ObjectId,
                len: 4,
            }
            .encode(w);
            w.write_be_u32(v.raw());
        }
        DataValue::List(values) => {
            for child in values {
                encode_application_data_value(w, child)?;
            }
        }
    }
    Ok(())
}

pub fn decode_application_data_value(r: &mut Reader<'_>) -> Result<DataValue, DecodeError> {
    let tag = Tag::decode(r)?;
    decode_application_data_value_from_tag(r, tag)
}

pub fn decode_application_data_value_from_tag(
    r: &mut Reader<'_>,
    tag: Tag,
) -> Result<DataValue, DecodeError> {
    let (tag, len) = match tag {
        Tag::Application { tag, len } => (tag, len),
        _ => return Err(DecodeError::InvalidTag),
    };
    match (tag, len) {
        (AppTag::Null, _) => Ok(DataValue::Null),
        (AppTag::Boolean, len) => Ok(DataValue::Boolean(len != 0)),
        (AppTag::UnsignedInt, len) => Ok(DataValue::Unsigned(decode_unsigned(r, len as usize)?)),
        (AppTag::SignedInt, len) => Ok(DataValue::Signed(decode_signed(r, len as usize)?)),
        (AppTag::Real, 4) => Ok(DataValue::Real(f32::from_bits(r.read_be_u32()?))),
        (AppTag::Double, 8) => Ok(DataValue::Double(f64::from_bits(u64::from_be_bytes(
            r.read_array()?,
        )))),
        (AppTag::CharacterString, len) => Ok(DataValue::CharacterString(
            decode_character_string(r, len as usize)?,
        )),
        (AppTag::Enumerated, len) => Ok(DataValue::Enumerated(decode_unsigned(r, len as usize)?)),
        (AppTag::ObjectId, 4) => Ok(DataValue::ObjectId(ObjectId::from_raw(r.read_be_u32()?))),
        (AppTag::OctetString, len) => Ok(DataValue::OctetString(r.read_exact(len as usize)?.to_vec())),
        (AppTag::BitString, 0) => Err(DecodeError::InvalidLength),
        (AppTag::BitString, len) => {
            let raw = r.read_exact(len as usize)?;
            let unused_bits = raw[0];
            if unused_bits > 7 || (raw.len() == 1 && unused_bits != 0) {
                return Err(DecodeError::InvalidValue);
            }
            Ok(DataValue::BitString(BitString::new(unused_bits, raw[1..].to_vec())))
        }
        (AppTag::Date, 4) => Ok(DataValue::Date(Date::from_octets(r.read_array()?))),
        (AppTag::Time, 4) => Ok(DataValue::Time(Time::from_octets(r.read_array()?))),
        (AppTag::Real | AppTag::Double | AppTag::ObjectId | AppTag::Date | AppTag::Time, _) => {
            Err(DecodeError::InvalidLength)
        }
    }
}

/// Octets that follow `tag` before the next tag.
fn payload_len(tag: Tag) -> usize {
    match tag {
        // A boolean's length field is its value.
        Tag::Application {
            tag: AppTag::Boolean,
            ..
        } => 0,
        Tag::Application { len, .. } | Tag::Context { len, .. } => len as usize,
        Tag::Opening { .. } | Tag::Closing { .. } => 0,
    }
}

/// Decodes the application values up to the closing tag `tag_num`,
/// consuming it. One value yields that value; several yield a `List`.
///
/// The outer error means the framing is broken and nothing after it can be
/// trusted. The inner error means the framing held but the content could
/// not be represented: a constructed value, an unknown character set, an
/// empty result or a value whose length disagrees with its type. In that
/// case the reader stands after the closing tag, so the caller can carry on
/// with whatever follows.
pub fn decode_values_until_closing(
    r: &mut Reader<'_>,
    tag_num: u8,
) -> Result<Result<DataValue, DecodeError>, DecodeError> {
    let mut values = Vec::new();
    let mut failure = None;
    loop {
        let tag = Tag::decode(r)?;
        match tag {
            Tag::Closing { tag_num: n } if n == tag_num => break,
            Tag::Closing { .. } => return Err(DecodeError::InvalidTag),
            Tag::Opening { tag_num: nested } => {
                skip_constructed(r, nested)?;
                failure.get_or_insert(DecodeError::Unsupported);
            }
            Tag::Context { .. } => {
                r.read_exact(payload_len(tag))?;
                failure.get_or_insert(DecodeError::Unsupported);
            }
            Tag::Application { .. } => {
                let mut body = Reader::new(r.read_exact(payload_len(tag))?);
                match decode_application_data_value_from_tag(&mut body, tag) {
                    Ok(value) if body.is_empty() => values.push(value),
                    Ok(_) => {
                        failure.get_or_insert(DecodeError::InvalidLength);
                    }
                    Err(DecodeError::UnexpectedEof) => {
                        failure.get_or_insert(DecodeError::InvalidLength);
                    }
                    Err(err) => {
                        failure.get_or_insert(err);
                    }
                }
            }
        }
    }
    if let Some(err) = failure {
        return Ok(Err(err));
    }
    Ok(match values.len() {
        0 => Err(DecodeError::InvalidLength),
        1 => Ok(values.remove(0)),
        _ => Ok(DataValue::List(values)),
    })
}

/// Skips everything up to and including the closing tag matching an
/// already consumed opening tag `tag_num`.
fn skip_constructed(r: &mut Reader<'_>, tag_num: u8) -> Result<(), DecodeError> {
    let mut open = vec![tag_num];
    while let Some(&innermost) = open.last() {
        let tag = Tag::decode(r)?;
        match tag {
            Tag::Opening { tag_num } => open.push(tag_num),
            Tag::Closing { tag_num } if tag_num == innermost => {
                open.pop();
            }
            Tag::Closing { .. } => return Err(DecodeError::InvalidTag),
            _ => {
                r.read_exact(payload_len(tag))?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{
        decode_application_data_value, decode_values_until_closing, encode_application_data_value,
    };
    use crate::encoding::{reader::Reader, tag::Tag, writer::Writer};
    use crate::types::{BitString, DataValue, Date, ObjectId, ObjectType, Time};
    use crate::DecodeError;
    use proptest::prelude::*;

    fn round_trip(value: &DataValue) -> DataValue {
        let mut w = Writer::new();
        encode_application_data_value(&mut w, value).unwrap();
        let mut r = Reader::new(w.as_written());
        let out = decode_application_data_value(&mut r).unwrap();
        assert!(r.is_empty());
        out
    }

    #[test]
    fn real_uses_four_octets() {
        let mut w = Writer::new();
        encode_application_data_value(&mut w, &DataValue::Real(21.5)).unwrap();
        assert_eq!(w.as_written(), &[0x44, 0x41, 0xAC, 0x00, 0x00]);
    }

    #[test]
    fn scalar_values_survive_encoding() {
        for value in [
            DataValue::Null,
            DataValue::Boolean(true),
            DataValue::Unsigned(1_000_000),
            DataValue::Signed(-300),
            DataValue::Double(-0.125),
            DataValue::CharacterString("Nordic S3".into()),
            DataValue::Enumerated(1),
            DataValue::ObjectId(ObjectId::new(ObjectType::Device, 2)),
            DataValue::OctetString(vec![0xAA, 0xBB]),
            DataValue::BitString(BitString::new(4, vec![0b0100_0000])),
            DataValue::Date(Date::from_octets([126, 10, 16, 5])),
            DataValue::Time(Time::from_octets([6, 30, 0, 0])),
        ] {
            assert_eq!(round_trip(&value), value);
        }
    }

    #[test]
    fn state_text_run_collapses_into_list() {
        let mut w = Writer::new();
        Tag::Opening { tag_num: 3 }.encode(&mut w);
        let states = DataValue::List(vec![
            DataValue::CharacterString("Stop".into()),
            DataValue::CharacterString("Away".into()),
        ]);
        encode_application_data_value(&mut w, &states).unwrap();
        Tag::Closing { tag_num: 3 }.encode(&mut w);

        let mut r = Reader::new(w.as_written());
        assert_eq!(Tag::decode(&mut r).unwrap(), Tag::Opening { tag_num: 3 });
        assert_eq!(decode_values_until_closing(&mut r, 3).unwrap().unwrap(), states);
        assert!(r.is_empty());
    }

    #[test]
    fn context_tag_is_not_an_application_value() {
        let mut r = Reader::new(&[0x09, 0x01]);
        assert_eq!(
            decode_application_data_value(&mut r).unwrap_err(),
            DecodeError::InvalidTag
        );
    }

    #[test]
    fn double_byte_charset_fails_only_its_result() {
        let mut r = Reader::new(&[0x73, 0x01, 0x82, 0xA0, 0x4F, 0x2A]);
        assert_eq!(
            decode_values_until_closing(&mut r, 4).unwrap(),
            Err(DecodeError::Unsupported)
        );
        assert_eq!(r.rest(), &[0x2A]);
    }

    #[test]
    fn constructed_value_is_skipped() {
        let mut r = Reader::new(&[0x0E, 0x09, 0x01, 0x1E, 0x1F, 0x0F, 0x4F]);
        assert_eq!(
            decode_values_until_closing(&mut r, 4).unwrap(),
            Err(DecodeError::Unsupported)
        );
        assert!(r.is_empty());
    }

    #[test]
    fn short_real_fails_only_its_result() {
        let mut r = Reader::new(&[0x42, 0x00, 0x00, 0x4F]);
        assert_eq!(
            decode_values_until_closing(&mut r, 4).unwrap(),
            Err(DecodeError::InvalidLength)
        );
        assert!(r.is_empty());
    }

    #[test]
    fn empty_result_fails_only_its_result() {
        let mut r = Reader::new(&[0x4F]);
        assert_eq!(
            decode_values_until_closing(&mut r, 4).unwrap(),
            Err(DecodeError::InvalidLength)
        );
    }

    #[test]
    fn truncated_result_breaks_framing() {
        let mut r = Reader::new(&[0x44, 0x41]);
        assert_eq!(
            decode_values_until_closing(&mut r, 4).unwrap_err(),
            DecodeError::UnexpectedEof
        );
    }

    proptest! {
        #[test]
        fn reals_round_trip(v in any::<f32>().prop_filter("nan", |v| !v.is_nan())) {
            prop_assert_eq!(round_trip(&DataValue::Real(v)), DataValue::Real(v));
        }

        #[test]
        fn signed_round_trip(v in any::<i32>()) {
            prop_assert_eq!(round_trip(&DataValue::Signed(v)), DataValue::Signed(v));
        }
    }
}
