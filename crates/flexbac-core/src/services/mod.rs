pub mod read_property_multiple;
pub mod value_codec;
pub mod write_property;

use crate::encoding::{primitives::decode_required_ctx_unsigned, reader::Reader};
use crate::types::ObjectId;
use crate::DecodeError;

/// Decode a required context-tagged object identifier at the expected tag number.
pub(crate) fn decode_required_ctx_object_id(
    r: &mut Reader<'_>,
    expected_tag_num: u8,
) -> Result<ObjectId, DecodeError> {
    Ok(ObjectId::from_raw(decode_required_ctx_unsigned(
        r,
        expected_tag_num,
    )?))
}
