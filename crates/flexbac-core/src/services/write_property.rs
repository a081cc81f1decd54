use crate::apdu::ConfirmedRequestHeader;
use crate::encoding::{
    primitives::{encode_ctx_object_id, encode_ctx_unsigned},
    tag::Tag,
    writer::Writer,
};
use crate::services::value_codec::encode_application_data_value;
use crate::types::{DataValue, ObjectId, PropertyId};
use crate::EncodeError;

pub const SERVICE_WRITE_PROPERTY: u8 = 0x0F;

/// Valid command priority range.
pub const PRIORITY_RANGE: core::ops::RangeInclusive<u8> = 1..=16;

#[derive(Debug, Clone, PartialEq)]
pub struct WritePropertyRequest {
    pub object_id: ObjectId,
    pub property_id: PropertyId,
    pub value: DataValue,
    pub array_index: Option<u32>,
    pub priority: Option<u8>,
    pub invoke_id: u8,
}

impl Default for WritePropertyRequest {
    fn default() -> Self {
        Self {
            object_id: ObjectId::new(crate::types::ObjectType::AnalogValue, 0),
            property_id: PropertyId::PresentValue,
            value: DataValue::Null,
            array_index: None,
            priority: None,
            invoke_id: 1,
        }
    }
}

impl WritePropertyRequest {
    pub fn encode(&self, w: &mut Writer) -> Result<(), EncodeError> {
        if let Some(priority) = self.priority {
            if !PRIORITY_RANGE.contains(&priority) {
                return Err(EncodeError::ValueOutOfRange);
            }
        }

        ConfirmedRequestHeader::new(self.invoke_id, SERVICE_WRITE_PROPERTY).encode(w);
        encode_ctx_object_id(w, 0, self.object_id.raw());
        encode_ctx_unsigned(w, 1, self.property_id.to_u32());
        if let Some(idx) = self.array_index {
            encode_ctx_unsigned(w, 2, idx);
        }

        Tag::Opening { tag_num: 3 }.encode(w);
        encode_application_data_value(w, &self.value)?;
        Tag::Closing { tag_num: 3 }.encode(w);

        if let Some(priority) = self.priority {
            encode_ctx_unsigned(w, 4, priority as u32);
        }
        Ok(())
    }
}
