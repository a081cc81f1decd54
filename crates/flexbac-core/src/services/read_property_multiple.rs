use crate::apdu::ConfirmedRequestHeader;
use crate::encoding::{
    primitives::{
        decode_required_ctx_unsigned, decode_unsigned, encode_ctx_object_id, encode_ctx_unsigned,
    },
    reader::Reader,
    tag::Tag,
    writer::Writer,
};
use crate::services::decode_required_ctx_object_id;
use crate::services::value_codec::decode_values_until_closing;
use crate::types::{DataValue, ObjectId, PropertyId};
use crate::DecodeError;

pub const SERVICE_READ_PROPERTY_MULTIPLE: u8 = 0x0E;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyReference {
    pub property_id: PropertyId,
    pub array_index: Option<u32>,
}

impl PropertyReference {
    pub const fn new(property_id: PropertyId) -> Self {
        Self {
            property_id,
            array_index: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadAccessSpecification {
    pub object_id: ObjectId,
    pub properties: Vec<PropertyReference>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadPropertyMultipleRequest<'a> {
    pub specs: &'a [ReadAccessSpecification],
    pub invoke_id: u8,
}

impl ReadPropertyMultipleRequest<'_> {
    pub fn encode(&self, w: &mut Writer) {
        ConfirmedRequestHeader::new(self.invoke_id, SERVICE_READ_PROPERTY_MULTIPLE).encode(w);
        for spec in self.specs {
            encode_ctx_object_id(w, 0, spec.object_id.raw());
            Tag::Opening { tag_num: 1 }.encode(w);
            for prop in &spec.properties {
                encode_ctx_unsigned(w, 0, prop.property_id.to_u32());
                if let Some(idx) = prop.array_index {
                    encode_ctx_unsigned(w, 1, idx);
                }
            }
            Tag::Closing { tag_num: 1 }.encode(w);
        }
    }
}

/// Error class and code reported for a single property of an RPM reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyAccessError {
    pub error_class: u32,
    pub error_code: u32,
}

/// Why one property of an RPM reply carries no value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadResultError {
    /// The device answered with an error for this property.
    Access(PropertyAccessError),
    /// The device sent a value this crate cannot represent.
    Undecodable(DecodeError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReadResultElement {
    pub property_id: PropertyId,
    pub array_index: Option<u32>,
    pub value: Result<DataValue, ReadResultError>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReadAccessResult {
    pub object_id: ObjectId,
    pub results: Vec<ReadResultElement>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReadPropertyMultipleAck {
    pub results: Vec<ReadAccessResult>,
}

impl ReadPropertyMultipleAck {
    pub fn decode_after_header(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        let mut all_results = Vec::new();

        while !r.is_empty() {
            let object_id = decode_required_ctx_object_id(r, 0)?;
            if Tag::decode(r)? != (Tag::Opening { tag_num: 1 }) {
                return Err(DecodeError::InvalidTag);
            }

            let mut elements = Vec::new();
            loop {
                let tag = Tag::decode(r)?;
                if tag.closes(1) {
                    break;
                }
                let property_id = match tag {
                    Tag::Context { tag_num: 2, len } => {
                        PropertyId::from_u32(decode_unsigned(r, len as usize)?)
                    }
                    _ => return Err(DecodeError::InvalidTag),
                };

                let (array_index, result_open) = match Tag::decode(r)? {
                    Tag::Context { tag_num: 3, len } => {
                        let idx = decode_unsigned(r, len as usize)?;
                        (Some(idx), Tag::decode(r)?)
                    }
                    other => (None, other),
                };

                let value = match result_open {
                    Tag::Opening { tag_num: 4 } => {
                        decode_values_until_closing(r, 4)?.map_err(ReadResultError::Undecodable)
                    }
                    Tag::Opening { tag_num: 5 } => {
                        let error_class = decode_required_ctx_unsigned(r, 0)?;
                        let error_code = decode_required_ctx_unsigned(r, 1)?;
                        if !Tag::decode(r)?.closes(5) {
                            return Err(DecodeError::InvalidTag);
                        }
                        Err(ReadResultError::Access(PropertyAccessError {
                            error_class,
                            error_code,
                        }))
                    }
                    _ => return Err(DecodeError::InvalidTag),
                };

                elements.push(ReadResultElement {
                    property_id,
                    array_index,
                    value,
                });
            }

            all_results.push(ReadAccessResult {
                object_id,
                results: elements,
            });
        }

        Ok(Self {
            results: all_results,
        })
    }
}
