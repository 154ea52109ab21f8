//! Codec for item container slot records packed into `ByteProperty` arrays.
//!
//! Layout (little-endian): `slot_index: u32`, `count: u32`, `static_id: FString`,
//! `corruption_progress_value: f32`, 12 reserved bytes, `local_id: guid`,
//! 16 reserved bytes. Reserved bytes are written as zero and ignored on read.
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::archive::{ArchiveReader, ArchiveWriter};
use crate::error::CodecError;
use crate::property::{ArrayValue, Property};

const RESERVED_HEAD: usize = 12;
const RESERVED_TAIL: usize = 16;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemSlotRecord {
    pub slot_index: u32,
    pub count: u32,
    pub static_id: String,
    pub corruption_progress_value: f32,
    pub local_id: Uuid,
}

/// `Ok(None)` for an empty payload (no item in the slot).
pub fn decode_bytes(bytes: &[u8]) -> Result<Option<ItemSlotRecord>, CodecError> {
    if bytes.is_empty() {
        return Ok(None);
    }
    let mut reader = ArchiveReader::new(bytes);
    let slot_index = reader.read_u32()?;
    let count = reader.read_u32()?;
    let static_id = reader.read_fstring()?;
    let corruption_progress_value = reader.read_f32()?;
    reader.read_slice(RESERVED_HEAD)?;
    let local_id = reader.read_guid()?;
    reader.read_slice(RESERVED_TAIL)?;
    if !reader.eof() {
        return Err(CodecError::TrailingData(reader.remaining()));
    }
    Ok(Some(ItemSlotRecord {
        slot_index,
        count,
        static_id,
        corruption_progress_value,
        local_id,
    }))
}

pub fn encode_bytes(record: Option<&ItemSlotRecord>) -> Vec<u8> {
    let Some(record) = record else {
        return Vec::new();
    };
    let mut writer = ArchiveWriter::new();
    writer.write_u32(record.slot_index);
    writer.write_u32(record.count);
    writer.write_fstring(&record.static_id);
    writer.write_f32(record.corruption_progress_value);
    writer.write_zeros(RESERVED_HEAD);
    writer.write_guid(record.local_id);
    writer.write_zeros(RESERVED_TAIL);
    writer.into_bytes()
}

/// Replaces a byte array node's raw payload with its decoded slot record.
pub fn decode_property(node: &mut Property) -> Result<(), CodecError> {
    let found = node.kind();
    let Property::Array(array) = node else {
        return Err(CodecError::TypeMismatch {
            expected: "ArrayProperty",
            found,
        });
    };
    let ArrayValue::Bytes(bytes) = &array.value else {
        return Err(CodecError::TypeMismatch {
            expected: "byte payload",
            found: array.value.kind(),
        });
    };
    array.value = ArrayValue::Slot(decode_bytes(bytes)?);
    Ok(())
}

/// Inverse of [`decode_property`]; the node goes back to a plain byte array.
pub fn encode_property(node: &mut Property) -> Result<(), CodecError> {
    let found = node.kind();
    let Property::Array(array) = node else {
        return Err(CodecError::TypeMismatch {
            expected: "ArrayProperty",
            found,
        });
    };
    let ArrayValue::Slot(record) = &array.value else {
        return Err(CodecError::TypeMismatch {
            expected: "item slot payload",
            found: array.value.kind(),
        });
    };
    array.value = ArrayValue::Bytes(encode_bytes(record.as_ref()));
    array.custom_type = None;
    Ok(())
}
