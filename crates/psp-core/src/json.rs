// Conversion between the save tools' JSON tree and `Property`.
// - Property objects carry `"type"`; objects without it become `Map` nodes.
// - Bare uuid strings inside maps become `RawGuid`, other bare values `Opaque`.
// - Kinds with no typed variant are kept verbatim as `Opaque`.
use serde_json::{Map, Value as J, json};
use uuid::Uuid;

use crate::error::JsonError;
use crate::item_slot::ItemSlotRecord;
use crate::property::{ArrayProperty, ArrayType, ArrayValue, Property, PropertyMap};

const NIL_GUID: &str = "00000000-0000-0000-0000-000000000000";

/// Any tree node: a typed property, or a plain container/value.
pub fn property_from_json(v: &J) -> Result<Property, JsonError> {
    match v {
        J::Object(obj) => match obj.get("type").and_then(J::as_str) {
            Some(kind) => typed_from_json(kind, obj, v),
            None => Ok(Property::Map(map_from_json(obj)?)),
        },
        J::String(s) => Ok(Uuid::parse_str(s)
            .map(Property::RawGuid)
            .unwrap_or_else(|_| Property::Opaque(v.clone()))),
        _ => Ok(Property::Opaque(v.clone())),
    }
}

fn map_from_json(obj: &Map<String, J>) -> Result<PropertyMap, JsonError> {
    obj.iter()
        .map(|(k, v)| property_from_json(v).map(|p| (k.as_str(), p)))
        .collect()
}

fn field<'a>(
    obj: &'a Map<String, J>,
    context: &'static str,
    name: &'static str,
) -> Result<&'a J, JsonError> {
    obj.get(name).ok_or(JsonError::MissingField { context, field: name })
}

fn parse_guid(s: &str) -> Result<Uuid, JsonError> {
    Uuid::parse_str(s).map_err(|_| JsonError::InvalidGuid(s.to_owned()))
}

fn invalid(context: &'static str, expected: &'static str) -> JsonError {
    JsonError::Invalid { context, expected }
}

fn typed_from_json(kind: &str, obj: &Map<String, J>, whole: &J) -> Result<Property, JsonError> {
    let value = || field(obj, "property", "value");
    Ok(match kind {
        "IntProperty" => Property::Int(
            value()?
                .as_i64()
                .and_then(|n| i32::try_from(n).ok())
                .ok_or_else(|| invalid("IntProperty", "i32"))?,
        ),
        "Int64Property" => Property::Int64(value()?.as_i64().ok_or_else(|| invalid("Int64Property", "i64"))?),
        "FloatProperty" => Property::Float(value()?.as_f64().ok_or_else(|| invalid("FloatProperty", "number"))? as f32),
        "StrProperty" => Property::Str(value()?.as_str().ok_or_else(|| invalid("StrProperty", "string"))?.to_owned()),
        "NameProperty" => Property::Name(value()?.as_str().ok_or_else(|| invalid("NameProperty", "string"))?.to_owned()),
        "BoolProperty" => Property::Bool(value()?.as_bool().ok_or_else(|| invalid("BoolProperty", "bool"))?),
        "EnumProperty" => {
            let inner = value()?.as_object().ok_or_else(|| invalid("EnumProperty", "object"))?;
            let text = |name: &'static str| {
                field(inner, "EnumProperty", name)?
                    .as_str()
                    .map(str::to_owned)
                    .ok_or_else(|| invalid("EnumProperty", "string"))
            };
            Property::Enum {
                enum_type: text("type")?,
                value: text("value")?,
            }
        }
        "ByteProperty" => {
            let inner = value()?;
            let plain = inner.get("type").and_then(J::as_str) == Some("None");
            match inner.get("value").and_then(J::as_u64).map(u8::try_from) {
                Some(Ok(b)) if plain => Property::Byte(b),
                _ => Property::Opaque(whole.clone()),
            }
        }
        "StructProperty" => struct_from_json(obj, whole)?,
        "ArrayProperty" => array_from_json(obj, whole)?,
        _ => Property::Opaque(whole.clone()),
    })
}

fn struct_from_json(obj: &Map<String, J>, whole: &J) -> Result<Property, JsonError> {
    let struct_type = field(obj, "StructProperty", "struct_type")?
        .as_str()
        .ok_or_else(|| invalid("StructProperty", "struct_type string"))?;
    let value = field(obj, "StructProperty", "value")?;
    match struct_type {
        "Guid" => {
            let s = value.as_str().ok_or_else(|| invalid("Guid", "string"))?;
            return Ok(Property::Guid(parse_guid(s)?));
        }
        "FixedPoint64" => {
            let raw = value
                .pointer("/Value/value")
                .and_then(J::as_i64)
                .ok_or_else(|| invalid("FixedPoint64", "Value.value integer"))?;
            return Ok(Property::FixedPoint64(raw));
        }
        _ => {}
    }
    // Structs whose members are not all properties (vectors, timestamps...)
    // stay opaque.
    let Some(members) = value.as_object() else {
        return Ok(Property::Opaque(whole.clone()));
    };
    if !members.values().all(|m| m.get("type").is_some_and(J::is_string)) {
        return Ok(Property::Opaque(whole.clone()));
    }
    let struct_id = match obj.get("struct_id").and_then(J::as_str) {
        Some(s) => parse_guid(s)?,
        None => Uuid::nil(),
    };
    Ok(Property::Struct {
        struct_type: struct_type.to_owned(),
        struct_id,
        value: map_from_json(members)?,
    })
}

fn strings_from_json(values: &[J], context: &'static str) -> Result<Vec<String>, JsonError> {
    values
        .iter()
        .map(|v| v.as_str().map(str::to_owned).ok_or_else(|| invalid(context, "string elements")))
        .collect()
}

fn array_from_json(obj: &Map<String, J>, whole: &J) -> Result<Property, JsonError> {
    let type_name = field(obj, "ArrayProperty", "array_type")?
        .as_str()
        .ok_or_else(|| invalid("ArrayProperty", "array_type string"))?;
    let Some(array_type) = ArrayType::from_type_name(type_name) else {
        return Ok(Property::Opaque(whole.clone()));
    };
    let custom_type = obj.get("custom_type").and_then(J::as_str).map(str::to_owned);
    let value = field(obj, "ArrayProperty", "value")?;

    let array_value = if custom_type.is_some() {
        match value {
            J::Null => ArrayValue::Slot(None),
            J::Object(o) if o.contains_key("slot_index") => {
                let record: ItemSlotRecord = serde_json::from_value(value.clone())
                    .map_err(|_| invalid("item slot", "slot record"))?;
                ArrayValue::Slot(Some(record))
            }
            J::Object(o) => ArrayValue::Decoded(Box::new(Property::Map(map_from_json(o)?))),
            _ => return Ok(Property::Opaque(whole.clone())),
        }
    } else {
        let values = value
            .get("values")
            .and_then(J::as_array)
            .ok_or_else(|| invalid("ArrayProperty", "values list"))?;
        match array_type {
            ArrayType::Enum | ArrayType::Name | ArrayType::Str => {
                ArrayValue::Values(strings_from_json(values, "ArrayProperty")?)
            }
            ArrayType::Byte => ArrayValue::Bytes(
                values
                    .iter()
                    .map(|b| b.as_u64().and_then(|b| u8::try_from(b).ok()))
                    .collect::<Option<Vec<u8>>>()
                    .ok_or_else(|| invalid("ArrayProperty", "byte elements"))?,
            ),
            ArrayType::Struct => {
                let text = |name: &str| value.get(name).and_then(J::as_str).unwrap_or_default().to_owned();
                let type_name = text("type_name");
                let id = match value.get("id").and_then(J::as_str) {
                    Some(s) => parse_guid(s)?,
                    None => Uuid::nil(),
                };
                let elements = values
                    .iter()
                    .map(|e| -> Result<Property, JsonError> {
                        let members = e.as_object().ok_or_else(|| invalid("struct array", "object elements"))?;
                        Ok(Property::Struct {
                            struct_type: type_name.clone(),
                            struct_id: Uuid::nil(),
                            value: map_from_json(members)?,
                        })
                    })
                    .collect::<Result<Vec<_>, JsonError>>()?;
                ArrayValue::Structs {
                    prop_name: text("prop_name"),
                    type_name,
                    id,
                    values: elements,
                }
            }
        }
    };
    Ok(Property::Array(ArrayProperty {
        array_type,
        custom_type,
        value: array_value,
    }))
}

fn members_to_json(map: &PropertyMap) -> J {
    J::Object(map.iter().map(|(k, v)| (k.to_owned(), property_to_json(v))).collect())
}

fn plain(kind: &str, value: J) -> J {
    json!({ "id": null, "value": value, "type": kind })
}

pub fn property_to_json(p: &Property) -> J {
    match p {
        Property::Int(v) => plain("IntProperty", json!(v)),
        Property::Int64(v) => plain("Int64Property", json!(v)),
        Property::Byte(v) => plain("ByteProperty", json!({ "type": "None", "value": v })),
        Property::Float(v) => plain("FloatProperty", json!(v)),
        Property::Str(v) => plain("StrProperty", json!(v)),
        Property::Name(v) => plain("NameProperty", json!(v)),
        Property::Bool(v) => plain("BoolProperty", json!(v)),
        Property::Enum { enum_type, value } => {
            plain("EnumProperty", json!({ "type": enum_type, "value": value }))
        }
        Property::Guid(id) => json!({
            "struct_type": "Guid",
            "struct_id": NIL_GUID,
            "id": null,
            "value": id.to_string(),
            "type": "StructProperty",
        }),
        Property::RawGuid(id) => json!(id.to_string()),
        Property::FixedPoint64(v) => json!({
            "struct_type": "FixedPoint64",
            "struct_id": NIL_GUID,
            "id": null,
            "value": { "Value": plain("Int64Property", json!(v)) },
            "type": "StructProperty",
        }),
        Property::Struct {
            struct_type,
            struct_id,
            value,
        } => json!({
            "struct_type": struct_type,
            "struct_id": struct_id.to_string(),
            "id": null,
            "value": members_to_json(value),
            "type": "StructProperty",
        }),
        Property::Array(array) => array_to_json(array),
        Property::Map(map) => members_to_json(map),
        Property::Opaque(v) => v.clone(),
    }
}

fn array_to_json(array: &ArrayProperty) -> J {
    let value = match &array.value {
        ArrayValue::Values(v) => json!({ "values": v }),
        ArrayValue::Bytes(b) => json!({ "values": b }),
        ArrayValue::Structs {
            prop_name,
            type_name,
            id,
            values,
        } => {
            let elements: Vec<J> = values
                .iter()
                .map(|e| e.members().map(members_to_json).unwrap_or_else(|| property_to_json(e)))
                .collect();
            json!({
                "prop_name": prop_name,
                "prop_type": "StructProperty",
                "values": elements,
                "type_name": type_name,
                "id": id.to_string(),
            })
        }
        ArrayValue::Decoded(inner) => property_to_json(inner),
        ArrayValue::Slot(None) => J::Null,
        ArrayValue::Slot(Some(r)) => json!({
            "slot_index": r.slot_index,
            "count": r.count,
            "static_id": r.static_id,
            "corruption_progress_value": r.corruption_progress_value,
            "local_id": r.local_id.to_string(),
        }),
    };
    let mut out = json!({
        "array_type": array.array_type.type_name(),
        "id": null,
        "value": value,
        "type": "ArrayProperty",
    });
    if let (Some(custom), J::Object(obj)) = (&array.custom_type, &mut out) {
        obj.insert("custom_type".to_owned(), json!(custom));
    }
    out
}
