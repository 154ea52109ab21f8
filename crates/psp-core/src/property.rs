//! Closed property node union and its typed constructors/accessors.
//!
//! A node mirrors one entry of the engine's property tree. In-place writes
//! keep the node's kind (an `Int` stays an `Int`, a `Byte` stays a `Byte`)
//! so the tree can be re-serialized as-is.
use uuid::Uuid;

use crate::error::PropertyError;
use crate::item_slot::ItemSlotRecord;
use crate::model::GameEnum;

#[derive(Debug, Clone, PartialEq)]
pub enum Property {
    Int(i32),
    Int64(i64),
    Byte(u8),
    Float(f32),
    Str(String),
    Name(String),
    Bool(bool),
    /// `value` carries the prefixed wire form, e.g. `EPalGenderType::Female`.
    Enum {
        enum_type: String,
        value: String,
    },
    /// `StructProperty` of struct type `Guid`.
    Guid(Uuid),
    /// Bare guid inside a custom-decoded payload (no property wrapper).
    RawGuid(Uuid),
    /// Raw fixed-point payload (value * 1000).
    FixedPoint64(i64),
    Struct {
        struct_type: String,
        struct_id: Uuid,
        value: PropertyMap,
    },
    Array(ArrayProperty),
    /// Untyped container: map entries and custom-decoded payload objects.
    Map(PropertyMap),
    /// Subtree kept verbatim because nothing here interprets it.
    Opaque(serde_json::Value),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayType {
    Enum,
    Name,
    Str,
    Struct,
    Byte,
}

impl ArrayType {
    pub fn type_name(self) -> &'static str {
        match self {
            ArrayType::Enum => "EnumProperty",
            ArrayType::Name => "NameProperty",
            ArrayType::Str => "StrProperty",
            ArrayType::Struct => "StructProperty",
            ArrayType::Byte => "ByteProperty",
        }
    }
    pub fn from_type_name(name: &str) -> Option<Self> {
        Some(match name {
            "EnumProperty" => ArrayType::Enum,
            "NameProperty" => ArrayType::Name,
            "StrProperty" => ArrayType::Str,
            "StructProperty" => ArrayType::Struct,
            "ByteProperty" => ArrayType::Byte,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayProperty {
    pub array_type: ArrayType,
    /// Set when the payload was decoded by a custom codec (raw data, item slots).
    pub custom_type: Option<String>,
    pub value: ArrayValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArrayValue {
    /// Enum, name and string elements; the element tag lives on the array.
    Values(Vec<String>),
    Structs {
        prop_name: String,
        type_name: String,
        id: Uuid,
        values: Vec<Property>,
    },
    Bytes(Vec<u8>),
    Decoded(Box<Property>),
    Slot(Option<ItemSlotRecord>),
}

impl ArrayValue {
    pub fn kind(&self) -> &'static str {
        match self {
            ArrayValue::Values(_) => "values",
            ArrayValue::Structs { .. } => "structs",
            ArrayValue::Bytes(_) => "bytes",
            ArrayValue::Decoded(_) => "decoded",
            ArrayValue::Slot(_) => "item slot",
        }
    }
}

/// Ordered member list; order is part of the serialized form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyMap(Vec<(String, Property)>);

impl PropertyMap {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    pub fn get(&self, key: &str) -> Option<&Property> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Property> {
        self.0.iter_mut().find(|(k, _)| k == key).map(|(_, v)| v)
    }
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
    /// Replaces an existing member in place or appends a new one.
    pub fn insert(&mut self, key: impl Into<String>, value: Property) -> Option<Property> {
        let key = key.into();
        match self.get_mut(&key) {
            Some(slot) => Some(std::mem::replace(slot, value)),
            None => {
                self.0.push((key, value));
                None
            }
        }
    }
    pub fn remove(&mut self, key: &str) -> Option<Property> {
        let idx = self.0.iter().position(|(k, _)| k == key)?;
        Some(self.0.remove(idx).1)
    }
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Property)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>> FromIterator<(K, Property)> for PropertyMap {
    fn from_iter<I: IntoIterator<Item = (K, Property)>>(iter: I) -> Self {
        let mut map = PropertyMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl Property {
    pub fn int(v: i32) -> Self {
        Property::Int(v)
    }
    pub fn int64(v: i64) -> Self {
        Property::Int64(v)
    }
    pub fn float(v: f32) -> Self {
        Property::Float(v)
    }
    pub fn string(v: impl Into<String>) -> Self {
        Property::Str(v.into())
    }
    pub fn name(v: impl Into<String>) -> Self {
        Property::Name(v.into())
    }
    pub fn boolean(v: bool) -> Self {
        Property::Bool(v)
    }
    pub fn guid(v: Uuid) -> Self {
        Property::Guid(v)
    }
    pub fn fixed_point64(v: i64) -> Self {
        Property::FixedPoint64(v)
    }
    /// `value` must already be in prefixed form.
    pub fn enumeration(enum_type: impl Into<String>, value: impl Into<String>) -> Self {
        Property::Enum {
            enum_type: enum_type.into(),
            value: value.into(),
        }
    }
    pub fn game_enum<E: GameEnum>(value: E) -> Self {
        Property::enumeration(E::ENUM_TYPE, value.prefixed())
    }
    pub fn array_values(array_type: ArrayType, values: Vec<String>) -> Self {
        Property::Array(ArrayProperty {
            array_type,
            custom_type: None,
            value: ArrayValue::Values(values),
        })
    }
    pub fn structure(struct_type: impl Into<String>, members: PropertyMap) -> Self {
        Property::Struct {
            struct_type: struct_type.into(),
            struct_id: Uuid::nil(),
            value: members,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Property::Int(_) => "IntProperty",
            Property::Int64(_) => "Int64Property",
            Property::Byte(_) => "ByteProperty",
            Property::Float(_) => "FloatProperty",
            Property::Str(_) => "StrProperty",
            Property::Name(_) => "NameProperty",
            Property::Bool(_) => "BoolProperty",
            Property::Enum { .. } => "EnumProperty",
            Property::Guid(_) | Property::RawGuid(_) => "Guid",
            Property::FixedPoint64(_) => "FixedPoint64",
            Property::Struct { .. } => "StructProperty",
            Property::Array(_) => "ArrayProperty",
            Property::Map(_) => "Map",
            Property::Opaque(_) => "Opaque",
        }
    }

    pub fn members(&self) -> Option<&PropertyMap> {
        match self {
            Property::Struct { value, .. } | Property::Map(value) => Some(value),
            _ => None,
        }
    }
    pub fn members_mut(&mut self) -> Option<&mut PropertyMap> {
        match self {
            Property::Struct { value, .. } | Property::Map(value) => Some(value),
            _ => None,
        }
    }

    /// Prefixed enum value.
    pub fn enum_value(&self) -> Option<&str> {
        match self {
            Property::Enum { value, .. } => Some(value),
            _ => None,
        }
    }
    pub fn set_enum_value(&mut self, new: impl Into<String>) -> Result<(), PropertyError> {
        match self {
            Property::Enum { value, .. } => {
                *value = new.into();
                Ok(())
            }
            other => Err(PropertyError::KindMismatch {
                kind: other.kind(),
                value: "enum",
            }),
        }
    }
    pub fn game_enum_value<E: GameEnum>(&self) -> Option<E> {
        self.enum_value().and_then(E::from_prefixed)
    }

    pub fn fixed_point64_value(&self) -> Option<i64> {
        match self {
            Property::FixedPoint64(v) => Some(*v),
            _ => None,
        }
    }
    pub fn set_fixed_point64(&mut self, new: i64) -> Result<(), PropertyError> {
        match self {
            Property::FixedPoint64(v) => {
                *v = new;
                Ok(())
            }
            other => Err(PropertyError::KindMismatch {
                kind: other.kind(),
                value: "fixed point",
            }),
        }
    }

    pub fn array_values_ref(&self) -> Option<&[String]> {
        match self {
            Property::Array(ArrayProperty {
                value: ArrayValue::Values(v),
                ..
            }) => Some(v),
            _ => None,
        }
    }
    /// Replaces the elements; the array's element type tag is left untouched.
    pub fn set_array_values(&mut self, values: Vec<String>) -> Result<(), PropertyError> {
        match self {
            Property::Array(ArrayProperty {
                value: value @ ArrayValue::Values(_),
                ..
            }) => {
                *value = ArrayValue::Values(values);
                Ok(())
            }
            other => Err(PropertyError::KindMismatch {
                kind: other.kind(),
                value: "string list",
            }),
        }
    }
    pub fn array_structs(&self) -> Option<&[Property]> {
        match self {
            Property::Array(ArrayProperty {
                value: ArrayValue::Structs { values, .. },
                ..
            }) => Some(values),
            _ => None,
        }
    }
}

/// Scalar types that can be read from and written into a property node.
pub trait PropertyValue: Sized {
    fn read(node: &Property) -> Option<Self>;
    fn write(self, node: &mut Property) -> Result<(), PropertyError>;
}

fn mismatch(node: &Property, value: &'static str) -> PropertyError {
    PropertyError::KindMismatch {
        kind: node.kind(),
        value,
    }
}

impl PropertyValue for i64 {
    fn read(node: &Property) -> Option<Self> {
        match node {
            Property::Int(v) => Some((*v).into()),
            Property::Int64(v) => Some(*v),
            Property::Byte(v) => Some((*v).into()),
            _ => None,
        }
    }
    fn write(self, node: &mut Property) -> Result<(), PropertyError> {
        let out_of_range = |kind| PropertyError::OutOfRange { kind, value: self };
        match node {
            Property::Int(v) => *v = i32::try_from(self).map_err(|_| out_of_range("IntProperty"))?,
            Property::Int64(v) => *v = self,
            Property::Byte(v) => *v = u8::try_from(self).map_err(|_| out_of_range("ByteProperty"))?,
            other => return Err(mismatch(other, "integer")),
        }
        Ok(())
    }
}

impl PropertyValue for i32 {
    fn read(node: &Property) -> Option<Self> {
        i64::read(node).and_then(|v| i32::try_from(v).ok())
    }
    fn write(self, node: &mut Property) -> Result<(), PropertyError> {
        i64::from(self).write(node)
    }
}

impl PropertyValue for f32 {
    fn read(node: &Property) -> Option<Self> {
        match node {
            Property::Float(v) => Some(*v),
            other => i64::read(other).map(|v| v as f32),
        }
    }
    fn write(self, node: &mut Property) -> Result<(), PropertyError> {
        match node {
            Property::Float(v) => {
                *v = self;
                Ok(())
            }
            other => Err(mismatch(other, "float")),
        }
    }
}

impl PropertyValue for bool {
    fn read(node: &Property) -> Option<Self> {
        match node {
            Property::Bool(v) => Some(*v),
            _ => None,
        }
    }
    fn write(self, node: &mut Property) -> Result<(), PropertyError> {
        match node {
            Property::Bool(v) => {
                *v = self;
                Ok(())
            }
            other => Err(mismatch(other, "bool")),
        }
    }
}

impl PropertyValue for String {
    fn read(node: &Property) -> Option<Self> {
        match node {
            Property::Str(v) | Property::Name(v) => Some(v.clone()),
            _ => None,
        }
    }
    fn write(self, node: &mut Property) -> Result<(), PropertyError> {
        match node {
            Property::Str(v) | Property::Name(v) => {
                *v = self;
                Ok(())
            }
            other => Err(mismatch(other, "string")),
        }
    }
}

impl PropertyValue for Uuid {
    fn read(node: &Property) -> Option<Self> {
        match node {
            Property::Guid(v) | Property::RawGuid(v) => Some(*v),
            _ => None,
        }
    }
    fn write(self, node: &mut Property) -> Result<(), PropertyError> {
        match node {
            Property::Guid(v) | Property::RawGuid(v) => {
                *v = self;
                Ok(())
            }
            other => Err(mismatch(other, "guid")),
        }
    }
}

/// The node's value, or `default` when the node is absent or of another kind.
pub fn get_value<T: PropertyValue>(node: Option<&Property>, default: T) -> T {
    node.and_then(T::read).unwrap_or(default)
}

/// Like [`get_value`] but keeps "absent" distinguishable.
pub fn get_opt<T: PropertyValue>(node: Option<&Property>) -> Option<T> {
    node.and_then(T::read)
}

pub fn set_value<T: PropertyValue>(node: &mut Property, value: T) -> Result<(), PropertyError> {
    value.write(node)
}
