// Path navigation over the property tree.
// - Segments name struct/map members, index struct arrays (`"0"`), or are the
//   literal `"value"` unwrap step wrapper kinds need.
// - `get_nested*` never fail: a missing segment yields `None`.
// - `set_nested` assigns the final segment; the parent path must exist.
use crate::error::PathError;
use crate::property::{ArrayValue, Property};

const UNWRAP: &str = "value";

// A struct's `value` wrapper is the struct itself once members are typed.
fn unwraps_to_self(node: &Property, seg: &str) -> bool {
    seg == UNWRAP && matches!(node, Property::Struct { value, .. } if !value.contains_key(seg))
}

fn step<'a>(node: &'a Property, seg: &str) -> Option<&'a Property> {
    if unwraps_to_self(node, seg) {
        return Some(node);
    }
    match node {
        Property::Struct { value, .. } | Property::Map(value) => value.get(seg),
        Property::Array(array) => match &array.value {
            ArrayValue::Decoded(inner) if seg == UNWRAP => Some(inner.as_ref()),
            ArrayValue::Structs { values, .. } => seg.parse::<usize>().ok().and_then(|i| values.get(i)),
            _ => None,
        },
        _ => None,
    }
}

fn step_mut<'a>(node: &'a mut Property, seg: &str) -> Option<&'a mut Property> {
    if unwraps_to_self(node, seg) {
        return Some(node);
    }
    match node {
        Property::Struct { value, .. } | Property::Map(value) => value.get_mut(seg),
        Property::Array(array) => match &mut array.value {
            ArrayValue::Decoded(inner) if seg == UNWRAP => Some(inner.as_mut()),
            ArrayValue::Structs { values, .. } => {
                seg.parse::<usize>().ok().and_then(|i| values.get_mut(i))
            }
            _ => None,
        },
        _ => None,
    }
}

pub fn get_nested<'a>(tree: &'a Property, path: &[&str]) -> Option<&'a Property> {
    path.iter().try_fold(tree, |node, seg| step(node, seg))
}

pub fn get_nested_mut<'a>(tree: &'a mut Property, path: &[&str]) -> Option<&'a mut Property> {
    let mut cur = tree;
    for seg in path {
        cur = step_mut(cur, seg)?;
    }
    Some(cur)
}

pub fn set_nested(tree: &mut Property, path: &[&str], value: Property) -> Result<(), PathError> {
    let (last, parent_path) = path.split_last().ok_or(PathError::Empty)?;
    let parent = get_nested_mut(tree, parent_path)
        .ok_or_else(|| PathError::NotFound(parent_path.join(".")))?;
    let kind = parent.kind();
    let members = parent.members_mut().ok_or_else(|| PathError::NotAContainer {
        path: parent_path.join("."),
        kind,
    })?;
    members.insert(*last, value);
    Ok(())
}

/// Removes the member at `path` if it exists.
pub fn remove_nested(tree: &mut Property, path: &[&str]) -> Option<Property> {
    let (last, parent_path) = path.split_last()?;
    get_nested_mut(tree, parent_path)?.members_mut()?.remove(last)
}
