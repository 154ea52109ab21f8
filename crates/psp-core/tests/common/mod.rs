#![allow(dead_code)]

use psp_core::{Property, property_from_json};
use serde_json::{Value, json};

pub const NIL: &str = "00000000-0000-0000-0000-000000000000";
pub const INSTANCE_ID: &str = "6f1b2a3c-4d5e-4f60-8172-839405a6b7c8";
pub const OWNER_ID: &str = "11111111-2222-3333-4444-555555555555";
pub const GROUP_ID: &str = "99999999-8888-7777-6666-555555555555";
pub const CONTAINER_ID: &str = "0a0b0c0d-0e0f-1011-1213-141516171819";

pub fn guid_prop(id: &str) -> Value {
    json!({
        "struct_type": "Guid",
        "struct_id": NIL,
        "id": null,
        "value": id,
        "type": "StructProperty",
    })
}

pub fn plain(kind: &str, value: Value) -> Value {
    json!({ "id": null, "value": value, "type": kind })
}

pub fn enum_prop(enum_type: &str, value: &str) -> Value {
    plain("EnumProperty", json!({ "type": enum_type, "value": value }))
}

pub fn byte_prop(value: u8) -> Value {
    plain("ByteProperty", json!({ "type": "None", "value": value }))
}

pub fn struct_prop(struct_type: &str, members: Value) -> Value {
    json!({
        "struct_type": struct_type,
        "struct_id": NIL,
        "id": null,
        "value": members,
        "type": "StructProperty",
    })
}

pub fn values_array(array_type: &str, values: &[&str]) -> Value {
    json!({
        "array_type": array_type,
        "id": null,
        "value": { "values": values },
        "type": "ArrayProperty",
    })
}

pub fn fixed_point(raw: i64) -> Value {
    struct_prop("FixedPoint64", json!({ "Value": plain("Int64Property", json!(raw)) }))
}

fn craft_speed(kind: &str, rank: i32) -> Value {
    json!({
        "WorkSuitability": enum_prop("EPalWorkSuitability", &format!("EPalWorkSuitability::{kind}")),
        "Rank": plain("IntProperty", json!(rank)),
    })
}

/// A fully populated save parameter, as the save tools decode a captured pal.
pub fn full_save_parameter() -> Value {
    json!({
        "CharacterID": plain("NameProperty", json!("SheepBall")),
        "Gender": enum_prop("EPalGenderType", "EPalGenderType::Male"),
        "Level": byte_prop(12),
        "Rank": plain("IntProperty", json!(2)),
        "Rank_HP": plain("IntProperty", json!(3)),
        "Rank_Defence": plain("IntProperty", json!(1)),
        "NickName": plain("StrProperty", json!("Fluffy")),
        "Talent_HP": plain("IntProperty", json!(50)),
        "Talent_Melee": plain("IntProperty", json!(40)),
        "Talent_Shot": plain("IntProperty", json!(30)),
        "Talent_Defense": plain("IntProperty", json!(20)),
        "OwnerPlayerUId": guid_prop(OWNER_ID),
        "CraftSpeed": plain("IntProperty", json!(70)),
        "CraftSpeeds": {
            "array_type": "StructProperty",
            "id": null,
            "value": {
                "prop_name": "CraftSpeeds",
                "prop_type": "StructProperty",
                "values": [craft_speed("Handcraft", 1), craft_speed("Transport", 2)],
                "type_name": "PalWorkSuitabilityInfo",
                "id": NIL,
            },
            "type": "ArrayProperty",
        },
        "EquipWaza": values_array("EnumProperty", &["EPalWazaID::AirCanon", "EPalWazaID::SheepBall"]),
        "MasteredWaza": values_array("EnumProperty", &["EPalWazaID::AirCanon"]),
        "PassiveSkillList": values_array("NameProperty", &["PAL_ALLAttack_up1"]),
        "Hp": fixed_point(545_000),
        "MaxFullStomach": plain("FloatProperty", json!(300.0)),
        "FullStomach": plain("FloatProperty", json!(120.0)),
        "SanityValue": plain("FloatProperty", json!(80.0)),
        "SlotID": struct_prop("PalCharacterSlotId", json!({
            "ContainerId": struct_prop("PalContainerId", json!({ "ID": guid_prop(CONTAINER_ID) })),
            "SlotIndex": plain("IntProperty", json!(7)),
        })),
        "PalReviveTimer": plain("FloatProperty", json!(10.0)),
        "PhysicalHealth": enum_prop("EPalStatusPhysicalHealthType", "EPalStatusPhysicalHealthType::Injured"),
        "WorkerSick": enum_prop("EPalBaseCampWorkerSickType", "EPalBaseCampWorkerSickType::Cold"),
        "HungerType": enum_prop("EPalStatusHungerType", "EPalStatusHungerType::Hunger"),
        "LastJumpedLocation": struct_prop("Vector", json!({ "x": 1.0, "y": 2.0, "z": 3.0 })),
    })
}

/// One `CharacterSaveParameterMap` entry wrapping `save_parameter`.
pub fn record_json(instance_id: &str, save_parameter: Value) -> Value {
    json!({
        "key": {
            "PlayerUId": guid_prop(NIL),
            "InstanceId": guid_prop(instance_id),
            "DebugName": plain("StrProperty", json!("")),
        },
        "value": {
            "RawData": {
                "array_type": "ByteProperty",
                "id": null,
                "value": {
                    "object": {
                        "SaveParameter": struct_prop(
                            "PalIndividualCharacterSaveParameter",
                            save_parameter,
                        ),
                    },
                    "unknown_bytes": [0, 0, 0, 0],
                    "group_id": GROUP_ID,
                },
                "type": "ArrayProperty",
                "custom_type": ".worldSaveData.CharacterSaveParameterMap.Value.RawData",
            },
        },
    })
}

pub fn record(save_parameter: Value) -> Property {
    property_from_json(&record_json(INSTANCE_ID, save_parameter)).expect("fixture parses")
}

pub fn full_record() -> Property {
    record(full_save_parameter())
}

pub fn minimal_record(character_id: &str) -> Property {
    record(json!({ "CharacterID": plain("NameProperty", json!(character_id)) }))
}
