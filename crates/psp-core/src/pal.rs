//! Typed overlay over one `CharacterSaveParameterMap` entry.
//!
//! A [`Pal`] is parsed once from its record, edited through its public
//! fields, and written back with [`Pal::update`]. The record stays owned by
//! the pal; only projection steps touch it.
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::PalDefaults;
use crate::error::{PropertyError, SyncError};
use crate::model::{Element, EntryState, GameEnum, PalGender, WorkSuitability};
use crate::property::{
    ArrayType, Property, PropertyMap, PropertyValue, get_opt, get_value, set_value,
};
use crate::tree::{get_nested, get_nested_mut, set_nested};

const INSTANCE_ID_PATH: &[&str] = &["key", "InstanceId"];
const SAVE_PARAMETER_PATH: &[&str] = &[
    "value",
    "RawData",
    "value",
    "object",
    "SaveParameter",
    "value",
];
const GROUP_ID_PATH: &[&str] = &["value", "RawData", "value", "group_id"];
const SLOT_INDEX_PATH: &[&str] = &[
    "value",
    "RawData",
    "value",
    "object",
    "SaveParameter",
    "value",
    "SlotID",
    "value",
    "SlotIndex",
];
const CONTAINER_ID_PATH: &[&str] = &["value", "ContainerId", "value", "ID"];

pub const FULL_SANITY: f32 = 100.0;
const BOSS_PREFIX: &str = "BOSS_";
const SANITY: &str = "SanityValue";
// Server-side state that a healed pal must not carry.
const TRANSIENT_NODES: [&str; 4] = ["PalReviveTimer", "PhysicalHealth", "WorkerSick", "HungerType"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncState {
    #[default]
    Unparsed,
    Parsed,
    Synced,
}

/// Non-fatal problem found while parsing a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    InvalidInstanceId,
    MissingSaveParameter,
    MissingCharacterId,
    /// Node present but not readable as the expected kind; default used.
    MalformedNode(&'static str),
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::InvalidInstanceId => write!(f, "missing or invalid instance id"),
            Diagnostic::MissingSaveParameter => write!(f, "missing save parameter"),
            Diagnostic::MissingCharacterId => write!(f, "missing character id"),
            Diagnostic::MalformedNode(key) => write!(f, "malformed {key} node"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ParsedPal {
    pub pal: Pal,
    pub diagnostics: Vec<Diagnostic>,
}

impl ParsedPal {
    /// True when extraction ran to the end.
    pub fn is_complete(&self) -> bool {
        !self.diagnostics.iter().any(|d| {
            matches!(
                d,
                Diagnostic::InvalidInstanceId
                    | Diagnostic::MissingSaveParameter
                    | Diagnostic::MissingCharacterId
            )
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pal {
    pub instance_id: Option<Uuid>,
    pub owner_uid: Option<Uuid>,
    pub is_lucky: bool,
    pub is_boss: bool,
    pub character_id: Option<String>,
    pub gender: Option<PalGender>,
    pub work_speed: f32,
    pub rank_hp: i32,
    pub rank_attack: i32,
    pub rank_defense: i32,
    pub rank_craftspeed: i32,
    pub talent_hp: i32,
    pub talent_melee: i32,
    pub talent_shot: i32,
    pub talent_defense: i32,
    pub rank: i32,
    pub level: i32,
    pub nickname: Option<String>,
    pub is_tower: bool,
    pub storage_id: Option<Uuid>,
    pub stomach: f32,
    pub max_stomach: f32,
    pub storage_slot: i32,
    pub learned_skills: Vec<String>,
    pub active_skills: Vec<String>,
    pub passive_skills: Vec<String>,
    pub work_suitabilities: BTreeMap<String, i32>,
    pub hp: i64,
    pub max_hp: i64,
    pub elements: Vec<Element>,
    pub state: EntryState,
    pub group_id: Option<Uuid>,
    pub sanity: f32,

    #[serde(skip, default = "empty_record")]
    character_save: Property,
    #[serde(skip)]
    sync_state: SyncState,
}

fn empty_record() -> Property {
    Property::Map(PropertyMap::new())
}

impl Default for Pal {
    fn default() -> Self {
        Self {
            instance_id: None,
            owner_uid: None,
            is_lucky: false,
            is_boss: false,
            character_id: None,
            gender: None,
            work_speed: 0.0,
            rank_hp: 0,
            rank_attack: 0,
            rank_defense: 0,
            rank_craftspeed: 0,
            talent_hp: 0,
            talent_melee: 0,
            talent_shot: 0,
            talent_defense: 0,
            rank: 1,
            level: 1,
            nickname: None,
            is_tower: false,
            storage_id: None,
            stomach: 0.0,
            max_stomach: 0.0,
            storage_slot: 0,
            learned_skills: Vec::new(),
            active_skills: Vec::new(),
            passive_skills: Vec::new(),
            work_suitabilities: BTreeMap::new(),
            hp: 0,
            max_hp: 0,
            elements: Vec::new(),
            state: EntryState::None,
            group_id: None,
            sanity: 0.0,
            character_save: empty_record(),
            sync_state: SyncState::Unparsed,
        }
    }
}

/// Reads save parameter members, noting unreadable ones.
struct Extractor<'a> {
    param: &'a PropertyMap,
    diagnostics: &'a mut Vec<Diagnostic>,
}

impl Extractor<'_> {
    fn opt<T: PropertyValue>(&mut self, key: &'static str) -> Option<T> {
        let node = self.param.get(key)?;
        let value = T::read(node);
        if value.is_none() {
            warn!(node = key, kind = node.kind(), "unreadable node, using default");
            self.diagnostics.push(Diagnostic::MalformedNode(key));
        }
        value
    }
    fn read<T: PropertyValue>(&mut self, key: &'static str, default: T) -> T {
        self.opt(key).unwrap_or(default)
    }
    fn strings(&self, key: &str) -> Vec<String> {
        self.param
            .get(key)
            .and_then(Property::array_values_ref)
            .map(<[String]>::to_vec)
            .unwrap_or_default()
    }
}

/// Strips a `boss_` prefix and canonicalizes ids the game spells inconsistently.
/// Returns the id and whether it names a boss.
pub fn normalize_character_id(raw: &str, is_lucky: bool) -> (String, bool) {
    let (id, boss) = match raw.get(..BOSS_PREFIX.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(BOSS_PREFIX) => {
            (&raw[BOSS_PREFIX.len()..], !is_lucky)
        }
        _ => (raw, false),
    };
    let id = match id.to_ascii_lowercase().as_str() {
        "lazycatfish" => "LazyCatfish".to_owned(),
        "sheepball" => "Sheepball".to_owned(),
        _ => id.to_owned(),
    };
    (id, boss)
}

// Mutate in place when the node exists with a compatible kind, otherwise
// insert a fresh node.
fn upsert<V: Clone>(
    param: &mut PropertyMap,
    key: &str,
    value: V,
    write: impl FnOnce(&mut Property, V) -> Result<(), PropertyError>,
    fresh: impl FnOnce(V) -> Property,
) {
    if let Some(node) = param.get_mut(key) {
        match write(node, value.clone()) {
            Ok(()) => return,
            Err(e) => warn!(node = key, error = %e, "replacing node of unexpected kind"),
        }
    }
    param.insert(key, fresh(value));
}

fn upsert_rank(param: &mut PropertyMap, key: &str, value: i32, stored: i32) {
    if value < 1 {
        if param.remove(key).is_some() {
            debug!(node = key, "rank unset, node removed");
        }
        return;
    }
    upsert(param, key, stored, set_value, Property::int);
}

impl Pal {
    pub fn from_character_save(record: Property) -> ParsedPal {
        Self::from_character_save_with(record, &PalDefaults::default())
    }

    pub fn from_character_save_with(record: Property, defaults: &PalDefaults) -> ParsedPal {
        let mut pal = Pal::default();
        let mut diagnostics = Vec::new();
        if let Err(d) = pal.extract(&record, defaults, &mut diagnostics) {
            error!(diagnostic = %d, instance_id = ?pal.instance_id, "failed to parse pal");
            diagnostics.push(d);
        }
        pal.character_save = record;
        pal.sync_state = SyncState::Parsed;
        ParsedPal { pal, diagnostics }
    }

    fn extract(
        &mut self,
        record: &Property,
        defaults: &PalDefaults,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<(), Diagnostic> {
        self.instance_id =
            get_opt::<Uuid>(get_nested(record, INSTANCE_ID_PATH)).filter(|id| !id.is_nil());
        if self.instance_id.is_none() {
            return Err(Diagnostic::InvalidInstanceId);
        }
        let param = get_nested(record, SAVE_PARAMETER_PATH)
            .and_then(Property::members)
            .ok_or(Diagnostic::MissingSaveParameter)?;
        let mut ex = Extractor { param, diagnostics };

        let character_id = ex
            .opt::<String>("CharacterID")
            .filter(|id| !id.is_empty())
            .ok_or(Diagnostic::MissingCharacterId)?;
        self.owner_uid = ex.opt("OwnerPlayerUId");
        self.is_lucky = ex.read("IsRarePal", false);
        self.work_speed = ex.read("CraftSpeed", 0.0);
        self.nickname = ex.opt("NickName");
        self.group_id =
            get_opt::<Uuid>(get_nested(record, GROUP_ID_PATH)).filter(|id| !id.is_nil());

        let (character_id, is_boss) = normalize_character_id(&character_id, self.is_lucky);
        self.character_id = Some(character_id);
        self.is_boss = is_boss;

        self.gender = match param.get("Gender") {
            Some(node @ Property::Enum { .. }) => node.game_enum_value(),
            Some(node) => {
                warn!(node = "Gender", kind = node.kind(), "unreadable node, gender left unset");
                ex.diagnostics.push(Diagnostic::MalformedNode("Gender"));
                None
            }
            None => Some(defaults.gender),
        };

        self.talent_hp = ex.read("Talent_HP", 0);
        self.talent_melee = ex.read("Talent_Melee", 0);
        self.talent_shot = ex.read("Talent_Shot", 0);
        self.talent_defense = ex.read("Talent_Defense", 0);

        self.rank = ex.read("Rank", 0);
        self.rank_hp = ex.read("Rank_HP", 0);
        self.rank_attack = ex.read("Rank_Attack", 0);
        self.rank_defense = ex.read("Rank_Defence", 0);
        self.rank_craftspeed = ex.read("Rank_CraftSpeed", 0);

        self.level = ex.read("Level", defaults.level);

        if let Some(slot) = param.get("SlotID") {
            self.storage_id = get_opt(get_nested(slot, CONTAINER_ID_PATH));
            self.storage_slot = get_value(get_nested(slot, &["value", "SlotIndex"]), 0);
        }

        self.learned_skills = ex.strings("MasteredWaza");
        self.passive_skills = ex.strings("PassiveSkillList");
        self.active_skills = ex.strings("EquipWaza");

        self.work_suitabilities = parse_work_suitabilities(param);

        self.hp = match param.get("Hp") {
            Some(node) => node.fixed_point64_value().unwrap_or_else(|| {
                ex.diagnostics.push(Diagnostic::MalformedNode("Hp"));
                0
            }),
            None => 0,
        };

        self.max_stomach = ex.read("MaxFullStomach", defaults.max_stomach);
        self.stomach = ex.read("FullStomach", self.max_stomach);
        self.sanity = ex.read(SANITY, defaults.sanity);

        info!(
            instance_id = ?self.instance_id,
            character_id = ?self.character_id,
            level = self.level,
            "parsed pal"
        );
        Ok(())
    }

    pub fn sync_state(&self) -> SyncState {
        self.sync_state
    }

    /// The owned record, for handing back to the archive writer.
    pub fn character_save(&self) -> &Property {
        &self.character_save
    }

    pub fn into_character_save(self) -> Property {
        self.character_save
    }

    pub fn save_parameter(&self) -> Option<&PropertyMap> {
        get_nested(&self.character_save, SAVE_PARAMETER_PATH).and_then(Property::members)
    }

    fn save_parameter_mut(&mut self) -> Result<&mut PropertyMap, SyncError> {
        get_nested_mut(&mut self.character_save, SAVE_PARAMETER_PATH)
            .and_then(Property::members_mut)
            .ok_or(SyncError::MissingSaveParameter)
    }

    /// Projects every editable field back into the record, then heals.
    pub fn update(&mut self) -> Result<(), SyncError> {
        self.save_parameter_mut()?;
        self.update_character_id()?;
        self.update_nickname()?;
        self.update_gender()?;
        self.update_equip_waza()?;
        self.update_mastered_waza()?;
        self.update_passive_skills()?;
        self.update_group_id()?;
        self.update_hp()?;
        self.update_level()?;
        self.update_ranks()?;
        self.update_talents()?;
        self.heal()?;
        self.sync_state = SyncState::Synced;
        debug!(instance_id = ?self.instance_id, "pal synced");
        Ok(())
    }

    /// Replaces every typed field with `other`'s and resyncs the record.
    pub fn update_from(&mut self, other: &Pal) -> Result<(), SyncError> {
        let Pal {
            instance_id,
            owner_uid,
            is_lucky,
            is_boss,
            character_id,
            gender,
            work_speed,
            rank_hp,
            rank_attack,
            rank_defense,
            rank_craftspeed,
            talent_hp,
            talent_melee,
            talent_shot,
            talent_defense,
            rank,
            level,
            nickname,
            is_tower,
            storage_id,
            stomach,
            max_stomach,
            storage_slot,
            learned_skills,
            active_skills,
            passive_skills,
            work_suitabilities,
            hp,
            max_hp,
            elements,
            state,
            group_id,
            sanity,
            character_save: _,
            sync_state: _,
        } = other;
        self.instance_id = *instance_id;
        self.owner_uid = *owner_uid;
        self.is_lucky = *is_lucky;
        self.is_boss = *is_boss;
        self.character_id = character_id.clone();
        self.gender = *gender;
        self.work_speed = *work_speed;
        self.rank_hp = *rank_hp;
        self.rank_attack = *rank_attack;
        self.rank_defense = *rank_defense;
        self.rank_craftspeed = *rank_craftspeed;
        self.talent_hp = *talent_hp;
        self.talent_melee = *talent_melee;
        self.talent_shot = *talent_shot;
        self.talent_defense = *talent_defense;
        self.rank = *rank;
        self.level = *level;
        self.nickname = nickname.clone();
        self.is_tower = *is_tower;
        self.storage_id = *storage_id;
        self.stomach = *stomach;
        self.max_stomach = *max_stomach;
        self.storage_slot = *storage_slot;
        self.learned_skills = learned_skills.clone();
        self.active_skills = active_skills.clone();
        self.passive_skills = passive_skills.clone();
        self.work_suitabilities = work_suitabilities.clone();
        self.hp = *hp;
        self.max_hp = *max_hp;
        self.elements = elements.clone();
        self.state = *state;
        self.group_id = *group_id;
        self.sanity = *sanity;
        self.update()
    }

    /// Deep copy with a new identity; only identity, nickname and storage
    /// slot nodes are rewritten.
    pub fn clone_with_identity(
        &self,
        instance_id: Uuid,
        slot_index: i32,
        nickname: impl Into<String>,
    ) -> Result<Pal, SyncError> {
        let mut pal = self.clone();
        pal.instance_id = Some(instance_id);
        pal.update_instance_id()?;
        pal.nickname = Some(nickname.into());
        pal.update_nickname()?;
        pal.update_slot_index(slot_index)?;
        Ok(pal)
    }

    /// Full sanity and stomach; drops transient server state.
    pub fn heal(&mut self) -> Result<(), SyncError> {
        let max_stomach = self.max_stomach;
        let param = self.save_parameter_mut()?;
        for key in TRANSIENT_NODES.into_iter().chain([SANITY]) {
            param.remove(key);
        }
        upsert(param, "FullStomach", max_stomach, set_value, Property::float);
        self.sanity = FULL_SANITY;
        self.stomach = max_stomach;
        debug!(instance_id = ?self.instance_id, "pal healed");
        Ok(())
    }

    /// Writes `is_lucky` to `IsRarePal`. Not part of [`Pal::update`].
    pub fn update_lucky(&mut self) -> Result<(), SyncError> {
        let is_lucky = self.is_lucky;
        let param = self.save_parameter_mut()?;
        if !is_lucky {
            param.remove("IsRarePal");
            return Ok(());
        }
        upsert(param, "IsRarePal", true, set_value, Property::boolean);
        Ok(())
    }

    fn update_instance_id(&mut self) -> Result<(), SyncError> {
        let Some(id) = self.instance_id else {
            return Ok(());
        };
        match get_nested_mut(&mut self.character_save, INSTANCE_ID_PATH) {
            Some(node) => set_value(node, id)?,
            None => set_nested(&mut self.character_save, INSTANCE_ID_PATH, Property::guid(id))?,
        }
        Ok(())
    }

    fn update_slot_index(&mut self, slot_index: i32) -> Result<(), SyncError> {
        let node = get_nested_mut(&mut self.character_save, SLOT_INDEX_PATH)
            .ok_or(SyncError::MissingNode("SlotID.SlotIndex"))?;
        set_value(node, slot_index)?;
        self.storage_slot = slot_index;
        Ok(())
    }

    fn update_character_id(&mut self) -> Result<(), SyncError> {
        let Some(id) = &self.character_id else {
            return Ok(());
        };
        let id = if self.is_boss || self.is_lucky {
            format!("{BOSS_PREFIX}{id}")
        } else {
            id.clone()
        };
        let param = self.save_parameter_mut()?;
        upsert(param, "CharacterID", id, set_value, Property::name);
        Ok(())
    }

    fn update_nickname(&mut self) -> Result<(), SyncError> {
        let Some(nickname) = self.nickname.clone().filter(|n| !n.is_empty()) else {
            return Ok(());
        };
        let param = self.save_parameter_mut()?;
        upsert(param, "NickName", nickname, set_value, Property::string);
        Ok(())
    }

    fn update_gender(&mut self) -> Result<(), SyncError> {
        let gender = *self.gender.get_or_insert(PalGender::Female);
        let param = self.save_parameter_mut()?;
        upsert(
            param,
            "Gender",
            gender.prefixed(),
            |node, v| node.set_enum_value(v),
            |v| Property::enumeration(PalGender::ENUM_TYPE, v),
        );
        Ok(())
    }

    fn update_skill_list(
        &mut self,
        key: &str,
        values: Vec<String>,
        array_type: ArrayType,
    ) -> Result<(), SyncError> {
        let param = self.save_parameter_mut()?;
        upsert(param, key, values, Property::set_array_values, |v| {
            Property::array_values(array_type, v)
        });
        Ok(())
    }

    fn update_equip_waza(&mut self) -> Result<(), SyncError> {
        debug!(skills = ?self.active_skills, "updating active skills");
        self.update_skill_list("EquipWaza", self.active_skills.clone(), ArrayType::Enum)
    }

    fn update_mastered_waza(&mut self) -> Result<(), SyncError> {
        self.update_skill_list("MasteredWaza", self.learned_skills.clone(), ArrayType::Enum)
    }

    fn update_passive_skills(&mut self) -> Result<(), SyncError> {
        self.update_skill_list("PassiveSkillList", self.passive_skills.clone(), ArrayType::Name)
    }

    // Only raw data that already tracks a group gets one written; an unset
    // group is stored as the nil guid.
    fn update_group_id(&mut self) -> Result<(), SyncError> {
        let group_id = self.group_id.unwrap_or_else(Uuid::nil);
        if let Some(node) = get_nested_mut(&mut self.character_save, GROUP_ID_PATH) {
            set_value(node, group_id)?;
        }
        Ok(())
    }

    fn update_hp(&mut self) -> Result<(), SyncError> {
        let hp = self.hp;
        let param = self.save_parameter_mut()?;
        upsert(param, "Hp", hp, Property::set_fixed_point64, Property::fixed_point64);
        Ok(())
    }

    fn update_level(&mut self) -> Result<(), SyncError> {
        let level = self.level;
        let param = self.save_parameter_mut()?;
        upsert(param, "Level", level, set_value, Property::int);
        Ok(())
    }

    // `Rank` is stored one above the typed value; the other ranks verbatim.
    fn update_ranks(&mut self) -> Result<(), SyncError> {
        let stored_rank = self.rank.checked_add(1).ok_or(PropertyError::OutOfRange {
            kind: "IntProperty",
            value: i64::from(self.rank) + 1,
        })?;
        let ranks = [
            ("Rank", self.rank, stored_rank),
            ("Rank_HP", self.rank_hp, self.rank_hp),
            ("Rank_Attack", self.rank_attack, self.rank_attack),
            ("Rank_Defence", self.rank_defense, self.rank_defense),
            ("Rank_CraftSpeed", self.rank_craftspeed, self.rank_craftspeed),
        ];
        let param = self.save_parameter_mut()?;
        for (key, value, stored) in ranks {
            upsert_rank(param, key, value, stored);
        }
        Ok(())
    }

    fn update_talents(&mut self) -> Result<(), SyncError> {
        let talents = [
            ("Talent_HP", self.talent_hp),
            ("Talent_Melee", self.talent_melee),
            ("Talent_Shot", self.talent_shot),
            ("Talent_Defense", self.talent_defense),
        ];
        let param = self.save_parameter_mut()?;
        for (key, value) in talents {
            upsert(param, key, value, set_value, Property::int);
        }
        Ok(())
    }
}

fn parse_work_suitabilities(param: &PropertyMap) -> BTreeMap<String, i32> {
    let Some(entries) = param.get("CraftSpeeds").and_then(Property::array_structs) else {
        return BTreeMap::new();
    };
    entries
        .iter()
        .filter_map(Property::members)
        .filter_map(|entry| {
            let kind = entry
                .get("WorkSuitability")
                .and_then(Property::game_enum_value::<WorkSuitability>)?;
            Some((kind.as_str().to_owned(), get_value(entry.get("Rank"), 0)))
        })
        .collect()
}

/// Heals each pal in turn; pals without a save parameter are skipped.
/// Returns how many were healed.
pub fn heal_all<'a>(pals: impl IntoIterator<Item = &'a mut Pal>) -> usize {
    let mut healed = 0;
    for pal in pals {
        match pal.heal() {
            Ok(()) => healed += 1,
            Err(e) => warn!(instance_id = ?pal.instance_id, error = %e, "skipping heal"),
        }
    }
    healed
}
