use serde::{Deserialize, Serialize};

/// Game enum whose wire form is `<EnumType>::<Variant>`.
pub trait GameEnum: Sized + Copy + 'static {
    const ENUM_TYPE: &'static str;
    const ALL: &'static [Self];

    fn as_str(self) -> &'static str;

    fn prefixed(self) -> String {
        format!("{}::{}", Self::ENUM_TYPE, self.as_str())
    }

    /// Accepts both the prefixed and the bare variant name.
    fn from_prefixed(s: &str) -> Option<Self> {
        let bare = s
            .strip_prefix(Self::ENUM_TYPE)
            .and_then(|rest| rest.strip_prefix("::"))
            .unwrap_or(s);
        Self::ALL.iter().copied().find(|v| v.as_str() == bare)
    }
}

macro_rules! game_enum {
    ($(#[$meta:meta])* $name:ident = $wire:literal { $($variant:ident),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl GameEnum for $name {
            const ENUM_TYPE: &'static str = $wire;
            const ALL: &'static [Self] = &[$($name::$variant),+];

            fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => stringify!($variant)),+
                }
            }
        }
    };
}

game_enum!(PalGender = "EPalGenderType" { Male, Female });

game_enum!(Element = "EPalElementType" {
    Normal,
    Fire,
    Water,
    Leaf,
    Electricity,
    Ice,
    Earth,
    Dark,
    Dragon,
});

game_enum!(
    /// Keys of a pal's work suitability map.
    WorkSuitability = "EPalWorkSuitability" {
        EmitFlame,
        Watering,
        Seeding,
        GenerateElectricity,
        Handcraft,
        Collection,
        Deforest,
        Mining,
        OilExtraction,
        ProductMedicine,
        Cool,
        Transport,
        MonsterFarm,
    }
);

/// Edit lifecycle of an entry as seen by the surrounding editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EntryState {
    #[default]
    None,
    New,
    Modified,
    Deleted,
}
