use {
    std::collections::{
        BTreeMap,
        BTreeSet,
    },
    serde::{
        Deserialize,
        Deserializer,
        Serialize,
    },
    crate::DEFAULT_PACK,
};

pub const STARTING_POKEMON_COUNT_RANGE: std::ops::RangeInclusive<u8> = 0..=10;
pub const DEFAULT_STARTING_POKEMON_COUNT: u8 = 3;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)] Json(#[from] serde_json::Error),
}

/// The name of the hidden toggle that disables a pack.
pub fn toggle_option_name(pack: &str) -> String {
    format!("pack_remove_{pack}")
}

/// Anything that isn't an integer falls back to the default. Integers outside the range are rejected.
fn deserialize_starting_pokemon_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    let serde_json::Value::Number(number) = value else { return Ok(DEFAULT_STARTING_POKEMON_COUNT) };
    let Some(count) = number.as_i64() else { return Ok(DEFAULT_STARTING_POKEMON_COUNT) };
    u8::try_from(count).ok()
        .filter(|count| STARTING_POKEMON_COUNT_RANGE.contains(count))
        .ok_or_else(|| serde::de::Error::custom(format!(
            "starting_pokemon_count must be between {} and {}, got {count}",
            STARTING_POKEMON_COUNT_RANGE.start(),
            STARTING_POKEMON_COUNT_RANGE.end(),
        )))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PlayerOptions {
    /// Packs to include beyond `_default`.
    pub packs: BTreeSet<String>,
    #[serde(deserialize_with = "deserialize_starting_pokemon_count")]
    pub starting_pokemon_count: u8,
    /// Item names that never enter the pool.
    pub banned_cards: BTreeSet<String>,
    /// Locks big-body Pokemon like EX and GX cards into the second half of the HP tiers.
    pub late_power_pokemon: bool,
}

impl Default for PlayerOptions {
    fn default() -> Self {
        Self {
            packs: BTreeSet::default(),
            starting_pokemon_count: DEFAULT_STARTING_POKEMON_COUNT,
            banned_cards: BTreeSet::default(),
            late_power_pokemon: true,
        }
    }
}

impl PlayerOptions {
    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackToggle {
    pub option_name: String,
    pub enabled: bool,
}

/// Which packs a player has enabled, built once from the pack listing. `_default` is always on and has no toggle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PackToggles(BTreeMap<String, PackToggle>);

impl PackToggles {
    pub fn new<'a>(packs: impl IntoIterator<Item = &'a str>, options: &PlayerOptions) -> Self {
        Self(
            packs.into_iter()
                .filter(|&pack| pack != DEFAULT_PACK)
                .map(|pack| (pack.to_owned(), PackToggle {
                    option_name: toggle_option_name(pack),
                    enabled: options.packs.contains(pack),
                }))
                .collect()
        )
    }

    /// Unknown packs count as disabled.
    pub fn is_enabled(&self, pack: &str) -> bool {
        pack == DEFAULT_PACK || self.0.get(pack).is_some_and(|toggle| toggle.enabled)
    }

    pub fn toggle(&self, pack: &str) -> Option<&PackToggle> {
        self.0.get(pack)
    }

    /// Packs the player turned off, in name order.
    pub fn removed(&self) -> impl Iterator<Item = &str> {
        self.0.iter().filter(|(_, toggle)| !toggle.enabled).map(|(pack, _)| &**pack)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum OptionKind {
    List,
    Range {
        start: u8,
        end: u8,
        default: u8,
    },
    Toggle {
        default: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionDefinition {
    pub name: String,
    pub display_name: String,
    pub description: String,
    #[serde(flatten)]
    pub kind: OptionKind,
    pub hidden: bool,
}

impl OptionDefinition {
    fn new(name: &str, display_name: &str, description: &str, kind: OptionKind) -> Self {
        Self {
            name: name.to_owned(),
            display_name: display_name.to_owned(),
            description: description.to_owned(),
            kind,
            hidden: false,
        }
    }
}

/// The player-facing options followed by one hidden toggle per pack other than `_default`.
pub fn option_definitions<'a>(packs: impl IntoIterator<Item = &'a str>) -> Vec<OptionDefinition> {
    let mut definitions = vec![
        OptionDefinition::new("packs", "Packs", "List of card packs to include beyond the Default set.", OptionKind::List),
        OptionDefinition::new("starting_pokemon_count", "Starting Cards Per Pack", "Number of Pokemon cards to randomly start with at the start of the playthrough.", OptionKind::Range {
            start: *STARTING_POKEMON_COUNT_RANGE.start(),
            end: *STARTING_POKEMON_COUNT_RANGE.end(),
            default: DEFAULT_STARTING_POKEMON_COUNT,
        }),
        OptionDefinition::new("banned_cards", "Banned Cards", "List of cards that should be banned from the current playthrough.", OptionKind::List),
        OptionDefinition::new("late_power_pokemon", "Late Power Pokemon", "Forces all EX/ex/GX/V Pokemon to be placed in locations in the second half of the playthrough.", OptionKind::Toggle { default: true }),
    ];
    definitions.extend(packs.into_iter().filter(|&pack| pack != DEFAULT_PACK).map(|pack| OptionDefinition {
        hidden: true,
        ..OptionDefinition::new(&toggle_option_name(pack), &format!("Remove Pack {pack}"), &format!("Whether the {pack} pack is part of the playthrough."), OptionKind::Toggle { default: true })
    }));
    definitions
}
