pub mod card;
pub mod distribution;
pub mod generate;
pub mod options;
pub mod requires;
pub mod rules;
pub mod table;
#[cfg(test)] mod fixture;

/// The pack that is always included, regardless of the `packs` option.
pub const DEFAULT_PACK: &str = "_default";

/// Cards below this HP are beatable with almost nothing received, so their regions are ungated.
pub const INTRO_HP_THRESHOLD: Hp = 60;

pub const POKEMON: &str = "Pokemon";
pub const SUPPORTER_DRAW: &str = "Supporter - Draw";
pub const SUPPORTER_SEARCH: &str = "Supporter - Search";
pub const TRAINER_SEARCH: &str = "Trainer - Search";

/// Separates a card's root type from its subtype, as in `Pokemon - Lightning`.
pub const TYPE_SEPARATOR: &str = " - ";

pub type Hp = u16;
