//! The tables the host loads a world from: game, items, locations, regions and categories.

use {
    std::collections::BTreeMap,
    itertools::Itertools as _,
    serde::Serialize,
    crate::{
        Hp,
        card::{
            self,
            CardRepository,
            Pack,
        },
        distribution::{
            self,
            cumulative_percentages,
            histogram,
        },
    },
};
pub use self::{
    category::Category,
    item::{
        FILLER_NAMES,
        Item,
        ItemMetadata,
    },
    location::{
        CHALLENGE_TRIAL,
        Handicap,
        Location,
        NORMAL_TRIAL,
        VICTORY_CATEGORY,
        VICTORY_LOCATION,
    },
    region::{
        Region,
        RegionTable,
    },
};

mod category;
mod item;
mod location;
mod region;

fn is_false(b: &bool) -> bool { !*b }

pub fn tier_name(hp: Hp) -> String {
    format!("{hp} HP")
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)] Card(#[from] card::Error),
    #[error(transparent)] Distribution(#[from] distribution::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Game {
    pub game: String,
    pub creator: String,
    pub filler_item_name: String,
}

impl Default for Game {
    fn default() -> Self {
        Self {
            game: format!("PokemonTCGAges"),
            creator: format!("Fuzzy"),
            filler_item_name: format!("favorite Digimon card"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tables {
    pub game: Game,
    pub items: Vec<Item>,
    pub locations: Vec<Location>,
    pub regions: RegionTable,
    pub categories: BTreeMap<String, Category>,
}

impl Tables {
    /// Reads every listed pack once and builds all tables from that snapshot.
    pub fn build(repo: &CardRepository) -> Result<Self, Error> {
        let packs = repo.list_packs()?.iter().map(|pack| repo.load_pack(pack)).collect::<Result<Vec<_>, _>>()?;
        Self::from_packs(&packs)
    }

    pub fn from_packs(packs: &[Pack]) -> Result<Self, Error> {
        let histograms = packs.iter().map(|pack| histogram(&pack.cards)).collect_vec();
        let percentages = packs.iter()
            .zip(&histograms)
            .filter(|(_, histogram)| !histogram.is_empty())
            .map(|(pack, histogram)| cumulative_percentages(&pack.name, histogram))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            game: Game::default(),
            items: item::build(packs),
            locations: location::build(packs.iter().map(|pack| &*pack.name).zip(&histograms)),
            regions: region::build(&percentages),
            categories: category::build(packs),
        })
    }

    pub fn item(&self, name: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.name == name)
    }
}
