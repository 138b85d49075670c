use {
    std::collections::BTreeMap,
    serde::Serialize,
    crate::card::{
        Card,
        Pack,
    },
    super::is_false,
};

/// Names that can stand in for any low-value reward.
pub const FILLER_NAMES: [&str; 5] = [
    "Exodia the Flatulent One",
    "Ham Sandwich",
    "Chair For My Chair To Sit On",
    "Chris Pratt starring as Ash Ketchum",
    "Play Two Energy and See If The Opponent Notices",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ItemMetadata {
    Card(Card),
    None {},
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Item {
    pub name: String,
    pub category: Vec<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub progression: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub useful: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub filler: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    /// Named values for `ItemValue` checks, like `coins: 3`. Keys are lowercase.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub value: BTreeMap<String, usize>,
    pub metadata: ItemMetadata,
}

impl Item {
    /// Everything starts out as progression; the classification hook narrows it down later.
    pub fn from_card(pack: &str, card: &Card) -> Self {
        Self {
            name: card.item_name(),
            category: vec![
                card.root_type().to_owned(),
                card.card_type.clone(),
                card.set_name.clone(),
                pack.to_owned(),
            ],
            progression: true,
            useful: false,
            filler: false,
            count: None,
            value: BTreeMap::default(),
            metadata: ItemMetadata::Card(card.clone()),
        }
    }

    /// Defined so it can be created on demand, but never placed in the pool by itself.
    pub fn filler(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            category: Vec::default(),
            progression: false,
            useful: false,
            filler: true,
            count: Some(0),
            value: BTreeMap::default(),
            metadata: ItemMetadata::None {},
        }
    }

    pub fn has_category(&self, category: &str) -> bool {
        self.category.iter().any(|tag| tag == category)
    }

    /// How many copies go into the pool.
    pub fn pool_count(&self) -> usize {
        self.count.unwrap_or(1)
    }

    pub fn card(&self) -> Option<&Card> {
        match &self.metadata {
            ItemMetadata::Card(card) => Some(card),
            ItemMetadata::None {} => None,
        }
    }

    #[cfg(test)]
    pub(crate) fn test_card(name: &str, category: &[&str]) -> Self {
        Self {
            name: name.to_owned(),
            category: category.iter().map(|&tag| tag.to_owned()).collect(),
            progression: true,
            useful: false,
            filler: false,
            count: None,
            value: BTreeMap::default(),
            metadata: ItemMetadata::None {},
        }
    }
}

pub(super) fn build(packs: &[Pack]) -> Vec<Item> {
    packs.iter()
        .flat_map(|pack| pack.cards.iter().map(|card| Item::from_card(&pack.name, card)))
        .chain(FILLER_NAMES.into_iter().map(Item::filler))
        .collect()
}
