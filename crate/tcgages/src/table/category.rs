use {
    std::collections::BTreeMap,
    serde::Serialize,
    crate::{
        DEFAULT_PACK,
        card::Pack,
        options::toggle_option_name,
    },
    super::location::{
        CHALLENGE_TRIAL,
        Handicap,
        NORMAL_TRIAL,
    },
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub hidden: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub yaml_option: Vec<String>,
}

impl Category {
    fn hidden() -> Self {
        Self {
            hidden: true,
            yaml_option: Vec::default(),
        }
    }
}

/// Trial kinds, set names, compound card types and pack names are all hidden from the client.
pub(super) fn build(packs: &[Pack]) -> BTreeMap<String, Category> {
    let mut categories = BTreeMap::default();
    for name in [NORMAL_TRIAL, CHALLENGE_TRIAL].into_iter().chain(Handicap::ALL.iter().map(Handicap::as_str)) {
        categories.insert(name.to_owned(), Category::hidden());
    }
    for pack in packs {
        for card in &pack.cards {
            categories.entry(card.set_name.clone()).or_insert_with(Category::hidden);
            if card.is_compound_type() {
                categories.entry(card.card_type.clone()).or_insert_with(Category::hidden);
            }
        }
    }
    for pack in packs {
        let category = categories.entry(pack.name.clone()).or_insert_with(Category::hidden);
        if pack.name != DEFAULT_PACK {
            category.yaml_option = vec![toggle_option_name(&pack.name)];
        }
    }
    categories
}
