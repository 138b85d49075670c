use {
    std::collections::BTreeMap,
    crate::{
        Hp,
        card::{
            self,
            Card,
            CardRepository,
        },
    },
};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)] Card(#[from] card::Error),
    #[error("pack {pack} has no cards with HP, so it has no HP distribution")]
    EmptyDistribution {
        pack: String,
    },
}

/// How many cards have each HP, ascending. Cards without HP are left out.
pub fn histogram<'a>(cards: impl IntoIterator<Item = &'a Card>) -> BTreeMap<Hp, usize> {
    let mut histogram = BTreeMap::default();
    for card in cards {
        if card.hp > 0 {
            *histogram.entry(card.hp).or_default() += 1;
        }
    }
    histogram
}

/// For each HP, the fraction of cards with at most that HP.
///
/// The last entry is always 1.0.
pub fn cumulative_percentages(pack: &str, histogram: &BTreeMap<Hp, usize>) -> Result<BTreeMap<Hp, f64>, Error> {
    let total = histogram.iter().filter(|&(&hp, _)| hp > 0).map(|(_, &count)| count).sum::<usize>();
    if total == 0 {
        return Err(Error::EmptyDistribution { pack: pack.to_owned() })
    }
    let mut running = 0;
    Ok(histogram.iter()
        .filter(|&(&hp, _)| hp > 0)
        .map(|(&hp, &count)| {
            running += count;
            (hp, running as f64 / total as f64)
        })
        .collect())
}

impl CardRepository {
    pub fn hp_distribution(&self, pack: &str) -> Result<BTreeMap<Hp, usize>, card::Error> {
        Ok(histogram(&self.list_cards(pack)?))
    }

    pub fn hp_distribution_percentages(&self, pack: &str) -> Result<BTreeMap<Hp, f64>, Error> {
        cumulative_percentages(pack, &self.hp_distribution(pack)?)
    }
}
