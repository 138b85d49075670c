use {
    std::collections::BTreeMap,
    serde::{
        Serialize,
        Serializer,
        ser::SerializeMap as _,
    },
    crate::{
        Hp,
        INTRO_HP_THRESHOLD,
        requires::{
            Percentage,
            Requires,
            percentage_gate,
        },
    },
    super::tier_name,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Region {
    pub starting: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requires: Option<Requires>,
}

impl Region {
    /// Intro tiers are open from the start, the rest are gated on having collected the share of cards at or below them.
    pub fn for_tier(hp: Hp, percentage: f64) -> Self {
        Self {
            starting: true,
            requires: (hp >= INTRO_HP_THRESHOLD).then(|| percentage_gate(Percentage::new(percentage))),
        }
    }
}

/// Regions by HP tier, serialized as a map keyed by `"{hp} HP"`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegionTable(BTreeMap<Hp, Region>);

impl RegionTable {
    pub fn get(&self, hp: Hp) -> Option<&Region> {
        self.0.get(&hp)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Hp, &Region)> {
        self.0.iter().map(|(&hp, region)| (hp, region))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn max_tier(&self) -> Option<Hp> {
        self.0.keys().next_back().copied()
    }
}

impl Serialize for RegionTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (&hp, region) in &self.0 {
            map.serialize_entry(&tier_name(hp), region)?;
        }
        map.end()
    }
}

/// `percentages` is in pack order; the last pack with a tier decides its percentage.
pub(super) fn build<'a>(percentages: impl IntoIterator<Item = &'a BTreeMap<Hp, f64>>) -> RegionTable {
    let mut regions = BTreeMap::default();
    for percentages in percentages {
        for (&hp, &percentage) in percentages {
            if hp == 0 { continue }
            regions.insert(hp, Region::for_tier(hp, percentage));
        }
    }
    RegionTable(regions)
}
