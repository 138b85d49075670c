use {
    std::collections::BTreeMap,
    serde::Serialize,
    crate::{
        DEFAULT_PACK,
        Hp,
        requires::{
            Percentage,
            Requires,
            percentage_gate,
        },
    },
    super::{
        is_false,
        tier_name,
    },
};

pub const NORMAL_TRIAL: &str = "Normal Trial";
pub const CHALLENGE_TRIAL: &str = "Challenge Trial";
pub const VICTORY_LOCATION: &str = "Did We Catch Them All?!";
pub const VICTORY_CATEGORY: &str = "** Victory **";
pub const VICTORY_PERCENTAGE: f64 = 0.9;

/// The restriction a challenge trial imposes on the player's deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handicap {
    NoSupporters,
    NoTrainers,
    NoSpecialEnergy,
    BenchMax3,
    BenchMax2,
}

impl Handicap {
    pub const ALL: [Self; 5] = [
        Self::NoSupporters,
        Self::NoTrainers,
        Self::NoSpecialEnergy,
        Self::BenchMax3,
        Self::BenchMax2,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoSupporters => "No Supporters",
            Self::NoTrainers => "No Trainers",
            Self::NoSpecialEnergy => "No Special Energy",
            Self::BenchMax3 => "Bench - Max 3",
            Self::BenchMax2 => "Bench - Max 2",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Location {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    pub category: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requires: Option<Requires>,
    #[serde(skip_serializing_if = "is_false")]
    pub victory: bool,
}

fn location_name(pack: &str, name: String) -> String {
    if pack == DEFAULT_PACK {
        name
    } else {
        format!("{name} [{pack}]")
    }
}

fn tier_tag(hp: Hp) -> String {
    format!("{hp:03} HP")
}

impl Location {
    /// `n` starts at 1.
    pub fn normal_trial(pack: &str, hp: Hp, n: usize) -> Self {
        Self {
            name: location_name(pack, format!("{hp} HP - Trial {n}")),
            region: Some(tier_name(hp)),
            category: vec![tier_tag(hp), NORMAL_TRIAL.to_owned(), pack.to_owned()],
            requires: None,
            victory: false,
        }
    }

    pub fn challenge_trial(pack: &str, hp: Hp, handicap: Handicap) -> Self {
        Self {
            name: location_name(pack, format!("{hp} HP - {} Challenge", handicap.as_str())),
            region: Some(tier_name(hp)),
            category: vec![tier_tag(hp), CHALLENGE_TRIAL.to_owned(), handicap.as_str().to_owned(), pack.to_owned()],
            requires: None,
            victory: false,
        }
    }

    pub fn victory() -> Self {
        Self {
            name: VICTORY_LOCATION.to_owned(),
            region: None,
            category: vec![VICTORY_CATEGORY.to_owned()],
            requires: Some(percentage_gate(Percentage::new(VICTORY_PERCENTAGE))),
            victory: true,
        }
    }

    pub fn has_category(&self, category: &str) -> bool {
        self.category.iter().any(|tag| tag == category)
    }

    /// The HP tier of the region this location is in.
    pub fn tier(&self) -> Option<Hp> {
        self.region.as_deref()?.strip_suffix(" HP")?.parse().ok()
    }
}

/// `histograms` is in pack order. Trials come first, then challenges, then the victory location.
pub(super) fn build<'a>(histograms: impl IntoIterator<Item = (&'a str, &'a BTreeMap<Hp, usize>)>) -> Vec<Location> {
    let mut normal_trials = Vec::default();
    let mut challenge_trials = Vec::default();
    for (pack, histogram) in histograms {
        for (&hp, &count) in histogram {
            if hp == 0 { continue }
            normal_trials.extend((1..=count.div_ceil(2)).map(|n| Location::normal_trial(pack, hp, n)));
            challenge_trials.extend(Handicap::ALL.into_iter().map(|handicap| Location::challenge_trial(pack, hp, handicap)));
        }
    }
    normal_trials.extend(challenge_trials);
    normal_trials.push(Location::victory());
    normal_trials
}
