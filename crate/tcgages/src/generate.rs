//! Per-player generation steps: pool filtering, starting items, filler, late placement of power cards and the victory goal.

use {
    std::collections::{
        BTreeMap,
        HashMap,
    },
    itertools::Itertools as _,
    lazy_regex::regex_is_match,
    rand::prelude::*,
    serde::Serialize,
    crate::{
        DEFAULT_PACK,
        Hp,
        POKEMON,
        SUPPORTER_DRAW,
        SUPPORTER_SEARCH,
        TRAINER_SEARCH,
        TYPE_SEPARATOR,
        card::{
            self,
            CardRepository,
            Enemy,
        },
        options::{
            PackToggles,
            PlayerOptions,
        },
        requires::Requires,
        table::{
            Item,
            Location,
            Tables,
        },
    },
};

/// The item padding the pool up to the number of locations.
pub const POOL_FILLER: &str = "Ham Sandwich";
/// Share of each compound category's pool items needed for the goal.
pub const GOAL_PERCENTAGE: f64 = 0.8;

const PROGRESSION_CATEGORIES: [&str; 4] = [POKEMON, SUPPORTER_SEARCH, SUPPORTER_DRAW, TRAINER_SEARCH];

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{items} items don't fit into {locations} locations")]
    TooManyItems {
        items: usize,
        locations: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Progression,
    Useful,
    Filler,
}

pub fn classify(item: &Item) -> Classification {
    if PROGRESSION_CATEGORIES.into_iter().any(|category| item.has_category(category)) {
        Classification::Progression
    } else if item.filler {
        Classification::Filler
    } else {
        Classification::Useful
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolItem {
    pub name: String,
    pub classification: Classification,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Placement {
    pub location: String,
    pub item: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SlotData {
    /// One opponent card per HP.
    pub enemies: BTreeMap<Hp, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome {
    pub item_pool: Vec<PoolItem>,
    pub precollected: Vec<String>,
    /// Items locked in place before the host's fill runs.
    pub placements: Vec<Placement>,
    pub locations: Vec<Location>,
    pub victory_goal: BTreeMap<String, usize>,
    pub slot_data: SlotData,
}

/// Enemy cards of every listed pack, in listing order.
pub fn load_enemies(repo: &CardRepository) -> Result<Vec<(String, Vec<Enemy>)>, card::Error> {
    repo.list_packs()?.into_iter().map(|pack| repo.list_enemy_cards(&pack).map(|enemies| (pack, enemies))).collect()
}

pub struct Generation<'a> {
    tables: &'a Tables,
    items: HashMap<&'a str, &'a Item>,
    options: &'a PlayerOptions,
    toggles: PackToggles,
    rng: StdRng,
}

impl<'a> Generation<'a> {
    pub fn new(tables: &'a Tables, options: &'a PlayerOptions, toggles: PackToggles, seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            items: tables.items.iter().map(|item| (&*item.name, item)).collect(),
            tables, options, toggles,
        }
    }

    fn item(&self, name: &str) -> Option<&'a Item> {
        self.items.get(name).copied()
    }

    fn is_removed(&self, categories: &[String]) -> bool {
        self.toggles.removed().any(|pack| categories.iter().any(|category| category == pack))
    }

    /// Every location except those of disabled packs.
    pub fn locations(&self) -> Vec<Location> {
        self.tables.locations.iter().filter(|location| !self.is_removed(&location.category)).cloned().collect()
    }

    /// One entry per copy of each enabled, unbanned item.
    pub fn item_pool(&self) -> Vec<PoolItem> {
        self.tables.items.iter()
            .filter(|item| !self.is_removed(&item.category) && !self.options.banned_cards.contains(&item.name))
            .flat_map(|item| std::iter::repeat_n(PoolItem { name: item.name.clone(), classification: classify(item) }, item.pool_count()))
            .collect()
    }

    /// Moves random pool items of each starting category into the precollected list.
    pub fn starting_items(&mut self, pool: &mut Vec<PoolItem>) -> Vec<String> {
        let mut precollected = Vec::default();
        for (category, amount) in [(SUPPORTER_DRAW, 1), (TRAINER_SEARCH, 1), (POKEMON, usize::from(self.options.starting_pokemon_count))] {
            for _ in 0..amount {
                let candidates = pool.iter()
                    .positions(|pool_item| self.item(&pool_item.name).is_some_and(|item| item.has_category(category)))
                    .collect_vec();
                let Some(&pos) = candidates.choose(&mut self.rng) else { break };
                precollected.push(pool.remove(pos).name);
            }
        }
        precollected
    }

    /// Replaces filler with [`POOL_FILLER`] and pads the pool up to `locations`.
    pub fn fill(&self, pool: &mut Vec<PoolItem>, locations: usize) -> Result<(), Error> {
        for pool_item in pool.iter_mut().filter(|pool_item| pool_item.classification == Classification::Filler) {
            pool_item.name = POOL_FILLER.to_owned();
        }
        if pool.len() > locations {
            return Err(Error::TooManyItems { items: pool.len(), locations })
        }
        pool.resize(locations, PoolItem { name: POOL_FILLER.to_owned(), classification: Classification::Filler });
        Ok(())
    }

    /// Locks power Pokemon (EX, GX, V…) into random locations in the upper half of the HP tiers.
    pub fn place_power_pokemon(&mut self, pool: &mut Vec<PoolItem>, locations: &[Location]) -> Vec<Placement> {
        let Some(max_tier) = self.tables.regions.max_tier() else { return Vec::default() };
        let required_tier = max_tier.div_ceil(2);
        let mut available = locations.iter()
            .filter(|location| location.tier().is_some_and(|tier| tier >= required_tier))
            .map(|location| &*location.name)
            .collect_vec();
        let (power, rest) = pool.drain(..).partition::<Vec<_>, _>(|pool_item| regex_is_match!(r"\s(EX|ex|GX|V)\s\w+\s\d+$", &pool_item.name));
        *pool = rest;
        let mut placements = Vec::default();
        for pool_item in power {
            if available.is_empty() {
                pool.push(pool_item);
                continue
            }
            let location = available.swap_remove(self.rng.random_range(0..available.len()));
            placements.push(Placement { location: location.to_owned(), item: pool_item.name });
        }
        placements
    }

    /// `floor(0.8 × n)` per compound category of progression items, where `n` counts that category in the pool.
    pub fn victory_goal(&self, pool: &[PoolItem]) -> BTreeMap<String, usize> {
        self.tables.items.iter()
            .filter(|item| classify(item) == Classification::Progression)
            .flat_map(|item| &item.category)
            .filter(|category| category.contains(TYPE_SEPARATOR))
            .unique()
            .map(|category| {
                let count = pool.iter()
                    .filter(|pool_item| self.item(&pool_item.name).is_some_and(|item| item.has_category(category)))
                    .count();
                (category.clone(), (count as f64 * GOAL_PERCENTAGE).floor() as usize)
            })
            .collect()
    }

    /// One random enemy per HP from `_default` and the enabled packs.
    pub fn slot_data(&mut self, enemies: &[(String, Vec<Enemy>)]) -> SlotData {
        let mut by_hp = BTreeMap::<Hp, Vec<String>>::default();
        let default = enemies.iter().filter(|(pack, _)| pack == DEFAULT_PACK);
        let enabled = enemies.iter().filter(|(pack, _)| pack != DEFAULT_PACK && self.options.packs.contains(pack));
        for (_, pack_enemies) in default.chain(enabled) {
            for enemy in pack_enemies {
                by_hp.entry(enemy.hp).or_default().push(enemy.display_name());
            }
        }
        SlotData {
            enemies: by_hp.into_iter()
                .filter_map(|(hp, names)| Some((hp, names.choose(&mut self.rng)?.clone())))
                .collect(),
        }
    }

    /// A random filler-flagged item name from the item table.
    pub fn filler_item_name(&mut self) -> Option<&'a str> {
        let tables = self.tables;
        tables.items.iter().filter(|item| item.filler).map(|item| &*item.name).choose(&mut self.rng)
    }

    pub fn run(mut self, enemies: &[(String, Vec<Enemy>)]) -> Result<Outcome, Error> {
        let mut locations = self.locations();
        let mut pool = self.item_pool();
        let precollected = self.starting_items(&mut pool);
        self.fill(&mut pool, locations.iter().filter(|location| !location.victory).count())?;
        let victory_goal = self.victory_goal(&pool);
        let placements = if self.options.late_power_pokemon {
            self.place_power_pokemon(&mut pool, &locations)
        } else {
            Vec::default()
        };
        for location in locations.iter_mut().filter(|location| location.victory) {
            location.requires = (!victory_goal.is_empty()).then(|| Requires::all(victory_goal.iter().map(|(category, &amount)| Requires::category(category, amount))));
        }
        Ok(Outcome {
            slot_data: self.slot_data(enemies),
            item_pool: pool,
            precollected, placements, locations, victory_goal,
        })
    }
}

#[cfg(test)]
mod tests {
    use {
        std::collections::BTreeSet,
        itertools::Itertools as _,
        crate::{
            fixture::Fixture,
            table::FILLER_NAMES,
        },
        super::*,
    };

    fn fixture() -> Fixture {
        let fixture = Fixture::new(&["_default", "jungle"]);
        fixture.cards("_default", &[
            ("Pikachu", "Base", "58", "Pokemon - Lightning", 40),
            ("Bulbasaur", "Base", "44", "Pokemon - Grass", 40),
            ("Charmander", "Base", "46", "Pokemon - Fire", 50),
            ("Mewtwo EX", "Evolutions", "52", "Pokemon - Psychic", 170),
            ("Charizard", "Base", "4", "Pokemon - Fire", 120),
            ("Professor Oak", "Base", "88", "Supporter - Draw", 0),
            ("Bill", "Base", "91", "Supporter - Draw", 0),
            ("Computer Search", "Base", "71", "Trainer - Search", 0),
            ("Potion", "Base", "94", "Trainer", 0),
        ]);
        fixture.cards("jungle", &[
            ("Snorlax", "Jungle", "11", "Pokemon - Colorless", 90),
            ("Scyther", "Jungle", "10", "Pokemon - Grass", 70),
        ]);
        fixture.file("_default", "enemies.csv", "Card Name,Set Name,Set Number,HP,Card Image URL\nRattata,Base,61,30,r\nMeowth,Base,56,30,m\nGyarados,Base,6,100,g\n");
        fixture.file("jungle", "enemies.csv", "Card Name,Set Name,Set Number,HP,Card Image URL\nPrimeape,Jungle,43,70,p\n");
        fixture
    }

    fn options(json: &str) -> PlayerOptions {
        PlayerOptions::from_json(json).unwrap()
    }

    fn toggles(options: &PlayerOptions) -> PackToggles {
        PackToggles::new(["_default", "jungle"], options)
    }

    #[test]
    fn classification_follows_categories() {
        let tables = Tables::build(&fixture().repo()).unwrap();
        let class = |name: &str| classify(tables.item(name).unwrap());
        assert_eq!(class("Pikachu Base 58"), Classification::Progression);
        assert_eq!(class("Bill Base 91"), Classification::Progression);
        assert_eq!(class("Potion Base 94"), Classification::Useful);
        assert_eq!(class("Ham Sandwich"), Classification::Filler);
    }

    #[test]
    fn disabled_packs_and_banned_cards_leave_the_pool() {
        let tables = Tables::build(&fixture().repo()).unwrap();
        let options = options(r#"{"banned_cards": ["Potion Base 94"]}"#);
        let generation = Generation::new(&tables, &options, toggles(&options), 0);
        let pool = generation.item_pool();
        assert_eq!(pool.len(), 8);
        assert!(pool.iter().all(|pool_item| !pool_item.name.contains("Jungle") && pool_item.name != "Potion Base 94"));
        assert!(pool.iter().all(|pool_item| !FILLER_NAMES.contains(&&*pool_item.name)));
        let locations = generation.locations();
        assert!(locations.iter().all(|location| !location.has_category("jungle")));
        assert!(locations.iter().any(|location| location.victory));
    }

    #[test]
    fn starting_items_come_out_of_the_pool() {
        let tables = Tables::build(&fixture().repo()).unwrap();
        let options = options(r#"{"starting_pokemon_count": 2}"#);
        let mut generation = Generation::new(&tables, &options, toggles(&options), 7);
        let mut pool = generation.item_pool();
        let before = pool.len();
        let precollected = generation.starting_items(&mut pool);
        assert_eq!(precollected.len(), 4);
        assert_eq!(pool.len(), before - 4);
        let categories = precollected.iter().map(|name| tables.item(name).unwrap().category[1].clone()).collect_vec();
        assert_eq!(categories[0], SUPPORTER_DRAW);
        assert_eq!(categories[1], TRAINER_SEARCH);
        assert!(categories[2..].iter().all(|category| category.starts_with("Pokemon - ")));
        assert_eq!(precollected.iter().collect::<BTreeSet<_>>().len(), 4);
    }

    #[test]
    fn starting_items_stop_when_candidates_run_out() {
        let tables = Tables::build(&fixture().repo()).unwrap();
        let options = options(r#"{"starting_pokemon_count": 10}"#);
        let mut generation = Generation::new(&tables, &options, toggles(&options), 1);
        let mut pool = generation.item_pool();
        let precollected = generation.starting_items(&mut pool);
        // 1 draw supporter, 1 search trainer, all 5 Pokemon of _default
        assert_eq!(precollected.len(), 7);
    }

    #[test]
    fn fill_pads_to_location_count() {
        let tables = Tables::build(&fixture().repo()).unwrap();
        let options = PlayerOptions::default();
        let generation = Generation::new(&tables, &options, toggles(&options), 0);
        let mut pool = generation.item_pool();
        generation.fill(&mut pool, 20).unwrap();
        assert_eq!(pool.len(), 20);
        assert_eq!(pool.iter().filter(|pool_item| pool_item.name == POOL_FILLER).count(), 11);
        assert!(matches!(generation.fill(&mut pool, 3), Err(Error::TooManyItems { items: 20, locations: 3 })));
    }

    #[test]
    fn power_pokemon_land_in_late_tiers() {
        let tables = Tables::build(&fixture().repo()).unwrap();
        let options = PlayerOptions::default();
        let mut generation = Generation::new(&tables, &options, toggles(&options), 3);
        let locations = generation.locations();
        let mut pool = generation.item_pool();
        let placements = generation.place_power_pokemon(&mut pool, &locations);
        assert_eq!(placements.len(), 1);
        assert_eq!(placements[0].item, "Mewtwo EX Evolutions 52");
        let location = locations.iter().find(|location| location.name == placements[0].location).unwrap();
        assert!(location.tier().unwrap() >= 85);
        assert!(pool.iter().all(|pool_item| pool_item.name != "Mewtwo EX Evolutions 52"));
    }

    #[test]
    fn victory_goal_takes_eighty_percent_of_compound_categories() {
        let tables = Tables::build(&fixture().repo()).unwrap();
        let options = PlayerOptions::default();
        let generation = Generation::new(&tables, &options, toggles(&options), 0);
        let goal = generation.victory_goal(&generation.item_pool());
        assert_eq!(goal["Pokemon - Fire"], 1);
        assert_eq!(goal["Supporter - Draw"], 1);
        assert_eq!(goal["Trainer - Search"], 0);
        // jungle is disabled, so its Pokemon don't count
        assert_eq!(goal["Pokemon - Colorless"], 0);
        assert!(!goal.contains_key("Pokemon"));
    }

    #[test]
    fn enemies_come_from_default_and_enabled_packs() {
        let fixture = fixture();
        let tables = Tables::build(&fixture.repo()).unwrap();
        let enemies = load_enemies(&fixture.repo()).unwrap();
        let disabled = PlayerOptions::default();
        let slot_data = Generation::new(&tables, &disabled, toggles(&disabled), 0).slot_data(&enemies);
        assert_eq!(slot_data.enemies.keys().copied().collect_vec(), [30, 100]);
        assert!(["Rattata Base 61", "Meowth Base 56"].contains(&&*slot_data.enemies[&30]));
        let enabled = options(r#"{"packs": ["jungle"]}"#);
        let slot_data = Generation::new(&tables, &enabled, toggles(&enabled), 0).slot_data(&enemies);
        assert_eq!(slot_data.enemies[&70], "Primeape Jungle 43");
    }

    #[test]
    fn victory_without_progression_has_no_requirement() {
        let fixture = Fixture::new(&["_default"]);
        fixture.cards("_default", &[
            ("Potion", "Base", "94", "Trainer", 0),
            ("Defender", "Base", "80", "Trainer", 0),
            ("Clefairy Doll", "Base", "70", "Trainer", 10),
        ]);
        let tables = Tables::build(&fixture.repo()).unwrap();
        let options = PlayerOptions::default();
        let outcome = Generation::new(&tables, &options, toggles(&options), 0).run(&[]).unwrap();
        assert!(outcome.victory_goal.is_empty());
        let Some(victory) = outcome.locations.iter().find(|location| location.victory) else { panic!("no victory location") };
        assert_eq!(victory.requires, None);
    }

    #[test]
    fn filler_name_is_a_filler_item() {
        let tables = Tables::build(&fixture().repo()).unwrap();
        let options = PlayerOptions::default();
        let mut generation = Generation::new(&tables, &options, toggles(&options), 0);
        assert!(generation.filler_item_name().is_some_and(|name| FILLER_NAMES.contains(&name)));
    }

    #[test]
    fn runs_are_reproducible() {
        let fixture = fixture();
        let tables = Tables::build(&fixture.repo()).unwrap();
        let enemies = load_enemies(&fixture.repo()).unwrap();
        let options = options(r#"{"packs": ["jungle"]}"#);
        let first = Generation::new(&tables, &options, toggles(&options), 42).run(&enemies).unwrap();
        let second = Generation::new(&tables, &options, toggles(&options), 42).run(&enemies).unwrap();
        assert_eq!(first, second);
        let locations = first.locations.iter().filter(|location| !location.victory).count();
        assert_eq!(first.item_pool.len() + first.placements.len(), locations);
        let Some(victory) = first.locations.iter().find(|location| location.victory) else { panic!("no victory location") };
        assert!(victory.requires.as_ref().is_some_and(|requires| requires.as_str().contains("|@Pokemon - Fire:")));
    }
}
