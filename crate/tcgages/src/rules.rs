//! The functions the host calls from `{name(args)}` tokens while evaluating requirements.

use {
    std::collections::{
        BTreeSet,
        HashMap,
        HashSet,
    },
    crate::{
        POKEMON,
        SUPPORTER_DRAW,
        SUPPORTER_SEARCH,
        TRAINER_SEARCH,
        generate::PoolItem,
        requires::{
            self,
            HAS_PERCENTAGE_KEY_SUPPORTERS,
            HAS_PERCENTAGE_KEY_TRAINERS,
            HAS_PERCENTAGE_POKEMON,
            HAS_TOTAL_KEY_SUPPORTERS,
            HAS_TOTAL_KEY_TRAINERS,
            HAS_TOTAL_POKEMON,
            Percentage,
            Requires,
            parse_function_token,
        },
        table::Item,
    },
};

pub const ITEM_VALUE: &str = "ItemValue";
pub const OPT_ONE: &str = "OptOne";
pub const OPT_ALL: &str = "OptAll";
pub const CAN_REACH_LOCATION: &str = "canReachLocation";

pub type Player = u32;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{function} needs a number, got {token:?}")]
    InvalidArgument {
        function: String,
        token: String,
    },
    #[error("ItemValue needs a number after the colon, like 'ItemValue({0}:12)'")]
    ItemValueSyntax(String),
    #[error("not a function call: {0:?}")]
    NotAFunctionCall(String),
    #[error("unknown requirement function: {0}")]
    UnknownFunction(String),
}

/// What the host knows about one player's progress.
pub trait CollectionState {
    fn count(&self, item: &str) -> usize;
    /// Changes whenever the collected items change.
    fn version(&self) -> u64;
    fn can_reach_location(&self, location: &str) -> bool;
}

#[derive(Debug, Clone, Default)]
pub struct Inventory {
    items: HashMap<String, usize>,
    reachable: HashSet<String>,
    version: u64,
}

impl Inventory {
    pub fn collect(&mut self, item: &str) {
        *self.items.entry(item.to_owned()).or_default() += 1;
        self.version += 1;
    }

    pub fn remove(&mut self, item: &str) -> bool {
        let Some(count) = self.items.get_mut(item) else { return false };
        *count -= 1;
        if *count == 0 {
            self.items.remove(item);
        }
        self.version += 1;
        true
    }

    pub fn mark_reachable(&mut self, location: &str) {
        self.reachable.insert(location.to_owned());
    }
}

impl CollectionState for Inventory {
    fn count(&self, item: &str) -> usize {
        self.items.get(item).copied().unwrap_or_default()
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn can_reach_location(&self, location: &str) -> bool {
        self.reachable.contains(location)
    }
}

/// Item value totals per player and value name, valid only for the state version they were computed at.
#[derive(Debug, Default)]
pub struct CountCache {
    entries: HashMap<(Player, String), (u64, usize)>,
}

impl CountCache {
    pub fn get_or_insert_with(&mut self, player: Player, key: &str, version: u64, compute: impl FnOnce() -> usize) -> usize {
        match self.entries.get(&(player, key.to_owned())) {
            Some(&(cached_version, count)) if cached_version == version => count,
            _ => {
                let count = compute();
                self.entries.insert((player, key.to_owned()), (version, count));
                count
            }
        }
    }

    pub fn invalidate(&mut self, player: Player) {
        self.entries.retain(|(entry_player, _), _| *entry_player != player);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The item table plus one player's current pool.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub player: Player,
    pub items: &'a [Item],
    pub pool: &'a [PoolItem],
}

impl RuleContext<'_> {
    /// How many pool entries belong to an item with this category.
    pub fn pool_total_by_category(&self, category: &str) -> usize {
        let names = self.names_in_categories(&[category]);
        self.pool.iter().filter(|pool_item| names.contains(&*pool_item.name)).count()
    }

    pub fn item_counts(&self) -> HashMap<String, usize> {
        let mut counts = HashMap::default();
        for pool_item in self.pool {
            *counts.entry(pool_item.name.clone()).or_default() += 1;
        }
        counts
    }

    /// Names of table items tagged with any of `categories`.
    pub fn names_in_categories(&self, categories: &[&str]) -> BTreeSet<&str> {
        self.items.iter()
            .filter(|item| categories.iter().any(|category| item.has_category(category)))
            .map(|item| &*item.name)
            .collect()
    }

    fn key_supporter_names(&self) -> BTreeSet<&str> {
        self.names_in_categories(&[SUPPORTER_DRAW, SUPPORTER_SEARCH])
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleOutput {
    Bool(bool),
    /// Handed back to the host to evaluate in place of the call.
    Requires(Requires),
}

fn parse_percentage(function: &str, args: &str) -> Result<Percentage, Error> {
    args.parse().map_err(|_| Error::InvalidArgument { function: function.to_owned(), token: args.to_owned() })
}

fn parse_total(function: &str, args: &str) -> Result<usize, Error> {
    args.trim().parse().map_err(|_| Error::InvalidArgument { function: function.to_owned(), token: args.to_owned() })
}

fn count_unique(names: &BTreeSet<&str>, state: &impl CollectionState) -> usize {
    names.iter().filter(|&&name| state.count(name) > 0).count()
}

/// Sums `count × value` over the items that declare `key` (lowercase) in their value table.
pub fn item_value(items: &[Item], key: &str, state: &impl CollectionState) -> usize {
    items.iter()
        .filter_map(|item| item.value.get(key).map(|&value| state.count(&item.name) * value))
        .sum()
}

pub fn call(name: &str, args: &str, ctx: RuleContext<'_>, state: &impl CollectionState, cache: &mut CountCache) -> Result<RuleOutput, Error> {
    Ok(match name {
        HAS_PERCENTAGE_KEY_SUPPORTERS => {
            let percentage = parse_percentage(name, args)?;
            let total = ctx.pool_total_by_category(SUPPORTER_DRAW) + ctx.pool_total_by_category(SUPPORTER_SEARCH);
            RuleOutput::Bool(count_unique(&ctx.key_supporter_names(), state) >= percentage.of(total))
        }
        HAS_PERCENTAGE_POKEMON => RuleOutput::Requires(requires::pokemon(parse_percentage(name, args)?, ctx.pool_total_by_category(POKEMON))),
        HAS_PERCENTAGE_KEY_TRAINERS => RuleOutput::Requires(requires::key_trainers(parse_percentage(name, args)?, ctx.pool_total_by_category(TRAINER_SEARCH))),
        HAS_TOTAL_KEY_SUPPORTERS => RuleOutput::Bool(count_unique(&ctx.key_supporter_names(), state) >= parse_total(name, args)?),
        HAS_TOTAL_POKEMON => RuleOutput::Requires(requires::total_pokemon(parse_total(name, args)?)),
        HAS_TOTAL_KEY_TRAINERS => RuleOutput::Requires(requires::total_key_trainers(parse_total(name, args)?)),
        ITEM_VALUE => {
            let Some((key, amount)) = args.split_once(':') else { return Err(Error::ItemValueSyntax(args.trim().to_owned())) };
            let key = key.trim().to_lowercase();
            let amount = amount.trim();
            if amount.is_empty() || !amount.bytes().all(|b| b.is_ascii_digit()) {
                return Err(Error::ItemValueSyntax(key))
            }
            let amount = amount.parse::<usize>().map_err(|_| Error::ItemValueSyntax(key.clone()))?;
            let total = cache.get_or_insert_with(ctx.player, &key, state.version(), || item_value(ctx.items, &key, state));
            RuleOutput::Bool(total >= amount)
        }
        OPT_ONE => RuleOutput::Requires(requires::opt_one(args, ctx.items, &ctx.item_counts())),
        OPT_ALL => if args.is_empty() {
            RuleOutput::Bool(true)
        } else {
            RuleOutput::Requires(requires::opt_all(args, ctx.items, &ctx.item_counts()))
        },
        CAN_REACH_LOCATION => RuleOutput::Bool(state.can_reach_location(args)),
        _ => return Err(Error::UnknownFunction(name.to_owned())),
    })
}

/// Evaluates a whole `{name(args)}` token.
pub fn call_token(token: &str, ctx: RuleContext<'_>, state: &impl CollectionState, cache: &mut CountCache) -> Result<RuleOutput, Error> {
    let (name, args) = parse_function_token(token).ok_or_else(|| Error::NotAFunctionCall(token.to_owned()))?;
    call(name, args, ctx, state, cache)
}
