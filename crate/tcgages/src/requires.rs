//! Building blocks for requirement strings in the host's rule language.
//!
//! Tokens are `{function(args)}` calls, `|item:count|` and `|@category:count|`. This module only
//! produces them; the host interprets them.

use {
    std::{
        collections::HashMap,
        fmt,
        num::ParseFloatError,
        str::FromStr,
    },
    itertools::Itertools as _,
    lazy_regex::{
        regex_captures,
        regex_replace_all,
    },
    serde::Serialize,
    crate::{
        POKEMON,
        TRAINER_SEARCH,
        table::Item,
    },
};

pub const AND: &str = " AND ";

pub const HAS_PERCENTAGE_KEY_SUPPORTERS: &str = "hasPercentageKeySupporters";
pub const HAS_PERCENTAGE_KEY_TRAINERS: &str = "hasPercentageKeyTrainers";
pub const HAS_PERCENTAGE_POKEMON: &str = "hasPercentagePokemon";
pub const HAS_TOTAL_KEY_SUPPORTERS: &str = "hasTotalKeySupporters";
pub const HAS_TOTAL_KEY_TRAINERS: &str = "hasTotalKeyTrainers";
pub const HAS_TOTAL_POKEMON: &str = "hasTotalPokemon";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Requires(String);

impl Requires {
    /// `{name(args)}`
    pub fn function(name: &str, args: impl fmt::Display) -> Self {
        Self(format!("{{{name}({args})}}"))
    }

    /// `|@category:count|`
    pub fn category(category: &str, count: impl fmt::Display) -> Self {
        Self(format!("|@{category}:{count}|"))
    }

    /// `|item:count|`
    pub fn item(name: &str, count: impl fmt::Display) -> Self {
        Self(format!("|{name}:{count}|"))
    }

    pub fn grouped(self) -> Self {
        Self(format!("({})", self.0))
    }

    /// Joins standalone expressions with ` AND `. Nothing is rewritten.
    pub fn all(parts: impl IntoIterator<Item = Self>) -> Self {
        Self(parts.into_iter().map(|Self(part)| part).join(AND))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Requires {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A share of some pool. Negative values are clamped to zero; values above 1 are kept and simply can't be met.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Percentage(f64);

impl Percentage {
    pub fn new(value: f64) -> Self {
        Self(value.max(0.0))
    }

    pub fn get(self) -> f64 {
        self.0
    }

    /// `floor(total × percentage)`
    pub fn of(self, total: usize) -> usize {
        (total as f64 * self.0).floor() as usize
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl FromStr for Percentage {
    type Err = ParseFloatError;

    fn from_str(s: &str) -> Result<Self, ParseFloatError> {
        Ok(Self::new(s.trim().parse()?))
    }
}

/// The three percentage checks used to gate regions and the goal.
pub fn percentage_gate(percentage: Percentage) -> Requires {
    Requires::all([
        Requires::function(HAS_PERCENTAGE_KEY_SUPPORTERS, percentage),
        Requires::function(HAS_PERCENTAGE_KEY_TRAINERS, percentage),
        Requires::function(HAS_PERCENTAGE_POKEMON, percentage),
    ])
}

/// `total` is the number of key supporters in the pool.
pub fn key_supporters(percentage: Percentage, total: usize) -> Requires {
    total_key_supporters(percentage.of(total))
}

/// At least `amount` distinct key supporters. The host answers this with the collection state.
pub fn total_key_supporters(amount: usize) -> Requires {
    Requires::function(HAS_TOTAL_KEY_SUPPORTERS, amount)
}

pub fn pokemon(percentage: Percentage, total: usize) -> Requires {
    total_pokemon(percentage.of(total))
}

pub fn total_pokemon(amount: usize) -> Requires {
    Requires::category(POKEMON, amount).grouped()
}

pub fn key_trainers(percentage: Percentage, total: usize) -> Requires {
    total_key_trainers(percentage.of(total))
}

pub fn total_key_trainers(amount: usize) -> Requires {
    Requires::category(TRAINER_SEARCH, amount).grouped()
}

/// Splits `{name(args)}` into its name and argument string.
pub fn parse_function_token(token: &str) -> Option<(&str, &str)> {
    let (_, name, args) = regex_captures!(r"^\{(\w+)\(([^)]*)\)\}$", token.trim())?;
    Some((name, args))
}

/// Clamps the count of an `|item:n|` or `|@category:n|` token to what the pool actually holds,
/// so requirements on disabled content become trivially true instead of unreachable.
///
/// Counts that aren't plain numbers (like `ALL` or `50%`) are passed through.
pub fn opt_one(token: &str, items: &[Item], counts: &HashMap<String, usize>) -> Requires {
    if token.is_empty() {
        return Requires(String::default())
    }
    let is_category = token.chars().take(2).any(|c| c == '@');
    let token = token.trim_start_matches(['|', '@', '$']).trim_end_matches('|');
    let (name, count) = token.split_once(':').unwrap_or((token, "1"));
    let numeric = !count.is_empty() && count.bytes().all(|b| b.is_ascii_digit());
    if is_category {
        if numeric {
            let available = items.iter()
                .filter(|item| item.has_category(name))
                .map(|item| counts.get(&item.name).copied().unwrap_or_default())
                .sum::<usize>();
            Requires::category(name, count.parse::<usize>().map_or(available, |count| count.min(available)))
        } else {
            Requires::category(name, count)
        }
    } else {
        if numeric {
            let available = counts.get(name).copied().unwrap_or_default();
            Requires::item(name, count.parse::<usize>().map_or(available, |count| count.min(available)))
        } else {
            Requires::item(name, count)
        }
    }
}

/// Applies [`opt_one`] to every item and category token, leaving function calls untouched.
pub fn opt_all(requires: &str, items: &[Item], counts: &HashMap<String, usize>) -> Requires {
    Requires(regex_replace_all!(r"\{\w+\([^)]*\)\}|\|[^|]+\|", requires, |token: &str| if token.starts_with('{') {
        token.to_owned()
    } else {
        opt_one(token, items, counts).into_string()
    }).into_owned())
}
