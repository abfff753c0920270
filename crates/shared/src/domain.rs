use std::{fmt, str::FromStr};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(ItemId);

/// Default number of references requested from the listing endpoint.
pub const LISTING_CAP: u32 = 500;

/// Category labels offered by the category picker of the front end.
pub const KNOWN_CATEGORIES: &[&str] = &[
    "normal", "fire", "water", "electric", "grass", "ice", "fighting", "poison", "ground",
    "flying", "psychic", "bug", "rock", "ghost", "dragon", "dark", "steel", "fairy",
];

/// Listing entry prior to detail enrichment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub name: String,
    pub url: String,
}

/// Stat name to base value, in the order the detail payload lists them.
pub type StatMap = IndexMap<String, u32>;

/// Fully normalized catalog record.
///
/// Weight and height are in tenths of a unit (hectograms and decimetres for the
/// PokeAPI). `categories` and `abilities` keep payload order without duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub weight: u32,
    pub height: u32,
    pub categories: Vec<String>,
    pub abilities: Vec<String>,
    pub stats: StatMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Item {
    pub fn has_category(&self, category: &str) -> bool {
        let wanted = category.to_lowercase();
        self.categories
            .iter()
            .any(|label| label.to_lowercase() == wanted)
    }

    pub fn primary_category(&self) -> Option<&str> {
        self.categories.first().map(String::as_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Name,
    Id,
    /// Heaviest first.
    Weight,
    /// Tallest first.
    Height,
}

impl SortKey {
    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Name => "name",
            SortKey::Id => "id",
            SortKey::Weight => "weight",
            SortKey::Height => "height",
        }
    }

    /// Unknown selectors fall back to sorting by name.
    pub fn parse_lenient(raw: &str) -> Self {
        raw.parse().unwrap_or_default()
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(SortKey::Name),
            "id" => Ok(SortKey::Id),
            "weight" => Ok(SortKey::Weight),
            "height" => Ok(SortKey::Height),
            other => Err(format!("unknown sort key '{other}'")),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of every active search, filter and sort input.
///
/// `None` always means "no constraint". Use [`FilterCriteria::from_inputs`] to build
/// one from raw text fields so that unparseable thresholds never turn into zero.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterCriteria {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub min_weight: Option<i64>,
    #[serde(default)]
    pub min_height: Option<i64>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub sort_by: SortKey,
}

impl FilterCriteria {
    pub fn from_inputs(
        name: &str,
        min_weight: &str,
        min_height: &str,
        category: &str,
        sort_by: &str,
    ) -> Self {
        Self {
            name: non_blank(name),
            min_weight: parse_threshold(min_weight),
            min_height: parse_threshold(min_height),
            category: non_blank(category),
            sort_by: SortKey::parse_lenient(sort_by),
        }
    }

    pub fn cleared() -> Self {
        Self::default()
    }

    pub fn is_unconstrained(&self) -> bool {
        self.name.is_none()
            && self.min_weight.is_none()
            && self.min_height.is_none()
            && self.category.is_none()
    }
}

fn non_blank(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Parses a minimum-threshold text field the way a numeric input box does: an
/// optional sign followed by leading digits, anything after the digits ignored.
/// Text without leading digits yields `None`; digit runs beyond the `i64` range
/// saturate, so a huge minimum still filters.
pub fn parse_threshold(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }
    let value = rest[..digits_len].bytes().fold(0i64, |acc, digit| {
        let digit = i64::from(digit - b'0');
        if negative {
            acc.saturating_mul(10).saturating_sub(digit)
        } else {
            acc.saturating_mul(10).saturating_add(digit)
        }
    });
    Some(value)
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
