use std::cmp::Ordering;

use shared::domain::{FilterCriteria, Item, SortKey};

/// Derives the displayed view from the dataset and the current criteria.
///
/// Stages run in a fixed order (name, weight, height, category) and each only
/// applies when its criterion is present. The dataset is never touched.
pub fn project(dataset: &[Item], criteria: &FilterCriteria) -> Vec<Item> {
    let name_query = lowered(criteria.name.as_deref());
    let category = lowered(criteria.category.as_deref());

    let mut view: Vec<Item> = dataset
        .iter()
        .filter(|item| match &name_query {
            Some(query) => item.name.to_lowercase().contains(query.as_str()),
            None => true,
        })
        .filter(|item| at_least(item.weight, criteria.min_weight))
        .filter(|item| at_least(item.height, criteria.min_height))
        .filter(|item| match &category {
            Some(category) => item.has_category(category),
            None => true,
        })
        .cloned()
        .collect();

    sort_items(&mut view, criteria.sort_by);
    view
}

fn lowered(raw: Option<&str>) -> Option<String> {
    raw.map(str::to_lowercase).filter(|value| !value.is_empty())
}

fn at_least(value: u32, minimum: Option<i64>) -> bool {
    minimum.map_or(true, |minimum| i64::from(value) >= minimum)
}

/// Stable sort, so ties keep dataset order.
pub fn sort_items(items: &mut [Item], key: SortKey) {
    match key {
        SortKey::Name => items.sort_by(|a, b| compare_names(&a.name, &b.name)),
        SortKey::Id => items.sort_by_key(|item| item.id),
        SortKey::Weight => items.sort_by(|a, b| b.weight.cmp(&a.weight)),
        SortKey::Height => items.sort_by(|a, b| b.height.cmp(&a.height)),
    }
}

/// Collation-style name order: letters compared without case or Latin-1 accents
/// first, then accents (unaccented first), then case (lowercase first).
///
/// Accent folding covers the Latin-1 letters only; other scripts compare by code point.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    let fold_case = |name: &str| name.chars().flat_map(char::to_lowercase).collect::<Vec<_>>();
    let (a_lower, b_lower) = (fold_case(a), fold_case(b));

    let base = a_lower
        .iter()
        .map(|&c| strip_accent(c))
        .cmp(b_lower.iter().map(|&c| strip_accent(c)));
    base.then_with(|| a_lower.cmp(&b_lower))
        .then_with(|| b.cmp(a))
}

fn strip_accent(c: char) -> char {
    match c {
        'à'..='å' => 'a',
        'ç' => 'c',
        'è'..='ë' => 'e',
        'ì'..='ï' => 'i',
        'ñ' => 'n',
        'ò'..='ö' | 'ø' => 'o',
        'ù'..='ü' => 'u',
        'ý' | 'ÿ' => 'y',
        other => other,
    }
}

#[cfg(test)]
#[path = "tests/projector_tests.rs"]
mod tests;
