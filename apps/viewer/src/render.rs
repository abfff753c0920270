//! Plain-text rendering of the derived view and the detail view.

use std::fmt::Write as _;

use catalog_core::format::{
    display_name, format_tenths, padded_id, stat_ratio, summary_line, title_case_list,
};
use shared::domain::{FilterCriteria, Item};

const BAR_WIDTH: usize = 20;

pub fn listing(view: &[Item], criteria: &FilterCriteria, total: usize) -> String {
    let mut out = summary_line(view.len(), total);
    out.push('\n');

    if view.is_empty() {
        if criteria.is_unconstrained() {
            out.push_str("The catalog is empty.\n");
        } else {
            out.push_str("No items matched; try other filters.\n");
        }
        return out;
    }

    for item in view {
        let _ = writeln!(
            out,
            "{:<6} {:<16} {:<18} {:>7} kg {:>6} m",
            padded_id(item.id),
            display_name(&item.name),
            item.categories.join("/"),
            format_tenths(item.weight),
            format_tenths(item.height),
        );
    }
    out
}

pub fn detail(item: &Item) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} {}", display_name(&item.name), padded_id(item.id));
    let _ = writeln!(
        out,
        "image: {}",
        item.image.as_deref().unwrap_or("(no image)")
    );
    let categories: Vec<String> = item
        .categories
        .iter()
        .map(|label| label.to_uppercase())
        .collect();
    let _ = writeln!(out, "types: {}", categories.join(" "));
    if let Some(primary) = item.primary_category() {
        let _ = writeln!(out, "primary type: {primary}");
    }

    out.push_str("stats:\n");
    for (name, value) in &item.stats {
        let _ = writeln!(out, "  {name:<16} {value:>3} {}", stat_bar(*value));
    }

    let _ = writeln!(out, "weight: {} kg", format_tenths(item.weight));
    let _ = writeln!(out, "height: {} m", format_tenths(item.height));
    let _ = writeln!(out, "abilities: {}", title_case_list(&item.abilities));
    out
}

fn stat_bar(value: u32) -> String {
    let filled = (stat_ratio(value) * BAR_WIDTH as f64).round() as usize;
    format!("{}{}", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
