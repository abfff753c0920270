//! Text helpers shared by front ends when rendering items.

use shared::domain::ItemId;

/// Upper bound of the nominal stat range, used to scale stat bars.
pub const STAT_CEILING: u32 = 255;

pub fn display_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Renders a value stored in tenths with one decimal place: `69` becomes `"6.9"`.
pub fn format_tenths(value: u32) -> String {
    format!("{}.{}", value / 10, value % 10)
}

pub fn padded_id(id: ItemId) -> String {
    format!("#{:03}", id.0)
}

pub fn stat_ratio(value: u32) -> f64 {
    (f64::from(value) / f64::from(STAT_CEILING)).min(1.0)
}

pub fn title_case_list(labels: &[String]) -> String {
    labels
        .iter()
        .map(|label| display_name(label))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn summary_line(shown: usize, total: usize) -> String {
    format!("Showing {shown} of {total} items")
}
