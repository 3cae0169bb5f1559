//! Projection of accumulated items onto the visible card list.

use crate::feed::Item;

/// Items to display for `query`, in their original order.
///
/// An empty query shows everything; otherwise an item is kept when its title
/// contains the query, compared case-insensitively.
pub fn project<'a>(items: &'a [Item], query: &str) -> Vec<&'a Item> {
    if query.is_empty() {
        return items.iter().collect();
    }
    let needle = query.to_lowercase();
    items
        .iter()
        .filter(|item| item.title.to_lowercase().contains(&needle))
        .collect()
}

/// Number of items [`project`] would return, without allocating the list.
pub fn projected_len(items: &[Item], query: &str) -> usize {
    if query.is_empty() {
        return items.len();
    }
    let needle = query.to_lowercase();
    items
        .iter()
        .filter(|item| item.title.to_lowercase().contains(&needle))
        .count()
}
