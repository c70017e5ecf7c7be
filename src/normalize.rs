//! Turn raw guest-list text into guest records.

use std::collections::{HashMap, HashSet};

use crate::model::{Guest, NameOrder, fold_case};

/// Parse `raw` into guests, sorted case-insensitively, with repeated names
/// disambiguated as `"Name (N)"`.
///
/// Tokens are separated by newlines or commas. Blank tokens are dropped, so
/// empty input gives an empty list.
///
/// The normalized name is folded from the *display* name: a second
/// "Jane Doe" is normalized as `"jane doe (2)"`, not `"jane doe"`.
pub fn normalize(raw: &str) -> Vec<Guest> {
    let mut names: Vec<&str> = raw
        .split(['\n', ','])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    // Stable: names differing only in case keep their input order.
    let order = NameOrder::new();
    names.sort_by(|a, b| order.compare(a, b));

    let mut seen: HashMap<String, u32> = HashMap::new();
    let guests: Vec<Guest> = names
        .into_iter()
        .map(|name| {
            let count = seen.entry(fold_case(name)).or_insert(0);
            *count += 1;
            let display = if *count == 1 {
                name.to_string()
            } else {
                format!("{name} ({count})")
            };
            Guest::new(name, display)
        })
        .collect();

    tracing::trace!(count = guests.len(), "normalized guest list");
    guests
}

/// Result of appending new names to an existing guest collection.
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    /// Existing and new guests, sorted by display name
    pub guests: Vec<Guest>,

    /// Display names of the guests that were added
    pub added: Vec<String>,

    /// Display names skipped because the normalized name already existed
    pub skipped: Vec<String>,
}

impl MergeOutcome {
    /// Whether anything new was actually added.
    pub fn changed(&self) -> bool {
        !self.added.is_empty()
    }
}

/// Normalize `raw` and add only guests whose normalized name is not already
/// present in `existing`. Existing guests, including their seating, are kept
/// as they are.
pub fn merge(existing: &[Guest], raw: &str) -> MergeOutcome {
    let known: HashSet<&str> = existing
        .iter()
        .map(|g| g.normalized_name.as_str())
        .collect();

    let (duplicates, fresh): (Vec<Guest>, Vec<Guest>) = normalize(raw)
        .into_iter()
        .partition(|g| known.contains(g.normalized_name.as_str()));

    let skipped = duplicates.into_iter().map(|g| g.display_name).collect();
    let added = fresh.iter().map(|g| g.display_name.clone()).collect();

    let mut guests: Vec<Guest> = existing.iter().cloned().chain(fresh).collect();
    sort_by_display_name(&mut guests);

    MergeOutcome {
        guests,
        added,
        skipped,
    }
}

/// Sort guests case-insensitively by display name, keeping ties in order.
pub fn sort_by_display_name(guests: &mut [Guest]) {
    let order = NameOrder::new();
    guests.sort_by(|a, b| order.compare(&a.display_name, &b.display_name));
}
