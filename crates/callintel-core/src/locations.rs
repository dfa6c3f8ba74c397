use crate::events::fold_location;
use std::collections::HashSet;

/// Distinct location names, sorted ascending.
///
/// Case variants collapse into one entry; the ordinally-smallest spelling
/// wins. A blank name is a location of its own (`""`) so its calls are still
/// counted. Callers pass names from every record of both sources, not just
/// the requested window.
pub fn list_locations<'a, I>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut all: Vec<&str> = names.into_iter().map(str::trim).collect();
    all.sort_unstable();
    all.dedup();

    let mut seen = HashSet::with_capacity(all.len());
    all.into_iter()
        .filter(|name| seen.insert(fold_location(name)))
        .map(str::to_string)
        .collect()
}
