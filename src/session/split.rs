/// Splits an event list at commas, except those inside a `pmu/.../` term list.
pub(crate) fn split_events(list: &str) -> Vec<&str> {
    let mut events = vec![];
    let mut start = 0;
    let mut in_terms = false;
    for (i, c) in list.char_indices() {
        match c {
            '/' => in_terms = !in_terms,
            ',' if !in_terms => {
                events.push(&list[start..i]);
                start = i + 1;
            }
            _ => (),
        }
    }
    events.push(&list[start..]);

    events
        .into_iter()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .collect()
}
