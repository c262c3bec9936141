//! Expected row counts taken from the raw document text.

/// Count start tags `<{prefix}:{local}` (or `<{local}` without a prefix) in
/// `text`. The tag name must be followed by whitespace, `/` or `>`, so `Obs`
/// does not also count `ObsValue`.
pub fn count_markers(text: &str, prefix: Option<&str>, local: &str) -> usize {
    let marker = marker(prefix, local);
    text.match_indices(&marker)
        .filter(|(start, _)| {
            text[start + marker.len()..]
                .chars()
                .next()
                .is_some_and(|c| c.is_whitespace() || c == '/' || c == '>')
        })
        .count()
}

/// The literal searched for by [`count_markers`].
pub fn marker(prefix: Option<&str>, local: &str) -> String {
    match prefix {
        Some(prefix) => format!("<{prefix}:{local}"),
        None => format!("<{local}"),
    }
}
