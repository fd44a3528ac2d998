//! SQL utility functions

/// Where the user text must appear inside a LIKE match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeAnchor {
    Anywhere,
    Start,
    End,
}

/// Escape SQL LIKE metacharacters (%, _, \) in user input
///
/// Pair the resulting pattern with `ESCAPE '\'`.
///
/// # Example
///
/// ```
/// use usergrid_server::utils::sql::escape_like_pattern;
///
/// let pattern = format!("%{}%", escape_like_pattern("50%_off"));
/// assert_eq!(pattern, "%50\\%\\_off%");
/// ```
pub fn escape_like_pattern(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Build a LIKE pattern that matches `text` literally at the given anchor
pub fn like_pattern(text: &str, anchor: LikeAnchor) -> String {
    let escaped = escape_like_pattern(text);
    match anchor {
        LikeAnchor::Anywhere => format!("%{escaped}%"),
        LikeAnchor::Start => format!("{escaped}%"),
        LikeAnchor::End => format!("%{escaped}"),
    }
}
