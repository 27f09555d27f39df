//! Identifier and link rules.

/// Characters replaced with `_` when deriving a panel identifier.
const PANEL_ID_CHARS: &[char] = &['.', ' ', '(', ')', '[', ']'];

/// Characters replaced with `_` when deriving a container tag from a name.
const TAG_CHARS: &[char] = &['.', ' ', ',', '(', ')', '}', '[', ']'];

/// Derive a panel identifier from a catalogue title.
///
/// Uniqueness across a page is up to the caller.
pub fn panel_id(title: &str) -> String {
    title.replace(PANEL_ID_CHARS, "_")
}

/// Derive a container tag from a catalogue display name.
pub fn tag_for(name: &str) -> String {
    name.replace(TAG_CHARS, "_")
}

/// Ensure a link base ends with exactly one trailing `/`.
pub fn normalize_path(path: &str) -> String {
    if path.ends_with('/') {
        path.to_string()
    } else {
        format!("{}/", path)
    }
}

/// Join a link base and a catalogue-relative file.
pub fn join_link(path: &str, file: &str) -> String {
    format!("{}{}", normalize_path(path), file)
}
