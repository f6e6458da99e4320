//! Static dependency extraction for calculated settings.
//!
//! The scan is purely lexical: it finds `resources.<name>` and
//! `resources["<name>"]` / `resources['<name>']` occurrences in the script
//! text. References assembled at runtime (string concatenation, indirect
//! variables) are invisible to it. That is a documented property of the
//! engine, not an oversight: subscriptions are decided once at compile
//! time, never traced during evaluation.

/// Extract the datasource names a script references, in first-seen order,
/// without duplicates.
pub fn scan_resource_refs(script: &str) -> Vec<String> {
    let chars: Vec<char> = script.chars().collect();
    let mut names: Vec<String> = Vec::new();
    let mut i = 0;

    const NEEDLE: &[char] = &['r', 'e', 's', 'o', 'u', 'r', 'c', 'e', 's'];

    while i < chars.len() {
        if !starts_with(&chars, i, NEEDLE) {
            i += 1;
            continue;
        }
        // Must not be the tail of a longer identifier
        if i > 0 && is_ident_char(chars[i - 1]) {
            i += 1;
            continue;
        }

        let after = i + NEEDLE.len();
        if let Some(name) = match chars.get(after) {
            Some('.') => collect_property(&chars, after + 1),
            Some('[') => collect_quoted(&chars, after + 1),
            _ => None,
        } {
            if !names.contains(&name) {
                names.push(name);
            }
        }
        i = after;
    }

    names
}

/// First referenced datasource name, if any. Interactive widgets use this
/// to recover a write-back target from their value setting.
pub fn first_resource_ref(script: &str) -> Option<String> {
    scan_resource_refs(script).into_iter().next()
}

fn starts_with(chars: &[char], at: usize, needle: &[char]) -> bool {
    chars.len() >= at + needle.len() && chars[at..at + needle.len()] == *needle
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

// `resources.name` - name is a run of word characters or hyphens
fn collect_property(chars: &[char], from: usize) -> Option<String> {
    let mut name = String::new();
    let mut i = from;
    while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_' || chars[i] == '-')
    {
        name.push(chars[i]);
        i += 1;
    }
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

// `resources["name"]` or `resources['name']` - anything up to the quote
fn collect_quoted(chars: &[char], from: usize) -> Option<String> {
    let quote = match chars.get(from) {
        Some('"') => '"',
        Some('\'') => '\'',
        _ => return None,
    };
    let mut name = String::new();
    let mut i = from + 1;
    while i < chars.len() && chars[i] != quote {
        name.push(chars[i]);
        i += 1;
    }
    if name.is_empty() || i >= chars.len() {
        None
    } else {
        Some(name)
    }
}
