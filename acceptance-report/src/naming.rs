// Copyright (c) The acceptance-report Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversions between machine names (method names, dotted ids) and human-readable names.

/// Turns a method name or type name into a sentence.
///
/// Underscores and camel-case boundaries become spaces, the first letter is capitalized and the
/// rest of the words are lowercased: `should_do_this` and `shouldDoThis` both become
/// `Should do this`.
pub fn humanize(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if c == '_' || c.is_whitespace() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }
        if c.is_uppercase() && !current.is_empty() {
            // A word starts at a lower-to-upper boundary, or at the last capital of a run of
            // capitals that is followed by a lowercase letter ("AWidget" -> "A", "Widget").
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|next| next.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || next_is_lower {
                words.push(std::mem::take(&mut current));
            }
        }
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }

    let sentence = words
        .iter()
        .map(|word| {
            // Keep acronyms such as "URL" intact.
            if word.chars().all(|c| !c.is_lowercase()) && word.chars().count() > 1 {
                word.clone()
            } else {
                word.to_lowercase()
            }
        })
        .collect::<Vec<_>>()
        .join(" ");

    let mut chars = sentence.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Humanizes the last segment of a dotted identifier such as `myapp.features.SomeFeature`.
pub fn humanize_id(id: &str) -> String {
    let last = id.rsplit(['.', '$', ':']).next().unwrap_or(id);
    humanize(last)
}

/// Normalizes a name for use in a file name: lowercased, with every character that is not
/// alphanumeric replaced by `_`.
pub fn normalize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_lowercase().next().unwrap_or(c)
            } else {
                '_'
            }
        })
        .collect()
}
