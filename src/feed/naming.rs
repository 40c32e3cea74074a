/// Derive the system name for a display name.
///
/// Splits camelCase words, lowercases, and collapses every run of
/// non-alphanumeric characters into a single `_`.
pub fn system_name(display_name: &str) -> String {
    let mut out = String::with_capacity(display_name.len());
    let mut prev: Option<char> = None;

    for ch in display_name.trim().chars() {
        if ch.is_alphanumeric() {
            let word_break = ch.is_uppercase()
                && prev.is_some_and(|p| p.is_lowercase() || p.is_ascii_digit());
            if word_break {
                push_separator(&mut out);
            }
            out.extend(ch.to_lowercase());
        } else {
            push_separator(&mut out);
        }
        prev = Some(ch);
    }

    while out.ends_with('_') {
        out.pop();
    }
    out
}

/// Key used to check feed-name uniqueness within a category.
pub fn feed_name_key(category_system_name: &str, system_feed_name: &str) -> String {
    format!("{}.{}", category_system_name, system_feed_name)
}

fn push_separator(out: &mut String) {
    if !out.is_empty() && !out.ends_with('_') {
        out.push('_');
    }
}
