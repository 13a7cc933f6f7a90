//! Reader for the `[Desktop Entry]` group of `.desktop` files.

use std::collections::HashMap;

const MAIN_GROUP: &str = "Desktop Entry";

/// Key/value pairs of the `[Desktop Entry]` group.
///
/// Localized keys are stored verbatim, e.g. `Name[de_DE]`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DesktopEntry {
    values: HashMap<String, String>,
}

impl DesktopEntry {
    /// Parses the `[Desktop Entry]` group of `content`.
    ///
    /// Other groups, comments and malformed lines are ignored. When a key is
    /// repeated the first value wins.
    pub fn parse(content: &str) -> Self {
        let mut values = HashMap::new();
        let mut in_main_group = false;

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some(group) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                in_main_group = group == MAIN_GROUP;
                continue;
            }

            if !in_main_group {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                continue;
            };

            values
                .entry(key.trim().to_string())
                .or_insert_with(|| unescape(value.trim()));
        }

        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Looks up `key` for `locale`, trying `key[ll_CC]`, then `key[ll]`, then `key`.
    pub fn localized(&self, key: &str, locale: Option<&str>) -> Option<&str> {
        if let Some(locale) = locale {
            if let Some(value) = self.get(&format!("{key}[{locale}]")) {
                return Some(value);
            }
            if let Some((lang, _)) = locale.split_once('_') {
                if let Some(value) = self.get(&format!("{key}[{lang}]")) {
                    return Some(value);
                }
            }
        }
        self.get(key)
    }

    pub fn get_bool(&self, key: &str) -> bool {
        self.get(key).is_some_and(|value| value == "true")
    }

    /// Whether the entry describes an application that appears in launchers.
    pub fn is_launchable(&self) -> bool {
        self.get("Type") == Some("Application")
            && self.get("Exec").is_some_and(|exec| !exec.is_empty())
            && !self.get_bool("NoDisplay")
            && !self.get_bool("Hidden")
    }
}

fn unescape(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut chars = value.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('s') => result.push(' '),
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('r') => result.push('\r'),
            Some('\\') => result.push('\\'),
            Some(other) => {
                result.push('\\');
                result.push(other);
            }
            None => result.push('\\'),
        }
    }

    result
}
