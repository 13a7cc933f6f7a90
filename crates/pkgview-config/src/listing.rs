use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Ordering applied to the application list when none is requested explicitly.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Keep registry order
    None,
    /// Order by display name
    #[default]
    Name,
    /// Order by package identifier
    Package,
}

impl SortKey {
    pub const ALL: [SortKey; 3] = [SortKey::None, SortKey::Name, SortKey::Package];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::None => "none",
            SortKey::Name => "name",
            SortKey::Package => "package",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!(
                    "unknown sort key '{s}', expected one of: {}",
                    Self::ALL.map(|key| key.as_str()).join(", ")
                )
            })
    }
}
