//! Tea varieties and the shared tea instance.

use std::fmt;
use std::str::FromStr;

use canon_core::{Flyweight, InternError};
use serde::{Deserialize, Serialize};

/// A tea variety the shop knows how to brew.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeaVariety {
    Karak,
    Jasmine,
}

impl TeaVariety {
    pub const ALL: [TeaVariety; 2] = [TeaVariety::Karak, TeaVariety::Jasmine];

    /// Canonical cache key.
    pub fn as_key(self) -> &'static str {
        match self {
            TeaVariety::Karak => "karak",
            TeaVariety::Jasmine => "jasmine",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            TeaVariety::Karak => "Karak",
            TeaVariety::Jasmine => "Jasmine",
        }
    }
}

impl FromStr for TeaVariety {
    type Err = InternError;

    /// Case-insensitive; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        TeaVariety::ALL
            .into_iter()
            .find(|v| v.as_key() == normalized)
            .ok_or_else(|| InternError::UnknownKey { key: s.to_string() })
    }
}

impl fmt::Display for TeaVariety {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Table a tea is served to. Use-site data; never stored on a [`Tea`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableNumber(pub u32);

impl From<u32> for TableNumber {
    fn from(n: u32) -> Self {
        TableNumber(n)
    }
}

impl fmt::Display for TableNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Shared tea instance, one per variety.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tea {
    variety: TeaVariety,
}

impl Tea {
    pub fn new(variety: TeaVariety) -> Self {
        Self { variety }
    }

    pub fn variety(&self) -> TeaVariety {
        self.variety
    }
}

impl Flyweight<TableNumber> for Tea {
    type Output = String;

    fn render(&self, table: &TableNumber) -> String {
        format!("Serving {} tea to table #{}", self.variety.display_name(), table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variety_parse_is_lenient_on_case_and_space() {
        assert_eq!("karak".parse::<TeaVariety>().unwrap(), TeaVariety::Karak);
        assert_eq!(" Jasmine ".parse::<TeaVariety>().unwrap(), TeaVariety::Jasmine);
        assert_eq!("KARAK".parse::<TeaVariety>().unwrap(), TeaVariety::Karak);
    }

    #[test]
    fn test_variety_parse_rejects_unknown() {
        let err = "oolong".parse::<TeaVariety>().unwrap_err();
        assert_eq!(
            err,
            InternError::UnknownKey {
                key: "oolong".to_string()
            }
        );
    }

    #[test]
    fn test_variety_keys_roundtrip() {
        for variety in TeaVariety::ALL {
            assert_eq!(variety.as_key().parse::<TeaVariety>().unwrap(), variety);
        }
    }

    #[test]
    fn test_tea_renders_table() {
        let tea = Tea::new(TeaVariety::Karak);
        assert_eq!(tea.render(&TableNumber(1)), "Serving Karak tea to table #1");
        assert_eq!(tea.render(&TableNumber(9)), "Serving Karak tea to table #9");
        assert_eq!(tea.variety(), TeaVariety::Karak);

        let jasmine = Tea::new(TeaVariety::Jasmine);
        assert_eq!(jasmine.render(&5.into()), "Serving Jasmine tea to table #5");
    }
}
