use serde::{Deserialize, Serialize};

/// The visual theme selected on the settings page.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Default,
    Cool,
    Dark,
}

serde_plain::derive_display_from_serialize!(Theme);
serde_plain::derive_fromstr_from_deserialize!(Theme);

/// The singleton settings record. Saving always replaces the whole record.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub notifications: bool,
}

impl Settings {
    pub fn new(theme: Theme, notifications: bool) -> Self {
        Self {
            theme,
            notifications,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_default() {
        let s: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(s, Settings::default());
        assert_eq!(s.theme, Theme::Default);
        assert!(!s.notifications);
    }

    #[test]
    fn test_round_trip_shape() {
        let s = Settings::new(Theme::Dark, true);
        let json = serde_json::to_string(&s).unwrap();
        assert_eq!(json, r#"{"theme":"dark","notifications":true}"#);
    }
}
