use serde::{Deserialize, Serialize};

/// What to do when a linked node cannot be fetched or decoded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnreadablePolicy {
    /// Report it, leave every edge to it unchanged, and keep going.
    #[default]
    Skip,
    /// Abort the run.
    Abort,
}

/// Settings for one migration run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationConfig {
    #[serde(default)]
    pub unreadable: UnreadablePolicy,
}

impl MigrationConfig {
    /// Config that aborts on the first unreadable node.
    pub fn strict() -> Self {
        Self {
            unreadable: UnreadablePolicy::Abort,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_skips() {
        let c = MigrationConfig::default();
        assert_eq!(c.unreadable, UnreadablePolicy::Skip);
        assert_eq!(MigrationConfig::strict().unreadable, UnreadablePolicy::Abort);
    }

    #[test]
    fn parses_from_json() {
        let c: MigrationConfig = serde_json::from_str(r#"{"unreadable":"abort"}"#).unwrap();
        assert_eq!(c, MigrationConfig::strict());

        let c: MigrationConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(c, MigrationConfig::default());
    }
}
