use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;

pub const DEFAULT_DEBUG_CALLEE: &str = "debugPrint";

static IDENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("valid identifier regex"));

/// Plugin options as passed by the host in the SWC plugin config block.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct PluginConfig {
    /// Directory tag paths are made relative to. Falls back to the host cwd.
    pub base_dir: Option<String>,
    /// Function `$debug(..)` calls are rewritten to.
    pub debug_callee: String,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            base_dir: None,
            debug_callee: DEFAULT_DEBUG_CALLEE.to_string(),
        }
    }
}

impl PluginConfig {
    /// Parse the raw JSON config. Bad input is logged and replaced by defaults.
    pub fn from_json(raw: Option<&str>) -> Self {
        let mut config = match raw.map(str::trim) {
            None | Some("") => Self::default(),
            Some(s) => serde_json::from_str(s).unwrap_or_else(|err| {
                tracing::warn!(%err, "invalid location tag plugin config, using defaults");
                Self::default()
            }),
        };
        config.validate();
        config
    }

    fn validate(&mut self) {
        if !IDENT_RE.is_match(&self.debug_callee) {
            tracing::warn!(
                callee = %self.debug_callee,
                "debugCallee is not a valid identifier, using {}",
                DEFAULT_DEBUG_CALLEE
            );
            self.debug_callee = DEFAULT_DEBUG_CALLEE.to_string();
        }
        if matches!(self.base_dir.as_deref(), Some(s) if s.trim().is_empty()) {
            self.base_dir = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_is_default() {
        assert_eq!(PluginConfig::from_json(None), PluginConfig::default());
        assert_eq!(PluginConfig::from_json(Some("  ")), PluginConfig::default());
        assert_eq!(PluginConfig::from_json(Some("{}")), PluginConfig::default());
    }

    #[test]
    fn reads_camel_case_keys() {
        let c = PluginConfig::from_json(Some(r#"{"baseDir":"/repo","debugCallee":"dbg"}"#));
        assert_eq!(c.base_dir.as_deref(), Some("/repo"));
        assert_eq!(c.debug_callee, "dbg");
    }

    #[test]
    fn invalid_json_falls_back() {
        assert_eq!(
            PluginConfig::from_json(Some("{not json")),
            PluginConfig::default()
        );
    }

    #[test]
    fn invalid_callee_falls_back() {
        let c = PluginConfig::from_json(Some(r#"{"debugCallee":"debug-print"}"#));
        assert_eq!(c.debug_callee, DEFAULT_DEBUG_CALLEE);
        let c = PluginConfig::from_json(Some(r#"{"baseDir":""}"#));
        assert_eq!(c.base_dir, None);
    }
}
