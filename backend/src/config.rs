//! Match configuration: JSON file, then environment, then CLI flags.
//!
//! # Environment variables
//!
//! | Variable               | Overrides                  |
//! |------------------------|----------------------------|
//! | `RECMATCH_ID_KEY`      | [`MatchOptions::id_key`]      |
//! | `RECMATCH_HASH_IDS`    | [`MatchOptions::hash_ids`]    |
//! | `RECMATCH_MATCH_FIELD` | [`MatchOptions::match_field`] |
//!
//! A `.env` file in the working directory is loaded by the CLI at startup.

use std::path::Path;

use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::matching::pipeline::MatchOptions;

pub const ENV_ID_KEY: &str = "RECMATCH_ID_KEY";
pub const ENV_HASH_IDS: &str = "RECMATCH_HASH_IDS";
pub const ENV_MATCH_FIELD: &str = "RECMATCH_MATCH_FIELD";

/// Read [`MatchOptions`] from a JSON file; missing fields take their defaults.
pub fn load_options_file(path: &Path) -> ConfigResult<MatchOptions> {
    let content = std::fs::read_to_string(path)?;
    let options: MatchOptions = serde_json::from_str(&content)?;
    debug!(path = %path.display(), "loaded match options");
    Ok(options)
}

/// Apply environment overrides from the process environment.
pub fn apply_env(options: MatchOptions) -> ConfigResult<MatchOptions> {
    apply_overrides(options, |name| std::env::var(name).ok())
}

/// Apply overrides from any variable lookup.
///
/// Empty values are ignored.
pub fn apply_overrides<F>(mut options: MatchOptions, lookup: F) -> ConfigResult<MatchOptions>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(key) = get(ENV_ID_KEY) {
        options.id_key = key.trim().to_string();
    }
    if let Some(raw) = get(ENV_HASH_IDS) {
        options.hash_ids = parse_bool(ENV_HASH_IDS, &raw)?;
    }
    if let Some(field) = get(ENV_MATCH_FIELD) {
        options.match_field = field.trim().to_string();
    }

    Ok(options)
}

/// Options from an optional file, with environment overrides applied.
pub fn resolve_options(file: Option<&Path>) -> ConfigResult<MatchOptions> {
    let base = match file {
        Some(path) => load_options_file(path)?,
        None => MatchOptions::default(),
    };
    apply_env(base)
}

fn parse_bool(name: &str, raw: &str) -> ConfigResult<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            name: name.to_string(),
            value: raw.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::pipeline::MergeStrategy;
    use crate::models::JoinMode;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_overrides_applied() {
        let options = apply_overrides(
            MatchOptions::default(),
            lookup(&[(ENV_ID_KEY, "patient_id"), (ENV_HASH_IDS, "no"), (ENV_MATCH_FIELD, "nid")]),
        )
        .unwrap();

        assert_eq!(options.id_key, "patient_id");
        assert!(!options.hash_ids);
        assert_eq!(options.match_field, "nid");
    }

    #[test]
    fn test_empty_values_ignored() {
        let options = apply_overrides(MatchOptions::default(), lookup(&[(ENV_ID_KEY, "  ")])).unwrap();
        assert_eq!(options.id_key, "id");
    }

    #[test]
    fn test_invalid_bool() {
        let err = apply_overrides(MatchOptions::default(), lookup(&[(ENV_HASH_IDS, "maybe")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref name, .. } if name == ENV_HASH_IDS));
    }

    #[test]
    fn test_options_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plan.json");
        std::fs::write(
            &path,
            r#"{"id_key": "code", "hash_ids": false, "strategy": {"type": "horizontal", "how": "outer"}}"#,
        )
        .unwrap();

        let options = load_options_file(&path).unwrap();
        assert_eq!(options.id_key, "code");
        assert!(!options.hash_ids);
        assert_eq!(options.match_field, "match_id");
        assert_eq!(options.strategy, MergeStrategy::Horizontal { how: JoinMode::Outer });
    }

    #[test]
    fn test_options_file_invalid_mode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plan.json");
        std::fs::write(&path, r#"{"strategy": {"type": "horizontal", "how": "sideways"}}"#).unwrap();

        assert!(matches!(load_options_file(&path), Err(ConfigError::Json(_))));
    }
}
