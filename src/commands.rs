//! One-shot `parse` and `route` commands

use std::path::Path;
use std::sync::Arc;

use slink_app::{load_settings, Engine};
use slink_core::prelude::*;
use slink_sdk::SimulatedSdk;

/// Parse `raw` with the project's link settings and render the result as JSON
pub fn parse_to_json(project_path: &Path, raw: &str) -> Result<String> {
    let parser = load_settings(project_path).link.parser();
    let link = parser.parse(raw)?;
    Ok(serde_json::to_string(&link)?)
}

/// Route each link through a project engine, one JSON decision per link.
///
/// Native links update the project's stored attribution token.
pub fn route_to_json(project_path: &Path, links: &[String]) -> Result<Vec<String>> {
    let engine = Engine::from_project(project_path, Arc::new(SimulatedSdk::default()));

    links
        .iter()
        .map(|raw| {
            let decision = engine.handle_link(raw);
            Ok(serde_json::to_string(&decision)?)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_to_json_native() {
        let temp = tempdir().unwrap();
        let json = parse_to_json(
            temp.path(),
            "saucelinktest://saucelink/native?slink=abc&productId=p1",
        )
        .unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["surface"], "native");
        assert_eq!(value["attribution_code"], "abc");
        assert_eq!(value["product_id"], "p1");
    }

    #[test]
    fn test_parse_to_json_rejects_foreign_scheme() {
        let temp = tempdir().unwrap();
        let err = parse_to_json(temp.path(), "otherapp://saucelink/native").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_route_to_json_persists_attribution() {
        let temp = tempdir().unwrap();
        let lines = route_to_json(
            temp.path(),
            &[
                "saucelinktest://saucelink/native?slink=abc".to_string(),
                "otherapp://x".to_string(),
            ],
        )
        .unwrap();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("open_native"));
        assert!(lines[1].contains("ignore"));
        assert!(temp.path().join(".slink/attribution.toml").exists());
    }
}
