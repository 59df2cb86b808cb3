//! Partner credentials and target environment passed to `configure`

use serde::{Deserialize, Serialize};

/// SDK backend environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Stage,
    Prod,
}

impl Environment {
    pub fn display_name(&self) -> &'static str {
        match self {
            Environment::Stage => "Stage",
            Environment::Prod => "Prod",
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Stage => write!(f, "stage"),
            Environment::Prod => write!(f, "prod"),
        }
    }
}

/// Partner identity used to authenticate the SDK
#[derive(Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Credentials {
    #[serde(default)]
    pub partner_id: String,

    #[serde(default)]
    pub token: String,

    #[serde(default)]
    pub environment: Environment,
}

impl Credentials {
    pub fn new(
        partner_id: impl Into<String>,
        token: impl Into<String>,
        environment: Environment,
    ) -> Self {
        Self {
            partner_id: partner_id.into(),
            token: token.into(),
            environment,
        }
    }

    /// Both partner id and token must be present before `configure` is called
    pub fn is_configured(&self) -> bool {
        !self.partner_id.is_empty() && !self.token.is_empty()
    }
}

// Token stays out of logs
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("partner_id", &self.partner_id)
            .field("token", &if self.token.is_empty() { "" } else { "***" })
            .field("environment", &self.environment)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_configured() {
        assert!(!Credentials::default().is_configured());
        assert!(!Credentials::new("partner", "", Environment::Stage).is_configured());
        assert!(!Credentials::new("", "token", Environment::Stage).is_configured());
        assert!(Credentials::new("partner", "token", Environment::Prod).is_configured());
    }

    #[test]
    fn test_debug_redacts_token() {
        let creds = Credentials::new("partner", "s3cret", Environment::Stage);
        let debug = format!("{:?}", creds);
        assert!(debug.contains("partner"));
        assert!(!debug.contains("s3cret"));
    }

    #[test]
    fn test_environment_defaults_to_stage() {
        let creds: Credentials = toml::from_str("partner_id = \"p\"").unwrap();
        assert_eq!(creds.environment, Environment::Stage);
        assert_eq!(creds.environment.display_name(), "Stage");
    }

    #[test]
    fn test_environment_parses_lowercase() {
        let creds: Credentials = toml::from_str("environment = \"prod\"").unwrap();
        assert_eq!(creds.environment, Environment::Prod);
        assert_eq!(creds.environment.to_string(), "prod");
    }
}
