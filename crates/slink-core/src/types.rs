//! Core domain types for link resolution and SDK initialization state

use serde::{Deserialize, Serialize};

/// HTTP-style status reported when the SDK authenticates successfully
pub const STATUS_OK: i32 = 200;

/// Status reported when the SDK fails without surfacing a numeric code
pub const UNKNOWN_STATUS_CODE: i32 = -1;

// ─────────────────────────────────────────────────────────────────
// Resolved Links
// ─────────────────────────────────────────────────────────────────

/// Destination context an inbound link resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Surface {
    /// Embedded web view showing `target_url`
    Web,
    /// Native screen, optionally focused on a product
    Native,
    /// Path not recognised; the router ignores it
    Unknown,
}

impl Surface {
    /// Map a normalized path segment to a surface
    pub fn from_path(path: &str) -> Self {
        match path {
            "webview" => Surface::Web,
            "native" => Surface::Native,
            _ => Surface::Unknown,
        }
    }
}

impl std::fmt::Display for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Surface::Web => write!(f, "web"),
            Surface::Native => write!(f, "native"),
            Surface::Unknown => write!(f, "unknown"),
        }
    }
}

/// Structured result of parsing an inbound link.
///
/// Built only through the constructors below so that a `Web` link always
/// carries a non-empty target and an `Unknown` link carries nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedLink {
    surface: Surface,
    #[serde(skip_serializing_if = "Option::is_none")]
    target_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    attribution_code: Option<String>,
    /// Passed through uninterpreted
    #[serde(skip_serializing_if = "Option::is_none")]
    attribution_expiry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    product_id: Option<String>,
}

impl ResolvedLink {
    /// A web-view link. Returns an `Unknown` link when `target_url` is empty.
    pub fn web(target_url: impl Into<String>) -> Self {
        let target_url = target_url.into();
        if target_url.is_empty() {
            return Self::unknown();
        }
        Self {
            surface: Surface::Web,
            target_url: Some(target_url),
            attribution_code: None,
            attribution_expiry: None,
            product_id: None,
        }
    }

    pub fn native(
        attribution_code: Option<String>,
        attribution_expiry: Option<String>,
        product_id: Option<String>,
    ) -> Self {
        Self {
            surface: Surface::Native,
            target_url: None,
            attribution_code,
            attribution_expiry,
            product_id,
        }
    }

    pub fn unknown() -> Self {
        Self {
            surface: Surface::Unknown,
            target_url: None,
            attribution_code: None,
            attribution_expiry: None,
            product_id: None,
        }
    }

    pub fn surface(&self) -> Surface {
        self.surface
    }

    /// Always `Some` and non-empty for [`Surface::Web`], `None` otherwise
    pub fn target_url(&self) -> Option<&str> {
        self.target_url.as_deref()
    }

    pub fn attribution_code(&self) -> Option<&str> {
        self.attribution_code.as_deref()
    }

    pub fn attribution_expiry(&self) -> Option<&str> {
        self.attribution_expiry.as_deref()
    }

    pub fn product_id(&self) -> Option<&str> {
        self.product_id.as_deref()
    }

    /// True when the link carries a non-empty attribution code
    pub fn has_attribution(&self) -> bool {
        self.attribution_code
            .as_deref()
            .is_some_and(|code| !code.is_empty())
    }
}

/// What the caller should open after routing a link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum RouteDecision {
    /// Nothing to do
    Ignore,
    OpenWeb { url: String },
    OpenNative { product_id: Option<String> },
}

// ─────────────────────────────────────────────────────────────────
// Attribution Token
// ─────────────────────────────────────────────────────────────────

/// Last known attribution code and its expiry. Empty strings mean "not set".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributionToken {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub expiry: String,
}

impl AttributionToken {
    pub fn new(code: impl Into<String>, expiry: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            expiry: expiry.into(),
        }
    }

    pub fn is_set(&self) -> bool {
        !self.code.is_empty()
    }

    /// Expiry as an optional value, empty meaning absent
    pub fn expiry(&self) -> Option<&str> {
        (!self.expiry.is_empty()).then_some(self.expiry.as_str())
    }
}

// ─────────────────────────────────────────────────────────────────
// Authentication State
// ─────────────────────────────────────────────────────────────────

/// Phase of one SDK initialization attempt
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthPhase {
    #[default]
    Pending,
    Authenticated,
    Failed,
}

/// Reconciled outcome of an initialization attempt.
///
/// The status code only exists once the attempt is terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthState {
    #[default]
    Pending,
    Authenticated {
        status_code: i32,
    },
    Failed {
        status_code: i32,
    },
}

impl AuthState {
    /// Terminal state for a reported SDK result
    pub fn resolved(success: bool, status_code: i32) -> Self {
        if success {
            AuthState::Authenticated { status_code }
        } else {
            AuthState::Failed { status_code }
        }
    }

    pub fn phase(&self) -> AuthPhase {
        match self {
            AuthState::Pending => AuthPhase::Pending,
            AuthState::Authenticated { .. } => AuthPhase::Authenticated,
            AuthState::Failed { .. } => AuthPhase::Failed,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, AuthState::Pending)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated { .. })
    }

    pub fn status_code(&self) -> Option<i32> {
        match self {
            AuthState::Pending => None,
            AuthState::Authenticated { status_code } | AuthState::Failed { status_code } => {
                Some(*status_code)
            }
        }
    }

    /// Broadcast payload for a terminal state
    pub fn payload(&self) -> Option<AuthPayload> {
        self.status_code().map(|status_code| AuthPayload {
            success: self.is_authenticated(),
            status_code,
        })
    }
}

impl std::fmt::Display for AuthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthState::Pending => write!(f, "pending"),
            AuthState::Authenticated { status_code } => write!(f, "authenticated ({status_code})"),
            AuthState::Failed { status_code } => write!(f, "failed ({status_code})"),
        }
    }
}

/// Wire form of a terminal [`AuthState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthPayload {
    pub success: bool,
    pub status_code: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_from_path() {
        assert_eq!(Surface::from_path("webview"), Surface::Web);
        assert_eq!(Surface::from_path("native"), Surface::Native);
        assert_eq!(Surface::from_path("Native"), Surface::Unknown);
        assert_eq!(Surface::from_path(""), Surface::Unknown);
    }

    #[test]
    fn test_web_link_with_empty_target_is_unknown() {
        let link = ResolvedLink::web("");
        assert_eq!(link, ResolvedLink::unknown());
    }

    #[test]
    fn test_only_the_surface_fields_are_set() {
        let web = ResolvedLink::web("https://shop.test");
        assert_eq!(web.surface(), Surface::Web);
        assert_eq!(web.target_url(), Some("https://shop.test"));
        assert_eq!(web.attribution_code(), None);

        let native =
            ResolvedLink::native(Some("abc".into()), Some("99".into()), Some("p1".into()));
        assert_eq!(native.surface(), Surface::Native);
        assert_eq!(native.target_url(), None);
        assert_eq!(native.attribution_expiry(), Some("99"));
        assert_eq!(native.product_id(), Some("p1"));

        let unknown = ResolvedLink::unknown();
        assert_eq!(unknown.surface(), Surface::Unknown);
        assert_eq!(
            serde_json::to_value(&unknown).unwrap(),
            serde_json::json!({ "surface": "unknown" })
        );
    }

    #[test]
    fn test_has_attribution() {
        let link = ResolvedLink::native(Some("abc".into()), None, None);
        assert!(link.has_attribution());

        let link = ResolvedLink::native(Some(String::new()), None, None);
        assert!(!link.has_attribution());

        assert!(!ResolvedLink::unknown().has_attribution());
    }

    #[test]
    fn test_route_decision_serializes_tagged() {
        let json = serde_json::to_string(&RouteDecision::OpenNative {
            product_id: Some("prod-001".into()),
        })
        .unwrap();
        assert_eq!(json, r#"{"decision":"open_native","product_id":"prod-001"}"#);

        let json = serde_json::to_string(&RouteDecision::Ignore).unwrap();
        assert_eq!(json, r#"{"decision":"ignore"}"#);
    }

    #[test]
    fn test_attribution_token_expiry() {
        let token = AttributionToken::new("abc", "");
        assert!(token.is_set());
        assert_eq!(token.expiry(), None);

        let token = AttributionToken::new("abc", "1700000000");
        assert_eq!(token.expiry(), Some("1700000000"));

        assert!(!AttributionToken::default().is_set());
    }

    #[test]
    fn test_auth_state_resolved() {
        assert_eq!(
            AuthState::resolved(true, STATUS_OK),
            AuthState::Authenticated { status_code: 200 }
        );
        assert_eq!(
            AuthState::resolved(false, 401),
            AuthState::Failed { status_code: 401 }
        );
    }

    #[test]
    fn test_auth_state_accessors() {
        let pending = AuthState::default();
        assert_eq!(pending.phase(), AuthPhase::Pending);
        assert!(!pending.is_terminal());
        assert_eq!(pending.status_code(), None);
        assert_eq!(pending.payload(), None);

        let failed = AuthState::Failed { status_code: 500 };
        assert_eq!(failed.phase(), AuthPhase::Failed);
        assert!(failed.is_terminal());
        assert!(!failed.is_authenticated());
    }

    #[test]
    fn test_auth_payload_wire_format() {
        let payload = AuthState::Authenticated { status_code: 200 }
            .payload()
            .unwrap();
        let json = serde_json::to_string(&payload).unwrap();
        assert_eq!(json, r#"{"success":true,"statusCode":200}"#);
    }
}
