//! Inbound deep-link parsing
//!
//! Turns a raw link such as
//!
//! ```text
//! saucelinktest://saucelink/webview?url=https%3A%2F%2Fshop.test%2Fp&slink=abc
//! saucelinktest://saucelink/native?slink=abc&sLinkT=1700000000&productId=prod-001
//! ```
//!
//! into a [`ResolvedLink`]. Parsing is pure and never fails on bad
//! percent-encoding: the raw text is kept instead, since a route with a
//! slightly wrong URL beats a dropped link.

use std::borrow::Cow;

use percent_encoding::percent_decode_str;
use url::Url;

use crate::error::ParseError;
use crate::types::{ResolvedLink, Surface};

/// Custom scheme accepted when none is configured
pub const DEFAULT_SCHEME: &str = "saucelinktest";

/// Fixed authority accepted when none is configured
pub const DEFAULT_HOST: &str = "saucelink";

const UNIVERSAL_LINK_SCHEME: &str = "https";

/// Accepted spellings of the attribution code key (case-sensitive)
pub const ATTRIBUTION_CODE_KEYS: [&str; 2] = ["slink", "sLink"];

pub const ATTRIBUTION_EXPIRY_KEY: &str = "sLinkT";

pub const PRODUCT_ID_KEY: &str = "productId";

/// Marker located in the raw query of a web-view link
const WEB_TARGET_MARKER: &str = "url=";

/// Parser bound to one scheme/host pair, plus optional universal-link hosts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkParser {
    scheme: String,
    host: String,
    universal_hosts: Vec<String>,
}

impl Default for LinkParser {
    fn default() -> Self {
        Self::new(DEFAULT_SCHEME, DEFAULT_HOST)
    }
}

impl LinkParser {
    pub fn new(scheme: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            host: host.into(),
            universal_hosts: Vec::new(),
        }
    }

    /// Also accept `https://<host>/...` for each listed host
    pub fn with_universal_hosts<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.universal_hosts = hosts.into_iter().map(Into::into).collect();
        self
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Parse a raw inbound link.
    ///
    /// Errors only when the link is not addressed to us (wrong scheme or
    /// host) or is not a URI at all. Unrecognised paths resolve to
    /// [`Surface::Unknown`].
    pub fn parse(&self, raw: &str) -> Result<ResolvedLink, ParseError> {
        let url = Url::parse(raw.trim()).map_err(|e| ParseError::InvalidUri(e.to_string()))?;
        self.check_origin(&url)?;

        // Every separator is dropped, so "/web/view" selects the same surface as "/webview"
        let path = url.path().replace('/', "");
        let raw_query = url.query().unwrap_or_default();

        let link = match Surface::from_path(&path) {
            Surface::Web => match extract_web_target(raw_query) {
                Some(target) => ResolvedLink::web(target),
                None => {
                    tracing::warn!("Web-view link without a url parameter: {}", raw);
                    ResolvedLink::unknown()
                }
            },
            Surface::Native => {
                let params = QueryParams::parse(raw_query);
                ResolvedLink::native(
                    params.first_of(&ATTRIBUTION_CODE_KEYS),
                    params.first_of(&[ATTRIBUTION_EXPIRY_KEY]),
                    params.first_of(&[PRODUCT_ID_KEY]),
                )
            }
            Surface::Unknown => {
                tracing::debug!("Unknown link path '{}'", path);
                ResolvedLink::unknown()
            }
        };

        tracing::debug!(
            surface = %link.surface(),
            target_url = ?link.target_url(),
            attribution_code = ?link.attribution_code(),
            attribution_expiry = ?link.attribution_expiry(),
            product_id = ?link.product_id(),
            "Parsed link"
        );

        Ok(link)
    }

    fn check_origin(&self, url: &Url) -> Result<(), ParseError> {
        let host = url.host_str();

        if url.scheme().eq_ignore_ascii_case(&self.scheme) {
            return match host {
                Some(h) if h == self.host => Ok(()),
                _ => Err(ParseError::UnsupportedHost {
                    host: host.map(str::to_string),
                }),
            };
        }

        if url.scheme() == UNIVERSAL_LINK_SCHEME && !self.universal_hosts.is_empty() {
            return match host {
                Some(h) if self.universal_hosts.iter().any(|u| u.eq_ignore_ascii_case(h)) => {
                    Ok(())
                }
                _ => Err(ParseError::UnsupportedHost {
                    host: host.map(str::to_string),
                }),
            };
        }

        Err(ParseError::UnsupportedScheme {
            scheme: url.scheme().to_string(),
        })
    }
}

/// Parse with the default scheme and host
pub fn parse_link(raw: &str) -> Result<ResolvedLink, ParseError> {
    LinkParser::default().parse(raw)
}

// ─────────────────────────────────────────────────────────────────
// Web Target Extraction
// ─────────────────────────────────────────────────────────────────

/// Take everything after `url=` in the undecoded query as the destination.
///
/// A standard query decode would split a destination that carries its own
/// query string. Callers also append destination parameters with `&` instead
/// of `?`, so when the decoded target has no `?` the first `&` becomes one.
fn extract_web_target(raw_query: &str) -> Option<String> {
    let start = raw_query.find(WEB_TARGET_MARKER)? + WEB_TARGET_MARKER.len();
    let mut target = decode_or_raw(&raw_query[start..]).into_owned();

    if !target.contains('?') {
        if let Some(idx) = target.find('&') {
            target.replace_range(idx..=idx, "?");
        }
    }

    (!target.is_empty()).then_some(target)
}

// ─────────────────────────────────────────────────────────────────
// Percent Decoding
// ─────────────────────────────────────────────────────────────────

/// Strictly percent-decode `raw`.
///
/// Fails on a `%` not followed by two hex digits, or when the decoded bytes
/// are not UTF-8. `+` is left as-is.
pub fn percent_decode(raw: &str) -> Result<Cow<'_, str>, ParseError> {
    let malformed = || ParseError::MalformedEncoding {
        raw: raw.to_string(),
    };

    let bytes = raw.as_bytes();
    for (i, _) in bytes.iter().enumerate().filter(|(_, b)| **b == b'%') {
        let valid = bytes
            .get(i + 1..i + 3)
            .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit));
        if !valid {
            return Err(malformed());
        }
    }

    percent_decode_str(raw).decode_utf8().map_err(|_| malformed())
}

/// Percent-decode, falling back to the raw text on malformed input
pub fn decode_or_raw(raw: &str) -> Cow<'_, str> {
    match percent_decode(raw) {
        Ok(decoded) => decoded,
        Err(e) => {
            tracing::warn!("{}; keeping raw value", e);
            Cow::Borrowed(raw)
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Query Parameters
// ─────────────────────────────────────────────────────────────────

/// Ordered name/value pairs. A pair without `=` has no value.
struct QueryParams {
    pairs: Vec<(String, Option<String>)>,
}

impl QueryParams {
    fn parse(raw_query: &str) -> Self {
        let pairs = raw_query
            .split('&')
            .filter(|segment| !segment.is_empty())
            .map(|segment| match segment.split_once('=') {
                Some((name, value)) => (
                    decode_or_raw(name).into_owned(),
                    Some(decode_or_raw(value).into_owned()),
                ),
                None => (decode_or_raw(segment).into_owned(), None),
            })
            .collect();
        Self { pairs }
    }

    /// Value of the first pair whose name is any of `names`
    fn first_of(&self, names: &[&str]) -> Option<String> {
        self.pairs
            .iter()
            .find(|(name, _)| names.contains(&name.as_str()))
            .and_then(|(_, value)| value.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

    fn native(query: &str) -> ResolvedLink {
        parse_link(&format!("saucelinktest://saucelink/native?{query}")).unwrap()
    }

    // ─────────────────────────────────────────────────────────
    // Origin checks
    // ─────────────────────────────────────────────────────────

    #[test]
    fn test_rejects_other_scheme() {
        let err = parse_link("otherapp://saucelink/native?slink=abc").unwrap_err();
        assert_eq!(
            err,
            ParseError::UnsupportedScheme {
                scheme: "otherapp".into()
            }
        );
    }

    #[test]
    fn test_rejects_other_host() {
        let err = parse_link("saucelinktest://elsewhere/native").unwrap_err();
        assert_eq!(
            err,
            ParseError::UnsupportedHost {
                host: Some("elsewhere".into())
            }
        );
    }

    #[test]
    fn test_rejects_non_uri() {
        assert!(matches!(
            parse_link("not a link"),
            Err(ParseError::InvalidUri(_))
        ));
    }

    #[test]
    fn test_https_rejected_without_universal_hosts() {
        let err = parse_link("https://shop.test/native?slink=abc").unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedScheme { .. }));
    }

    #[test]
    fn test_universal_link_accepted_for_listed_host() {
        let parser = LinkParser::default().with_universal_hosts(["links.shop.test"]);
        let link = parser
            .parse("https://links.shop.test/native?slink=abc&productId=p1")
            .unwrap();
        assert_eq!(link.surface(), Surface::Native);
        assert_eq!(link.attribution_code(), Some("abc"));
        assert_eq!(link.product_id(), Some("p1"));

        let err = parser.parse("https://other.test/native").unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedHost { .. }));
    }

    #[test]
    fn test_custom_scheme_and_host() {
        let parser = LinkParser::new("myshop", "deeplink");
        assert_eq!(parser.scheme(), "myshop");
        assert_eq!(parser.host(), "deeplink");
        let link = parser.parse("myshop://deeplink/native").unwrap();
        assert_eq!(link.surface(), Surface::Native);
        assert!(parser.parse("saucelinktest://saucelink/native").is_err());
    }

    // ─────────────────────────────────────────────────────────
    // Surface selection
    // ─────────────────────────────────────────────────────────

    #[test]
    fn test_unknown_path_has_no_fields() {
        let link = parse_link("saucelinktest://saucelink/bogus?slink=abc&productId=p1").unwrap();
        assert_eq!(link, ResolvedLink::unknown());
    }

    #[test]
    fn test_path_separators_are_trimmed() {
        let link = parse_link("saucelinktest://saucelink//native/?slink=abc").unwrap();
        assert_eq!(link.surface(), Surface::Native);
    }

    #[test]
    fn test_inner_separators_are_removed() {
        let link = parse_link("saucelinktest://saucelink/web/view?url=https://x.test").unwrap();
        assert_eq!(link.surface(), Surface::Web);
        assert_eq!(link.target_url(), Some("https://x.test"));

        let link = parse_link("saucelinktest://saucelink/na/tive?slink=abc").unwrap();
        assert_eq!(link.surface(), Surface::Native);
    }

    #[test]
    fn test_nested_unknown_path_stays_unknown() {
        let link = parse_link("saucelinktest://saucelink/native/extra").unwrap();
        assert_eq!(link.surface(), Surface::Unknown);
    }

    #[test]
    fn test_empty_path_is_unknown() {
        let link = parse_link("saucelinktest://saucelink").unwrap();
        assert_eq!(link.surface(), Surface::Unknown);
    }

    // ─────────────────────────────────────────────────────────
    // Native links
    // ─────────────────────────────────────────────────────────

    #[test]
    fn test_native_link_fields() {
        let link = native("slink=abc123&sLinkT=999&productId=prod-001");
        assert_eq!(link.surface(), Surface::Native);
        assert_eq!(link.attribution_code(), Some("abc123"));
        assert_eq!(link.attribution_expiry(), Some("999"));
        assert_eq!(link.product_id(), Some("prod-001"));
        assert_eq!(link.target_url(), None);
    }

    #[test]
    fn test_native_link_without_params() {
        let link = parse_link("saucelinktest://saucelink/native").unwrap();
        assert_eq!(link, ResolvedLink::native(None, None, None));
    }

    #[test]
    fn test_alias_equivalence() {
        assert_eq!(
            native("slink=code1").attribution_code(),
            native("sLink=code1").attribution_code()
        );
        assert_eq!(native("sLink=code1").attribution_code(), Some("code1"));
    }

    #[test]
    fn test_keys_are_case_sensitive() {
        let link = native("SLINK=abc&slinkt=1&productid=p");
        assert_eq!(link.attribution_code(), None);
        assert_eq!(link.attribution_expiry(), None);
        assert_eq!(link.product_id(), None);
    }

    #[test]
    fn test_first_match_wins_across_aliases() {
        let link = native("sLink=first&slink=second&productId=a&productId=b");
        assert_eq!(link.attribution_code(), Some("first"));
        assert_eq!(link.product_id(), Some("a"));
    }

    #[test]
    fn test_key_without_value_is_absent() {
        let link = native("slink&productId=p1");
        assert_eq!(link.attribution_code(), None);
        assert_eq!(link.product_id(), Some("p1"));
    }

    #[test]
    fn test_plus_is_not_a_space() {
        let link = native("slink=a+b");
        assert_eq!(link.attribution_code(), Some("a+b"));
    }

    #[test]
    fn test_malformed_value_kept_raw() {
        let link = native("slink=ab%zzcd&productId=p%2D1");
        assert_eq!(link.attribution_code(), Some("ab%zzcd"));
        assert_eq!(link.product_id(), Some("p-1"));
    }

    #[test]
    fn test_native_values_survive_reencoding() {
        let code = "abc 123/é?";
        let expiry = "2026-10-19T00:00:00Z";
        let product = "prod&001=x";
        let encode = |v: &str| utf8_percent_encode(v, NON_ALPHANUMERIC).to_string();
        let query = format!(
            "slink={}&sLinkT={}&productId={}",
            encode(code),
            encode(expiry),
            encode(product)
        );

        let link = native(&query);

        let reserialized = format!(
            "slink={}&sLinkT={}&productId={}",
            encode(link.attribution_code().unwrap()),
            encode(link.attribution_expiry().unwrap()),
            encode(link.product_id().unwrap())
        );
        assert_eq!(reserialized, query);
        assert_eq!(link.attribution_code(), Some(code));
    }

    // ─────────────────────────────────────────────────────────
    // Web links
    // ─────────────────────────────────────────────────────────

    #[test]
    fn test_web_target_repairs_first_ampersand() {
        let link =
            parse_link("saucelinktest://saucelink/webview?url=https%3A%2F%2Fx.test%2Fp&slink=abc")
                .unwrap();
        assert_eq!(link.surface(), Surface::Web);
        assert_eq!(link.target_url(), Some("https://x.test/p?slink=abc"));
        assert_eq!(link.attribution_code(), None);
    }

    #[test]
    fn test_web_target_keeps_existing_query() {
        let link =
            parse_link("saucelinktest://saucelink/webview?url=https://example.com?slink=abc123&x=1")
                .unwrap();
        assert_eq!(
            link.target_url(),
            Some("https://example.com?slink=abc123&x=1")
        );
    }

    #[test]
    fn test_web_target_only_first_ampersand_rewritten() {
        let link =
            parse_link("saucelinktest://saucelink/webview?url=https://x.test/p&a=1&b=2").unwrap();
        assert_eq!(link.target_url(), Some("https://x.test/p?a=1&b=2"));
    }

    #[test]
    fn test_web_target_after_other_params() {
        let link =
            parse_link("saucelinktest://saucelink/webview?ref=home&url=https%3A%2F%2Fx.test")
                .unwrap();
        assert_eq!(link.target_url(), Some("https://x.test"));
    }

    #[test]
    fn test_web_target_malformed_encoding_kept_raw() {
        let link = parse_link("saucelinktest://saucelink/webview?url=https://x.test/100%").unwrap();
        assert_eq!(link.target_url(), Some("https://x.test/100%"));
    }

    #[test]
    fn test_web_without_url_is_unknown() {
        let link = parse_link("saucelinktest://saucelink/webview?slink=abc").unwrap();
        assert_eq!(link, ResolvedLink::unknown());

        let link = parse_link("saucelinktest://saucelink/webview?url=").unwrap();
        assert_eq!(link, ResolvedLink::unknown());
    }

    // ─────────────────────────────────────────────────────────
    // Decoding helpers
    // ─────────────────────────────────────────────────────────

    #[test]
    fn test_percent_decode_strict() {
        assert_eq!(percent_decode("a%20b").unwrap(), "a b");
        assert!(matches!(
            percent_decode("a%2"),
            Err(ParseError::MalformedEncoding { .. })
        ));
        assert!(percent_decode("%ff%fe").is_err());
    }

    #[test]
    fn test_decode_or_raw_falls_back() {
        assert_eq!(decode_or_raw("%41"), "A");
        assert_eq!(decode_or_raw("%G1"), "%G1");
    }
}
