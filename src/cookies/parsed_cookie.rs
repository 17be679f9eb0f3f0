//! `Set-Cookie` header parsing.
//!
//! Parsing never fails as a whole. A malformed attribute is dropped on its
//! own and the name/value pair survives; only a header whose name and value
//! are both empty produces nothing.

use crate::cookies::cookie_date::{format_cookie_date, parse_cookie_date};
use crate::cookies::cookie_util::{canonicalize_host, default_path};
use time::{Duration, OffsetDateTime};

/// The attributes recognized on one `Set-Cookie` header.
/// Modeled after Chromium's `net::ParsedCookie`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedCookie {
    pub name: String,
    pub value: String,
    pub expires: Option<OffsetDateTime>,
    /// `Max-Age` resolved to an absolute time.
    pub max_age: Option<OffsetDateTime>,
    pub domain: Option<String>,
    pub path: Option<String>,
    pub secure: bool,
    pub http_only: bool,
}

fn trim_ascii_ws(s: &str) -> &str {
    s.trim_matches(|c: char| c.is_ascii_whitespace())
}

fn is_max_age_value(value: &str) -> bool {
    let digits = value.strip_prefix('-').unwrap_or(value);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

impl ParsedCookie {
    /// Parse one header value.
    ///
    /// `response_path` is the path (query included) of the URL the response
    /// was received for; it supplies the default-path for a missing or
    /// malformed `Path` attribute. `now` anchors `Max-Age`.
    pub fn parse(line: &str, response_path: &str, now: OffsetDateTime) -> Option<Self> {
        let mut segments = line.split(';');
        let name_value = segments.next().unwrap_or_default();

        let (name, value) = match name_value.split_once('=') {
            Some((name, value)) => (trim_ascii_ws(name), trim_ascii_ws(value)),
            None => ("", trim_ascii_ws(name_value)),
        };
        if name.is_empty() && value.is_empty() {
            return None;
        }

        let mut parsed = ParsedCookie {
            name: name.to_string(),
            value: value.to_string(),
            ..Default::default()
        };

        for segment in segments {
            let (attr, attr_value) = match segment.split_once('=') {
                Some((attr, value)) => (trim_ascii_ws(attr), Some(trim_ascii_ws(value))),
                None => (trim_ascii_ws(segment), None),
            };
            if attr.is_empty() {
                continue;
            }

            match attr.to_ascii_lowercase().as_str() {
                "expires" => parsed.apply_expires(attr_value),
                "max-age" => parsed.apply_max_age(attr_value, now),
                "domain" => parsed.apply_domain(attr_value),
                "path" => {
                    parsed.path = match attr_value {
                        Some(p) if p.starts_with('/') => Some(p.to_string()),
                        _ => Some(default_path(response_path)),
                    }
                }
                "secure" => parsed.secure = true,
                "httponly" => parsed.http_only = true,
                _ => {}
            }
        }

        Some(parsed)
    }

    fn apply_expires(&mut self, value: Option<&str>) {
        let Some(value) = value.filter(|v| !v.is_empty()) else {
            return;
        };
        match parse_cookie_date(value) {
            Ok(expires) => {
                tracing::trace!(expires = %format_cookie_date(expires), "parsed Expires attribute");
                self.expires = Some(expires);
            }
            Err(e) => {
                tracing::debug!(cookie = %self.name, value, error = %e, "dropping Expires attribute");
            }
        }
    }

    fn apply_max_age(&mut self, value: Option<&str>, now: OffsetDateTime) {
        let Some(value) = value.filter(|v| is_max_age_value(v)) else {
            tracing::debug!(cookie = %self.name, "dropping malformed Max-Age attribute");
            return;
        };
        let Ok(delta) = value.parse::<i64>() else {
            tracing::debug!(cookie = %self.name, value, "dropping out-of-range Max-Age attribute");
            return;
        };

        if delta <= 0 {
            self.max_age = Some(now);
        } else if let Some(expiry) = now.checked_add(Duration::seconds(delta)) {
            self.max_age = Some(expiry);
        }
    }

    fn apply_domain(&mut self, value: Option<&str>) {
        let Some(value) = value else {
            return;
        };
        // Canonicalized like the request host so Unicode domains compare as punycode.
        let domain = value.strip_prefix('.').unwrap_or(value);
        if !domain.is_empty() {
            self.domain = Some(canonicalize_host(domain));
        }
    }
}

/// Parse every `Set-Cookie` value of a response, skipping empty ones.
pub fn parse_set_cookie_headers<'a, I>(
    lines: I,
    response_path: &str,
    now: OffsetDateTime,
) -> Vec<ParsedCookie>
where
    I: IntoIterator<Item = &'a str>,
{
    lines
        .into_iter()
        .filter_map(|line| ParsedCookie::parse(line, response_path, now))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    const NOW: OffsetDateTime = datetime!(2024-05-01 12:00 UTC);
    const RESPONSE_PATH: &str = "/foo/bar?key=value#text";

    fn parse(line: &str) -> Option<ParsedCookie> {
        ParsedCookie::parse(line, RESPONSE_PATH, NOW)
    }

    #[test]
    fn test_name_value_split() {
        let c = parse("cookie").unwrap();
        assert_eq!((c.name.as_str(), c.value.as_str()), ("", "cookie"));

        let c = parse(r#"cookie="a=b""#).unwrap();
        assert_eq!((c.name.as_str(), c.value.as_str()), ("cookie", r#""a=b""#));

        let c = parse("  spaced  =  out  ").unwrap();
        assert_eq!((c.name.as_str(), c.value.as_str()), ("spaced", "out"));
    }

    #[test]
    fn test_empty_cookie_is_skipped() {
        assert!(parse("; Max-Age=3600").is_none());
        assert!(parse(" = ").is_none());
    }

    #[test]
    fn test_attribute_values_may_contain_equals() {
        let c = parse("cookie=v; Path=/foo=bar").unwrap();
        assert_eq!(c.path.as_deref(), Some("/foo=bar"));
    }

    #[test]
    fn test_expires() {
        let c = parse(r#"cookie=v; Expires="Sun, 01-Jan-35 11:12:13 GMT""#).unwrap();
        assert_eq!(c.expires, Some(datetime!(2035-01-01 11:12:13 UTC)));

        let c = parse("cookie=v; Expires=someday").unwrap();
        assert_eq!(c.expires, None);
        assert_eq!(c.value, "v");
    }

    #[test]
    fn test_max_age() {
        let c = parse("cookie=v; Max-Age=3600").unwrap();
        assert_eq!(c.max_age, Some(NOW + Duration::hours(1)));

        let c = parse("cookie=v; max-age=-5").unwrap();
        assert_eq!(c.max_age, Some(NOW));

        let c = parse("cookie=v; Max-Age=0").unwrap();
        assert_eq!(c.max_age, Some(NOW));

        assert_eq!(parse("cookie=v; Max-Age=null").unwrap().max_age, None);
        assert_eq!(parse("cookie=v; Max-Age=1.5").unwrap().max_age, None);
        assert_eq!(parse("cookie=v; Max-Age").unwrap().max_age, None);
        assert_eq!(
            parse("cookie=v; Max-Age=99999999999999999999999").unwrap().max_age,
            None
        );
    }

    #[test]
    fn test_domain() {
        let c = parse("cookie=v; Domain=.WWW.Example.com").unwrap();
        assert_eq!(c.domain.as_deref(), Some("www.example.com"));

        assert_eq!(
            parse("cookie=v; Domain=.Bücher.example").unwrap().domain.as_deref(),
            Some("xn--bcher-kva.example")
        );
        assert_eq!(parse("cookie=v; Domain=").unwrap().domain, None);
        assert_eq!(parse("cookie=v; Domain=.").unwrap().domain, None);
    }

    #[test]
    fn test_path_falls_back_to_response_default_path() {
        assert_eq!(parse("c=v; Path=/path").unwrap().path.as_deref(), Some("/path"));
        assert_eq!(parse("c=v; Path=relative").unwrap().path.as_deref(), Some("/foo"));
        assert_eq!(parse("c=v; Path").unwrap().path.as_deref(), Some("/foo"));
        assert_eq!(parse("c=v").unwrap().path, None);
    }

    #[test]
    fn test_flags_are_case_insensitive() {
        let c = parse("c=v; SECURE; httpOnly; Unknown=1").unwrap();
        assert!(c.secure);
        assert!(c.http_only);
    }

    #[test]
    fn test_header_batch() {
        let lines = [
            "cookie",
            "cookie=\"with value\"",
            "; Max-Age=3600",
            "cookie=v; Max-Age=null",
        ];
        let parsed = parse_set_cookie_headers(lines, RESPONSE_PATH, NOW);
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[2].max_age, None);
    }
}
