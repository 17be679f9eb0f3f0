use cookienet::base::clock::to_unix_millis;
use cookienet::cookies::canonical_cookie::CanonicalCookie;
use cookienet::cookies::deriver::{derive_cookies, CookieOrigin};
use cookienet::cookies::monster::CookieMonster;
use cookienet::cookies::parsed_cookie::parse_set_cookie_headers;
use cookienet::cookies::psl::PublicSuffixList;
use time::macros::datetime;
use time::{Duration, OffsetDateTime};

const NOW: OffsetDateTime = datetime!(2025-03-01 10:00 UTC);
const RESPONSE_PATH: &str = "/foo/bar?key=value#text";

fn suffixes() -> PublicSuffixList {
    PublicSuffixList::new(["com", "net", "org", "co.uk"])
}

fn stored(name: &str, value: &str, domain: &str, path: &str, created: OffsetDateTime) -> CanonicalCookie {
    let mut c = CanonicalCookie::new(name, value, domain, path, created);
    c.host_only = false;
    c
}

fn derive(origin: &CookieOrigin, lines: &[&str], store: &[CanonicalCookie]) -> Vec<CanonicalCookie> {
    let parsed = parse_set_cookie_headers(lines.iter().copied(), RESPONSE_PATH, NOW);
    derive_cookies(origin, RESPONSE_PATH, parsed, store, &suffixes(), NOW)
}

#[test]
fn test_secure_response_derivation() {
    let mut existing = CanonicalCookie::new("cookie", "secure", "www.example.com", "/foo", NOW);
    existing.secure = true;
    existing.http_only = true;

    let origin = CookieOrigin::new("www.example.com", true);
    let out = derive(
        &origin,
        &[
            r#"cookie="Persistent flag not set""#,
            r#"cookie="Persistent flag set"; Max-Age=3600"#,
            r#"cookie="Persistent flag and expiry time set"; Expires="Sun, 01-Jan-35 11:12:13 GMT""#,
            r#"cookie="Domain set to request hostname""#,
            r#"cookie="Domain attribute"; Domain=example.com"#,
            r#"cookie="Path attribute"; Path=/path"#,
            r#"cookie="Default path""#,
            r#"cookie="Secure flag set"; Secure"#,
            r#"cookie="Http_only flag set"; HttpOnly"#,
            r#"__Secure-cookie="secure prefix"; Secure"#,
            r#"__Host-cookie="host prefix"; Path=/; Secure"#,
            r#"cookie="public suffix domain"; Domain=com"#,
            r#"cookie="foreign domain"; Domain=www.foobar.com"#,
        ],
        &[existing],
    );

    assert_eq!(out.len(), 11);
    assert!(!out[0].persistent);
    assert!(out[1].persistent);
    assert!(out[2].persistent);
    assert_eq!(out[2].expiry_time.map(to_unix_millis), Some(2_051_262_733_000));
    assert_eq!(out[3].domain, "www.example.com");
    assert!(out[3].host_only);
    assert_eq!(out[4].domain, "example.com");
    assert!(!out[4].host_only);
    assert_eq!(out[5].path, "/path");
    assert_eq!(out[6].path, "/foo");
    assert!(out[7].secure);
    assert!(out[8].http_only);
}

#[test]
fn test_insecure_response_derivation() {
    let mut existing = CanonicalCookie::new("cookie", "secure", "www.example.com", "/foo", NOW);
    existing.secure = true;

    let origin = CookieOrigin::new("www.example.com", false);
    let out = derive(
        &origin,
        &[
            r#"cookie="no secure equivalent"; Path=/bar"#,
            r#"cookie="secure flag over http"; Secure"#,
            r#"cookie="shadowed by secure cookie"; Path=/foo"#,
            r#"__Secure-cookie="prefix without secure""#,
            r#"__Host-cookie="prefix without secure""#,
        ],
        &[existing],
    );

    assert_eq!(out.len(), 1);
    assert_eq!(out[0].path, "/bar");
}

#[test]
fn test_update_keeps_single_entry() {
    let mut old = stored("update", "toBeUpdated", "example.com", "/", NOW - Duration::days(1));
    old.expiry_time = Some(NOW + Duration::days(10));
    let mut jar = CookieMonster::from_cookies(vec![old]);

    let origin = CookieOrigin::new("www.example.com", true);
    jar.set_cookies_from_response(
        &origin,
        RESPONSE_PATH,
        ["update=updated; Domain=example.com; Path=/"],
        &suffixes(),
        NOW,
    );

    assert_eq!(jar.len(), 1);
    let c = jar.iter().next().unwrap();
    assert_eq!(c.value, "updated");
    assert_eq!(c.creation_time, NOW - Duration::days(1));
    assert_eq!(c.expiry_time, Some(NOW + Duration::hours(24)));
}

#[test]
fn test_request_header_selection() {
    let time = NOW - Duration::seconds(10);
    let mut evicted = stored("toBeEvicted", "foobar", "example.com", "/foo", time);
    evicted.expiry_time = Some(datetime!(1970-01-01 0:00 UTC));
    let mut secure = stored("secureFlagSet", "foobar", "sub.dom.example.com", "/foo", time);
    secure.secure = true;
    let mut host_only = CanonicalCookie::new("host_only_flag", "true", "www.example.com", "/foo", time);
    host_only.host_only = true;

    let mut jar = CookieMonster::from_cookies(vec![
        evicted,
        stored("pathNotMatching", "foobar", "example.com", "/foo/bar/baz", time),
        stored("domainNotMatching", "foobar", "sub.dom.example.com", "/foo", time),
        secure,
        host_only,
        stored("host_only_flag", "false", "example.com", "/foo", time),
        stored("sorted_second", "true", "example.com", "/foo", time - Duration::seconds(10)),
        stored("sorted_first", "true", "example.com", "/foo/bar", time),
    ]);

    let header = jar.get_cookie_header("www.example.com", RESPONSE_PATH, false, NOW);

    assert_eq!(jar.len(), 7);
    assert_eq!(
        header,
        "sorted_first=true; sorted_second=true; host_only_flag=true; host_only_flag=false"
    );

    let touched: Vec<_> = jar
        .iter()
        .filter(|c| c.last_access_time == NOW)
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(touched, vec!["host_only_flag", "host_only_flag", "sorted_second", "sorted_first"]);
}

#[test]
fn test_host_prefix_acceptance() {
    let origin = CookieOrigin::new("example.com", true);
    let mut jar = CookieMonster::new();

    let accepted = jar.set_cookies_from_response(&origin, "/", ["__Host-id=1; Secure; Path=/"], &suffixes(), NOW);
    let rejected = jar.set_cookies_from_response(&origin, "/", ["__Host-id=1; Secure; Path=/sub"], &suffixes(), NOW);

    assert_eq!((accepted, rejected), (1, 0));
    assert_eq!(jar.len(), 1);
    assert_eq!(jar.iter().next().unwrap().path, "/");
}

#[test]
fn test_idna_host_is_canonicalized() {
    let origin = CookieOrigin::new("bücher.example", true);
    let mut jar = CookieMonster::new();
    jar.set_cookies_from_response(&origin, "/", ["lang=de; Secure"], &suffixes(), NOW);

    assert_eq!(jar.iter().next().unwrap().domain, "xn--bcher-kva.example");
    assert_eq!(jar.get_cookie_header("BÜCHER.example", "/", true, NOW), "lang=de");
}

#[test]
fn test_max_age_zero_expires_cookie() {
    let origin = CookieOrigin::new("example.com", false);
    let mut jar = CookieMonster::new();
    jar.set_cookies_from_response(&origin, "/", ["a=1; Max-Age=3600"], &suffixes(), NOW);
    jar.set_cookies_from_response(&origin, "/", ["a=1; Max-Age=0"], &suffixes(), NOW);

    assert_eq!(jar.len(), 1);
    assert_eq!(jar.get_cookie_header("example.com", "/", false, NOW), "a=1");
    assert_eq!(jar.get_cookie_header("example.com", "/", false, NOW + Duration::milliseconds(1)), "");
    assert!(jar.is_empty());
}

#[test]
fn test_unicode_domain_attribute() {
    let origin = CookieOrigin::new("www.bücher.example", true);
    let mut jar = CookieMonster::new();

    let stored = jar.set_cookies_from_response(&origin, "/", ["a=1; Domain=bücher.example; Secure"], &suffixes(), NOW);

    assert_eq!(stored, 1);
    let c = jar.iter().next().unwrap();
    assert_eq!(c.domain, "xn--bcher-kva.example");
    assert!(!c.host_only);
    assert_eq!(jar.get_cookie_header("shop.bücher.example", "/", true, NOW), "a=1");
}
