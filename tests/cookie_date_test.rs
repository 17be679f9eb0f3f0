use cookienet::cookies::cookie_date::{format_cookie_date, parse_cookie_date};
use time::macros::datetime;

const TIME: &str = "11:12:13";
const DAY: &str = "08";
const MONTH: &str = "Jan";
const YEAR: &str = "2014";

fn permutations(items: &[&'static str]) -> Vec<Vec<&'static str>> {
    if items.len() <= 1 {
        return vec![items.to_vec()];
    }
    let mut out = Vec::new();
    for i in 0..items.len() {
        let mut rest = items.to_vec();
        let first = rest.remove(i);
        for mut tail in permutations(&rest) {
            tail.insert(0, first);
            out.push(tail);
        }
    }
    out
}

#[test]
fn test_token_order_does_not_matter() {
    let expected = datetime!(2014-01-08 11:12:13 UTC);
    let orders = permutations(&[TIME, DAY, MONTH, YEAR]);
    assert_eq!(orders.len(), 24);

    for order in orders {
        for separator in [" ", ", ", "-"] {
            let input = order.join(separator);
            assert_eq!(parse_cookie_date(&input), Ok(expected), "input: {input}");
        }
    }
}

#[test]
fn test_single_missing_field() {
    let cases = [
        (format!("{DAY} {MONTH} {YEAR}"), "0111"),
        (format!("{TIME} {MONTH} {YEAR}"), "1011"),
        (format!("{TIME} {DAY} {YEAR}"), "1101"),
        (format!("{TIME} {DAY} {MONTH}"), "1110"),
    ];
    for (input, flags) in cases {
        let err = parse_cookie_date(&input).unwrap_err();
        assert_eq!(err.flags(), flags, "input: {input}");
        assert_eq!(err.to_string(), format!("date parsing failed; flags: {flags}"));
    }
}

#[test]
fn test_year_windows() {
    let cases = [
        ("1 Jan 70 00:00:00", 1970),
        ("1 Jan 99 00:00:00", 1999),
        ("1 Jan 00 00:00:00", 2000),
        ("1 Jan 69 00:00:00", 2069),
        ("1 Jan 1969 00:00:00", 1969),
    ];
    for (input, year) in cases {
        assert_eq!(parse_cookie_date(input).unwrap().year(), year, "input: {input}");
    }
}

#[test]
fn test_common_wire_formats() {
    let expected = datetime!(1994-11-06 08:49:37 UTC);
    for input in [
        "Sun, 06 Nov 1994 08:49:37 GMT",
        "Sunday, 06-Nov-94 08:49:37 GMT",
        "Sun Nov  6 08:49:37 1994",
    ] {
        assert_eq!(parse_cookie_date(input), Ok(expected), "input: {input}");
    }
    assert_eq!(format_cookie_date(expected), "Sun, 06 Nov 1994 08:49:37 GMT");
}
