//! Message parsing - pulls command fields and lookup indexes out of message text

use once_cell::sync::Lazy;
use rand::Rng;
use regex_lite::Regex;

use crate::application::errors::LookupError;

/// `!quote add <user>: <quote>`
pub static QUOTE_ADD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^!quote add\s+(?P<user>[^:]+?)\s*:\s*(?P<quote>.+)$").expect("valid regex")
});

/// `!quote <term> [n]`
pub static QUOTE_FIND: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^!quote\s+(?P<term>.+?)(?:\s+(?P<index>-?\d+))?$").expect("valid regex")
});

/// `!define <term>: <definition>`. The separator needs whitespace after it,
/// so `std::vec` or `http://x` stay lookups.
pub static DEFINE_ADD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^!define\s+(?P<term>[^:]+?)\s*:\s+(?P<definition>.+)$").expect("valid regex")
});

/// `!define <term> [n]`. The term takes everything except a trailing index.
pub static DEFINE_FIND: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^!define\s+(?P<term>.+?)(?:\s+(?P<index>-?\d+))?$").expect("valid regex")
});

/// Compile `pattern` so that it only matches the whole input
pub fn full_match(pattern: &str) -> Result<Regex, regex_lite::Error> {
    Regex::new(&format!("^(?:{})$", pattern))
}

/// Pull the named group `name` out of `text`, trimmed
pub fn capture(pattern: &Regex, text: &str, name: &str) -> Option<String> {
    pattern
        .captures(text)
        .and_then(|caps| caps.name(name).map(|m| m.as_str().trim().to_string()))
        .filter(|s| !s.is_empty())
}

/// `(user, quote)` from an add-quote message
pub fn parse_quote_add(text: &str) -> Option<(String, String)> {
    Some((capture(&QUOTE_ADD, text, "user")?, capture(&QUOTE_ADD, text, "quote")?))
}

/// `(term, definition)` from an add-definition message
pub fn parse_definition_add(text: &str) -> Option<(String, String)> {
    Some((
        capture(&DEFINE_ADD, text, "term")?,
        capture(&DEFINE_ADD, text, "definition")?,
    ))
}

/// Pick a 1-based index into a result set of `count` items.
///
/// Uses the `index` group of `pattern` when it matches, clamped into
/// `1..=count`, and `fallback(count)` otherwise. An empty result set has no
/// valid index and is reported as an error instead of being guessed at.
pub fn extract_index<F>(
    text: &str,
    count: usize,
    pattern: &Regex,
    fallback: F,
) -> Result<usize, LookupError>
where
    F: FnOnce(usize) -> usize,
{
    if count == 0 {
        return Err(LookupError::EmptyResultSet);
    }

    let requested = pattern
        .captures(text)
        .and_then(|caps| caps.name("index").map(|m| m.as_str().to_string()));

    let index = match requested {
        Some(raw) => clamp_index(&raw, count),
        None => fallback(count).clamp(1, count),
    };
    Ok(index)
}

fn clamp_index(raw: &str, count: usize) -> usize {
    match raw.parse::<i64>() {
        Ok(n) if n < 1 => 1,
        Ok(n) => usize::try_from(n).map_or(count, |n| n.min(count)),
        // only overflow can get here, the pattern guarantees digits
        Err(_) if raw.starts_with('-') => 1,
        Err(_) => count,
    }
}

/// Uniform integer in `lower..upper`, or `lower` when the range is empty.
///
/// Spans of 100 or more are drawn from `0..upper` and rejected until they
/// land at or above `lower`, which keeps every value equally likely.
pub fn bounded_rand<R: Rng + ?Sized>(rng: &mut R, lower: usize, upper: usize) -> usize {
    if lower >= upper {
        return lower;
    }
    if upper - lower < 100 {
        return rng.gen_range(lower..upper);
    }
    loop {
        let n = rng.gen_range(0..upper);
        if n >= lower {
            return n;
        }
    }
}

/// Uniform 1-based index into `count` results
pub fn random_index(count: usize) -> usize {
    bounded_rand(&mut rand::thread_rng(), 1, count + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn no_fallback(_: usize) -> usize {
        panic!("fallback should not run")
    }

    #[test]
    fn explicit_index_is_used() {
        assert_eq!(extract_index("!quote alice 3", 5, &QUOTE_FIND, no_fallback), Ok(3));
    }

    #[test]
    fn explicit_index_is_clamped() {
        assert_eq!(extract_index("!quote alice 0", 5, &QUOTE_FIND, no_fallback), Ok(1));
        assert_eq!(extract_index("!quote alice -4", 5, &QUOTE_FIND, no_fallback), Ok(1));
        assert_eq!(extract_index("!quote alice 99", 5, &QUOTE_FIND, no_fallback), Ok(5));
        assert_eq!(
            extract_index("!quote alice 99999999999999999999999", 5, &QUOTE_FIND, no_fallback),
            Ok(5)
        );
    }

    #[test]
    fn missing_index_uses_fallback() {
        assert_eq!(extract_index("!quote alice", 5, &QUOTE_FIND, |_| 4), Ok(4));
        for _ in 0..200 {
            let n = extract_index("!quote alice", 5, &QUOTE_FIND, random_index).unwrap();
            assert!((1..=5).contains(&n));
        }
    }

    #[test]
    fn empty_result_set_is_rejected() {
        assert_eq!(
            extract_index("!quote alice 2", 0, &QUOTE_FIND, no_fallback),
            Err(LookupError::EmptyResultSet)
        );
    }

    #[test]
    fn bounded_rand_degenerate_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            assert_eq!(bounded_rand(&mut rng, 7, 7), 7);
        }
    }

    #[test]
    fn bounded_rand_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..1_000 {
            assert!(bounded_rand(&mut rng, 0, 10) < 10);
            let n = bounded_rand(&mut rng, 150, 400);
            assert!((150..400).contains(&n));
        }
    }

    #[test]
    fn bounded_rand_wide_span_is_uniform() {
        let mut rng = StdRng::seed_from_u64(42);
        let (lower, upper) = (100, 300);
        let mut buckets = [0u32; 4];
        let trials = 40_000;
        for _ in 0..trials {
            let n = bounded_rand(&mut rng, lower, upper);
            buckets[(n - lower) / 50] += 1;
        }
        for count in buckets {
            let share = count as f64 / trials as f64;
            assert!((share - 0.25).abs() < 0.02, "bucket share {share}");
        }
    }

    #[test]
    fn find_pattern_splits_term_and_index() {
        assert_eq!(capture(&DEFINE_FIND, "!define rust 2", "term").as_deref(), Some("rust"));
        assert_eq!(capture(&DEFINE_FIND, "!define rust 2", "index").as_deref(), Some("2"));
        assert_eq!(
            capture(&DEFINE_FIND, "!define c++ (the language)", "term").as_deref(),
            Some("c++ (the language)")
        );
        assert_eq!(capture(&DEFINE_FIND, "!define c++ (the language)", "index"), None);
    }

    #[test]
    fn parses_add_commands() {
        assert_eq!(
            parse_quote_add("!quote add alice: hello there"),
            Some(("alice".to_string(), "hello there".to_string()))
        );
        assert_eq!(parse_quote_add("!quote add alice"), None);
        assert_eq!(parse_quote_add("!quote add alice:   "), None);
        assert_eq!(
            parse_definition_add("!define foo: a furry animal"),
            Some(("foo".to_string(), "a furry animal".to_string()))
        );
        assert_eq!(
            parse_definition_add("!define url: http://example.com"),
            Some(("url".to_string(), "http://example.com".to_string()))
        );
        assert_eq!(parse_definition_add("!define std::vec"), None);
        assert_eq!(parse_definition_add("!define http://x"), None);
    }

    #[test]
    fn full_match_rejects_substrings() {
        let re = full_match("!quote").unwrap();
        assert!(re.is_match("!quote"));
        assert!(!re.is_match("!quote alice"));
        assert!(!re.is_match("say !quote"));
    }
}
