//! Merchant display names.

const MAX_LEN: usize = 50;

/// Raw forms that map onto one canonical display name. Matched against the
/// cleaned, lower-cased name: exact, as the leading word(s), or (for longer
/// keys) as a plain prefix so `netflixupi` still lands on Netflix.
const ALIASES: &[(&str, &str)] = &[
    ("swiggy instamart", "Swiggy Instamart"),
    ("swiggy", "Swiggy"),
    ("zomato", "Zomato"),
    ("blinkit", "Blinkit"),
    ("zepto", "Zepto"),
    ("bigbasket", "BigBasket"),
    ("amazon pay", "Amazon Pay"),
    ("amazon", "Amazon"),
    ("amzn", "Amazon"),
    ("flipkart", "Flipkart"),
    ("myntra", "Myntra"),
    ("uber", "Uber"),
    ("ola", "Ola"),
    ("rapido", "Rapido"),
    ("irctc", "IRCTC"),
    ("netflix", "Netflix"),
    ("spotify", "Spotify"),
    ("hotstar", "Disney+ Hotstar"),
    ("bookmyshow", "BookMyShow"),
    ("airtel", "Airtel"),
    ("jio", "Jio"),
    ("phonepe", "PhonePe"),
    ("paytm", "Paytm"),
    ("dominos", "Domino's"),
    ("mcdonalds", "McDonald's"),
    ("starbucks", "Starbucks"),
];

/// Turn a raw counterparty string into a display name.
///
/// Strips a UPI handle (`swiggy.order@ybl` → `swiggy.order`) and a leading
/// `VPA` label, turns punctuation into spaces, collapses whitespace, applies
/// the alias table, and otherwise title-cases. Returns an empty string when
/// nothing usable is left.
pub fn normalize_merchant(raw: &str) -> String {
    let mut name = raw.trim();
    if let Some(rest) = strip_prefix_ignore_case(name, "vpa ") {
        name = rest.trim_start();
    }
    if let Some((handle, _bank)) = name.split_once('@') {
        name = handle;
    }

    let cleaned = name
        .chars()
        .map(|c| match c {
            '.' | '_' | '-' | '*' | '/' | '\\' | '"' | '`' | ':' | ';' | ',' | '(' | ')' | '#'
            | '+' | '=' | '|' => ' ',
            other => other,
        })
        .collect::<String>();
    let words: Vec<&str> = cleaned
        .split_whitespace()
        .map(|w| w.trim_matches('\''))
        .filter(|w| !w.is_empty())
        .collect();
    if words.is_empty() {
        return String::new();
    }

    let lower = words.join(" ").to_lowercase();
    if let Some(canonical) = alias_for(&lower) {
        return canonical.to_string();
    }

    let titled = words.iter().map(|w| title_case(w)).collect::<Vec<_>>().join(" ");
    truncate(&titled, MAX_LEN)
}

fn alias_for(lower: &str) -> Option<&'static str> {
    ALIASES.iter().find_map(|(key, canonical)| {
        let hit = lower == *key
            || lower
                .strip_prefix(key)
                .is_some_and(|rest| rest.starts_with(' ') || key.len() >= 5);
        hit.then_some(*canonical)
    })
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect::<String>().trim_end().to_string()
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &s[prefix.len()..])
}
