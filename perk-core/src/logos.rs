//! Best-effort merchant logo resolution: exact-ish matching against a small
//! known-merchant table, falling back to a domain guess from the merchant
//! name. Purely cosmetic; callers tolerate an empty result.

const LOGO_PROVIDER: &str = "https://logo.clearbit.com";

/// Known merchants whose primary domain is not a plain `<name>.com`
/// or whose display names carry extra words.
const KNOWN_MERCHANTS: &[(&str, &str)] = &[
    ("amazon", "amazon.com"),
    ("walmart", "walmart.com"),
    ("target", "target.com"),
    ("nike", "nike.com"),
    ("adidas", "adidas.com"),
    ("starbucks", "starbucks.com"),
    ("uber eats", "ubereats.com"),
    ("uber", "uber.com"),
    ("airbnb", "airbnb.com"),
    ("spotify", "spotify.com"),
    ("netflix", "netflix.com"),
    ("domino's", "dominos.com"),
    ("dominos", "dominos.com"),
    ("mcdonald's", "mcdonalds.com"),
    ("flipkart", "flipkart.com"),
    ("myntra", "myntra.com"),
    ("zomato", "zomato.com"),
    ("swiggy", "swiggy.com"),
    ("booking.com", "booking.com"),
    ("expedia", "expedia.com"),
];

/// Resolve a logo URL for a merchant name. Returns an empty string when no
/// plausible guess exists.
pub fn logo_url(merchant: &str) -> String {
    let needle = merchant.trim().to_lowercase();
    if needle.is_empty() {
        return String::new();
    }

    if let Some((_, domain)) = KNOWN_MERCHANTS
        .iter()
        .find(|(name, _)| needle == *name || needle.contains(name))
    {
        return format!("{}/{}", LOGO_PROVIDER, domain);
    }

    // Domain guess: strip everything but letters and digits.
    let guess: String = needle
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();
    if guess.is_empty() {
        return String::new();
    }
    format!("{}/{}.com", LOGO_PROVIDER, guess)
}
