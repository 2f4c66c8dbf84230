//! Country and currency resolution. Free-form country input is adapted to a
//! 2-letter code before the fallback cascade runs; unresolved input falls
//! back to the reference market.

/// Fixed fallback when a country cannot be resolved.
pub const DEFAULT_COUNTRY: &str = "US";

/// Common names and aliases mapped to ISO 3166-1 alpha-2 codes.
const COUNTRY_ALIASES: &[(&str, &str)] = &[
    ("united states", "US"),
    ("united states of america", "US"),
    ("usa", "US"),
    ("america", "US"),
    ("india", "IN"),
    ("united kingdom", "GB"),
    ("great britain", "GB"),
    ("uk", "GB"),
    ("england", "GB"),
    ("canada", "CA"),
    ("australia", "AU"),
    ("germany", "DE"),
    ("france", "FR"),
    ("spain", "ES"),
    ("italy", "IT"),
    ("netherlands", "NL"),
    ("brazil", "BR"),
    ("japan", "JP"),
    ("mexico", "MX"),
    ("singapore", "SG"),
    ("united arab emirates", "AE"),
    ("uae", "AE"),
    ("nigeria", "NG"),
    ("south africa", "ZA"),
    ("philippines", "PH"),
    ("indonesia", "ID"),
];

/// Normalize a free-form country name or code to a 2-letter code.
/// Unknown 2-letter inputs pass through uppercased; anything else
/// resolves to [`DEFAULT_COUNTRY`].
pub fn resolve_country(raw: &str) -> String {
    let needle = raw.trim().to_lowercase();
    if needle.is_empty() {
        return DEFAULT_COUNTRY.to_string();
    }
    if let Some((_, code)) = COUNTRY_ALIASES.iter().find(|(name, _)| *name == needle) {
        return (*code).to_string();
    }
    if needle.len() == 2 && needle.chars().all(|c| c.is_ascii_alphabetic()) {
        return needle.to_uppercase();
    }
    DEFAULT_COUNTRY.to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Currency {
    pub code: &'static str,
    pub symbol: &'static str,
}

/// Currency for a 2-letter country code; USD when unknown.
pub fn currency_for(country: &str) -> Currency {
    let (code, symbol) = match country {
        "IN" => ("INR", "₹"),
        "GB" => ("GBP", "£"),
        "CA" => ("CAD", "C$"),
        "AU" => ("AUD", "A$"),
        "DE" | "FR" | "ES" | "IT" | "NL" => ("EUR", "€"),
        "BR" => ("BRL", "R$"),
        "JP" => ("JPY", "¥"),
        "MX" => ("MXN", "Mex$"),
        "SG" => ("SGD", "S$"),
        "AE" => ("AED", "AED"),
        "NG" => ("NGN", "₦"),
        "ZA" => ("ZAR", "R"),
        "PH" => ("PHP", "₱"),
        "ID" => ("IDR", "Rp"),
        _ => ("USD", "$"),
    };
    Currency { code, symbol }
}
