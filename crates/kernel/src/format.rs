//! Display formatting for contact details and prices.

/// Minimum digits in an E.164 number, excluding the `+`.
const MIN_PHONE_DIGITS: usize = 8;

/// Maximum digits allowed by E.164.
const MAX_PHONE_DIGITS: usize = 15;

/// Normalize a phone number to E.164 (`+<digits>`).
///
/// Accepts spaces, dashes, dots and parentheses as separators. A leading
/// `00` is an international prefix; a single leading `0` is a trunk prefix
/// and is replaced by `country_code`. Returns `None` for anything that
/// does not yield 8 to 15 digits.
pub fn normalize_phone(raw: &str, country_code: &str) -> Option<String> {
    let raw = raw.trim();
    let (international, rest) = match raw.strip_prefix('+') {
        Some(rest) => (true, rest),
        None => (false, raw),
    };

    if !rest
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '-' | '.' | '(' | ')'))
    {
        return None;
    }

    let digits: String = rest.chars().filter(char::is_ascii_digit).collect();
    let country_code = country_code.trim().trim_start_matches('+');

    let e164 = if international {
        digits
    } else if let Some(stripped) = digits.strip_prefix("00") {
        stripped.to_string()
    } else if let Some(stripped) = digits.strip_prefix('0') {
        format!("{country_code}{stripped}")
    } else {
        digits
    };

    if !(MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&e164.len()) {
        return None;
    }

    Some(format!("+{e164}"))
}

/// Build a `wa.me` click-to-chat link with an optional prefilled message.
pub fn whatsapp_link(phone: &str, country_code: &str, message: Option<&str>) -> Option<String> {
    let e164 = normalize_phone(phone, country_code)?;
    let number = e164.trim_start_matches('+');

    let link = match message.map(str::trim).filter(|m| !m.is_empty()) {
        Some(text) => format!("https://wa.me/{number}?text={}", urlencoding::encode(text)),
        None => format!("https://wa.me/{number}"),
    };
    Some(link)
}

/// Format an amount in minor units, e.g. `125000` GBP as `£1,250.00`.
///
/// Currencies without a known symbol are suffixed with their code.
pub fn format_price(minor: i64, currency: &str) -> String {
    let sign = if minor < 0 { "-" } else { "" };
    let abs = minor.unsigned_abs();
    let major = group_thousands(abs / 100);
    let cents = abs % 100;

    let code = currency.trim().to_ascii_uppercase();
    match currency_symbol(&code) {
        Some(symbol) => format!("{sign}{symbol}{major}.{cents:02}"),
        None => format!("{sign}{major}.{cents:02} {code}"),
    }
}

fn currency_symbol(code: &str) -> Option<&'static str> {
    match code {
        "GBP" => Some("£"),
        "EUR" => Some("€"),
        "USD" => Some("$"),
        _ => None,
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
// Tests are allowed to use unwrap/expect freely.
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_trunk_prefix() {
        assert_eq!(
            normalize_phone("07700 900123", "44").as_deref(),
            Some("+447700900123")
        );
        assert_eq!(
            normalize_phone("(0161) 496-0000", "+44").as_deref(),
            Some("+441614960000")
        );
    }

    #[test]
    fn test_normalize_international() {
        assert_eq!(
            normalize_phone("+353 86 123 4567", "44").as_deref(),
            Some("+353861234567")
        );
        assert_eq!(
            normalize_phone("0033 6 12 34 56 78", "44").as_deref(),
            Some("+33612345678")
        );
    }

    #[test]
    fn test_normalize_rejects_garbage() {
        assert_eq!(normalize_phone("call me", "44"), None);
        assert_eq!(normalize_phone("123", "44"), None);
        assert_eq!(normalize_phone("0770090012x", "44"), None);
        assert_eq!(normalize_phone("+1234567890123456", "44"), None);
    }

    #[test]
    fn test_whatsapp_link() {
        assert_eq!(
            whatsapp_link("07700 900123", "44", None).as_deref(),
            Some("https://wa.me/447700900123")
        );
        assert_eq!(
            whatsapp_link("07700 900123", "44", Some("Hi, quote for a boiler?")).as_deref(),
            Some("https://wa.me/447700900123?text=Hi%2C%20quote%20for%20a%20boiler%3F")
        );
        assert_eq!(
            whatsapp_link("07700 900123", "44", Some("  ")).as_deref(),
            Some("https://wa.me/447700900123")
        );
        assert_eq!(whatsapp_link("n/a", "44", None), None);
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(4_950, "GBP"), "£49.50");
        assert_eq!(format_price(125_000, "gbp"), "£1,250.00");
        assert_eq!(format_price(5, "EUR"), "€0.05");
        assert_eq!(format_price(-1_000, "USD"), "-$10.00");
        assert_eq!(format_price(123_456_789, "CHF"), "1,234,567.89 CHF");
    }
}
