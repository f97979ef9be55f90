//! Subdomain slug generation
//!
//! Derives a tenant subdomain from the company name: lowercase, strip
//! everything outside `[a-z0-9]`, truncate, append a short random suffix.
//! The suffix only reduces collision probability; the unique constraint
//! on `tenants.subdomain` is what actually enforces uniqueness.

use rand::Rng;

/// Maximum length of the company-name-derived prefix
const PREFIX_MAX_LEN: usize = 15;

/// Length of the random suffix
const SUFFIX_LEN: usize = 3;

const SUFFIX_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Generate a subdomain slug from a company name
pub fn generate_subdomain(company_name: &str) -> String {
    let prefix: String = company_name
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(PREFIX_MAX_LEN)
        .collect();

    let mut rng = rand::rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| SUFFIX_CHARSET[rng.random_range(0..SUFFIX_CHARSET.len())] as char)
        .collect();

    format!("{}{}", prefix, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_prefix_from_company_name() {
        let subdomain = generate_subdomain("Acme Repair");
        assert!(subdomain.starts_with("acmerepair"));
        assert_eq!(subdomain.len(), "acmerepair".len() + SUFFIX_LEN);
    }

    #[test]
    fn strips_non_alphanumeric_characters() {
        let subdomain = generate_subdomain("Bob's Auto & Tire!");
        assert!(subdomain.starts_with("bobsautotire"));
    }

    #[test]
    fn truncates_long_names() {
        let subdomain = generate_subdomain("A Very Long Company Name Indeed LLC");
        assert_eq!(subdomain.len(), PREFIX_MAX_LEN + SUFFIX_LEN);
        assert!(subdomain.starts_with("averylongcompan"));
    }

    #[test]
    fn suffix_is_lowercase_alphanumeric() {
        let subdomain = generate_subdomain("Acme");
        let suffix = &subdomain["acme".len()..];
        assert_eq!(suffix.len(), SUFFIX_LEN);
        assert!(suffix
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[test]
    fn empty_name_still_yields_a_suffix() {
        let subdomain = generate_subdomain("---");
        assert_eq!(subdomain.len(), SUFFIX_LEN);
    }

    #[test]
    fn two_calls_usually_differ() {
        // Random suffix makes immediate collisions unlikely (36^3 space).
        let a = generate_subdomain("Acme Repair");
        let b = generate_subdomain("Acme Repair");
        let c = generate_subdomain("Acme Repair");
        assert!(a != b || b != c);
    }
}
