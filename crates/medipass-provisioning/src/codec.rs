//! Account Number Codec.
//!
//! Deterministic derivation of a login handle from a human-assigned
//! account number. Pure functions, no I/O, no error conditions: two
//! distinct normalized account numbers never collide unless they were
//! already equal after trimming and casing.

/// Derive the login address for an account number: trim, lower-case,
/// append `@<domain>`.
///
/// ```
/// use medipass_provisioning::codec::derive_address;
///
/// assert_eq!(
///     derive_address(" Med001 ", "hospital.example.org"),
///     "med001@hospital.example.org"
/// );
/// ```
#[must_use]
pub fn derive_address(account_number: &str, domain: &str) -> String {
    format!("{}@{}", account_number.trim().to_lowercase(), domain)
}

/// Canonical stored form of an account number: trimmed, upper-cased.
#[must_use]
pub fn normalize_account_number(account_number: &str) -> String {
    account_number.trim().to_uppercase()
}

/// The numeric tail of an account number: every non-digit stripped.
///
/// Historical account numbers share an alphabetic prefix per role and
/// differ only by this tail, so digit-stripped equality tolerates
/// prefix drift while still requiring exact numeric identity. Empty
/// when the account number carries no digits at all.
#[must_use]
pub fn digit_suffix(account_number: &str) -> String {
    account_number
        .chars()
        .filter(char::is_ascii_digit)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOMAIN: &str = "hospital.example.org";

    #[test]
    fn test_derive_address_is_case_and_whitespace_insensitive() {
        assert_eq!(
            derive_address(" Med001 ", DOMAIN),
            derive_address("MED001", DOMAIN)
        );
    }

    #[test]
    fn test_derive_address_is_deterministic() {
        assert_eq!(
            derive_address("rad042", DOMAIN),
            derive_address("rad042", DOMAIN)
        );
        assert_eq!(derive_address("rad042", DOMAIN), "rad042@hospital.example.org");
    }

    #[test]
    fn test_distinct_numbers_do_not_collide() {
        assert_ne!(
            derive_address("MED001", DOMAIN),
            derive_address("MED002", DOMAIN)
        );
    }

    #[test]
    fn test_normalize_account_number() {
        assert_eq!(normalize_account_number(" med001 "), "MED001");
        assert_eq!(normalize_account_number("P0042"), "P0042");
    }

    #[test]
    fn test_digit_suffix() {
        assert_eq!(digit_suffix("MED-001"), "001");
        assert_eq!(digit_suffix("LT2024007"), "2024007");
        assert_eq!(digit_suffix("NODIGITS"), "");
    }
}
