//! ISBN text cleanup and checksum validation.
//!
//! # Responsibility
//! - Normalize user-typed ISBN text into the form stored in `books.isbn`.
//! - Validate ISBN-10 (mod 11) and ISBN-13 (mod 10) checksums.
//!
//! # Invariants
//! - `clean` never fails and is idempotent.
//! - `validate` ignores characters that are not digits or `x`/`X`; it never
//!   rejects input because of stray letters or punctuation.

/// Strips hyphens and spaces from raw ISBN text.
///
/// Case and any other characters are left untouched; validation is a
/// separate step.
pub fn clean(raw: &str) -> String {
    raw.chars().filter(|ch| *ch != '-' && *ch != ' ').collect()
}

/// Cleaned ISBN with the check character upper-cased, used as the stored key.
///
/// `080442957x` and `080442957X` name the same book and must not produce two
/// identities.
pub fn canonical(raw: &str) -> String {
    clean(raw).to_ascii_uppercase()
}

/// Returns whether `raw` carries a valid ISBN-10 or ISBN-13 checksum.
///
/// Only `0-9` and `x`/`X` (value 10) are considered, everything else is
/// skipped before the length check.
pub fn validate(raw: &str) -> bool {
    let digits = checksum_digits(raw);
    validate10(&digits) || validate13(&digits)
}

fn checksum_digits(raw: &str) -> Vec<u32> {
    raw.chars()
        .filter_map(|ch| match ch {
            'x' | 'X' => Some(10),
            other => other.to_digit(10),
        })
        .collect()
}

fn validate10(digits: &[u32]) -> bool {
    if digits.len() != 10 {
        return false;
    }
    let sum: u32 = digits
        .iter()
        .zip((1..=10).rev())
        .map(|(digit, weight)| digit * weight)
        .sum();
    sum % 11 == 0
}

fn validate13(digits: &[u32]) -> bool {
    if digits.len() != 13 {
        return false;
    }
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(index, digit)| if index % 2 == 0 { *digit } else { 3 * digit })
        .sum();
    sum % 10 == 0
}

#[cfg(test)]
mod tests {
    use super::{canonical, clean, validate};

    #[test]
    fn clean_strips_hyphens_and_spaces() {
        assert_eq!(clean("978-0-306-40615-7"), "9780306406157");
        assert_eq!(clean(" 0 306 40615 2 "), "0306406152");
    }

    #[test]
    fn clean_is_idempotent_and_keeps_other_characters() {
        for raw in ["978-0-306-40615-7", "isbn: 0-8044-2957-x", "", "--  --"] {
            let once = clean(raw);
            assert_eq!(clean(&once), once);
        }
        assert_eq!(clean("ISBN 0-8044-2957-X"), "ISBN080442957X");
    }

    #[test]
    fn canonical_upper_cases_the_check_character() {
        assert_eq!(canonical("0-8044-2957-x"), "080442957X");
        assert_eq!(canonical("080442957X"), "080442957X");
        assert_eq!(canonical("978-0-306-40615-7"), "9780306406157");
    }

    #[test]
    fn isbn10_checksum() {
        assert!(validate("0306406152"));
        assert!(!validate("0306406151"));
    }

    #[test]
    fn isbn10_accepts_x_check_digit_in_either_case() {
        assert!(validate("080442957X"));
        assert!(validate("0-8044-2957-x"));
    }

    #[test]
    fn isbn13_checksum() {
        assert!(validate("9780306406157"));
        assert!(!validate("9780306406150"));
        assert!(validate("978-0-306-40615-7"));
    }

    #[test]
    fn validate_ignores_non_digit_noise() {
        assert!(validate("ISBN 978-0-306-40615-7"));
        assert!(validate("abc0306406152def"));
    }

    #[test]
    fn validate_rejects_other_lengths() {
        assert!(!validate(""));
        assert!(!validate("123456789"));
        assert!(!validate("03064061520"));
        assert!(!validate("97803064061570"));
    }

    #[test]
    fn isbn10_rule_matches_weighted_sum_for_all_check_digits() {
        let body = [0u32, 3, 0, 6, 4, 0, 6, 1, 5];
        let partial: u32 = body
            .iter()
            .enumerate()
            .map(|(index, digit)| (10 - index as u32) * digit)
            .sum();
        for check in 0..=10u32 {
            let mut text: String = body.iter().map(|d| char::from(b'0' + *d as u8)).collect();
            text.push(if check == 10 {
                'X'
            } else {
                char::from(b'0' + check as u8)
            });
            assert_eq!(validate(&text), (partial + check) % 11 == 0, "{text}");
        }
    }
}
