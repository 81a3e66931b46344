//! # Field Validators
//!
//! Pure predicates over raw form input. Every function here returns a bare
//! `bool`; the step rule that invokes a validator decides which message the
//! user sees.
//!
//! Numeric inputs (PIN code, phone, account number) are validated as digit
//! strings of fixed or minimum length. No numeric range checks are made.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;

static PHONE_RE: Lazy<Regex> = Lazy::new(|| compile(r"^[0-9]{10}$"));
static PINCODE_RE: Lazy<Regex> = Lazy::new(|| compile(r"^[0-9]{6}$"));
static IFSC_RE: Lazy<Regex> = Lazy::new(|| compile(r"^[A-Z]{4}0[A-Z0-9]{6}$"));
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| compile(r"^[^\s@]+@[^\s@.]+(\.[^\s@.]+)+$"));
static GSTIN_RE: Lazy<Regex> =
    Lazy::new(|| compile(r"^[0-9]{2}[A-Z]{5}[0-9]{4}[A-Z][A-Z0-9]Z[A-Z0-9]$"));
static DIGITS_RE: Lazy<Regex> = Lazy::new(|| compile(r"^[0-9]+$"));
static HSN_RE: Lazy<Regex> = Lazy::new(|| compile(r"^[0-9]{4,8}$"));
static PRICE_RE: Lazy<Regex> = Lazy::new(|| compile(r"^[0-9]+(\.[0-9]{1,2})?$"));

fn compile(pattern: &str) -> Regex {
    // Patterns are literals in this module and covered by tests.
    Regex::new(pattern).expect("static field pattern compiles")
}

// ─── Presence ────────────────────────────────────────────────────────

/// Types whose "filled in" state can be judged by [`required`].
///
/// Strings count as present when they hold something other than
/// whitespace. Collections count as present when non-empty. Options
/// delegate to their content.
pub trait Presence {
    fn is_present(&self) -> bool;
}

impl Presence for str {
    fn is_present(&self) -> bool {
        !self.trim().is_empty()
    }
}

impl Presence for String {
    fn is_present(&self) -> bool {
        self.as_str().is_present()
    }
}

impl<T: Presence + ?Sized> Presence for &T {
    fn is_present(&self) -> bool {
        (**self).is_present()
    }
}

impl<T: Presence> Presence for Option<T> {
    fn is_present(&self) -> bool {
        self.as_ref().is_some_and(Presence::is_present)
    }
}

impl<T> Presence for [T] {
    fn is_present(&self) -> bool {
        !self.is_empty()
    }
}

impl<T> Presence for Vec<T> {
    fn is_present(&self) -> bool {
        !self.is_empty()
    }
}

impl<T> Presence for BTreeSet<T> {
    fn is_present(&self) -> bool {
        !self.is_empty()
    }
}

impl<T, S> Presence for HashSet<T, S> {
    fn is_present(&self) -> bool {
        !self.is_empty()
    }
}

impl<K, V> Presence for BTreeMap<K, V> {
    fn is_present(&self) -> bool {
        !self.is_empty()
    }
}

impl<K, V, S> Presence for HashMap<K, V, S> {
    fn is_present(&self) -> bool {
        !self.is_empty()
    }
}

/// True iff the value is a non-blank string, a file handle, or a non-empty
/// collection.
pub fn required<T: Presence + ?Sized>(value: &T) -> bool {
    value.is_present()
}

// ─── Patterns ────────────────────────────────────────────────────────

/// Fixed formats recognised by [`matches_pattern`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pattern {
    /// Exactly 10 ASCII digits.
    Phone,
    /// Exactly 6 ASCII digits.
    Pincode,
    /// 4 upper-case letters, `0`, then 6 upper-case alphanumerics.
    Ifsc,
    /// `local@domain.tld` with no whitespace.
    Email,
    /// 15-character GST identification number.
    Gstin,
    /// One or more ASCII digits.
    Digits,
    /// HSN classification code, 4 to 8 digits.
    Hsn,
    /// Decimal amount with at most two fraction digits.
    Price,
}

impl Pattern {
    fn regex(self) -> &'static Regex {
        match self {
            Self::Phone => &*PHONE_RE,
            Self::Pincode => &*PINCODE_RE,
            Self::Ifsc => &*IFSC_RE,
            Self::Email => &*EMAIL_RE,
            Self::Gstin => &*GSTIN_RE,
            Self::Digits => &*DIGITS_RE,
            Self::Hsn => &*HSN_RE,
            Self::Price => &*PRICE_RE,
        }
    }

    /// Short description of the expected shape, used in error text.
    pub fn describe(self) -> &'static str {
        match self {
            Self::Phone => "10 digits",
            Self::Pincode => "6 digits",
            Self::Ifsc => "4 letters, '0', then 6 letters or digits",
            Self::Email => "name@domain.tld",
            Self::Gstin => "15-character GSTIN",
            Self::Digits => "digits only",
            Self::Hsn => "4 to 8 digits",
            Self::Price => "amount with up to 2 decimals",
        }
    }
}

/// True iff the whole of `value` has the given format.
pub fn matches_pattern(value: &str, pattern: Pattern) -> bool {
    pattern.regex().is_match(value)
}

/// True iff `value` has at least `n` characters.
pub fn length_at_least(value: &str, n: usize) -> bool {
    value.chars().count() >= n
}

/// True iff `value` has exactly `n` characters.
pub fn length_exactly(value: &str, n: usize) -> bool {
    value.chars().count() == n
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_rejects_blank_strings() {
        assert!(!required(""));
        assert!(!required("   "));
        assert!(required("Acme Pharma"));
        assert!(required(&String::from("x")));
    }

    #[test]
    fn required_follows_option_and_collections() {
        let none: Option<String> = None;
        assert!(!required(&none));
        assert!(!required(&Some(String::new())));
        assert!(required(&Some("a".to_string())));

        let empty: BTreeSet<String> = BTreeSet::new();
        assert!(!required(&empty));
        let one: BTreeSet<String> = ["Drugs".to_string()].into_iter().collect();
        assert!(required(&one));
        assert!(!required(&Vec::<u8>::new()));
    }

    #[test]
    fn phone_requires_exactly_ten_digits() {
        assert!(matches_pattern("9876543210", Pattern::Phone));
        assert!(!matches_pattern("12345", Pattern::Phone));
        assert!(!matches_pattern("98765432101", Pattern::Phone));
        assert!(!matches_pattern("98765-43210", Pattern::Phone));
        assert!(!matches_pattern("", Pattern::Phone));
    }

    #[test]
    fn pincode_requires_six_digits() {
        assert!(matches_pattern("560001", Pattern::Pincode));
        assert!(!matches_pattern("56001", Pattern::Pincode));
        assert!(!matches_pattern("56000A", Pattern::Pincode));
    }

    #[test]
    fn ifsc_shape() {
        assert!(matches_pattern("SBIN0005943", Pattern::Ifsc));
        assert!(matches_pattern("HDFC0ABC123", Pattern::Ifsc));
        assert!(!matches_pattern("SBIN000594", Pattern::Ifsc), "10 chars");
        assert!(!matches_pattern("SBIN1005943", Pattern::Ifsc), "5th char must be 0");
        assert!(!matches_pattern("SB1N0005943", Pattern::Ifsc), "first four are letters");
        assert!(!matches_pattern("sbin0005943", Pattern::Ifsc), "normalised upper-case only");
    }

    #[test]
    fn email_shape() {
        assert!(matches_pattern("ops@acme.in", Pattern::Email));
        assert!(matches_pattern("first.last@mail.acme.co.in", Pattern::Email));
        assert!(!matches_pattern("ops@acme", Pattern::Email));
        assert!(!matches_pattern("ops acme@x.in", Pattern::Email));
        assert!(!matches_pattern("@acme.in", Pattern::Email));
        assert!(!matches_pattern("ops@@acme.in", Pattern::Email));
    }

    #[test]
    fn gstin_shape() {
        assert!(matches_pattern("27AAPFU0939F1ZV", Pattern::Gstin));
        assert!(!matches_pattern("27AAPFU0939F1V", Pattern::Gstin));
        assert!(!matches_pattern("27AAPFU0939F1XV", Pattern::Gstin));
    }

    #[test]
    fn hsn_and_price() {
        assert!(matches_pattern("3004", Pattern::Hsn));
        assert!(matches_pattern("30049099", Pattern::Hsn));
        assert!(!matches_pattern("300", Pattern::Hsn));
        assert!(matches_pattern("120", Pattern::Price));
        assert!(matches_pattern("120.5", Pattern::Price));
        assert!(matches_pattern("120.50", Pattern::Price));
        assert!(!matches_pattern("120.505", Pattern::Price));
        assert!(!matches_pattern("-1", Pattern::Price));
    }

    #[test]
    fn length_checks_count_characters() {
        assert!(length_exactly("12345", 5));
        assert!(!length_exactly("12345", 10));
        assert!(length_at_least("123456789", 9));
        assert!(!length_at_least("12345678", 9));
        assert!(length_exactly("₹12", 3));
    }
}
