//! # Identity Newtypes
//!
//! Domain-primitive newtypes for the values the onboarding flow hands to
//! collaborators. Each is a distinct type; an [`Ifsc`] cannot be passed
//! where a [`Pincode`] is expected.
//!
//! ## Validation
//!
//! String-based values validate format at construction and again on
//! deserialization (`serde(try_from = "String")`), so a value of one of
//! these types is always well-formed. UUID-based identifiers are valid by
//! construction.
//!
//! Form fields themselves stay raw strings in the record: a half-typed
//! IFSC is legitimate form state. These newtypes appear only once a value
//! has passed its format check.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::validators::{matches_pattern, Pattern};

/// Declares a validated string newtype with `as_str`, `Display`, and
/// string conversions used by serde.
macro_rules! string_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Access the normalised string value.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl std::str::FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Format-checked values
// ---------------------------------------------------------------------------

string_newtype!(
    /// Indian Financial System Code identifying a bank branch.
    ///
    /// Eleven characters: four letters, a literal `0`, then six letters or
    /// digits. Input is trimmed and upper-cased before the check, so
    /// `"sbin0005943"` is accepted and stored as `"SBIN0005943"`.
    Ifsc
);

impl Ifsc {
    /// Validate and normalise an IFSC.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidIfsc`] if the normalised value does
    /// not have the IFSC shape.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = value.into();
        let normalised = raw.trim().to_ascii_uppercase();
        if !matches_pattern(&normalised, Pattern::Ifsc) {
            return Err(ValidationError::InvalidIfsc(raw));
        }
        Ok(Self(normalised))
    }

    /// The four-letter bank prefix (e.g. `SBIN`).
    pub fn bank_code(&self) -> &str {
        &self.0[..4]
    }
}

string_newtype!(
    /// Goods and Services Tax Identification Number (15 characters).
    Gstin
);

impl Gstin {
    /// Validate and normalise a GSTIN (trimmed, upper-cased).
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = value.into();
        let normalised = raw.trim().to_ascii_uppercase();
        if !matches_pattern(&normalised, Pattern::Gstin) {
            return Err(ValidationError::InvalidGstin(raw));
        }
        Ok(Self(normalised))
    }

    /// Two-digit state code prefix.
    pub fn state_code(&self) -> &str {
        &self.0[..2]
    }
}

string_newtype!(
    /// Ten-digit mobile or landline number, no separators.
    Phone
);

impl Phone {
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if !matches_pattern(trimmed, Pattern::Phone) {
            return Err(ValidationError::InvalidPhone(raw));
        }
        Ok(Self(trimmed.to_string()))
    }
}

string_newtype!(
    /// Six-digit postal index number.
    Pincode
);

impl Pincode {
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if !matches_pattern(trimmed, Pattern::Pincode) {
            return Err(ValidationError::InvalidPincode(raw));
        }
        Ok(Self(trimmed.to_string()))
    }
}

string_newtype!(
    /// Email address of shape `local@domain.tld`.
    Email
);

impl Email {
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if !matches_pattern(trimmed, Pattern::Email) {
            return Err(ValidationError::InvalidEmail(raw));
        }
        Ok(Self(trimmed.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Product-type labels
// ---------------------------------------------------------------------------

/// Category labels offered in the documents step.
pub const KNOWN_PRODUCT_TYPES: [&str; 6] = [
    "Drugs",
    "Medical Devices",
    "Food & Infant Nutrition",
    "Cosmetics",
    "Ayurvedic & Herbal",
    "Surgical & Consumables",
];

/// Maximum length of a product-type label.
pub const MAX_PRODUCT_TYPE_LEN: usize = 64;

string_newtype!(
    /// Product category label, e.g. `"Drugs"`.
    ///
    /// The label is the stable key for the per-category license entry, so
    /// it is compared exactly after trimming. Labels outside
    /// [`KNOWN_PRODUCT_TYPES`] are accepted when well-shaped; the category
    /// list belongs to the marketplace, not to this crate.
    ProductType
);

impl ProductType {
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.chars().count() > MAX_PRODUCT_TYPE_LEN {
            return Err(ValidationError::InvalidProductType(raw));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Whether this label is one of the built-in categories.
    pub fn is_known(&self) -> bool {
        KNOWN_PRODUCT_TYPES.contains(&self.0.as_str())
    }
}

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

string_newtype!(
    /// Identifier the submission collaborator assigns to a seller
    /// application. The same value keys the seller in review and catalog
    /// calls.
    ApplicationId
);

impl ApplicationId {
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyIdentifier {
                kind: "application id",
            });
        }
        Ok(Self(trimmed.to_string()))
    }
}

/// Server-side onboarding session identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Create a new random session identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
