//! Product listings submitted by an onboarded seller. A draft is checked
//! field by field, first failure wins, before it reaches the catalog
//! collaborator.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use onboard_core::{matches_pattern, required, NewProduct, Pattern, ProductType};

/// Raw product form as entered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductDraft {
    pub name: String,
    pub product_type: String,
    pub manufacturer: String,
    pub pack_size: String,
    pub hsn_code: String,
    /// Maximum retail price in rupees, e.g. `"149.50"`.
    pub mrp: String,
    pub prescription_required: bool,
}

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("{message}")]
pub struct CatalogFailure {
    pub field: &'static str,
    pub message: String,
}

fn fail(field: &'static str, message: impl Into<String>) -> CatalogFailure {
    CatalogFailure {
        field,
        message: message.into(),
    }
}

/// Parse a rupee amount with at most two decimals into paise.
pub fn parse_mrp_paise(mrp: &str) -> Option<u64> {
    let mrp = mrp.trim();
    if !matches_pattern(mrp, Pattern::Price) {
        return None;
    }
    let (rupees, fraction) = mrp.split_once('.').unwrap_or((mrp, ""));
    let rupees: u64 = rupees.parse().ok()?;
    let paise: u64 = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<u64>().ok()? * 10,
        _ => fraction.parse().ok()?,
    };
    rupees.checked_mul(100)?.checked_add(paise)
}

impl ProductDraft {
    /// Check the draft against the seller's approved product types.
    pub fn validate(&self, approved: &[ProductType]) -> Result<NewProduct, CatalogFailure> {
        if !required(self.name.as_str()) {
            return Err(fail("name", "Please enter the product name"));
        }
        let product_type = approved
            .iter()
            .find(|pt| pt.as_str() == self.product_type.trim())
            .cloned()
            .ok_or_else(|| {
                fail(
                    "product_type",
                    "Please choose one of your approved product types",
                )
            })?;
        if !required(self.manufacturer.as_str()) {
            return Err(fail("manufacturer", "Please enter the manufacturer"));
        }
        if !required(self.pack_size.as_str()) {
            return Err(fail("pack_size", "Please enter the pack size"));
        }
        let hsn_code = self.hsn_code.trim();
        if !matches_pattern(hsn_code, Pattern::Hsn) {
            return Err(fail("hsn_code", "Please enter a valid HSN code (4 to 8 digits)"));
        }
        let mrp_paise = parse_mrp_paise(&self.mrp)
            .filter(|paise| *paise > 0)
            .ok_or_else(|| fail("mrp", "Please enter a valid MRP"))?;

        Ok(NewProduct {
            name: self.name.trim().to_string(),
            product_type,
            manufacturer: self.manufacturer.trim().to_string(),
            pack_size: self.pack_size.trim().to_string(),
            hsn_code: hsn_code.to_string(),
            mrp_paise,
            prescription_required: self.prescription_required,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approved() -> Vec<ProductType> {
        vec![ProductType::new("Drugs").unwrap()]
    }

    fn draft() -> ProductDraft {
        ProductDraft {
            name: "Paracetamol 500mg".into(),
            product_type: "Drugs".into(),
            manufacturer: "Acme Labs".into(),
            pack_size: "10 x 10 tablets".into(),
            hsn_code: "30049099".into(),
            mrp: "32.5".into(),
            prescription_required: false,
        }
    }

    #[test]
    fn valid_draft_converts_price_to_paise() {
        let product = draft().validate(&approved()).unwrap();
        assert_eq!(product.mrp_paise, 3250);
        assert_eq!(product.product_type.as_str(), "Drugs");
    }

    #[test]
    fn unapproved_product_type_is_refused() {
        let mut d = draft();
        d.product_type = "Cosmetics".into();
        assert_eq!(d.validate(&approved()).unwrap_err().field, "product_type");
    }

    #[test]
    fn first_failure_wins() {
        let d = ProductDraft::default();
        assert_eq!(d.validate(&approved()).unwrap_err().field, "name");
    }

    #[test]
    fn hsn_and_mrp_formats() {
        let mut d = draft();
        d.hsn_code = "300".into();
        assert_eq!(d.validate(&approved()).unwrap_err().field, "hsn_code");

        let mut d = draft();
        d.mrp = "0.00".into();
        assert_eq!(d.validate(&approved()).unwrap_err().field, "mrp");
        d.mrp = "12.345".into();
        assert_eq!(d.validate(&approved()).unwrap_err().field, "mrp");
    }

    #[test]
    fn mrp_parsing() {
        assert_eq!(parse_mrp_paise("149"), Some(14900));
        assert_eq!(parse_mrp_paise(" 149.05 "), Some(14905));
        assert_eq!(parse_mrp_paise("-1"), None);
        assert_eq!(parse_mrp_paise("1e3"), None);
        assert_eq!(parse_mrp_paise("99999999999999999999"), None);
    }
}
