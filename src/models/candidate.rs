use crate::models::BaseUnit;
use crate::service::{extract_quantities, has_explicit_quantity, normalize, Quantities, Tokenizer};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// 目录中读出的原始报价 (尚未规范化)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub title: String,
    pub price: f64,
    pub base_unit: Option<String>,
}

/// 来源目录中的一条报价
///
/// 规范化标题、词集合、规格都只由原始标题决定，构造后不再变化。
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub raw_title: String,
    pub normalized_title: String,
    pub price: f64,
    pub base_unit: Option<BaseUnit>,
    pub has_explicit_quantity: bool,
    pub tokens: IndexSet<String>,
    pub quantities: Quantities,
}

impl Candidate {
    /// 标题为空或价格不是正数时返回 None
    pub fn new(
        raw_title: &str,
        price: f64,
        base_unit: Option<BaseUnit>,
        tokenizer: &Tokenizer,
    ) -> Option<Self> {
        if raw_title.trim().is_empty() || !price.is_finite() || price <= 0.0 {
            return None;
        }
        let normalized_title = normalize(raw_title);
        let tokens = tokenizer.token_set(&normalized_title);
        Some(Self {
            raw_title: raw_title.to_string(),
            normalized_title,
            price,
            base_unit,
            has_explicit_quantity: has_explicit_quantity(raw_title),
            tokens,
            quantities: extract_quantities(raw_title),
        })
    }

    pub fn from_listing(listing: &Listing, tokenizer: &Tokenizer) -> Option<Self> {
        let base_unit = listing.base_unit.as_deref().and_then(BaseUnit::parse);
        Self::new(&listing.title, listing.price, base_unit, tokenizer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_fields_from_title() {
        let c = Candidate::new("Молоко 2.5% 900 мл", 45.0, None, &Tokenizer::default()).unwrap();
        assert_eq!(c.normalized_title, "молоко");
        assert!(c.has_explicit_quantity);
        assert!(c.tokens.contains("молок"));
        assert!((c.quantities.volume_l().unwrap() - 0.9).abs() < 1e-9);
    }

    #[test]
    fn rejects_blank_title_and_bad_price() {
        let t = Tokenizer::default();
        assert!(Candidate::new("   ", 10.0, None, &t).is_none());
        assert!(Candidate::new("Хліб", 0.0, None, &t).is_none());
        assert!(Candidate::new("Хліб", -3.0, None, &t).is_none());
        assert!(Candidate::new("Хліб", f64::NAN, None, &t).is_none());
    }
}
