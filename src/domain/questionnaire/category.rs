//! Selectable product categories.
//!
//! The wizard accepts any non-empty category string; this catalog only
//! lists the ones offered for selection so callers can show labels.

use serde::Serialize;

/// A selectable product category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProductCategory {
    /// Value used for prompts, fallback lookup and cache keys.
    pub value: &'static str,
    pub label: &'static str,
}

const CATEGORIES: &[ProductCategory] = &[
    ProductCategory { value: "food", label: "Food & Beverages" },
    ProductCategory { value: "personal-care", label: "Personal Care" },
    ProductCategory { value: "electronics", label: "Electronics" },
    ProductCategory { value: "clothing", label: "Clothing & Textiles" },
    ProductCategory { value: "household", label: "Household Items" },
    ProductCategory { value: "automotive", label: "Automotive" },
    ProductCategory { value: "cosmetics", label: "Cosmetics & Beauty" },
    ProductCategory { value: "pharmaceuticals", label: "Pharmaceuticals" },
    ProductCategory { value: "toys", label: "Toys & Games" },
    ProductCategory { value: "sports", label: "Sports & Fitness" },
];

impl ProductCategory {
    /// Returns every selectable category in display order.
    pub fn all() -> &'static [ProductCategory] {
        CATEGORIES
    }

    /// Finds a category by its value.
    pub fn find(value: &str) -> Option<&'static ProductCategory> {
        CATEGORIES.iter().find(|c| c.value == value)
    }

    /// Returns the label for a value, or the value itself when unlisted.
    pub fn label_for(value: &str) -> &str {
        Self::find(value).map(|c| c.label).unwrap_or(value)
    }
}
