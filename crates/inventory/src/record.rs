use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use sweetshop_core::{Entity, SweetId, ValidationError};

/// Maximum length of a sweet name (characters).
pub const MAX_NAME_LEN: usize = 255;

/// Maximum length of a category label (characters).
pub const MAX_CATEGORY_LEN: usize = 100;

/// Number of decimal places a price may carry.
pub const PRICE_SCALE: u32 = 2;

/// Largest accepted price (`NUMERIC(6,2)`): 9999.99.
pub const MAX_PRICE: Decimal = Decimal::from_parts(999_999, 0, 0, false, PRICE_SCALE);

/// Largest stock level a record may hold (`INTEGER` column).
pub const MAX_STOCK: i64 = i32::MAX as i64;

/// One sweet: catalog data plus its current stock level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub id: SweetId,
    pub name: String,
    pub category: String,
    pub price: Decimal,
    pub quantity_in_stock: i64,
}

impl InventoryRecord {
    /// Attach a store-assigned id to validated fields.
    pub fn from_valid(id: SweetId, sweet: ValidSweet) -> Self {
        Self {
            id,
            name: sweet.name,
            category: sweet.category,
            price: sweet.price,
            quantity_in_stock: sweet.quantity_in_stock,
        }
    }

    /// Whether the record matches a lowercase search needle on name or category.
    pub fn matches(&self, needle_lowercase: &str) -> bool {
        self.name.to_lowercase().contains(needle_lowercase)
            || self.category.to_lowercase().contains(needle_lowercase)
    }
}

impl Entity for InventoryRecord {
    type Id = SweetId;

    fn id(&self) -> SweetId {
        self.id
    }
}

/// Caller-supplied fields for create/update, not yet range-checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweetFields {
    pub name: String,
    pub category: String,
    pub price: Decimal,
    pub quantity_in_stock: i64,
}

impl SweetFields {
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        price: Decimal,
        quantity_in_stock: i64,
    ) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            price,
            quantity_in_stock,
        }
    }

    /// Check every field invariant and return the normalized (trimmed) value.
    ///
    /// Fields are checked in declaration order; the first failure is returned.
    pub fn validate(&self) -> Result<ValidSweet, ValidationError> {
        let name = required_text("name", &self.name, MAX_NAME_LEN)?;
        let category = required_text("category", &self.category, MAX_CATEGORY_LEN)?;

        if self.price <= Decimal::ZERO {
            return Err(ValidationError::must_be_positive("price"));
        }
        if self.price.normalize().scale() > PRICE_SCALE {
            return Err(ValidationError::too_precise("price", PRICE_SCALE));
        }
        if self.price > MAX_PRICE {
            return Err(ValidationError::too_large("price", MAX_PRICE));
        }

        if self.quantity_in_stock < 0 {
            return Err(ValidationError::negative("quantity_in_stock"));
        }
        if self.quantity_in_stock > MAX_STOCK {
            return Err(ValidationError::too_large("quantity_in_stock", MAX_STOCK));
        }

        let mut price = self.price;
        price.rescale(PRICE_SCALE);

        Ok(ValidSweet {
            name,
            category,
            price,
            quantity_in_stock: self.quantity_in_stock,
        })
    }
}

fn required_text(field: &str, value: &str, max: usize) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::required(field));
    }
    if trimmed.chars().count() > max {
        return Err(ValidationError::too_long(field, max));
    }
    Ok(trimmed.to_string())
}

/// Fields that passed [`SweetFields::validate`].
///
/// Can only be built through validation, so a store receiving one never has
/// to re-check invariants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidSweet {
    name: String,
    category: String,
    price: Decimal,
    quantity_in_stock: i64,
}

impl ValidSweet {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn price(&self) -> Decimal {
        self.price
    }

    pub fn quantity_in_stock(&self) -> i64 {
        self.quantity_in_stock
    }
}
