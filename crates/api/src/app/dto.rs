//! Request/response DTOs and mapping to/from domain types.
//!
//! The wire name `quantity` is accepted as an alias of `quantity_in_stock`
//! here and nowhere else.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use sweetshop_auth::{AuthSession, Role, TokenPair, UserAccount};
use sweetshop_core::{SweetId, UserId, ValidationError, ValidationErrors};
use sweetshop_inventory::{InventoryRecord, SweetFields};

// -------------------------
// Request DTOs
// -------------------------

/// Body of create and full-update requests. Every field is required.
#[derive(Debug, Default, Deserialize)]
pub struct SweetRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    pub price: Option<Decimal>,
    #[serde(alias = "quantity")]
    pub quantity_in_stock: Option<i64>,
}

impl SweetRequest {
    /// Report every missing field at once.
    pub fn into_fields(self) -> Result<SweetFields, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let mut require = |field: &str, present: bool| {
            if !present {
                errors.push(ValidationError::required(field));
            }
        };
        require("name", self.name.is_some());
        require("category", self.category.is_some());
        require("price", self.price.is_some());
        require("quantity_in_stock", self.quantity_in_stock.is_some());

        match (self.name, self.category, self.price, self.quantity_in_stock) {
            (Some(name), Some(category), Some(price), Some(quantity)) => {
                Ok(SweetFields::new(name, category, price, quantity))
            }
            _ => Err(errors),
        }
    }
}

/// Body of purchase/restock requests.
#[derive(Debug, Default, Deserialize)]
pub struct QuantityRequest {
    pub quantity: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub search: Option<String>,
    pub q: Option<String>,
}

impl SearchParams {
    /// `search` wins over `q`; absent means empty.
    pub fn query(&self) -> &str {
        self.search.as_deref().or(self.q.as_deref()).unwrap_or("")
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl LoginRequest {
    pub fn check(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.username.trim().is_empty() {
            errors.push(ValidationError::required("username"));
        }
        if self.password.is_empty() {
            errors.push(ValidationError::required("password"));
        }
        errors.into_result()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RefreshRequest {
    #[serde(default)]
    pub refresh_token: String,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct SweetResponse {
    pub id: SweetId,
    pub name: String,
    pub category: String,
    /// Serialized as a decimal string, e.g. `"2.50"`.
    pub price: Decimal,
    pub quantity_in_stock: i64,
}

impl From<InventoryRecord> for SweetResponse {
    fn from(r: InventoryRecord) -> Self {
        Self {
            id: r.id,
            name: r.name,
            category: r.category,
            price: r.price,
            quantity_in_stock: r.quantity_in_stock,
        }
    }
}

pub fn sweets_to_json(records: Vec<InventoryRecord>) -> Vec<SweetResponse> {
    records.into_iter().map(SweetResponse::from).collect()
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub date_joined: DateTime<Utc>,
    pub role: Role,
    pub is_staff: bool,
}

impl From<UserAccount> for UserResponse {
    fn from(u: UserAccount) -> Self {
        Self {
            is_staff: u.role.is_admin(),
            id: u.id,
            username: u.username,
            email: u.email,
            date_joined: u.date_joined,
            role: u.role,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: UserResponse,
    pub access_token: String,
    pub refresh_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

impl SessionResponse {
    pub fn new(session: AuthSession, message: Option<&'static str>) -> Self {
        let TokenPair {
            access_token,
            refresh_token,
        } = session.tokens;
        Self {
            user: session.user.into(),
            access_token,
            refresh_token,
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantity_alias_maps_to_stock() {
        let body: SweetRequest = serde_json::from_value(serde_json::json!({
            "name": "Fudge",
            "category": "Chewy",
            "price": "3.20",
            "quantity": 9
        }))
        .unwrap();
        let fields = body.into_fields().unwrap();
        assert_eq!(fields.quantity_in_stock, 9);
        assert_eq!(fields.price, Decimal::new(320, 2));
    }

    #[test]
    fn missing_fields_are_all_reported() {
        let body: SweetRequest = serde_json::from_value(serde_json::json!({ "name": "Fudge" })).unwrap();
        let errors = body.into_fields().unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field()).collect();
        assert_eq!(fields, vec!["category", "price", "quantity_in_stock"]);
    }

    #[test]
    fn price_is_serialized_as_a_string() {
        let json = serde_json::to_value(SweetResponse {
            id: SweetId::new(1),
            name: "Fudge".into(),
            category: "Chewy".into(),
            price: Decimal::new(250, 2),
            quantity_in_stock: 3,
        })
        .unwrap();
        assert_eq!(json["price"], "2.50");
        assert_eq!(json["id"], 1);
    }

    #[test]
    fn search_prefers_search_over_q() {
        let both = SearchParams {
            search: Some("choc".into()),
            q: Some("mint".into()),
        };
        assert_eq!(both.query(), "choc");
        let neither = SearchParams { search: None, q: None };
        assert_eq!(neither.query(), "");
    }
}
