//! # Request Validation
//!
//! Schema checks for the add-to-cart payload. All violations are collected
//! rather than stopping at the first, and serialize as
//! `{"message": ..., "issues": [{"path", "code", "message"}]}`.

use crate::model::EntityId;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Kind of schema violation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    Required,
    InvalidType,
    TooSmall,
    UnknownProduct,
}

/// One schema violation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    /// Field path (empty for the body itself)
    pub path: Vec<String>,
    pub code: IssueCode,
    pub message: String,
}

impl ValidationIssue {
    fn field(field: &str, code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            path: vec![field.to_string()],
            code,
            message: message.into(),
        }
    }
}

/// Structured validation failure
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationError {
    fn cart(issues: Vec<ValidationIssue>) -> Self {
        Self {
            message: "Invalid cart item".to_string(),
            issues,
        }
    }

    /// `productId` does not reference a product
    pub fn unknown_product(product_id: EntityId) -> Self {
        Self::cart(vec![ValidationIssue::field(
            "productId",
            IssueCode::UnknownProduct,
            format!("Product {} does not exist", product_id),
        )])
    }
}

/// A validated add-to-cart request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewCartItem {
    pub product_id: EntityId,
    pub quantity: i32,
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn integer_field(
    body: &serde_json::Map<String, Value>,
    field: &str,
    issues: &mut Vec<ValidationIssue>,
) -> Option<i32> {
    let value = match body.get(field) {
        None | Some(Value::Null) => {
            issues.push(ValidationIssue::field(field, IssueCode::Required, "Required"));
            return None;
        }
        Some(value) => value,
    };

    let parsed = value
        .as_i64()
        .or_else(|| value.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
        .and_then(|n| i32::try_from(n).ok());

    if parsed.is_none() {
        let message = if value.is_number() {
            "Expected a 32-bit integer".to_string()
        } else {
            format!("Expected integer, received {}", json_type(value))
        };
        issues.push(ValidationIssue::field(field, IssueCode::InvalidType, message));
    }
    parsed
}

/// Validate an add-to-cart body `{productId, quantity}`.
///
/// Unknown fields (including a client-supplied `userId`) are ignored; the
/// owner always comes from the session.
pub fn validate_cart_item(body: &Value) -> Result<NewCartItem, ValidationError> {
    let Some(object) = body.as_object() else {
        return Err(ValidationError::cart(vec![ValidationIssue {
            path: Vec::new(),
            code: IssueCode::InvalidType,
            message: format!("Expected object, received {}", json_type(body)),
        }]));
    };

    let mut issues = Vec::new();
    let product_id = integer_field(object, "productId", &mut issues);
    let quantity = integer_field(object, "quantity", &mut issues);

    if let Some(q) = quantity {
        if q < 1 {
            issues.push(ValidationIssue::field(
                "quantity",
                IssueCode::TooSmall,
                "Quantity must be at least 1",
            ));
        }
    }

    match (product_id, quantity) {
        (Some(product_id), Some(quantity)) if issues.is_empty() => Ok(NewCartItem {
            product_id,
            quantity,
        }),
        _ => Err(ValidationError::cart(issues)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_payload() {
        let item = validate_cart_item(&json!({"productId": 1, "quantity": 2})).unwrap();
        assert_eq!(
            item,
            NewCartItem {
                product_id: 1,
                quantity: 2
            }
        );
    }

    #[test]
    fn test_user_id_is_ignored() {
        let item =
            validate_cart_item(&json!({"productId": 2, "quantity": 1, "userId": 7})).unwrap();
        assert_eq!(item.product_id, 2);
    }

    #[test]
    fn test_missing_fields_collects_all_issues() {
        let err = validate_cart_item(&json!({})).unwrap_err();
        assert_eq!(err.issues.len(), 2);
        assert_eq!(err.issues[0].path, vec!["productId"]);
        assert_eq!(err.issues[0].code, IssueCode::Required);
        assert_eq!(err.issues[1].path, vec!["quantity"]);
    }

    #[test]
    fn test_wrong_types() {
        let err = validate_cart_item(&json!({"productId": "1", "quantity": 1.5})).unwrap_err();
        assert_eq!(err.issues.len(), 2);
        assert!(err.issues.iter().all(|i| i.code == IssueCode::InvalidType));
        assert_eq!(err.issues[0].message, "Expected integer, received string");
    }

    #[test]
    fn test_quantity_must_be_positive() {
        let err = validate_cart_item(&json!({"productId": 1, "quantity": 0})).unwrap_err();
        assert_eq!(err.issues[0].code, IssueCode::TooSmall);
    }

    #[test]
    fn test_out_of_range_integer() {
        let err =
            validate_cart_item(&json!({"productId": 4_000_000_000_i64, "quantity": 1})).unwrap_err();
        assert_eq!(err.issues[0].message, "Expected a 32-bit integer");
    }

    #[test]
    fn test_non_object_body() {
        let err = validate_cart_item(&json!([1, 2])).unwrap_err();
        assert!(err.issues[0].path.is_empty());
    }

    #[test]
    fn test_error_json_shape() {
        let value = serde_json::to_value(ValidationError::unknown_product(9)).unwrap();
        assert_eq!(value["message"], json!("Invalid cart item"));
        assert_eq!(value["issues"][0]["code"], json!("unknown_product"));
        assert_eq!(value["issues"][0]["path"], json!(["productId"]));
    }
}
