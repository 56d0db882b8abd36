//! Lenient JSON body extractor.
//!
//! Handlers validate their own payloads, so a body that is missing, not
//! JSON, or sent with another content type reaches them as an empty object
//! instead of being rejected by axum with 415/422.

use axum::{
    extract::{FromRequest, Request},
    Json,
};
use serde_json::{Map, Value};
use std::convert::Infallible;
use tracing::debug;

/// Request body as JSON, or `{}` when it cannot be read as JSON
#[derive(Debug, Clone, PartialEq)]
pub struct JsonBody(pub Value);

impl<S> FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<Value>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                debug!(
                    status = %rejection.status(),
                    "Unreadable request body treated as empty: {}",
                    rejection.body_text()
                );
                Ok(Self(Value::Object(Map::new())))
            }
        }
    }
}

impl JsonBody {
    /// String field, `None` when missing or not a string
    pub fn str_field(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{self, header};
    use serde_json::json;

    async fn extract(content_type: Option<&str>, body: &'static str) -> Value {
        let mut builder = http::Request::builder().method("POST").uri("/");
        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }
        let req = builder.body(Body::from(body)).unwrap();
        let JsonBody(value) = JsonBody::from_request(req, &()).await.unwrap();
        value
    }

    #[tokio::test]
    async fn test_json_body_is_passed_through() {
        let value = extract(Some("application/json"), r#"{"productId": 1}"#).await;
        assert_eq!(value, json!({"productId": 1}));
    }

    #[tokio::test]
    async fn test_unreadable_bodies_become_empty_objects() {
        assert_eq!(extract(None, "").await, json!({}));
        assert_eq!(
            extract(Some("application/x-www-form-urlencoded"), "productId=1&quantity=1").await,
            json!({})
        );
        assert_eq!(extract(Some("application/json"), "{not json").await, json!({}));
    }
}
