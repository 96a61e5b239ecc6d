//! Quote request model.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A customer's request for a quote from a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub customer_name: String,
    /// Customer phone in E.164 form.
    pub phone: String,
    pub postcode: Option<String>,
    pub message: String,
    pub created: i64,
}

/// Input for submitting a quote request.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateQuote {
    pub customer_name: String,
    pub phone: String,
    pub postcode: Option<String>,
    pub message: String,
}
