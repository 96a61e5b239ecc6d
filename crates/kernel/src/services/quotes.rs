//! Quote request inbox.

use dashmap::DashMap;
use thiserror::Error;
use uuid::Uuid;

use crate::format::normalize_phone;
use crate::models::{CreateQuote, QuoteRequest};

/// Longest accepted quote message, in characters.
const MAX_MESSAGE_CHARS: usize = 2_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuoteError {
    #[error("invalid quote request: {0}")]
    Invalid(String),

    #[error("unknown provider")]
    UnknownProvider,
}

/// Quote requests grouped by provider.
#[derive(Default)]
pub struct QuoteInbox {
    requests: DashMap<Uuid, Vec<QuoteRequest>>,
}

impl QuoteInbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and store a quote request.
    pub fn submit(
        &self,
        provider_id: Uuid,
        input: CreateQuote,
        country_code: &str,
        now: i64,
    ) -> Result<QuoteRequest, QuoteError> {
        let customer_name = input.customer_name.trim().to_string();
        if customer_name.is_empty() {
            return Err(QuoteError::Invalid("name is required".to_string()));
        }

        let phone = normalize_phone(&input.phone, country_code)
            .ok_or_else(|| QuoteError::Invalid("phone number is not valid".to_string()))?;

        let message = input.message.trim().to_string();
        let len = message.chars().count();
        if len == 0 || len > MAX_MESSAGE_CHARS {
            return Err(QuoteError::Invalid(format!(
                "message must be 1 to {MAX_MESSAGE_CHARS} characters"
            )));
        }

        let request = QuoteRequest {
            id: Uuid::now_v7(),
            provider_id,
            customer_name,
            phone,
            postcode: input
                .postcode
                .map(|p| p.trim().to_ascii_uppercase())
                .filter(|p| !p.is_empty()),
            message,
            created: now,
        };

        self.requests
            .entry(provider_id)
            .or_default()
            .push(request.clone());

        Ok(request)
    }

    /// Requests for a provider, oldest first.
    pub fn list_for(&self, provider_id: Uuid) -> Vec<QuoteRequest> {
        self.requests
            .get(&provider_id)
            .map(|r| r.value().clone())
            .unwrap_or_default()
    }
}

impl std::fmt::Debug for QuoteInbox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuoteInbox")
            .field("providers", &self.requests.len())
            .finish()
    }
}
