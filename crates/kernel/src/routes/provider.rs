//! Provider profile, review and quote handlers.

use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::format::{format_price, normalize_phone, whatsapp_link};
use crate::middleware::{ClientId, enforce};
use crate::models::{CreateQuote, CreateReview, ProviderRecord, QuoteRequest, RatingSummary, Review};
use crate::rate_limit::RateLimitAction;
use crate::state::AppState;

/// Create the provider router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/providers/{id}", get(show_provider))
        .route("/api/providers/{id}/reviews", post(create_review))
        .route("/api/providers/{id}/quotes", post(create_quote))
}

/// Provider profile response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProviderJson {
    #[serde(flatten)]
    pub provider: ProviderRecord,
    /// Phone in E.164 form, when it parses.
    pub phone_e164: Option<String>,
    pub whatsapp_link: Option<String>,
    /// Call-out fee formatted in the site currency.
    pub call_out_fee_display: Option<String>,
    pub reviews: Vec<Review>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReviewCreated {
    pub review: Review,
    pub rating: RatingSummary,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QuoteCreated {
    pub quote: QuoteRequest,
    /// Link for the customer to follow up with the provider on WhatsApp.
    pub whatsapp_link: Option<String>,
}

async fn show_provider(
    State(state): State<AppState>,
    Extension(client): Extension<ClientId>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ProviderJson>> {
    enforce(&state, RateLimitAction::ProfileView, &client)?;

    let provider = state.directory().provider(id).ok_or(AppError::NotFound)?;
    let config = state.config();

    let phone_e164 = provider
        .phone
        .as_deref()
        .and_then(|p| normalize_phone(p, &config.default_country_code));
    let whatsapp_link = provider
        .whatsapp_number()
        .and_then(|p| whatsapp_link(p, &config.default_country_code, None));
    let call_out_fee_display = provider
        .call_out_fee
        .map(|fee| format_price(fee, &config.currency));
    let reviews = state.directory().reviews().list_for(id);

    Ok(Json(ProviderJson {
        provider,
        phone_e164,
        whatsapp_link,
        call_out_fee_display,
        reviews,
    }))
}

async fn create_review(
    State(state): State<AppState>,
    Extension(client): Extension<ClientId>,
    Path(id): Path<Uuid>,
    Json(input): Json<CreateReview>,
) -> AppResult<(StatusCode, Json<ReviewCreated>)> {
    enforce(&state, RateLimitAction::Review, &client)?;

    let (review, rating) = state.directory().add_review(id, input)?;
    state.metrics().record_review();

    info!(provider_id = %id, review_id = %review.id, rating = review.rating, "review submitted");

    Ok((StatusCode::CREATED, Json(ReviewCreated { review, rating })))
}

async fn create_quote(
    State(state): State<AppState>,
    Extension(client): Extension<ClientId>,
    Path(id): Path<Uuid>,
    Json(input): Json<CreateQuote>,
) -> AppResult<(StatusCode, Json<QuoteCreated>)> {
    enforce(&state, RateLimitAction::Quote, &client)?;

    let country_code = &state.config().default_country_code;
    let quote = state.directory().submit_quote(id, input, country_code)?;
    state.metrics().record_quote();

    let whatsapp_link = state
        .directory()
        .provider(id)
        .and_then(|p| {
            p.whatsapp_number()
                .and_then(|n| whatsapp_link(n, country_code, Some(quote.message.as_str())))
        });

    info!(provider_id = %id, quote_id = %quote.id, "quote request submitted");

    Ok((
        StatusCode::CREATED,
        Json(QuoteCreated {
            quote,
            whatsapp_link,
        }),
    ))
}
