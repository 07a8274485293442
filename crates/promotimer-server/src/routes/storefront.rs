//! Storefront timer resolution: GET /api/storefront/timer
//!
//! Query: `shop` and `productId` required, `collectionIds` repeatable.
//! Success is either the normalized payload for the single best timer or
//! `{"timer": null}` when nothing matched.

use axum::extract::{RawQuery, State};
use axum::response::Json;
use chrono::Utc;
use promotimer_core::{
    is_eligible, select_best_timer, Timer, TimerPayload, TimerResponse, VisitorContext,
};
use tracing::{debug, warn};

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Parsed storefront query parameters.
#[derive(Debug, PartialEq, Eq)]
pub struct StorefrontParams {
    pub shop: String,
    pub product_id: String,
    pub collection_ids: Vec<String>,
}

impl StorefrontParams {
    /// Parse from a raw query string. `collectionIds` may repeat.
    pub fn parse(query: &str) -> Result<Self> {
        let mut shop = None;
        let mut product_id = None;
        let mut collection_ids = Vec::new();

        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "shop" if !value.is_empty() => shop = Some(value.into_owned()),
                "productId" if !value.is_empty() => product_id = Some(value.into_owned()),
                "collectionIds" if !value.is_empty() => collection_ids.push(value.into_owned()),
                _ => {}
            }
        }

        match (shop, product_id) {
            (Some(shop), Some(product_id)) => Ok(Self {
                shop,
                product_id,
                collection_ids,
            }),
            _ => Err(AppError::MissingParams("shop, productId")),
        }
    }
}

/// GET /api/storefront/timer - resolve the single timer for this visitor.
pub async fn storefront_timer(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Json<TimerResponse>> {
    let params = StorefrontParams::parse(query.as_deref().unwrap_or(""))?;
    debug!(shop = %params.shop, product = %params.product_id, "storefront timer request");

    let now = Utc::now();
    let candidates = {
        let supplier = state
            .supplier
            .lock()
            .map_err(|_| AppError::Internal("candidate supplier is unavailable".to_string()))?;
        supplier
            .list_active_candidates(&params.shop, now)
            .map_err(|e| AppError::Internal(e.to_string()))?
    };

    let eligible: Vec<Timer> = candidates
        .into_iter()
        .filter(|t| is_eligible(t, now))
        .collect();

    let ctx = VisitorContext {
        product_id: params.product_id,
        collection_ids: params.collection_ids,
    };

    let Some(best) = select_best_timer(&eligible, &ctx, now) else {
        return Ok(Json(TimerResponse { timer: None }));
    };

    // Best-effort: a lost impression must never block the display response.
    if let Ok(supplier) = state.supplier.lock() {
        if let Err(e) = supplier.record_impression(&best.id) {
            warn!(timer_id = %best.id, "failed to record impression: {e}");
        }
    }

    Ok(Json(TimerResponse {
        timer: Some(TimerPayload::from(best)),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_requires_shop_and_product() {
        assert!(StorefrontParams::parse("shop=demo.myshopify.com").is_err());
        assert!(StorefrontParams::parse("productId=P1").is_err());
        assert!(StorefrontParams::parse("shop=&productId=P1").is_err());
        assert!(StorefrontParams::parse("").is_err());
    }

    #[test]
    fn parse_collects_repeated_collection_ids() {
        let params = StorefrontParams::parse(
            "shop=demo.myshopify.com&productId=P1&collectionIds=C1&collectionIds=C2",
        )
        .unwrap();
        assert_eq!(params.shop, "demo.myshopify.com");
        assert_eq!(params.product_id, "P1");
        assert_eq!(params.collection_ids, vec!["C1".to_string(), "C2".to_string()]);
    }

    #[test]
    fn parse_decodes_gid_values() {
        let params = StorefrontParams::parse(
            "shop=demo.myshopify.com&productId=gid%3A%2F%2Fshopify%2FProduct%2F42",
        )
        .unwrap();
        assert_eq!(params.product_id, "gid://shopify/Product/42");
    }
}
