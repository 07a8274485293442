//! Storefront countdown client.
//!
//! Mirrors what the theme widget does: fetch the resolved timer from the
//! delivery endpoint, pin down the deadline (evergreen deadlines are frozen
//! in the local deadline store so reruns keep counting toward the same
//! instant), then tick once a second until expiry.
//!
//! Fetch problems are swallowed: a storefront must render nothing rather
//! than a broken widget, so any network/HTTP failure just exits quietly.

use std::io::Write;

use chrono::{DateTime, Utc};
use clap::Args;
use promotimer_core::{
    CountdownEngine, CountdownState, DeadlineStore, TimerKind, TimerPayload, TimerResponse,
};

use super::timer::parse_id_list;

const FETCH_TIMEOUT_SECS: u64 = 10;

#[derive(Args)]
pub struct WatchArgs {
    /// Delivery endpoint base URL
    #[arg(long, default_value = "http://127.0.0.1:8080")]
    endpoint: String,
    /// Shop domain
    #[arg(long)]
    shop: String,
    /// Product the visitor is viewing
    #[arg(long)]
    product_id: String,
    /// Comma-separated collection ids for the current context
    #[arg(long, default_value = "")]
    collection_ids: String,
    /// Render a single frame instead of ticking every second
    #[arg(long)]
    once: bool,
}

pub fn run(args: WatchArgs) -> Result<(), Box<dyn std::error::Error>> {
    let Some(payload) = fetch_timer(&args) else {
        // Nothing matched, or the fetch failed: render nothing.
        return Ok(());
    };

    let store = DeadlineStore::open();
    let Some(deadline) = resolve_deadline(&payload, &store, Utc::now()) else {
        return Ok(());
    };

    if let Some(description) = &payload.description {
        println!("{description}");
    }

    let mut engine = CountdownEngine::new(
        payload.id.clone(),
        deadline,
        payload.style_config.urgency,
    );

    loop {
        let now = Utc::now();
        engine.tick_at(now);
        let pulse = if engine.pulse_active() { " !" } else { "" };
        print!("\r{}{pulse}", engine.digits(now));
        std::io::stdout().flush()?;

        if engine.state() == CountdownState::Expired || args.once {
            println!();
            break;
        }
        std::thread::sleep(std::time::Duration::from_secs(1));
    }

    Ok(())
}

/// Fetch the resolved timer, returning `None` on any failure or non-success
/// response.
fn fetch_timer(args: &WatchArgs) -> Option<TimerPayload> {
    let url = build_url(
        &args.endpoint,
        &args.shop,
        &args.product_id,
        &parse_id_list(&args.collection_ids),
    )?;

    let runtime = tokio::runtime::Runtime::new().ok()?;
    runtime.block_on(async {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(FETCH_TIMEOUT_SECS))
            .build()
            .ok()?;
        let response = client.get(url).send().await.ok()?;
        if !response.status().is_success() {
            return None;
        }
        let body: TimerResponse = response.json().await.ok()?;
        body.timer
    })
}

fn build_url(
    endpoint: &str,
    shop: &str,
    product_id: &str,
    collection_ids: &[String],
) -> Option<url::Url> {
    let mut url = url::Url::parse(endpoint)
        .and_then(|u| u.join("/api/storefront/timer"))
        .ok()?;
    {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("shop", shop);
        pairs.append_pair("productId", product_id);
        for id in collection_ids {
            pairs.append_pair("collectionIds", id);
        }
    }
    Some(url)
}

/// Deadline for the countdown instance.
///
/// Fixed timers share their absolute `end_at`; evergreen timers get the
/// visitor's frozen deadline from the local store (or a fresh one when none
/// is stored or the stored one has passed).
fn resolve_deadline(
    payload: &TimerPayload,
    store: &DeadlineStore,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    match payload.kind {
        TimerKind::Fixed => payload.end_at,
        TimerKind::Evergreen => Some(store.get_or_create(
            &payload.id,
            payload.duration_minutes.unwrap_or(0),
            now,
        )),
    }
}
