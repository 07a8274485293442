//! Priority resolver: picks at most one timer for a visitor.
//!
//! Pure function over plain timer values -- no I/O, no hidden clock reads
//! beyond the passed-in `now`, so identical inputs always produce identical
//! output.

use chrono::{DateTime, Utc};

use super::model::{Targeting, Timer};
use super::validity::starts_in_future;

/// The visitor's storefront context at resolution time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitorContext {
    pub product_id: String,
    pub collection_ids: Vec<String>,
}

/// Priority score of a candidate for this visitor.
///
/// Product match beats collection match beats shop-wide. A targeting rule
/// that does not apply to this visitor (including an empty id set) scores 0
/// and is never selected.
pub fn priority(timer: &Timer, ctx: &VisitorContext) -> u8 {
    match &timer.targeting {
        Targeting::Product { product_ids } if product_ids.iter().any(|p| p == &ctx.product_id) => 3,
        Targeting::Collection { collection_ids }
            if collection_ids.iter().any(|c| ctx.collection_ids.contains(c)) =>
        {
            2
        }
        Targeting::All => 1,
        _ => 0,
    }
}

/// Select the single timer to show, or `None`.
///
/// Tracks the highest-priority candidate seen so far; a later candidate wins
/// only on strictly greater priority, so ties keep the earlier entry. Callers
/// supply the tie-break deliberately via candidate ordering (the store serves
/// most recently created first). A fixed timer whose `start_at` is still in
/// the future is skipped even mid-scan.
pub fn select_best_timer<'a>(
    candidates: &'a [Timer],
    ctx: &VisitorContext,
    now: DateTime<Utc>,
) -> Option<&'a Timer> {
    let mut best: Option<&Timer> = None;
    let mut max_priority = 0u8;

    for timer in candidates {
        let score = priority(timer, ctx);
        if score > max_priority {
            if starts_in_future(timer, now) {
                continue;
            }
            max_priority = score;
            best = Some(timer);
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::model::{StyleConfig, TimerKind, TimerStatus};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    fn timer(id: &str, targeting: Targeting) -> Timer {
        Timer {
            id: id.to_string(),
            shop: "demo.myshopify.com".to_string(),
            name: id.to_string(),
            description: None,
            kind: TimerKind::Fixed,
            status: TimerStatus::Active,
            start_at: None,
            end_at: Some(now() + chrono::Duration::days(1)),
            duration_minutes: None,
            targeting,
            style_config: StyleConfig::default(),
            impressions: 0,
            created_at: now(),
        }
    }

    fn candidates() -> Vec<Timer> {
        vec![
            timer("all", Targeting::All),
            timer(
                "product",
                Targeting::Product {
                    product_ids: vec!["P1".to_string()],
                },
            ),
            timer(
                "collection",
                Targeting::Collection {
                    collection_ids: vec!["C1".to_string()],
                },
            ),
        ]
    }

    fn visitor(product: &str, collections: &[&str]) -> VisitorContext {
        VisitorContext {
            product_id: product.to_string(),
            collection_ids: collections.iter().map(|c| c.to_string()).collect(),
        }
    }

    #[test]
    fn product_match_outranks_everything() {
        let set = candidates();
        let best = select_best_timer(&set, &visitor("P1", &["C1"]), now()).unwrap();
        assert_eq!(best.id, "product");
    }

    #[test]
    fn product_outranks_regardless_of_list_order() {
        let mut set = candidates();
        set.reverse();
        let best = select_best_timer(&set, &visitor("P1", &["C1"]), now()).unwrap();
        assert_eq!(best.id, "product");
    }

    #[test]
    fn falls_back_to_collection_match() {
        let set = candidates();
        let best = select_best_timer(&set, &visitor("P2", &["C1"]), now()).unwrap();
        assert_eq!(best.id, "collection");
    }

    #[test]
    fn falls_back_to_shop_wide() {
        let set = candidates();
        let best = select_best_timer(&set, &visitor("P2", &["C2"]), now()).unwrap();
        assert_eq!(best.id, "all");
    }

    #[test]
    fn no_match_yields_none() {
        let set: Vec<Timer> = candidates()
            .into_iter()
            .filter(|t| t.targeting != Targeting::All)
            .collect();
        assert!(select_best_timer(&set, &visitor("P2", &["C2"]), now()).is_none());
    }

    #[test]
    fn future_start_is_skipped_even_when_only_match() {
        let mut product = timer(
            "product",
            Targeting::Product {
                product_ids: vec!["P1".to_string()],
            },
        );
        product.start_at = Some(now() + chrono::Duration::hours(1));
        let set = vec![product];
        assert!(select_best_timer(&set, &visitor("P1", &[]), now()).is_none());
    }

    #[test]
    fn future_start_is_skipped_mid_scan() {
        let mut product = timer(
            "product",
            Targeting::Product {
                product_ids: vec!["P1".to_string()],
            },
        );
        product.start_at = Some(now() + chrono::Duration::hours(1));
        let set = vec![timer("all", Targeting::All), product];
        // The future-start product timer would outrank "all" but must be skipped.
        let best = select_best_timer(&set, &visitor("P1", &[]), now()).unwrap();
        assert_eq!(best.id, "all");
    }

    #[test]
    fn ties_keep_the_earlier_candidate() {
        let set = vec![timer("first", Targeting::All), timer("second", Targeting::All)];
        let best = select_best_timer(&set, &visitor("P2", &[]), now()).unwrap();
        assert_eq!(best.id, "first");
    }

    #[test]
    fn empty_id_sets_never_match() {
        let set = vec![
            timer("product", Targeting::Product { product_ids: vec![] }),
            timer(
                "collection",
                Targeting::Collection {
                    collection_ids: vec![],
                },
            ),
        ];
        assert!(select_best_timer(&set, &visitor("", &[]), now()).is_none());
    }

    #[test]
    fn resolution_is_deterministic() {
        let set = candidates();
        let ctx = visitor("P1", &["C1"]);
        let first = select_best_timer(&set, &ctx, now()).map(|t| t.id.clone());
        for _ in 0..10 {
            assert_eq!(select_best_timer(&set, &ctx, now()).map(|t| t.id.clone()), first);
        }
    }
}
