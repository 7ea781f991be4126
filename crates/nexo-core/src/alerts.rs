//! # Alert Generator
//!
//! Derives alerts from product and customer snapshots, then reconciles the
//! candidates with what is already stored.
//!
//! ## Rules
//! ```text
//! ┌──────────────────┬──────────────────────────────────┬───────────────────────┐
//! │ type             │ emitted when                     │ severity high when    │
//! ├──────────────────┼──────────────────────────────────┼───────────────────────┤
//! │ low_stock        │ current_stock <= min_stock       │ current_stock == 0    │
//! │ expiry_warning   │ 0 <= days_until_expiry <= 7      │ days <= 3             │
//! │ high_debt        │ current_debt >= 80% credit_limit │ debt >= credit_limit  │
//! └──────────────────┴──────────────────────────────────┴───────────────────────┘
//! otherwise severity is medium. Rules are independent: one product can
//! raise both low_stock and expiry_warning.
//! ```
//!
//! ## Reconciliation
//! Alerts are identified by `{type, related_id}`, not by message text:
//! ```text
//! candidate key not stored              → insert
//! stored, same severity and message     → leave untouched (keeps is_read)
//! stored, severity or message changed   → update in place, reopen
//! ```
//! The same plan keeps the store within `MAX_STORED_ALERTS`:
//! ```text
//! room needed ──► evict stale alerts (key no longer raised), read first,
//!                 oldest first
//!       still short ──► skip the least severe inserts
//!       still over  ──► evict the oldest live alerts
//! ```
//! Applying a plan and reconciling again with the same candidates yields an
//! empty plan, also when more conditions are active than the store holds.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};

use crate::types::{
    Alert, AlertKey, AlertPatch, AlertSeverity, AlertType, Customer, NewAlert, Product,
};
use crate::{EXPIRY_CRITICAL_DAYS, EXPIRY_WARNING_DAYS, MAX_STORED_ALERTS};

// =============================================================================
// Rules
// =============================================================================

/// Low stock rule for one product.
pub fn low_stock_alert(product: &Product) -> Option<NewAlert> {
    if !product.is_low_stock() {
        return None;
    }
    let (severity, message) = if product.current_stock == 0 {
        (
            AlertSeverity::High,
            format!("{} tiene stock agotado", product.name),
        )
    } else {
        (
            AlertSeverity::Medium,
            format!(
                "{} tiene stock bajo ({} unidades)",
                product.name, product.current_stock
            ),
        )
    };
    Some(NewAlert {
        alert_type: AlertType::LowStock,
        severity,
        message,
        related_id: Some(product.id.clone()),
        is_read: false,
    })
}

/// Expiry rule for one product.
pub fn expiry_alert(product: &Product, now: DateTime<Utc>) -> Option<NewAlert> {
    let days = product.days_until_expiry(now)?;
    if !(0..=EXPIRY_WARNING_DAYS).contains(&days) {
        return None;
    }
    let severity = if days <= EXPIRY_CRITICAL_DAYS {
        AlertSeverity::High
    } else {
        AlertSeverity::Medium
    };
    let unit = if days == 1 { "día" } else { "días" };
    Some(NewAlert {
        alert_type: AlertType::ExpiryWarning,
        severity,
        message: format!("{} vence en {} {}", product.name, days, unit),
        related_id: Some(product.id.clone()),
        is_read: false,
    })
}

/// High debt rule for one customer.
pub fn high_debt_alert(customer: &Customer) -> Option<NewAlert> {
    let debt = customer.current_debt;
    let limit = customer.credit_limit;
    if !debt.reaches_fraction_of(limit, 4, 5) {
        return None;
    }
    let (severity, message) = if debt >= limit {
        (
            AlertSeverity::High,
            format!("{} alcanzó su límite de crédito", customer.name),
        )
    } else {
        (
            AlertSeverity::Medium,
            format!("{} está cerca de su límite de crédito", customer.name),
        )
    };
    Some(NewAlert {
        alert_type: AlertType::HighDebt,
        severity,
        message,
        related_id: Some(customer.id.clone()),
        is_read: false,
    })
}

/// Runs every rule over the snapshots.
///
/// Output order: low stock per product, expiry per product, debt per
/// customer.
pub fn generate(products: &[Product], customers: &[Customer], now: DateTime<Utc>) -> Vec<NewAlert> {
    let low = products.iter().filter_map(low_stock_alert);
    let expiring = products.iter().filter_map(|p| expiry_alert(p, now));
    let debt = customers.iter().filter_map(high_debt_alert);
    low.chain(expiring).chain(debt).collect()
}

// =============================================================================
// Reconciliation
// =============================================================================

/// Writes needed to bring stored alerts in line with the candidates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlertPlan {
    pub inserts: Vec<NewAlert>,
    /// `(alert id, patch)` for alerts whose content changed.
    pub refreshes: Vec<(String, AlertPatch)>,
    /// Ids of stored alerts to delete so the store stays within the cap.
    pub evictions: Vec<String>,
}

impl AlertPlan {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inserts.is_empty() && self.refreshes.is_empty() && self.evictions.is_empty()
    }
}

/// Matches candidates against stored alerts by structural key, within
/// `MAX_STORED_ALERTS`.
///
/// When several stored alerts share a key, the newest one is the match.
pub fn reconcile(existing: &[Alert], candidates: Vec<NewAlert>) -> AlertPlan {
    reconcile_within(existing, candidates, MAX_STORED_ALERTS)
}

fn reconcile_within(existing: &[Alert], candidates: Vec<NewAlert>, cap: usize) -> AlertPlan {
    let mut matched: HashMap<AlertKey, &Alert> = HashMap::new();
    for alert in existing {
        let key = alert.key();
        let newer = matched
            .get(&key)
            .map_or(true, |current| alert.created_at > current.created_at);
        if newer {
            matched.insert(key, alert);
        }
    }

    let active: HashSet<AlertKey> = candidates.iter().map(NewAlert::key).collect();

    let mut plan = AlertPlan::default();
    let mut inserts = Vec::new();
    for candidate in candidates {
        match matched.get(&candidate.key()) {
            None => inserts.push(candidate),
            Some(alert)
                if alert.severity == candidate.severity && alert.message == candidate.message => {}
            Some(alert) => plan.refreshes.push((
                alert.id.clone(),
                AlertPatch {
                    severity: Some(candidate.severity),
                    message: Some(candidate.message),
                    is_read: Some(false),
                },
            )),
        }
    }

    let is_live = |alert: &Alert| {
        let key = alert.key();
        active.contains(&key) && matched.get(&key).is_some_and(|m| m.id == alert.id)
    };
    let (live, mut stale): (Vec<&Alert>, Vec<&Alert>) =
        existing.iter().partition(|alert| is_live(alert));

    let mut excess = (existing.len() + inserts.len()).saturating_sub(cap);

    stale.sort_by(|a, b| eviction_order(a, b));
    for alert in stale.iter().take(excess) {
        plan.evictions.push(alert.id.clone());
    }
    excess -= excess.min(stale.len());

    if excess > 0 {
        // Stable: equal severities keep generator order.
        inserts.sort_by(|a, b| b.severity.cmp(&a.severity));
        let dropped = excess.min(inserts.len());
        inserts.truncate(inserts.len() - dropped);
        excess -= dropped;
    }

    if excess > 0 {
        let mut live = live;
        live.sort_by(|a, b| eviction_order(a, b));
        for alert in live.into_iter().take(excess) {
            plan.evictions.push(alert.id.clone());
        }
        let evicted: HashSet<&str> = plan.evictions.iter().map(String::as_str).collect();
        plan.refreshes.retain(|(id, _)| !evicted.contains(id.as_str()));
    }

    plan.inserts = inserts;
    plan
}

/// Read before unread, then oldest first.
fn eviction_order(a: &Alert, b: &Alert) -> std::cmp::Ordering {
    b.is_read
        .cmp(&a.is_read)
        .then_with(|| a.created_at.cmp(&b.created_at))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::types::{NewCustomer, NewProduct};
    use chrono::Duration;
    use proptest::prelude::*;

    fn product(id: &str, stock: i64, min: i64, expiry: Option<DateTime<Utc>>) -> Product {
        Product::from_new(
            id.to_string(),
            NewProduct {
                name: format!("Producto {}", id),
                description: None,
                barcode: None,
                category: "Abarrotes".to_string(),
                current_stock: stock,
                min_stock: min,
                max_stock: min.max(stock) + 10,
                unit_price: Money::from_pesos(1000),
                cost_price: Money::from_pesos(700),
                supplier: None,
                expiry_date: expiry,
            },
            Utc::now(),
        )
    }

    fn customer(id: &str, limit: i64, debt: i64) -> Customer {
        Customer::from_new(
            id.to_string(),
            NewCustomer {
                name: format!("Cliente {}", id),
                phone: None,
                email: None,
                address: None,
                credit_limit: Money::from_pesos(limit),
                current_debt: Money::from_pesos(debt),
            },
            Utc::now(),
        )
    }

    fn stored(id: &str, candidate: NewAlert, created_at: DateTime<Utc>) -> Alert {
        Alert::from_new(id.to_string(), candidate, created_at)
    }

    #[test]
    fn test_low_stock_messages() {
        let out = low_stock_alert(&product("1", 0, 5, None)).unwrap();
        assert_eq!(out.severity, AlertSeverity::High);
        assert_eq!(out.message, "Producto 1 tiene stock agotado");

        let low = low_stock_alert(&product("2", 8, 15, None)).unwrap();
        assert_eq!(low.severity, AlertSeverity::Medium);
        assert_eq!(low.message, "Producto 2 tiene stock bajo (8 unidades)");

        assert!(low_stock_alert(&product("3", 16, 15, None)).is_none());
    }

    #[test]
    fn test_expiry_messages_and_bounds() {
        let now = Utc::now();
        let at = |days: i64| Some(now + Duration::days(days) + Duration::minutes(5));

        let one = expiry_alert(&product("1", 10, 0, at(1)), now).unwrap();
        assert_eq!(one.message, "Producto 1 vence en 1 día");
        assert_eq!(one.severity, AlertSeverity::High);

        let five = expiry_alert(&product("1", 10, 0, at(5)), now).unwrap();
        assert_eq!(five.message, "Producto 1 vence en 5 días");
        assert_eq!(five.severity, AlertSeverity::Medium);

        assert!(expiry_alert(&product("1", 10, 0, at(8)), now).is_none());
        assert!(expiry_alert(&product("1", 10, 0, Some(now - Duration::hours(1))), now).is_none());
        assert!(expiry_alert(&product("1", 10, 0, None), now).is_none());
    }

    #[test]
    fn test_high_debt_messages() {
        let near = high_debt_alert(&customer("2", 300, 280)).unwrap();
        assert_eq!(near.message, "Cliente 2 está cerca de su límite de crédito");
        assert_eq!(near.severity, AlertSeverity::Medium);

        let reached = high_debt_alert(&customer("2", 300, 300)).unwrap();
        assert_eq!(reached.message, "Cliente 2 alcanzó su límite de crédito");
        assert_eq!(reached.severity, AlertSeverity::High);

        assert!(high_debt_alert(&customer("1", 500, 150)).is_none());
    }

    #[test]
    fn test_zero_limit_customer_always_flagged() {
        let alert = high_debt_alert(&customer("z", 0, 0)).unwrap();
        assert_eq!(alert.severity, AlertSeverity::High);
    }

    #[test]
    fn test_rules_are_independent() {
        let now = Utc::now();
        let p = product("1", 2, 5, Some(now + Duration::days(2) + Duration::minutes(1)));
        let alerts = generate(&[p], &[], now);
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].alert_type, AlertType::LowStock);
        assert_eq!(alerts[1].alert_type, AlertType::ExpiryWarning);
    }

    #[test]
    fn test_reconcile_inserts_new_keys() {
        let candidates = generate(&[product("1", 0, 5, None)], &[customer("c", 100, 90)], Utc::now());
        let plan = reconcile(&[], candidates.clone());
        assert_eq!(plan.inserts, candidates);
        assert!(plan.refreshes.is_empty());
    }

    #[test]
    fn test_reconcile_unchanged_is_noop() {
        let now = Utc::now();
        let candidates = generate(&[product("1", 3, 5, None)], &[], now);
        let mut existing = stored("a1", candidates[0].clone(), now);
        existing.is_read = true;

        let plan = reconcile(&[existing], candidates);
        assert!(plan.is_empty());
    }

    #[test]
    fn test_reconcile_changed_count_refreshes_in_place() {
        let now = Utc::now();
        let before = generate(&[product("1", 3, 5, None)], &[], now);
        let mut existing = stored("a1", before[0].clone(), now);
        existing.is_read = true;

        let after = generate(&[product("1", 0, 5, None)], &[], now);
        let plan = reconcile(&[existing], after);

        assert!(plan.inserts.is_empty());
        assert_eq!(plan.refreshes.len(), 1);
        let (id, patch) = &plan.refreshes[0];
        assert_eq!(id, "a1");
        assert_eq!(patch.severity, Some(AlertSeverity::High));
        assert_eq!(patch.message.as_deref(), Some("Producto 1 tiene stock agotado"));
        assert_eq!(patch.is_read, Some(false));
    }

    #[test]
    fn test_reconcile_matches_newest_duplicate() {
        let now = Utc::now();
        let candidates = generate(&[product("1", 3, 5, None)], &[], now);

        let mut old = stored("old", candidates[0].clone(), now - Duration::hours(2));
        old.message = "texto viejo".to_string();
        let fresh = stored("new", candidates[0].clone(), now);

        let plan = reconcile(&[old, fresh], candidates);
        assert!(plan.is_empty());
    }

    /// Stored state after applying `plan`, with fresh ids for inserts.
    fn apply(alerts: &[Alert], plan: AlertPlan, now: DateTime<Utc>) -> Vec<Alert> {
        let mut out: Vec<Alert> = alerts
            .iter()
            .filter(|a| !plan.evictions.contains(&a.id))
            .cloned()
            .collect();
        for (id, patch) in &plan.refreshes {
            if let Some(alert) = out.iter_mut().find(|a| &a.id == id) {
                patch.apply(alert);
            }
        }
        for new in plan.inserts {
            out.push(stored(&crate::generate_id(), new, now));
        }
        out
    }

    fn out_of_stock(count: usize) -> Vec<Product> {
        (0..count)
            .map(|i| product(&format!("p{}", i), 0, 5, None))
            .collect()
    }

    #[test]
    fn test_more_conditions_than_cap_settle() {
        let now = Utc::now();
        let products = out_of_stock(MAX_STORED_ALERTS + 5);

        let first = reconcile(&[], generate(&products, &[], now));
        assert_eq!(first.inserts.len(), MAX_STORED_ALERTS);
        assert!(first.evictions.is_empty());
        let after_first = apply(&[], first, now);

        let second = reconcile(&after_first, generate(&products, &[], now));
        assert!(second.is_empty(), "{second:?}");
    }

    #[test]
    fn test_cap_evicts_stale_alerts_read_first() {
        let now = Utc::now();
        let template = low_stock_alert(&product("x", 0, 5, None)).unwrap();
        let old: Vec<Alert> = (0..MAX_STORED_ALERTS as i64)
            .map(|i| {
                let mut a = stored(&format!("a{}", i), template.clone(), now - Duration::minutes(i));
                a.related_id = Some(format!("gone{}", i));
                // a3 is among the newest, but it has been read.
                a.is_read = i == 3;
                a
            })
            .collect();

        let candidates = generate(&out_of_stock(2), &[], now);
        let plan = reconcile(&old, candidates);

        assert_eq!(plan.inserts.len(), 2);
        assert_eq!(plan.evictions, vec!["a3", "a49"]);
    }

    #[test]
    fn test_live_alerts_over_cap_evict_oldest() {
        let now = Utc::now();
        let products = out_of_stock(5);
        let live: Vec<Alert> = generate(&products, &[], now)
            .into_iter()
            .enumerate()
            .map(|(i, a)| stored(&format!("a{}", i), a, now - Duration::minutes(i as i64)))
            .collect();

        let plan = reconcile_within(&live, generate(&products, &[], now), 3);
        assert!(plan.inserts.is_empty());
        assert_eq!(plan.evictions, vec!["a4", "a3"]);

        let kept = apply(&live, plan, now);
        assert!(reconcile_within(&kept, generate(&products, &[], now), 3).is_empty());
    }

    proptest! {
        #[test]
        fn prop_low_stock_iff_at_or_below_min(stock in 0i64..500, min in 0i64..500) {
            let alert = low_stock_alert(&product("p", stock, min, None));
            prop_assert_eq!(alert.is_some(), stock <= min);
            if let Some(a) = alert {
                prop_assert_eq!(a.severity == AlertSeverity::High, stock == 0);
            }
        }

        #[test]
        fn prop_expiry_iff_within_week(offset_secs in -3 * 86_400i64..15 * 86_400) {
            let now = Utc::now();
            let p = product("p", 10, 0, Some(now + Duration::seconds(offset_secs)));
            let days = offset_secs.div_euclid(86_400);
            let alert = expiry_alert(&p, now);
            prop_assert_eq!(alert.is_some(), (0..=7).contains(&days));
            if let Some(a) = alert {
                prop_assert_eq!(a.severity == AlertSeverity::High, days <= 3);
            }
        }

        #[test]
        fn prop_high_debt_iff_eighty_percent(limit in 0i64..1_000_000, debt in 0i64..1_500_000) {
            let alert = high_debt_alert(&customer("c", limit, debt));
            prop_assert_eq!(alert.is_some(), debt * 5 >= limit * 4);
            if let Some(a) = alert {
                prop_assert_eq!(a.severity == AlertSeverity::High, debt >= limit);
            }
        }

        #[test]
        fn prop_second_run_is_noop(
            stocks in prop::collection::vec((0i64..30, 0i64..30), 0..120),
            debts in prop::collection::vec((0i64..1000, 0i64..1200), 0..8),
        ) {
            let now = Utc::now();
            let products: Vec<Product> = stocks
                .iter()
                .enumerate()
                .map(|(i, (s, m))| product(&format!("p{}", i), *s, *m, None))
                .collect();
            let customers: Vec<Customer> = debts
                .iter()
                .enumerate()
                .map(|(i, (l, d))| customer(&format!("c{}", i), *l, *d))
                .collect();

            let first = reconcile(&[], generate(&products, &customers, now));
            let stored_alerts = apply(&[], first, now);
            prop_assert!(stored_alerts.len() <= MAX_STORED_ALERTS);

            let second = reconcile(&stored_alerts, generate(&products, &customers, now));
            prop_assert!(second.is_empty());
        }
    }
}
