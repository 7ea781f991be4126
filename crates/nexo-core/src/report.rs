//! # Reports
//!
//! Dashboard figures computed from store snapshots. Calendar days and
//! months are taken in UTC.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::Serialize;
use ts_rs::TS;

use crate::money::Money;
use crate::types::{Alert, Customer, PaymentMethod, Product, Sale, SaleItem, SaleStatus};

/// Sales that count towards revenue.
fn counts(sale: &Sale) -> bool {
    sale.status != SaleStatus::Cancelled
}

// =============================================================================
// Dashboard
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct DashboardStats {
    pub today_revenue: Money,
    pub today_transactions: usize,
    pub month_revenue: Money,
    pub month_transactions: usize,
    pub product_count: usize,
    pub low_stock_count: usize,
    /// Σ(current_stock × cost_price)
    pub inventory_value: Money,
    pub customer_count: usize,
    pub customers_with_debt: usize,
    pub total_debt: Money,
    pub unread_alerts: usize,
}

pub fn dashboard_stats(
    sales: &[Sale],
    products: &[Product],
    customers: &[Customer],
    alerts: &[Alert],
    now: DateTime<Utc>,
) -> DashboardStats {
    let today = now.date_naive();
    let today_sales: Vec<&Sale> = sales
        .iter()
        .filter(|s| counts(s) && s.sale_date.date_naive() == today)
        .collect();
    let month_sales: Vec<&Sale> = sales
        .iter()
        .filter(|s| {
            counts(s) && s.sale_date.year() == now.year() && s.sale_date.month() == now.month()
        })
        .collect();

    DashboardStats {
        today_revenue: today_sales.iter().map(|s| s.total_amount).sum(),
        today_transactions: today_sales.len(),
        month_revenue: month_sales.iter().map(|s| s.total_amount).sum(),
        month_transactions: month_sales.len(),
        product_count: products.len(),
        low_stock_count: products.iter().filter(|p| p.is_low_stock()).count(),
        inventory_value: products.iter().map(Product::inventory_value).sum(),
        customer_count: customers.len(),
        customers_with_debt: customers
            .iter()
            .filter(|c| c.current_debt.is_positive())
            .count(),
        total_debt: customers.iter().map(|c| c.current_debt).sum(),
        unread_alerts: alerts.iter().filter(|a| !a.is_read).count(),
    }
}

// =============================================================================
// Daily Summary
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct TopProduct {
    pub product_name: String,
    pub quantity: i64,
    pub revenue: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct DailySummary {
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub total_sales: Money,
    pub total_transactions: usize,
    pub cash_sales: Money,
    pub card_sales: Money,
    pub transfer_sales: Money,
    pub credito_sales: Money,
    pub top_products: Vec<TopProduct>,
}

/// How many products `daily_summary` ranks.
pub const TOP_PRODUCTS: usize = 5;

/// Totals per payment method and best sellers for one day.
///
/// `items` may contain lines of other days; only lines belonging to the
/// day's sales are counted.
pub fn daily_summary(date: NaiveDate, sales: &[Sale], items: &[SaleItem]) -> DailySummary {
    let day: Vec<&Sale> = sales
        .iter()
        .filter(|s| counts(s) && s.sale_date.date_naive() == date)
        .collect();

    let by_method = |method: PaymentMethod| -> Money {
        day.iter()
            .filter(|s| s.payment_method == method)
            .map(|s| s.total_amount)
            .sum()
    };

    let mut ranking: HashMap<&str, TopProduct> = HashMap::new();
    for item in items
        .iter()
        .filter(|i| day.iter().any(|s| s.id == i.sale_id))
    {
        let entry = ranking
            .entry(item.product_id.as_str())
            .or_insert_with(|| TopProduct {
                product_name: item.product_name.clone(),
                quantity: 0,
                revenue: Money::zero(),
            });
        entry.quantity += item.quantity;
        entry.revenue += item.subtotal;
    }
    let mut top_products: Vec<TopProduct> = ranking.into_values().collect();
    top_products.sort_by(|a, b| {
        b.quantity
            .cmp(&a.quantity)
            .then_with(|| b.revenue.cmp(&a.revenue))
            .then_with(|| a.product_name.cmp(&b.product_name))
    });
    top_products.truncate(TOP_PRODUCTS);

    DailySummary {
        date,
        total_sales: day.iter().map(|s| s.total_amount).sum(),
        total_transactions: day.len(),
        cash_sales: by_method(PaymentMethod::Cash),
        card_sales: by_method(PaymentMethod::Card),
        transfer_sales: by_method(PaymentMethod::Transfer),
        credito_sales: by_method(PaymentMethod::Credito),
        top_products,
    }
}

/// The `limit` most recent sales.
pub fn recent_sales(mut sales: Vec<Sale>, limit: usize) -> Vec<Sale> {
    sales.sort_by(|a, b| b.sale_date.cmp(&a.sale_date));
    sales.truncate(limit);
    sales
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NewSale, NewSaleItem};
    use chrono::{Duration, TimeZone};

    fn sale(id: &str, amount: i64, method: PaymentMethod, at: DateTime<Utc>) -> Sale {
        Sale::from_new(
            id.to_string(),
            NewSale {
                sale_date: at,
                total_amount: Money::from_pesos(amount),
                payment_method: method,
                customer_id: None,
                customer_name: None,
                status: method.initial_status(),
                notes: None,
            },
            at,
        )
    }

    fn item(sale_id: &str, product: &str, qty: i64, price: i64) -> SaleItem {
        SaleItem::from_new(
            format!("{sale_id}-{product}"),
            NewSaleItem {
                sale_id: sale_id.to_string(),
                product_id: product.to_string(),
                product_name: product.to_uppercase(),
                quantity: qty,
                unit_price: Money::from_pesos(price),
                subtotal: Money::from_pesos(price * qty),
            },
            Utc::now(),
        )
    }

    #[test]
    fn test_dashboard_today_and_month() {
        let now = Utc.with_ymd_and_hms(2026, 3, 15, 15, 0, 0).unwrap();
        let sales = vec![
            sale("1", 105, PaymentMethod::Cash, now - Duration::hours(1)),
            sale("2", 150, PaymentMethod::Credito, now - Duration::days(1)),
            sale("3", 999, PaymentMethod::Card, now - Duration::days(40)),
        ];

        let stats = dashboard_stats(&sales, &[], &[], &[], now);
        assert_eq!(stats.today_revenue.pesos(), 105);
        assert_eq!(stats.today_transactions, 1);
        assert_eq!(stats.month_revenue.pesos(), 255);
        assert_eq!(stats.month_transactions, 2);
    }

    #[test]
    fn test_daily_summary_by_method_and_top_products() {
        let day = Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap();
        let sales = vec![
            sale("s1", 25, PaymentMethod::Cash, day),
            sale("s2", 30, PaymentMethod::Credito, day + Duration::hours(2)),
            sale("s3", 70, PaymentMethod::Card, day - Duration::days(1)),
        ];
        let items = vec![
            item("s1", "a", 2, 10),
            item("s1", "b", 1, 5),
            item("s2", "a", 3, 10),
            item("s3", "b", 14, 5),
        ];

        let summary = daily_summary(day.date_naive(), &sales, &items);
        assert_eq!(summary.total_sales.pesos(), 55);
        assert_eq!(summary.total_transactions, 2);
        assert_eq!(summary.cash_sales.pesos(), 25);
        assert_eq!(summary.credito_sales.pesos(), 30);
        assert_eq!(summary.card_sales, Money::zero());

        assert_eq!(summary.top_products[0].product_name, "A");
        assert_eq!(summary.top_products[0].quantity, 5);
        assert_eq!(summary.top_products[1].quantity, 1);
    }

    #[test]
    fn test_recent_sales_newest_first() {
        let now = Utc::now();
        let sales = (0..8)
            .map(|i| sale(&i.to_string(), 10, PaymentMethod::Cash, now - Duration::hours(i)))
            .collect();
        let recent = recent_sales(sales, 5);
        assert_eq!(recent.len(), 5);
        assert_eq!(recent[0].id, "0");
        assert_eq!(recent[4].id, "4");
    }
}
