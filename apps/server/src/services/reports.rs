//! Dashboard and daily figures, computed on demand from full table reads.

use chrono::{NaiveDate, Utc};

use nexo_core::report::{self, DailySummary, DashboardStats};
use nexo_core::Sale;
use nexo_store::{Ordering, Store};

use crate::error::ApiResult;

/// Sales shown on the dashboard's "recent" panel.
const RECENT_SALES: usize = 5;

pub async fn dashboard(store: &dyn Store) -> ApiResult<DashboardStats> {
    let sales = store.sales().all().await?;
    let products = store.products().all().await?;
    let customers = store.customers().all().await?;
    let alerts = store.alerts().all().await?;

    Ok(report::dashboard_stats(
        &sales,
        &products,
        &customers,
        &alerts,
        Utc::now(),
    ))
}

/// Summary for `date`, today (UTC) when absent.
pub async fn daily(store: &dyn Store, date: Option<NaiveDate>) -> ApiResult<DailySummary> {
    let date = date.unwrap_or_else(|| Utc::now().date_naive());
    let sales = store.sales().all().await?;
    let items = store.sale_items().all().await?;
    Ok(report::daily_summary(date, &sales, &items))
}

pub async fn recent(store: &dyn Store) -> ApiResult<Vec<Sale>> {
    let sales = store.sales().list(Ordering::desc("sale_date")).await?;
    Ok(report::recent_sales(sales, RECENT_SALES))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::seeded_state;
    use nexo_core::{Money, PaymentMethod};

    #[tokio::test]
    async fn test_dashboard_on_seed_data() {
        let state = seeded_state().await;
        let store = state.backend.system_store().unwrap();

        let stats = dashboard(store.as_ref()).await.unwrap();
        assert_eq!(stats.product_count, 3);
        assert_eq!(stats.customer_count, 2);
        assert_eq!(stats.customers_with_debt, 2);
        assert_eq!(stats.total_debt, Money::from_pesos(430_000));
        // Three Coca Cola sold today.
        assert_eq!(stats.today_transactions, 1);
        assert_eq!(stats.today_revenue, Money::from_pesos(7_470));
        assert!(stats.unread_alerts > 0);
    }

    #[tokio::test]
    async fn test_daily_defaults_to_today() {
        let state = seeded_state().await;
        let store = state.backend.system_store().unwrap();

        let today = daily(store.as_ref(), None).await.unwrap();
        assert_eq!(today.date, Utc::now().date_naive());
        assert_eq!(today.cash_sales, Money::from_pesos(7_470));
        assert_eq!(today.top_products.len(), 1);
        assert_eq!(today.top_products[0].product_name, "Coca Cola 2L");

        let empty = daily(store.as_ref(), NaiveDate::from_ymd_opt(2001, 1, 1))
            .await
            .unwrap();
        assert_eq!(empty.total_transactions, 0);
        assert!(empty.top_products.is_empty());
    }

    #[tokio::test]
    async fn test_recent_newest_first() {
        let state = seeded_state().await;
        let store = state.backend.system_store().unwrap();

        let sales = recent(store.as_ref()).await.unwrap();
        assert_eq!(sales.len(), 2);
        assert_eq!(sales[0].payment_method, PaymentMethod::Cash);
        assert_eq!(sales[1].payment_method, PaymentMethod::Credito);
    }
}
