//! Demo data for an empty store.
//!
//! Written through the `Store` contract, so it seeds any backend. Alerts
//! are not seeded; the generator derives them from this data on startup.

use chrono::{Duration, Utc};
use tracing::info;

use nexo_core::{Money, NewCustomer, NewProduct, NewSale, NewSaleItem, PaymentMethod};

use crate::error::StoreResult;
use crate::table::Store;

fn products() -> Vec<NewProduct> {
    let now = Utc::now();
    vec![
        NewProduct {
            name: "Coca Cola 2L".to_string(),
            description: Some("Bebida gaseosa".to_string()),
            barcode: Some("7501055300013".to_string()),
            category: "Bebidas".to_string(),
            current_stock: 24,
            min_stock: 10,
            max_stock: 50,
            unit_price: Money::from_pesos(2_490),
            cost_price: Money::from_pesos(1_790),
            supplier: Some("Coca Cola Embonor".to_string()),
            expiry_date: None,
        },
        NewProduct {
            name: "Pan Blanco".to_string(),
            description: Some("Pan de molde blanco".to_string()),
            barcode: None,
            category: "Panadería".to_string(),
            current_stock: 8,
            min_stock: 15,
            max_stock: 30,
            unit_price: Money::from_pesos(1_990),
            cost_price: Money::from_pesos(1_400),
            supplier: Some("Ideal".to_string()),
            expiry_date: Some(now + Duration::days(5)),
        },
        NewProduct {
            name: "Leche Entera 1L".to_string(),
            description: Some("Leche entera pasteurizada".to_string()),
            barcode: None,
            category: "Lácteos".to_string(),
            current_stock: 15,
            min_stock: 12,
            max_stock: 40,
            unit_price: Money::from_pesos(1_190),
            cost_price: Money::from_pesos(890),
            supplier: Some("Colun".to_string()),
            expiry_date: Some(now + Duration::days(3)),
        },
    ]
}

fn customers() -> Vec<NewCustomer> {
    vec![
        NewCustomer {
            name: "María González".to_string(),
            phone: Some("5551234567".to_string()),
            email: None,
            address: Some("Calle Principal #123".to_string()),
            credit_limit: Money::from_pesos(500_000),
            current_debt: Money::from_pesos(150_000),
        },
        NewCustomer {
            name: "Juan Pérez".to_string(),
            phone: Some("5559876543".to_string()),
            email: None,
            address: Some("Avenida Central #456".to_string()),
            credit_limit: Money::from_pesos(300_000),
            current_debt: Money::from_pesos(280_000),
        },
    ]
}

/// Seeds products, customers and two past sales when the store has no
/// products. Returns whether anything was written.
pub async fn seed_if_empty(store: &dyn Store) -> StoreResult<bool> {
    if !store.products().all().await?.is_empty() {
        return Ok(false);
    }

    let mut products = Vec::new();
    for new in self::products() {
        products.push(store.products().create(new).await?);
    }
    let mut customers = Vec::new();
    for new in self::customers() {
        customers.push(store.customers().create(new).await?);
    }

    let now = Utc::now();
    let past_sales = [
        (&products[0], 3, PaymentMethod::Cash, None, now),
        (
            &products[1],
            6,
            PaymentMethod::Credito,
            Some(&customers[0]),
            now - Duration::days(1),
        ),
    ];
    for (product, quantity, method, customer, at) in past_sales {
        let subtotal = product.unit_price.multiply_quantity(quantity);
        let sale = store
            .sales()
            .create(NewSale {
                sale_date: at,
                total_amount: subtotal,
                payment_method: method,
                customer_id: customer.map(|c| c.id.clone()),
                customer_name: customer.map(|c| c.name.clone()),
                status: method.initial_status(),
                notes: None,
            })
            .await?;
        store
            .sale_items()
            .create(NewSaleItem {
                sale_id: sale.id,
                product_id: product.id.clone(),
                product_name: product.name.clone(),
                quantity,
                unit_price: product.unit_price,
                subtotal,
            })
            .await?;
    }

    info!(
        products = products.len(),
        customers = customers.len(),
        sales = past_sales.len(),
        "Seeded demo data"
    );
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local::LocalStore;
    use nexo_core::SaleStatus;

    #[tokio::test]
    async fn test_seed_only_when_empty() {
        let store = LocalStore::in_memory().await.unwrap();

        assert!(seed_if_empty(&store).await.unwrap());
        assert!(!seed_if_empty(&store).await.unwrap());

        assert_eq!(store.products().all().await.unwrap().len(), 3);
        assert_eq!(store.customers().all().await.unwrap().len(), 2);
        assert_eq!(store.sales().all().await.unwrap().len(), 2);
        assert_eq!(store.sale_items().all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_seeded_credit_sale_is_pending() {
        let store = LocalStore::in_memory().await.unwrap();
        seed_if_empty(&store).await.unwrap();

        let sales = store.sales().all().await.unwrap();
        let credit = sales
            .iter()
            .find(|s| s.payment_method == PaymentMethod::Credito)
            .unwrap();
        assert_eq!(credit.status, SaleStatus::Pending);
        assert_eq!(credit.customer_name.as_deref(), Some("María González"));
        assert_eq!(credit.total_amount, Money::from_pesos(11_940));
    }
}
