//! List filters for the inventory, customer and sales pages.
//!
//! Filters are applied in memory to a full snapshot. Text search is a
//! case-insensitive substring match; an empty search matches everything.

use serde::Deserialize;

use crate::types::{Customer, PaymentMethod, Product, Sale, SaleStatus};

fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

// =============================================================================
// Products
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductFilter {
    /// Matches name (case-insensitive) or barcode (substring).
    #[serde(default)]
    pub search: Option<String>,
    /// Exact category; `None` or `"all"` means every category.
    #[serde(default)]
    pub category: Option<String>,
    /// Only products at or below their minimum stock.
    #[serde(default)]
    pub low_stock_only: bool,
}

impl ProductFilter {
    pub fn matches(&self, product: &Product) -> bool {
        let search_ok = match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                contains_ci(&product.name, &term.to_lowercase())
                    || product.barcode.as_deref().is_some_and(|b| b.contains(term))
            }
        };
        let category_ok = match self.category.as_deref() {
            None | Some("all") => true,
            Some(category) => product.category == category,
        };
        search_ok && category_ok && (!self.low_stock_only || product.is_low_stock())
    }

    pub fn apply(&self, products: Vec<Product>) -> Vec<Product> {
        products.into_iter().filter(|p| self.matches(p)).collect()
    }
}

/// Distinct categories in first-seen order.
pub fn categories(products: &[Product]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for product in products {
        if !seen.iter().any(|c| c == &product.category) {
            seen.push(product.category.clone());
        }
    }
    seen
}

// =============================================================================
// Customers
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerFilter {
    /// Matches name, address (case-insensitive) or phone (substring).
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub with_debt_only: bool,
}

impl CustomerFilter {
    pub fn matches(&self, customer: &Customer) -> bool {
        let search_ok = match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                let lower = term.to_lowercase();
                contains_ci(&customer.name, &lower)
                    || customer.phone.as_deref().is_some_and(|p| p.contains(term))
                    || customer
                        .address
                        .as_deref()
                        .is_some_and(|a| contains_ci(a, &lower))
            }
        };
        search_ok && (!self.with_debt_only || customer.current_debt.is_positive())
    }

    pub fn apply(&self, customers: Vec<Customer>) -> Vec<Customer> {
        customers.into_iter().filter(|c| self.matches(c)).collect()
    }
}

// =============================================================================
// Sales
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SaleFilter {
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub status: Option<SaleStatus>,
    /// Matches customer name (case-insensitive) or sale id (substring).
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub customer_id: Option<String>,
}

impl SaleFilter {
    pub fn matches(&self, sale: &Sale) -> bool {
        let method_ok = self.payment_method.map_or(true, |m| sale.payment_method == m);
        let status_ok = self.status.map_or(true, |s| sale.status == s);
        let customer_ok = self
            .customer_id
            .as_deref()
            .map_or(true, |id| sale.customer_id.as_deref() == Some(id));
        let search_ok = match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                sale.id.contains(term)
                    || sale
                        .customer_name
                        .as_deref()
                        .is_some_and(|n| contains_ci(n, &term.to_lowercase()))
            }
        };
        method_ok && status_ok && customer_ok && search_ok
    }

    pub fn apply(&self, sales: Vec<Sale>) -> Vec<Sale> {
        sales.into_iter().filter(|s| self.matches(s)).collect()
    }
}
