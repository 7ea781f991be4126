//! Column bindings for each entity table.

use nexo_core::{Alert, CreditPayment, Customer, Product, Sale, SaleItem, StockMovement, User};

use crate::local::table::{SqlRow, SqliteQuery};

impl SqlRow for Product {
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "description",
        "barcode",
        "category",
        "current_stock",
        "min_stock",
        "max_stock",
        "unit_price",
        "cost_price",
        "supplier",
        "expiry_date",
        "created_at",
        "updated_at",
    ];

    fn bind_columns<'q>(&self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query
            .bind(self.id.clone())
            .bind(self.name.clone())
            .bind(self.description.clone())
            .bind(self.barcode.clone())
            .bind(self.category.clone())
            .bind(self.current_stock)
            .bind(self.min_stock)
            .bind(self.max_stock)
            .bind(self.unit_price)
            .bind(self.cost_price)
            .bind(self.supplier.clone())
            .bind(self.expiry_date)
            .bind(self.created_at)
            .bind(self.updated_at)
    }
}

impl SqlRow for Customer {
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "phone",
        "email",
        "address",
        "credit_limit",
        "current_debt",
        "created_at",
        "updated_at",
    ];

    fn bind_columns<'q>(&self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query
            .bind(self.id.clone())
            .bind(self.name.clone())
            .bind(self.phone.clone())
            .bind(self.email.clone())
            .bind(self.address.clone())
            .bind(self.credit_limit)
            .bind(self.current_debt)
            .bind(self.created_at)
            .bind(self.updated_at)
    }
}

impl SqlRow for Sale {
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "sale_date",
        "total_amount",
        "payment_method",
        "customer_id",
        "customer_name",
        "status",
        "notes",
        "created_at",
    ];

    fn bind_columns<'q>(&self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query
            .bind(self.id.clone())
            .bind(self.sale_date)
            .bind(self.total_amount)
            .bind(self.payment_method)
            .bind(self.customer_id.clone())
            .bind(self.customer_name.clone())
            .bind(self.status)
            .bind(self.notes.clone())
            .bind(self.created_at)
    }
}

impl SqlRow for SaleItem {
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "sale_id",
        "product_id",
        "product_name",
        "quantity",
        "unit_price",
        "subtotal",
        "created_at",
    ];

    fn bind_columns<'q>(&self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query
            .bind(self.id.clone())
            .bind(self.sale_id.clone())
            .bind(self.product_id.clone())
            .bind(self.product_name.clone())
            .bind(self.quantity)
            .bind(self.unit_price)
            .bind(self.subtotal)
            .bind(self.created_at)
    }
}

impl SqlRow for Alert {
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "type",
        "severity",
        "message",
        "related_id",
        "is_read",
        "created_at",
    ];

    fn bind_columns<'q>(&self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query
            .bind(self.id.clone())
            .bind(self.alert_type)
            .bind(self.severity)
            .bind(self.message.clone())
            .bind(self.related_id.clone())
            .bind(self.is_read)
            .bind(self.created_at)
    }
}

impl SqlRow for User {
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "email",
        "full_name",
        "role",
        "is_active",
        "created_at",
        "updated_at",
    ];

    fn bind_columns<'q>(&self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query
            .bind(self.id.clone())
            .bind(self.email.clone())
            .bind(self.full_name.clone())
            .bind(self.role)
            .bind(self.is_active)
            .bind(self.created_at)
            .bind(self.updated_at)
    }
}

impl SqlRow for CreditPayment {
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "customer_id",
        "amount",
        "payment_date",
        "payment_method",
        "notes",
        "created_at",
    ];

    fn bind_columns<'q>(&self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query
            .bind(self.id.clone())
            .bind(self.customer_id.clone())
            .bind(self.amount)
            .bind(self.payment_date)
            .bind(self.payment_method)
            .bind(self.notes.clone())
            .bind(self.created_at)
    }
}

impl SqlRow for StockMovement {
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "product_id",
        "product_name",
        "movement_type",
        "quantity",
        "reason",
        "date",
        "user_id",
        "created_at",
    ];

    fn bind_columns<'q>(&self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query
            .bind(self.id.clone())
            .bind(self.product_id.clone())
            .bind(self.product_name.clone())
            .bind(self.movement_type)
            .bind(self.quantity)
            .bind(self.reason.clone())
            .bind(self.date)
            .bind(self.user_id.clone())
            .bind(self.created_at)
    }
}
