//! Generic `Table<E>` over the hosted REST interface.
//!
//! ```text
//! list      GET    /rest/v1/{table}?select=*&order={col}.{dir}
//! get       GET    /rest/v1/{table}?select=*&id=eq.{id}
//! find_by   GET    /rest/v1/{table}?select=*&{col}=eq.{value}&order=...
//! create    POST   /rest/v1/{table}                 Prefer: return=representation
//! update    PATCH  /rest/v1/{table}?id=eq.{id}      Prefer: return=representation
//! delete    DELETE /rest/v1/{table}?id=eq.{id}      Prefer: return=representation
//! ```

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Method;
use url::Url;

use nexo_core::generate_id;

use crate::error::{StoreError, StoreResult};
use crate::remote::client::{RestClient, RETURN_REPRESENTATION};
use crate::table::{check_filter, Entity, Ordering, Table};

pub struct RemoteTable<E> {
    client: Arc<RestClient>,
    /// Session token of the caller; every request needs one.
    token: Option<String>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> RemoteTable<E> {
    pub fn new(client: Arc<RestClient>, token: Option<String>) -> Self {
        RemoteTable {
            client,
            token,
            _entity: PhantomData,
        }
    }

    fn token(&self) -> StoreResult<&str> {
        self.token.as_deref().ok_or(StoreError::Unauthorized)
    }

    fn url(&self, filters: &[(&str, String)], ordering: Option<&Ordering>) -> StoreResult<Url> {
        let mut url = self.client.rest_url(E::TABLE)?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("select", "*");
            for (column, value) in filters {
                query.append_pair(column, &format!("eq.{value}"));
            }
            if let Some(ordering) = ordering {
                query.append_pair(
                    "order",
                    &format!("{}.{}", ordering.column, ordering.direction.as_rest()),
                );
            }
        }
        Ok(url)
    }

    async fn fetch(&self, url: Url) -> StoreResult<Vec<E>> {
        let request = self.client.request(Method::GET, url, Some(self.token()?));
        self.client.send_json(request).await
    }

    /// Single written row echoed back by the hosted store.
    fn single(rows: Vec<E>, id: &str) -> StoreResult<E> {
        rows.into_iter()
            .next()
            .ok_or_else(|| StoreError::not_found(E::LABEL, id))
    }
}

#[async_trait]
impl<E: Entity> Table<E> for RemoteTable<E> {
    async fn list(&self, ordering: Ordering) -> StoreResult<Vec<E>> {
        ordering.check::<E>()?;
        let url = self.url(&[], Some(&ordering))?;
        self.fetch(url).await
    }

    async fn get(&self, id: &str) -> StoreResult<Option<E>> {
        let url = self.url(&[("id", id.to_string())], None)?;
        Ok(self.fetch(url).await?.into_iter().next())
    }

    async fn find_by(&self, column: &str, value: &str, ordering: Ordering) -> StoreResult<Vec<E>> {
        check_filter::<E>(column)?;
        ordering.check::<E>()?;
        let url = self.url(&[(column, value.to_string())], Some(&ordering))?;
        self.fetch(url).await
    }

    async fn create(&self, new: E::New) -> StoreResult<E> {
        let record = E::build(generate_id(), new, Utc::now());
        let url = self.client.rest_url(E::TABLE)?;
        let request = self
            .client
            .request(Method::POST, url, Some(self.token()?))
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&record);

        let rows: Vec<E> = self.client.send_json(request).await?;
        Self::single(rows, record.id())
    }

    /// Applies the patch to the current row and writes the whole row back.
    async fn update(&self, id: &str, patch: E::Patch) -> StoreResult<E> {
        let mut record = self
            .get(id)
            .await?
            .ok_or_else(|| StoreError::not_found(E::LABEL, id))?;
        record.apply(&patch, Utc::now());

        let url = self.url(&[("id", id.to_string())], None)?;
        let request = self
            .client
            .request(Method::PATCH, url, Some(self.token()?))
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&record);

        let rows: Vec<E> = self.client.send_json(request).await?;
        Self::single(rows, id)
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        let url = self.url(&[("id", id.to_string())], None)?;
        let request = self
            .client
            .request(Method::DELETE, url, Some(self.token()?))
            .header("Prefer", RETURN_REPRESENTATION);

        let rows: Vec<E> = self.client.send_json(request).await?;
        Self::single(rows, id).map(|_| ())
    }
}
