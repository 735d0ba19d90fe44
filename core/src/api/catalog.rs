// foodcart/src/api/catalog.rs

use super::http::ApiTransport;
use crate::error::CartResult;
use crate::models::{Category, Product, ProductId};
use reqwest::{Method, RequestBuilder};
use tracing::instrument;

/// Read-only access to products and categories.
#[derive(Clone)]
pub struct CatalogClient {
  transport: ApiTransport,
}

impl CatalogClient {
  pub fn new(transport: ApiTransport) -> Self {
    Self { transport }
  }

  fn get(&self, suffix: &str) -> RequestBuilder {
    let path = format!("{}{}", self.transport.config().catalog_path, suffix);
    self.transport.request(Method::GET, &path)
  }

  fn search_request(&self, keyword: &str) -> RequestBuilder {
    self.get("/products/search").query(&[("keyword", keyword.trim())])
  }

  #[instrument(name = "CatalogClient::products", skip(self))]
  pub async fn products(&self) -> CartResult<Vec<Product>> {
    self.transport.send_json(self.get("/products")).await
  }

  #[instrument(name = "CatalogClient::product", skip(self))]
  pub async fn product(&self, id: ProductId) -> CartResult<Product> {
    self.transport.send_json(self.get(&format!("/products/{}", id))).await
  }

  #[instrument(name = "CatalogClient::search", skip(self))]
  pub async fn search(&self, keyword: &str) -> CartResult<Vec<Product>> {
    self.transport.send_json(self.search_request(keyword)).await
  }

  #[instrument(name = "CatalogClient::by_category", skip(self))]
  pub async fn by_category(&self, category_id: i64) -> CartResult<Vec<Product>> {
    self
      .transport
      .send_json(self.get(&format!("/products/category/{}", category_id)))
      .await
  }

  #[instrument(name = "CatalogClient::categories", skip(self))]
  pub async fn categories(&self) -> CartResult<Vec<Category>> {
    self.transport.send_json(self.get("/categories")).await
  }

  #[instrument(name = "CatalogClient::category", skip(self))]
  pub async fn category(&self, id: i64) -> CartResult<Category> {
    self.transport.send_json(self.get(&format!("/categories/{}", id))).await
  }
}
