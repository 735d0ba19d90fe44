// foodcart/src/api/orders.rs

//! The Order Client: typed calls against the order resource.
//!
//! This layer only shapes requests and decodes responses. It does not retry,
//! cache or apply business rules, apart from rejecting quantities below one
//! before a request is built.

use super::http::ApiTransport;
use crate::error::{CartError, CartResult};
use crate::models::order::CreatedOrder;
use crate::models::payment::PayRequest;
use crate::models::{Order, OrderDetail, OrderId, PaymentMethod, PaymentReceipt, ProductId};
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use serde::Serialize;
use tracing::{error, instrument};

/// Remote order operations used by the cart reconciler.
#[async_trait]
pub trait OrderApi: Send + Sync {
  /// Creates an empty order and returns its id. A response without an id is
  /// a [`CartError::Contract`] error.
  async fn create_order(&self) -> CartResult<OrderId>;

  /// Adds `quantity` of a product; the server merges with an existing line.
  async fn add_item(&self, order_id: OrderId, product_id: ProductId, quantity: u32) -> CartResult<()>;

  /// Sets the line quantity to an explicit value (not a delta).
  async fn update_quantity(&self, order_id: OrderId, product_id: ProductId, quantity: u32) -> CartResult<()>;

  async fn remove_item(&self, order_id: OrderId, product_id: ProductId) -> CartResult<()>;

  /// Moves the order out of the building state. Must precede `pay`.
  async fn confirm(&self, order_id: OrderId) -> CartResult<()>;

  async fn pay(&self, order_id: OrderId, method: PaymentMethod) -> CartResult<PaymentReceipt>;

  async fn get_order(&self, order_id: OrderId) -> CartResult<OrderDetail>;

  async fn get_history(&self) -> CartResult<Vec<Order>>;
}

/// Rejects quantities the backend must never see.
pub fn ensure_quantity(quantity: u32) -> CartResult<u32> {
  if quantity < 1 {
    return Err(CartError::InvalidQuantity(quantity));
  }
  Ok(quantity)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AddItemRequest {
  product_id: ProductId,
  quantity: u32,
}

#[derive(Clone)]
pub struct HttpOrderClient {
  transport: ApiTransport,
}

impl HttpOrderClient {
  pub fn new(transport: ApiTransport) -> Self {
    Self { transport }
  }

  fn path(&self, suffix: &str) -> String {
    format!("{}{}", self.transport.config().orders_path, suffix)
  }

  fn create_request(&self) -> RequestBuilder {
    self
      .transport
      .request(Method::POST, &self.path(""))
      .json(&serde_json::json!({}))
  }

  fn add_item_request(&self, order_id: OrderId, product_id: ProductId, quantity: u32) -> CartResult<RequestBuilder> {
    let quantity = ensure_quantity(quantity)?;
    Ok(
      self
        .transport
        .request(Method::POST, &self.path(&format!("/{}/items", order_id)))
        .json(&AddItemRequest { product_id, quantity }),
    )
  }

  fn update_quantity_request(
    &self,
    order_id: OrderId,
    product_id: ProductId,
    quantity: u32,
  ) -> CartResult<RequestBuilder> {
    let quantity = ensure_quantity(quantity)?;
    Ok(
      self
        .transport
        .request(Method::PUT, &self.path(&format!("/{}/items/{}", order_id, product_id)))
        .query(&[("quantity", quantity)]),
    )
  }

  fn remove_item_request(&self, order_id: OrderId, product_id: ProductId) -> RequestBuilder {
    self
      .transport
      .request(Method::DELETE, &self.path(&format!("/{}/items/{}", order_id, product_id)))
  }

  fn confirm_request(&self, order_id: OrderId) -> RequestBuilder {
    self
      .transport
      .request(Method::POST, &self.path(&format!("/{}/confirm", order_id)))
  }

  fn pay_request(&self, order_id: OrderId, method: PaymentMethod) -> RequestBuilder {
    self
      .transport
      .request(Method::POST, &self.path(&format!("/{}/pay", order_id)))
      .json(&PayRequest { payment_method: method })
  }

  fn get_order_request(&self, order_id: OrderId) -> RequestBuilder {
    self.transport.request(Method::GET, &self.path(&format!("/{}", order_id)))
  }

  fn history_request(&self) -> RequestBuilder {
    self.transport.request(Method::GET, &self.path(""))
  }
}

#[async_trait]
impl OrderApi for HttpOrderClient {
  #[instrument(name = "OrderApi::create_order", skip(self))]
  async fn create_order(&self) -> CartResult<OrderId> {
    let created: CreatedOrder = self.transport.send_json(self.create_request()).await?;
    created.id.ok_or_else(|| {
      error!("Create-order response did not contain an order id.");
      CartError::Contract("created order has no id".to_string())
    })
  }

  #[instrument(name = "OrderApi::add_item", skip(self))]
  async fn add_item(&self, order_id: OrderId, product_id: ProductId, quantity: u32) -> CartResult<()> {
    let request = self.add_item_request(order_id, product_id, quantity)?;
    self.transport.send_unit(request).await
  }

  #[instrument(name = "OrderApi::update_quantity", skip(self))]
  async fn update_quantity(&self, order_id: OrderId, product_id: ProductId, quantity: u32) -> CartResult<()> {
    let request = self.update_quantity_request(order_id, product_id, quantity)?;
    self.transport.send_unit(request).await
  }

  #[instrument(name = "OrderApi::remove_item", skip(self))]
  async fn remove_item(&self, order_id: OrderId, product_id: ProductId) -> CartResult<()> {
    self.transport.send_unit(self.remove_item_request(order_id, product_id)).await
  }

  #[instrument(name = "OrderApi::confirm", skip(self))]
  async fn confirm(&self, order_id: OrderId) -> CartResult<()> {
    self.transport.send_unit(self.confirm_request(order_id)).await
  }

  #[instrument(name = "OrderApi::pay", skip(self))]
  async fn pay(&self, order_id: OrderId, method: PaymentMethod) -> CartResult<PaymentReceipt> {
    let body = self.transport.send_bytes(self.pay_request(order_id, method)).await?;
    Ok(PaymentReceipt::from_body(&body))
  }

  #[instrument(name = "OrderApi::get_order", skip(self))]
  async fn get_order(&self, order_id: OrderId) -> CartResult<OrderDetail> {
    self.transport.send_json(self.get_order_request(order_id)).await
  }

  #[instrument(name = "OrderApi::get_history", skip(self))]
  async fn get_history(&self) -> CartResult<Vec<Order>> {
    self.transport.send_json(self.history_request()).await
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::ClientConfig;
  use crate::session::SessionStore;

  fn client() -> HttpOrderClient {
    let config = ClientConfig {
      base_url: "http://backend.test".to_string(),
      ..Default::default()
    };
    HttpOrderClient::new(ApiTransport::new(config, SessionStore::in_memory()).unwrap())
  }

  fn body_of(request: &reqwest::Request) -> serde_json::Value {
    let bytes = request.body().and_then(|b| b.as_bytes()).expect("request has a buffered body");
    serde_json::from_slice(bytes).unwrap()
  }

  #[test]
  fn create_posts_an_empty_object() {
    let request = client().create_request().build().unwrap();
    assert_eq!(request.method(), Method::POST);
    assert_eq!(request.url().path(), "/api/customer/orders");
    assert_eq!(body_of(&request), serde_json::json!({}));
  }

  #[test]
  fn add_item_sends_product_and_quantity() {
    let request = client()
      .add_item_request(OrderId(501), ProductId(7), 2)
      .unwrap()
      .build()
      .unwrap();
    assert_eq!(request.method(), Method::POST);
    assert_eq!(request.url().path(), "/api/customer/orders/501/items");
    assert_eq!(body_of(&request), serde_json::json!({ "productId": 7, "quantity": 2 }));
  }

  #[test]
  fn update_quantity_uses_query_parameter() {
    let request = client()
      .update_quantity_request(OrderId(501), ProductId(7), 3)
      .unwrap()
      .build()
      .unwrap();
    assert_eq!(request.method(), Method::PUT);
    assert_eq!(request.url().path(), "/api/customer/orders/501/items/7");
    assert_eq!(request.url().query(), Some("quantity=3"));
    assert!(request.body().is_none());
  }

  #[test]
  fn quantities_below_one_are_rejected_before_a_request_exists() {
    let c = client();
    assert!(matches!(
      c.update_quantity_request(OrderId(501), ProductId(7), 0),
      Err(CartError::InvalidQuantity(0))
    ));
    assert!(matches!(
      c.add_item_request(OrderId(501), ProductId(7), 0),
      Err(CartError::InvalidQuantity(0))
    ));
  }

  #[test]
  fn remaining_routes() {
    let c = client();
    let remove = c.remove_item_request(OrderId(501), ProductId(7)).build().unwrap();
    assert_eq!(remove.method(), Method::DELETE);
    assert_eq!(remove.url().path(), "/api/customer/orders/501/items/7");

    let confirm = c.confirm_request(OrderId(501)).build().unwrap();
    assert_eq!(confirm.method(), Method::POST);
    assert_eq!(confirm.url().path(), "/api/customer/orders/501/confirm");

    let pay = c.pay_request(OrderId(501), PaymentMethod::Cash).build().unwrap();
    assert_eq!(pay.url().path(), "/api/customer/orders/501/pay");
    assert_eq!(body_of(&pay), serde_json::json!({ "paymentMethod": "CASH" }));

    let get = c.get_order_request(OrderId(501)).build().unwrap();
    assert_eq!(get.method(), Method::GET);
    assert_eq!(get.url().path(), "/api/customer/orders/501");

    let history = c.history_request().build().unwrap();
    assert_eq!(history.method(), Method::GET);
    assert_eq!(history.url().path(), "/api/customer/orders");
  }
}
