// tests/common/mod.rs
#![allow(dead_code)] // Not every test file uses every helper

use async_trait::async_trait;
use foodcart::api::{AuthApi, ChangePasswordRequest, OtpResetRequest, SignInRequest, SignUpRequest, TokenResetRequest};
use foodcart::models::{LoginResponse, OrderItem, ProductSnapshot};
use foodcart::{
  CartError, CartReconciler, CartResult, KeyValueStore, MemoryStore, Order, OrderApi, OrderDetail, OrderId,
  OrderStatus, PaymentMethod, PaymentReceipt, ProductId, Profile, SessionStore, StorageError,
};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::Level;

pub const PHO: ProductId = ProductId(7);
pub const BANH_MI: ProductId = ProductId(8);
pub const FIRST_ORDER: OrderId = OrderId(501);

// --- Tracing ---
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

pub fn price_of(product_id: ProductId) -> Decimal {
  match product_id.0 {
    7 => Decimal::new(45_000, 0),
    8 => Decimal::new(20_000, 0),
    _ => Decimal::new(10_000, 0),
  }
}

// --- Order API fake ---

/// One call as the reconciler issued it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
  CreateOrder,
  AddItem(OrderId, ProductId, u32),
  UpdateQuantity(OrderId, ProductId, u32),
  RemoveItem(OrderId, ProductId),
  Confirm(OrderId),
  Pay(OrderId, PaymentMethod),
  GetOrder(OrderId),
  GetHistory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
  CreateOrder,
  AddItem,
  UpdateQuantity,
  RemoveItem,
  Confirm,
  Pay,
  GetOrder,
  GetHistory,
}

/// A scripted failure, turned into a fresh `CartError` when it fires.
#[derive(Debug, Clone)]
pub enum Fault {
  Rejected(u16, &'static str),
  Timeout,
  MissingId,
}

impl Fault {
  fn into_error(self) -> CartError {
    match self {
      Fault::Rejected(status, message) => CartError::Rejected {
        status,
        message: Some(message.to_string()),
      },
      Fault::Timeout => CartError::Transport {
        message: "operation timed out".to_string(),
        timed_out: true,
      },
      Fault::MissingId => CartError::Contract("created order has no id".to_string()),
    }
  }
}

#[derive(Debug, Clone)]
struct FakeOrder {
  status: OrderStatus,
  lines: Vec<(ProductId, u32)>,
}

#[derive(Default)]
struct FakeState {
  next_id: i64,
  orders: HashMap<OrderId, FakeOrder>,
  calls: Vec<Call>,
  faults: HashMap<Op, VecDeque<Fault>>,
  get_delays: VecDeque<Duration>,
  call_delays: HashMap<Op, Duration>,
  redirect_url: Option<String>,
}

/// In-process stand-in for the order backend. Records every call in order
/// and keeps enough order state to answer refetches like the real server.
pub struct FakeOrderApi {
  state: Mutex<FakeState>,
}

impl FakeOrderApi {
  pub fn new() -> Self {
    Self {
      state: Mutex::new(FakeState {
        next_id: FIRST_ORDER.0,
        ..Default::default()
      }),
    }
  }

  /// Seeds an existing server-side order.
  pub fn with_order(self, order_id: OrderId, lines: &[(ProductId, u32)]) -> Self {
    {
      let mut state = self.state.lock();
      state.next_id = state.next_id.max(order_id.0 + 1);
      state.orders.insert(
        order_id,
        FakeOrder {
          status: OrderStatus::New,
          lines: lines.to_vec(),
        },
      );
    }
    self
  }

  pub fn set_status(&self, order_id: OrderId, status: OrderStatus) {
    if let Some(order) = self.state.lock().orders.get_mut(&order_id) {
      order.status = status;
    }
  }

  pub fn fail_next(&self, op: Op, fault: Fault) {
    self.state.lock().faults.entry(op).or_default().push_back(fault);
  }

  /// Holds the next `get_order` response for `delay` after its state was read.
  pub fn delay_next_get(&self, delay: Duration) {
    self.state.lock().get_delays.push_back(delay);
  }

  /// Every call of `op` sleeps for `delay` before answering.
  pub fn slow(&self, op: Op, delay: Duration) {
    self.state.lock().call_delays.insert(op, delay);
  }

  /// Pay responses carry this hosted-checkout URL.
  pub fn redirect_with(&self, url: &str) {
    self.state.lock().redirect_url = Some(url.to_string());
  }

  pub fn calls(&self) -> Vec<Call> {
    self.state.lock().calls.clone()
  }

  pub fn count(&self, op: Op) -> usize {
    self.calls().iter().filter(|call| op_of(call) == op).count()
  }

  pub fn clear_calls(&self) {
    self.state.lock().calls.clear();
  }

  pub fn quantity_on_server(&self, order_id: OrderId, product_id: ProductId) -> Option<u32> {
    let state = self.state.lock();
    let order = state.orders.get(&order_id)?;
    order.lines.iter().find(|(p, _)| *p == product_id).map(|(_, q)| *q)
  }

  pub fn status_on_server(&self, order_id: OrderId) -> Option<OrderStatus> {
    self.state.lock().orders.get(&order_id).map(|o| o.status)
  }

  // Records the call and pops a scripted fault for it.
  fn enter(&self, call: Call) -> (Option<Fault>, Option<Duration>) {
    let mut state = self.state.lock();
    let op = op_of(&call);
    state.calls.push(call);
    let fault = state.faults.get_mut(&op).and_then(VecDeque::pop_front);
    let delay = state.call_delays.get(&op).copied();
    (fault, delay)
  }

  async fn begin(&self, call: Call) -> CartResult<()> {
    let (fault, delay) = self.enter(call);
    if let Some(delay) = delay {
      tokio::time::sleep(delay).await;
    }
    match fault {
      Some(fault) => Err(fault.into_error()),
      None => Ok(()),
    }
  }

  fn with_order_mut<R>(&self, order_id: OrderId, f: impl FnOnce(&mut FakeOrder) -> CartResult<R>) -> CartResult<R> {
    let mut state = self.state.lock();
    match state.orders.get_mut(&order_id) {
      Some(order) => f(order),
      None => Err(not_found()),
    }
  }
}

impl Default for FakeOrderApi {
  fn default() -> Self {
    Self::new()
  }
}

fn not_editable(order: &FakeOrder) -> CartResult<()> {
  if order.status.is_mutable() {
    return Ok(());
  }
  Err(CartError::Rejected {
    status: 409,
    message: Some(format!("Order is {:?} and can no longer be changed", order.status)),
  })
}

fn not_found() -> CartError {
  CartError::Rejected {
    status: 404,
    message: Some("Order not found".to_string()),
  }
}

fn op_of(call: &Call) -> Op {
  match call {
    Call::CreateOrder => Op::CreateOrder,
    Call::AddItem(..) => Op::AddItem,
    Call::UpdateQuantity(..) => Op::UpdateQuantity,
    Call::RemoveItem(..) => Op::RemoveItem,
    Call::Confirm(_) => Op::Confirm,
    Call::Pay(..) => Op::Pay,
    Call::GetOrder(_) => Op::GetOrder,
    Call::GetHistory => Op::GetHistory,
  }
}

fn detail_of(order_id: OrderId, order: &FakeOrder) -> OrderDetail {
  let items: Vec<OrderItem> = order
    .lines
    .iter()
    .enumerate()
    .map(|(idx, (product_id, quantity))| OrderItem {
      id: idx as i64 + 1,
      quantity: *quantity,
      subtotal: price_of(*product_id) * Decimal::from(*quantity),
      product: ProductSnapshot {
        id: *product_id,
        name: format!("Product {}", product_id),
        price: price_of(*product_id),
        image_url: None,
      },
    })
    .collect();
  OrderDetail {
    order: Order {
      id: order_id,
      total_amount: items.iter().map(|i| i.subtotal).sum(),
      status: order.status,
      created_at: None,
    },
    items,
  }
}

#[async_trait]
impl OrderApi for FakeOrderApi {
  async fn create_order(&self) -> CartResult<OrderId> {
    self.begin(Call::CreateOrder).await?;
    let mut state = self.state.lock();
    let order_id = OrderId(state.next_id);
    state.next_id += 1;
    state.orders.insert(
      order_id,
      FakeOrder {
        status: OrderStatus::New,
        lines: Vec::new(),
      },
    );
    Ok(order_id)
  }

  async fn add_item(&self, order_id: OrderId, product_id: ProductId, quantity: u32) -> CartResult<()> {
    self.begin(Call::AddItem(order_id, product_id, quantity)).await?;
    self.with_order_mut(order_id, |order| {
      not_editable(order)?;
      match order.lines.iter_mut().find(|(p, _)| *p == product_id) {
        Some((_, q)) => *q += quantity,
        None => order.lines.push((product_id, quantity)),
      }
      Ok(())
    })
  }

  async fn update_quantity(&self, order_id: OrderId, product_id: ProductId, quantity: u32) -> CartResult<()> {
    self.begin(Call::UpdateQuantity(order_id, product_id, quantity)).await?;
    self.with_order_mut(order_id, |order| {
      not_editable(order)?;
      match order.lines.iter_mut().find(|(p, _)| *p == product_id) {
        Some((_, q)) => {
          *q = quantity;
          Ok(())
        }
        None => Err(CartError::Rejected {
          status: 400,
          message: Some("Item not found in order".to_string()),
        }),
      }
    })
  }

  async fn remove_item(&self, order_id: OrderId, product_id: ProductId) -> CartResult<()> {
    self.begin(Call::RemoveItem(order_id, product_id)).await?;
    self.with_order_mut(order_id, |order| {
      not_editable(order)?;
      order.lines.retain(|(p, _)| *p != product_id);
      Ok(())
    })
  }

  async fn confirm(&self, order_id: OrderId) -> CartResult<()> {
    self.begin(Call::Confirm(order_id)).await?;
    self.with_order_mut(order_id, |order| {
      not_editable(order)?;
      order.status = OrderStatus::Confirmed;
      Ok(())
    })
  }

  async fn pay(&self, order_id: OrderId, method: PaymentMethod) -> CartResult<PaymentReceipt> {
    self.begin(Call::Pay(order_id, method)).await?;
    let redirect_url = self.state.lock().redirect_url.clone();
    self.with_order_mut(order_id, |order| {
      if order.status != OrderStatus::Confirmed {
        return Err(CartError::Rejected {
          status: 409,
          message: Some("Order must be confirmed before payment".to_string()),
        });
      }
      if redirect_url.is_none() {
        order.status = OrderStatus::Paid;
      }
      Ok(PaymentReceipt {
        redirect_url: redirect_url.clone(),
      })
    })
  }

  async fn get_order(&self, order_id: OrderId) -> CartResult<OrderDetail> {
    self.begin(Call::GetOrder(order_id)).await?;
    let (detail, delay) = {
      let mut state = self.state.lock();
      let detail = state.orders.get(&order_id).map(|order| detail_of(order_id, order));
      (detail, state.get_delays.pop_front())
    };
    if let Some(delay) = delay {
      tokio::time::sleep(delay).await;
    }
    detail.ok_or_else(not_found)
  }

  async fn get_history(&self) -> CartResult<Vec<Order>> {
    self.begin(Call::GetHistory).await?;
    let state = self.state.lock();
    let mut orders: Vec<Order> = state
      .orders
      .iter()
      .map(|(id, order)| detail_of(*id, order).order)
      .collect();
    orders.sort_by_key(|o| std::cmp::Reverse(o.id));
    Ok(orders)
  }
}

// --- Storage fakes ---

/// Memory store whose reads and writes can be switched to fail.
#[derive(Default)]
pub struct FlakyStore {
  inner: MemoryStore,
  reads_fail: AtomicBool,
  writes_fail: AtomicBool,
}

impl FlakyStore {
  pub fn fail_reads(&self, on: bool) {
    self.reads_fail.store(on, Ordering::SeqCst);
  }

  pub fn fail_writes(&self, on: bool) {
    self.writes_fail.store(on, Ordering::SeqCst);
  }

  fn broken() -> StorageError {
    StorageError::Backend(anyhow::anyhow!("device storage unavailable"))
  }
}

impl KeyValueStore for FlakyStore {
  fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
    if self.reads_fail.load(Ordering::SeqCst) {
      return Err(Self::broken());
    }
    self.inner.get(key)
  }

  fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
    if self.writes_fail.load(Ordering::SeqCst) {
      return Err(Self::broken());
    }
    self.inner.set(key, value)
  }

  fn remove(&self, key: &str) -> Result<(), StorageError> {
    if self.writes_fail.load(Ordering::SeqCst) {
      return Err(Self::broken());
    }
    self.inner.remove(key)
  }
}

// --- Wiring ---

pub struct Harness {
  pub api: Arc<FakeOrderApi>,
  pub session: SessionStore,
  pub cart: Arc<CartReconciler>,
}

pub fn harness(api: FakeOrderApi) -> Harness {
  harness_with_session(api, SessionStore::in_memory())
}

pub fn harness_with_session(api: FakeOrderApi, session: SessionStore) -> Harness {
  setup_tracing();
  let api = Arc::new(api);
  let cart = Arc::new(CartReconciler::new(api.clone(), session.clone()));
  Harness { api, session, cart }
}

/// Persisted order 501 holding `lines`, loaded into the view.
pub async fn loaded_cart(lines: &[(ProductId, u32)]) -> Harness {
  let h = harness(FakeOrderApi::new().with_order(FIRST_ORDER, lines));
  h.session.set_current_order_id(FIRST_ORDER).unwrap();
  h.cart.load().await.unwrap();
  h.api.clear_calls();
  h
}

// --- Auth API fake ---

#[derive(Default)]
pub struct FakeAuthApi {
  pub calls: Mutex<Vec<String>>,
  pub login: Mutex<Option<LoginResponse>>,
  pub profile: Mutex<Profile>,
}

impl FakeAuthApi {
  pub fn accepting(token: &str, username: &str) -> Self {
    let fake = Self::default();
    *fake.login.lock() = Some(LoginResponse {
      token: Some(token.to_string()),
      username: Some(username.to_string()),
      id: Some(3),
      ..Default::default()
    });
    fake
  }

  pub fn calls(&self) -> Vec<String> {
    self.calls.lock().clone()
  }

  fn record(&self, call: impl Into<String>) {
    self.calls.lock().push(call.into());
  }
}

#[async_trait]
impl AuthApi for FakeAuthApi {
  async fn sign_in(&self, request: &SignInRequest) -> CartResult<LoginResponse> {
    self.record(format!("sign_in:{}", request.username));
    self.login.lock().clone().ok_or(CartError::Rejected {
      status: 401,
      message: Some("Bad credentials".to_string()),
    })
  }

  async fn register(&self, request: &SignUpRequest) -> CartResult<()> {
    self.record(format!("register:{}:{}", request.username, request.roles.join(",")));
    Ok(())
  }

  async fn get_me(&self) -> CartResult<Profile> {
    self.record("get_me");
    Ok(self.profile.lock().clone())
  }

  async fn update_me(&self, profile: &Profile) -> CartResult<()> {
    self.record("update_me");
    *self.profile.lock() = profile.clone();
    Ok(())
  }

  async fn send_otp(&self, email: &str) -> CartResult<()> {
    self.record(format!("send_otp:{}", email));
    Ok(())
  }

  async fn reset_password_otp(&self, request: &OtpResetRequest) -> CartResult<()> {
    self.record(format!("reset_password_otp:{}", request.email));
    Ok(())
  }

  async fn reset_password(&self, _request: &TokenResetRequest) -> CartResult<()> {
    self.record("reset_password");
    Ok(())
  }

  async fn change_password(&self, _request: &ChangePasswordRequest) -> CartResult<()> {
    self.record("change_password");
    Ok(())
  }
}
