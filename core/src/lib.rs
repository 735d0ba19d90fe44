// foodcart/src/lib.rs

//! Foodcart: client-side cart and order-session reconciliation for a REST
//! food-ordering backend.
//!
//!  - [`SessionStore`] persists the auth record and the current order id.
//!  - [`HttpOrderClient`] maps order operations onto the backend's routes.
//!  - [`CartReconciler`] creates or resumes the session's order, applies item
//!    changes followed by a full refetch, and drives confirm-then-pay checkout.
//!  - [`AccountService`] and [`CatalogClient`] cover the account and catalog
//!    screens.
//!
//! Typical wiring:
//!
//! ```no_run
//! use foodcart::{ApiTransport, CartReconciler, ClientConfig, FileStore, HttpOrderClient, ProductId, SessionStore};
//! use std::sync::Arc;
//!
//! # async fn demo() -> foodcart::CartResult<()> {
//! let config = ClientConfig::from_env()?;
//! let session = SessionStore::new(Arc::new(FileStore::new(config.session_file.clone())));
//! let transport = ApiTransport::new(config, session.clone())?;
//! let cart = CartReconciler::new(Arc::new(HttpOrderClient::new(transport)), session);
//!
//! cart.load().await?;
//! cart.add_to_cart(ProductId(7), 2).await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod flow;
pub mod models;
pub mod reconciler;
pub mod services;
pub mod session;

pub use crate::api::{ApiTransport, AuthApi, AuthClient, CatalogClient, HttpOrderClient, OrderApi};
pub use crate::config::ClientConfig;
pub use crate::error::{CartError, CartResult, ErrorKind, StorageError};
pub use crate::flow::{ContextData, Flow, FlowOutcome, FlowRun, StepControl};
pub use crate::models::{
  AuthRecord, Category, Order, OrderDetail, OrderId, OrderItem, OrderStatus, PaymentMethod, PaymentReceipt, Product,
  ProductId, Profile,
};
pub use crate::reconciler::{CartPhase, CartReconciler, CartView, CheckoutOutcome, LastError, MutationOutcome};
pub use crate::services::{AccountService, SignUpForm};
pub use crate::session::{FileStore, KeyValueStore, MemoryStore, SessionStore};
