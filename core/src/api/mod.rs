// foodcart/src/api/mod.rs

//! Typed clients for the REST backend.

pub mod auth;
pub mod catalog;
pub mod http;
pub mod orders;

pub use auth::{AuthApi, AuthClient, ChangePasswordRequest, OtpResetRequest, SignInRequest, SignUpRequest, TokenResetRequest};
pub use catalog::CatalogClient;
pub use http::ApiTransport;
pub use orders::{ensure_quantity, HttpOrderClient, OrderApi};
