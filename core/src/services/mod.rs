// foodcart/src/services/mod.rs

pub mod account_service;

pub use account_service::{AccountService, SignUpForm};
