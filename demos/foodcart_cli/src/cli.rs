// foodcart_cli/src/cli.rs

use clap::{Parser, Subcommand};
use foodcart::{OrderId, PaymentMethod, ProductId};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "foodcart-cli", version, about = "Terminal client for the food-ordering backend")]
pub struct Cli {
  /// Overrides FOODCART_API_BASE_URL.
  #[arg(long, global = true)]
  pub base_url: Option<String>,

  /// Overrides FOODCART_SESSION_FILE.
  #[arg(long, global = true)]
  pub session_file: Option<PathBuf>,

  /// Emit logs as JSON lines.
  #[arg(long, global = true)]
  pub json_logs: bool,

  #[command(subcommand)]
  pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
  /// List products, optionally filtered.
  Products {
    #[arg(long, conflicts_with = "category")]
    search: Option<String>,
    #[arg(long)]
    category: Option<i64>,
  },
  Product {
    id: ProductId,
  },
  Categories,

  /// Load the current order and show it.
  Cart,
  Add {
    product: ProductId,
    #[arg(default_value_t = 1)]
    quantity: u32,
  },
  Inc {
    product: ProductId,
  },
  Dec {
    product: ProductId,
  },
  Set {
    product: ProductId,
    quantity: u32,
  },
  Remove {
    product: ProductId,
  },
  /// Confirm and pay the current order (CASH, MOMO, VNPAY or PAYOS).
  Checkout {
    method: PaymentMethod,
  },

  History,
  Order {
    id: OrderId,
  },

  Login {
    username: String,
    #[arg(long)]
    password: String,
  },
  Register {
    username: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    password: String,
    #[arg(long)]
    confirm_password: String,
  },
  Logout,
  Me,
  /// Update profile fields; omitted fields keep their current value.
  Profile {
    #[arg(long)]
    full_name: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    address: Option<String>,
  },
  ChangePassword {
    #[arg(long)]
    old: String,
    #[arg(long)]
    new: String,
    #[arg(long)]
    confirm: String,
  },
  /// Send a one-time reset code to an e-mail address.
  ForgotPassword {
    email: String,
  },
  ResetPasswordOtp {
    email: String,
    #[arg(long)]
    otp: String,
    #[arg(long)]
    new: String,
    #[arg(long)]
    confirm: String,
  },
  /// Reset through the token from a reset link.
  ResetPassword {
    token: String,
    #[arg(long)]
    new: String,
    #[arg(long)]
    confirm: String,
  },
}
