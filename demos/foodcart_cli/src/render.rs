// foodcart_cli/src/render.rs

//! Plain-text rendering of library values for the terminal.

use foodcart::models::UserIdentity;
use foodcart::{CartPhase, CartView, Category, CheckoutOutcome, Order, OrderDetail, Product, Profile};
use rust_decimal::Decimal;
use std::fmt::Write;

pub fn money(amount: Decimal) -> String {
  format!("{} VND", amount.round_dp(0))
}

fn phase_label(phase: &CartPhase) -> &'static str {
  match phase {
    CartPhase::NoActiveOrder => "no active order",
    CartPhase::Building => "open",
    CartPhase::Confirming => "confirming",
    CartPhase::Paying => "paying",
    CartPhase::AwaitingPayment { .. } => "awaiting payment",
    CartPhase::Settled => "paid",
    CartPhase::Error => "error",
  }
}

pub fn cart(view: &CartView) -> String {
  let mut out = String::new();
  match view.order_id() {
    Some(order_id) => {
      let _ = writeln!(out, "Order #{} ({})", order_id, phase_label(&view.phase));
    }
    None => {
      let _ = writeln!(out, "Cart is empty ({})", phase_label(&view.phase));
      return out;
    }
  }
  if view.is_empty() {
    let _ = writeln!(out, "  no items yet");
  }
  for item in &view.items {
    let _ = writeln!(
      out,
      "  [{}] {} x{} @ {} = {}",
      item.product.id,
      item.product.name,
      item.quantity,
      money(item.product.price),
      money(item.subtotal)
    );
  }
  if let Some(total) = view.total() {
    let _ = writeln!(out, "Total: {}", money(total));
  }
  if view.stale {
    let _ = writeln!(out, "(may be out of date; run `foodcart-cli cart` to reload)");
  }
  if let CartPhase::AwaitingPayment { redirect_url } = &view.phase {
    let _ = writeln!(out, "Finish paying at: {}", redirect_url);
  }
  out
}

pub fn checkout(outcome: &CheckoutOutcome) -> String {
  match outcome {
    CheckoutOutcome::Settled { order_id } => format!("Order #{} paid. A new cart will start with the next item.", order_id),
    CheckoutOutcome::AwaitingPayment { order_id, redirect_url } => format!(
      "Order #{} confirmed. Open this page to pay:\n{}\nRun `foodcart-cli cart` afterwards to see the result.",
      order_id, redirect_url
    ),
  }
}

pub fn products(products: &[Product]) -> String {
  if products.is_empty() {
    return "No products found.\n".to_string();
  }
  let mut out = String::new();
  for product in products {
    let availability = if product.is_available() { "" } else { " (unavailable)" };
    let _ = writeln!(
      out,
      "[{}] {} - {}{}",
      product.id,
      product.name,
      money(product.price),
      availability
    );
  }
  out
}

pub fn product(product: &Product) -> String {
  let mut out = products(std::slice::from_ref(product));
  if let Some(category) = &product.category {
    let _ = writeln!(out, "  category: {}", category.name);
  }
  if let Some(description) = product.description.as_deref().filter(|d| !d.trim().is_empty()) {
    let _ = writeln!(out, "  {}", description.trim());
  }
  out
}

pub fn categories(categories: &[Category]) -> String {
  categories.iter().fold(String::new(), |mut out, c| {
    let _ = writeln!(out, "[{}] {}", c.id, c.name);
    out
  })
}

pub fn history(orders: &[Order]) -> String {
  if orders.is_empty() {
    return "No orders yet.\n".to_string();
  }
  orders.iter().fold(String::new(), |mut out, order| {
    let placed = order
      .created_at
      .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
      .unwrap_or_else(|| "-".to_string());
    let _ = writeln!(
      out,
      "#{} {:?} {} {}",
      order.id,
      order.status,
      money(order.total_amount),
      placed
    );
    out
  })
}

pub fn order_detail(detail: &OrderDetail) -> String {
  let mut out = history(std::slice::from_ref(&detail.order));
  for item in &detail.items {
    let _ = writeln!(out, "  {} x{} = {}", item.product.name, item.quantity, money(item.subtotal));
  }
  out
}

pub fn identity(user: &UserIdentity) -> String {
  let name = user.username.as_deref().unwrap_or("unknown user");
  match &user.email {
    Some(email) => format!("{} <{}>", name, email),
    None => name.to_string(),
  }
}

pub fn profile(profile: &Profile) -> String {
  format!(
    "Name:    {}\nEmail:   {}\nPhone:   {}\nAddress: {}\n",
    profile.full_name, profile.email, profile.phone, profile.address
  )
}
