// foodcart_cli/src/commands.rs

//! One function per subcommand. Each is a single action boundary: it either
//! prints its result or returns the error for `main` to report.

use crate::cli::Command;
use crate::render;
use crate::state::AppState;
use foodcart::{CartResult, MutationOutcome, ProductId, Profile, SignUpForm};
use tracing::{debug, instrument};

#[instrument(name = "cli::dispatch", skip_all)]
pub async fn dispatch(state: &AppState, command: Command) -> CartResult<()> {
  match command {
    Command::Products { search, category } => {
      let products = match (search, category) {
        (Some(keyword), _) => state.catalog.search(&keyword).await?,
        (None, Some(category_id)) => state.catalog.by_category(category_id).await?,
        (None, None) => state.catalog.products().await?,
      };
      print!("{}", render::products(&products));
    }
    Command::Product { id } => print!("{}", render::product(&state.catalog.product(id).await?)),
    Command::Categories => print!("{}", render::categories(&state.catalog.categories().await?)),

    Command::Cart => print!("{}", render::cart(&state.cart.load().await?)),
    Command::Add { product, quantity } => {
      state.cart.load().await?;
      let order_id = state.cart.add_to_cart(product, quantity).await?;
      debug!(%order_id, "Item added.");
      print!("{}", render::cart(&state.cart.snapshot()));
    }
    Command::Inc { product } => mutate(state, product, Change::Increment).await?,
    Command::Dec { product } => mutate(state, product, Change::Decrement).await?,
    Command::Set { product, quantity } => mutate(state, product, Change::Set(quantity)).await?,
    Command::Remove { product } => mutate(state, product, Change::Remove).await?,
    Command::Checkout { method } => {
      state.cart.load().await?;
      let outcome = state.cart.checkout(method).await?;
      println!("{}", render::checkout(&outcome));
    }

    Command::History => print!("{}", render::history(&state.cart.history().await?)),
    Command::Order { id } => print!("{}", render::order_detail(&state.cart.order_detail(id).await?)),

    Command::Login { username, password } => {
      let record = state.accounts.sign_in(&username, &password).await?;
      println!("Signed in as {}.", render::identity(&record.user));
    }
    Command::Register {
      username,
      email,
      password,
      confirm_password,
    } => {
      state
        .accounts
        .sign_up(&SignUpForm {
          username,
          email,
          password,
          confirm_password,
        })
        .await?;
      println!("Account created. Sign in with `foodcart-cli login`.");
    }
    Command::Logout => {
      state.accounts.sign_out()?;
      println!("Signed out.");
    }
    Command::Me => {
      match state.accounts.current_user() {
        Some(record) => println!("Signed in as {}.", render::identity(&record.user)),
        None => println!("Not signed in."),
      }
      if state.session.token().is_some() {
        print!("{}", render::profile(&state.accounts.me().await?));
      }
    }
    Command::Profile {
      full_name,
      email,
      phone,
      address,
    } => {
      let current = state.accounts.me().await?;
      let updated = Profile {
        full_name: full_name.unwrap_or(current.full_name),
        email: email.unwrap_or(current.email),
        phone: phone.unwrap_or(current.phone),
        address: address.unwrap_or(current.address),
        image_url: current.image_url,
      };
      state.accounts.update_profile(&updated).await?;
      print!("{}", render::profile(&updated));
    }
    Command::ChangePassword { old, new, confirm } => {
      state.accounts.change_password(&old, &new, &confirm).await?;
      println!("Password changed.");
    }
    Command::ForgotPassword { email } => {
      state.accounts.send_otp(&email).await?;
      println!("A reset code was sent to {}.", email.trim());
    }
    Command::ResetPasswordOtp {
      email,
      otp,
      new,
      confirm,
    } => {
      state.accounts.reset_password_otp(&email, &otp, &new, &confirm).await?;
      println!("Password reset. Sign in with the new password.");
    }
    Command::ResetPassword { token, new, confirm } => {
      state.accounts.reset_password(&token, &new, &confirm).await?;
      println!("Password reset. Sign in with the new password.");
    }
  }
  Ok(())
}

enum Change {
  Increment,
  Decrement,
  Set(u32),
  Remove,
}

/// Item changes work on the loaded view, so the persisted order is fetched first.
async fn mutate(state: &AppState, product: ProductId, change: Change) -> CartResult<()> {
  state.cart.load().await?;
  let outcome = match change {
    Change::Increment => state.cart.increment(product).await?,
    Change::Decrement => state.cart.decrement(product).await?,
    Change::Set(quantity) => state.cart.set_quantity(product, quantity).await?,
    Change::Remove => state.cart.remove(product).await?,
  };
  match outcome {
    MutationOutcome::Applied => print!("{}", render::cart(&state.cart.snapshot())),
    MutationOutcome::Ignored => println!(
      "Quantity of product {} is already 1. Use `foodcart-cli remove {}` to drop it.",
      product, product
    ),
  }
  Ok(())
}
