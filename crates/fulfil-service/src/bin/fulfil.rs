//! # Fulfil CLI
//!
//! Thin command-line front end over the services, for poking at a local
//! database (for example one filled by the `seed` binary).
//!
//! ## Usage
//! ```bash
//! export FULFIL_DATABASE_PATH=./fulfil_dev.db
//!
//! fulfil cart add <user-id> <product-id> 2
//! fulfil cart show <user-id>
//! fulfil checkout <user-id> "1 Main St" card
//! fulfil orders <user-id>
//! fulfil order <order-id> --as <user-id>
//! fulfil status <order-id> processing --as <admin-id> --admin
//! fulfil stock <product-id> +10 --as <admin-id> --admin
//! ```
//!
//! Results are printed as JSON. Failures print the `{ code, message }`
//! error to stderr and exit with status 1.

use std::env;
use std::process::ExitCode;

use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use fulfil_core::{OrderStatus, Principal, Role};
use fulfil_service::{FulfilService, ServiceConfig, ServiceError, ServiceResult};

const USAGE: &str = "\
Usage: fulfil <COMMAND> [ARGS] [--as <USER_ID>] [--admin]

Commands:
  cart add <USER> <PRODUCT> <QTY>     Set a cart line
  cart remove <USER> <PRODUCT>        Remove a cart line
  cart show <USER>                    List cart lines
  cart clear <USER>                   Empty the cart
  checkout <USER> <ADDRESS> <PAYMENT> Place an order from the cart
  orders <USER>                       List a user's orders
  order <ORDER>                       Show one order (needs --as)
  status <ORDER> <STATUS>             Change order status (needs --as, --admin)
  stock <PRODUCT> <+N|-N|N>           Adjust or set stock (needs --as, --admin)

Configuration comes from FULFIL_* environment variables.";

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let mut args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() || args.iter().any(|a| a == "--help" || a == "-h") {
        println!("{USAGE}");
        return ExitCode::SUCCESS;
    }

    let principal = take_principal(&mut args);

    let config = match ServiceConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let service = match FulfilService::connect(&config).await {
        Ok(service) => service,
        Err(e) => return report(&e),
    };

    debug!(?args, "Running command");
    let outcome = run(&service, &args, principal.as_ref()).await;
    service.close().await;

    match outcome {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => report(&e),
    }
}

async fn run(
    service: &FulfilService,
    args: &[String],
    principal: Option<&Principal>,
) -> ServiceResult<String> {
    let words: Vec<&str> = args.iter().map(String::as_str).collect();

    match words.as_slice() {
        ["cart", "add", user, product, qty] => {
            let qty = parse_quantity(qty)?;
            render(&service.carts.add_to_cart(user, product, qty).await?)
        }
        ["cart", "remove", user, product] => {
            render(&service.carts.remove_item(user, product).await?)
        }
        ["cart", "show", user] => render(&service.carts.get_cart(user).await?),
        ["cart", "clear", user] => render(&service.carts.clear_cart(user).await?),
        ["checkout", user, address, payment] => {
            render(&service.checkout.checkout(user, address, payment).await?)
        }
        ["orders", user] => {
            let owner = Principal::new(*user, Role::Buyer);
            render(&service.orders.list_orders(&owner).await?)
        }
        ["order", order_id] => {
            let principal = require_principal(principal)?;
            render(&service.orders.get_order(order_id, principal).await?)
        }
        ["status", order_id, status] => {
            let principal = require_principal(principal)?;
            let status: OrderStatus = status.parse()?;
            render(&service.status.update_status(order_id, status, principal).await?)
        }
        ["stock", product, amount] => {
            let principal = require_principal(principal)?;
            let stock = if let Some(delta) = amount.strip_prefix('+') {
                service
                    .inventory
                    .adjust_stock(product, parse_quantity(delta)?, principal)
                    .await?
            } else if let Some(delta) = amount.strip_prefix('-') {
                service
                    .inventory
                    .adjust_stock(product, -parse_quantity(delta)?, principal)
                    .await?
            } else {
                service
                    .inventory
                    .set_stock(product, parse_quantity(amount)?, principal)
                    .await?
            };
            render(&stock)
        }
        _ => Err(ServiceError::validation(format!(
            "Unrecognised command: {}",
            args.join(" ")
        ))),
    }
}

/// Pulls `--as <id>` and `--admin` out of the argument list.
fn take_principal(args: &mut Vec<String>) -> Option<Principal> {
    let admin = match args.iter().position(|a| a == "--admin") {
        Some(i) => {
            args.remove(i);
            true
        }
        None => false,
    };

    let i = args.iter().position(|a| a == "--as")?;
    if i + 1 >= args.len() {
        args.remove(i);
        return None;
    }
    let user_id = args.remove(i + 1);
    args.remove(i);

    Some(Principal::from_flag(user_id, admin))
}

fn require_principal(principal: Option<&Principal>) -> ServiceResult<&Principal> {
    principal.ok_or_else(|| ServiceError::validation("This command needs --as <USER_ID>"))
}

fn parse_quantity(raw: &str) -> ServiceResult<i64> {
    raw.parse()
        .map_err(|_| ServiceError::validation(format!("Not a whole number: {raw}")))
}

fn render<T: Serialize>(value: &T) -> ServiceResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| ServiceError::internal(format!("Could not render result: {e}")))
}

fn report(err: &ServiceError) -> ExitCode {
    match serde_json::to_string(err) {
        Ok(json) => eprintln!("{json}"),
        Err(_) => eprintln!("{err}"),
    }
    ExitCode::FAILURE
}
