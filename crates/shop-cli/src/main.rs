//! `shopctl`: command-line access to the dual-source storefront catalog

use anyhow::{Context, Result};
use chrono::{FixedOffset, Utc};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use serde::Serialize;
use shop_model::{
    source_info, Order, OrderStatus, ProductPatch, ProductQuery, RecordId, DEFAULT_PAGE_SIZE,
};
use shop_sources::{SourcesConfig, Storefront, DEFAULT_FEATURED_LIMIT, DEFAULT_RELATED_LIMIT};
use std::path::PathBuf;
use std::str::FromStr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Shop-local clock used by `stats` unless overridden
const DEFAULT_UTC_OFFSET_HOURS: i32 = 7;

fn id_arg() -> Arg {
    Arg::new("id")
        .required(true)
        .value_parser(RecordId::from_str)
        .help("Record id, e.g. 150 or ORD-00042")
}

fn cli() -> Command {
    Command::new("shopctl")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Inspect and edit the dual-source storefront catalog")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML config file; SHOP_API_URL overrides the live base URL"),
        )
        .arg(
            Arg::new("json-logs")
                .long("json-logs")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines"),
        )
        .subcommand(
            Command::new("products")
                .about("List merged products")
                .arg(Arg::new("q").long("q").help("Text to match in name or description"))
                .arg(Arg::new("category").long("category").help("Exact category"))
                .arg(
                    Arg::new("page")
                        .long("page")
                        .default_value("1")
                        .value_parser(value_parser!(usize)),
                )
                .arg(
                    Arg::new("limit")
                        .long("limit")
                        .value_parser(value_parser!(usize))
                        .help("Page size, or number of featured products (default 20, featured 8)"),
                )
                .arg(
                    Arg::new("featured")
                        .long("featured")
                        .action(ArgAction::SetTrue)
                        .help("Only featured products from the live source"),
                ),
        )
        .subcommand(
            Command::new("product")
                .about("Show one product and related products")
                .arg(id_arg()),
        )
        .subcommand(Command::new("orders").about("List merged orders, newest first"))
        .subcommand(Command::new("order").about("Show one order").arg(id_arg()))
        .subcommand(
            Command::new("set-status")
                .about("Change an order's status")
                .arg(id_arg())
                .arg(
                    Arg::new("status")
                        .required(true)
                        .value_parser(OrderStatus::from_str)
                        .help("pending, success, failed, completed, shipped or cancelled"),
                ),
        )
        .subcommand(
            Command::new("update-product")
                .about("Patch a product with a JSON object")
                .arg(id_arg())
                .arg(
                    Arg::new("patch")
                        .required(true)
                        .help(r#"e.g. '{"price": 990, "stock": 12}'"#),
                ),
        )
        .subcommand(Command::new("delete-product").about("Delete a product").arg(id_arg()))
        .subcommand(Command::new("delete-order").about("Delete an order").arg(id_arg()))
        .subcommand(
            Command::new("sync")
                .about("Copy a seed product into the live source")
                .arg(id_arg()),
        )
        .subcommand(
            Command::new("stats").about("Dashboard overview").arg(
                Arg::new("utc-offset")
                    .long("utc-offset")
                    .default_value("7")
                    .allow_hyphen_values(true)
                    .value_parser(value_parser!(i32).range(-12..=14))
                    .help("Hours east of UTC for today/this-week figures"),
            ),
        )
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn record_id(args: &ArgMatches) -> Result<RecordId> {
    args.try_get_one::<RecordId>("id")
        .ok()
        .flatten()
        .cloned()
        .context("missing id")
}

/// `--limit`, defaulting by listing kind
fn listing_limit(args: &ArgMatches) -> usize {
    let fallback = if args.get_flag("featured") {
        DEFAULT_FEATURED_LIMIT
    } else {
        DEFAULT_PAGE_SIZE
    };
    args.get_one::<usize>("limit").copied().unwrap_or(fallback)
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("json-logs"));

    let config = SourcesConfig::load(matches.get_one::<PathBuf>("config").map(PathBuf::as_path))
        .context("loading configuration")?;
    let shop = Storefront::connect(&config).context("configuring sources")?;

    match matches.subcommand() {
        Some(("products", args)) => {
            let limit = listing_limit(args);
            if args.get_flag("featured") {
                return print_json(&shop.products().featured(limit).await);
            }
            let mut query = ProductQuery::new()
                .with_page(args.get_one::<usize>("page").copied().unwrap_or(1), limit);
            if let Some(q) = args.get_one::<String>("q") {
                query = query.with_text(q);
            }
            if let Some(category) = args.get_one::<String>("category") {
                query = query.with_category(category);
            }
            print_json(&shop.products().list(&query).await)
        }
        Some(("product", args)) => {
            let id = record_id(args)?;
            let (product, related) = tokio::join!(
                shop.products().get_product(&id),
                shop.products().related(&id, DEFAULT_RELATED_LIMIT),
            );
            print_json(&serde_json::json!({
                "product": product?,
                "source": source_info(&id),
                "related": related,
            }))
        }
        Some(("orders", _)) => {
            let mut orders = shop.orders().list_orders().await;
            Order::newest_first(&mut orders);
            print_json(&orders)
        }
        Some(("order", args)) => {
            let id = record_id(args)?;
            print_json(&shop.orders().get_order(&id).await?)
        }
        Some(("set-status", args)) => {
            let id = record_id(args)?;
            let status = args
                .get_one::<OrderStatus>("status")
                .copied()
                .unwrap_or_default();
            let report = shop.orders().update_order_status(&id, status).await?;
            println!("{}", report.message);
            Ok(())
        }
        Some(("update-product", args)) => {
            let id = record_id(args)?;
            let raw = args.get_one::<String>("patch").map_or("{}", String::as_str);
            let patch: ProductPatch =
                serde_json::from_str(raw).context("patch must be a JSON object of product fields")?;
            anyhow::ensure!(!patch.is_empty(), "patch changes nothing");
            let report = shop.products().update_product(&id, &patch).await?;
            for failure in &report.failures {
                tracing::warn!(%failure, "Sources have diverged");
            }
            println!("{}", report.message);
            Ok(())
        }
        Some(("delete-product", args)) => {
            let report = shop.products().delete_product(&record_id(args)?).await?;
            println!("{}", report.message);
            Ok(())
        }
        Some(("delete-order", args)) => {
            let report = shop.orders().delete_order(&record_id(args)?).await?;
            println!("{}", report.message);
            Ok(())
        }
        Some(("sync", args)) => {
            let report = shop.products().sync_product(&record_id(args)?).await?;
            println!("{}", report.message);
            Ok(())
        }
        Some(("stats", args)) => {
            let hours = args
                .get_one::<i32>("utc-offset")
                .copied()
                .unwrap_or(DEFAULT_UTC_OFFSET_HOURS);
            let offset = FixedOffset::east_opt(hours * 3600)
                .context("UTC offset out of range")?;
            let now = Utc::now().with_timezone(&offset);
            print_json(&shop.dashboard(now).await)
        }
        _ => Ok(()),
    }
}
