// src/main.rs

mod cli;
mod commands;

use anyhow::{Context as _, Result};
use clap::Parser;
use cli::{
    AdminCommands, CategoryCommands, Cli, Commands, CustomerCommands, ProductCommands,
    ReportCommands, SaleCommands, UserCommands,
};
use commands::Context;
use std::fs::OpenOptions;
use std::sync::Mutex;
use supercash::config::LoggingSection;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Console logging, plus the configured log file when there is one
fn init_logging(logging: &LoggingSection) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&logging.level)
            .with_context(|| format!("invalid log level '{}'", logging.level))?,
    };
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    match &logging.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("cannot open log file {}", path.display()))?;
            builder
                .with_ansi(false)
                .with_writer(std::io::stderr.and(Mutex::new(file)))
                .init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let ctx = Context::load(cli.global)?;
    init_logging(&ctx.config.logging)?;
    match &ctx.config.source {
        Some(path) => debug!("Using config file {}", path.display()),
        None => debug!("No config file found, using defaults"),
    }

    match cli.command {
        Some(Commands::Init { no_admin }) => commands::cmd_init(&ctx, no_admin),
        Some(Commands::Login) => commands::cmd_login(&ctx),

        Some(Commands::Customer(cmd)) => match cmd {
            CustomerCommands::Add { name, fields } => {
                commands::cmd_customer_add(&ctx, &name, fields)
            }
            CustomerCommands::Update { id, name, fields } => {
                commands::cmd_customer_update(&ctx, id, name, fields)
            }
            CustomerCommands::Show { id, document } => {
                commands::cmd_customer_show(&ctx, id, document.as_deref())
            }
            CustomerCommands::List => commands::cmd_customer_list(&ctx),
            CustomerCommands::Search { query } => commands::cmd_customer_search(&ctx, &query),
            CustomerCommands::History { id } => commands::cmd_customer_history(&ctx, id),
            CustomerCommands::Delete { id } => commands::cmd_customer_delete(&ctx, id),
        },

        Some(Commands::Category(cmd)) => match cmd {
            CategoryCommands::Add { name } => commands::cmd_category_add(&ctx, &name),
            CategoryCommands::List => commands::cmd_category_list(&ctx),
        },

        Some(Commands::Product(cmd)) => match cmd {
            ProductCommands::Add {
                name,
                price,
                fields,
            } => commands::cmd_product_add(&ctx, &name, price, fields),
            ProductCommands::Update {
                id,
                name,
                price,
                fields,
            } => commands::cmd_product_update(&ctx, id, name, price, fields),
            ProductCommands::Show { id, barcode } => {
                commands::cmd_product_show(&ctx, id, barcode.as_deref())
            }
            ProductCommands::List => commands::cmd_product_list(&ctx),
            ProductCommands::Search { query } => commands::cmd_product_search(&ctx, &query),
            ProductCommands::Stock { id, delta } => commands::cmd_product_stock(&ctx, id, delta),
            ProductCommands::LowStock => commands::cmd_product_low_stock(&ctx),
            ProductCommands::Delete { id } => commands::cmd_product_delete(&ctx, id),
        },

        Some(Commands::User(cmd)) => match cmd {
            UserCommands::Add {
                username,
                name,
                new_password,
                level,
            } => commands::cmd_user_add(&ctx, &username, &name, &new_password, level),
            UserCommands::Update {
                id,
                username,
                name,
                new_password,
                level,
            } => commands::cmd_user_update(
                &ctx,
                id,
                username,
                name,
                new_password.as_deref(),
                level,
            ),
            UserCommands::List => commands::cmd_user_list(&ctx),
            UserCommands::Delete { id } => commands::cmd_user_delete(&ctx, id),
        },

        Some(Commands::Sale(cmd)) => match cmd {
            SaleCommands::New {
                items,
                customer,
                discount,
                payment,
            } => commands::cmd_sale_new(&ctx, items, customer.as_deref(), discount, payment),
            SaleCommands::Show { id } => commands::cmd_sale_show(&ctx, id),
            SaleCommands::List { period } => commands::cmd_sale_list(&ctx, &period),
            SaleCommands::Void { id } => commands::cmd_sale_void(&ctx, id),
        },

        Some(Commands::Report(cmd)) => match cmd {
            ReportCommands::Sales { period } => commands::cmd_report_sales(&ctx, &period),
            ReportCommands::BestSellers { period, limit } => {
                commands::cmd_report_best_sellers(&ctx, &period, limit)
            }
            ReportCommands::Customers { period, limit } => {
                commands::cmd_report_customers(&ctx, &period, limit)
            }
            ReportCommands::LowStock => commands::cmd_report_low_stock(&ctx),
            ReportCommands::Profit { period } => commands::cmd_report_profit(&ctx, &period),
            ReportCommands::Trend { period } => commands::cmd_report_trend(&ctx, &period),
            ReportCommands::Overview => commands::cmd_report_overview(&ctx),
        },

        Some(Commands::Admin(cmd)) => match cmd {
            AdminCommands::Ensure { admin_password } => {
                commands::cmd_admin_ensure(&ctx, &admin_password)
            }
            AdminCommands::EnsureOwner { owner_password } => {
                commands::cmd_admin_ensure_owner(&ctx, &owner_password)
            }
            AdminCommands::Reset { admin_password } => {
                commands::cmd_admin_reset(&ctx, &admin_password)
            }
            AdminCommands::Check { admin_password } => {
                commands::cmd_admin_check(&ctx, &admin_password)
            }
        },

        None => {
            println!("Supercash v{}", env!("CARGO_PKG_VERSION"));
            println!("Run 'supercash --help' for usage information");
            Ok(())
        }
    }
}
