// src/commands/report.rs
//! Report commands

use super::Context;
use super::sale::print_summaries;
use crate::cli::PeriodArgs;
use anyhow::Result;
use chrono::Local;
use supercash::Money;

/// Widest bar drawn by the trend report
const TREND_WIDTH: i64 = 40;

pub fn cmd_report_sales(ctx: &Context, period: &PeriodArgs) -> Result<()> {
    let period = period.resolve()?;
    let store = ctx.open_store()?;
    let rows = store.sales_report(&period)?;
    if rows.is_empty() {
        println!("No sales from {}", period);
        return Ok(());
    }

    println!("Sales report, {}:", period);
    for row in &rows {
        println!(
            "  [{}] {}  {:<24} {:>12} -{:>10} = {:>12}  {}",
            row.sale_id,
            row.sale_date.format("%d/%m/%Y %H:%M"),
            row.customer_name,
            row.total.to_string(),
            row.discount.to_string(),
            row.net.to_string(),
            row.payment_method
        );
        println!("        {}", row.products);
    }
    let net: Money = rows.iter().map(|r| r.net).sum();
    println!("{} sales, net {}", rows.len(), net);
    Ok(())
}

pub fn cmd_report_best_sellers(ctx: &Context, period: &PeriodArgs, limit: usize) -> Result<()> {
    let period = period.resolve()?;
    let store = ctx.open_store()?;
    let rows = store.best_sellers(&period, limit)?;
    if rows.is_empty() {
        println!("No products sold from {}", period);
        return Ok(());
    }

    println!("Best sellers, {}:", period);
    for (rank, row) in rows.iter().enumerate() {
        println!(
            "  {:>2}. {:<30} {:>5} units  revenue {:>12}  profit {:>12}",
            rank + 1,
            row.name,
            row.quantity,
            row.revenue.to_string(),
            row.profit.to_string()
        );
    }
    Ok(())
}

pub fn cmd_report_customers(ctx: &Context, period: &PeriodArgs, limit: usize) -> Result<()> {
    let period = period.resolve()?;
    let store = ctx.open_store()?;
    let rows = store.active_customers(&period, limit)?;
    if rows.is_empty() {
        println!("No identified customers bought anything from {}", period);
        return Ok(());
    }

    println!("Most active customers, {}:", period);
    for (rank, row) in rows.iter().enumerate() {
        println!(
            "  {:>2}. {:<30} {:>3} purchases  spent {:>12}  last {}",
            rank + 1,
            row.name,
            row.purchases,
            row.total_spent.to_string(),
            row.last_purchase.format("%d/%m/%Y")
        );
    }
    Ok(())
}

pub fn cmd_report_low_stock(ctx: &Context) -> Result<()> {
    super::cmd_product_low_stock(ctx)
}

pub fn cmd_report_profit(ctx: &Context, period: &PeriodArgs) -> Result<()> {
    let period = period.resolve()?;
    let store = ctx.open_store()?;
    let summary = store.profit_summary(&period)?;

    println!("Profit, {}:", period);
    println!("  Sales:          {}", summary.sale_count);
    println!("  Gross revenue:  {}", summary.gross_revenue);
    println!("  Discounts:      {}", summary.discounts);
    println!("  Net revenue:    {}", summary.net_revenue);
    println!("  Cost of goods:  {}", summary.cost_of_goods);
    println!("  Profit:         {}", summary.profit);
    println!("  Margin:         {:.1}%", summary.margin_percent());
    Ok(())
}

pub fn cmd_report_trend(ctx: &Context, period: &PeriodArgs) -> Result<()> {
    let period = period.resolve()?;
    let store = ctx.open_store()?;
    let days = store.daily_sales(&period)?;
    if days.is_empty() {
        println!("No sales from {}", period);
        return Ok(());
    }

    let peak = days.iter().map(|d| d.net.cents()).max().unwrap_or(0);
    println!("Daily sales, {}:", period);
    for day in &days {
        let width = if peak > 0 {
            day.net.cents().max(0) * TREND_WIDTH / peak
        } else {
            0
        };
        println!(
            "  {}  {:>3}  {:>12}  {}",
            day.date.format("%d/%m"),
            day.sale_count,
            day.net.to_string(),
            "#".repeat(width as usize)
        );
    }
    Ok(())
}

pub fn cmd_report_overview(ctx: &Context) -> Result<()> {
    let today = Local::now().date_naive();
    let store = ctx.open_store()?;
    let overview = store.overview(today)?;

    println!("Overview for {}:", today.format("%d/%m/%Y"));
    println!("  Sales today:        {}", overview.today_net);
    println!("  Sales this month:   {}", overview.month_net);
    println!("  Products in stock:  {}", overview.products_in_stock);
    println!("  Active customers:   {}", overview.active_customers);
    if overview.recent_sales.is_empty() {
        println!("No sales recorded yet");
    } else {
        println!("Latest sales:");
        print_summaries(&overview.recent_sales);
    }
    Ok(())
}
