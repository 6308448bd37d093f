// src/db/models/report.rs

//! Reporting queries over recorded sales
//!
//! All period filters compare the calendar date of `sale_date` against an
//! inclusive `[start, end]` range.

use super::{PaymentMethod, Sale, SaleSummary, parse_enum};
use crate::Money;
use crate::error::{Error, Result};
use chrono::{Datelike, Days, NaiveDate, NaiveDateTime};
use rusqlite::{Connection, params};
use std::fmt;

/// Default reporting window in days
pub const DEFAULT_PERIOD_DAYS: u64 = 30;

/// Number of sales listed on the overview
pub const RECENT_SALES: usize = 10;

/// Inclusive date range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Period {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(Error::InvalidInput(format!(
                "period start {start} is after end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// The `days` days up to and including `today`
    pub fn last_days(today: NaiveDate, days: u64) -> Self {
        let start = today.checked_sub_days(Days::new(days)).unwrap_or(today);
        Self { start, end: today }
    }

    pub fn single_day(day: NaiveDate) -> Self {
        Self {
            start: day,
            end: day,
        }
    }

    /// From the first of `today`'s month through `today`
    pub fn month_to_date(today: NaiveDate) -> Self {
        Self {
            start: today.with_day(1).unwrap_or(today),
            end: today,
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// One sale in the sales-by-period report
#[derive(Debug, Clone, PartialEq)]
pub struct SalesReportRow {
    pub sale_id: i64,
    pub sale_date: NaiveDateTime,
    /// `N/A` for anonymous sales
    pub customer_name: String,
    /// Product names, comma separated
    pub products: String,
    pub total: Money,
    pub discount: Money,
    pub net: Money,
    pub payment_method: PaymentMethod,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BestSeller {
    pub product_id: i64,
    pub name: String,
    pub quantity: i64,
    pub revenue: Money,
    /// Revenue minus current cost price times quantity
    pub profit: Money,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActiveCustomer {
    pub customer_id: i64,
    pub name: String,
    pub purchases: i64,
    /// Net of discounts
    pub total_spent: Money,
    pub last_purchase: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProfitSummary {
    pub sale_count: i64,
    pub gross_revenue: Money,
    pub discounts: Money,
    pub net_revenue: Money,
    pub cost_of_goods: Money,
    pub profit: Money,
}

impl ProfitSummary {
    /// Profit as a percentage of net revenue (0 when nothing was sold)
    pub fn margin_percent(&self) -> f64 {
        if self.net_revenue.cents() == 0 {
            return 0.0;
        }
        self.profit.cents() as f64 * 100.0 / self.net_revenue.cents() as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailySales {
    pub date: NaiveDate,
    pub sale_count: i64,
    pub net: Money,
}

/// Dashboard figures
#[derive(Debug, Clone, PartialEq)]
pub struct Overview {
    pub today_net: Money,
    /// Products with stock above zero
    pub products_in_stock: i64,
    /// Distinct customers with a sale this month
    pub active_customers: i64,
    pub month_net: Money,
    pub recent_sales: Vec<SaleSummary>,
}

/// Each sale in `period`, newest first
pub fn sales_report(conn: &Connection, period: &Period) -> Result<Vec<SalesReportRow>> {
    let mut stmt = conn.prepare(
        "SELECT s.id, s.sale_date, COALESCE(c.name, 'N/A'),
                COALESCE((SELECT GROUP_CONCAT(p.name, ', ')
                          FROM sale_items si JOIN products p ON si.product_id = p.id
                          WHERE si.sale_id = s.id), ''),
                s.total, s.discount, s.payment_method
         FROM sales s
         LEFT JOIN customers c ON s.customer_id = c.id
         WHERE DATE(s.sale_date) BETWEEN ?1 AND ?2
         ORDER BY s.sale_date DESC, s.id DESC",
    )?;

    let rows = stmt
        .query_map(params![period.start, period.end], |row| {
            let total: Money = row.get(4)?;
            let discount: Money = row.get(5)?;
            Ok(SalesReportRow {
                sale_id: row.get(0)?,
                sale_date: row.get(1)?,
                customer_name: row.get(2)?,
                products: row.get(3)?,
                total,
                discount,
                net: total - discount,
                payment_method: parse_enum(row, 6)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Products ranked by units sold in `period`
pub fn best_sellers(conn: &Connection, period: &Period, limit: usize) -> Result<Vec<BestSeller>> {
    let mut stmt = conn.prepare(
        "SELECT p.id, p.name, SUM(si.quantity), SUM(si.subtotal),
                SUM(si.subtotal) - SUM(si.quantity * p.cost_price)
         FROM sale_items si
         JOIN sales s ON si.sale_id = s.id
         JOIN products p ON si.product_id = p.id
         WHERE DATE(s.sale_date) BETWEEN ?1 AND ?2
         GROUP BY p.id, p.name
         ORDER BY SUM(si.quantity) DESC, SUM(si.subtotal) DESC, p.name
         LIMIT ?3",
    )?;

    let rows = stmt
        .query_map(params![period.start, period.end, limit as i64], |row| {
            Ok(BestSeller {
                product_id: row.get(0)?,
                name: row.get(1)?,
                quantity: row.get(2)?,
                revenue: row.get(3)?,
                profit: row.get(4)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Customers ranked by number of purchases in `period`
pub fn active_customers(
    conn: &Connection,
    period: &Period,
    limit: usize,
) -> Result<Vec<ActiveCustomer>> {
    let mut stmt = conn.prepare(
        "SELECT c.id, c.name, COUNT(s.id), SUM(s.total - s.discount), MAX(s.sale_date)
         FROM sales s
         JOIN customers c ON s.customer_id = c.id
         WHERE DATE(s.sale_date) BETWEEN ?1 AND ?2
         GROUP BY c.id, c.name
         ORDER BY COUNT(s.id) DESC, SUM(s.total - s.discount) DESC, c.name
         LIMIT ?3",
    )?;

    let rows = stmt
        .query_map(params![period.start, period.end, limit as i64], |row| {
            Ok(ActiveCustomer {
                customer_id: row.get(0)?,
                name: row.get(1)?,
                purchases: row.get(2)?,
                total_spent: row.get(3)?,
                last_purchase: row.get(4)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Revenue, discounts and cost of goods over `period`
pub fn profit_summary(conn: &Connection, period: &Period) -> Result<ProfitSummary> {
    let (sale_count, gross_revenue, discounts): (i64, Money, Money) = conn.query_row(
        "SELECT COUNT(*), COALESCE(SUM(total), 0), COALESCE(SUM(discount), 0)
         FROM sales
         WHERE DATE(sale_date) BETWEEN ?1 AND ?2",
        params![period.start, period.end],
        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
    )?;

    let cost_of_goods: Money = conn.query_row(
        "SELECT COALESCE(SUM(si.quantity * p.cost_price), 0)
         FROM sale_items si
         JOIN sales s ON si.sale_id = s.id
         JOIN products p ON si.product_id = p.id
         WHERE DATE(s.sale_date) BETWEEN ?1 AND ?2",
        params![period.start, period.end],
        |row| row.get(0),
    )?;

    let net_revenue = gross_revenue - discounts;
    Ok(ProfitSummary {
        sale_count,
        gross_revenue,
        discounts,
        net_revenue,
        cost_of_goods,
        profit: net_revenue - cost_of_goods,
    })
}

/// Per-day sale count and net total; days without sales are omitted
pub fn daily_sales(conn: &Connection, period: &Period) -> Result<Vec<DailySales>> {
    let mut stmt = conn.prepare(
        "SELECT DATE(sale_date), COUNT(*), SUM(total - discount)
         FROM sales
         WHERE DATE(sale_date) BETWEEN ?1 AND ?2
         GROUP BY DATE(sale_date)
         ORDER BY DATE(sale_date)",
    )?;

    let rows = stmt
        .query_map(params![period.start, period.end], |row| {
            Ok(DailySales {
                date: row.get(0)?,
                sale_count: row.get(1)?,
                net: row.get(2)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Dashboard figures as of `today`
pub fn overview(conn: &Connection, today: NaiveDate) -> Result<Overview> {
    let net_in = |period: Period| -> Result<Money> {
        Ok(conn.query_row(
            "SELECT COALESCE(SUM(total - discount), 0)
             FROM sales
             WHERE DATE(sale_date) BETWEEN ?1 AND ?2",
            params![period.start, period.end],
            |row| row.get(0),
        )?)
    };

    let month = Period::month_to_date(today);
    let today_net = net_in(Period::single_day(today))?;
    let month_net = net_in(month)?;

    let products_in_stock: i64 =
        conn.query_row("SELECT COUNT(*) FROM products WHERE stock > 0", [], |row| {
            row.get(0)
        })?;

    let active_customers: i64 = conn.query_row(
        "SELECT COUNT(DISTINCT customer_id)
         FROM sales
         WHERE customer_id IS NOT NULL AND DATE(sale_date) BETWEEN ?1 AND ?2",
        params![month.start, month.end],
        |row| row.get(0),
    )?;

    Ok(Overview {
        today_net,
        products_in_stock,
        active_customers,
        month_net,
        recent_sales: Sale::recent(conn, RECENT_SALES)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::db::models::{Customer, Product};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn record(
        conn: &mut Connection,
        d: u32,
        customer_id: Option<i64>,
        items: &[(i64, i64, i64)],
        discount: i64,
    ) {
        let mut sale = Sale::new(PaymentMethod::Cash);
        sale.sale_date = day(d).and_hms_opt(14, 0, 0).unwrap();
        sale.customer_id = customer_id;
        for &(product_id, qty, price) in items {
            sale.add_item(product_id, qty, Money::from_cents(price)).unwrap();
        }
        sale.apply_discount(Money::from_cents(discount)).unwrap();
        sale.save(conn).unwrap();
    }

    /// Two products, two customers, four sales across May 2024
    fn seeded() -> (Connection, i64, i64, i64, i64) {
        let mut conn = db::open_in_memory().unwrap();

        let mut food = Product::new("Ração".to_string(), Money::from_cents(1000));
        food.cost_price = Money::from_cents(600);
        food.stock = 100;
        let food_id = food.save(&conn).unwrap();

        let mut toy = Product::new("Bolinha".to_string(), Money::from_cents(500));
        toy.cost_price = Money::from_cents(200);
        toy.stock = 100;
        let toy_id = toy.save(&conn).unwrap();

        let ana = Customer::new("Ana".to_string()).save(&conn).unwrap();
        let bia = Customer::new("Bia".to_string()).save(&conn).unwrap();

        record(&mut conn, 2, Some(ana), &[(food_id, 2, 1000)], 0);
        record(&mut conn, 2, Some(ana), &[(toy_id, 1, 500)], 100);
        record(&mut conn, 10, Some(bia), &[(food_id, 1, 1000), (toy_id, 4, 500)], 0);
        record(&mut conn, 20, None, &[(toy_id, 1, 500)], 0);

        (conn, food_id, toy_id, ana, bia)
    }

    #[test]
    fn test_period_validation() {
        assert!(Period::new(day(2), day(1)).is_err());
        let p = Period::new(day(1), day(1)).unwrap();
        assert_eq!(p, Period::single_day(day(1)));

        let last = Period::last_days(day(31), DEFAULT_PERIOD_DAYS);
        assert_eq!(last.start, day(1));
        assert_eq!(last.end, day(31));

        assert_eq!(Period::month_to_date(day(17)).start, day(1));
        assert_eq!(p.to_string(), "2024-05-01 to 2024-05-01");
    }

    #[test]
    fn test_sales_report() {
        let (conn, ..) = seeded();
        let rows = sales_report(&conn, &Period::new(day(1), day(15)).unwrap()).unwrap();
        assert_eq!(rows.len(), 3);

        let newest = &rows[0];
        assert_eq!(newest.customer_name, "Bia");
        assert!(newest.products.contains("Ração"));
        assert!(newest.products.contains("Bolinha"));
        assert_eq!(newest.net, Money::from_cents(3000));

        let anonymous = sales_report(&conn, &Period::single_day(day(20))).unwrap();
        assert_eq!(anonymous[0].customer_name, "N/A");
    }

    #[test]
    fn test_best_sellers() {
        let (conn, food_id, toy_id, ..) = seeded();
        let top = best_sellers(&conn, &Period::new(day(1), day(31)).unwrap(), 10).unwrap();

        assert_eq!(top.len(), 2);
        assert_eq!(top[0].product_id, toy_id);
        assert_eq!(top[0].quantity, 6);
        assert_eq!(top[0].revenue, Money::from_cents(3000));
        assert_eq!(top[0].profit, Money::from_cents(1800));
        assert_eq!(top[1].product_id, food_id);
        assert_eq!(top[1].profit, Money::from_cents(1200));

        let one = best_sellers(&conn, &Period::new(day(1), day(31)).unwrap(), 1).unwrap();
        assert_eq!(one.len(), 1);
    }

    #[test]
    fn test_active_customers() {
        let (conn, _, _, ana, bia) = seeded();
        let ranked = active_customers(&conn, &Period::new(day(1), day(31)).unwrap(), 10).unwrap();

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].customer_id, ana);
        assert_eq!(ranked[0].purchases, 2);
        assert_eq!(ranked[0].total_spent, Money::from_cents(2400));
        assert_eq!(ranked[1].customer_id, bia);
        assert_eq!(ranked[1].last_purchase.date(), day(10));
    }

    #[test]
    fn test_profit_summary() {
        let (conn, ..) = seeded();
        let summary = profit_summary(&conn, &Period::new(day(1), day(31)).unwrap()).unwrap();

        assert_eq!(summary.sale_count, 4);
        assert_eq!(summary.gross_revenue, Money::from_cents(6000));
        assert_eq!(summary.discounts, Money::from_cents(100));
        assert_eq!(summary.net_revenue, Money::from_cents(5900));
        // 3 x 6.00 + 6 x 2.00
        assert_eq!(summary.cost_of_goods, Money::from_cents(3000));
        assert_eq!(summary.profit, Money::from_cents(2900));

        let empty = profit_summary(&conn, &Period::single_day(day(30))).unwrap();
        assert_eq!(empty, ProfitSummary::default());
        assert_eq!(empty.margin_percent(), 0.0);
    }

    #[test]
    fn test_daily_sales() {
        let (conn, ..) = seeded();
        let trend = daily_sales(&conn, &Period::new(day(1), day(31)).unwrap()).unwrap();

        assert_eq!(trend.len(), 3);
        assert_eq!(trend[0].date, day(2));
        assert_eq!(trend[0].sale_count, 2);
        assert_eq!(trend[0].net, Money::from_cents(2400));
    }

    #[test]
    fn test_overview() {
        let (conn, ..) = seeded();
        let view = overview(&conn, day(10)).unwrap();

        assert_eq!(view.today_net, Money::from_cents(3000));
        assert_eq!(view.month_net, Money::from_cents(5400));
        assert_eq!(view.active_customers, 2);
        assert_eq!(view.products_in_stock, 2);
        assert_eq!(view.recent_sales.len(), 4);
        assert_eq!(view.recent_sales[0].sale_date.date(), day(20));
    }
}
