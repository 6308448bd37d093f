// src/cli/report.rs
//! Report commands

use super::PeriodArgs;
use clap::Subcommand;

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Every sale in a period
    Sales {
        #[command(flatten)]
        period: PeriodArgs,
    },

    /// Products ranked by units sold
    BestSellers {
        #[command(flatten)]
        period: PeriodArgs,

        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },

    /// Customers ranked by number of purchases
    Customers {
        #[command(flatten)]
        period: PeriodArgs,

        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },

    /// Products at or below minimum stock
    LowStock,

    /// Revenue, cost of goods and profit
    Profit {
        #[command(flatten)]
        period: PeriodArgs,
    },

    /// Sales per day
    Trend {
        #[command(flatten)]
        period: PeriodArgs,
    },

    /// Today's figures and the latest sales
    Overview,
}
