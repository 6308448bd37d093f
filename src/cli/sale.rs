// src/cli/sale.rs
//! Sale commands

use super::PeriodArgs;
use clap::Subcommand;
use std::str::FromStr;
use supercash::Money;
use supercash::db::models::PaymentMethod;

/// One cart line given as `BARCODE:QTY[@PRICE]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemSpec {
    pub barcode: String,
    pub quantity: i64,
    /// Overrides the catalog price
    pub price: Option<Money>,
}

impl FromStr for ItemSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (line, price) = match s.split_once('@') {
            Some((line, price)) => (line, Some(price.parse::<Money>()?)),
            None => (s, None),
        };
        let (barcode, quantity) = match line.rsplit_once(':') {
            Some((barcode, qty)) => {
                let qty = qty
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| format!("invalid quantity in '{s}'"))?;
                (barcode, qty)
            }
            None => (line, 1),
        };

        let barcode = barcode.trim();
        if barcode.is_empty() {
            return Err(format!("missing barcode in '{s}'"));
        }
        if quantity <= 0 {
            return Err(format!("quantity must be positive in '{s}'"));
        }
        Ok(Self {
            barcode: barcode.to_string(),
            quantity,
            price,
        })
    }
}

#[derive(Subcommand)]
pub enum SaleCommands {
    /// Record a sale (requires --user/--password)
    New {
        /// Cart line BARCODE:QTY[@PRICE]; repeat for more items
        #[arg(short, long = "item", value_name = "BARCODE:QTY[@PRICE]", required = true)]
        items: Vec<ItemSpec>,

        /// Customer CPF/CNPJ
        #[arg(short, long)]
        customer: Option<String>,

        /// Discount on the whole sale
        #[arg(long, value_name = "AMOUNT")]
        discount: Option<Money>,

        /// cash, credit_card, debit_card or pix
        #[arg(short, long, default_value = "cash")]
        payment: PaymentMethod,
    },

    /// Show a sale with its items
    Show {
        /// Sale ID
        id: i64,
    },

    /// List sales in a period
    List {
        #[command(flatten)]
        period: PeriodArgs,
    },

    /// Void a sale and return its items to stock (admin or owner)
    Void {
        /// Sale ID
        id: i64,
    },
}
