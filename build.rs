// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Common arguments: reporting period
fn period_args(cmd: Command) -> Command {
    cmd.arg(Arg::new("from").long("from").value_name("DATE").help("First day (YYYY-MM-DD)"))
        .arg(
            Arg::new("to")
                .long("to")
                .value_name("DATE")
                .help("Last day (YYYY-MM-DD, default: today)"),
        )
        .arg(
            Arg::new("days")
                .long("days")
                .default_value("30")
                .help("Days before --to when --from is not given"),
        )
}

fn limit_arg() -> Arg {
    Arg::new("limit")
        .short('l')
        .long("limit")
        .default_value("10")
        .help("Maximum rows")
}

fn id_arg(what: &'static str) -> Arg {
    Arg::new("id").required(true).help(what)
}

fn customer_fields(cmd: Command) -> Command {
    cmd.arg(Arg::new("document").long("document").help("CPF or CNPJ"))
        .arg(Arg::new("email").long("email").help("Email address"))
        .arg(Arg::new("phone").long("phone").help("Phone number"))
        .arg(Arg::new("address").long("address").help("Street address"))
        .arg(Arg::new("pet_name").long("pet-name").help("Pet's name"))
        .arg(
            Arg::new("pet_birth")
                .long("pet-birth")
                .value_name("DATE")
                .help("Pet's birth date (YYYY-MM-DD)"),
        )
}

fn product_fields(cmd: Command) -> Command {
    cmd.arg(Arg::new("barcode").long("barcode").help("Barcode (unique)"))
        .arg(Arg::new("category").long("category").help("Category name"))
        .arg(Arg::new("cost").long("cost").value_name("AMOUNT").help("Cost price"))
        .arg(Arg::new("stock").long("stock").help("Units on hand"))
        .arg(Arg::new("min_stock").long("min-stock").help("Reorder threshold"))
        .arg(Arg::new("supplier").long("supplier").help("Supplier name"))
}

fn admin_password_arg() -> Arg {
    Arg::new("admin_password")
        .long("admin-password")
        .default_value("admin123")
        .help("Password for the admin account")
}

fn build_cli() -> Command {
    Command::new("supercash")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Supercash Contributors")
        .about("Point of sale and inventory for small pet shops")
        .subcommand_required(false)
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .global(true)
                .help("Configuration file (default: ./supercash.toml, then the user config dir)"),
        )
        .arg(
            Arg::new("db_path")
                .long("db-path")
                .value_name("PATH")
                .global(true)
                .help("SQLite database file (overrides the configuration)"),
        )
        .arg(
            Arg::new("user")
                .long("user")
                .env("SUPERCASH_USER")
                .global(true)
                .help("Username for commands that need a logged-in user"),
        )
        .arg(
            Arg::new("password")
                .long("password")
                .env("SUPERCASH_PASSWORD")
                .hide_env_values(true)
                .global(true)
                .help("Password for --user"),
        )
        .subcommand(
            Command::new("init")
                .about("Create the database (and the default admin account)")
                .arg(
                    Arg::new("no_admin")
                        .long("no-admin")
                        .action(ArgAction::SetTrue)
                        .help("Do not create the default admin account"),
                ),
        )
        .subcommand(Command::new("login").about("Verify credentials given with --user/--password"))
        .subcommand(
            Command::new("customer")
                .about("Customer records")
                .subcommand(customer_fields(
                    Command::new("add")
                        .about("Register a customer")
                        .arg(Arg::new("name").required(true).help("Full name")),
                ))
                .subcommand(customer_fields(
                    Command::new("update")
                        .about("Change a customer")
                        .arg(id_arg("Customer ID"))
                        .arg(Arg::new("name").long("name").help("Full name")),
                ))
                .subcommand(
                    Command::new("show")
                        .about("Show one customer")
                        .arg(Arg::new("id").help("Customer ID"))
                        .arg(Arg::new("document").long("document").help("Look up by CPF/CNPJ")),
                )
                .subcommand(Command::new("list").about("List customers"))
                .subcommand(
                    Command::new("search")
                        .about("Search by name or document")
                        .arg(Arg::new("query").required(true)),
                )
                .subcommand(
                    Command::new("history")
                        .about("Purchases made by a customer")
                        .arg(id_arg("Customer ID")),
                )
                .subcommand(
                    Command::new("delete")
                        .about("Delete a customer")
                        .arg(id_arg("Customer ID")),
                ),
        )
        .subcommand(
            Command::new("category")
                .about("Product categories")
                .subcommand(
                    Command::new("add")
                        .about("Create a category")
                        .arg(Arg::new("name").required(true)),
                )
                .subcommand(Command::new("list").about("List categories")),
        )
        .subcommand(
            Command::new("product")
                .about("Product inventory")
                .subcommand(product_fields(
                    Command::new("add")
                        .about("Add a product")
                        .arg(Arg::new("name").required(true))
                        .arg(
                            Arg::new("price")
                                .long("price")
                                .value_name("AMOUNT")
                                .required(true)
                                .help("Sale price"),
                        ),
                ))
                .subcommand(product_fields(
                    Command::new("update")
                        .about("Change a product")
                        .arg(id_arg("Product ID"))
                        .arg(Arg::new("name").long("name"))
                        .arg(Arg::new("price").long("price").value_name("AMOUNT")),
                ))
                .subcommand(
                    Command::new("show")
                        .about("Show one product")
                        .arg(Arg::new("id").help("Product ID"))
                        .arg(Arg::new("barcode").long("barcode").help("Look up by barcode")),
                )
                .subcommand(Command::new("list").about("List products"))
                .subcommand(
                    Command::new("search")
                        .about("Search by name, barcode or supplier")
                        .arg(Arg::new("query").required(true)),
                )
                .subcommand(
                    Command::new("stock")
                        .about("Add or remove units")
                        .arg(id_arg("Product ID"))
                        .arg(
                            Arg::new("delta")
                                .required(true)
                                .allow_negative_numbers(true)
                                .help("Units to add (negative to remove)"),
                        ),
                )
                .subcommand(Command::new("low-stock").about("Products at or below minimum stock"))
                .subcommand(
                    Command::new("delete")
                        .about("Delete a product that was never sold")
                        .arg(id_arg("Product ID")),
                ),
        )
        .subcommand(
            Command::new("user")
                .about("Staff accounts (admin or owner only)")
                .subcommand(
                    Command::new("add")
                        .about("Create an account")
                        .arg(Arg::new("username").required(true))
                        .arg(Arg::new("name").long("name").required(true).help("Display name"))
                        .arg(
                            Arg::new("new_password")
                                .long("new-password")
                                .required(true)
                                .help("Initial password"),
                        )
                        .arg(
                            Arg::new("level")
                                .long("level")
                                .default_value("user")
                                .help("admin, owner or user"),
                        ),
                )
                .subcommand(
                    Command::new("update")
                        .about("Change an account")
                        .arg(id_arg("User ID"))
                        .arg(Arg::new("username").long("username"))
                        .arg(Arg::new("name").long("name"))
                        .arg(Arg::new("new_password").long("new-password"))
                        .arg(Arg::new("level").long("level")),
                )
                .subcommand(Command::new("list").about("List accounts"))
                .subcommand(
                    Command::new("delete")
                        .about("Delete an account (not your own)")
                        .arg(id_arg("User ID")),
                ),
        )
        .subcommand(
            Command::new("sale")
                .about("Sales")
                .subcommand(
                    Command::new("new")
                        .about("Record a sale (requires --user/--password)")
                        .arg(
                            Arg::new("item")
                                .short('i')
                                .long("item")
                                .value_name("BARCODE:QTY[@PRICE]")
                                .action(ArgAction::Append)
                                .required(true)
                                .help("Cart line; repeat for more items"),
                        )
                        .arg(Arg::new("customer").short('c').long("customer").help("Customer CPF/CNPJ"))
                        .arg(Arg::new("discount").long("discount").value_name("AMOUNT"))
                        .arg(
                            Arg::new("payment")
                                .short('p')
                                .long("payment")
                                .default_value("cash")
                                .help("cash, credit_card, debit_card or pix"),
                        ),
                )
                .subcommand(
                    Command::new("show")
                        .about("Show a sale with its items")
                        .arg(id_arg("Sale ID")),
                )
                .subcommand(period_args(Command::new("list").about("List sales in a period")))
                .subcommand(
                    Command::new("void")
                        .about("Void a sale and return its items to stock (admin or owner)")
                        .arg(id_arg("Sale ID")),
                ),
        )
        .subcommand(
            Command::new("report")
                .about("Reports")
                .subcommand(period_args(Command::new("sales").about("Every sale in a period")))
                .subcommand(period_args(
                    Command::new("best-sellers")
                        .about("Products ranked by units sold")
                        .arg(limit_arg()),
                ))
                .subcommand(period_args(
                    Command::new("customers")
                        .about("Customers ranked by number of purchases")
                        .arg(limit_arg()),
                ))
                .subcommand(Command::new("low-stock").about("Products at or below minimum stock"))
                .subcommand(period_args(
                    Command::new("profit").about("Revenue, cost of goods and profit"),
                ))
                .subcommand(period_args(Command::new("trend").about("Sales per day")))
                .subcommand(Command::new("overview").about("Today's figures and the latest sales")),
        )
        .subcommand(
            Command::new("admin")
                .about("Built-in account maintenance")
                .subcommand(
                    Command::new("ensure")
                        .about("Create the admin account if it is missing")
                        .arg(admin_password_arg()),
                )
                .subcommand(
                    Command::new("ensure-owner")
                        .about("Create the owner account if it is missing")
                        .arg(
                            Arg::new("owner_password")
                                .long("owner-password")
                                .default_value("owner123")
                                .help("Password for the owner account"),
                        ),
                )
                .subcommand(
                    Command::new("reset")
                        .about("Delete and recreate the admin account")
                        .arg(admin_password_arg()),
                )
                .subcommand(
                    Command::new("check")
                        .about("Check that the admin password works")
                        .arg(admin_password_arg()),
                ),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=CARGO_MANIFEST_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = manifest_dir.join("man");

    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();
    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = man_dir.join("supercash.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}
