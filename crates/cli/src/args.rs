//! Command-line arguments.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use pharmastock_auth::Role;
use pharmastock_core::{Money, ProductId, SupplierId};
use pharmastock_inventory::Period;
use pharmastock_sales::KindFilter;

#[derive(Debug, Parser)]
#[command(name = "pharmastock")]
#[command(about = "Pharmacy inventory, sales and staff management")]
#[command(version)]
pub struct Cli {
    /// Database file (overrides PHARMASTOCK_DB)
    #[arg(long, global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// CI of the acting employee
    #[arg(long = "as", global = true, value_name = "CI")]
    pub acting_ci: Option<String>,

    /// Password of the acting employee
    #[arg(long, global = true, env = "PHARMASTOCK_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create the database, optionally seeding the first administrator
    Init(InitArgs),

    /// Check a CI and password and show the landing screen
    Login {
        #[arg(long)]
        ci: String,
    },

    #[command(subcommand)]
    Employee(EmployeeCommand),

    #[command(subcommand)]
    Product(ProductCommand),

    #[command(subcommand)]
    Supplier(SupplierCommand),

    #[command(subcommand)]
    Lot(LotCommand),

    #[command(subcommand)]
    Sale(SaleCommand),

    /// Movement journal, newest first
    Journal {
        /// Text, a date, a month (YYYY-MM), a year or a range "A a B"
        #[arg(long)]
        search: Option<String>,

        #[arg(long, conflicts_with = "search")]
        period: Option<Period>,
    },

    /// Movement statistics over an inclusive date range
    Stats {
        #[arg(long)]
        from: NaiveDate,

        #[arg(long)]
        to: NaiveDate,

        #[arg(long, default_value = "all")]
        kind: KindFilter,
    },

    /// Compare stock with lots and movements
    Audit,
}

/// Without admin flags, `init` only creates the database. A partial set is a
/// usage error.
#[derive(Debug, Args)]
pub struct InitArgs {
    #[arg(long, requires_all = ["admin_name", "admin_surname", "admin_phone", "admin_password"])]
    pub admin_ci: Option<String>,

    #[arg(long, requires = "admin_ci")]
    pub admin_name: Option<String>,

    #[arg(long, requires = "admin_ci")]
    pub admin_surname: Option<String>,

    #[arg(long, requires = "admin_ci")]
    pub admin_phone: Option<String>,

    #[arg(long, env = "PHARMASTOCK_ADMIN_PASSWORD", hide_env_values = true)]
    pub admin_password: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum EmployeeCommand {
    Add {
        #[arg(long)]
        ci: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        surname: String,
        #[arg(long)]
        phone: String,
        #[arg(long, default_value = "employee")]
        role: Role,
        /// Password for the new employee
        #[arg(long)]
        new_password: String,
        /// Repeat of the password (defaults to the password itself)
        #[arg(long)]
        confirm: Option<String>,
    },
    List {
        #[arg(long)]
        search: Option<String>,
    },
    Show {
        #[arg(long)]
        ci: String,
    },
    /// Change fields of an employee; omitted fields keep their value
    Update {
        #[arg(long)]
        ci: String,
        #[arg(long)]
        new_ci: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        surname: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        role: Option<Role>,
        #[arg(long)]
        new_password: Option<String>,
        #[arg(long, requires = "new_password")]
        confirm: Option<String>,
    },
    Delete {
        #[arg(long)]
        ci: String,
    },
    Deleted {
        #[arg(long)]
        search: Option<String>,
    },
    Restore {
        #[arg(long)]
        ci: String,
    },
    Purge {
        #[arg(long)]
        ci: String,
    },
    /// Administrators to contact for a password reset
    Admins,
    /// Active and deleted employees
    Report {
        #[arg(long)]
        search: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum ProductCommand {
    Add {
        #[arg(long)]
        code: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        image: String,
        #[arg(long)]
        price: Money,
        #[arg(long, default_value_t = 0)]
        stock: i64,
        #[arg(long)]
        expires: NaiveDate,
    },
    List {
        #[arg(long)]
        search: Option<String>,
        /// Include who last modified each product
        #[arg(long)]
        with_modifier: bool,
    },
    Show {
        #[arg(long)]
        id: ProductId,
    },
    /// Change fields of a product; omitted fields keep their value
    Update {
        #[arg(long)]
        id: ProductId,
        #[arg(long)]
        code: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        image: Option<String>,
        #[arg(long)]
        price: Option<Money>,
        #[arg(long)]
        stock: Option<i64>,
        #[arg(long)]
        expires: Option<NaiveDate>,
    },
    Delete {
        #[arg(long)]
        id: ProductId,
    },
    Deleted {
        #[arg(long)]
        search: Option<String>,
    },
    Restore {
        #[arg(long)]
        id: ProductId,
        /// Replacement code when the original one is taken
        #[arg(long)]
        code: Option<String>,
    },
    Purge {
        #[arg(long)]
        id: ProductId,
    },
    /// Change stock by a signed amount
    Adjust {
        #[arg(long)]
        id: ProductId,
        #[arg(long, allow_negative_numbers = true)]
        delta: i64,
        #[arg(long)]
        reason: String,
    },
    History {
        #[arg(long)]
        code: String,
    },
    /// Live and deleted products with availability
    Report {
        #[arg(long)]
        search: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum SupplierCommand {
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        tax_id: Option<String>,
        #[arg(long)]
        contact: Option<String>,
        #[arg(long)]
        address: Option<String>,
    },
    List {
        /// Include inactive suppliers
        #[arg(long)]
        all: bool,
    },
    Deactivate {
        #[arg(long)]
        id: SupplierId,
    },
    Activate {
        #[arg(long)]
        id: SupplierId,
    },
}

#[derive(Debug, Subcommand)]
pub enum LotCommand {
    /// Receive a lot into stock
    Add {
        #[arg(long)]
        product: ProductId,
        #[arg(long)]
        code: String,
        #[arg(long)]
        quantity: i64,
        #[arg(long)]
        expires: NaiveDate,
        #[arg(long)]
        cost: Money,
        #[arg(long)]
        supplier: Option<SupplierId>,
    },
    List {
        #[arg(long)]
        product: Option<ProductId>,
    },
    /// Lots expiring within the warning window (expired ones included)
    Expiring {
        #[arg(long)]
        days: Option<u32>,
    },
}

#[derive(Debug, Subcommand)]
pub enum SaleCommand {
    /// Sell the given items in one atomic sale
    Checkout {
        /// `<product-id>:<quantity>`, repeatable
        #[arg(long = "item", required = true, value_parser = parse_item)]
        items: Vec<(ProductId, i64)>,
    },
    /// Products with stock left
    Products {
        #[arg(long)]
        search: Option<String>,
    },
}

fn parse_item(input: &str) -> Result<(ProductId, i64), String> {
    let (id, quantity) = input
        .split_once(':')
        .ok_or_else(|| format!("expected <product-id>:<quantity>, got '{input}'"))?;
    let id = id.trim().parse::<ProductId>().map_err(|e| e.to_string())?;
    let quantity = quantity
        .trim()
        .parse::<i64>()
        .map_err(|e| format!("invalid quantity '{quantity}': {e}"))?;
    Ok((id, quantity))
}
