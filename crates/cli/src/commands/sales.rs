use chrono::NaiveDate;

use pharmastock_auth::Permission;
use pharmastock_inventory::{DateRange, JournalEntry, MovementFilter, Period};
use pharmastock_sales::{summarize, Cart, KindFilter};

use super::App;
use crate::args::SaleCommand;
use crate::output::{emit, or_dash};

fn print_entry(e: &JournalEntry) {
    let m = &e.movement;
    println!(
        "{}  {:<8} {:<24} {:<10} {:>+6}  {:<20} {}",
        m.occurred_at.format("%Y-%m-%d %H:%M"),
        m.product_code,
        e.product_name,
        m.kind.as_str(),
        m.signed_quantity(),
        or_dash(m.username.as_deref()),
        or_dash(m.notes.as_deref())
    );
}

pub async fn sale(app: &App, command: SaleCommand) -> anyhow::Result<()> {
    match command {
        SaleCommand::Checkout { items } => {
            let seller = app.require(&Permission::SALES_CREATE).await?;
            let mut cart = Cart::new();
            for (id, quantity) in items {
                let product = app.store.get_product(id).await?;
                cart.add(&product, quantity)?;
            }
            let receipt = app.store.checkout(&cart, &seller).await?;
            emit(app.json, &receipt, |r| {
                println!("sale {} by {}", r.sale_id, r.seller);
                for line in &r.lines {
                    println!(
                        "  {:<8} {:<30} {:>4} x {}",
                        line.code, line.name, line.quantity, line.unit_price
                    );
                }
                println!("total {}", r.total);
            })
        }

        SaleCommand::Products { search } => {
            app.require(&Permission::PRODUCTS_READ).await?;
            let products = app.store.sellable_products(search.as_deref()).await?;
            emit(app.json, &products, |list| {
                for p in list {
                    println!("{:>4}  {:<8} {:<30} {:>9} {:>6}", p.id, p.code, p.name, p.price.to_string(), p.stock);
                }
            })
        }
    }
}

pub async fn journal(app: &App, search: Option<&str>, period: Option<Period>) -> anyhow::Result<()> {
    app.require(&Permission::MOVEMENTS_READ).await?;
    let filter = match (period, search) {
        (Some(period), _) => MovementFilter::period(period, app.today())?,
        (None, Some(search)) => MovementFilter::parse(search)?,
        (None, None) => MovementFilter::all(),
    };
    let entries = app.store.journal(&filter).await?;
    emit(app.json, &entries, |list| list.iter().for_each(print_entry))
}

pub async fn stats(app: &App, from: NaiveDate, to: NaiveDate, kind: KindFilter) -> anyhow::Result<()> {
    app.require(&Permission::REPORTS_READ).await?;
    let filter = MovementFilter {
        range: Some(DateRange::inclusive(from, to)?),
        text: None,
    };
    let entries = app.store.journal(&filter).await?;
    let summary = summarize(&entries, kind, app.today());
    emit(app.json, &summary, |s| {
        println!("movements:      {}", s.total_movements);
        println!("units:          {}", s.total_units);
        match &s.top_product {
            Some(top) => println!("top product:    {} ({} units)", top.name, top.units),
            None => println!("top product:    -"),
        }
        println!("average value:  {}", s.average_value);
        println!("today:          {}", s.movements_today);
        println!("trend:          {}", s.trend);
        if !s.least_popular.is_empty() {
            println!("least popular:");
            for p in &s.least_popular {
                println!("  {:<30} {}", p.name, p.units);
            }
        }
    })
}

pub async fn audit(app: &App) -> anyhow::Result<()> {
    app.require(&Permission::AUDIT_READ).await?;
    let found = app.store.audit().await?;
    if !found.is_empty() {
        tracing::warn!(discrepancies = found.len(), "stock audit found discrepancies");
    }
    emit(app.json, &found, |list| {
        if list.is_empty() {
            println!("stock is consistent");
        }
        for d in list {
            println!("{d}");
        }
    })
}
