use pharmastock_auth::Permission;
use pharmastock_inventory::Movement;
use pharmastock_products::{NewProduct, Product, ProductUpdate, RestoreCode};

use super::App;
use crate::args::ProductCommand;
use crate::output::{done, emit, or_dash};

fn print_product(p: &Product) {
    println!(
        "{:>4}  {:<8} {:<30} {:>9} {:>6}  expires {}  {}",
        p.id,
        p.code,
        p.name,
        p.price.to_string(),
        p.stock,
        p.expires_on,
        p.status()
    );
}

fn print_movement(m: &Movement) {
    println!(
        "{}  {:<10} {:>+6}  {:<20} {}",
        m.occurred_at.format("%Y-%m-%d %H:%M"),
        m.kind.as_str(),
        m.signed_quantity(),
        or_dash(m.username.as_deref()),
        or_dash(m.notes.as_deref())
    );
}

pub async fn run(app: &App, command: ProductCommand) -> anyhow::Result<()> {
    match command {
        ProductCommand::Add {
            code,
            name,
            image,
            price,
            stock,
            expires,
        } => {
            let actor = app.require(&Permission::PRODUCTS_WRITE).await?;
            let input = NewProduct {
                code,
                image_path: image,
                name,
                price,
                stock,
                expires_on: expires,
            };
            let product = app.store.create_product(input, &actor).await?;
            emit(app.json, &product, print_product)
        }

        ProductCommand::List {
            search,
            with_modifier: false,
        } => {
            app.require(&Permission::PRODUCTS_READ).await?;
            let products = app.store.list_products(search.as_deref()).await?;
            emit(app.json, &products, |list| list.iter().for_each(print_product))
        }

        ProductCommand::List {
            search,
            with_modifier: true,
        } => {
            app.require(&Permission::PRODUCTS_READ).await?;
            let rows = app.store.list_products_with_modifier(search.as_deref()).await?;
            emit(app.json, &rows, |list| {
                for row in list {
                    let p = &row.product;
                    println!(
                        "{:>4}  {:<8} {:<30} {:>9} {:>6}  modified by {}",
                        p.id,
                        p.code,
                        p.name,
                        p.price.to_string(),
                        p.stock,
                        row.modified_by_name
                    );
                }
            })
        }

        ProductCommand::Show { id } => {
            app.require(&Permission::PRODUCTS_READ).await?;
            let product = app.store.get_product(id).await?;
            emit(app.json, &product, print_product)
        }

        ProductCommand::Update {
            id,
            code,
            name,
            image,
            price,
            stock,
            expires,
        } => {
            let actor = app.require(&Permission::PRODUCTS_WRITE).await?;
            let current = app.store.get_product(id).await?;
            let update = ProductUpdate {
                code: code.unwrap_or(current.code),
                image_path: image.unwrap_or_default(),
                name: name.unwrap_or(current.name),
                price: price.unwrap_or(current.price),
                stock: stock.unwrap_or(current.stock),
                expires_on: expires.unwrap_or(current.expires_on),
            };
            let product = app.store.update_product(id, update, &actor).await?;
            emit(app.json, &product, print_product)
        }

        ProductCommand::Delete { id } => {
            let actor = app.require(&Permission::PRODUCTS_WRITE).await?;
            app.store.soft_delete_product(id, &actor).await?;
            done(app.json, &format!("product {id} deleted"))
        }

        ProductCommand::Deleted { search } => {
            app.require(&Permission::PRODUCTS_READ).await?;
            let deleted = app.store.list_deleted_products(search.as_deref()).await?;
            emit(app.json, &deleted, |list| {
                for d in list {
                    let p = &d.product;
                    println!(
                        "{:>4}  {:<8} {:<30} {:>6}  deleted {}",
                        p.id,
                        p.code,
                        p.name,
                        p.stock,
                        d.deleted_at.format("%Y-%m-%d %H:%M")
                    );
                }
            })
        }

        ProductCommand::Restore { id, code } => {
            let actor = app.require(&Permission::PRODUCTS_WRITE).await?;
            let code = match code.as_deref() {
                Some(code) => RestoreCode::replace(code)?,
                None => RestoreCode::keep(),
            };
            let product = app.store.restore_product(id, &code, &actor).await?;
            emit(app.json, &product, print_product)
        }

        ProductCommand::Purge { id } => {
            app.require(&Permission::PRODUCTS_WRITE).await?;
            app.store.purge_product(id).await?;
            done(app.json, &format!("deleted product {id} purged"))
        }

        ProductCommand::Adjust { id, delta, reason } => {
            let actor = app.require(&Permission::STOCK_ADJUST).await?;
            let product = app.store.adjust_stock(id, delta, &reason, &actor).await?;
            emit(app.json, &product, print_product)
        }

        ProductCommand::History { code } => {
            app.require(&Permission::MOVEMENTS_READ).await?;
            let history = app.store.product_history(&code).await?;
            emit(app.json, &history, |list| list.iter().for_each(print_movement))
        }

        ProductCommand::Report { search } => {
            app.require(&Permission::REPORTS_READ).await?;
            let report = app.store.product_report(search.as_deref()).await?;
            emit(app.json, &report, |r| {
                println!("products ({})", r.live.len());
                for row in &r.live {
                    println!(
                        "  {:<8} {:<30} {:>9} {:>6}  {}",
                        row.code,
                        row.name,
                        row.price.to_string(),
                        row.stock,
                        row.status
                    );
                }
                println!("deleted ({})", r.deleted.len());
                for d in &r.deleted {
                    println!("  {:<8} {:<30} {:>6}", d.product.code, d.product.name, d.product.stock);
                }
            })
        }
    }
}
