use pharmastock_auth::Permission;
use pharmastock_inventory::{ExpiryWindow, LotDetails, NewLot};
use pharmastock_parties::{NewSupplier, Supplier, SupplierStatus};

use super::App;
use crate::args::{LotCommand, SupplierCommand};
use crate::output::{emit, or_dash};

fn print_supplier(s: &Supplier) {
    println!(
        "{:>4}  {:<30} {:<12} {:<28} {}",
        s.id,
        s.name,
        s.contact.phone,
        s.contact.email,
        s.status.as_str()
    );
}

fn print_lot(d: &LotDetails) {
    println!(
        "{:>4}  {:<12} {:<8} {:<24} {:>6}  expires {}  {}",
        d.lot.id,
        d.lot.code,
        d.product_code,
        d.product_name,
        d.lot.quantity,
        d.lot.expires_on,
        or_dash(d.supplier_name.as_deref())
    );
}

pub async fn supplier(app: &App, command: SupplierCommand) -> anyhow::Result<()> {
    match command {
        SupplierCommand::Add {
            name,
            phone,
            email,
            tax_id,
            contact,
            address,
        } => {
            app.require(&Permission::SUPPLIERS_WRITE).await?;
            let supplier = app
                .store
                .create_supplier(NewSupplier {
                    name,
                    tax_id,
                    contact_name: contact,
                    phone,
                    email,
                    address,
                })
                .await?;
            emit(app.json, &supplier, print_supplier)
        }

        SupplierCommand::List { all } => {
            app.require(&Permission::SUPPLIERS_READ).await?;
            let suppliers = app.store.list_suppliers(all).await?;
            emit(app.json, &suppliers, |list| list.iter().for_each(print_supplier))
        }

        SupplierCommand::Deactivate { id } => {
            app.require(&Permission::SUPPLIERS_WRITE).await?;
            let supplier = app.store.set_supplier_status(id, SupplierStatus::Inactive).await?;
            emit(app.json, &supplier, print_supplier)
        }

        SupplierCommand::Activate { id } => {
            app.require(&Permission::SUPPLIERS_WRITE).await?;
            let supplier = app.store.set_supplier_status(id, SupplierStatus::Active).await?;
            emit(app.json, &supplier, print_supplier)
        }
    }
}

pub async fn lot(app: &App, command: LotCommand) -> anyhow::Result<()> {
    match command {
        LotCommand::Add {
            product,
            code,
            quantity,
            expires,
            cost,
            supplier,
        } => {
            let actor = app.require(&Permission::LOTS_WRITE).await?;
            let input = NewLot {
                product_id: product,
                code,
                quantity,
                expires_on: expires,
                cost,
                supplier_id: supplier,
            };
            let lot = app.store.receive_lot(input, &actor).await?;
            emit(app.json, &lot, |l| {
                println!("lot {} received: {} units of product {}", l.code, l.quantity, l.product_id)
            })
        }

        LotCommand::List { product } => {
            app.require(&Permission::LOTS_READ).await?;
            let lots = app.store.list_lots(product).await?;
            emit(app.json, &lots, |list| list.iter().for_each(print_lot))
        }

        LotCommand::Expiring { days } => {
            app.require(&Permission::LOTS_READ).await?;
            let window = ExpiryWindow::new(days.unwrap_or(app.config.expiry_warning_days));
            let today = app.today();
            let lots = app.store.list_expiring_lots(today, window).await?;
            emit(app.json, &lots, |list| {
                for d in list {
                    let marker = if d.lot.is_expired(today) { "EXPIRED " } else { "" };
                    print!("{marker}");
                    print_lot(d);
                }
            })
        }
    }
}
