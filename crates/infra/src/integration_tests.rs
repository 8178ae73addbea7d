//! Store tests against a real SQLite database.
//!
//! Most tests open a private in-memory database. File-backed tests check
//! that data survives reopening and that concurrent writers are serialized.

#[cfg(test)]
mod tests {
    use chrono::{Days, NaiveDate};

    use pharmastock_auth::{EmployeeUpdate, NewEmployee, Principal, Role};
    use pharmastock_core::time::local_today;
    use pharmastock_core::{DomainError, Money};
    use pharmastock_inventory::{
        ExpiryWindow, MovementFilter, MovementKind, NewLot, Period, StockDiscrepancy,
    };
    use pharmastock_parties::{NewSupplier, SupplierStatus};
    use pharmastock_products::{NewProduct, Product, ProductUpdate, RestoreCode, UNASSIGNED};
    use pharmastock_sales::Cart;

    use crate::{Store, StoreError, StoreOptions};

    fn options() -> StoreOptions {
        StoreOptions {
            max_connections: 1,
            password_cost: 4,
        }
    }

    async fn store() -> Store {
        Store::open_in_memory(&options()).await.unwrap()
    }

    fn in_days(days: u64) -> NaiveDate {
        local_today() + Days::new(days)
    }

    fn new_employee(ci: &str, role: Role) -> NewEmployee {
        NewEmployee {
            ci: ci.to_string(),
            name: "Ana".to_string(),
            surname: format!("Quispe {ci}"),
            phone: "70000000".to_string(),
            role,
            password: "secret".to_string(),
            password_confirmation: "secret".to_string(),
        }
    }

    fn new_product(code: &str, name: &str, stock: i64) -> NewProduct {
        NewProduct {
            code: code.to_string(),
            image_path: "img/product.png".to_string(),
            name: name.to_string(),
            price: Money::from_cents(250).unwrap(),
            stock,
            expires_on: in_days(365),
        }
    }

    fn new_lot(product: &Product, code: &str, quantity: i64, expires_in: u64) -> NewLot {
        NewLot {
            product_id: product.id,
            code: code.to_string(),
            quantity,
            expires_on: in_days(expires_in),
            cost: Money::from_cents(120).unwrap(),
            supplier_id: None,
        }
    }

    fn new_supplier(name: &str) -> NewSupplier {
        NewSupplier {
            name: name.to_string(),
            tax_id: None,
            contact_name: Some("Luis".to_string()),
            phone: "71111111".to_string(),
            email: "ventas@drogueria.bo".to_string(),
            address: None,
        }
    }

    async fn admin(store: &Store) -> Principal {
        store
            .seed_admin(new_employee("1000", Role::Admin))
            .await
            .unwrap()
            .principal()
    }

    fn domain(err: StoreError) -> DomainError {
        match err {
            StoreError::Domain(err) => err,
            other => panic!("expected a domain error, got {other:?}"),
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Employees
    // ─────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn seed_admin_only_on_empty_database() {
        let store = store().await;
        let first = store.seed_admin(new_employee("1000", Role::Employee)).await.unwrap();
        assert_eq!(first.role, Role::Admin);

        let err = store.seed_admin(new_employee("2000", Role::Admin)).await.unwrap_err();
        assert!(matches!(domain(err), DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn login_checks_ci_and_password() {
        let store = store().await;
        admin(&store).await;

        let session = store.login("1000", "secret").await.unwrap();
        assert_eq!(session.principal.role, Role::Admin);

        assert!(matches!(store.login("1000", "wrong").await, Err(StoreError::InvalidCredentials)));
        assert!(matches!(store.login("9999", "secret").await, Err(StoreError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn duplicate_ci_is_a_conflict() {
        let store = store().await;
        store.register_employee(new_employee("2000", Role::Employee)).await.unwrap();
        let err = store
            .register_employee(new_employee("2000", Role::Employee))
            .await
            .unwrap_err();
        assert!(matches!(domain(err), DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn update_keeps_password_unless_a_new_one_is_given() {
        let store = store().await;
        let employee = store.register_employee(new_employee("2000", Role::Employee)).await.unwrap();

        let update = EmployeeUpdate {
            ci: employee.ci.clone(),
            name: "Ana María".to_string(),
            surname: employee.surname.clone(),
            phone: employee.phone.clone(),
            role: Role::Employee,
            new_password: None,
        };
        let updated = store.update_employee(employee.id, update.clone()).await.unwrap();
        assert_eq!(updated.name, "Ana María");
        store.login("2000", "secret").await.unwrap();

        let update = EmployeeUpdate {
            new_password: Some(("changed".to_string(), "changed".to_string())),
            ..update
        };
        store.update_employee(employee.id, update).await.unwrap();
        assert!(store.login("2000", "secret").await.is_err());
        store.login("2000", "changed").await.unwrap();
    }

    #[tokio::test]
    async fn soft_delete_and_restore_keep_id_and_password() {
        let store = store().await;
        admin(&store).await;
        let employee = store.register_employee(new_employee("2000", Role::Employee)).await.unwrap();

        store.soft_delete_employee("2000").await.unwrap();
        assert!(store.find_employee_by_ci("2000").await.unwrap().is_none());
        assert!(store.login("2000", "secret").await.is_err());

        let deleted = store.list_deleted_employees(None).await.unwrap();
        assert_eq!(deleted.len(), 1);
        assert_eq!(deleted[0].id, employee.id);

        let restored = store.restore_employee("2000").await.unwrap();
        assert_eq!(restored.id, employee.id);
        store.login("2000", "secret").await.unwrap();
        assert!(store.list_deleted_employees(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn restore_refuses_a_ci_now_in_use() {
        let store = store().await;
        admin(&store).await;
        store.register_employee(new_employee("2000", Role::Employee)).await.unwrap();
        store.soft_delete_employee("2000").await.unwrap();
        store.register_employee(new_employee("2000", Role::Employee)).await.unwrap();

        let err = store.restore_employee("2000").await.unwrap_err();
        assert!(matches!(domain(err), DomainError::Conflict(_)));

        assert_eq!(store.purge_employee("2000").await.unwrap(), 1);
        assert!(matches!(
            domain(store.purge_employee("2000").await.unwrap_err()),
            DomainError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn last_admin_cannot_be_deleted() {
        let store = store().await;
        admin(&store).await;
        let err = store.soft_delete_employee("1000").await.unwrap_err();
        assert!(matches!(domain(err), DomainError::InvariantViolation(_)));

        store.register_employee(new_employee("3000", Role::Admin)).await.unwrap();
        store.soft_delete_employee("1000").await.unwrap();

        let contacts = store.list_admin_contacts().await.unwrap();
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].name, "Ana Quispe 3000");
    }

    #[tokio::test]
    async fn last_admin_cannot_be_demoted() {
        let store = store().await;
        let admin = store.seed_admin(new_employee("1000", Role::Admin)).await.unwrap();
        let demote = EmployeeUpdate {
            ci: admin.ci.clone(),
            name: admin.name.clone(),
            surname: admin.surname.clone(),
            phone: admin.phone.clone(),
            role: Role::Employee,
            new_password: None,
        };

        let err = store.update_employee(admin.id, demote.clone()).await.unwrap_err();
        assert!(matches!(domain(err), DomainError::InvariantViolation(_)));
        assert_eq!(store.list_admin_contacts().await.unwrap().len(), 1);

        // Keeping the role is still allowed.
        let rename = EmployeeUpdate {
            name: "Ana María".to_string(),
            role: Role::Admin,
            ..demote.clone()
        };
        store.update_employee(admin.id, rename).await.unwrap();

        store.register_employee(new_employee("3000", Role::Admin)).await.unwrap();
        let demoted = store.update_employee(admin.id, demote).await.unwrap();
        assert_eq!(demoted.role, Role::Employee);
        assert_eq!(store.list_admin_contacts().await.unwrap().len(), 1);
    }

    // ─────────────────────────────────────────────────────────────────────
    // Products
    // ─────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn initial_stock_is_journaled() {
        let store = store().await;
        let actor = admin(&store).await;
        let product = store.create_product(new_product("0001", "Ibuprofeno", 10), &actor).await.unwrap();

        let history = store.product_history(&product.code).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].kind, MovementKind::Adjustment);
        assert_eq!(history[0].signed_quantity(), 10);
        assert!(store.audit().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_product_code_is_a_conflict() {
        let store = store().await;
        let actor = admin(&store).await;
        store.create_product(new_product("0001", "Ibuprofeno", 0), &actor).await.unwrap();
        let err = store
            .create_product(new_product("0001", "Paracetamol", 0), &actor)
            .await
            .unwrap_err();
        assert!(matches!(domain(err), DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn edit_records_the_stock_delta() {
        let store = store().await;
        let actor = admin(&store).await;
        let product = store.create_product(new_product("0001", "Ibuprofeno", 10), &actor).await.unwrap();

        let update = ProductUpdate {
            code: product.code.clone(),
            image_path: String::new(),
            name: "Ibuprofeno 400".to_string(),
            price: Money::from_cents(300).unwrap(),
            stock: 7,
            expires_on: product.expires_on,
        };
        let updated = store.update_product(product.id, update, &actor).await.unwrap();
        assert_eq!(updated.image_path, product.image_path);
        assert_eq!(updated.stock, 7);

        let history = store.product_history("0001").await.unwrap();
        assert_eq!(history[0].signed_quantity(), -3);
        assert!(store.audit().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn adjust_stock_never_goes_negative() {
        let store = store().await;
        let actor = admin(&store).await;
        let product = store.create_product(new_product("0001", "Ibuprofeno", 2), &actor).await.unwrap();

        let err = store.adjust_stock(product.id, -3, "broken", &actor).await.unwrap_err();
        assert!(matches!(domain(err), DomainError::InvariantViolation(_)));

        let adjusted = store.adjust_stock(product.id, -2, "broken", &actor).await.unwrap();
        assert_eq!(adjusted.stock, 0);
        let history = store.product_history("0001").await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].notes.as_deref(), Some("-2 broken"));
    }

    #[tokio::test]
    async fn product_with_lots_cannot_be_deleted() {
        let store = store().await;
        let actor = admin(&store).await;
        let product = store.create_product(new_product("0001", "Ibuprofeno", 0), &actor).await.unwrap();
        store.receive_lot(new_lot(&product, "L-1", 5, 200), &actor).await.unwrap();

        let err = store.soft_delete_product(product.id, &actor).await.unwrap_err();
        assert!(matches!(domain(err), DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn deleted_product_restores_under_original_id() {
        let store = store().await;
        let actor = admin(&store).await;
        let product = store.create_product(new_product("0001", "Ibuprofeno", 4), &actor).await.unwrap();

        store.soft_delete_product(product.id, &actor).await.unwrap();
        assert!(store.find_product_by_code("0001").await.unwrap().is_none());
        assert_eq!(store.list_deleted_products(Some("ibu")).await.unwrap().len(), 1);

        // The journal keeps naming the deleted product.
        let journal = store.journal(&MovementFilter::all()).await.unwrap();
        assert_eq!(journal[0].product_name, "Ibuprofeno");

        store.create_product(new_product("0001", "Otro", 0), &actor).await.unwrap();
        let err = store.restore_product(product.id, &RestoreCode::keep(), &actor).await.unwrap_err();
        assert!(matches!(domain(err), DomainError::Conflict(_)));

        let restored = store
            .restore_product(product.id, &RestoreCode::replace("0002").unwrap(), &actor)
            .await
            .unwrap();
        assert_eq!(restored.id, product.id);
        assert_eq!(restored.code, "0002");
        assert_eq!(restored.stock, 4);
        assert!(store.list_deleted_products(None).await.unwrap().is_empty());

        // "Otro" took over 0001 with no stock; the journal must agree.
        assert!(store.audit().await.unwrap().is_empty());
        let moved = store.product_history("0002").await.unwrap();
        assert_eq!(moved[0].signed_quantity(), 4);
        assert_eq!(moved[0].notes.as_deref(), Some("+4 product restored"));
    }

    #[tokio::test]
    async fn code_change_carries_stock_history_to_the_new_code() {
        let store = store().await;
        let actor = admin(&store).await;
        let product = store.create_product(new_product("0001", "Ibuprofeno", 10), &actor).await.unwrap();

        let update = ProductUpdate {
            code: "0005".to_string(),
            image_path: String::new(),
            name: product.name.clone(),
            price: product.price,
            stock: product.stock,
            expires_on: product.expires_on,
        };
        let renamed = store.update_product(product.id, update, &actor).await.unwrap();

        let mut cart = Cart::new();
        cart.add(&renamed, 2).unwrap();
        store.checkout(&cart, &actor).await.unwrap();

        assert!(store.audit().await.unwrap().is_empty());
        let old: i64 = store.product_history("0001").await.unwrap().iter().map(|m| m.signed_quantity()).sum();
        assert_eq!(old, 0);
        let new: i64 = store.product_history("0005").await.unwrap().iter().map(|m| m.signed_quantity()).sum();
        assert_eq!(new, 8);

        // A product created later under the freed code starts clean.
        store.create_product(new_product("0001", "Paracetamol", 3), &actor).await.unwrap();
        assert!(store.audit().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn code_reused_after_delete_starts_clean() {
        let store = store().await;
        let actor = admin(&store).await;
        let product = store.create_product(new_product("0001", "Ibuprofeno", 6), &actor).await.unwrap();
        store.soft_delete_product(product.id, &actor).await.unwrap();

        store.create_product(new_product("0001", "Paracetamol", 2), &actor).await.unwrap();
        assert!(store.audit().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn purge_requires_a_deleted_product() {
        let store = store().await;
        let actor = admin(&store).await;
        let product = store.create_product(new_product("0001", "Ibuprofeno", 0), &actor).await.unwrap();

        let err = store.purge_product(product.id).await.unwrap_err();
        assert!(matches!(domain(err), DomainError::NotFound(_)));

        store.soft_delete_product(product.id, &actor).await.unwrap();
        store.purge_product(product.id).await.unwrap();
        assert!(store.list_deleted_products(None).await.unwrap().is_empty());
        assert!(matches!(
            domain(store.get_product(product.id).await.unwrap_err()),
            DomainError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn modifier_name_falls_back_when_unknown() {
        let store = store().await;
        let actor = admin(&store).await;
        let clerk = store
            .register_employee(new_employee("2000", Role::Employee))
            .await
            .unwrap()
            .principal();
        store.create_product(new_product("0001", "Ibuprofeno", 0), &actor).await.unwrap();
        store.create_product(new_product("0002", "Paracetamol", 0), &clerk).await.unwrap();

        store.soft_delete_employee("2000").await.unwrap();

        let rows = store.list_products_with_modifier(None).await.unwrap();
        assert_eq!(rows[0].modified_by_name, "Ana Quispe 1000");
        assert_eq!(rows[1].modified_by_name, UNASSIGNED);
    }

    // ─────────────────────────────────────────────────────────────────────
    // Suppliers and lots
    // ─────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn receiving_a_lot_adds_stock_and_a_purchase() {
        let store = store().await;
        let actor = admin(&store).await;
        let supplier = store.create_supplier(new_supplier("Droguería Inti")).await.unwrap();
        let product = store.create_product(new_product("0001", "Ibuprofeno", 0), &actor).await.unwrap();

        let mut input = new_lot(&product, "L-1", 12, 200);
        input.supplier_id = Some(supplier.id);
        let lot = store.receive_lot(input, &actor).await.unwrap();
        assert_eq!(lot.quantity, 12);

        assert_eq!(store.get_product(product.id).await.unwrap().stock, 12);
        let history = store.product_history("0001").await.unwrap();
        assert_eq!(history[0].kind, MovementKind::Purchase);
        assert_eq!(history[0].notes.as_deref(), Some("lot L-1 received"));

        let lots = store.list_lots(Some(product.id)).await.unwrap();
        assert_eq!(lots[0].supplier_name.as_deref(), Some("Droguería Inti"));
        assert!(store.audit().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn inactive_supplier_cannot_deliver() {
        let store = store().await;
        let actor = admin(&store).await;
        let supplier = store.create_supplier(new_supplier("Droguería Inti")).await.unwrap();
        store.set_supplier_status(supplier.id, SupplierStatus::Inactive).await.unwrap();
        let product = store.create_product(new_product("0001", "Ibuprofeno", 0), &actor).await.unwrap();

        let mut input = new_lot(&product, "L-1", 12, 200);
        input.supplier_id = Some(supplier.id);
        let err = store.receive_lot(input, &actor).await.unwrap_err();
        assert!(matches!(domain(err), DomainError::InvariantViolation(_)));
        assert_eq!(store.get_product(product.id).await.unwrap().stock, 0);

        assert!(store.list_suppliers(false).await.unwrap().is_empty());
        assert_eq!(store.list_suppliers(true).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn duplicate_lot_code_rolls_back() {
        let store = store().await;
        let actor = admin(&store).await;
        let product = store.create_product(new_product("0001", "Ibuprofeno", 0), &actor).await.unwrap();
        store.receive_lot(new_lot(&product, "L-1", 5, 200), &actor).await.unwrap();

        let err = store.receive_lot(new_lot(&product, "L-1", 5, 200), &actor).await.unwrap_err();
        assert!(matches!(domain(err), DomainError::Conflict(_)));
        assert_eq!(store.get_product(product.id).await.unwrap().stock, 5);
        assert_eq!(store.product_history("0001").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn expiring_lots_are_within_the_window() {
        let store = store().await;
        let actor = admin(&store).await;
        let product = store.create_product(new_product("0001", "Ibuprofeno", 0), &actor).await.unwrap();
        store.receive_lot(new_lot(&product, "SOON", 5, 10), &actor).await.unwrap();
        store.receive_lot(new_lot(&product, "LATER", 5, 300), &actor).await.unwrap();

        let today = local_today();
        let expiring = store.list_expiring_lots(today, ExpiryWindow::default()).await.unwrap();
        assert_eq!(expiring.len(), 1);
        assert_eq!(expiring[0].lot.code, "SOON");

        let all = store.list_expiring_lots(today, ExpiryWindow::new(400)).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    // ─────────────────────────────────────────────────────────────────────
    // Sales
    // ─────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn checkout_decrements_stock_and_journals_each_line() {
        let store = store().await;
        let actor = admin(&store).await;
        let ibu = store.create_product(new_product("0001", "Ibuprofeno", 10), &actor).await.unwrap();
        let para = store.create_product(new_product("0002", "Paracetamol", 5), &actor).await.unwrap();

        let mut cart = Cart::new();
        cart.add(&ibu, 3).unwrap();
        cart.add(&para, 5).unwrap();
        let receipt = store.checkout(&cart, &actor).await.unwrap();
        assert_eq!(receipt.total.cents(), 2000);

        assert_eq!(store.get_product(ibu.id).await.unwrap().stock, 7);
        let sellable = store.sellable_products(None).await.unwrap();
        assert_eq!(sellable.len(), 1);
        assert_eq!(sellable[0].code, "0001");

        let sales = store.journal(&MovementFilter::parse("sale").unwrap()).await.unwrap();
        let sales: Vec<_> = sales
            .into_iter()
            .filter(|e| e.movement.kind == MovementKind::Sale)
            .collect();
        assert_eq!(sales.len(), 2);
        assert!(sales.iter().all(|e| e.movement.sale_id == Some(receipt.sale_id)));
    }

    #[tokio::test]
    async fn checkout_is_all_or_nothing() {
        let store = store().await;
        let actor = admin(&store).await;
        let ibu = store.create_product(new_product("0001", "Ibuprofeno", 10), &actor).await.unwrap();
        let para = store.create_product(new_product("0002", "Paracetamol", 5), &actor).await.unwrap();

        let mut cart = Cart::new();
        cart.add(&ibu, 3).unwrap();
        cart.add(&para, 5).unwrap();

        // Someone else sells paracetamol first.
        store.adjust_stock(para.id, -4, "sold elsewhere", &actor).await.unwrap();

        let err = store.checkout(&cart, &actor).await.unwrap_err();
        match domain(err) {
            DomainError::InsufficientStock { code, requested, available } => {
                assert_eq!((code.as_str(), requested, available), ("0002", 5, 1));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(store.get_product(ibu.id).await.unwrap().stock, 10);
        assert!(store
            .product_history("0001")
            .await
            .unwrap()
            .iter()
            .all(|m| m.kind != MovementKind::Sale));
    }

    #[tokio::test]
    async fn empty_cart_is_rejected() {
        let store = store().await;
        let actor = admin(&store).await;
        let err = store.checkout(&Cart::new(), &actor).await.unwrap_err();
        assert!(matches!(domain(err), DomainError::Validation(_)));
    }

    // ─────────────────────────────────────────────────────────────────────
    // Journal, reports and audit
    // ─────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn journal_filters_by_text_and_period() {
        let store = store().await;
        let actor = admin(&store).await;
        store.create_product(new_product("0001", "Ibuprofeno", 10), &actor).await.unwrap();
        store.create_product(new_product("0002", "Paracetamol", 5), &actor).await.unwrap();

        let all = store.journal(&MovementFilter::all()).await.unwrap();
        assert_eq!(all.len(), 2);

        let ibu = store.journal(&MovementFilter::parse("IBUPRO").unwrap()).await.unwrap();
        assert_eq!(ibu.len(), 1);
        assert_eq!(ibu[0].movement.product_code, "0001");

        let today = local_today();
        let filter = MovementFilter::period(Period::Today, today).unwrap();
        assert_eq!(store.journal(&filter).await.unwrap().len(), 2);

        let filter = MovementFilter::period(Period::LastYear, today).unwrap();
        assert!(store.journal(&filter).await.unwrap().is_empty());

        // LIKE wildcards in user input are literal.
        assert!(store.journal(&MovementFilter::parse("%").unwrap()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn journal_accepts_legacy_kind_names() {
        let store = store().await;
        let actor = admin(&store).await;
        let ibu = store.create_product(new_product("0001", "Ibuprofeno", 0), &actor).await.unwrap();
        store.receive_lot(new_lot(&ibu, "L-1", 5, 200), &actor).await.unwrap();
        let ibu = store.get_product(ibu.id).await.unwrap();

        let mut cart = Cart::new();
        cart.add(&ibu, 2).unwrap();
        store.checkout(&cart, &actor).await.unwrap();

        let ventas = store.journal(&MovementFilter::parse("venta").unwrap()).await.unwrap();
        assert_eq!(ventas.len(), 1);
        assert_eq!(ventas[0].movement.kind, MovementKind::Sale);

        let compras = store.journal(&MovementFilter::parse("Compra").unwrap()).await.unwrap();
        assert_eq!(compras.len(), 1);
        assert_eq!(compras[0].movement.kind, MovementKind::Purchase);
    }

    #[tokio::test]
    async fn reports_split_live_and_deleted_rows() {
        let store = store().await;
        let actor = admin(&store).await;
        store.create_product(new_product("0001", "Ibuprofeno", 10), &actor).await.unwrap();
        let gone = store.create_product(new_product("0002", "Paracetamol", 0), &actor).await.unwrap();
        store.soft_delete_product(gone.id, &actor).await.unwrap();

        let report = store.product_report(None).await.unwrap();
        assert_eq!(report.live.len(), 1);
        assert_eq!(report.live[0].status.to_string(), "available");
        assert_eq!(report.deleted.len(), 1);

        store.register_employee(new_employee("2000", Role::Employee)).await.unwrap();
        store.soft_delete_employee("2000").await.unwrap();
        let employees = store.employee_report(None).await.unwrap();
        assert_eq!(employees.active.len(), 1);
        assert_eq!(employees.deleted.len(), 1);
    }

    #[tokio::test]
    async fn audit_reports_unexplained_and_lot_mismatch() {
        let store = store().await;
        let actor = admin(&store).await;
        let product = store.create_product(new_product("0001", "Ibuprofeno", 0), &actor).await.unwrap();
        store.receive_lot(new_lot(&product, "L-1", 5, 200), &actor).await.unwrap();

        sqlx::query("UPDATE products SET stock = 9 WHERE id = ?1")
            .bind(product.id.get())
            .execute(store.pool())
            .await
            .unwrap();

        let found = store.audit().await.unwrap();
        assert_eq!(
            found,
            vec![
                StockDiscrepancy::LotMismatch {
                    code: "0001".to_string(),
                    stock: 9,
                    lot_total: 5,
                },
                StockDiscrepancy::UnexplainedStock {
                    code: "0001".to_string(),
                    stock: 9,
                    movement_net: 5,
                },
            ]
        );
    }

    // ─────────────────────────────────────────────────────────────────────
    // File database
    // ─────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn file_database_survives_reopening() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("pharmastock.db");

        let store = Store::open(&path, &options()).await.unwrap();
        let actor = admin(&store).await;
        store.create_product(new_product("0001", "Ibuprofeno", 3), &actor).await.unwrap();
        store.close().await;

        let store = Store::open(&path, &options()).await.unwrap();
        assert_eq!(store.employee_count().await.unwrap(), 1);
        let product = store.find_product_by_code("0001").await.unwrap().unwrap();
        assert_eq!(product.stock, 3);
        store.login("1000", "secret").await.unwrap();
        store.close().await;
    }

    async fn shared_file_store(dir: &tempfile::TempDir) -> Store {
        let options = StoreOptions {
            max_connections: 8,
            password_cost: 4,
        };
        Store::open(&dir.path().join("pharmastock.db"), &options).await.unwrap()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_adjustments_are_serialized() {
        let dir = tempfile::tempdir().unwrap();
        let store = shared_file_store(&dir).await;
        let actor = admin(&store).await;
        let product = store.create_product(new_product("0001", "Ibuprofeno", 1000), &actor).await.unwrap();

        let tasks: Vec<_> = (0..40)
            .map(|_| {
                let store = store.clone();
                let actor = actor.clone();
                tokio::spawn(async move { store.adjust_stock(product.id, -1, "count", &actor).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(store.get_product(product.id).await.unwrap().stock, 960);
        assert_eq!(store.product_history("0001").await.unwrap().len(), 41);
        assert!(store.audit().await.unwrap().is_empty());
        store.close().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_seeding_creates_one_admin() {
        let dir = tempfile::tempdir().unwrap();
        let store = shared_file_store(&dir).await;

        let tasks: Vec<_> = ["1000", "2000", "3000", "4000"]
            .into_iter()
            .map(|ci| {
                let store = store.clone();
                tokio::spawn(async move { store.seed_admin(new_employee(ci, Role::Admin)).await })
            })
            .collect();
        let mut seeded = 0;
        for task in tasks {
            match task.await.unwrap() {
                Ok(_) => seeded += 1,
                Err(err) => assert!(matches!(domain(err), DomainError::Conflict(_))),
            }
        }

        assert_eq!(seeded, 1);
        assert_eq!(store.employee_count().await.unwrap(), 1);
        store.close().await;
    }
}
