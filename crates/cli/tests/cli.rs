//! Black-box tests for the `pharmastock` binary.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::TempDir;

struct Harness {
    dir: TempDir,
}

impl Harness {
    fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    fn db(&self) -> PathBuf {
        self.dir.path().join("pharmastock.db")
    }

    fn run(&self, args: &[&str]) -> Output {
        run_in(self.dir.path(), &self.db(), args)
    }

    /// Run as the seeded administrator.
    fn admin(&self, args: &[&str]) -> Output {
        let mut all = vec!["--as", "1000", "--password", "secret"];
        all.extend_from_slice(args);
        self.run(&all)
    }

    fn admin_json(&self, args: &[&str]) -> Value {
        let mut all = vec!["--json"];
        all.extend_from_slice(args);
        let out = self.admin(&all);
        assert_success(&out);
        serde_json::from_slice(&out.stdout).unwrap()
    }

    fn seeded() -> Self {
        let h = Self::new();
        let out = h.run(&[
            "init",
            "--admin-ci",
            "1000",
            "--admin-name",
            "Ana",
            "--admin-surname",
            "Quispe",
            "--admin-phone",
            "70000000",
            "--admin-password",
            "secret",
        ]);
        assert_success(&out);
        h
    }
}

fn run_in(dir: &Path, db: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pharmastock"))
        .args(args)
        .current_dir(dir)
        .env("PHARMASTOCK_DB", db)
        .env("PHARMASTOCK_BCRYPT_COST", "4")
        .env("RUST_LOG", "warn")
        .env_remove("PHARMASTOCK_PASSWORD")
        .env_remove("PHARMASTOCK_ADMIN_PASSWORD")
        .output()
        .unwrap()
}

fn assert_success(out: &Output) {
    assert!(
        out.status.success(),
        "command failed: {}\nstdout: {}",
        String::from_utf8_lossy(&out.stderr),
        String::from_utf8_lossy(&out.stdout)
    );
}

fn expires() -> String {
    (chrono::Local::now().date_naive() + chrono::Days::new(365)).to_string()
}

fn add_product(h: &Harness, code: &str, name: &str, stock: &str) -> i64 {
    let product = h.admin_json(&[
        "product", "add", "--code", code, "--name", name, "--image", "img.png", "--price", "2.50",
        "--stock", stock, "--expires", &expires(),
    ]);
    product["id"].as_i64().unwrap()
}

#[test]
fn init_and_login() {
    let h = Harness::seeded();

    let out = h.run(&["--json", "login", "--ci", "1000", "--password", "secret"]);
    assert_success(&out);
    let session: Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(session["principal"]["role"], "admin");
    assert_eq!(session["landing"], "menu");

    let out = h.run(&["login", "--ci", "1000", "--password", "wrong"]);
    assert_eq!(out.status.code(), Some(5));
    assert!(String::from_utf8_lossy(&out.stderr).starts_with("error:"));
}

#[test]
fn second_seed_is_a_conflict() {
    let h = Harness::seeded();
    let out = h.run(&[
        "init",
        "--admin-ci",
        "2000",
        "--admin-name",
        "Luis",
        "--admin-surname",
        "Mamani",
        "--admin-phone",
        "71111111",
        "--admin-password",
        "secret",
    ]);
    assert_eq!(out.status.code(), Some(4));
}

#[test]
fn partial_admin_flags_are_a_usage_error() {
    let h = Harness::new();
    let out = h.run(&["init", "--admin-name", "Ana", "--admin-password", "secret"]);
    assert_eq!(out.status.code(), Some(2));
    assert!(!h.db().exists());
}

#[test]
fn commands_need_credentials() {
    let h = Harness::seeded();
    let out = h.run(&["product", "list"]);
    assert_eq!(out.status.code(), Some(5));
}

#[test]
fn employees_cannot_manage_staff() {
    let h = Harness::seeded();
    assert_success(&h.admin(&[
        "employee", "add", "--ci", "2000", "--name", "Luis", "--surname", "Mamani", "--phone",
        "71111111", "--new-password", "clave",
    ]));

    let out = h.run(&["--as", "2000", "--password", "clave", "employee", "list"]);
    assert_eq!(out.status.code(), Some(5));

    let out = h.run(&["--as", "2000", "--password", "clave", "product", "list"]);
    assert_success(&out);
}

#[test]
fn validation_errors_exit_with_two() {
    let h = Harness::seeded();
    let out = h.admin(&[
        "product", "add", "--code", "12", "--name", "Ibuprofeno", "--image", "img.png", "--price",
        "2.50", "--expires", &expires(),
    ]);
    assert_eq!(out.status.code(), Some(2));

    // clap usage errors share the code
    let out = h.admin(&["product", "show"]);
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn sale_updates_stock_and_journal() {
    let h = Harness::seeded();
    let ibu = add_product(&h, "0001", "Ibuprofeno", "10");
    let para = add_product(&h, "0002", "Paracetamol", "2");

    let receipt = h.admin_json(&[
        "sale",
        "checkout",
        "--item",
        &format!("{ibu}:3"),
        "--item",
        &format!("{para}:2"),
    ]);
    assert_eq!(receipt["total"], 1250);

    let product = h.admin_json(&["product", "show", "--id", &ibu.to_string()]);
    assert_eq!(product["stock"], 7);

    let sellable = h.admin_json(&["sale", "products"]);
    assert_eq!(sellable.as_array().unwrap().len(), 1);

    let journal = h.admin_json(&["journal", "--search", "paracetamol"]);
    assert_eq!(journal.as_array().unwrap().len(), 2);

    let out = h.admin(&["sale", "checkout", "--item", &format!("{para}:1")]);
    assert_eq!(out.status.code(), Some(4));

    let out = h.admin(&["sale", "checkout", "--item", "999:1"]);
    assert_eq!(out.status.code(), Some(3));
}

#[test]
fn lots_and_audit() {
    let h = Harness::seeded();
    let id = add_product(&h, "0001", "Ibuprofeno", "0");
    let supplier = h.admin_json(&[
        "supplier", "add", "--name", "Droguería Inti", "--phone", "72222222", "--email",
        "ventas@inti.bo",
    ]);
    let supplier_id = supplier["id"].as_i64().unwrap().to_string();

    let soon = (chrono::Local::now().date_naive() + chrono::Days::new(10)).to_string();
    h.admin_json(&[
        "lot", "add", "--product", &id.to_string(), "--code", "L-1", "--quantity", "6",
        "--expires", &soon, "--cost", "1.20", "--supplier", &supplier_id,
    ]);

    let expiring = h.admin_json(&["lot", "expiring"]);
    assert_eq!(expiring.as_array().unwrap().len(), 1);
    assert_eq!(expiring[0]["supplier_name"], "Droguería Inti");

    let audit = h.admin_json(&["audit"]);
    assert!(audit.as_array().unwrap().is_empty());

    // Stock no longer matches the lot total.
    h.admin_json(&["product", "adjust", "--id", &id.to_string(), "--delta", "-1", "--reason", "broken"]);
    let audit = h.admin_json(&["audit"]);
    assert_eq!(audit[0]["kind"], "lot_mismatch");

    let out = h.admin(&["product", "delete", "--id", &id.to_string()]);
    assert_eq!(out.status.code(), Some(4));
}

#[test]
fn stats_over_a_range() {
    let h = Harness::seeded();
    let id = add_product(&h, "0001", "Ibuprofeno", "10");
    h.admin_json(&["sale", "checkout", "--item", &format!("{id}:4")]);

    let today = chrono::Local::now().date_naive().to_string();
    let stats = h.admin_json(&["stats", "--from", &today, "--to", &today, "--kind", "sale"]);
    assert_eq!(stats["total_movements"], 1);
    assert_eq!(stats["total_units"], 4);
    assert_eq!(stats["top_product"]["name"], "Ibuprofeno");
}
