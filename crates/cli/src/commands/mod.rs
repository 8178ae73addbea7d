//! Command handlers. Each one authorizes the acting employee first.

mod employees;
mod inventory;
mod products;
mod sales;

use chrono::NaiveDate;

use pharmastock_auth::{authorize, NewEmployee, Permission, Principal, Role};
use pharmastock_core::DomainError;
use pharmastock_core::time::local_today;
use pharmastock_infra::{Config, Store};

use crate::args::{Cli, Command, InitArgs};
use crate::output::{done, emit};

pub struct App {
    pub store: Store,
    pub config: Config,
    pub json: bool,
    acting_ci: Option<String>,
    password: Option<String>,
}

impl App {
    pub fn new(store: Store, config: Config, cli: &Cli) -> Self {
        Self {
            store,
            config,
            json: cli.json,
            acting_ci: cli.acting_ci.clone(),
            password: cli.password.clone(),
        }
    }

    /// Log in as the acting employee and check `permission`.
    pub async fn require(&self, permission: &Permission) -> anyhow::Result<Principal> {
        let (Some(ci), Some(password)) = (self.acting_ci.as_deref(), self.password.as_deref()) else {
            return Err(DomainError::unauthorized("this command needs --as <CI> and --password").into());
        };
        let principal = self.store.login(ci, password).await?.principal;
        authorize(&principal, permission).map_err(DomainError::from)?;
        Ok(principal)
    }

    /// Today on the local clock.
    pub fn today(&self) -> NaiveDate {
        local_today()
    }
}

pub async fn dispatch(app: &App, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Init(args) => init(app, args).await,
        Command::Login { ci } => login(app, &ci).await,
        Command::Employee(cmd) => employees::run(app, cmd).await,
        Command::Product(cmd) => products::run(app, cmd).await,
        Command::Supplier(cmd) => inventory::supplier(app, cmd).await,
        Command::Lot(cmd) => inventory::lot(app, cmd).await,
        Command::Sale(cmd) => sales::sale(app, cmd).await,
        Command::Journal { search, period } => sales::journal(app, search.as_deref(), period).await,
        Command::Stats { from, to, kind } => sales::stats(app, from, to, kind).await,
        Command::Audit => sales::audit(app).await,
    }
}

async fn init(app: &App, args: InitArgs) -> anyhow::Result<()> {
    let InitArgs {
        admin_ci: Some(ci),
        admin_name: Some(name),
        admin_surname: Some(surname),
        admin_phone: Some(phone),
        admin_password: Some(password),
    } = args
    else {
        let path = app.config.database_path.display().to_string();
        return done(app.json, &format!("database ready at {path}"));
    };

    let admin = app
        .store
        .seed_admin(NewEmployee {
            ci,
            name,
            surname,
            phone,
            role: Role::Admin,
            password_confirmation: password.clone(),
            password,
        })
        .await?;
    emit(app.json, &admin, |a| {
        println!("administrator {} created (id {}, CI {})", a.full_name(), a.id, a.ci)
    })
}

async fn login(app: &App, ci: &str) -> anyhow::Result<()> {
    let Some(password) = app.password.as_deref() else {
        return Err(DomainError::validation("--password is required").into());
    };
    let session = app.store.login(ci, password).await?;
    emit(app.json, &session, |s| {
        println!(
            "welcome {} ({}); landing screen: {}",
            s.principal.name, s.principal.role, s.landing
        )
    })
}
