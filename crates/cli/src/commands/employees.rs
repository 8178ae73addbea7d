use pharmastock_auth::{Employee, EmployeeUpdate, NewEmployee, Permission};
use pharmastock_core::DomainError;

use super::App;
use crate::args::EmployeeCommand;
use crate::output::{done, emit};

fn print_employee(e: &Employee) {
    println!("{:>4}  {:<12} {:<30} {:<12} {}", e.id, e.ci, e.full_name(), e.phone, e.role);
}

async fn find(app: &App, ci: &str) -> anyhow::Result<Employee> {
    app.store
        .find_employee_by_ci(ci)
        .await?
        .ok_or_else(|| DomainError::not_found(format!("employee with CI {}", ci.trim())).into())
}

pub async fn run(app: &App, command: EmployeeCommand) -> anyhow::Result<()> {
    match command {
        EmployeeCommand::Add {
            ci,
            name,
            surname,
            phone,
            role,
            new_password,
            confirm,
        } => {
            app.require(&Permission::EMPLOYEES_WRITE).await?;
            let employee = app
                .store
                .register_employee(NewEmployee {
                    ci,
                    name,
                    surname,
                    phone,
                    role,
                    password_confirmation: confirm.unwrap_or_else(|| new_password.clone()),
                    password: new_password,
                })
                .await?;
            emit(app.json, &employee, print_employee)
        }

        EmployeeCommand::List { search } => {
            app.require(&Permission::EMPLOYEES_READ).await?;
            let employees = app.store.list_employees(search.as_deref()).await?;
            emit(app.json, &employees, |list| list.iter().for_each(print_employee))
        }

        EmployeeCommand::Show { ci } => {
            app.require(&Permission::EMPLOYEES_READ).await?;
            let employee = find(app, &ci).await?;
            emit(app.json, &employee, print_employee)
        }

        EmployeeCommand::Update {
            ci,
            new_ci,
            name,
            surname,
            phone,
            role,
            new_password,
            confirm,
        } => {
            app.require(&Permission::EMPLOYEES_WRITE).await?;
            let current = find(app, &ci).await?;
            let update = EmployeeUpdate {
                ci: new_ci.unwrap_or(current.ci),
                name: name.unwrap_or(current.name),
                surname: surname.unwrap_or(current.surname),
                phone: phone.unwrap_or(current.phone),
                role: role.unwrap_or(current.role),
                new_password: new_password.map(|pw| {
                    let repeat = confirm.unwrap_or_else(|| pw.clone());
                    (pw, repeat)
                }),
            };
            let employee = app.store.update_employee(current.id, update).await?;
            emit(app.json, &employee, print_employee)
        }

        EmployeeCommand::Delete { ci } => {
            app.require(&Permission::EMPLOYEES_WRITE).await?;
            app.store.soft_delete_employee(&ci).await?;
            done(app.json, &format!("employee {} deleted", ci.trim()))
        }

        EmployeeCommand::Deleted { search } => {
            app.require(&Permission::EMPLOYEES_READ).await?;
            let deleted = app.store.list_deleted_employees(search.as_deref()).await?;
            emit(app.json, &deleted, |list| {
                for e in list {
                    println!(
                        "{:>4}  {:<12} {} {}  deleted {}",
                        e.id,
                        e.ci,
                        e.name,
                        e.surname,
                        e.deleted_at.format("%Y-%m-%d %H:%M")
                    );
                }
            })
        }

        EmployeeCommand::Restore { ci } => {
            app.require(&Permission::EMPLOYEES_WRITE).await?;
            let employee = app.store.restore_employee(&ci).await?;
            emit(app.json, &employee, print_employee)
        }

        EmployeeCommand::Purge { ci } => {
            app.require(&Permission::EMPLOYEES_WRITE).await?;
            let purged = app.store.purge_employee(&ci).await?;
            done(app.json, &format!("{purged} deleted record(s) purged"))
        }

        // Shown to anyone locked out, so no login is needed.
        EmployeeCommand::Admins => {
            let contacts = app.store.list_admin_contacts().await?;
            emit(app.json, &contacts, |list| {
                for c in list {
                    println!("{:<30} {}", c.name, c.phone);
                }
            })
        }

        EmployeeCommand::Report { search } => {
            app.require(&Permission::REPORTS_READ).await?;
            let report = app.store.employee_report(search.as_deref()).await?;
            emit(app.json, &report, |r| {
                println!("active ({})", r.active.len());
                r.active.iter().for_each(print_employee);
                println!("deleted ({})", r.deleted.len());
                for e in &r.deleted {
                    println!("{:>4}  {:<12} {} {}", e.id, e.ci, e.name, e.surname);
                }
            })
        }
    }
}
