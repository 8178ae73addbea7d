//! Employee records, login and soft-delete.

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};

use pharmastock_auth::password::{hash_password, verify_password};
use pharmastock_auth::{
    AdminContact, DeletedEmployee, Employee, EmployeeUpdate, NewEmployee, PasswordHash, Role,
    Session,
};
use pharmastock_core::time::{format_timestamp, parse_timestamp};
use pharmastock_core::{DomainError, EmployeeId};

use crate::db::{like_pattern, Store};
use crate::error::{unique_as, StoreError, StoreResult};

const EMPLOYEE_COLUMNS: &str = "id, ci, name, surname, phone, role, created_at";

fn employee_from_row(row: &SqliteRow) -> StoreResult<Employee> {
    let role: String = row.try_get("role")?;
    let created_at: String = row.try_get("created_at")?;
    Ok(Employee {
        id: EmployeeId::new(row.try_get("id")?),
        ci: row.try_get("ci")?,
        name: row.try_get("name")?,
        surname: row.try_get("surname")?,
        phone: row.try_get("phone")?,
        role: role.parse::<Role>()?,
        created_at: parse_timestamp(&created_at)?,
    })
}

fn deleted_employee_from_row(row: &SqliteRow) -> StoreResult<DeletedEmployee> {
    let employee = employee_from_row(row)?;
    let deleted_at: String = row.try_get("deleted_at")?;
    Ok(DeletedEmployee {
        id: employee.id,
        ci: employee.ci,
        name: employee.name,
        surname: employee.surname,
        phone: employee.phone,
        role: employee.role,
        created_at: employee.created_at,
        deleted_at: parse_timestamp(&deleted_at)?,
    })
}

async fn insert_employee(
    conn: &mut SqliteConnection,
    input: &NewEmployee,
    hash: &PasswordHash,
) -> StoreResult<Employee> {
    let row = sqlx::query(&format!(
        r#"
        INSERT INTO employees (ci, name, surname, phone, password_hash, role, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        RETURNING {EMPLOYEE_COLUMNS}
        "#
    ))
    .bind(&input.ci)
    .bind(&input.name)
    .bind(&input.surname)
    .bind(&input.phone)
    .bind(hash.as_str())
    .bind(input.role.as_str())
    .bind(format_timestamp(Utc::now()))
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| unique_as(e, || format!("CI {} is already registered", input.ci)))?;

    let employee = employee_from_row(&row)?;
    tracing::info!(employee_id = %employee.id, role = %employee.role, "employee registered");
    Ok(employee)
}

async fn count_admins(conn: &mut SqliteConnection) -> StoreResult<i64> {
    let admins: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM employees WHERE role = 'admin'")
        .fetch_one(&mut *conn)
        .await?;
    Ok(admins)
}

impl Store {
    pub async fn register_employee(&self, input: NewEmployee) -> StoreResult<Employee> {
        let input = input.validated()?;
        let hash = hash_password(&input.password, self.password_cost())?;
        let mut conn = self.pool().acquire().await?;
        insert_employee(&mut conn, &input, &hash).await
    }

    /// Register the first administrator of an empty database.
    pub async fn seed_admin(&self, mut input: NewEmployee) -> StoreResult<Employee> {
        input.role = Role::Admin;
        let input = input.validated()?;
        let hash = hash_password(&input.password, self.password_cost())?;

        let mut tx = self.begin_write().await?;
        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM employees")
            .fetch_one(&mut *tx)
            .await?;
        if existing > 0 {
            return Err(DomainError::conflict("employees already exist").into());
        }
        let employee = insert_employee(&mut tx, &input, &hash).await?;
        tx.commit().await?;
        Ok(employee)
    }

    pub async fn employee_count(&self) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM employees")
            .fetch_one(self.pool())
            .await?;
        Ok(count)
    }

    /// Authenticate by CI and password.
    pub async fn login(&self, ci: &str, password: &str) -> StoreResult<Session> {
        let row = sqlx::query(&format!(
            "SELECT {EMPLOYEE_COLUMNS}, password_hash FROM employees WHERE ci = ?1"
        ))
        .bind(ci.trim())
        .fetch_optional(self.pool())
        .await?;

        let Some(row) = row else {
            tracing::info!("login rejected: unknown CI");
            return Err(StoreError::InvalidCredentials);
        };

        let hash = PasswordHash::from_stored(row.try_get::<String, _>("password_hash")?);
        if !verify_password(password, &hash) {
            tracing::info!("login rejected: wrong password");
            return Err(StoreError::InvalidCredentials);
        }

        let employee = employee_from_row(&row)?;
        tracing::info!(employee_id = %employee.id, "login succeeded");
        Ok(Session::new(employee.principal()))
    }

    pub async fn get_employee(&self, id: EmployeeId) -> StoreResult<Employee> {
        let row = sqlx::query(&format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE id = ?1"))
            .bind(id.get())
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DomainError::not_found(format!("employee {id}")))?;
        employee_from_row(&row)
    }

    pub async fn find_employee_by_ci(&self, ci: &str) -> StoreResult<Option<Employee>> {
        let row = sqlx::query(&format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE ci = ?1"))
            .bind(ci.trim())
            .fetch_optional(self.pool())
            .await?;
        row.as_ref().map(employee_from_row).transpose()
    }

    /// Active employees, newest first, optionally filtered by name, surname or CI.
    pub async fn list_employees(&self, search: Option<&str>) -> StoreResult<Vec<Employee>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {EMPLOYEE_COLUMNS} FROM employees
            WHERE ?1 IS NULL
               OR name LIKE ?1 ESCAPE '\'
               OR surname LIKE ?1 ESCAPE '\'
               OR ci LIKE ?1 ESCAPE '\'
            ORDER BY created_at DESC, id DESC
            "#
        ))
        .bind(like_pattern(search))
        .fetch_all(self.pool())
        .await?;
        rows.iter().map(employee_from_row).collect()
    }

    /// Overwrite an employee. The last administrator keeps the admin role.
    pub async fn update_employee(&self, id: EmployeeId, update: EmployeeUpdate) -> StoreResult<Employee> {
        let update = update.validated()?;
        let new_hash = match &update.new_password {
            Some((password, _)) => Some(hash_password(password, self.password_cost())?),
            None => None,
        };

        let mut tx = self.begin_write().await?;

        let role: String = sqlx::query_scalar("SELECT role FROM employees WHERE id = ?1")
            .bind(id.get())
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("employee {id}")))?;
        if role == Role::Admin.as_str() && update.role != Role::Admin && count_admins(&mut tx).await? <= 1 {
            return Err(DomainError::invariant("cannot demote the last administrator").into());
        }

        let row = sqlx::query(&format!(
            r#"
            UPDATE employees
            SET ci = ?1, name = ?2, surname = ?3, phone = ?4, role = ?5,
                password_hash = COALESCE(?6, password_hash)
            WHERE id = ?7
            RETURNING {EMPLOYEE_COLUMNS}
            "#
        ))
        .bind(&update.ci)
        .bind(&update.name)
        .bind(&update.surname)
        .bind(&update.phone)
        .bind(update.role.as_str())
        .bind(new_hash.as_ref().map(PasswordHash::as_str))
        .bind(id.get())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| unique_as(e, || format!("CI {} is already registered", update.ci)))?;
        let employee = employee_from_row(&row)?;

        tx.commit().await?;
        tracing::info!(employee_id = %id, password_changed = new_hash.is_some(), "employee updated");
        Ok(employee)
    }

    /// Names and phones of administrators, for password reset requests.
    pub async fn list_admin_contacts(&self) -> StoreResult<Vec<AdminContact>> {
        let rows = sqlx::query(
            r#"
            SELECT name || ' ' || surname AS full_name, phone
            FROM employees
            WHERE role = 'admin'
            ORDER BY name, surname
            "#,
        )
        .fetch_all(self.pool())
        .await?;

        rows.iter()
            .map(|row| {
                Ok::<_, StoreError>(AdminContact {
                    name: row.try_get("full_name")?,
                    phone: row.try_get("phone")?,
                })
            })
            .collect()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Soft-delete
    // ─────────────────────────────────────────────────────────────────────────

    /// Move an employee to `deleted_employees`, keeping the password hash.
    pub async fn soft_delete_employee(&self, ci: &str) -> StoreResult<()> {
        let mut tx = self.begin_write().await?;

        let row = sqlx::query("SELECT id, role FROM employees WHERE ci = ?1")
            .bind(ci.trim())
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("employee with CI {}", ci.trim())))?;
        let id: i64 = row.try_get("id")?;
        let role: String = row.try_get("role")?;

        if role == Role::Admin.as_str() && count_admins(&mut tx).await? <= 1 {
            return Err(DomainError::invariant("cannot delete the last administrator").into());
        }

        sqlx::query(
            r#"
            INSERT INTO deleted_employees
                (id, ci, name, surname, phone, password_hash, role, created_at, deleted_at)
            SELECT id, ci, name, surname, phone, password_hash, role, created_at, ?2
            FROM employees WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(format_timestamp(Utc::now()))
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM employees WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::info!(employee_id = id, "employee soft-deleted");
        Ok(())
    }

    /// Deleted employees, most recently deleted first.
    pub async fn list_deleted_employees(&self, search: Option<&str>) -> StoreResult<Vec<DeletedEmployee>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {EMPLOYEE_COLUMNS}, deleted_at FROM deleted_employees
            WHERE ?1 IS NULL
               OR name LIKE ?1 ESCAPE '\'
               OR surname LIKE ?1 ESCAPE '\'
               OR ci LIKE ?1 ESCAPE '\'
            ORDER BY deleted_at DESC, id DESC
            "#
        ))
        .bind(like_pattern(search))
        .fetch_all(self.pool())
        .await?;
        rows.iter().map(deleted_employee_from_row).collect()
    }

    /// Move the most recently deleted employee with `ci` back, with its original
    /// id and password hash.
    pub async fn restore_employee(&self, ci: &str) -> StoreResult<Employee> {
        let ci = ci.trim();
        let mut tx = self.begin_write().await?;

        let id: i64 = sqlx::query_scalar(
            "SELECT id FROM deleted_employees WHERE ci = ?1 ORDER BY deleted_at DESC, id DESC LIMIT 1",
        )
        .bind(ci)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DomainError::not_found(format!("deleted employee with CI {ci}")))?;

        let taken: Option<i64> = sqlx::query_scalar("SELECT id FROM employees WHERE ci = ?1")
            .bind(ci)
            .fetch_optional(&mut *tx)
            .await?;
        if taken.is_some() {
            return Err(DomainError::conflict(format!("CI {ci} belongs to an active employee")).into());
        }

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO employees (id, ci, name, surname, phone, password_hash, role, created_at)
            SELECT id, ci, name, surname, phone, password_hash, role, created_at
            FROM deleted_employees WHERE id = ?1
            RETURNING {EMPLOYEE_COLUMNS}
            "#
        ))
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
        let employee = employee_from_row(&row)?;

        sqlx::query("DELETE FROM deleted_employees WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::info!(employee_id = id, "employee restored");
        Ok(employee)
    }

    /// Permanently remove every deleted record with `ci`.
    pub async fn purge_employee(&self, ci: &str) -> StoreResult<u64> {
        let ci = ci.trim();
        let result = sqlx::query("DELETE FROM deleted_employees WHERE ci = ?1")
            .bind(ci)
            .execute(self.pool())
            .await?;
        if result.rows_affected() == 0 {
            return Err(DomainError::not_found(format!("deleted employee with CI {ci}")).into());
        }
        tracing::info!(purged = result.rows_affected(), "deleted employee purged");
        Ok(result.rows_affected())
    }
}
