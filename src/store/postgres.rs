//! PostgreSQL-backed [`IdentityStore`] (`sql/schema.sql`).

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use sqlx::{postgres::PgRow, PgPool, Row};
use tracing::{info_span, Instrument};

use super::{IdentityStore, StoreError, StoreResult};
use crate::identity::models::{Identity, NewIdentity, Role};

const SELECT_COLUMNS: &str =
    "SELECT id, first_name, email, phone_number, password_hash, role, is_active FROM users";

#[derive(Clone)]
pub struct PgIdentityStore {
    pool: PgPool,
}

impl PgIdentityStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_one<T>(&self, clause: &str, value: T) -> StoreResult<Option<Identity>>
    where
        T: for<'q> sqlx::Encode<'q, sqlx::Postgres> + sqlx::Type<sqlx::Postgres> + Send + 'static,
    {
        let query = format!("{SELECT_COLUMNS} WHERE {clause} = $1");
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query.as_str()
        );
        let row = sqlx::query(&query)
            .bind(value)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to lookup identity")?;

        row.map(|row| identity_from_row(&row)).transpose()
    }
}

fn identity_from_row(row: &PgRow) -> StoreResult<Identity> {
    let role: String = row.get("role");
    let role: Role = role
        .parse()
        .map_err(|err: String| StoreError::Backend(anyhow!(err)))?;
    Ok(Identity {
        id: row.get("id"),
        first_name: row.get("first_name"),
        email: row.get("email"),
        phone_number: row.get("phone_number"),
        password_hash: row.get("password_hash"),
        role,
        is_active: row.get("is_active"),
    })
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

#[async_trait]
impl IdentityStore for PgIdentityStore {
    async fn insert(&self, identity: NewIdentity) -> StoreResult<Identity> {
        let query = r"
            INSERT INTO users
                (first_name, email, phone_number, password_hash, role, is_active)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
        ";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        let result = sqlx::query(query)
            .bind(&identity.first_name)
            .bind(&identity.email)
            .bind(&identity.phone_number)
            .bind(&identity.password_hash)
            .bind(identity.role.as_str())
            .bind(identity.is_active)
            .fetch_one(&self.pool)
            .instrument(span)
            .await;

        let row = match result {
            Ok(row) => row,
            Err(err) if is_unique_violation(&err) => return Err(StoreError::Conflict),
            Err(err) => return Err(anyhow::Error::new(err).context("failed to insert identity").into()),
        };

        Ok(Identity {
            id: row.get("id"),
            first_name: identity.first_name,
            email: identity.email,
            phone_number: identity.phone_number,
            password_hash: identity.password_hash,
            role: identity.role,
            is_active: identity.is_active,
        })
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Identity>> {
        self.find_one("email", email.to_string()).await
    }

    async fn find_by_phone(&self, phone_number: &str) -> StoreResult<Option<Identity>> {
        self.find_one("phone_number", phone_number.to_string()).await
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<Identity>> {
        self.find_one("id", id).await
    }

    async fn save(&self, identity: &Identity) -> StoreResult<()> {
        let query = r"
            UPDATE users
            SET first_name = $2,
                password_hash = $3,
                is_active = $4,
                updated_at = NOW()
            WHERE id = $1
        ";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "UPDATE",
            db.statement = query
        );
        let result = sqlx::query(query)
            .bind(identity.id)
            .bind(&identity.first_name)
            .bind(&identity.password_hash)
            .bind(identity.is_active)
            .execute(&self.pool)
            .instrument(span)
            .await
            .context("failed to update identity")?;

        if result.rows_affected() == 0 {
            return Err(anyhow!("identity {} no longer exists", identity.id).into());
        }
        Ok(())
    }

    async fn ping(&self) -> StoreResult<()> {
        let query = "SELECT 1";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        sqlx::query(query)
            .execute(&self.pool)
            .instrument(span)
            .await
            .context("database ping failed")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::error::{DatabaseError, ErrorKind};
    use std::{borrow::Cow, error::Error as StdError, fmt};

    #[derive(Debug)]
    struct TestDbError {
        code: Option<&'static str>,
    }

    impl fmt::Display for TestDbError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "test database error")
        }
    }

    impl StdError for TestDbError {}

    impl DatabaseError for TestDbError {
        fn message(&self) -> &'static str {
            "test database error"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            self.code.map(Cow::Borrowed)
        }

        fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            ErrorKind::UniqueViolation
        }
    }

    #[test]
    fn unique_violation_is_sqlstate_23505() {
        let err = sqlx::Error::Database(Box::new(TestDbError {
            code: Some("23505"),
        }));
        assert!(is_unique_violation(&err));

        let err = sqlx::Error::Database(Box::new(TestDbError {
            code: Some("23503"),
        }));
        assert!(!is_unique_violation(&err));

        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
    }
}
