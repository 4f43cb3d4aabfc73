//! Row model and queries for the `users` table.

use super::{StorageError, UserStore};
use sqlx::{
    query::QueryAs,
    sqlite::{Sqlite, SqliteArguments},
    FromRow,
};
use tracing::{debug, info_span, Instrument};

const USER_COLUMNS: &str =
    "id, full_name, phone, email, password, role, otp, is_verified, created_at";

type UserQuery<'q, O> = QueryAs<'q, Sqlite, O, SqliteArguments<'q>>;

/// A persisted user row.
#[derive(FromRow, Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    /// Argon2 PHC string.
    pub password: Option<String>,
    pub role: Option<String>,
    pub otp: String,
    pub is_verified: bool,
    pub created_at: String,
}

/// Values for a full row insert. `None` columns are written as NULL.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: String,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    pub otp: String,
    pub is_verified: bool,
}

/// Columns that may appear in a filter or an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserField {
    Id,
    FullName,
    Phone,
    Email,
    Password,
    Role,
    Otp,
    IsVerified,
}

impl UserField {
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::FullName => "full_name",
            Self::Phone => "phone",
            Self::Email => "email",
            Self::Password => "password",
            Self::Role => "role",
            Self::Otp => "otp",
            Self::IsVerified => "is_verified",
        }
    }

    const fn is_mutable(self) -> bool {
        !matches!(self, Self::Id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Bool(bool),
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Conjunction of exact-match comparisons.
///
/// Column names come from [`UserField`], never from callers, so the generated
/// SQL only ever interpolates static identifiers; values are always bound.
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    conditions: Vec<(UserField, FieldValue)>,
}

impl UserFilter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn eq(mut self, field: UserField, value: impl Into<FieldValue>) -> Self {
        self.conditions.push((field, value.into()));
        self
    }

    fn where_clause(&self) -> String {
        if self.conditions.is_empty() {
            return String::new();
        }

        let predicates: Vec<String> = self
            .conditions
            .iter()
            .map(|(field, _)| format!("{} = ?", field.column()))
            .collect();

        format!(" WHERE {}", predicates.join(" AND "))
    }

    /// Bind every condition value, in `where_clause` order.
    fn bind<'q, O>(&'q self, statement: UserQuery<'q, O>) -> UserQuery<'q, O> {
        self.conditions
            .iter()
            .fold(statement, |statement, (_, value)| match value {
                FieldValue::Text(text) => statement.bind(text.as_str()),
                FieldValue::Bool(flag) => statement.bind(*flag),
            })
    }
}

impl UserStore {
    /// Insert a full user row.
    ///
    /// # Errors
    /// `StorageError::ConstraintViolation` when the phone (or id) is taken,
    /// `StorageError::Fault` for anything else.
    pub async fn insert(&self, user: &NewUser) -> Result<(), StorageError> {
        let query = r"
            INSERT INTO users
                (id, full_name, phone, email, password, role, otp, is_verified)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        ";
        let span = info_span!(
            "db.query",
            db.system = "sqlite",
            db.operation = "INSERT",
            db.statement = query
        );
        sqlx::query(query)
            .bind(&user.id)
            .bind(&user.full_name)
            .bind(&user.phone)
            .bind(&user.email)
            .bind(&user.password)
            .bind(&user.role)
            .bind(&user.otp)
            .bind(user.is_verified)
            .execute(&self.pool)
            .instrument(span)
            .await
            .map_err(StorageError::classify)?;

        Ok(())
    }

    /// Return at most one user matching `filter`.
    ///
    /// # Errors
    /// Returns `StorageError::Fault` if the query fails.
    pub async fn find_one(&self, filter: &UserFilter) -> Result<Option<User>, StorageError> {
        let query = format!(
            "SELECT {USER_COLUMNS} FROM users{} LIMIT 1",
            filter.where_clause()
        );
        let span = info_span!(
            "db.query",
            db.system = "sqlite",
            db.operation = "SELECT",
            db.statement = query.as_str()
        );

        let user = filter
            .bind(sqlx::query_as::<_, User>(&query))
            .fetch_optional(&self.pool)
            .instrument(span)
            .await?;

        Ok(user)
    }

    /// Return every user matching `filter`, oldest first.
    ///
    /// # Errors
    /// Returns `StorageError::Fault` if the query fails.
    pub async fn find_all(&self, filter: &UserFilter) -> Result<Vec<User>, StorageError> {
        let query = format!(
            "SELECT {USER_COLUMNS} FROM users{} ORDER BY created_at, rowid",
            filter.where_clause()
        );
        let span = info_span!(
            "db.query",
            db.system = "sqlite",
            db.operation = "SELECT",
            db.statement = query.as_str()
        );

        let users = filter
            .bind(sqlx::query_as::<_, User>(&query))
            .fetch_all(&self.pool)
            .instrument(span)
            .await?;

        Ok(users)
    }

    /// Set one column of the row identified by `id`.
    ///
    /// A missing id is not an error; the returned count is 0 in that case.
    ///
    /// # Errors
    /// `StorageError::Immutable` for the `id` column, otherwise the classified
    /// driver error.
    pub async fn update_field(
        &self,
        id: &str,
        field: UserField,
        value: impl Into<FieldValue>,
    ) -> Result<u64, StorageError> {
        if !field.is_mutable() {
            return Err(StorageError::Immutable(field.column()));
        }

        let query = format!("UPDATE users SET {} = ? WHERE id = ?", field.column());
        let span = info_span!(
            "db.query",
            db.system = "sqlite",
            db.operation = "UPDATE",
            db.statement = query.as_str()
        );

        let statement = match value.into() {
            FieldValue::Text(text) => sqlx::query(&query).bind(text),
            FieldValue::Bool(flag) => sqlx::query(&query).bind(flag),
        };

        let result = statement
            .bind(id)
            .execute(&self.pool)
            .instrument(span)
            .await
            .map_err(StorageError::classify)?;

        if result.rows_affected() == 0 {
            debug!(user_id = id, column = field.column(), "update matched no rows");
        }

        Ok(result.rows_affected())
    }
}
