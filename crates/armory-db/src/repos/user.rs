//! User repository.
//!
//! Users are acting identities for audit records. Authentication happens
//! before the service is called; user changes are not themselves audited.

use armory_core::entities::User;
use armory_core::enums::UserRole;
use armory_core::errors::CoreError;
use armory_core::ids::PREFIX_USER;
use armory_core::pagination::{PageRequest, Paginated};
use chrono::Utc;

use crate::error::DatabaseError;
use crate::helpers::{parse_datetime, parse_enum};
use crate::repos::ListQuery;
use crate::service::ArmoryService;

const USER_COLUMNS: &str = "u.id, u.name, u.email, u.role, u.created_at";

fn row_to_user(row: &libsql::Row) -> Result<User, DatabaseError> {
    Ok(User {
        id: row.get::<String>(0)?,
        name: row.get::<String>(1)?,
        email: row.get::<String>(2)?,
        role: parse_enum(&row.get::<String>(3)?)?,
        created_at: parse_datetime(&row.get::<String>(4)?)?,
    })
}

impl ArmoryService {
    /// # Errors
    ///
    /// Returns `DatabaseError::Validation` for a blank name or malformed
    /// email, or `DatabaseError` if the INSERT fails (e.g. duplicate email).
    pub async fn create_user(
        &self,
        name: &str,
        email: &str,
        role: UserRole,
    ) -> Result<User, DatabaseError> {
        CoreError::require_name("name", name)?;
        let email = email.trim();
        if !email.contains('@') {
            return Err(DatabaseError::Validation(format!(
                "email '{email}' is not an address"
            )));
        }
        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_USER).await?;

        self.db()
            .execute(
                "INSERT INTO users (id, name, email, role, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
                libsql::params![id.as_str(), name, email, role.as_str(), now.to_rfc3339()],
            )
            .await?;

        Ok(User {
            id,
            name: name.to_string(),
            email: email.to_string(),
            role,
            created_at: now,
        })
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if no user has that id.
    pub async fn get_user(&self, id: &str) -> Result<User, DatabaseError> {
        let mut rows = self
            .db()
            .query(
                &format!("SELECT {USER_COLUMNS} FROM users u WHERE u.id = ?1"),
                [id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_user(&row)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn find_and_count_users(
        &self,
        name_contains: Option<&str>,
        page: PageRequest,
    ) -> Result<Paginated<User>, DatabaseError> {
        let query = ListQuery::new("users u", USER_COLUMNS, "u.name, u.id")
            .name_contains("u.name", name_contains);
        self.find_and_count(query, page, row_to_user).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::test_service;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn create_and_get() {
        let svc = test_service().await;
        let user = svc
            .create_user("Ada", " ada@example.com ", UserRole::Admin)
            .await
            .unwrap();

        assert!(user.id.starts_with("usr-"));
        assert_eq!(user.email, "ada@example.com");
        assert_eq!(svc.get_user(&user.id).await.unwrap(), user);
    }

    #[tokio::test]
    async fn duplicate_email_fails() {
        let svc = test_service().await;
        svc.create_user("Ada", "ada@example.com", UserRole::Editor)
            .await
            .unwrap();
        let err = svc
            .create_user("Ada Two", "ada@example.com", UserRole::Editor)
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::LibSql(_)));
    }

    #[tokio::test]
    async fn malformed_email_is_rejected() {
        let svc = test_service().await;
        let err = svc
            .create_user("Ada", "not-an-address", UserRole::Editor)
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::Validation(_)));
    }

    #[tokio::test]
    async fn find_and_count_lists_users() {
        let svc = test_service().await;
        svc.create_user("Ada", "ada@example.com", UserRole::Editor)
            .await
            .unwrap();
        svc.create_user("Grace", "grace@example.com", UserRole::Admin)
            .await
            .unwrap();

        let page = svc
            .find_and_count_users(Some("gra"), PageRequest::first(10))
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].name, "Grace");
    }
}
