// User Database Model
// Stored users, the password-free projection returned to clients, and the
// request bodies accepted by the users API.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::schema::users;

/// User database model - queryable from database
///
/// Deliberately not `Serialize`: anything leaving the service goes through
/// [`PublicUser`], which has no password field.
#[derive(Clone, PartialEq, Queryable, Selectable, Identifiable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password: String,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub is_business: bool,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("is_business", &self.is_business)
            .field("is_admin", &self.is_admin)
            .finish_non_exhaustive()
    }
}

/// New user for insertion
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub id: Uuid,
    pub email: String,
    pub password: String,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub is_business: bool,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NewUser {
    /// Build an insertable row from validated registration data and an
    /// already-hashed password
    pub fn from_registration(request: RegisterRequest, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email: normalize_email(&request.email),
            password: password_hash,
            name: request.name,
            phone: request.phone,
            is_business: request.is_business.unwrap_or(false),
            is_admin: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Materialize the row as it will be stored
    pub fn into_user(self) -> User {
        User {
            id: self.id,
            email: self.email,
            password: self.password,
            name: self.name,
            phone: self.phone,
            is_business: self.is_business,
            is_admin: self.is_admin,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Profile update applied by `PUT /users/{id}`
///
/// `None` fields are left untouched, matching "set what was sent" semantics.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
pub struct UserChanges {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub is_business: Option<bool>,
    pub updated_at: DateTime<Utc>,
}

impl UserChanges {
    pub fn from_request(request: RegisterRequest, password_hash: String) -> Self {
        Self {
            email: normalize_email(&request.email),
            password: password_hash,
            name: request.name,
            phone: request.phone,
            is_business: request.is_business,
            updated_at: Utc::now(),
        }
    }

    /// Apply the changes to an in-memory record
    pub fn apply_to(&self, user: &mut User) {
        user.email = self.email.clone();
        user.password = self.password.clone();
        if let Some(name) = &self.name {
            user.name = Some(name.clone());
        }
        if let Some(phone) = &self.phone {
            user.phone = Some(phone.clone());
        }
        if let Some(is_business) = self.is_business {
            user.is_business = is_business;
        }
        user.updated_at = self.updated_at;
    }
}

/// Client-facing view of a user. Has no password field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub is_business: bool,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            phone: user.phone,
            is_business: user.is_business,
            is_admin: user.is_admin,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Registration body, also used for full profile updates
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RegisterRequest {
    #[validate(
        email(message = "must be a valid email address"),
        length(max = 320, message = "must be at most 320 characters")
    )]
    pub email: String,

    #[validate(length(min = 6, max = 128, message = "must be between 6 and 128 characters"))]
    pub password: String,

    #[validate(length(min = 1, max = 255, message = "must be between 1 and 255 characters"))]
    pub name: Option<String>,

    #[validate(length(min = 1, max = 32, message = "must be between 1 and 32 characters"))]
    pub phone: Option<String>,

    pub is_business: Option<bool>,
}

/// Login credentials. Never persisted.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,

    #[validate(length(min = 1, message = "is required"))]
    pub password: String,
}

/// Emails are unique case-insensitively; store them trimmed and lower-cased
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl User {
    /// List every user, oldest first
    pub async fn find_all(conn: &mut AsyncPgConnection) -> QueryResult<Vec<Self>> {
        use crate::schema::users::dsl::*;

        users
            .order(created_at.asc())
            .select(User::as_select())
            .load(conn)
            .await
    }

    /// Find user by ID
    pub async fn find_by_id(
        conn: &mut AsyncPgConnection,
        user_id: Uuid,
    ) -> QueryResult<Option<Self>> {
        use crate::schema::users::dsl::*;

        users
            .find(user_id)
            .select(User::as_select())
            .first(conn)
            .await
            .optional()
    }

    /// Find user by normalized email
    pub async fn find_by_email(
        conn: &mut AsyncPgConnection,
        email_str: &str,
    ) -> QueryResult<Option<Self>> {
        use crate::schema::users::dsl::*;

        users
            .filter(email.eq(email_str))
            .select(User::as_select())
            .first(conn)
            .await
            .optional()
    }

    /// Create a new user
    pub async fn create(conn: &mut AsyncPgConnection, new_user: &NewUser) -> QueryResult<Self> {
        use crate::schema::users::dsl::*;

        diesel::insert_into(users)
            .values(new_user)
            .returning(User::as_returning())
            .get_result(conn)
            .await
    }

    /// Update user, returning the stored row
    pub async fn update(
        conn: &mut AsyncPgConnection,
        user_id: Uuid,
        changes: &UserChanges,
    ) -> QueryResult<Option<Self>> {
        use crate::schema::users::dsl::*;

        diesel::update(users.find(user_id))
            .set(changes)
            .returning(User::as_returning())
            .get_result(conn)
            .await
            .optional()
    }

    /// Flip the business flag in a single statement
    pub async fn toggle_business(
        conn: &mut AsyncPgConnection,
        user_id: Uuid,
    ) -> QueryResult<Option<Self>> {
        use crate::schema::users::dsl::*;

        diesel::update(users.find(user_id))
            .set((
                is_business.eq(diesel::dsl::not(is_business)),
                updated_at.eq(Utc::now()),
            ))
            .returning(User::as_returning())
            .get_result(conn)
            .await
            .optional()
    }

    /// Grant the admin flag
    pub async fn promote_to_admin(
        conn: &mut AsyncPgConnection,
        user_id: Uuid,
    ) -> QueryResult<Option<Self>> {
        use crate::schema::users::dsl::*;

        diesel::update(users.find(user_id))
            .set((is_admin.eq(true), updated_at.eq(Utc::now())))
            .returning(User::as_returning())
            .get_result(conn)
            .await
            .optional()
    }

    /// Delete user, returning the removed row
    pub async fn delete(conn: &mut AsyncPgConnection, user_id: Uuid) -> QueryResult<Option<Self>> {
        use crate::schema::users::dsl::*;

        diesel::delete(users.find(user_id))
            .returning(User::as_returning())
            .get_result(conn)
            .await
            .optional()
    }
}
