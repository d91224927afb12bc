// User Service
// Registration, credential checks and profile mutations. Every storage
// outcome is classified here so handlers only ever see `ApiError`.

use std::sync::Arc;
use tokio::sync::OnceCell;
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::UserStore,
    models::{normalize_email, NewUser, PublicUser, RegisterRequest, User, UserChanges},
    services::JwtService,
    utils::{
        api_error::ApiError,
        password::{self, PasswordConfig},
    },
};

const BAD_CREDENTIALS: &str = "Bad credentials";
const TIMING_PLACEHOLDER: &str = "placeholder-password-for-unknown-accounts";

pub struct UserService {
    store: Arc<dyn UserStore>,
    jwt: Arc<JwtService>,
    password_config: PasswordConfig,
    /// Verified against on unknown emails so both login failures cost one Argon2 run
    placeholder_hash: OnceCell<String>,
}

impl UserService {
    pub fn new(
        store: Arc<dyn UserStore>,
        jwt: Arc<JwtService>,
        password_config: PasswordConfig,
    ) -> Self {
        Self {
            store,
            jwt,
            password_config,
            placeholder_hash: OnceCell::new(),
        }
    }

    /// Argon2id hash computed on the blocking pool
    pub async fn hash_password(&self, plain: &str) -> Result<String, ApiError> {
        Ok(password::hash_password(plain.to_string(), self.password_config).await?)
    }

    /// Register a new account. Never grants admin.
    pub async fn create_user(&self, request: RegisterRequest) -> Result<PublicUser, ApiError> {
        let password_hash = self.hash_password(&request.password).await?;
        let user = self
            .store
            .insert(NewUser::from_registration(request, password_hash))
            .await?;

        tracing::info!(user_id = %user.id, "New user registered");
        Ok(user.into())
    }

    /// Check credentials and issue a session token
    ///
    /// Unknown email and wrong password are indistinguishable to the caller,
    /// in the response body and in the password work done.
    pub async fn validate_user(&self, email: &str, password: &str) -> Result<String, ApiError> {
        let user = match self.store.find_by_email(&normalize_email(email)).await? {
            Some(user) => user,
            None => {
                let placeholder = self
                    .placeholder_hash
                    .get_or_try_init(|| self.hash_password(TIMING_PLACEHOLDER))
                    .await?;
                password::verify_password_async(password.to_string(), placeholder.clone())
                    .await?;

                tracing::debug!("Login attempt for unknown email");
                return Err(ApiError::unauthorized(BAD_CREDENTIALS));
            },
        };

        let verified =
            password::verify_password_async(password.to_string(), user.password.clone()).await?;
        if !verified {
            tracing::debug!(user_id = %user.id, "Login attempt with wrong password");
            return Err(ApiError::unauthorized(BAD_CREDENTIALS));
        }

        Ok(self.jwt.issue_for(&user)?)
    }

    pub async fn list_users(&self) -> Result<Vec<PublicUser>, ApiError> {
        let users = self.store.list().await?;
        Ok(users.into_iter().map(PublicUser::from).collect())
    }

    pub async fn get_user(&self, id: Uuid) -> Result<PublicUser, ApiError> {
        self.store
            .find_by_id(id)
            .await?
            .map(PublicUser::from)
            .ok_or_else(ApiError::user_not_found)
    }

    /// Replace the profile with a validated registration body. The new
    /// password is hashed before it reaches the store.
    pub async fn replace_user(
        &self,
        id: Uuid,
        request: RegisterRequest,
    ) -> Result<PublicUser, ApiError> {
        let password_hash = self.hash_password(&request.password).await?;
        let changes = UserChanges::from_request(request, password_hash);

        self.store
            .update(id, changes)
            .await?
            .map(PublicUser::from)
            .ok_or_else(ApiError::user_not_found)
    }

    pub async fn delete_user(&self, id: Uuid) -> Result<PublicUser, ApiError> {
        let deleted = self
            .store
            .delete(id)
            .await?
            .ok_or_else(ApiError::user_not_found)?;

        tracing::info!(user_id = %deleted.id, "Deleted user");
        Ok(deleted.into())
    }

    pub async fn toggle_business(&self, id: Uuid) -> Result<PublicUser, ApiError> {
        let user = self
            .store
            .toggle_business(id)
            .await?
            .ok_or_else(ApiError::user_not_found)?;

        tracing::info!(user_id = %user.id, is_business = user.is_business, "Business status updated");
        Ok(user.into())
    }

    /// Make sure an admin account exists for `email`
    ///
    /// Creates the account when missing and promotes it when present. The
    /// password of an existing account is left alone.
    pub async fn ensure_admin(&self, email: &str, password: &str) -> Result<PublicUser, ApiError> {
        let email = normalize_email(email);

        let existing: Option<User> = self.store.find_by_email(&email).await?;
        let user = match existing {
            Some(user) if user.is_admin => return Ok(user.into()),
            Some(user) => user,
            None => {
                let request = RegisterRequest {
                    email: email.clone(),
                    password: password.to_string(),
                    name: None,
                    phone: None,
                    is_business: None,
                };
                request.validate()?;

                let password_hash = self.hash_password(password).await?;
                self.store
                    .insert(NewUser::from_registration(request, password_hash))
                    .await?
            },
        };

        let admin = self
            .store
            .promote_to_admin(user.id)
            .await?
            .ok_or_else(ApiError::user_not_found)?;

        tracing::info!(user_id = %admin.id, "Bootstrap admin ensured");
        Ok(admin.into())
    }
}
