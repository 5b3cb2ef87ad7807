//! Admin authentication: password hashing, signed session tokens and the
//! gateway that ties them to the admin store.

mod error;
pub mod password;
pub mod token;

pub use error::*;
pub use token::{SessionClaims, TokenSigner};

use chrono::Utc;
use tracing::{info, instrument, warn};

use crate::admin_actor::AdminError;
use crate::clients::AdminClient;
use crate::domain::{Admin, AdminCreate};

/// A freshly issued session.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub username: String,
}

#[derive(Clone)]
pub struct AuthGateway {
    admins: AdminClient,
    signer: TokenSigner,
}

async fn blocking<R: Send + 'static>(
    work: impl FnOnce() -> Result<R, AuthError> + Send + 'static,
) -> Result<R, AuthError> {
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AuthError::Hashing(e.to_string()))?
}

impl AuthGateway {
    pub fn new(admins: AdminClient, signer: TokenSigner) -> Self {
        Self { admins, signer }
    }

    /// Creates an admin account. Fails when the username is already taken.
    #[instrument(skip(self, password))]
    pub async fn bootstrap_admin(&self, username: &str, password: &str) -> Result<Admin, AuthError> {
        let username = username.trim().to_string();
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::InvalidRequest("Username and password are required".into()));
        }
        let secret = password.to_string();
        let password_hash = blocking(move || password::hash_password(&secret)).await?;

        match self
            .admins
            .create_admin(AdminCreate {
                username,
                password_hash,
            })
            .await
        {
            Ok(admin) => {
                info!(admin_id = %admin.id, "Admin created");
                Ok(admin)
            }
            Err(AdminError::AlreadyExists(_)) => {
                Err(AuthError::InvalidRequest("Admin already exists".into()))
            }
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<Session, AuthError> {
        let Some(admin) = self.admins.find_by_username(username.trim()).await? else {
            warn!("Login for unknown user");
            return Err(AuthError::InvalidCredentials);
        };
        let secret = password.to_string();
        let stored = admin.password_hash.clone();
        if !blocking(move || password::verify_password(&secret, &stored)).await? {
            warn!("Login with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.signer.issue(&admin.id, &admin.username, Utc::now())?;
        info!(admin_id = %admin.id, "Logged in");
        Ok(Session {
            token,
            username: admin.username,
        })
    }

    pub fn verify(&self, token: &str) -> Result<SessionClaims, AuthError> {
        self.signer.verify(token, Utc::now())
    }
}
