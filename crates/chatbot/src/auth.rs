//! Identity and sign-in.
//!
//! [`AuthContext`] is the explicit "who is calling" value handed to every
//! operation that stamps `user_id`/`created_by` or checks a role. It starts
//! anonymous, becomes authenticated on [`AuthContext::login`] and returns to
//! anonymous on [`AuthContext::logout`]. [`Authenticator`] backs that
//! lifecycle with password checks and bearer sessions in the database.

use database::validation::{validate_email, validate_required};
use database::{account, session, Account, AccountRole, Database, DatabaseError, NewAccount};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::AuthError;

/// Minimum accepted password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// The authenticated account behind a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: AccountRole,
}

impl From<Account> for Identity {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            email: account.email,
            name: account.name,
            role: account.role,
        }
    }
}

/// Current caller; anonymous unless logged in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthContext {
    identity: Option<Identity>,
}

impl AuthContext {
    /// A context with no identity.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A context already holding an identity.
    pub fn authenticated(identity: Identity) -> Self {
        Self {
            identity: Some(identity),
        }
    }

    /// Attach an identity, replacing any previous one.
    pub fn login(&mut self, identity: Identity) {
        self.identity = Some(identity);
    }

    /// Drop the identity and return it.
    pub fn logout(&mut self) -> Option<Identity> {
        self.identity.take()
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Account ID to stamp on records, `None` when anonymous.
    pub fn user_id(&self) -> Option<&str> {
        self.identity.as_ref().map(|i| i.id.as_str())
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    /// Admin or staff.
    pub fn is_staff(&self) -> bool {
        self.identity.as_ref().is_some_and(|i| i.role.is_staff())
    }

    pub fn is_admin(&self) -> bool {
        self.identity
            .as_ref()
            .is_some_and(|i| i.role == AccountRole::Admin)
    }

    /// The identity, or `Unauthenticated`.
    pub fn require_identity(&self) -> Result<&Identity, AuthError> {
        self.identity.as_ref().ok_or(AuthError::Unauthenticated)
    }

    /// The identity if it is staff or admin.
    pub fn require_staff(&self) -> Result<&Identity, AuthError> {
        let identity = self.require_identity()?;
        if !identity.role.is_staff() {
            return Err(AuthError::Forbidden("staff"));
        }
        Ok(identity)
    }

    /// The identity if it is an admin.
    pub fn require_admin(&self) -> Result<&Identity, AuthError> {
        let identity = self.require_identity()?;
        if identity.role != AccountRole::Admin {
            return Err(AuthError::Forbidden("admin"));
        }
        Ok(identity)
    }
}

/// Hash a password with bcrypt at the given cost.
pub fn hash_password(password: &str, cost: u32) -> Result<String, AuthError> {
    bcrypt::hash(password, cost).map_err(|e| AuthError::Hashing(e.to_string()))
}

/// Check a password against a bcrypt hash. Malformed hashes never verify.
pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

/// Password sign-in and bearer sessions over the account tables.
#[derive(Debug, Clone)]
pub struct Authenticator {
    db: Database,
    cost: u32,
}

impl Authenticator {
    pub fn new(db: Database) -> Self {
        Self::with_cost(db, bcrypt::DEFAULT_COST)
    }

    /// Use a custom bcrypt cost (lower in tests).
    pub fn with_cost(db: Database, cost: u32) -> Self {
        Self { db, cost }
    }

    /// Create an account with a hashed password.
    pub async fn register(
        &self,
        email: &str,
        name: &str,
        role: AccountRole,
        password: &str,
    ) -> Result<Identity, AuthError> {
        validate_email(email)?;
        validate_required("name", name, 120)?;
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AuthError::Validation(database::ValidationError::InvalidFormat {
                field: "password".to_string(),
                reason: format!("must have at least {} characters", MIN_PASSWORD_LENGTH),
            }));
        }

        let password_hash = self.hash_blocking(password.to_string()).await?;
        let account = account::create_account(
            self.db.pool(),
            &NewAccount {
                email: email.to_string(),
                name: name.to_string(),
                role,
                password_hash,
            },
        )
        .await?;

        info!(account = %account.id, role = %account.role, "Account registered");
        Ok(account.into())
    }

    /// Verify credentials and open a session.
    ///
    /// Returns the bearer token and the identity it resolves to.
    pub async fn login(&self, email: &str, password: &str) -> Result<(String, Identity), AuthError> {
        let account = match account::get_account_by_email(self.db.pool(), email).await {
            Ok(account) => account,
            Err(DatabaseError::NotFound { .. }) => {
                warn!("Login attempt for unknown account");
                return Err(AuthError::InvalidCredentials);
            }
            Err(err) => return Err(err.into()),
        };

        let hash = account.password_hash.clone();
        let password = password.to_string();
        let valid = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|e| AuthError::Hashing(e.to_string()))?;

        if !valid {
            warn!(account = %account.id, "Login attempt with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let session = session::create_session(self.db.pool(), &account.id).await?;
        info!(account = %account.id, "Session opened");

        Ok((session.token, account.into()))
    }

    /// Close a session. Returns false when the token was unknown.
    pub async fn logout(&self, token: &str) -> Result<bool, AuthError> {
        Ok(session::delete_session(self.db.pool(), token).await?)
    }

    /// Resolve a bearer token into a context; unknown tokens yield `None`.
    pub async fn resolve(&self, token: &str) -> Result<Option<AuthContext>, AuthError> {
        let account = session::get_session_account(self.db.pool(), token).await?;
        Ok(account.map(|a| AuthContext::authenticated(a.into())))
    }

    async fn hash_blocking(&self, password: String) -> Result<String, AuthError> {
        let cost = self.cost;
        tokio::task::spawn_blocking(move || hash_password(&password, cost))
            .await
            .map_err(|e| AuthError::Hashing(e.to_string()))?
    }
}
