use sqlx::PgPool;

use crate::dto::auth_dto::{LoginRequest, LoginResponse};
use crate::error::{Error, Result};
use crate::models::user::{Account, Role};
use crate::utils::crypto::verify_pin;
use crate::utils::token::issue_session_token;

#[derive(Clone)]
pub struct AuthService {
    pool: PgPool,
}

impl AuthService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_account(&self, role: Role, email: &str) -> Result<Option<Account>> {
        let sql = match role {
            Role::Student => r#"SELECT id, name, email, pin_hash, created_at FROM students WHERE lower(email) = lower($1)"#,
            Role::Coach => r#"SELECT id, name, email, pin_hash, created_at FROM coaches WHERE lower(email) = lower($1)"#,
        };
        let account = sqlx::query_as::<_, Account>(sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(account)
    }

    pub async fn login(&self, req: &LoginRequest) -> Result<LoginResponse> {
        let invalid = || Error::Unauthorized("invalid_credentials".to_string());

        let account = self.find_account(req.role, &req.email).await?.ok_or_else(invalid)?;
        let ok = verify_pin(&req.pin, &account.pin_hash).map_err(|e| {
            tracing::error!(account_id = %account.id, error = %e, "stored PIN hash is malformed");
            Error::Internal("credential check failed".to_string())
        })?;
        if !ok {
            tracing::info!(role = req.role.as_str(), "login rejected");
            return Err(invalid());
        }

        let config = crate::config::get_config();
        let (token, expires_at) =
            issue_session_token(&config.jwt_secret, account.id, req.role, config.jwt_ttl_hours)?;

        tracing::info!(user_id = %account.id, role = req.role.as_str(), "login succeeded");
        Ok(LoginResponse {
            token,
            expires_at,
            user_id: account.id,
            name: account.name,
            role: req.role,
        })
    }
}
