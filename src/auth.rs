use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, header, request::Parts},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{
    config::{AppConfig, Env},
    error::{AppError, AppResult},
    menu::ADMIN_ROLE,
    models::RoleInfo,
    repository::{Repository, RepositoryState},
};

/// Claims
///
/// Payload of the bearer tokens issued by `POST /login`, signed with the
/// configured HS256 secret.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the `sys_user.id` of the token holder.
    pub sub: i64,
    pub exp: usize,
    pub iat: usize,
}

/// AuthUser
///
/// The resolved identity of an authenticated request: the user id plus the
/// enabled roles loaded at extraction time.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
    pub roles: Vec<RoleInfo>,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(|role| role.value == ADMIN_ROLE)
    }

    /// ensure_permission
    ///
    /// Admins pass unconditionally. Everyone else needs `code` among the
    /// permission codes reachable through their roles, otherwise `403`.
    pub async fn ensure_permission(&self, repo: &dyn Repository, code: &str) -> AppResult<()> {
        if self.is_admin() {
            return Ok(());
        }

        let codes = repo.permission_codes_for_user(self.id).await?;
        if codes.iter().any(|granted| granted == code) {
            Ok(())
        } else {
            tracing::warn!(user_id = self.id, permission = code, "permission denied");
            Err(AppError::Forbidden)
        }
    }
}

fn now_secs() -> usize {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as usize)
        .unwrap_or_default()
}

/// issue_token
///
/// Signs a token for `user_id` valid for `config.token_ttl_hours`.
pub fn issue_token(user_id: i64, config: &AppConfig) -> AppResult<String> {
    let iat = now_secs();
    let claims = Claims {
        sub: user_id,
        iat,
        exp: iat + (config.token_ttl_hours as usize) * 3600,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("token signing failed: {e}")))
}

/// Loads an enabled user and its roles, or rejects with 401.
async fn resolve(repo: &RepositoryState, user_id: i64) -> Result<AuthUser, StatusCode> {
    let user = match repo.get_user(user_id).await {
        Ok(Some(user)) if user.is_enabled() => user,
        Ok(_) => return Err(StatusCode::UNAUTHORIZED),
        Err(e) => {
            tracing::error!(error = %e, user_id, "failed to load user during authentication");
            return Err(StatusCode::UNAUTHORIZED);
        }
    };

    let roles = repo.get_user_roles(user.id).await.map_err(|e| {
        tracing::error!(error = %e, user_id, "failed to load roles during authentication");
        StatusCode::UNAUTHORIZED
    })?;

    Ok(AuthUser {
        id: user.id,
        username: user.username,
        roles,
    })
}

/// AuthUser Extractor Implementation
///
/// 1. In `Env::Local`, a numeric `x-user-id` header naming an existing user
///    authenticates directly.
/// 2. Otherwise a `Bearer` token is required and validated (signature and
///    expiry).
/// 3. The user must still exist and be enabled; roles are loaded fresh.
///
/// Rejection: `StatusCode::UNAUTHORIZED` on any failure.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let repo = RepositoryState::from_ref(state);
        let config = AppConfig::from_ref(state);

        if config.env == Env::Local {
            let bypass_id = parts
                .headers
                .get("x-user-id")
                .and_then(|value| value.to_str().ok())
                .and_then(|raw| raw.trim().parse::<i64>().ok());

            if let Some(user_id) = bypass_id {
                if let Ok(user) = resolve(&repo, user_id).await {
                    return Ok(user);
                }
            }
        }

        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(StatusCode::UNAUTHORIZED)?;

        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());
        let mut validation = Validation::default();
        validation.validate_exp = true;

        let token_data = decode::<Claims>(token, &decoding_key, &validation).map_err(|e| {
            tracing::debug!(error = %e, "rejected bearer token");
            StatusCode::UNAUTHORIZED
        })?;

        resolve(&repo, token_data.claims.sub).await
    }
}
