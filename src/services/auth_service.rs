//! Authentication service - Login by RUT or email and JWT handling.
//!
//! Every login attempt is written to `auditoria_login`, successful or not.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::config::{Config, SECONDS_PER_HOUR, TOKEN_TYPE_BEARER};
use crate::domain::{NuevoIntentoLogin, Password, Rut, Usuario, UsuarioResponse};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;

/// Verified against when the account does not exist, so both paths cost one bcrypt check
const DUMMY_HASH: &str = "$2b$10$N9qo8uLOickgx2ZMRZoMyeIjZAgcfl7p92ldGxad68LJZdL17lhWy";

/// JWT claims payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: i32,
    pub rut: String,
    pub rol: String,
    pub exp: i64,
    pub iat: i64,
}

/// Returned after a successful login
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    /// JWT access token
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub access_token: String,
    /// Token type (always "Bearer")
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Token expiration time in seconds
    #[schema(example = 43200)]
    pub expires_in: i64,
    pub usuario: UsuarioResponse,
}

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Login with a RUT or an email and return a JWT.
    ///
    /// `ip` is the client address recorded with the attempt.
    async fn login(
        &self,
        identificador: String,
        password: String,
        ip: Option<String>,
    ) -> AppResult<LoginResponse>;

    /// The account behind a verified token
    async fn me(&self, usuario_id: i32) -> AppResult<Usuario>;

    /// Verify JWT token and extract claims
    fn verify_token(&self, token: &str) -> AppResult<Claims>;
}

/// Generate JWT token for a user
fn generate_token(usuario: &Usuario, config: &Config) -> AppResult<(String, i64)> {
    let now = Utc::now();
    let expires_at = now + Duration::hours(config.jwt_expiration_hours);

    let claims = Claims {
        sub: usuario.id,
        rut: usuario.rut.clone(),
        rol: usuario.rol.clone(),
        exp: expires_at.timestamp(),
        iat: now.timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret_bytes()),
    )?;

    Ok((token, config.jwt_expiration_hours * SECONDS_PER_HOUR))
}

/// Verify JWT token and extract claims
fn verify_token_internal(token: &str, config: &Config) -> AppResult<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret_bytes()),
        &Validation::default(),
    )?;

    Ok(token_data.claims)
}

/// Concrete implementation of AuthService using Unit of Work.
pub struct Authenticator<U: UnitOfWork> {
    uow: Arc<U>,
    config: Config,
}

impl<U: UnitOfWork> Authenticator<U> {
    /// Create new auth service instance with Unit of Work
    pub fn new(uow: Arc<U>, config: Config) -> Self {
        Self { uow, config }
    }

    /// Resolve the account by email (contains `@`) or by RUT.
    async fn buscar(&self, identificador: &str) -> AppResult<Option<Usuario>> {
        if identificador.contains('@') {
            return self.uow.usuarios().find_by_email(identificador).await;
        }
        match Rut::parse(identificador) {
            Ok(rut) => self.uow.usuarios().find_by_rut(rut.as_str()).await,
            Err(_) => Ok(None),
        }
    }

    async fn registrar_intento(&self, intento: NuevoIntentoLogin) {
        if let Err(e) = self.uow.auditoria().registrar_login(intento).await {
            tracing::error!("Failed to record login attempt: {}", e);
        }
    }
}

#[async_trait]
impl<U: UnitOfWork> AuthService for Authenticator<U> {
    async fn login(
        &self,
        identificador: String,
        password: String,
        ip: Option<String>,
    ) -> AppResult<LoginResponse> {
        let identificador = identificador.trim().to_string();
        let usuario = self.buscar(&identificador).await?;

        let hash = usuario
            .as_ref()
            .map(|u| u.password_hash.clone())
            .unwrap_or_else(|| DUMMY_HASH.to_string());
        let password_valid = Password::from_hash(hash).verify(&password);

        let exito = password_valid && usuario.as_ref().is_some_and(|u| u.activo);
        self.registrar_intento(NuevoIntentoLogin {
            usuario_id: usuario.as_ref().map(|u| u.id),
            identificador: identificador.clone(),
            exito,
            ip,
        })
        .await;

        match usuario {
            Some(usuario) if password_valid && usuario.activo => {
                let (access_token, expires_in) = generate_token(&usuario, &self.config)?;
                tracing::info!("User {} logged in", usuario.id);
                Ok(LoginResponse {
                    access_token,
                    token_type: TOKEN_TYPE_BEARER.to_string(),
                    expires_in,
                    usuario: UsuarioResponse::from(usuario),
                })
            }
            Some(usuario) if password_valid => {
                tracing::warn!("Inactive user {} tried to log in", usuario.id);
                Err(AppError::Forbidden)
            }
            _ => {
                tracing::debug!("Rejected login for {}", identificador);
                Err(AppError::InvalidCredentials)
            }
        }
    }

    async fn me(&self, usuario_id: i32) -> AppResult<Usuario> {
        let usuario = self
            .uow
            .usuarios()
            .find_by_id(usuario_id)
            .await?
            .ok_or_not_found("Usuario")?;
        if !usuario.activo {
            return Err(AppError::Unauthorized);
        }
        Ok(usuario)
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        verify_token_internal(token, &self.config)
    }
}
