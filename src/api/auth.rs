//! Authentication calls and role-claim extraction
//!
//! Login posts credentials to the role-specific endpoint and returns the
//! bearer token together with the role the backend embedded in it. The JWT
//! is decoded without signature verification: this client is not the token's
//! verifier, it only mirrors what the backend put there.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;

use super::dto::{IdentityResponse, LoginRequest, LoginResponse};
use super::{ApiClient, ApiError};
use crate::models::Role;

/// Result of a successful login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: String,
    /// Role as embedded in the token's `rol` claim
    pub role: Role,
}

#[derive(Debug, Deserialize)]
struct RoleClaims {
    #[serde(default)]
    rol: Option<String>,
}

impl ApiClient {
    /// Authenticate against the role-specific login endpoint
    pub async fn login(
        &self,
        role: Role,
        email: &str,
        password: &str,
    ) -> Result<LoginOutcome, ApiError> {
        let path = match role {
            Role::Admin => "/api/admin/loginAdmin",
            Role::User => "/api/users/login",
        };

        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };

        let response = self
            .client
            .post(self.url(path))
            .json(&body)
            .send()
            .await
            .map_err(Self::transport_error)?;

        let response = Self::check(response).await?;
        let login: LoginResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;

        if !login.success {
            return Err(ApiError::LoginFailed(
                login
                    .message
                    .unwrap_or_else(|| "Credenciales incorrectas".to_string()),
            ));
        }

        let token = login
            .token
            .ok_or_else(|| ApiError::Decode("login response missing token".to_string()))?;
        let role = role_from_token(&token)?;

        tracing::info!(%role, "Login succeeded");
        Ok(LoginOutcome { token, role })
    }

    /// Fetch the authenticated identity's control number
    pub async fn identity(&self, role: Role) -> Result<IdentityResponse, ApiError> {
        let path = match role {
            Role::Admin => "/api/admin/getAdminData",
            Role::User => "/api/users/getUserData",
        };

        let response = self
            .client
            .get(self.url(path))
            .bearer_auth(self.bearer()?)
            .send()
            .await
            .map_err(Self::transport_error)?;

        Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

/// Read the role from the JWT's `rol` claim, without verifying the signature
pub fn role_from_token(token: &str) -> Result<Role, ApiError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.set_required_spec_claims::<&str>(&[]);

    let data = decode::<RoleClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map_err(|e| ApiError::Decode(format!("token claims: {}", e)))?;

    data.claims
        .rol
        .as_deref()
        .ok_or_else(|| ApiError::Decode("token has no rol claim".to_string()))?
        .parse::<Role>()
        .map_err(ApiError::Decode)
}
