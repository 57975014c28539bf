use serde::Deserialize;

use crate::domain::repository::IdTokenVerifier;
use crate::domain::types::ExternalIdentity;
use crate::error::AuthServiceError;

const TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";

/// Verifies Google ID tokens against the tokeninfo endpoint. Google checks
/// the signature and expiry; the audience check against our client id
/// happens here.
#[derive(Clone)]
pub struct GoogleTokenVerifier {
    pub http: reqwest::Client,
    pub client_id: String,
}

/// Subset of the tokeninfo response. All values arrive as strings.
#[derive(Debug, Deserialize)]
struct TokeninfoResponse {
    aud: String,
    sub: String,
    email: Option<String>,
    given_name: Option<String>,
    family_name: Option<String>,
}

impl IdTokenVerifier for GoogleTokenVerifier {
    async fn verify(&self, id_token: &str) -> Result<ExternalIdentity, AuthServiceError> {
        let response = self
            .http
            .get(TOKENINFO_URL)
            .query(&[("id_token", id_token)])
            .send()
            .await
            .map_err(|e| AuthServiceError::Internal(anyhow::Error::new(e).context("tokeninfo request")))?;

        // Google answers 4xx for invalid, expired or tampered tokens.
        if !response.status().is_success() {
            return Err(AuthServiceError::Unauthorized);
        }

        let claims: TokeninfoResponse = response
            .json()
            .await
            .map_err(|e| AuthServiceError::Internal(anyhow::Error::new(e).context("tokeninfo body")))?;

        if claims.aud != self.client_id {
            return Err(AuthServiceError::Unauthorized);
        }

        let email = claims
            .email
            .filter(|e| !e.is_empty())
            .ok_or(AuthServiceError::Unauthorized)?;

        Ok(ExternalIdentity {
            subject: claims.sub,
            email,
            given_name: claims.given_name,
            family_name: claims.family_name,
        })
    }
}
