use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};

use savora_auth_types::identity::IdentityHeaders;
use savora_domain::user::RoleTag;

use crate::domain::types::{OauthPayload, ProviderKind, RequestContext, TokenPair, User};
use crate::error::AuthServiceError;
use crate::state::AppState;
use crate::usecase::code::{GenerateCodeUseCase, VerifyCodeUseCase};
use crate::usecase::oauth::{GoogleStrategy, OauthRegistry};
use crate::usecase::recovery::{RecoveryConfirmInput, RecoveryConfirmUseCase, RecoveryInitUseCase};
use crate::usecase::signin::{SignInInput, SignInUseCase};
use crate::usecase::signup::{SignUpInput, SignUpInitUseCase, SignUpUseCase};
use crate::usecase::token::{RefreshAccessTokenUseCase, SignOutUseCase};

// ── Response shapes ──────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub is_active: bool,
    pub is_super: bool,
    pub roles: Vec<RoleTag>,
    #[serde(serialize_with = "savora_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "savora_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            username: user.username,
            email: user.email,
            is_active: user.is_active,
            is_super: user.is_super,
            roles: user.roles,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Serialize)]
pub struct TokenPairResponse {
    pub access_token: String,
    pub access_token_exp: u64,
    pub refresh_token: String,
}

impl From<TokenPair> for TokenPairResponse {
    fn from(pair: TokenPair) -> Self {
        Self {
            access_token: pair.access_token,
            access_token_exp: pair.access_token_exp,
            refresh_token: pair.refresh_token,
        }
    }
}

#[derive(Serialize)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub tokens: TokenPairResponse,
}

// ── POST /auth/signup/code ───────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SignUpInitRequest {
    pub email: String,
}

pub async fn sign_up_init(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(body): Json<SignUpInitRequest>,
) -> Result<impl IntoResponse, AuthServiceError> {
    let usecase = SignUpInitUseCase {
        users: state.user_repo(),
        codes: GenerateCodeUseCase {
            codes: state.code_repo(),
            code_length: state.code_length,
        },
        mailer: state.mailer(),
        audit: state.audit(),
    };
    usecase.execute(&body.email, &ctx).await?;
    Ok(StatusCode::ACCEPTED)
}

// ── POST /auth/signup ────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub code: String,
}

pub async fn sign_up(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(body): Json<SignUpRequest>,
) -> Result<impl IntoResponse, AuthServiceError> {
    let usecase = SignUpUseCase {
        users: state.user_repo(),
        codes: VerifyCodeUseCase {
            codes: state.code_repo(),
        },
        tokens: state.token_repo(),
        notifier: state.notifier(),
        audit: state.audit(),
        issuer: state.issuer.clone(),
        password_secret: state.password_secret.clone(),
    };
    let out = usecase
        .execute(
            SignUpInput {
                email: body.email,
                password: body.password,
                first_name: body.first_name,
                last_name: body.last_name,
                code: body.code,
            },
            &ctx,
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: out.user.into(),
            tokens: out.tokens.into(),
        }),
    ))
}

// ── POST /auth/signin ────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SignInRequest {
    pub username: String,
    pub password: String,
}

pub async fn sign_in(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(body): Json<SignInRequest>,
) -> Result<impl IntoResponse, AuthServiceError> {
    let usecase = SignInUseCase {
        users: state.user_repo(),
        tokens: state.token_repo(),
        audit: state.audit(),
        issuer: state.issuer.clone(),
        password_secret: state.password_secret.clone(),
    };
    let out = usecase
        .execute(
            SignInInput {
                username: body.username,
                password: body.password,
            },
            &ctx,
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: out.user.into(),
            tokens: out.tokens.into(),
        }),
    ))
}

// ── DELETE /auth/signout ─────────────────────────────────────────────────────

pub async fn sign_out(
    State(state): State<AppState>,
    identity: IdentityHeaders,
    ctx: RequestContext,
) -> Result<impl IntoResponse, AuthServiceError> {
    let usecase = SignOutUseCase {
        tokens: state.token_repo(),
        audit: state.audit(),
    };
    usecase.execute(identity.user_id, &ctx).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── PATCH /auth/token ────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

#[derive(Serialize)]
pub struct AccessTokenResponse {
    pub access_token: String,
    pub access_token_exp: u64,
}

pub async fn refresh_token(
    State(state): State<AppState>,
    Json(body): Json<RefreshTokenRequest>,
) -> Result<impl IntoResponse, AuthServiceError> {
    let usecase = RefreshAccessTokenUseCase {
        users: state.user_repo(),
        tokens: state.token_repo(),
        issuer: state.issuer.clone(),
    };
    let out = usecase.execute(&body.refresh_token).await?;
    Ok((
        StatusCode::CREATED,
        Json(AccessTokenResponse {
            access_token: out.access_token,
            access_token_exp: out.access_token_exp,
        }),
    ))
}

// ── POST /auth/recovery/code ─────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RecoveryInitRequest {
    pub username: String,
}

pub async fn recovery_init(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(body): Json<RecoveryInitRequest>,
) -> Result<impl IntoResponse, AuthServiceError> {
    let usecase = RecoveryInitUseCase {
        users: state.user_repo(),
        codes: GenerateCodeUseCase {
            codes: state.code_repo(),
            code_length: state.code_length,
        },
        mailer: state.mailer(),
        audit: state.audit(),
    };
    usecase.execute(&body.username, &ctx).await?;
    Ok(StatusCode::ACCEPTED)
}

// ── POST /auth/recovery ──────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RecoveryConfirmRequest {
    pub username: String,
    pub code: String,
    pub new_password: String,
}

pub async fn recovery_confirm(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(body): Json<RecoveryConfirmRequest>,
) -> Result<impl IntoResponse, AuthServiceError> {
    let usecase = RecoveryConfirmUseCase {
        users: state.user_repo(),
        codes: VerifyCodeUseCase {
            codes: state.code_repo(),
        },
        notifier: state.notifier(),
        audit: state.audit(),
        password_secret: state.password_secret.clone(),
    };
    usecase
        .execute(
            RecoveryConfirmInput {
                username: body.username,
                code: body.code,
                new_password: body.new_password,
            },
            &ctx,
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── POST /auth/oauth ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct OauthLoginRequest {
    pub provider: ProviderKind,
    pub id_token: String,
}

pub async fn oauth_login(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(body): Json<OauthLoginRequest>,
) -> Result<impl IntoResponse, AuthServiceError> {
    let google = GoogleStrategy {
        verifier: state.google_verifier(),
        users: state.user_repo(),
        tokens: state.token_repo(),
        notifier: state.notifier(),
        audit: state.audit(),
        issuer: state.issuer.clone(),
        password_secret: state.password_secret.clone(),
    };
    let registry = OauthRegistry::new(Some(google));
    let out = registry
        .login(
            &OauthPayload {
                provider: body.provider,
                id_token: body.id_token,
            },
            &ctx,
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: out.user.into(),
            tokens: out.tokens.into(),
        }),
    ))
}
