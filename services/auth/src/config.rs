/// Auth service configuration loaded from environment variables.
///
/// Loaded once in `main`; no component reads the environment after startup.
#[derive(Debug)]
pub struct AuthConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// Redis connection URL.
    pub redis_url: String,
    /// HMAC secret for signing JWT access and refresh tokens.
    pub jwt_secret: String,
    /// HMAC secret keying the password digest.
    pub password_secret: String,
    /// Access token lifetime as a `\d+[smhd]` string (default "15m").
    pub access_token_ttl: String,
    /// Refresh token lifetime as a `\d+[smhd]` string (default "7d").
    pub refresh_token_ttl: String,
    /// One-time code length in digits (default 5). Env var: `CODE_LENGTH`.
    pub code_length: usize,
    /// OAuth client id the Google ID-token audience must match.
    pub google_client_id: String,
    /// TCP port to listen on (default 4112). Env var: `AUTH_PORT`.
    pub auth_port: u16,
}

impl AuthConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL"),
            redis_url: std::env::var("REDIS_URL").expect("REDIS_URL"),
            jwt_secret: std::env::var("JWT_SECRET").expect("JWT_SECRET"),
            password_secret: std::env::var("PASSWORD_SECRET").expect("PASSWORD_SECRET"),
            access_token_ttl: std::env::var("ACCESS_TOKEN_TTL")
                .unwrap_or_else(|_| "15m".to_owned()),
            refresh_token_ttl: std::env::var("REFRESH_TOKEN_TTL")
                .unwrap_or_else(|_| "7d".to_owned()),
            code_length: std::env::var("CODE_LENGTH")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
            google_client_id: std::env::var("GOOGLE_CLIENT_ID").expect("GOOGLE_CLIENT_ID"),
            auth_port: std::env::var("AUTH_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(4112),
        }
    }
}
