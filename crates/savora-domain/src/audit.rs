//! Audit trail domain types.

use serde::{Deserialize, Serialize};

/// Security-relevant event kind recorded in the audit log.
///
/// Wire format: snake_case string (audit rows outlive code, so the string
/// form is the contract — never reuse or renumber these).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    SignUpInit,
    SignUpSuccess,
    SignUpFailed,
    SignInSuccess,
    SignInFailed,
    SignOut,
    RecoveryInit,
    RecoveryConfirmSuccess,
    RecoveryConfirmFailed,
    OauthLoginSuccess,
    OauthLoginFailed,
    OauthRegistrationSuccess,
    OauthRegistrationFailed,
}

impl AuditAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SignUpInit => "sign_up_init",
            Self::SignUpSuccess => "sign_up_success",
            Self::SignUpFailed => "sign_up_failed",
            Self::SignInSuccess => "sign_in_success",
            Self::SignInFailed => "sign_in_failed",
            Self::SignOut => "sign_out",
            Self::RecoveryInit => "recovery_init",
            Self::RecoveryConfirmSuccess => "recovery_confirm_success",
            Self::RecoveryConfirmFailed => "recovery_confirm_failed",
            Self::OauthLoginSuccess => "oauth_login_success",
            Self::OauthLoginFailed => "oauth_login_failed",
            Self::OauthRegistrationSuccess => "oauth_registration_success",
            Self::OauthRegistrationFailed => "oauth_registration_failed",
        }
    }

    /// Actions counted as a registration in the activity-by-day aggregation.
    pub fn registration_actions() -> &'static [AuditAction] {
        &[Self::SignUpSuccess, Self::OauthRegistrationSuccess]
    }

    /// Actions counted as a login in the activity-by-day aggregation.
    pub fn login_actions() -> &'static [AuditAction] {
        &[Self::SignInSuccess, Self::OauthLoginSuccess]
    }
}
