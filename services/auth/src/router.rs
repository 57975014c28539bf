use axum::{
    Router,
    routing::{delete, get, patch, post},
};
use tower_http::trace::TraceLayer;

use savora_core::health::{healthz, readyz};
use savora_core::middleware::{propagate_request_id_layer, set_request_id_layer};

use crate::handlers::{
    admin::{delete_user, deactivate_user, get_activity, get_user, list_users, update_user},
    auth::{
        oauth_login, recovery_confirm, recovery_init, refresh_token, sign_in, sign_out, sign_up,
        sign_up_init,
    },
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Sign-up
        .route("/auth/signup/code", post(sign_up_init))
        .route("/auth/signup", post(sign_up))
        // Sessions
        .route("/auth/signin", post(sign_in))
        .route("/auth/signout", delete(sign_out))
        .route("/auth/token", patch(refresh_token))
        // Recovery
        .route("/auth/recovery/code", post(recovery_init))
        .route("/auth/recovery", post(recovery_confirm))
        // Federated login
        .route("/auth/oauth", post(oauth_login))
        // Admin
        .route("/admin/users", get(list_users))
        .route("/admin/users/{id}", get(get_user))
        .route("/admin/users/{id}", patch(update_user))
        .route("/admin/users/{id}", delete(delete_user))
        .route("/admin/users/{id}/deactivate", post(deactivate_user))
        .route("/admin/activity", get(get_activity))
        .layer(TraceLayer::new_for_http())
        .layer(propagate_request_id_layer())
        .layer(set_request_id_layer())
        .with_state(state)
}
