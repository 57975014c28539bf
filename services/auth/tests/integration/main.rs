
mod audit_test;
mod cache_test;
mod code_test;
mod oauth_test;
mod recovery_test;
mod signin_test;
