pub mod admin;
pub mod audit;
pub mod code;
pub mod notify;
pub mod oauth;
pub mod password;
pub mod recovery;
pub mod signin;
pub mod signup;
pub mod token;
