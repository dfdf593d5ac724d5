pub mod callback;
pub mod client_secret;
pub mod credentials;
pub(crate) mod endpoints;
pub mod service;
