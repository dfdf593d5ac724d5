pub mod api;
pub mod config;
pub mod error;
pub mod google_oauth;
pub mod http;
pub mod mail;
pub mod pipeline;
pub mod report;
pub mod scrape;
pub mod service;
pub mod types;

pub use error::DigestError;
pub use google_oauth::credentials::GoogleCredential;
pub use google_oauth::service::GoogleAuthFlow;
pub use pipeline::{Pipeline, ReportSettings};
