pub mod gmail_api;
pub mod inference_api;
