pub mod credential_manager;
pub mod enricher;
pub mod token_cache;
