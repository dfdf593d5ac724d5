pub mod inference;
pub mod quote;
