pub mod constants;
pub mod crypto;
pub mod link;
pub mod types;
pub mod xml;
