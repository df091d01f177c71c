pub mod embedding;
pub mod filter;
pub mod redact;
pub mod search;
pub mod store;
pub mod system;
