pub mod base;
pub mod bedrock;
