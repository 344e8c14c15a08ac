// crates/server/src/routes/mod.rs
pub mod download;
pub mod generate;
pub mod health;
pub mod jobs;
pub mod meta;
pub mod status;
