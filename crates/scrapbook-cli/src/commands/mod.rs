pub mod add;
pub mod browse;
pub mod common;
pub mod completions;
pub mod config;
pub mod delete;
pub mod edit;
pub mod export;
pub mod favorite;
pub mod list;
pub mod show;
pub mod trash;
pub mod upload;
