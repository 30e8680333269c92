pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod object_id;
pub mod server;
pub mod store;
pub mod translation;
