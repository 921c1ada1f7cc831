pub mod api;
pub mod config;
pub mod db;
pub mod directory;
pub mod docs;
pub mod engine;
pub mod error;
pub mod model;
pub mod money;
pub mod period;
pub mod routes;
