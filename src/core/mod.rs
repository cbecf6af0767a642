pub mod app;
pub mod chat_stream;
pub mod config;
pub mod load_indicator;
pub mod message;
pub mod models;
pub mod session;
pub mod user;
pub mod vendor;
