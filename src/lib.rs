pub mod app;
pub mod error;
pub mod models;
pub mod overseerr;
pub mod requests;
