pub mod adapters;
pub mod config;
pub mod error;
pub mod screening;
pub mod web;
