pub mod activity;
pub mod backend;
pub mod chat;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod render;
