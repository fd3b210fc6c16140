pub mod app;
pub mod config;
pub mod display;
pub mod dom;
pub mod export;
pub mod latex;
pub mod message;
pub mod paths;
pub mod render;
pub mod spacing;
