pub mod app;
pub mod commit;
pub mod config;
pub mod filter;
pub mod fs_utils;
pub mod image_utils;
pub mod library;
pub mod logging;
pub mod source;
pub mod staging;
pub mod ui;
