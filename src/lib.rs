//! School directory client core
//!
//! Multi-image submission (selection buffer, two-phase upload/create) and
//! the listing view with its per-record image carousel.

pub mod api;
pub mod app;
pub mod carousel;
pub mod cli;
pub mod config;
pub mod error;
pub mod form;
pub mod listing;
pub mod scanner;
pub mod selection;
pub mod server;
pub mod upload;
pub mod validate;
pub mod view;
