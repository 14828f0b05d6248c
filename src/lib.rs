//! Turn a curated selection of bibliography entries into a static HTML publication list.

pub mod authors;
pub mod badge;
pub mod config;
pub mod customize;
pub mod entry;
pub mod error;
pub mod identifier;
pub mod library;
pub mod page;
pub mod pipeline;
pub mod render;
pub mod resolver;
pub mod selector;
pub mod text;

pub use error::{Error, Result};
