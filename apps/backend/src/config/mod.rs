pub mod app;
pub mod db;

pub use app::Config;
pub use db::{DbKind, DbSettings};
