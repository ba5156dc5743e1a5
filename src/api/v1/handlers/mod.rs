pub mod headers;
pub mod health;
pub mod page;
pub mod settings;
