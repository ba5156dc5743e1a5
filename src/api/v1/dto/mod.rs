pub mod headers;
pub mod settings;
