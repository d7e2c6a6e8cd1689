pub mod file;
pub mod sanitize;
pub mod stdin;
