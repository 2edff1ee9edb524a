pub mod loader;
pub mod parse;
