pub mod engine;
pub mod shell;
