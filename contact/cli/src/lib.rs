pub mod cli;
pub mod invoker;
