//! Command handlers -- one module per subcommand

pub mod import;
pub mod rules;
