//! CLI subcommands

pub mod new;
