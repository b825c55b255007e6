//! Library side of the `itemdoc` command line tool.

pub mod commands;
pub mod logging;
