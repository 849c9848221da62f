//! Integration tests for the foldertree virtual hierarchy

mod cli_commands;
mod snapshot_roundtrip;
