//! Workspace integration tests.

mod helpers;

mod cli_test;
mod pipeline_test;
