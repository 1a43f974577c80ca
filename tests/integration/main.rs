//! Integration tests for framemerge

mod cli_parse;
mod http_transport;
mod merge_scenarios;
mod support;
