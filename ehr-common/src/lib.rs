#![recursion_limit = "1024"]

#[macro_use]
extern crate slog;
#[macro_use]
extern crate slog_scope;

pub mod codec;
pub mod dashboard;
pub mod db;
pub mod errors;
pub mod logging;
pub mod mapper;
pub mod models;
pub mod records;
pub mod sample;
pub mod schema;
pub mod util;

#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    logging::init_test_logging();
}
