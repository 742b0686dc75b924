//! Integration tests against an in-memory database

mod ledger_tests;
mod reports_tests;
