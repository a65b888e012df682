//! Consolidated test utilities and helpers for the OpenAQ city collector.
//!
//! Config builders, JSON fixtures shaped like OpenAQ v3 payloads, record
//! builders and a wiremock-backed fake API.

#![cfg(test)]

pub mod builders;
pub mod config;
pub mod mocks;
