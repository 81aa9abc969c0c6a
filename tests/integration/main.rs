//! HTTP-level tests against the in-memory milestone store.

mod helpers;
mod link_test;
mod milestone_test;
mod revision_test;
