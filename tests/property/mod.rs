//! Property-based tests

mod ordering_proptest;
mod permissions_proptest;
