//! Integration tests
//!
//! Drive the full router (middleware, handlers, store, rooms) in memory.
