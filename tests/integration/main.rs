//! End-to-end tests driving the full router against the in-memory
//! metadata store and the in-memory remote tree.

mod helpers;

mod auth_test;
mod file_test;
mod folder_test;
mod user_test;
