//! Random order books for load testing and property checks.

pub mod book_generator;
