//! Shared functionality
//!
//! This crate supplies the character stream and source location types that the cascara
//! tokenizer and parser are built upon.
//!

pub mod byte_stream;
