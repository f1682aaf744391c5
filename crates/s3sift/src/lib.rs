//! s3sift - filter gzip-compressed JSON Lines objects in S3.
//!
//! This crate provides both a CLI application and a library for running a
//! server-side S3 Select filter against one object and streaming the
//! matching records to an output sink.

#![forbid(unsafe_code)]

// Public modules for library usage
pub mod app;
pub mod config;
pub mod error;
pub mod filter;
pub mod locator;
pub mod service;

// Public CLI module (needed by binary)
pub mod cli;
