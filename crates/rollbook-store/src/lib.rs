// ABOUTME: Persistence backends for rollbook beyond the in-memory provider in rollbook-core.
// ABOUTME: Provides the crash-safe filesystem storage used by the command-line front end.

pub mod file;

pub use file::FileStorage;
