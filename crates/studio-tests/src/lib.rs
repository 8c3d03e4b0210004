//! Integration test crate for Studio.
//!
//! This crate exists solely to hold cross-crate integration tests.
//! It drives the editing engine through its public surface only.

#[cfg(test)]
mod support;

#[cfg(test)]
mod timeline;

#[cfg(test)]
mod history;

#[cfg(test)]
mod persistence;

#[cfg(test)]
mod properties;
