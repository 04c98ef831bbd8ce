//! Building blocks of a deployment.
//!
//! `source` decides where the constitution comes from, `install` and
//! `wrappers` write it out; everything else is shared plumbing.

pub mod assets;
pub mod config;
pub mod digest;
pub mod error;
pub mod fetch;
pub mod fs;
pub mod install;
pub mod manifest;
pub mod output;
pub mod prompt;
pub mod source;
pub mod target;
pub mod validate;
pub mod wrappers;
