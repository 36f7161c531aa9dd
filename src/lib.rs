//! JSON Extractor — pull a name, email and phone number out of free text.
//!
//! The text is sent to an OpenAI chat model using one of two strategies
//! (strict JSON schema or a forced function call). The reply is checked for
//! a well-formed email, turned into a [`record::Record`], and appended to a
//! JSON-lines log.

#![forbid(unsafe_code)]

pub mod config;
pub mod credentials;
pub mod logging;
pub mod providers;

pub mod extract;
pub mod record;
pub mod validate;

pub mod session;
pub mod shell;
pub mod store;
