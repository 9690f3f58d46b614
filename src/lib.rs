//! webrec turns a recorded browser session into a Selenium RSpec script.
//!
//! A [`host::Host`] exposes frames and their DOM, browser events are routed
//! through [`recorder::EventRouter`], and every user action becomes one
//! statement written by [`recorder::StatementEmitter`].

pub mod cli;
pub mod commands;
pub mod config;
pub mod dom;
pub mod error;
pub mod host;
pub mod recorder;
