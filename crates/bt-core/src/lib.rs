//! Core engine for Xcode build timelines.
//!
//! This crate contains the non-UI pipeline:
//! - Lexing: tokenizing the SLF serialization of `.xcactivitylog` files
//! - Activity log parsing: rebuilding the raw section/message object graph
//! - Build steps: projecting sections into a typed step tree
//! - Events: filtering the step tree into presentation-ready events
//! - Dependencies: parsing Xcode's target graph dump and linking it to events
//! - Timeline analytics: concurrency, periods and blocker detection

pub mod activity;
pub mod build_step;
pub mod dependency;
mod error;
pub mod event;
pub mod filter;
pub mod lexer;
mod log;
pub mod project;
pub mod serde_duration;
pub mod step_type;
pub mod time;
pub mod timeline;

#[cfg(test)]
mod testutil;

pub use build_step::{BuildStep, StepKind};
pub use dependency::{Dependency, ManifestParse, parse_manifest, parse_manifest_file};
pub use error::BuildLogError;
pub use event::{Event, ModuleKind};
pub use filter::{CacheVisibility, FilterSettings};
pub use lexer::{LexError, Lexer, SlfWriter, Token, tokenize};
pub use log::BuildLog;
pub use project::{Project, ProjectError, ProjectReference};
pub use step_type::{DetailStepType, UnknownStepType};
pub use timeline::Period;
