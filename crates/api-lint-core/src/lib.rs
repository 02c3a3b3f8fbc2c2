//! # api-lint-core
//!
//! Core framework for linting API type declarations against Kubernetes-style
//! API conventions.
//!
//! The input is a type-checked declaration model (see [`model`]) produced by
//! an external front-end. This crate provides the substrate every rule builds
//! on:
//!
//! - [`markers`]: marker registry and parser
//! - [`resolve`]: type resolution through pointers, aliases and named types
//! - [`constraints`]: validation-constraint extraction with field/type precedence
//! - [`zero`]: the zero-value validity oracle
//! - [`serialization`]: the shared pointer/`omitempty` decision table
//!
//! and the framework around it: the [`Rule`] trait, the [`Analyzer`] and
//! [`Violation`] reporting.
//!
//! ## Example
//!
//! ```ignore
//! use api_lint_core::{Analyzer, Config};
//!
//! let analyzer = Analyzer::builder()
//!     .root("./dumps")
//!     .config(Config::default())
//!     .rule(MyRule::new())
//!     .build()?;
//!
//! let result = analyzer.analyze()?;
//! for violation in &result.violations {
//!     println!("{violation}");
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod analyzer;
mod config;
mod context;
mod rule;
mod types;

pub mod constraints;
pub mod markers;
pub mod model;
pub mod resolve;
pub mod serialization;
pub mod tags;
pub mod visit;
pub mod zero;

pub use analyzer::{Analyzer, AnalyzerBuilder, AnalyzerError};
pub use config::{AnalyzerConfig, Config, ConfigError, MarkersConfig, RuleConfig};
pub use context::{DeclInfo, FieldInfo, FileContext};
pub use rule::{Rule, RuleBox};
pub use types::{LintResult, Location, Severity, Suggestion, Violation};
