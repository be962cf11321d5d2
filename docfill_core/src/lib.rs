//! `docfill_core` is the core library for the [docfill](https://github.com/kirmef/docfill) document templater. It pairs a JSON data mapping with a text/HTML/markdown template containing `{key}` placeholders, substitutes values into the template, classifies document content, and round-trips both sides through file import and export without ever losing a user edit.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Document text + JSON data
//!   → Classifier (ordered content sniffing picks an advisory syntax mode)
//!   → Templater (single-pass {key} substitution, unmatched keys untouched)
//!   → Session (explicit state transitions: edits, imports, exports)
//! ```
//!
//! ## Modules
//!
//! - [`content_type`] — Content-type classification from document text and
//!   filename extensions, plus export MIME selection.
//! - [`data`] — The tagged data mapping: a parsed JSON object or the
//!   preserved raw text of an invalid edit.
//! - [`engine`] — The placeholder templater: substitution, occurrence
//!   listing, and missing-key reporting.
//! - [`session`] — One editing session with pure transitions and the
//!   superseded-import guard.
//! - [`config`] — Configuration loading from `docfill.toml`.
//!
//! ## Key Types
//!
//! - [`ContentType`] — Advisory syntax classification (html, markdown, text, pdf).
//! - [`DataMapping`] — Valid JSON object or preserved invalid text.
//! - [`Placeholder`] — A `{key}` occurrence with its span and position.
//! - [`Session`] — Document + mapping state with explicit transitions.
//! - [`DocfillConfig`] — Configuration loaded from `docfill.toml`.
//!
//! ## Quick Start
//!
//! ```rust
//! use docfill_core::DataMapping;
//! use docfill_core::classify;
//! use docfill_core::substitute;
//!
//! let mapping = DataMapping::parse(r#"{"name": "Kir"}"#);
//! assert_eq!(substitute("Hello {name}", &mapping), "Hello Kir");
//! assert_eq!(substitute("Hello {missing}", &mapping), "Hello {missing}");
//! assert_eq!(classify("# Title").to_string(), "markdown");
//! ```

pub use config::*;
pub use content_type::*;
pub use data::*;
pub use engine::*;
pub use error::*;
pub use session::*;

pub mod config;
pub mod content_type;
pub mod data;
pub mod engine;
mod error;
pub mod session;

#[cfg(test)]
mod __tests;
