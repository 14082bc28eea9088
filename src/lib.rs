//! Condense - Generate condensed code maps for LLM context.
//!
//! Condense walks a directory tree and rewrites each source file into a
//! compact "code map": function and method bodies are elided, overly long
//! string literals are truncated, and declarations, signatures, comments and
//! docstrings are kept as written. The result is a single `<code_map>`
//! document suitable for feeding to language models.
//!
//! # Quick Start
//!
//! ```no_run
//! use condense::builder::Condense;
//!
//! let result = Condense::new("./my-project")
//!     .max_literal_len(80)
//!     .build()
//!     .unwrap();
//!
//! print!("{}", result.render());
//! ```
//!
//! # Modules
//!
//! - [`codemap`] - Tree-sitter based body elision and literal truncation
//! - [`filter`] - Language detection, text detection and exclude globs
//! - [`walker`] - Directory traversal with gitignore support
//! - [`output`] - `<code_map>` document assembly
//! - [`builder`] - Fluent and functional APIs over a whole tree
//! - [`config`] - `condense.toml` loading
//! - [`tokens`] - Token and line statistics
//!
//! # Supported Languages
//!
//! - Go (`.go`)
//! - Java (`.java`)
//! - Python (`.py`, `.pyi`)
//! - JavaScript (`.js`, `.jsx`, `.mjs`, `.cjs`)
//! - TypeScript (`.ts`, `.mts`, `.cts`, `.tsx`)
//! - Rust (`.rs`)
//!
//! Other text files are included unchanged.

pub mod builder;
pub mod codemap;
pub mod config;
pub mod errors;
pub mod filter;
pub mod output;
pub mod tokens;
pub mod walker;

// Re-export key types at crate root for convenience
pub use builder::{map_sources, Condense, CondenseResult, ErrorPolicy};
pub use codemap::{generate_codemap, CodemapError, MapOptions, SourceFile};
pub use config::{Config, ConfigError};
pub use errors::CondenseError;
pub use filter::{FilterError, Language};
pub use output::{FileMap, OutputError};
pub use tokens::{count_tokens, Encoding, Reduction};
pub use walker::WalkError;
