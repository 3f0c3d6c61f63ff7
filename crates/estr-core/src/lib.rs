//! Scope-aware traversals of ECMAScript sources
//!
//! Parses scripts into an arena syntax tree, resolves every identifier to
//! its declaration, and builds capture-safe renames, binding lookups,
//! declaration listings and ctags-style tag files on top of that.

pub mod config;
pub mod parser;
pub mod refactor;
pub mod semantic;
pub mod syntax;
pub mod tags;

pub use parser::{ParseError, ParsedFile, Parser};
pub use refactor::{
    DeclarationReport, ErrorKind, RefactorError, Refactoring, VariableReport, collect, find_var,
    find_var_report, rename,
};
pub use semantic::Warning;
pub use syntax::Position;
pub use tags::{Tag, TagCollector, TagKind, extract_tags, tag_file};
