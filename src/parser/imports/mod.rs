//! AST-based import extraction.
//!
//! Each language module walks the syntax tree directly and collects the
//! raw specifier strings, leaving their meaning to the resolver.

pub mod javascript;
pub mod python;
