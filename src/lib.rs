//! TypeScript declaration generator for the Chrome extension APIs.
//!
//! Input is the processed API description (`{"api": {...}}`); output is one
//! `.d.ts` text with every visible namespace nested under
//! `declare namespace chrome`.
pub mod buffer;
pub mod comment;
pub mod config;
pub mod error;
pub mod ident;
pub mod overrides;
pub mod path_de;
pub mod path_id;
pub mod render;
pub mod rewrite;
pub mod schema;
pub mod traverse;
pub mod tsd;
