//! Batch translation of Storyblok asset meta data.
//!
//! Stories are walked recursively; every translatable asset field gets a
//! per-locale shadow copy (`<field>__i18n__<locale>`) whose meta data is
//! translated through DeepL, while the source-locale field stays untouched.

pub mod cache;
pub mod config;
pub mod content;
pub mod error;
pub mod run;
pub mod schema;
pub mod shadow;
pub mod storyblok;
pub mod translation;
pub mod walker;
