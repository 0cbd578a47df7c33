//! Object key generation
//!
//! A [`KeyTemplateContext`] is bound once when a file is added and then
//! rendered through a user template such as
//! `i/{{year}}/{{month}}/{{day}}/{{ulid-dayslice}}.{{ext}}`.

pub mod context;
pub mod error;
pub mod template;
pub mod ulid;

pub use context::{KeyTemplateContext, split_file_name};
pub use error::UlidError;
pub use template::{DEFAULT_TEMPLATE, PLACEHOLDERS, effective_template, render};
pub use ulid::{Ulid, UlidGenerator};
