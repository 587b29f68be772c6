//! Core domain types for the BodyBalance content backend.
//!
//! This crate holds the serializable value objects served over the query API
//! together with the [`DataSource`] tag that marks where a read was satisfied
//! from. It has no I/O and no dependencies on the storage or HTTP layers.

mod entities;
mod source;

pub use entities::{Account, Category, ContentType, Feedback, Video};
pub use source::DataSource;
