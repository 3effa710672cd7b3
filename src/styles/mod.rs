//! File-backed style storage.
//!
//! Stylesheets, per-style metadata and the per-collection default style live
//! in a directory tree described by [`StyleStorageOptions`]. All access goes
//! through a shared [`StyleLockManager`] so that operations on the same style
//! (or the same default-style record) never interleave within a process.
//! Nothing here coordinates across processes.

pub mod format;
pub mod lock;
pub mod metadata;
pub mod model;
pub mod options;
pub mod service;
pub mod storage;

pub use format::StylesheetFormat;
pub use lock::{LockKey, LockSlot, StyleLockManager};
pub use metadata::{FileMetadataStorage, MetadataStorage};
pub use model::{
    DefaultStyle, Link, OgcStyle, OgcStyles, StyleMetadata, StylesheetAddParameters,
    stylesheet_href,
};
pub use options::StyleStorageOptions;
pub use service::{StaticApiKeyAuthorizer, StyleResponse, StylesAuthorizer, StylesService};
pub use storage::{FileStyleStorage, StyleStorage};
