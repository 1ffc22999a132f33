//! Notebook file I/O and batch orchestration for md2nb.
//!
//! This crate ties the pure Markdown-to-notebook conversion to the filesystem:
//! nbformat serialization, atomic notebook writes, and the directory-wide
//! batch driver.

pub mod batch;
pub mod convert;
pub mod ipynb;
