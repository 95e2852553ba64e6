//! # scratchdir
//!
//! Scoped scratch directories for batch file workflows.
//!
//! A [`ScratchDir`] hands out uniquely named file handles under a
//! caller-supplied base path and tracks each one as temporary or
//! permanent, so a unit of work can allocate freely and sweep precisely.
//! On top of the handles sit combine workflows: fold many input files
//! into one result (by byte copy or by renaming the first input in
//! place), and produce-then-promote loops that land fully written work
//! even when the producing step fails halfway.
//!
//! ## Key components
//!
//! - [`ScratchDir`] — owns one directory location and the ordered set of
//!   file handles allocated through it; creation, sweeps, batch loops and
//!   aggregation live here.
//! - [`ScratchFile`] — one file path plus its permanence flag. Cheap to
//!   clone; clones share state, so a rename or reclassification through
//!   one clone is visible through all of them.
//! - [`naming`] — template-driven name generation: a `{0}` marker becomes
//!   a millisecond stamp plus a per-millisecond counter; templates
//!   without the marker are taken verbatim.
//!
//! Everything is synchronous, single-threaded, blocking filesystem I/O;
//! name uniqueness is best-effort per sequentially used directory, not a
//! cross-process guarantee.

pub mod dir;
pub mod error;
pub mod file;
pub mod naming;

mod aggregate;
mod batch;

pub use dir::ScratchDir;
pub use error::ScratchError;
pub use file::ScratchFile;
