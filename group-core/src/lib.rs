//! Closure, Cayley-table, and structural analysis engine for finite
//! groups given by complex matrix generators.
//!
//! A caller supplies a handful of square matrices; [`matrix::generate_group`]
//! closes them into the full group, [`cayley::build_cayley_table`] indexes
//! the multiplication, and [`master::MasterGroup`] wraps both together with
//! every derived index table. Individual subgroups ([`subgroup::Subgroup`])
//! memoize their own structural invariants — conjugacy data, center,
//! derived series, the normal-subgroup lattice, and an isomorphism tag — on
//! first access. [`service::Service`] exposes all of this through a small
//! text command language.

pub mod cayley;
pub mod divisor;
pub mod error;
pub mod identifier;
pub mod master;
pub mod matrix;
pub mod service;
pub mod structure;
pub mod subgroup;

pub use error::{Error, Result};
pub use master::MasterGroup;
pub use matrix::{Matrix, MatrixClosureConfig};
pub use service::Service;
pub use subgroup::Subgroup;
