//! Internal finite-state machine for determining record type keys.
//!
//! This module is intended for applications that need fine control over how
//! lines are read. See [`crate::avec`] for an importer covering the common
//! case.
//!
//! # Architecture
//!
//! A line's type key is not held in a single field. The record kind comes
//! first, the branch follows at a fixed position, and whether (and where)
//! any deeper discriminator is found depends on the kind and branch already
//! read. The rules deciding this are plain data, see [`rules`].
//!
//! All states are represented by a non-copy token. Once the bytes at the
//! token's address are available, transition to another state by calling the
//! token's `advance` method. This returns either a successor state token or
//! the finished [`TypeKey`](crate::key::TypeKey).
//!
//! Only the initial state, re-exported for convenience as [`Decoder`], can be
//! constructed.
//!
//! Some areas of the process are not represented in the finite-state machine
//! and must be carefully written:
//!
//! - Reading bytes from the correct place in the line. A [`cursor::LineCursor`]
//! peeks at bytes by address, reading blanks beyond the end of the line.
//!
//! - Rejecting lines too short to hold the kind and branch.
//!
//! - Looking up the template for the finished key, see
//! [`crate::registry::Registry`].

pub mod cursor;
pub mod discriminator;
pub mod rules;

/// Entrypoint to the finite-state machine.
pub type Decoder = discriminator::Kind;
