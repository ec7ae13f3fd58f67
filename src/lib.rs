//! folioback: buy-and-hold asset allocation backtester.
//!
//! Hexagonal architecture: the simulation engine lives in [`domain`], the
//! collaborator traits in [`ports`], concrete implementations in [`adapters`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
