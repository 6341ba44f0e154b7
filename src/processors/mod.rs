//! Domain processors for the lab bench toolkit.
//!
//! - [`translation`] - RNA codon to amino acid translation
//! - [`fitting`] - general least-squares curve fitting
//! - [`monitor`] - serial temperature sensor logging

pub mod fitting;
pub mod monitor;
pub mod translation;
