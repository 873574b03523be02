//! Hemophilia inheritance networks built from family trees.
//!
//! This module is a producer of network inputs: it turns a [`Family`] into
//! a domain registry and the conditional probability tables of X-linked
//! inheritance. The inference engine does not depend on it.
//!
//! For each member `N` the network has:
//! - `M_N`: gene inherited from the mother, `x` or `X`
//! - `P_N`: gene inherited from the father (females only), `x` or `X`
//! - `G_N`: genotype, `xx`/`xX`/`XX` for females and `xy`/`Xy` for males
//! - `H_N`: hemophilia status, `-` or `+`

mod cpt;
mod member;

use thiserror::Error;

pub use cpt::{
    family_network, genotype_cpt, hemophilia_cpt, maternal_inheritance_cpt,
    paternal_inheritance_cpt, variable_domains, FOUNDER_MUTATION_RATE,
};
pub use member::{Family, FamilyMember, Sex};

/// Errors raised when a family tree is inconsistent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PedigreeError {
    #[error("Family member '{name}' is listed more than once")]
    DuplicateMember {
        name: String,
    },

    #[error("Parent '{parent}' of '{member}' is not in the family")]
    UnknownParent {
        member: String,
        parent: String,
    },

    #[error("Parent '{parent}' of '{member}' must be {expected}")]
    ParentSexMismatch {
        member: String,
        parent: String,
        expected: Sex,
    },
}

/// Name of `name`'s maternally inherited gene variable.
#[must_use]
pub fn maternal_gene(name: &str) -> String {
    format!("M_{name}")
}

/// Name of `name`'s paternally inherited gene variable.
#[must_use]
pub fn paternal_gene(name: &str) -> String {
    format!("P_{name}")
}

/// Name of `name`'s genotype variable.
#[must_use]
pub fn genotype(name: &str) -> String {
    format!("G_{name}")
}

/// Name of `name`'s hemophilia status variable.
#[must_use]
pub fn hemophilia(name: &str) -> String {
    format!("H_{name}")
}
