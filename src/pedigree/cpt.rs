use crate::domain::DomainRegistry;
use crate::error::{BayesResult, ValidationError};
use crate::factor::Factor;
use crate::network::Network;
use crate::pedigree::{genotype, hemophilia, maternal_gene, paternal_gene, Family, FamilyMember, Sex};

/// Probability that a founder's gene carries the mutation.
pub const FOUNDER_MUTATION_RATE: f64 = 1.0 / 30000.0;

const GENES: [&str; 2] = ["x", "X"];
const FEMALE_GENOTYPES: [&str; 3] = ["xx", "xX", "XX"];
const MALE_GENOTYPES: [&str; 2] = ["xy", "Xy"];
const STATUS: [&str; 2] = ["-", "+"];

fn genotypes(sex: Sex) -> &'static [&'static str] {
    match sex {
        Sex::Female => &FEMALE_GENOTYPES,
        Sex::Male => &MALE_GENOTYPES,
    }
}

fn indicator(cond: bool) -> f64 {
    if cond {
        1.0
    } else {
        0.0
    }
}

fn founder_gene(gene: &str) -> f64 {
    if gene == "X" {
        FOUNDER_MUTATION_RATE
    } else {
        1.0 - FOUNDER_MUTATION_RATE
    }
}

/// The domain of every variable of `family`'s hemophilia network.
pub fn variable_domains(family: &Family) -> Result<DomainRegistry, ValidationError> {
    family.members().iter().try_fold(DomainRegistry::new(), |domains, m| {
        let name = m.name();
        let domains = domains
            .with_domain(maternal_gene(name), GENES)?
            .with_domain(genotype(name), genotypes(m.sex()).iter().copied())?
            .with_domain(hemophilia(name), STATUS)?;
        match m.sex() {
            Sex::Female => domains.with_domain(paternal_gene(name), GENES),
            Sex::Male => Ok(domains),
        }
    })
}

/// `P(H_N | G_N)`: hemophilia is present exactly for `XX` and `Xy`.
pub fn hemophilia_cpt(member: &FamilyMember, domains: &DomainRegistry) -> Result<Factor, ValidationError> {
    let name = member.name();
    Factor::from_fn([genotype(name), hemophilia(name)], domains, |a| {
        let affected = a[0] == "XX" || a[0] == "Xy";
        indicator((a[1] == "+") == affected)
    })
}

/// `P(G_N | M_N, P_N)` for females, `P(G_N | M_N)` for males.
pub fn genotype_cpt(member: &FamilyMember, domains: &DomainRegistry) -> Result<Factor, ValidationError> {
    let name = member.name();
    match member.sex() {
        Sex::Female => Factor::from_fn(
            [maternal_gene(name), paternal_gene(name), genotype(name)],
            domains,
            |a| {
                let expected = match (a[0].as_str(), a[1].as_str()) {
                    ("x", "x") => "xx",
                    ("X", "X") => "XX",
                    _ => "xX",
                };
                indicator(a[2] == expected)
            },
        ),
        Sex::Male => Factor::from_fn([maternal_gene(name), genotype(name)], domains, |a| {
            indicator(a[1] == format!("{}y", a[0]))
        }),
    }
}

/// `P(M_N | G_mother)`, or the founder prior when the mother is unknown.
pub fn maternal_inheritance_cpt(
    member: &FamilyMember,
    domains: &DomainRegistry,
) -> Result<Factor, ValidationError> {
    let gene = maternal_gene(member.name());
    let Some(mother) = member.mother() else {
        return Factor::from_fn([gene], domains, |a| founder_gene(&a[0]));
    };

    Factor::from_fn([genotype(mother), gene], domains, |a| {
        // Each of the mother's two genes is passed on with probability 1/2.
        let p_mutated = match a[0].as_str() {
            "XX" => 1.0,
            "xX" => 0.5,
            _ => 0.0,
        };
        if a[1] == "X" {
            p_mutated
        } else {
            1.0 - p_mutated
        }
    })
}

/// `P(P_N | G_father)`, or the founder prior when the father is unknown.
///
/// Only females carry a paternal gene variable; see [`family_network`].
pub fn paternal_inheritance_cpt(
    member: &FamilyMember,
    domains: &DomainRegistry,
) -> Result<Factor, ValidationError> {
    let gene = paternal_gene(member.name());
    let Some(father) = member.father() else {
        return Factor::from_fn([gene], domains, |a| founder_gene(&a[0]));
    };

    // A father passes on his only X chromosome.
    Factor::from_fn([genotype(father), gene], domains, |a| {
        indicator(a[0].starts_with('X') == (a[1] == "X"))
    })
}

/// Builds the hemophilia network of `family`.
///
/// Factors are listed per member in family order: paternal inheritance
/// (females only), maternal inheritance, genotype, hemophilia.
pub fn family_network(family: &Family) -> BayesResult<Network> {
    let domains = variable_domains(family)?;
    let mut cpts: Vec<Factor> = Vec::with_capacity(family.members().len() * 4);
    for member in family.members() {
        if member.sex() == Sex::Female {
            cpts.push(paternal_inheritance_cpt(member, &domains)?);
        }
        cpts.push(maternal_inheritance_cpt(member, &domains)?);
        cpts.push(genotype_cpt(member, &domains)?);
        cpts.push(hemophilia_cpt(member, &domains)?);
    }
    tracing::debug!(members = family.members().len(), factors = cpts.len(), "built pedigree network");
    Ok(Network::new(cpts, domains)?)
}
