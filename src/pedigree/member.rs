use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::pedigree::PedigreeError;

/// Biological sex, which fixes the variables and tables of a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    /// One X chromosome.
    Male,
    /// Two X chromosomes.
    Female,
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Male => write!(f, "male"),
            Self::Female => write!(f, "female"),
        }
    }
}

/// A single member of a family tree. Parents are referenced by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyMember {
    name: String,
    sex: Sex,
    mother: Option<String>,
    father: Option<String>,
}

impl FamilyMember {
    /// Creates a member with unknown parents.
    #[must_use]
    pub fn new(name: impl Into<String>, sex: Sex) -> Self {
        Self {
            name: name.into(),
            sex,
            mother: None,
            father: None,
        }
    }

    /// Creates a male member with unknown parents.
    #[must_use]
    pub fn male(name: impl Into<String>) -> Self {
        Self::new(name, Sex::Male)
    }

    /// Creates a female member with unknown parents.
    #[must_use]
    pub fn female(name: impl Into<String>) -> Self {
        Self::new(name, Sex::Female)
    }

    /// Returns this member with a known mother.
    #[must_use]
    pub fn with_mother(mut self, mother: impl Into<String>) -> Self {
        self.mother = Some(mother.into());
        self
    }

    /// Returns this member with a known father.
    #[must_use]
    pub fn with_father(mut self, father: impl Into<String>) -> Self {
        self.father = Some(father.into());
        self
    }

    /// Member name, unique within a family.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Member sex.
    #[must_use]
    pub const fn sex(&self) -> Sex {
        self.sex
    }

    /// Name of the mother, if known.
    #[must_use]
    pub fn mother(&self) -> Option<&str> {
        self.mother.as_deref()
    }

    /// Name of the father, if known.
    #[must_use]
    pub fn father(&self) -> Option<&str> {
        self.father.as_deref()
    }
}

/// A validated family tree.
///
/// - Names are unique.
/// - Every named parent is a member of the family.
/// - Mothers are female and fathers are male.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Family {
    members: Vec<FamilyMember>,
}

impl Family {
    /// Validates and builds a family. Member order is kept.
    pub fn new(members: Vec<FamilyMember>) -> Result<Self, PedigreeError> {
        let mut sexes: HashMap<&str, Sex> = HashMap::with_capacity(members.len());
        for m in &members {
            if sexes.insert(m.name(), m.sex()).is_some() {
                return Err(PedigreeError::DuplicateMember {
                    name: m.name().to_string(),
                });
            }
        }

        for m in &members {
            let parents = [(m.mother(), Sex::Female), (m.father(), Sex::Male)];
            for (parent, expected) in parents {
                let Some(parent) = parent else { continue };
                match sexes.get(parent) {
                    None => {
                        return Err(PedigreeError::UnknownParent {
                            member: m.name().to_string(),
                            parent: parent.to_string(),
                        })
                    }
                    Some(&sex) if sex != expected => {
                        return Err(PedigreeError::ParentSexMismatch {
                            member: m.name().to_string(),
                            parent: parent.to_string(),
                            expected,
                        })
                    }
                    Some(_) => {}
                }
            }
        }

        Ok(Self { members })
    }

    /// Four members of the Russian royal family.
    #[must_use]
    pub fn romanoffs() -> Self {
        Self {
            members: vec![
                FamilyMember::female("alexandra"),
                FamilyMember::male("nicholas"),
                FamilyMember::male("alexey")
                    .with_mother("alexandra")
                    .with_father("nicholas"),
                FamilyMember::female("anastasia")
                    .with_mother("alexandra")
                    .with_father("nicholas"),
            ],
        }
    }

    /// Members in family order.
    #[must_use]
    pub fn members(&self) -> &[FamilyMember] {
        &self.members
    }

    /// Looks up a member by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FamilyMember> {
        self.members.iter().find(|m| m.name() == name)
    }
}

impl<'de> Deserialize<'de> for Family {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            members: Vec<FamilyMember>,
        }
        let raw = Raw::deserialize(deserializer)?;
        Family::new(raw.members).map_err(serde::de::Error::custom)
    }
}
