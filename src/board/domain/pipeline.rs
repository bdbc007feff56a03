//! Pipeline registry: the ordered stages each role moves tasks through.

use super::{BoardDomainError, Role};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stage name shared by every pipeline as its final stage.
pub const TERMINAL_STAGE: &str = "DONE";

const ESTIMATION_STAGES: &[&str] = &[
    "TO DO LIST",
    "SUPPLIER QUOTES PENDING",
    "CLIENT APPROVAL PENDING",
    "QUOTATION BILL RAISED",
    "AWAITING PO",
    "FINAL INVOICE RAISED",
    TERMINAL_STAGE,
];

const DESIGNER_STAGES: &[&str] = &[
    "TO DO LIST",
    "MOCKUP PENDING",
    "PRODUCTION",
    "PENDING WITH CLIENT",
    TERMINAL_STAGE,
];

const OPERATIONS_STAGES: &[&str] = &[
    "TO DO LIST",
    "APPROVAL",
    "PRODUCTION",
    "DELIVERY",
    TERMINAL_STAGE,
];

/// Validated stage name, used as a task status and as a column identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StageName(String);

impl StageName {
    /// Creates a validated stage name.
    ///
    /// # Errors
    ///
    /// Returns [`BoardDomainError::EmptyStageName`] when the value is blank.
    pub fn new(value: impl Into<String>) -> Result<Self, BoardDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(BoardDomainError::EmptyStageName);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the terminal stage name.
    #[must_use]
    pub fn terminal() -> Self {
        Self(TERMINAL_STAGE.to_owned())
    }

    /// Returns the stage name as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns whether this is the terminal stage.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.0 == TERMINAL_STAGE
    }
}

impl TryFrom<String> for StageName {
    type Error = BoardDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<StageName> for String {
    fn from(value: StageName) -> Self {
        value.0
    }
}

impl AsRef<str> for StageName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl PartialEq<str> for StageName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl fmt::Display for StageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered stage sequence for one role.
///
/// Pipelines are configuration, fixed at compile time. The privileged role
/// has an empty pipeline and views the board through another role's.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pipeline {
    role: Role,
    stages: &'static [&'static str],
}

impl Pipeline {
    /// Returns the pipeline for a role.
    #[must_use]
    pub const fn for_role(role: Role) -> Self {
        let stages: &'static [&'static str] = match role {
            Role::Estimation => ESTIMATION_STAGES,
            Role::Designer => DESIGNER_STAGES,
            Role::Operations => OPERATIONS_STAGES,
            Role::Admin => &[],
        };
        Self { role, stages }
    }

    /// Returns the role owning this pipeline.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Returns the stage names in pipeline order.
    #[must_use]
    pub const fn stages(&self) -> &'static [&'static str] {
        self.stages
    }

    /// Returns whether the pipeline has no stages.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Returns the entry stage for newly created tasks.
    ///
    /// # Errors
    ///
    /// Returns [`BoardDomainError::EmptyPipeline`] for the privileged role.
    pub fn first_stage(&self) -> Result<StageName, BoardDomainError> {
        self.stages
            .first()
            .map(|stage| StageName((*stage).to_owned()))
            .ok_or(BoardDomainError::EmptyPipeline(self.role))
    }

    /// Returns the final stage, or `None` for an empty pipeline.
    #[must_use]
    pub fn terminal_stage(&self) -> Option<StageName> {
        self.stages
            .last()
            .map(|stage| StageName((*stage).to_owned()))
    }

    /// Returns whether the stage belongs to this pipeline.
    #[must_use]
    pub fn contains(&self, stage: &str) -> bool {
        self.stages.contains(&stage)
    }

    /// Returns the zero-based index of a stage within the pipeline.
    #[must_use]
    pub fn position_of(&self, stage: &str) -> Option<usize> {
        self.stages.iter().position(|candidate| *candidate == stage)
    }

    /// Looks up a stage by name and returns it as a [`StageName`].
    #[must_use]
    pub fn stage(&self, stage: &str) -> Option<StageName> {
        self.stages
            .iter()
            .find(|candidate| **candidate == stage)
            .map(|found| StageName((*found).to_owned()))
    }
}
