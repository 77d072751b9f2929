//! Structured compatibility diagnostics
//!
//! Diagnostics carry data only. Rendering them as text belongs to whatever
//! reports the verdict (a CLI, a test, a service).

use vintf_core::{KernelVersion, Level, Version};

use crate::matrix::MatrixInstance;

/// Category of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// Non-optional requirement with no satisfying manifest entry
    MissingRequirement,
    /// Manifest level below the matrix level
    LevelTooLow,
    /// A kernel requirement is not met
    KernelRequirementUnmet,
}

/// Kernel pass failures
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KernelIssue {
    /// No matrix kernel requirement targets the running branch
    UnsupportedVersion {
        /// Kernel declared by the manifest
        running: KernelVersion,
        /// `min_lts` of every matrix kernel requirement
        supported: Vec<KernelVersion>,
    },
    /// Running release is older than the branch's minimum LTS
    VersionTooOld {
        /// Kernel declared by the manifest
        running: KernelVersion,
        /// Lowest `min_lts` of the matching branch
        min_lts: KernelVersion,
    },
    /// Config value differs from the required value
    ConfigMismatch {
        /// Requirement the config belongs to
        min_lts: KernelVersion,
        /// Config key
        key: String,
        /// Required literal value
        expected: String,
        /// Declared value; `None` if absent
        actual: Option<String>,
    },
}

/// One reason a manifest does not satisfy a matrix
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Diagnostic {
    /// Required instance not provided at any acceptable version
    MissingRequirement {
        /// The unmet requirement
        requirement: MatrixInstance,
        /// Versions the manifest serves for the same package/interface/instance
        provided: Vec<Version>,
    },
    /// Device too old for the matrix
    LevelTooLow {
        /// Level the manifest declares
        manifest_level: Level,
        /// Level the matrix requires
        matrix_level: Level,
    },
    /// Kernel pass failure
    KernelRequirementUnmet(KernelIssue),
}

impl Diagnostic {
    /// Category of this diagnostic
    pub fn kind(&self) -> DiagnosticKind {
        match self {
            Diagnostic::MissingRequirement { .. } => DiagnosticKind::MissingRequirement,
            Diagnostic::LevelTooLow { .. } => DiagnosticKind::LevelTooLow,
            Diagnostic::KernelRequirementUnmet(_) => DiagnosticKind::KernelRequirementUnmet,
        }
    }

    /// The unmet requirement, for `MissingRequirement`
    pub fn requirement(&self) -> Option<&MatrixInstance> {
        match self {
            Diagnostic::MissingRequirement { requirement, .. } => Some(requirement),
            _ => None,
        }
    }
}

/// Outcome of a compatibility check
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Verdict {
    /// Every requirement is met
    #[default]
    Compatible,
    /// At least one diagnostic; holds all of them in report order
    Incompatible(Vec<Diagnostic>),
}

impl Verdict {
    /// `Compatible` if `diagnostics` is empty
    pub fn from_diagnostics(diagnostics: Vec<Diagnostic>) -> Self {
        if diagnostics.is_empty() {
            Verdict::Compatible
        } else {
            Verdict::Incompatible(diagnostics)
        }
    }

    /// True if no diagnostics were recorded
    pub fn is_compatible(&self) -> bool {
        matches!(self, Verdict::Compatible)
    }

    /// Diagnostics in report order (empty when compatible)
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            Verdict::Compatible => &[],
            Verdict::Incompatible(diagnostics) => diagnostics,
        }
    }

    /// Take the diagnostics
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        match self {
            Verdict::Compatible => Vec::new(),
            Verdict::Incompatible(diagnostics) => diagnostics,
        }
    }

    /// Diagnostics of one category
    pub fn of_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> + '_ {
        self.diagnostics().iter().filter(move |d| d.kind() == kind)
    }

    /// Append another verdict's diagnostics after this one's
    pub fn merge(self, other: Verdict) -> Verdict {
        let mut diagnostics = self.into_diagnostics();
        diagnostics.extend(other.into_diagnostics());
        Verdict::from_diagnostics(diagnostics)
    }
}
