//! Common error infrastructure for battle-core.
//!
//! Domain-specific errors (e.g. `LedgerError`, `CommitError`) are defined in
//! their respective modules alongside the operations they validate. Every one of
//! them implements [`BattleError`] so the runtime can classify failures without
//! matching on concrete types.
//!
//! # Recovery classes
//!
//! - **IllegalSelection**: unaffordable or targetless selections, recovered by the
//!   orchestrator through the fallback action.
//! - **MissingImplementation**: catalog entries without a bound effect. Filtered
//!   out of the legal-action set up front.
//! - **InvariantViolation**: rule-engine bugs such as writing a mark over a
//!   different element. Rejected and logged, never silently applied.

/// Severity level of an error, used for categorization and recovery strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Recoverable error - the turn can continue with an alternative action.
    ///
    /// Examples: insufficient CP, the chosen target died before commit
    Recoverable,

    /// Validation error - invalid input, should not retry without changes.
    ///
    /// Examples: unknown action id, charge above the spend ceiling
    Validation,

    /// Internal error - unexpected state inconsistency.
    ///
    /// These indicate bugs and should be investigated.
    Internal,

    /// Fatal error - battle state corrupted, cannot continue.
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates an internal bug.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common trait for all battle-core errors.
///
/// # Implementation Guidelines
///
/// - All error enums should implement this trait
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
pub trait BattleError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    ///
    /// Default implementation uses the error type name.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}
