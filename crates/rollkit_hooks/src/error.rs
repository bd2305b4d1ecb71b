//! Error types for hook registration and resolution.

use thiserror::Error;

/// Errors raised while registering or resolving hooks.
///
/// Registration errors ([`DuplicateSpec`](Self::DuplicateSpec),
/// [`UnknownAttribute`](Self::UnknownAttribute), [`TypeMismatch`](Self::TypeMismatch),
/// [`HostMismatch`](Self::HostMismatch)) are fatal at plugin load time.
/// [`Unresolved`](Self::Unresolved) and [`CyclicResolution`](Self::CyclicResolution)
/// surface to the caller of an attribute access.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HookError {
    /// A specification was declared twice for the same tag.
    #[error("hook '{hook}' is already specified for '{tag}'")]
    DuplicateSpec {
        /// Tag the specification was declared on.
        tag: &'static str,
        /// The duplicate hook name.
        hook: &'static str,
    },

    /// No specification exists for the hook on the tag or its ancestors.
    #[error("no specification for hook '{hook}' on '{tag}'")]
    UnknownAttribute {
        /// Tag that was searched.
        tag: &'static str,
        /// The unknown hook name.
        hook: &'static str,
    },

    /// Every candidate returned nothing for a non-nullable hook.
    #[error("could not resolve '{hook}' on {host}")]
    Unresolved {
        /// The hook being resolved.
        hook: &'static str,
        /// Label of the entity.
        host: String,
    },

    /// Resolving the hook required its own value.
    #[error("cyclic resolution of '{hook}' on {host}: {chain}")]
    CyclicResolution {
        /// The hook that was re-entered.
        hook: &'static str,
        /// Label of the entity.
        host: String,
        /// The resolution chain, outermost first.
        chain: String,
    },

    /// The value type does not match the specification.
    #[error("hook '{hook}' holds {found}, expected {expected}")]
    TypeMismatch {
        /// The hook name.
        hook: &'static str,
        /// Type declared by the specification or requested by the caller.
        expected: &'static str,
        /// Type actually found.
        found: &'static str,
    },

    /// An implementation targets a different entity type than its specification.
    #[error("hook '{hook}' on '{tag}' is specified for {expected}, not {found}")]
    HostMismatch {
        /// Tag the implementation was registered on.
        tag: &'static str,
        /// The hook name.
        hook: &'static str,
        /// Host type declared by the specification.
        expected: &'static str,
        /// Host type of the implementation.
        found: &'static str,
    },

    /// A reportable condition raised by an implementation.
    #[error("implementation failed: {0}")]
    Implementation(String),
}

impl HookError {
    /// Creates an [`Implementation`](Self::Implementation) error.
    pub fn failed(msg: impl Into<String>) -> Self {
        Self::Implementation(msg.into())
    }

    /// Returns true for errors that must never be treated as "no opinion".
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::CyclicResolution { .. })
    }

    /// Returns true if the error means the attribute is simply not available.
    #[must_use]
    pub fn is_missing(&self) -> bool {
        matches!(
            self,
            Self::Unresolved { .. } | Self::UnknownAttribute { .. }
        )
    }

    /// Prepends the frame `hook@host` to the chain of a cyclic resolution
    /// unwinding through it.
    pub(crate) fn through(self, hook: &'static str, host: &str) -> Self {
        match self {
            Self::CyclicResolution {
                hook: reentered,
                host: reentered_host,
                chain,
            } => Self::CyclicResolution {
                hook: reentered,
                host: reentered_host,
                chain: format!("{hook}@{host} -> {chain}"),
            },
            other => other,
        }
    }
}
