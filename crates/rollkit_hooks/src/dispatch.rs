//! Attribute dispatch.
//!
//! A [`Dispatcher`] resolves attributes of [`Host`] entities against a frozen
//! [`HookRegistry`]:
//!
//! 1. A value cached on the entity is returned as is.
//! 2. Otherwise the candidates for the entity's tag lineage are invoked in
//!    order; the first `Some` wins and is cached.
//! 3. A candidate returning `Err` has no opinion: the error is logged and
//!    the next candidate is tried. Cyclic resolution is the exception and
//!    always propagates.
//! 4. If nothing produced a value the attribute is [`HookError::Unresolved`],
//!    unless its specification is nullable.
//!
//! Resolution is pull-based and may recurse into other attributes, on the
//! same or on related entities. The dispatcher keeps the set of attributes
//! in progress and rejects any attempt to re-enter one of them. The chain of
//! a cycle is assembled while the error unwinds through the frames involved.
//!
//! # Scope
//!
//! A dispatcher is cheap and not `Sync`. Create one per resolution run and
//! thread; the registry it borrows is shared.

use core::any::Any;
use core::cell::RefCell;
use core::fmt;

use hashbrown::HashSet;

use crate::cache::{HookCache, Slot};
use crate::error::HookError;
use crate::hook::{Hook, HookValue};
use crate::registry::{HookRegistry, HookSpec};
use crate::tag::Tag;

// ─────────────────────────────────────────────────────────────────────────────
// Host
// ─────────────────────────────────────────────────────────────────────────────

/// Entity whose attributes are resolved through hooks.
pub trait Host: Any + Send + Sync {
    /// Capability tag of the entity.
    fn tag(&self) -> &'static Tag;

    /// Attribute cache owned by the entity.
    fn hooks(&self) -> &HookCache;

    /// Human-readable label used in diagnostics.
    fn label(&self) -> &str;
}

/// Attribute access sugar for every [`Host`].
pub trait HostExt: Host + Sized {
    /// Resolves a non-nullable attribute.
    ///
    /// # Errors
    ///
    /// See [`Dispatcher::resolve`].
    fn attr<T: HookValue + Clone>(&self, ctx: &Dispatcher<'_>, hook: Hook<T>) -> Result<T, HookError> {
        ctx.resolve(self, hook)
    }

    /// Resolves a possibly nullable attribute.
    ///
    /// # Errors
    ///
    /// See [`Dispatcher::resolve_opt`].
    fn attr_opt<T: HookValue + Clone>(
        &self,
        ctx: &Dispatcher<'_>,
        hook: Hook<T>,
    ) -> Result<Option<T>, HookError> {
        ctx.resolve_opt(self, hook)
    }

    /// Resolves an attribute if the entity has it.
    ///
    /// # Errors
    ///
    /// See [`Dispatcher::lookup`].
    fn try_attr<T: HookValue + Clone>(
        &self,
        ctx: &Dispatcher<'_>,
        hook: Hook<T>,
    ) -> Result<Option<T>, HookError> {
        ctx.lookup(self, hook)
    }
}

impl<H: Host> HostExt for H {}

// ─────────────────────────────────────────────────────────────────────────────
// Resolution frames
// ─────────────────────────────────────────────────────────────────────────────

/// Attribute in progress: address of the entity's cache and hook name.
type Frame = (usize, &'static str);

/// Removes the frame inserted by [`Dispatcher::enter`].
struct FrameGuard<'d> {
    active: &'d RefCell<HashSet<Frame>>,
    frame: Frame,
}

impl Drop for FrameGuard<'_> {
    fn drop(&mut self) {
        self.active.borrow_mut().remove(&self.frame);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Dispatcher
// ─────────────────────────────────────────────────────────────────────────────

/// Resolves hook attributes against a registry.
pub struct Dispatcher<'r> {
    registry: &'r HookRegistry,
    active: RefCell<HashSet<Frame>>,
}

impl fmt::Debug for Dispatcher<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("registry", self.registry)
            .field("depth", &self.depth())
            .finish()
    }
}

impl<'r> Dispatcher<'r> {
    /// Creates a dispatcher over a registry.
    #[must_use]
    pub fn new(registry: &'r HookRegistry) -> Self {
        Self {
            registry,
            active: RefCell::new(HashSet::new()),
        }
    }

    /// Returns the registry.
    #[must_use]
    pub fn registry(&self) -> &'r HookRegistry {
        self.registry
    }

    /// Returns the number of attributes currently being resolved.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.active.borrow().len()
    }

    /// Resolves a non-nullable attribute of `host`.
    ///
    /// # Errors
    ///
    /// - [`HookError::Unresolved`] if no candidate produced a value (also for
    ///   nullable attributes that resolved to nothing)
    /// - [`HookError::CyclicResolution`] if the attribute depends on itself
    /// - [`HookError::UnknownAttribute`] if the attribute is neither cached
    ///   nor specified for the host's tag
    /// - [`HookError::TypeMismatch`] if `T` differs from the stored or declared type
    pub fn resolve<E: Host, T: HookValue + Clone>(
        &self,
        host: &E,
        hook: Hook<T>,
    ) -> Result<T, HookError> {
        self.resolve_opt(host, hook)?
            .ok_or_else(|| HookError::Unresolved {
                hook: hook.name(),
                host: host.label().to_string(),
            })
    }

    /// Resolves an attribute of `host`, returning `None` for a nullable
    /// attribute without value.
    ///
    /// # Errors
    ///
    /// Same as [`resolve`](Self::resolve), except that nullable attributes
    /// never fail with [`HookError::Unresolved`].
    pub fn resolve_opt<E: Host, T: HookValue + Clone>(
        &self,
        host: &E,
        hook: Hook<T>,
    ) -> Result<Option<T>, HookError> {
        let name = hook.name();
        if let Some(slot) = host.hooks().slot(name) {
            return read_slot(name, &slot);
        }

        let tag = host.tag();
        let spec = self
            .registry
            .spec(tag, name)
            .ok_or(HookError::UnknownAttribute {
                tag: tag.name(),
                hook: name,
            })?;
        spec.check_value::<T>()?;

        let _frame = self.enter(host, name)?;
        let resolved = self
            .run_chain(host, spec)
            .map_err(|err| err.through(name, host.label()))?;
        if resolved.is_none() && !spec.is_nullable() {
            return Err(HookError::Unresolved {
                hook: name,
                host: host.label().to_string(),
            });
        }

        let stored = host.hooks().insert_if_absent(name, resolved);
        read_slot(name, &stored)
    }

    /// Resolves an attribute if `host` has it.
    ///
    /// Unknown and unresolvable attributes yield `None`; implementations use
    /// this to probe optional inputs.
    ///
    /// # Errors
    ///
    /// Propagates [`HookError::CyclicResolution`] and
    /// [`HookError::TypeMismatch`].
    pub fn lookup<E: Host, T: HookValue + Clone>(
        &self,
        host: &E,
        hook: Hook<T>,
    ) -> Result<Option<T>, HookError> {
        match self.resolve_opt(host, hook) {
            Err(err) if err.is_missing() => Ok(None),
            other => other,
        }
    }

    fn enter<E: Host>(&self, host: &E, hook: &'static str) -> Result<FrameGuard<'_>, HookError> {
        let frame = (core::ptr::from_ref(host.hooks()).addr(), hook);

        if !self.active.borrow_mut().insert(frame) {
            return Err(HookError::CyclicResolution {
                hook,
                host: host.label().to_string(),
                chain: format!("{}@{}", hook, host.label()),
            });
        }
        Ok(FrameGuard {
            active: &self.active,
            frame,
        })
    }

    fn run_chain<E: Host>(&self, host: &E, spec: &HookSpec) -> Result<Slot, HookError> {
        let erased: &dyn Any = host;

        for candidate in self.registry.candidates(host.tag(), spec.name()) {
            match (candidate.func)(erased, self) {
                Ok(Some(value)) => {
                    tracing::debug!(
                        hook = spec.name(),
                        host = host.label(),
                        implementation = %candidate.name,
                        value = ?value,
                        "hook resolved"
                    );
                    return Ok(Some(value));
                }
                Ok(None) => {}
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => {
                    tracing::warn!(
                        hook = spec.name(),
                        host = host.label(),
                        implementation = %candidate.name,
                        error = %err,
                        "hook implementation failed, trying next candidate"
                    );
                }
            }
        }

        Ok(None)
    }
}

fn read_slot<T: HookValue + Clone>(hook: &'static str, slot: &Slot) -> Result<Option<T>, HookError> {
    let Some(value) = slot else {
        return Ok(None);
    };
    let value: &dyn HookValue = &**value;
    value
        .downcast_ref::<T>()
        .cloned()
        .map(Some)
        .ok_or(HookError::TypeMismatch {
            hook,
            expected: core::any::type_name::<T>(),
            found: value.value_type_name(),
        })
}
