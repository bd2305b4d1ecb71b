//! Typed hook keys.
//!
//! A [`Hook<T>`] is a named attribute whose resolved value has type `T`.
//! The same key can be specified on several tags; `duration` is a hook
//! of both units and disk elements, for example.

use core::fmt;
use core::marker::PhantomData;

use downcast_rs::{DowncastSync, impl_downcast};

/// Value that can be produced by a hook and stored in a [`HookCache`](crate::HookCache).
///
/// Implemented for every `Clone + Debug + Send + Sync + 'static` type.
pub trait HookValue: DowncastSync + fmt::Debug {
    /// Returns the concrete type name, used in mismatch diagnostics.
    fn value_type_name(&self) -> &'static str;
}

impl_downcast!(sync HookValue);

impl<T> HookValue for T
where
    T: Clone + fmt::Debug + Send + Sync + 'static,
{
    fn value_type_name(&self) -> &'static str {
        core::any::type_name::<T>()
    }
}

/// Named attribute key carrying its value type.
///
/// ```
/// use rollkit_hooks::Hook;
///
/// const DURATION: Hook<f64> = Hook::new("duration");
/// assert_eq!(DURATION.name(), "duration");
/// ```
pub struct Hook<T> {
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Hook<T> {
    /// Creates a hook key.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    /// Returns the attribute name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> Clone for Hook<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Hook<T> {}

impl<T> fmt::Debug for Hook<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hook")
            .field("name", &self.name)
            .field("value", &core::any::type_name::<T>())
            .finish()
    }
}
