//! Lazily published, context-lifetime values.

use std::sync::OnceLock;

use super::MediaContext;

/// A slot holding one value per context, built on first access.
///
/// The first caller of [`get`](Self::get) runs the factory and publishes the
/// result. Concurrent first callers wait for that publication and receive
/// the same instance; the factory runs exactly once. Once published the
/// value never changes. Reads after publication take no lock.
///
/// Factories are plain function pointers, so they cannot capture state and
/// have nothing to release if a build were abandoned.
///
/// ```rust
/// use cloudmedia::context::EntityHandle;
///
/// let handle: EntityHandle<Vec<u32>, u32> = EntityHandle::new(|seed| vec![*seed]);
/// assert!(!handle.is_initialized());
///
/// let first = handle.get(&7);
/// let second = handle.get(&9);
/// assert!(std::ptr::eq(first, second));
/// assert_eq!(second, &vec![7]);
/// ```
pub struct EntityHandle<T, C = MediaContext> {
    slot: OnceLock<T>,
    factory: fn(&C) -> T,
}

impl<T, C> EntityHandle<T, C> {
    /// Creates an empty handle.
    pub const fn new(factory: fn(&C) -> T) -> Self {
        Self {
            slot: OnceLock::new(),
            factory,
        }
    }

    /// Creates a handle whose value is already published.
    ///
    /// `factory` is kept for symmetry but never runs.
    pub fn published(value: T, factory: fn(&C) -> T) -> Self {
        Self {
            slot: OnceLock::from(value),
            factory,
        }
    }

    /// Returns the published value, building it from `context` if needed.
    pub fn get(&self, context: &C) -> &T {
        self.slot.get_or_init(|| (self.factory)(context))
    }

    /// Returns `true` once a value has been published.
    pub fn is_initialized(&self) -> bool {
        self.slot.get().is_some()
    }

    /// Returns the published value without building it.
    pub fn peek(&self) -> Option<&T> {
        self.slot.get()
    }
}

impl<T, C> std::fmt::Debug for EntityHandle<T, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityHandle")
            .field("initialized", &self.is_initialized())
            .finish_non_exhaustive()
    }
}
