use parking_lot::Mutex;
use std::{
    collections::{BTreeMap, VecDeque},
    sync::Arc,
};

use crate::{
    any::{AnyInstance, Key},
    finalizer::BoxedFinalizer,
    scope::ScopeId,
};

/// Holder of one cached instance. Its mutex is the per-key construction guard.
pub(crate) type Slot = Mutex<Option<AnyInstance>>;

#[derive(Default)]
pub(crate) struct ScopedCache {
    scopes: BTreeMap<ScopeId, BTreeMap<Key, Arc<Slot>>>,
}

impl ScopedCache {
    #[inline]
    pub(crate) fn open(&mut self, scope: ScopeId) {
        self.scopes.entry(scope).or_default();
    }

    #[inline]
    pub(crate) fn close(&mut self, scope: ScopeId) -> bool {
        self.scopes.remove(&scope).is_some()
    }

    /// Returns the slot for `(scope, key)`, or `None` if the scope isn't open.
    #[must_use]
    pub(crate) fn slot(&mut self, scope: ScopeId, key: &Key) -> Option<Arc<Slot>> {
        let slots = self.scopes.get_mut(&scope)?;
        if let Some(slot) = slots.get(key) {
            return Some(slot.clone());
        }
        let slot = Arc::new(Mutex::new(None));
        slots.insert(key.clone(), slot.clone());
        Some(slot)
    }

    #[inline]
    #[must_use]
    pub(crate) fn len(&self) -> usize {
        self.scopes.len()
    }
}

#[derive(Clone)]
pub(crate) struct Resolved {
    pub(crate) key: Key,
    pub(crate) scope: Option<ScopeId>,
    pub(crate) instance: AnyInstance,
    pub(crate) finalizer: BoxedFinalizer,
}

/// Cached instances with a finalizer, in order of resolution.
#[derive(Default, Clone)]
pub(crate) struct ResolvedSet(pub(crate) VecDeque<Resolved>);

impl ResolvedSet {
    #[inline]
    pub(crate) fn push(&mut self, resolved: Resolved) {
        self.0.push_back(resolved);
    }

    #[inline]
    pub(crate) fn pop(&mut self) -> Option<Resolved> {
        self.0.pop_back()
    }

    /// Whether `instance` itself, not an equal value, is already tracked.
    #[must_use]
    pub(crate) fn contains(&self, instance: &AnyInstance) -> bool {
        let instance = Arc::as_ptr(instance).cast::<()>();
        self.0.iter().any(|resolved| Arc::as_ptr(&resolved.instance).cast::<()>() == instance)
    }

    /// Moves out every entry cached for `scope`, keeping the relative order.
    #[must_use]
    pub(crate) fn take_scope(&mut self, scope: ScopeId) -> ResolvedSet {
        let (taken, kept) = self.0.drain(..).partition(|resolved| resolved.scope == Some(scope));
        self.0 = kept;
        ResolvedSet(taken)
    }

    #[inline]
    #[must_use]
    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }
}
