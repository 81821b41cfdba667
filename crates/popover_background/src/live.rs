//! Registry of live popover backgrounds
//!
//! Holds non-owning handles to every constructed background so a style change
//! can refresh all of them at once. Handles of destroyed instances stay in the
//! backing list, inert, until [`LiveInstanceRegistry::compact`] runs; the list
//! is never shrunk from inside a destructor or while it is being walked.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::style::{RefreshAspects, StyleKind};

/// Something that can re-derive its presentation from the style registry
pub trait Refresh {
    fn refresh(&mut self, aspects: RefreshAspects);

    /// False once teardown has begun
    fn is_alive(&self) -> bool {
        true
    }
}

struct LiveEntry<T> {
    kind: StyleKind,
    handle: Weak<RefCell<T>>,
}

impl<T: Refresh> LiveEntry<T> {
    fn upgrade(&self) -> Option<Rc<RefCell<T>>> {
        self.handle.upgrade()
    }

    fn is_live(&self) -> bool {
        self.upgrade()
            .is_some_and(|inst| inst.try_borrow().map_or(true, |i| i.is_alive()))
    }
}

/// Strong handle to a live instance, held only for the length of a broadcast
pub struct LiveHandle<T> {
    kind: StyleKind,
    instance: Rc<RefCell<T>>,
}

impl<T> LiveHandle<T> {
    pub fn kind(&self) -> StyleKind {
        self.kind
    }
}

/// Refresh every handle, whatever its kind
///
/// Each instance re-reads its own kind's values, so instances of other kinds
/// simply recompute what they already had. Instances in teardown are skipped,
/// and so is an instance that is mid-refresh further up the stack (its fill
/// provider wrote a style); it picks the change up on its next refresh.
/// Returns the number of instances refreshed.
pub fn refresh_all<T: Refresh>(handles: &[LiveHandle<T>], aspects: RefreshAspects) -> usize {
    let mut refreshed = 0;
    for handle in handles {
        let Ok(mut instance) = handle.instance.try_borrow_mut() else {
            tracing::warn!(
                kind = %handle.kind,
                "skipping popover background busy during broadcast"
            );
            continue;
        };
        if !instance.is_alive() {
            continue;
        }
        instance.refresh(aspects);
        refreshed += 1;
    }
    tracing::trace!(?aspects, refreshed, handles = handles.len(), "broadcast style refresh");
    refreshed
}

/// Weakly referenced collection of live instances
pub struct LiveInstanceRegistry<T> {
    entries: Vec<LiveEntry<T>>,
}

impl<T: Refresh> LiveInstanceRegistry<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Track an instance without taking ownership of it
    pub fn register(&mut self, kind: StyleKind, instance: &Rc<RefCell<T>>) {
        self.entries.push(LiveEntry {
            kind,
            handle: Rc::downgrade(instance),
        });
        tracing::debug!(%kind, slots = self.entries.len(), "registered popover background");
    }

    /// Strong handles to every instance that has not been dropped yet
    ///
    /// Taken so the registry itself can be released before any instance is
    /// refreshed; refreshing may construct or drop instances.
    pub fn snapshot(&self) -> Vec<LiveHandle<T>> {
        self.entries
            .iter()
            .filter_map(|entry| {
                entry.upgrade().map(|instance| LiveHandle {
                    kind: entry.kind,
                    instance,
                })
            })
            .collect()
    }

    /// Refresh every live instance, whatever its kind
    ///
    /// Same as [`refresh_all`] over a [`snapshot`](Self::snapshot).
    pub fn broadcast(&self, aspects: RefreshAspects) -> usize {
        refresh_all(&self.snapshot(), aspects)
    }

    /// Drop handles whose instances are gone; returns how many were removed
    pub fn compact(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.is_live());
        let removed = before - self.entries.len();
        tracing::debug!(removed, slots = self.entries.len(), "compacted live popover backgrounds");
        removed
    }

    /// Size of the backing list, dead slots included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of instances still alive
    pub fn live_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.is_live()).count()
    }

    /// Number of live instances of one kind
    pub fn live_count_of(&self, kind: StyleKind) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.kind == kind && entry.is_live())
            .count()
    }
}

impl<T: Refresh> Default for LiveInstanceRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: StyleKind = StyleKind::new("A");
    const B: StyleKind = StyleKind::new("B");

    #[derive(Default)]
    struct Probe {
        fills: usize,
        layouts: usize,
        alive: bool,
    }

    impl Probe {
        fn shared() -> Rc<RefCell<Probe>> {
            Rc::new(RefCell::new(Probe {
                alive: true,
                ..Default::default()
            }))
        }
    }

    impl Refresh for Probe {
        fn refresh(&mut self, aspects: RefreshAspects) {
            if aspects.contains(RefreshAspects::FILL) {
                self.fills += 1;
            }
            if aspects.contains(RefreshAspects::LAYOUT) {
                self.layouts += 1;
            }
        }

        fn is_alive(&self) -> bool {
            self.alive
        }
    }

    #[test]
    fn test_broadcast_reaches_every_kind() {
        let mut registry = LiveInstanceRegistry::new();
        let a1 = Probe::shared();
        let a2 = Probe::shared();
        let b = Probe::shared();
        registry.register(A, &a1);
        registry.register(A, &a2);
        registry.register(B, &b);

        assert_eq!(registry.broadcast(RefreshAspects::LAYOUT), 3);
        assert_eq!(registry.broadcast(RefreshAspects::all()), 3);

        for probe in [&a1, &a2, &b] {
            assert_eq!(probe.borrow().layouts, 2);
            assert_eq!(probe.borrow().fills, 1);
        }
        assert_eq!(registry.live_count_of(A), 2);
        assert_eq!(registry.live_count_of(B), 1);
    }

    #[test]
    fn test_registry_does_not_own_instances() {
        let mut registry = LiveInstanceRegistry::new();
        let a = Probe::shared();
        registry.register(A, &a);
        assert_eq!(Rc::strong_count(&a), 1);

        drop(a);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.live_count(), 0);
    }

    #[test]
    fn test_dead_handles_are_skipped_until_compaction() {
        let mut registry = LiveInstanceRegistry::new();
        let a = Probe::shared();
        let b = Probe::shared();
        registry.register(A, &a);
        registry.register(B, &b);

        drop(a);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.broadcast(RefreshAspects::LAYOUT), 1);
        assert_eq!(b.borrow().layouts, 1);

        assert_eq!(registry.compact(), 1);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.compact(), 0);
    }

    #[test]
    fn test_busy_instance_is_skipped() {
        let mut registry = LiveInstanceRegistry::new();
        let a = Probe::shared();
        let b = Probe::shared();
        registry.register(A, &a);
        registry.register(B, &b);

        let handles = registry.snapshot();
        {
            let _busy = a.borrow_mut();
            assert_eq!(refresh_all(&handles, RefreshAspects::LAYOUT), 1);
        }
        assert_eq!(a.borrow().layouts, 0);
        assert_eq!(b.borrow().layouts, 1);
        assert_eq!(handles[1].kind(), B);
    }

    #[test]
    fn test_snapshot_leaves_out_dropped_instances() {
        let mut registry = LiveInstanceRegistry::new();
        let a = Probe::shared();
        let b = Probe::shared();
        registry.register(A, &a);
        registry.register(B, &b);

        drop(a);
        let handles = registry.snapshot();
        assert_eq!(handles.len(), 1);
        assert_eq!(handles[0].kind(), B);
        // The snapshot keeps its instance alive until it is released
        assert_eq!(Rc::strong_count(&b), 2);
        drop(handles);
        assert_eq!(Rc::strong_count(&b), 1);
    }

    #[test]
    fn test_instances_in_teardown_are_inert() {
        let mut registry = LiveInstanceRegistry::new();
        let a = Probe::shared();
        registry.register(A, &a);

        a.borrow_mut().alive = false;
        assert_eq!(registry.broadcast(RefreshAspects::LAYOUT), 0);
        assert_eq!(a.borrow().layouts, 0);
        assert_eq!(registry.live_count(), 0);
    }
}
