//! Index arena backing graph node storage.
//!
//! Node identifiers double as the identifiers written into the exported
//! terms, so they must be:
//! - **Dense**: allocated in order starting at zero
//! - **Stable**: never reused or renumbered while the graph lives
//! - **Typed**: an `Id<Node>` cannot be confused with any other index

use std::fmt;
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

// =============================================================================
// Typed ID
// =============================================================================

/// A typed index into an [`Arena`].
///
/// Trait impls are written by hand so that `Id<T>` is `Copy`/`Eq`/`Hash`
/// whatever `T` is.
pub struct Id<T> {
    index: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Id<T> {
    /// Create an ID from a raw index.
    #[inline]
    pub const fn new(index: u32) -> Self {
        Id {
            index,
            _marker: PhantomData,
        }
    }

    /// Raw index.
    #[inline]
    pub const fn index(self) -> u32 {
        self.index
    }

    #[inline]
    pub const fn as_usize(self) -> usize {
        self.index as usize
    }

    /// Placeholder for an edge that has not been linked yet.
    pub const INVALID: Self = Id {
        index: u32::MAX,
        _marker: PhantomData,
    };

    #[inline]
    pub const fn is_valid(self) -> bool {
        self.index != u32::MAX
    }
}

impl<T> Copy for Id<T> {}

impl<T> Clone for Id<T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> PartialEq for Id<T> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<T> Eq for Id<T> {}

impl<T> PartialOrd for Id<T> {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Id<T> {
    #[inline]
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.index.cmp(&other.index)
    }
}

impl<T> std::hash::Hash for Id<T> {
    #[inline]
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

impl<T> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "#{}", self.index)
        } else {
            f.write_str("#INVALID")
        }
    }
}

/// Displays the bare number, which is the form used in exported terms.
impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index)
    }
}

// =============================================================================
// Arena
// =============================================================================

/// Append-only storage addressed by [`Id`].
///
/// Items are never removed; graphs mark dead nodes with a flag instead so
/// that every issued ID stays valid.
#[derive(Debug, Clone)]
pub struct Arena<T> {
    items: Vec<T>,
}

impl<T> Arena<T> {
    #[inline]
    pub fn new() -> Self {
        Arena { items: Vec::new() }
    }

    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Arena {
            items: Vec::with_capacity(capacity),
        }
    }

    /// Store `item` and return its ID.
    #[inline]
    pub fn alloc(&mut self, item: T) -> Id<T> {
        let id = self.next_id();
        self.items.push(item);
        id
    }

    #[inline]
    pub fn get(&self, id: Id<T>) -> Option<&T> {
        self.items.get(id.as_usize())
    }

    #[inline]
    pub fn get_mut(&mut self, id: Id<T>) -> Option<&mut T> {
        self.items.get_mut(id.as_usize())
    }

    /// Whether `id` was issued by this arena.
    #[inline]
    pub fn contains(&self, id: Id<T>) -> bool {
        id.as_usize() < self.items.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate items in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (Id<T>, &T)> {
        self.items
            .iter()
            .enumerate()
            .map(|(i, item)| (Id::new(i as u32), item))
    }

    /// The ID the next `alloc` will return.
    #[inline]
    pub fn next_id(&self) -> Id<T> {
        Id::new(self.items.len() as u32)
    }
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<Id<T>> for Arena<T> {
    type Output = T;

    #[inline]
    fn index(&self, id: Id<T>) -> &T {
        &self.items[id.as_usize()]
    }
}

impl<T> IndexMut<Id<T>> for Arena<T> {
    #[inline]
    fn index_mut(&mut self, id: Id<T>) -> &mut T {
        &mut self.items[id.as_usize()]
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Slot(&'static str);

    #[test]
    fn test_ids_are_dense_and_ordered() {
        let mut arena: Arena<Slot> = Arena::new();
        let a = arena.alloc(Slot("a"));
        let b = arena.alloc(Slot("b"));

        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert!(a < b);
        assert_eq!(arena.next_id().index(), 2);
        assert_eq!(arena[b].0, "b");
    }

    #[test]
    fn test_contains_rejects_foreign_ids() {
        let mut arena: Arena<Slot> = Arena::new();
        arena.alloc(Slot("only"));
        assert!(arena.contains(Id::new(0)));
        assert!(!arena.contains(Id::new(1)));
        assert!(arena.get(Id::new(7)).is_none());
    }

    #[test]
    fn test_display_is_bare_number() {
        let id: Id<Slot> = Id::new(42);
        assert_eq!(id.to_string(), "42");
        assert_eq!(format!("{:?}", id), "#42");
        assert_eq!(format!("{:?}", Id::<Slot>::INVALID), "#INVALID");
        assert!(!Id::<Slot>::INVALID.is_valid());
    }

    #[test]
    fn test_iter_in_allocation_order() {
        let mut arena: Arena<Slot> = Arena::new();
        arena.alloc(Slot("x"));
        arena.alloc(Slot("y"));
        arena[Id::new(1)].0 = "z";
        let names: Vec<_> = arena.iter().map(|(_, s)| s.0).collect();
        assert_eq!(names, vec!["x", "z"]);
    }
}
