/// Stable handle to a drawable registered with a scheduler.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct DrawableId(pub(crate) usize);

/// Stable handle to a plain tick callback.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct TickId(pub(crate) usize);

/// Stable handle to a per-drawable tick callback.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct IterTickId(pub(crate) usize);

macro_rules! impl_index {
    ($($id:ty),*) => {$(
        impl $id {
            /// Registration index; also the slot position.
            #[inline]
            pub const fn index(self) -> usize {
                self.0
            }
        }
    )*};
}

impl_index!(DrawableId, TickId, IterTickId);

/// Append-only arena with tombstones.
///
/// Slots are never reused, so registration order is preserved for the
/// lifetime of the arena and every handle stays valid (or dead) forever.
#[derive(Debug)]
pub(crate) struct Slots<T> {
    entries: Vec<Option<T>>,
    live: usize,
}

impl<T> Slots<T> {
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
            live: 0,
        }
    }

    pub(crate) fn push(&mut self, value: T) -> usize {
        self.entries.push(Some(value));
        self.live += 1;
        self.entries.len() - 1
    }

    pub(crate) fn remove(&mut self, index: usize) -> Option<T> {
        let taken = self.entries.get_mut(index)?.take();
        if taken.is_some() {
            self.live -= 1;
        }
        taken
    }

    pub(crate) fn get(&self, index: usize) -> Option<&T> {
        self.entries.get(index)?.as_ref()
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.entries.get_mut(index)?.as_mut()
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.live
    }

    /// Live values in registration order.
    pub(crate) fn iter(&self) -> impl DoubleEndedIterator<Item = &T> {
        self.entries.iter().filter_map(Option::as_ref)
    }

    pub(crate) fn iter_mut(&mut self) -> impl DoubleEndedIterator<Item = &mut T> {
        self.entries.iter_mut().filter_map(Option::as_mut)
    }

    /// Live values with their slot index, in registration order.
    pub(crate) fn indexed(&self) -> impl DoubleEndedIterator<Item = (usize, &T)> {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.as_ref().map(|v| (i, v)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removal_tombstones_without_shifting() {
        let mut s = Slots::new();
        let a = s.push('a');
        let b = s.push('b');
        let c = s.push('c');

        assert_eq!(s.remove(b), Some('b'));
        assert_eq!(s.remove(b), None);
        assert_eq!(s.len(), 2);
        assert_eq!(s.get(a), Some(&'a'));
        assert_eq!(s.get(c), Some(&'c'));
        assert_eq!(s.iter().rev().copied().collect::<String>(), "ca");
    }

    #[test]
    fn slots_are_not_reused() {
        let mut s = Slots::new();
        let a = s.push(1);
        s.remove(a);
        let b = s.push(2);
        assert_ne!(a, b);
        assert_eq!(s.get(a), None);
        assert_eq!(s.indexed().collect::<Vec<_>>(), vec![(b, &2)]);
    }

    #[test]
    fn out_of_range_is_none() {
        let mut s: Slots<u8> = Slots::new();
        assert_eq!(s.get(3), None);
        assert_eq!(s.remove(3), None);
        assert!(s.get_mut(0).is_none());
    }
}
