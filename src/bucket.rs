use alloc::vec::Vec;
use core::alloc::Layout;

use crate::error::Error;

/// A stored value together with the hash it was inserted under.
///
/// The hash is cached so growth and lookups never re-hash a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot<V> {
    /// The hash the value was inserted under.
    pub hash: u64,
    /// The stored value.
    pub value: V,
}

/// An unordered, contiguous run of slots that share a bucket index.
///
/// Every bucket owns its storage independently of its siblings. Storage grows
/// by doubling when full and is only released by [`Bucket::clear`] or
/// [`Bucket::drain`].
///
/// Lookups match a slot when its cached hash equals the probe hash *and* the
/// caller's `eq` predicate accepts its value, so distinct values with equal
/// hashes can coexist in one bucket.
#[derive(Debug, Clone)]
pub struct Bucket<V> {
    slots: Vec<Slot<V>>,
}

impl<V> Default for Bucket<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Bucket<V> {
    /// Creates an empty bucket. Does not allocate.
    pub const fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Number of slots in the bucket.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if the bucket holds no slots.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of slots the bucket can hold without reallocating.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// The slots in storage order.
    #[inline]
    pub fn slots(&self) -> &[Slot<V>] {
        &self.slots
    }

    #[inline]
    pub(crate) fn slots_mut(&mut self) -> &mut [Slot<V>] {
        &mut self.slots
    }

    /// Iterates over the values in storage order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &V> + ExactSizeIterator {
        self.slots.iter().map(|slot| &slot.value)
    }

    /// Iterates mutably over the values in storage order.
    pub fn iter_mut(&mut self) -> impl DoubleEndedIterator<Item = &mut V> + ExactSizeIterator {
        self.slots.iter_mut().map(|slot| &mut slot.value)
    }

    /// Returns the slot at `index`.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&Slot<V>> {
        self.slots.get(index)
    }

    /// Position of the slot matching `hash` and `eq`.
    #[inline]
    pub fn position(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| slot.hash == hash && eq(&slot.value))
    }

    /// Inserts `value` under `hash`.
    ///
    /// If a slot matching `hash` and `eq` exists its value is overwritten in
    /// place and the previous value is returned. Otherwise a new slot is
    /// appended and `None` is returned.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bucket_hash::bucket::Bucket;
    ///
    /// let mut bucket = Bucket::new();
    /// assert_eq!(bucket.insert(7, ("a", 1), |(k, _)| *k == "a"), None);
    /// assert_eq!(bucket.insert(7, ("a", 2), |(k, _)| *k == "a"), Some(("a", 1)));
    /// assert_eq!(bucket.len(), 1);
    /// ```
    pub fn insert(&mut self, hash: u64, value: V, eq: impl Fn(&V) -> bool) -> Option<V> {
        match self.position(hash, eq) {
            Some(index) => Some(core::mem::replace(&mut self.slots[index].value, value)),
            None => {
                self.push(hash, value);
                None
            }
        }
    }

    /// Appends a slot without looking for an existing match.
    ///
    /// The caller guarantees no slot with an equal value is present.
    pub fn push(&mut self, hash: u64, value: V) -> &mut V {
        if self.slots.len() == self.slots.capacity() {
            let target = (self.slots.len() + 1) * 2;
            self.slots.reserve_exact(target - self.slots.len());
        }
        self.slots.push(Slot { hash, value });

        let last = self.slots.len() - 1;
        &mut self.slots[last].value
    }

    /// Finds the value matching `hash` and `eq`.
    #[inline]
    pub fn find(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&V> {
        self.slots
            .iter()
            .find(|slot| slot.hash == hash && eq(&slot.value))
            .map(|slot| &slot.value)
    }

    /// Finds the value matching `hash` and `eq` mutably.
    #[inline]
    pub fn find_mut(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&mut V> {
        self.slots
            .iter_mut()
            .find(|slot| slot.hash == hash && eq(&slot.value))
            .map(|slot| &mut slot.value)
    }

    /// Removes the value matching `hash` and `eq`.
    ///
    /// Every following slot shifts down by one, so the remaining slots keep
    /// their relative order.
    pub fn remove(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<V> {
        let index = self.position(hash, eq)?;
        Some(self.remove_at(index).value)
    }

    /// Removes the slot at `index`, shifting the following slots down.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    #[inline]
    pub fn remove_at(&mut self, index: usize) -> Slot<V> {
        self.slots.remove(index)
    }

    /// Keeps only the values for which `f` returns `true`.
    pub(crate) fn retain(&mut self, mut f: impl FnMut(&mut V) -> bool) {
        self.slots.retain_mut(|slot| f(&mut slot.value));
    }

    /// Drops every value and releases the storage.
    pub fn clear(&mut self) {
        self.slots = Vec::new();
    }

    /// Moves every slot out, leaving the bucket empty and unallocated.
    pub fn drain(&mut self) -> alloc::vec::IntoIter<Slot<V>> {
        core::mem::take(&mut self.slots).into_iter()
    }

    /// Reserves storage for exactly `additional` more slots.
    ///
    /// On failure the bucket is unchanged.
    pub fn try_reserve_exact(&mut self, additional: usize) -> Result<(), Error> {
        let total = self
            .slots
            .len()
            .checked_add(additional)
            .ok_or(Error::CapacityOverflow)?;
        let layout = Layout::array::<Slot<V>>(total).map_err(|_| Error::CapacityOverflow)?;

        self.slots
            .try_reserve_exact(additional)
            .map_err(|_| Error::AllocFailed { layout })
    }

    /// Appends into storage reserved by [`Bucket::try_reserve_exact`].
    #[inline]
    pub(crate) fn push_reserved(&mut self, slot: Slot<V>) {
        debug_assert!(self.slots.len() < self.slots.capacity());
        self.slots.push(slot);
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::string::ToString;
    use alloc::vec;
    use alloc::vec::Vec;

    use super::*;

    fn key_eq(key: &str) -> impl Fn(&(String, i32)) -> bool + '_ {
        move |(k, _)| k == key
    }

    #[test]
    fn test_insert_new_and_overwrite() {
        let mut bucket = Bucket::new();
        assert!(bucket.is_empty());
        assert_eq!(bucket.capacity(), 0);

        assert_eq!(bucket.insert(1, ("a".to_string(), 1), key_eq("a")), None);
        assert_eq!(bucket.insert(2, ("b".to_string(), 2), key_eq("b")), None);
        assert_eq!(bucket.len(), 2);

        assert_eq!(
            bucket.insert(1, ("a".to_string(), 10), key_eq("a")),
            Some(("a".to_string(), 1))
        );
        assert_eq!(bucket.len(), 2);
        assert_eq!(bucket.find(1, key_eq("a")), Some(&("a".to_string(), 10)));
    }

    #[test]
    fn test_equal_hash_distinct_values_chain() {
        let mut bucket = Bucket::new();
        bucket.insert(5, ("a".to_string(), 1), key_eq("a"));
        bucket.insert(5, ("b".to_string(), 2), key_eq("b"));

        assert_eq!(bucket.len(), 2);
        assert_eq!(bucket.find(5, key_eq("a")).map(|(_, v)| *v), Some(1));
        assert_eq!(bucket.find(5, key_eq("b")).map(|(_, v)| *v), Some(2));
    }

    #[test]
    fn test_hash_only_match_overwrites() {
        let mut bucket = Bucket::new();
        bucket.insert(5, ("a".to_string(), 1), |_| true);
        let old = bucket.insert(5, ("b".to_string(), 2), |_| true);

        assert_eq!(old, Some(("a".to_string(), 1)));
        assert_eq!(bucket.len(), 1);
        assert_eq!(bucket.find(5, |_| true), Some(&("b".to_string(), 2)));
    }

    #[test]
    fn test_storage_doubles() {
        let mut bucket = Bucket::new();
        assert_eq!(bucket.capacity(), 0);

        for i in 0..40u64 {
            let len = bucket.len();
            let before = bucket.capacity();
            bucket.push(i, i);

            if len < before {
                assert_eq!(bucket.capacity(), before);
            } else {
                assert!(bucket.capacity() >= (len + 1) * 2);
            }
        }
        assert_eq!(bucket.len(), 40);
    }

    #[test]
    fn test_remove_keeps_order() {
        let mut bucket = Bucket::new();
        for i in 0..5u64 {
            bucket.push(i, i);
        }

        assert_eq!(bucket.remove(1, |&v| v == 1), Some(1));
        assert_eq!(bucket.remove(9, |&v| v == 9), None);
        assert_eq!(bucket.iter().copied().collect::<Vec<_>>(), vec![0, 2, 3, 4]);

        let slot = bucket.remove_at(0);
        assert_eq!(slot, Slot { hash: 0, value: 0 });
        assert_eq!(bucket.iter().copied().collect::<Vec<_>>(), vec![2, 3, 4]);
    }

    #[test]
    fn test_find_mut() {
        let mut bucket = Bucket::new();
        bucket.push(3, ("x".to_string(), 1));

        if let Some((_, v)) = bucket.find_mut(3, key_eq("x")) {
            *v += 41;
        }
        assert_eq!(bucket.find(3, key_eq("x")).map(|(_, v)| *v), Some(42));
        assert!(bucket.find_mut(3, key_eq("y")).is_none());
    }

    #[test]
    fn test_clear_releases_storage() {
        let mut bucket = Bucket::new();
        bucket.push(1, "one".to_string());
        bucket.push(2, "two".to_string());

        bucket.clear();
        assert!(bucket.is_empty());
        assert_eq!(bucket.capacity(), 0);
    }

    #[test]
    fn test_drain_moves_everything() {
        let mut bucket = Bucket::new();
        bucket.push(1, 10);
        bucket.push(2, 20);

        let drained: Vec<Slot<i32>> = bucket.drain().collect();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[1], Slot { hash: 2, value: 20 });
        assert!(bucket.is_empty());
        assert_eq!(bucket.capacity(), 0);
    }

    #[test]
    fn test_try_reserve_exact() {
        let mut bucket: Bucket<u64> = Bucket::new();
        assert_eq!(bucket.try_reserve_exact(4), Ok(()));
        assert!(bucket.capacity() >= 4);

        assert_eq!(
            bucket.try_reserve_exact(usize::MAX),
            Err(Error::CapacityOverflow)
        );
        assert!(bucket.is_empty());
    }
}
