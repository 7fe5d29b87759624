use core::fmt::Debug;
use core::iter::FusedIterator;

use crate::error::Error;
use crate::hash_table::Entry as TableEntry;
use crate::hash_table::HashTable;
use crate::hash_table::INITIAL_BUCKET_COUNT;
use crate::type_hash::KeyHasher;
use crate::type_hash::TypeHashing;

/// A hash set built on the separate-chaining [`HashTable`].
///
/// `HashSet<T, S>` shares its design with [`HashMap`](crate::HashMap): values
/// are stored with their cached hash in per-index buckets, and equal hashes
/// are told apart by `Eq`.
#[derive(Clone)]
pub struct HashSet<T, S = TypeHashing> {
    table: HashTable<T>,
    hash_builder: S,
}

impl<T, S> PartialEq for HashSet<T, S>
where
    T: Eq,
    S: KeyHasher<T>,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|v| other.contains(v))
    }
}

impl<T, S> Eq for HashSet<T, S>
where
    T: Eq,
    S: KeyHasher<T>,
{
}

impl<T, S> Debug for HashSet<T, S>
where
    T: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T> HashSet<T, TypeHashing> {
    /// Creates an empty set using [`TypeHashing`]. Does not allocate.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use bucket_hash::HashSet;
    /// #
    /// let set: HashSet<i32> = HashSet::new();
    /// assert!(set.is_empty());
    /// ```
    pub const fn new() -> Self {
        Self {
            table: HashTable::new(),
            hash_builder: TypeHashing,
        }
    }

    /// Creates an empty set using [`TypeHashing`] that can hold at least
    /// `capacity` values before growing.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, TypeHashing)
    }
}

impl<T, S> HashSet<T, S> {
    /// Creates an empty set with the given hasher.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bucket_hash::HashSet;
    /// use bucket_hash::KeyHasher;
    ///
    /// // Strings of equal length share a hash and chain in one bucket.
    /// struct LengthHashing;
    /// impl KeyHasher<String> for LengthHashing {
    ///     fn hash_key(&self, key: &String) -> u64 {
    ///         key.len() as u64
    ///     }
    /// }
    ///
    /// let mut set = HashSet::with_hasher(LengthHashing);
    /// set.insert("x".to_string());
    /// set.insert("y".to_string());
    /// assert!(set.contains(&"x".to_string()));
    /// assert_eq!(set.len(), 2);
    /// ```
    pub fn with_hasher(hash_builder: S) -> Self {
        Self {
            table: HashTable::new(),
            hash_builder,
        }
    }

    /// Creates an empty set with the given hasher that can hold at least
    /// `capacity` values before growing.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use bucket_hash::HashSet;
    /// # use bucket_hash::type_hash::TypeHashing;
    /// #
    /// let set: HashSet<u64> = HashSet::with_capacity_and_hasher(100, TypeHashing);
    /// assert!(set.capacity() >= 100);
    /// ```
    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Self {
        Self {
            table: HashTable::with_capacity(capacity),
            hash_builder,
        }
    }

    /// Returns a reference to the set's hasher.
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }

    /// Returns the number of values in the set.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the set contains no values.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Number of buckets, `0` until the first insertion.
    pub fn bucket_count(&self) -> usize {
        self.table.bucket_count()
    }

    /// Number of values the set can hold before an insert grows it.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Removes every value, keeping the bucket array.
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Removes every value and releases the bucket array.
    pub fn reset(&mut self) {
        self.table.reset();
    }

    /// Reserves room for at least `additional` more values.
    pub fn reserve(&mut self, additional: usize) {
        self.table.reserve(additional);
    }

    /// Tries to reserve room for at least `additional` more values, leaving
    /// the set unchanged on error.
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), Error> {
        self.table.try_reserve(additional)
    }

    /// Calls `f` with every value, in unspecified order.
    pub fn for_each(&self, f: impl FnMut(&T)) {
        self.table.for_each(f);
    }

    /// Keeps only the values for which `f` returns `true`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use bucket_hash::HashSet;
    /// #
    /// let mut set: HashSet<u32> = (1..=6).collect();
    /// set.retain(|&v| v % 2 == 0);
    /// assert_eq!(set.len(), 3);
    /// ```
    pub fn retain(&mut self, mut f: impl FnMut(&T) -> bool) {
        self.table.retain(|v| f(v));
    }

    /// Returns an iterator over the values, in unspecified order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use bucket_hash::HashSet;
    /// #
    /// let mut set = HashSet::new();
    /// set.insert(1);
    /// set.insert(2);
    ///
    /// let mut values: Vec<_> = set.iter().copied().collect();
    /// values.sort();
    /// assert_eq!(values, vec![1, 2]);
    /// ```
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            inner: self.table.iter(),
        }
    }

    /// Removes and yields every value, keeping the bucket array.
    pub fn drain(&mut self) -> Drain<'_, T> {
        Drain {
            inner: self.table.drain(),
        }
    }

    /// A cursor at the first value, or at the end sentinel if the set is
    /// empty.
    pub fn cursor_front(&self) -> crate::hash_table::Cursor<'_, T> {
        self.table.cursor_front()
    }

    /// A cursor at the last value, or at the end sentinel if the set is
    /// empty.
    pub fn cursor_back(&self) -> crate::hash_table::Cursor<'_, T> {
        self.table.cursor_back()
    }

    /// A cursor at the end sentinel.
    pub fn cursor_end(&self) -> crate::hash_table::Cursor<'_, T> {
        self.table.cursor_end()
    }

    /// Histogram of bucket lengths.
    #[cfg(any(test, feature = "stats"))]
    pub fn bucket_histogram(&self) -> alloc::vec::Vec<usize> {
        self.table.bucket_histogram()
    }

    /// Bucket occupancy statistics.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> crate::hash_table::DebugStats {
        self.table.debug_stats()
    }

    /// Pretty-prints the bucket length histogram using stdout.
    #[cfg(all(any(test, feature = "stats"), feature = "std"))]
    pub fn print_bucket_histogram(&self) {
        self.table.print_bucket_histogram();
    }
}

impl<T, S> HashSet<T, S>
where
    T: Eq,
    S: KeyHasher<T>,
{
    /// Adds a value. Returns `false`, keeping the stored value, if an equal
    /// value was already present.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use bucket_hash::HashSet;
    /// #
    /// let mut set = HashSet::new();
    /// assert!(set.insert(2));
    /// assert!(!set.insert(2));
    /// assert_eq!(set.len(), 1);
    /// ```
    pub fn insert(&mut self, value: T) -> bool {
        let hash = self.hash_builder.hash_key(&value);
        match self.table.entry(hash, |v| v == &value) {
            TableEntry::Occupied(_) => false,
            TableEntry::Vacant(entry) => {
                entry.insert(value);
                true
            }
        }
    }

    /// Adds a value, replacing and returning an equal value if one was
    /// present.
    pub fn replace(&mut self, value: T) -> Option<T> {
        let hash = self.hash_builder.hash_key(&value);
        match self.table.entry(hash, |v| v == &value) {
            TableEntry::Occupied(mut entry) => Some(entry.insert(value)),
            TableEntry::Vacant(entry) => {
                entry.insert(value);
                None
            }
        }
    }

    /// Returns `true` if the set contains `value`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use bucket_hash::HashSet;
    /// #
    /// let set: HashSet<_> = [1, 2, 3].into_iter().collect();
    /// assert!(set.contains(&1));
    /// assert!(!set.contains(&4));
    /// ```
    pub fn contains(&self, value: &T) -> bool {
        self.get(value).is_some()
    }

    /// Returns the stored value equal to `value`.
    pub fn get(&self, value: &T) -> Option<&T> {
        let hash = self.hash_builder.hash_key(value);
        self.table.find(hash, |v| v == value)
    }

    /// Returns the stored value equal to `value`.
    ///
    /// # Panics
    ///
    /// Panics if no equal value is present.
    #[track_caller]
    pub fn find_ref(&self, value: &T) -> &T {
        match self.get(value) {
            Some(stored) => stored,
            None => panic!("value not found in HashSet"),
        }
    }

    /// Returns the stored value equal to `value`, or [`Error::KeyNotFound`].
    pub fn try_find(&self, value: &T) -> Result<&T, Error> {
        self.get(value).ok_or(Error::KeyNotFound)
    }

    /// Removes `value`. Returns `true` if it was present.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use bucket_hash::HashSet;
    /// #
    /// let mut set = HashSet::new();
    /// set.insert(2);
    /// assert!(set.remove(&2));
    /// assert!(!set.remove(&2));
    /// ```
    pub fn remove(&mut self, value: &T) -> bool {
        self.take(value).is_some()
    }

    /// Removes and returns the stored value equal to `value`.
    pub fn take(&mut self, value: &T) -> Option<T> {
        let hash = self.hash_builder.hash_key(value);
        self.table.remove(hash, |v| v == value)
    }

    /// Returns `true` if `self` and `other` share no value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use bucket_hash::HashSet;
    /// #
    /// let a: HashSet<_> = [1, 2, 3].into_iter().collect();
    /// let b: HashSet<_> = [4, 5].into_iter().collect();
    /// assert!(a.is_disjoint(&b));
    /// ```
    pub fn is_disjoint(&self, other: &HashSet<T, S>) -> bool {
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        small.iter().all(|v| !large.contains(v))
    }

    /// Returns `true` if every value of `self` is in `other`.
    pub fn is_subset(&self, other: &HashSet<T, S>) -> bool {
        self.len() <= other.len() && self.iter().all(|v| other.contains(v))
    }

    /// Returns `true` if every value of `other` is in `self`.
    pub fn is_superset(&self, other: &HashSet<T, S>) -> bool {
        other.is_subset(self)
    }

    /// Values in `self` or `other`, each yielded once.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use bucket_hash::HashSet;
    /// #
    /// let a: HashSet<_> = [1, 2, 3].into_iter().collect();
    /// let b: HashSet<_> = [3, 4].into_iter().collect();
    ///
    /// let mut union: Vec<_> = a.union(&b).copied().collect();
    /// union.sort();
    /// assert_eq!(union, vec![1, 2, 3, 4]);
    /// ```
    pub fn union<'a>(&'a self, other: &'a HashSet<T, S>) -> Union<'a, T, S> {
        Union {
            iter: self.iter(),
            other_iter: other.iter(),
            set: self,
        }
    }

    /// Values in both `self` and `other`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use bucket_hash::HashSet;
    /// #
    /// let a: HashSet<_> = [1, 2, 3].into_iter().collect();
    /// let b: HashSet<_> = [2, 3, 4].into_iter().collect();
    ///
    /// let mut both: Vec<_> = a.intersection(&b).copied().collect();
    /// both.sort();
    /// assert_eq!(both, vec![2, 3]);
    /// ```
    pub fn intersection<'a>(&'a self, other: &'a HashSet<T, S>) -> Intersection<'a, T, S> {
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        Intersection {
            iter: small.iter(),
            other: large,
        }
    }

    /// Values in `self` but not in `other`.
    pub fn difference<'a>(&'a self, other: &'a HashSet<T, S>) -> Difference<'a, T, S> {
        Difference {
            iter: self.iter(),
            other,
        }
    }

    /// Values in exactly one of `self` and `other`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use bucket_hash::HashSet;
    /// #
    /// let a: HashSet<_> = [1, 2, 3].into_iter().collect();
    /// let b: HashSet<_> = [3, 4].into_iter().collect();
    ///
    /// let mut either: Vec<_> = a.symmetric_difference(&b).copied().collect();
    /// either.sort();
    /// assert_eq!(either, vec![1, 2, 4]);
    /// ```
    pub fn symmetric_difference<'a>(
        &'a self,
        other: &'a HashSet<T, S>,
    ) -> SymmetricDifference<'a, T, S> {
        SymmetricDifference {
            iter: self.difference(other).chain(other.difference(self)),
        }
    }
}

impl<T, S> Default for HashSet<T, S>
where
    S: Default,
{
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

/// An iterator over the values of a `HashSet`.
pub struct Iter<'a, T> {
    inner: crate::hash_table::Iter<'a, T>,
}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

/// A draining iterator over the values of a `HashSet`.
pub struct Drain<'a, T> {
    inner: crate::hash_table::Drain<'a, T>,
}

impl<T> Iterator for Drain<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for Drain<'_, T> {}

impl<T> FusedIterator for Drain<'_, T> {}

/// An owning iterator over the values of a `HashSet`.
pub struct IntoIter<T> {
    inner: crate::hash_table::IntoIter<T>,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> FusedIterator for IntoIter<T> {}

impl<T, S> IntoIterator for HashSet<T, S> {
    type IntoIter = IntoIter<T>;
    type Item = T;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            inner: self.table.into_iter(),
        }
    }
}

impl<'a, T, S> IntoIterator for &'a HashSet<T, S> {
    type IntoIter = Iter<'a, T>;
    type Item = &'a T;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T, S> FromIterator<T> for HashSet<T, S>
where
    T: Eq,
    S: KeyHasher<T> + Default,
{
    /// Builds a set from values, pre-sizing the bucket array to the first
    /// multiple of 17 above the iterator's lower size bound.
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();

        let mut set = Self::with_hasher(S::default());
        if lower > 0 {
            set.table = HashTable::with_bucket_count(
                INITIAL_BUCKET_COUNT * (lower / INITIAL_BUCKET_COUNT + 1),
            );
        }
        for value in iter {
            set.insert(value);
        }
        set
    }
}

impl<T, S> Extend<T> for HashSet<T, S>
where
    T: Eq,
    S: KeyHasher<T>,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();
        let additional = if self.is_empty() {
            lower
        } else {
            lower.div_ceil(2)
        };
        self.reserve(additional);

        for value in iter {
            self.insert(value);
        }
    }
}

/// An iterator over the union of two sets.
pub struct Union<'a, T, S> {
    iter: Iter<'a, T>,
    other_iter: Iter<'a, T>,
    set: &'a HashSet<T, S>,
}

impl<'a, T, S> Iterator for Union<'a, T, S>
where
    T: Eq,
    S: KeyHasher<T>,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(v) = self.iter.next() {
            return Some(v);
        }
        loop {
            let v = self.other_iter.next()?;
            if !self.set.contains(v) {
                return Some(v);
            }
        }
    }
}

impl<T, S> FusedIterator for Union<'_, T, S>
where
    T: Eq,
    S: KeyHasher<T>,
{
}

/// An iterator over the intersection of two sets.
pub struct Intersection<'a, T, S> {
    iter: Iter<'a, T>,
    other: &'a HashSet<T, S>,
}

impl<'a, T, S> Iterator for Intersection<'a, T, S>
where
    T: Eq,
    S: KeyHasher<T>,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let v = self.iter.next()?;
            if self.other.contains(v) {
                return Some(v);
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.iter.size_hint().1)
    }
}

/// An iterator over the difference of two sets.
pub struct Difference<'a, T, S> {
    iter: Iter<'a, T>,
    other: &'a HashSet<T, S>,
}

impl<'a, T, S> Iterator for Difference<'a, T, S>
where
    T: Eq,
    S: KeyHasher<T>,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let v = self.iter.next()?;
            if !self.other.contains(v) {
                return Some(v);
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.iter.size_hint().1)
    }
}

/// An iterator over the symmetric difference of two sets.
pub struct SymmetricDifference<'a, T, S> {
    iter: core::iter::Chain<Difference<'a, T, S>, Difference<'a, T, S>>,
}

impl<'a, T, S> Iterator for SymmetricDifference<'a, T, S>
where
    T: Eq,
    S: KeyHasher<T>,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next()
    }
}
