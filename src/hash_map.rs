use core::fmt::Debug;
use core::iter::FusedIterator;
use core::ops::Index;

use crate::error::Error;
use crate::hash_table::Entry as TableEntry;
use crate::hash_table::HashTable;
use crate::hash_table::INITIAL_BUCKET_COUNT;
use crate::type_hash::KeyHasher;
use crate::type_hash::TypeHashing;

/// A hash map built on the separate-chaining [`HashTable`].
///
/// `HashMap<K, V, S>` stores key-value pairs where keys implement `Eq` and
/// the hasher `S` implements [`KeyHasher<K>`]. The default hasher,
/// [`TypeHashing`], uses each key's [`TypeHash`](crate::type_hash::TypeHash)
/// implementation; any [`BuildHasher`](core::hash::BuildHasher) works for
/// keys that implement `Hash`.
///
/// Keys with equal hashes are chained in the same bucket and told apart by
/// `Eq`, so a collision never loses an entry.
///
/// # Memory
///
/// One `Vec` header per bucket, plus `(K, V)` and a cached `u64` hash per
/// entry. Bucket storage grows by doubling.
#[derive(Clone)]
pub struct HashMap<K, V, S = TypeHashing> {
    table: HashTable<(K, V)>,
    hash_builder: S,
}

impl<K, V, S> Debug for HashMap<K, V, S>
where
    K: Debug,
    V: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V> HashMap<K, V, TypeHashing> {
    /// Creates an empty map using [`TypeHashing`]. Does not allocate.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use bucket_hash::HashMap;
    /// #
    /// let map: HashMap<i32, String> = HashMap::new();
    /// assert!(map.is_empty());
    /// assert_eq!(map.bucket_count(), 0);
    /// ```
    pub const fn new() -> Self {
        Self {
            table: HashTable::new(),
            hash_builder: TypeHashing,
        }
    }

    /// Creates an empty map using [`TypeHashing`] that can hold at least
    /// `capacity` entries before growing.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use bucket_hash::HashMap;
    /// #
    /// let map: HashMap<i32, String> = HashMap::with_capacity(100);
    /// assert!(map.capacity() >= 100);
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, TypeHashing)
    }
}

impl<K, V, S> HashMap<K, V, S> {
    /// Creates an empty map with the given hasher.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bucket_hash::HashMap;
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
    /// let mut map = HashMap::with_hasher(LengthHashing);
    /// map.insert("ab".to_string(), 1);
    /// map.insert("cd".to_string(), 2);
    /// assert_eq!(map.get(&"ab".to_string()), Some(&1));
    /// assert_eq!(map.get(&"cd".to_string()), Some(&2));
    /// ```
    pub fn with_hasher(hash_builder: S) -> Self {
        Self {
            table: HashTable::new(),
            hash_builder,
        }
    }

    /// Creates an empty map with the given hasher that can hold at least
    /// `capacity` entries before growing.
    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Self {
        Self {
            table: HashTable::with_capacity(capacity),
            hash_builder,
        }
    }

    /// Returns a reference to the map's hasher.
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }

    /// Returns the number of entries in the map.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use bucket_hash::HashMap;
    /// #
    /// let mut map = HashMap::new();
    /// assert_eq!(map.len(), 0);
    /// map.insert(1, "a");
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the map contains no entries.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Number of buckets, `0` until the first insertion.
    pub fn bucket_count(&self) -> usize {
        self.table.bucket_count()
    }

    /// Number of entries the map can hold before an insert grows it.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Removes every entry, keeping the bucket array.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use bucket_hash::HashMap;
    /// #
    /// let mut map = HashMap::new();
    /// map.insert(1, "a");
    /// map.clear();
    /// assert!(map.is_empty());
    /// assert_eq!(map.bucket_count(), 17);
    /// ```
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Removes every entry and releases the bucket array.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use bucket_hash::HashMap;
    /// #
    /// let mut map = HashMap::new();
    /// map.insert(1, "a");
    /// map.reset();
    /// assert!(map.is_empty());
    /// assert_eq!(map.bucket_count(), 0);
    /// ```
    pub fn reset(&mut self) {
        self.table.reset();
    }

    /// Reserves room for at least `additional` more entries.
    pub fn reserve(&mut self, additional: usize) {
        self.table.reserve(additional);
    }

    /// Tries to reserve room for at least `additional` more entries, leaving
    /// the map unchanged on error.
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), Error> {
        self.table.try_reserve(additional)
    }

    /// Calls `f` with every key and value, in unspecified order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use bucket_hash::HashMap;
    /// #
    /// let map: HashMap<u32, u32> = (0..10).map(|i| (i, i * 2)).collect();
    ///
    /// let mut sum = 0;
    /// map.for_each(|_, v| sum += v);
    /// assert_eq!(sum, 90);
    /// ```
    pub fn for_each(&self, mut f: impl FnMut(&K, &V)) {
        self.table.for_each(|(k, v)| f(k, v));
    }

    /// Keeps only the entries for which `f` returns `true`.
    pub fn retain(&mut self, mut f: impl FnMut(&K, &mut V) -> bool) {
        self.table.retain(|(k, v)| f(k, v));
    }

    /// Returns an iterator over the entries, in unspecified order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use bucket_hash::HashMap;
    /// #
    /// let mut map = HashMap::new();
    /// map.insert(1, "a");
    /// map.insert(2, "b");
    ///
    /// for (key, value) in map.iter() {
    ///     println!("Key: {}, Value: {}", key, value);
    /// }
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.table.iter(),
        }
    }

    /// Returns an iterator over the entries with mutable values.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            inner: self.table.iter_mut(),
        }
    }

    /// Returns an iterator over the keys.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Returns an iterator over the values.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Returns an iterator over mutable references to the values.
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut {
            inner: self.iter_mut(),
        }
    }

    /// Removes and yields every entry, keeping the bucket array.
    pub fn drain(&mut self) -> Drain<'_, K, V> {
        Drain {
            inner: self.table.drain(),
        }
    }

    /// A cursor at the first entry, or at the end sentinel if the map is
    /// empty.
    pub fn cursor_front(&self) -> Cursor<'_, K, V> {
        Cursor {
            inner: self.table.cursor_front(),
        }
    }

    /// A cursor at the last entry, or at the end sentinel if the map is
    /// empty.
    pub fn cursor_back(&self) -> Cursor<'_, K, V> {
        Cursor {
            inner: self.table.cursor_back(),
        }
    }

    /// A cursor at the end sentinel.
    pub fn cursor_end(&self) -> Cursor<'_, K, V> {
        Cursor {
            inner: self.table.cursor_end(),
        }
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

impl<K, V, S> HashMap<K, V, S>
where
    K: Eq,
    S: KeyHasher<K>,
{
    /// Inserts a key-value pair.
    ///
    /// If the key was present its value is replaced, the stored key is kept,
    /// and the old value is returned.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use bucket_hash::HashMap;
    /// #
    /// let mut map = HashMap::new();
    /// assert_eq!(map.insert(37, "a"), None);
    /// assert_eq!(map.insert(37, "b"), Some("a"));
    /// assert_eq!(map.get(&37), Some(&"b"));
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let hash = self.hash_builder.hash_key(&key);
        match self.table.entry(hash, |(k, _)| k == &key) {
            TableEntry::Occupied(mut entry) => {
                let old_value = core::mem::replace(&mut entry.get_mut().1, value);
                Some(old_value)
            }
            TableEntry::Vacant(entry) => {
                entry.insert((key, value));
                None
            }
        }
    }

    /// Inserts a `(key, value)` pair. Same as [`HashMap::insert`].
    pub fn insert_pair(&mut self, (key, value): (K, V)) -> Option<V> {
        self.insert(key, value)
    }

    /// Returns a reference to the value for `key`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use bucket_hash::HashMap;
    /// #
    /// let mut map = HashMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.get(&1), Some(&"a"));
    /// assert_eq!(map.get(&2), None);
    /// ```
    pub fn get(&self, key: &K) -> Option<&V> {
        self.get_key_value(key).map(|(_, v)| v)
    }

    /// Returns the stored key and its value.
    pub fn get_key_value(&self, key: &K) -> Option<(&K, &V)> {
        let hash = self.hash_builder.hash_key(key);
        self.table
            .find(hash, |(k, _)| k == key)
            .map(|(k, v)| (k, v))
    }

    /// Returns a mutable reference to the value for `key`.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let hash = self.hash_builder.hash_key(key);
        self.table
            .find_mut(hash, |(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Returns a reference to the value for `key`.
    ///
    /// # Panics
    ///
    /// Panics if `key` is not present. Use [`HashMap::get`] or
    /// [`HashMap::try_find`] when absence is expected.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use bucket_hash::HashMap;
    /// #
    /// let mut map = HashMap::new();
    /// map.insert("a", 1);
    /// assert_eq!(*map.find(&"a"), 1);
    /// ```
    #[track_caller]
    pub fn find(&self, key: &K) -> &V {
        match self.get(key) {
            Some(value) => value,
            None => panic!("key not found in HashMap"),
        }
    }

    /// Returns a mutable reference to the value for `key`.
    ///
    /// # Panics
    ///
    /// Panics if `key` is not present.
    #[track_caller]
    pub fn find_ref(&mut self, key: &K) -> &mut V {
        match self.get_mut(key) {
            Some(value) => value,
            None => panic!("key not found in HashMap"),
        }
    }

    /// Returns a copy of the value for `key`.
    ///
    /// # Panics
    ///
    /// Panics if `key` is not present.
    #[track_caller]
    pub fn find_cloned(&self, key: &K) -> V
    where
        V: Clone,
    {
        self.find(key).clone()
    }

    /// Returns a reference to the value for `key`, or
    /// [`Error::KeyNotFound`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use bucket_hash::Error;
    /// # use bucket_hash::HashMap;
    /// #
    /// let mut map = HashMap::new();
    /// map.insert(1u64, "one");
    /// assert_eq!(map.try_find(&1), Ok(&"one"));
    /// assert_eq!(map.try_find(&2), Err(Error::KeyNotFound));
    /// ```
    pub fn try_find(&self, key: &K) -> Result<&V, Error> {
        self.get(key).ok_or(Error::KeyNotFound)
    }

    /// Returns a mutable reference to the value for `key`, inserting
    /// `V::default()` first if the key is absent.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use bucket_hash::HashMap;
    /// #
    /// let mut counts: HashMap<&str, u32> = HashMap::new();
    /// for word in ["a", "b", "a"] {
    ///     *counts.find_or_insert_default(word) += 1;
    /// }
    /// assert_eq!(counts[&"a"], 2);
    /// assert_eq!(counts[&"b"], 1);
    /// ```
    pub fn find_or_insert_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        self.entry(key).or_default()
    }

    /// Returns `true` if the map contains `key`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use bucket_hash::HashMap;
    /// #
    /// let mut map = HashMap::new();
    /// assert!(!map.contains_key(&1));
    /// map.insert(1, "a");
    /// assert!(map.contains_key(&1));
    /// ```
    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Returns `true` if the map contains `key`. Same as
    /// [`HashMap::contains_key`].
    pub fn contains(&self, key: &K) -> bool {
        self.contains_key(key)
    }

    /// Removes `key`, returning its value if it was present.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use bucket_hash::HashMap;
    /// #
    /// let mut map = HashMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.remove(&1), Some("a"));
    /// assert_eq!(map.remove(&1), None);
    /// ```
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.remove_entry(key).map(|(_, v)| v)
    }

    /// Removes `key`, returning the stored key and value if it was present.
    pub fn remove_entry(&mut self, key: &K) -> Option<(K, V)> {
        let hash = self.hash_builder.hash_key(key);
        self.table.remove(hash, |(k, _)| k == key)
    }

    /// Gets the entry for `key` for in-place manipulation.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use bucket_hash::HashMap;
    /// #
    /// let mut map = HashMap::new();
    ///
    /// map.entry(1).or_insert("a");
    /// map.entry(2).or_insert("b");
    ///
    /// assert_eq!(map.get(&1), Some(&"a"));
    /// assert_eq!(map.get(&2), Some(&"b"));
    /// ```
    pub fn entry(&mut self, key: K) -> Entry<'_, K, V> {
        let hash = self.hash_builder.hash_key(&key);
        match self.table.entry(hash, |(k, _)| k == &key) {
            TableEntry::Occupied(entry) => Entry::Occupied(OccupiedEntry { entry }),
            TableEntry::Vacant(entry) => Entry::Vacant(VacantEntry { entry, key }),
        }
    }
}

impl<K, V, S> Default for HashMap<K, V, S>
where
    S: Default,
{
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K, V, S> PartialEq for HashMap<K, V, S>
where
    K: Eq,
    V: PartialEq,
    S: KeyHasher<K>,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl<K, V, S> Eq for HashMap<K, V, S>
where
    K: Eq,
    V: Eq,
    S: KeyHasher<K>,
{
}

impl<K, V, S> Index<&K> for HashMap<K, V, S>
where
    K: Eq,
    S: KeyHasher<K>,
{
    type Output = V;

    /// # Panics
    ///
    /// Panics if the key is not present.
    #[track_caller]
    fn index(&self, key: &K) -> &V {
        self.find(key)
    }
}

impl<K, V, S> FromIterator<(K, V)> for HashMap<K, V, S>
where
    K: Eq,
    S: KeyHasher<K> + Default,
{
    /// Builds a map from pairs. Later pairs overwrite earlier ones with the
    /// same key.
    ///
    /// The bucket array is pre-sized to the first multiple of 17 above the
    /// iterator's lower size bound.
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();

        let mut map = Self::with_hasher(S::default());
        if lower > 0 {
            map.table = HashTable::with_bucket_count(
                INITIAL_BUCKET_COUNT * (lower / INITIAL_BUCKET_COUNT + 1),
            );
        }
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl<K, V, S> Extend<(K, V)> for HashMap<K, V, S>
where
    K: Eq,
    S: KeyHasher<K>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();
        let additional = if self.is_empty() {
            lower
        } else {
            lower.div_ceil(2)
        };
        self.reserve(additional);

        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K, V, S> IntoIterator for HashMap<K, V, S> {
    type IntoIter = IntoIter<K, V>;
    type Item = (K, V);

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            inner: self.table.into_iter(),
        }
    }
}

impl<'a, K, V, S> IntoIterator for &'a HashMap<K, V, S> {
    type IntoIter = Iter<'a, K, V>;
    type Item = (&'a K, &'a V);

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, S> IntoIterator for &'a mut HashMap<K, V, S> {
    type IntoIter = IterMut<'a, K, V>;
    type Item = (&'a K, &'a mut V);

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

/// A view into a single entry in the map, which may either be vacant or
/// occupied.
///
/// This enum is constructed from the [`entry`] method on [`HashMap`].
///
/// [`entry`]: HashMap::entry
pub enum Entry<'a, K, V> {
    /// A vacant entry.
    Vacant(VacantEntry<'a, K, V>),
    /// An occupied entry.
    Occupied(OccupiedEntry<'a, K, V>),
}

impl<'a, K, V> Entry<'a, K, V> {
    /// Inserts `default` if the entry is vacant and returns a mutable
    /// reference to the value.
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Inserts the result of `default` if the entry is vacant and returns a
    /// mutable reference to the value.
    pub fn or_insert_with<F>(self, default: F) -> &'a mut V
    where
        F: FnOnce() -> V,
    {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }

    /// Like [`Entry::or_insert_with`], passing the key to `default`.
    pub fn or_insert_with_key<F>(self, default: F) -> &'a mut V
    where
        F: FnOnce(&K) -> V,
    {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let value = default(entry.key());
                entry.insert(value)
            }
        }
    }

    /// Calls `f` on the value if the entry is occupied.
    pub fn and_modify<F>(self, f: F) -> Self
    where
        F: FnOnce(&mut V),
    {
        match self {
            Entry::Occupied(mut entry) => {
                f(entry.get_mut());
                Entry::Occupied(entry)
            }
            Entry::Vacant(entry) => Entry::Vacant(entry),
        }
    }

    /// Returns a reference to this entry's key.
    pub fn key(&self) -> &K {
        match self {
            Entry::Occupied(entry) => entry.key(),
            Entry::Vacant(entry) => entry.key(),
        }
    }
}

impl<'a, K, V> Entry<'a, K, V>
where
    V: Default,
{
    /// Inserts `V::default()` if the entry is vacant and returns a mutable
    /// reference to the value.
    pub fn or_default(self) -> &'a mut V {
        self.or_insert_with(Default::default)
    }
}

/// A view into a vacant entry in the map.
pub struct VacantEntry<'a, K, V> {
    entry: crate::hash_table::VacantEntry<'a, (K, V)>,
    key: K,
}

impl<'a, K, V> VacantEntry<'a, K, V> {
    /// The key that will be inserted.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Takes ownership of the key.
    pub fn into_key(self) -> K {
        self.key
    }

    /// Inserts the value and returns a mutable reference to it.
    pub fn insert(self, value: V) -> &'a mut V {
        &mut self.entry.insert((self.key, value)).1
    }
}

/// A view into an occupied entry in the map.
pub struct OccupiedEntry<'a, K, V> {
    entry: crate::hash_table::OccupiedEntry<'a, (K, V)>,
}

impl<'a, K, V> OccupiedEntry<'a, K, V> {
    /// The stored key.
    pub fn key(&self) -> &K {
        &self.entry.get().0
    }

    /// Gets a reference to the value.
    pub fn get(&self) -> &V {
        &self.entry.get().1
    }

    /// Gets a mutable reference to the value.
    pub fn get_mut(&mut self) -> &mut V {
        &mut self.entry.get_mut().1
    }

    /// Converts the entry into a mutable reference to the value.
    pub fn into_mut(self) -> &'a mut V {
        &mut self.entry.into_mut().1
    }

    /// Replaces the value, returning the old one.
    pub fn insert(&mut self, value: V) -> V {
        core::mem::replace(&mut self.entry.get_mut().1, value)
    }

    /// Removes the entry and returns the value.
    pub fn remove(self) -> V {
        self.entry.remove().1
    }

    /// Removes the entry and returns the key and value.
    pub fn remove_entry(self) -> (K, V) {
        self.entry.remove()
    }
}

/// An iterator over the entries of a `HashMap`.
pub struct Iter<'a, K, V> {
    inner: crate::hash_table::Iter<'a, (K, V)>,
}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(k, v)| (k, v))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

/// A mutable iterator over the entries of a `HashMap`.
pub struct IterMut<'a, K, V> {
    inner: crate::hash_table::IterMut<'a, (K, V)>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (&*k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IterMut<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(k, v)| (&*k, v))
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}

impl<K, V> FusedIterator for IterMut<'_, K, V> {}

/// An iterator over the keys of a `HashMap`.
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Keys<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(k, _)| k)
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

impl<K, V> FusedIterator for Keys<'_, K, V> {}

/// An iterator over the values of a `HashMap`.
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Values<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, v)| v)
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}

impl<K, V> FusedIterator for Values<'_, K, V> {}

/// A mutable iterator over the values of a `HashMap`.
pub struct ValuesMut<'a, K, V> {
    inner: IterMut<'a, K, V>,
}

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for ValuesMut<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, v)| v)
    }
}

impl<K, V> ExactSizeIterator for ValuesMut<'_, K, V> {}

impl<K, V> FusedIterator for ValuesMut<'_, K, V> {}

/// A draining iterator over the entries of a `HashMap`.
pub struct Drain<'a, K, V> {
    inner: crate::hash_table::Drain<'a, (K, V)>,
}

impl<K, V> Iterator for Drain<'_, K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Drain<'_, K, V> {}

impl<K, V> FusedIterator for Drain<'_, K, V> {}

/// An owning iterator over the entries of a `HashMap`.
pub struct IntoIter<K, V> {
    inner: crate::hash_table::IntoIter<(K, V)>,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}

impl<K, V> FusedIterator for IntoIter<K, V> {}

/// A bidirectional cursor over the entries of a `HashMap`, with an end
/// sentinel between the last and the first entry.
///
/// See [`hash_table::Cursor`](crate::hash_table::Cursor).
pub struct Cursor<'a, K, V> {
    inner: crate::hash_table::Cursor<'a, (K, V)>,
}

impl<K, V> Clone for Cursor<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, K, V> Cursor<'a, K, V> {
    /// Returns `true` at the end sentinel.
    pub fn is_end(&self) -> bool {
        self.inner.is_end()
    }

    /// The entry under the cursor, `None` at the end sentinel.
    pub fn current(&self) -> Option<(&'a K, &'a V)> {
        self.inner.current().map(|(k, v)| (k, v))
    }

    /// Moves to the next entry, or from the last entry to the sentinel.
    pub fn move_next(&mut self) {
        self.inner.move_next();
    }

    /// Moves to the previous entry, or from the first entry to the sentinel.
    pub fn move_prev(&mut self) {
        self.inner.move_prev();
    }

    /// The entry [`Cursor::move_next`] would move to.
    pub fn peek_next(&self) -> Option<(&'a K, &'a V)> {
        self.inner.peek_next().map(|(k, v)| (k, v))
    }

    /// The entry [`Cursor::move_prev`] would move to.
    pub fn peek_prev(&self) -> Option<(&'a K, &'a V)> {
        self.inner.peek_prev().map(|(k, v)| (k, v))
    }
}

#[cfg(test)]
mod tests {
    use alloc::format;
    use alloc::string::String;
    use alloc::string::ToString;
    use alloc::vec;
    use alloc::vec::Vec;
    use core::hash::BuildHasher;

    use rand::TryRngCore;
    use rand::rngs::OsRng;
    use siphasher::sip::SipHasher;

    use super::*;
    use crate::type_hash::TypeHash;

    #[derive(Clone)]
    struct SipHashBuilder {
        k1: u64,
        k2: u64,
    }

    impl BuildHasher for SipHashBuilder {
        type Hasher = SipHasher;

        fn build_hasher(&self) -> Self::Hasher {
            SipHasher::new_with_keys(self.k1, self.k2)
        }
    }

    impl Default for SipHashBuilder {
        fn default() -> Self {
            let mut rng = OsRng;
            Self {
                k1: rng.try_next_u64().unwrap_or(0),
                k2: rng.try_next_u64().unwrap_or(0),
            }
        }
    }

    /// Every key hashes to the same value.
    #[derive(Clone, Copy, Default)]
    struct ConstantHasher;

    impl KeyHasher<u32> for ConstantHasher {
        fn hash_key(&self, _key: &u32) -> u64 {
            42
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct Rgba {
        r: u8,
        g: u8,
        b: u8,
        a: u8,
    }

    impl TypeHash for Rgba {
        fn type_hash(&self) -> u64 {
            u32::from_le_bytes([self.r, self.g, self.b, self.a]) as u64
        }
    }

    #[test]
    fn test_new_and_with_hasher() {
        let map: HashMap<i32, String> = HashMap::new();
        assert!(map.is_empty());
        assert_eq!(map.len(), 0);
        assert_eq!(map.bucket_count(), 0);

        let map2 = HashMap::<i32, String, _>::with_hasher(SipHashBuilder::default());
        assert!(map2.is_empty());
        assert_eq!(map2.len(), 0);

        let map3: HashMap<i32, String, SipHashBuilder> = HashMap::default();
        assert!(map3.is_empty());
    }

    #[test]
    fn test_with_capacity() {
        let map: HashMap<i32, String> = HashMap::with_capacity(100);
        assert!(map.capacity() >= 100);
        assert!(map.is_empty());

        let map2 =
            HashMap::<i32, String, _>::with_capacity_and_hasher(200, SipHashBuilder::default());
        assert!(map2.capacity() >= 200);
        assert!(map2.is_empty());

        let map3: HashMap<i32, String> = HashMap::with_capacity(0);
        assert_eq!(map3.bucket_count(), 0);
    }

    #[test]
    fn test_insert_and_get() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());

        assert_eq!(map.insert(1, "hello".to_string()), None);
        assert_eq!(map.len(), 1);
        assert!(!map.is_empty());

        assert_eq!(map.get(&1), Some(&"hello".to_string()));
        assert_eq!(map.get(&2), None);

        assert_eq!(
            map.insert(1, "world".to_string()),
            Some("hello".to_string())
        );
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&1), Some(&"world".to_string()));
    }

    #[test]
    fn test_three_keys_one_removed() {
        let mut map = HashMap::new();
        map.insert("a", 1);
        map.insert("b", 2);
        map.insert("c", 3);
        map.remove(&"b");

        assert_eq!(map.len(), 2);
        assert!(map.contains(&"a"));
        assert!(!map.contains(&"b"));
        assert!(map.contains(&"c"));
        assert_eq!(*map.find(&"a"), 1);
        assert_eq!(*map.find(&"c"), 3);
    }

    #[test]
    fn test_overwrite_is_idempotent() {
        let mut map = HashMap::new();
        map.insert(7u64, "x");
        let before = map.len();
        map.insert(7, "x");
        assert_eq!(map.len(), before);
        assert_eq!(map.iter().count(), 1);
    }

    #[test]
    fn test_get_mut_and_find_ref() {
        let mut map = HashMap::new();
        map.insert(1u32, 10);

        if let Some(v) = map.get_mut(&1) {
            *v += 5;
        }
        *map.find_ref(&1) *= 2;
        assert_eq!(map.find_cloned(&1), 30);
        assert!(map.get_mut(&2).is_none());
    }

    #[test]
    #[should_panic(expected = "key not found")]
    fn test_find_missing_panics() {
        let mut map = HashMap::new();
        map.insert(1u32, 1u32);
        map.find(&2);
    }

    #[test]
    #[should_panic(expected = "key not found")]
    fn test_find_ref_missing_panics() {
        let mut map: HashMap<u32, u32> = HashMap::new();
        map.find_ref(&2);
    }

    #[test]
    #[should_panic(expected = "key not found")]
    fn test_index_missing_panics() {
        let map: HashMap<u32, u32> = HashMap::new();
        let _value: u32 = map[&0];
    }

    #[test]
    fn test_try_find() {
        let mut map = HashMap::new();
        assert_eq!(map.try_find(&1u8), Err(Error::KeyNotFound));
        map.insert(1u8, 'a');
        assert_eq!(map.try_find(&1), Ok(&'a'));
    }

    #[test]
    fn test_find_or_insert_default() {
        let mut map: HashMap<String, Vec<u32>> = HashMap::new();
        map.find_or_insert_default("a".to_string()).push(1);
        map.find_or_insert_default("a".to_string()).push(2);
        map.find_or_insert_default("b".to_string());

        assert_eq!(map.len(), 2);
        assert_eq!(map[&"a".to_string()], vec![1, 2]);
        assert!(map[&"b".to_string()].is_empty());
    }

    #[test]
    fn test_contains_on_empty_map() {
        let map: HashMap<u64, u64> = HashMap::new();
        assert!(!map.contains_key(&0));
        assert_eq!(map.get(&0), None);
        assert_eq!(map.bucket_count(), 0);
    }

    #[test]
    fn test_remove() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        map.insert(1, "one".to_string());
        map.insert(2, "two".to_string());

        assert_eq!(map.remove(&1), Some("one".to_string()));
        assert_eq!(map.len(), 1);
        assert_eq!(map.remove(&1), None);
        assert_eq!(map.remove_entry(&2), Some((2, "two".to_string())));
        assert!(map.is_empty());

        let mut empty: HashMap<i32, i32> = HashMap::new();
        assert_eq!(empty.remove(&5), None);
    }

    #[test]
    fn test_extend_and_from_iter() {
        let map: HashMap<u32, u32> = (0..40).map(|i| (i, i * i)).collect();
        assert_eq!(map.len(), 40);
        assert_eq!(map[&6], 36);

        let mut map2: HashMap<u32, u32, SipHashBuilder> = HashMap::default();
        map2.extend((0..10).map(|i| (i, i)));
        map2.extend((5..15).map(|i| (i, i + 100)));
        assert_eq!(map2.len(), 15);
        assert_eq!(map2.get(&4), Some(&4));
        assert_eq!(map2.get(&5), Some(&105));
    }

    #[test]
    fn test_from_iter_presizes_by_seventeen() {
        let map: HashMap<u32, u32> = (0..5).map(|i| (i, i)).collect();
        assert_eq!(map.bucket_count(), 17);

        let map: HashMap<u32, u32> = (0..20).map(|i| (i, i)).collect();
        assert_eq!(map.bucket_count(), 34);

        let map: HashMap<u32, u32> = core::iter::empty().collect();
        assert_eq!(map.bucket_count(), 0);
    }

    #[test]
    fn test_clear_reset() {
        let mut map = HashMap::new();
        for i in 0..30u32 {
            map.insert(i, i);
        }
        let count = map.bucket_count();

        map.clear();
        assert!(map.is_empty());
        assert_eq!(map.bucket_count(), count);

        map.insert(1, 1);
        map.reset();
        assert!(map.is_empty());
        assert_eq!(map.bucket_count(), 0);
        assert!(!map.contains_key(&1));
    }

    #[test]
    fn test_try_reserve() {
        let mut map: HashMap<u32, u32> = HashMap::new();
        assert!(map.try_reserve(64).is_ok());
        assert!(map.capacity() >= 64);
        assert_eq!(map.try_reserve(usize::MAX), Err(Error::CapacityOverflow));
        assert!(map.is_empty());
    }

    #[test]
    fn test_entry() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());

        match map.entry(1) {
            Entry::Vacant(entry) => {
                assert_eq!(*entry.key(), 1);
                entry.insert("one".to_string());
            }
            Entry::Occupied(_) => panic!("expected vacant entry"),
        }

        match map.entry(1) {
            Entry::Occupied(mut entry) => {
                assert_eq!(entry.key(), &1);
                assert_eq!(entry.get(), "one");
                let old = entry.insert("uno".to_string());
                assert_eq!(old, "one");
            }
            Entry::Vacant(_) => panic!("expected occupied entry"),
        }

        *map.entry(2).or_insert_with(|| "two".to_string()) += "!";
        assert_eq!(map.get(&2), Some(&"two!".to_string()));

        map.entry(2).and_modify(|v| v.push('?'));
        assert_eq!(map.get(&2), Some(&"two!?".to_string()));

        let value = map
            .entry(3)
            .or_insert_with_key(|k| format!("key {k}"))
            .clone();
        assert_eq!(value, "key 3");

        if let Entry::Occupied(entry) = map.entry(3) {
            assert_eq!(entry.remove_entry(), (3, "key 3".to_string()));
        }
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_iter_keys_values() {
        let mut map = HashMap::new();
        for i in 0..50u32 {
            map.insert(i, i * 10);
        }

        let mut keys: Vec<u32> = map.keys().copied().collect();
        keys.sort();
        assert_eq!(keys, (0..50).collect::<Vec<_>>());

        let sum: u32 = map.values().sum();
        assert_eq!(sum, (0..50).map(|i| i * 10).sum());

        for v in map.values_mut() {
            *v += 1;
        }
        for (k, v) in &map {
            assert_eq!(*v, k * 10 + 1);
        }

        for (_, v) in &mut map {
            *v = 0;
        }
        assert!(map.values().all(|&v| v == 0));

        let mut backward: Vec<u32> = map.keys().rev().copied().collect();
        backward.sort();
        assert_eq!(backward, keys);
        assert_eq!(map.iter().len(), 50);
    }

    #[test]
    fn test_for_each_and_retain() {
        let mut map = HashMap::new();
        for i in 0..20u32 {
            map.insert(i, i);
        }

        let mut count = 0;
        map.for_each(|k, v| {
            assert_eq!(k, v);
            count += 1;
        });
        assert_eq!(count, 20);

        map.retain(|k, v| {
            *v += 100;
            k % 2 == 0
        });
        assert_eq!(map.len(), 10);
        assert_eq!(map.get(&4), Some(&104));
        assert_eq!(map.get(&5), None);
    }

    #[test]
    fn test_drain_and_into_iter() {
        let mut map = HashMap::new();
        for i in 0..10u32 {
            map.insert(i, i.to_string());
        }

        let mut drained: Vec<(u32, String)> = map.drain().collect();
        drained.sort();
        assert_eq!(drained.len(), 10);
        assert_eq!(drained[3], (3, "3".to_string()));
        assert!(map.is_empty());

        map.insert(1, "1".to_string());
        map.insert(2, "2".to_string());
        let mut owned: Vec<(u32, String)> = map.into_iter().collect();
        owned.sort();
        assert_eq!(owned, vec![(1, "1".to_string()), (2, "2".to_string())]);
    }

    #[test]
    fn test_colliding_keys_are_kept_apart() {
        let mut map = HashMap::with_hasher(ConstantHasher);
        for i in 0..40u32 {
            map.insert(i, i + 1);
        }

        assert_eq!(map.len(), 40);
        for i in 0..40u32 {
            assert_eq!(map.get(&i), Some(&(i + 1)));
        }
        assert_eq!(map.debug_stats().longest_bucket, 40);

        assert_eq!(map.remove(&17), Some(18));
        assert_eq!(map.len(), 39);
        assert!(map.contains_key(&18));
    }

    #[test]
    fn test_user_type_hash_key() {
        let red = Rgba { r: 255, g: 0, b: 0, a: 255 };
        let blue = Rgba { r: 0, g: 0, b: 255, a: 255 };

        let mut map = HashMap::new();
        map.insert(red, "red");
        map.insert(blue, "blue");

        assert_eq!(map[&red], "red");
        assert_eq!(map[&blue], "blue");
        assert!(!map.contains_key(&Rgba { r: 0, g: 0, b: 0, a: 0 }));
    }

    #[test]
    fn test_equality_and_clone() {
        let a: HashMap<u32, &str> = [(1, "a"), (2, "b")].into_iter().collect();
        let mut b = a.clone();
        assert_eq!(a, b);

        b.insert(3, "c");
        assert_ne!(a, b);
        b.remove(&3);
        assert_eq!(a, b);

        b.insert(2, "z");
        assert_ne!(a, b);
    }

    #[test]
    fn test_debug() {
        let mut map = HashMap::new();
        map.insert(1u32, "a");
        assert_eq!(format!("{map:?}"), "{1: \"a\"}");
    }

    #[test]
    fn test_cursor() {
        let mut map = HashMap::new();
        for i in 0..25u32 {
            map.insert(i, i * 2);
        }

        let mut seen = vec![];
        let mut cursor = map.cursor_front();
        while let Some((k, v)) = cursor.current() {
            assert_eq!(*v, k * 2);
            seen.push(*k);
            cursor.move_next();
        }
        assert!(cursor.is_end());
        seen.sort();
        assert_eq!(seen, (0..25).collect::<Vec<_>>());

        let mut cursor = map.cursor_end();
        assert_eq!(cursor.peek_prev(), map.cursor_back().current());
        cursor.move_prev();
        assert_eq!(cursor.current(), map.iter().next_back());

        let empty: HashMap<u32, u32> = HashMap::new();
        assert!(empty.cursor_front().is_end());
        assert!(empty.cursor_back().is_end());
    }

    #[test]
    fn test_stats_forwarding() {
        let mut map = HashMap::new();
        for i in 0..9u32 {
            map.insert(i, ());
        }
        let stats = map.debug_stats();
        assert_eq!(stats.populated, 9);
        assert_eq!(stats.bucket_count, 17);
        assert_eq!(map.bucket_histogram(), vec![8, 9]);
    }

    #[test]
    fn test_adapters_are_fused() {
        fn assert_fused<I: FusedIterator>(_: &I) {}

        let mut map: HashMap<u32, u32> = (0..6).map(|i| (i, i * 10)).collect();

        let mut keys = map.keys();
        assert_fused(&keys);
        assert_eq!(keys.by_ref().count(), 6);
        assert_eq!(keys.next(), None);

        let mut values = map.values();
        assert_fused(&values);
        assert_eq!(values.by_ref().count(), 6);
        assert_eq!(values.next(), None);

        let values_mut = map.values_mut();
        assert_fused(&values_mut);
        for value in values_mut.rev() {
            *value += 1;
        }
        assert!(map.values().all(|v| v % 10 == 1));

        let drain = map.drain();
        assert_fused(&drain);
        assert_eq!(drain.count(), 6);

        map.insert(3, 3);
        let into_iter = map.into_iter();
        assert_fused(&into_iter);
        assert_eq!(into_iter.collect::<Vec<_>>(), vec![(3, 3)]);
    }
}
