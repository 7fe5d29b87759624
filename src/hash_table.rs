use alloc::vec::Vec;
use core::alloc::Layout;
use core::fmt::Debug;
use core::iter::FusedIterator;

use crate::bucket::Bucket;
use crate::bucket::Slot;
use crate::error::Error;

/// Number of buckets allocated by the first insertion.
pub const INITIAL_BUCKET_COUNT: usize = 17;

/// Entries storable in `bucket_count` buckets before the next insert grows
/// the table.
///
/// Growth triggers when `2 * len > bucket_count` on entry to an insert, so the
/// insert that observes `len == bucket_count / 2` still fits.
#[inline(always)]
fn capacity_for(bucket_count: usize) -> usize {
    if bucket_count == 0 {
        0
    } else {
        bucket_count / 2 + 1
    }
}

/// Smallest bucket count in the growth sequence starting at `from` whose
/// capacity reaches `entries`.
fn bucket_count_for(from: usize, entries: usize) -> Result<usize, Error> {
    let mut count = from.max(INITIAL_BUCKET_COUNT);
    while capacity_for(count) < entries {
        count = count.checked_mul(2).ok_or(Error::CapacityOverflow)?;
    }
    Ok(count)
}

/// Bucket occupancy statistics.
///
/// Available with the `stats` feature.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone, PartialEq)]
pub struct DebugStats {
    /// Number of live entries.
    pub populated: usize,
    /// Number of buckets.
    pub bucket_count: usize,
    /// Buckets holding no entry.
    pub empty_buckets: usize,
    /// Length of the longest bucket.
    pub longest_bucket: usize,
    /// `populated / bucket_count`.
    pub load_factor: f64,
    /// Slots allocated across every bucket, used or not.
    pub slot_capacity: usize,
    /// Bytes held by the bucket array and every bucket's storage.
    pub total_bytes: usize,
}

#[cfg(any(test, feature = "stats"))]
impl DebugStats {
    /// Prints the statistics to stdout.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Hash Table Debug Stats ===");
        println!("Populated entries: {}", self.populated);
        println!("Bucket count: {}", self.bucket_count);
        println!(
            "Empty buckets: {} ({:.2}%)",
            self.empty_buckets,
            if self.bucket_count == 0 {
                0.0
            } else {
                self.empty_buckets as f64 / self.bucket_count as f64 * 100.0
            }
        );
        println!("Longest bucket: {}", self.longest_bucket);
        println!("Load factor: {:.2}", self.load_factor);
        println!("Slot capacity: {}", self.slot_capacity);
        println!("Total bytes: {}", self.total_bytes);
    }
}

/// A separate-chaining hash table.
///
/// `HashTable<V>` stores values in an array of [`Bucket`]s selected by
/// `hash % bucket_count`. Like hashbrown's raw table, it does not hash
/// anything itself: every operation takes the hash and an equality predicate
/// for the value being looked for.
///
/// The table starts unallocated. The first insertion allocates
/// [`INITIAL_BUCKET_COUNT`] buckets, and an insertion that finds
/// `2 * len > bucket_count` first doubles the bucket count and migrates every
/// entry using its cached hash. The bucket count never shrinks; only
/// [`HashTable::reset`] releases the bucket array.
///
/// The table is single-threaded: callers sharing one across threads must wrap
/// it in their own lock.
///
/// ## Example
///
/// ```rust
/// use bucket_hash::hash_table::Entry;
/// use bucket_hash::hash_table::HashTable;
/// use bucket_hash::type_hash::TypeHash;
///
/// #[derive(Debug, PartialEq)]
/// struct Person {
///     id: u64,
///     name: String,
/// }
///
/// let mut table = HashTable::new();
/// let hash = 123u64.type_hash();
///
/// match table.entry(hash, |p: &Person| p.id == 123) {
///     Entry::Vacant(entry) => {
///         entry.insert(Person {
///             id: 123,
///             name: "Alice".to_string(),
///         });
///     }
///     Entry::Occupied(_) => unreachable!(),
/// }
///
/// assert_eq!(table.find(hash, |p| p.id == 123).map(|p| p.name.as_str()), Some("Alice"));
/// ```
#[derive(Clone)]
pub struct HashTable<V> {
    buckets: Vec<Bucket<V>>,
    populated: usize,
}

struct BucketLengths<'a, V>(&'a [Bucket<V>]);

impl<V> Debug for BucketLengths<'_, V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list()
            .entries(self.0.iter().map(Bucket::len))
            .finish()
    }
}

impl<V> Debug for HashTable<V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HashTable")
            .field("populated", &self.populated)
            .field("bucket_count", &self.buckets.len())
            .field("buckets", &BucketLengths(&self.buckets))
            .finish()
    }
}

impl<V> Default for HashTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> HashTable<V> {
    /// Creates an empty, unallocated table.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use bucket_hash::hash_table::HashTable;
    /// #
    /// let table: HashTable<u32> = HashTable::new();
    /// assert_eq!(table.bucket_count(), 0);
    /// ```
    pub const fn new() -> Self {
        Self {
            buckets: Vec::new(),
            populated: 0,
        }
    }

    /// Creates a table that can hold at least `capacity` values before
    /// growing.
    ///
    /// The bucket count is taken from the growth sequence `17 * 2^k`. A
    /// capacity of zero allocates nothing.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use bucket_hash::hash_table::HashTable;
    /// #
    /// let table: HashTable<String> = HashTable::with_capacity(100);
    /// assert!(table.capacity() >= 100);
    /// assert_eq!(table.bucket_count() % 17, 0);
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        let mut table = Self::new();
        if capacity > 0 {
            let count = bucket_count_for(INITIAL_BUCKET_COUNT, capacity).unwrap_or_else(|e| e.fatal());
            table.try_grow_to(count).unwrap_or_else(|e| e.fatal());
        }
        table
    }

    /// Creates a table with exactly `bucket_count` buckets, or an unallocated
    /// one for zero. Later growth doubles from this count.
    pub fn with_bucket_count(bucket_count: usize) -> Self {
        let mut table = Self::new();
        if bucket_count > 0 {
            table.try_grow_to(bucket_count).unwrap_or_else(|e| e.fatal());
        }
        table
    }

    /// Number of values in the table.
    #[inline]
    pub fn len(&self) -> usize {
        self.populated
    }

    /// Returns `true` if the table holds no values.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.populated == 0
    }

    /// Number of buckets. This is not the number of values.
    #[inline]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Number of values the table can hold before an insert grows it.
    #[inline]
    pub fn capacity(&self) -> usize {
        capacity_for(self.buckets.len())
    }

    /// Ratio of values to buckets, `0.0` when unallocated.
    pub fn load_factor(&self) -> f64 {
        if self.buckets.is_empty() {
            0.0
        } else {
            self.populated as f64 / self.buckets.len() as f64
        }
    }

    /// The buckets in index order.
    #[inline]
    pub fn buckets(&self) -> &[Bucket<V>] {
        &self.buckets
    }

    #[inline(always)]
    fn bucket_index(&self, hash: u64) -> usize {
        debug_assert!(!self.buckets.is_empty());
        (hash % self.buckets.len() as u64) as usize
    }

    /// Allocates the first bucket array, or doubles it when the load counter
    /// says the table is too full for one more entry.
    #[inline]
    fn reserve_one(&mut self) {
        if self.buckets.is_empty() {
            self.try_grow_to(INITIAL_BUCKET_COUNT)
                .unwrap_or_else(|e| e.fatal());
        } else if self.populated * 2 > self.buckets.len() {
            self.grow();
        }
    }

    #[cold]
    #[inline(never)]
    fn grow(&mut self) {
        let count = self
            .buckets
            .len()
            .checked_mul(2)
            .ok_or(Error::CapacityOverflow)
            .unwrap_or_else(|e| e.fatal());
        self.try_grow_to(count).unwrap_or_else(|e| e.fatal());
    }

    /// Replaces the bucket array with one of `new_count` buckets and migrates
    /// every slot into it.
    ///
    /// Every allocation happens before the first slot moves, so on error the
    /// table is exactly as it was.
    fn try_grow_to(&mut self, new_count: usize) -> Result<(), Error> {
        debug_assert!(new_count > self.buckets.len());
        let old_count = self.buckets.len();

        let mut new_buckets: Vec<Bucket<V>> = Vec::new();
        let layout = Layout::array::<Bucket<V>>(new_count).map_err(|_| Error::CapacityOverflow)?;
        new_buckets
            .try_reserve_exact(new_count)
            .map_err(|_| Error::AllocFailed { layout })?;
        new_buckets.resize_with(new_count, Bucket::new);

        if self.populated > 0 {
            let mut counts: Vec<usize> = Vec::new();
            let layout = Layout::array::<usize>(new_count).map_err(|_| Error::CapacityOverflow)?;
            counts
                .try_reserve_exact(new_count)
                .map_err(|_| Error::AllocFailed { layout })?;
            counts.resize(new_count, 0);

            for bucket in &self.buckets {
                for slot in bucket.slots() {
                    counts[(slot.hash % new_count as u64) as usize] += 1;
                }
            }

            for (bucket, &count) in new_buckets.iter_mut().zip(&counts) {
                if count > 0 {
                    bucket.try_reserve_exact(count)?;
                }
            }
        }

        let old_buckets = core::mem::replace(&mut self.buckets, new_buckets);
        let mut migrated = 0;
        for mut bucket in old_buckets {
            for slot in bucket.drain() {
                let index = (slot.hash % new_count as u64) as usize;
                self.buckets[index].push_reserved(slot);
                migrated += 1;
            }
        }

        debug_assert_eq!(migrated, self.populated);
        self.populated = migrated;

        if old_count == 0 {
            log::trace!("allocated {new_count} buckets");
        } else {
            log::trace!("grew bucket array from {old_count} to {new_count} buckets, migrated {migrated} entries");
        }

        Ok(())
    }

    /// Reserves room for at least `additional` more values.
    ///
    /// # Panics
    ///
    /// Panics if the new bucket count overflows; aborts through
    /// `handle_alloc_error` if allocation fails.
    pub fn reserve(&mut self, additional: usize) {
        self.try_reserve(additional).unwrap_or_else(|e| e.fatal());
    }

    /// Tries to reserve room for at least `additional` more values.
    ///
    /// On error the table is left unchanged.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use bucket_hash::Error;
    /// # use bucket_hash::hash_table::HashTable;
    /// #
    /// let mut table: HashTable<u64> = HashTable::new();
    /// table.try_reserve(50).unwrap();
    /// assert!(table.capacity() >= 50);
    ///
    /// assert_eq!(table.try_reserve(usize::MAX), Err(Error::CapacityOverflow));
    /// ```
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), Error> {
        let needed = self
            .populated
            .checked_add(additional)
            .ok_or(Error::CapacityOverflow)?;
        if needed <= self.capacity() {
            return Ok(());
        }

        let result =
            bucket_count_for(self.buckets.len(), needed).and_then(|count| self.try_grow_to(count));
        if let Err(e) = &result {
            log::debug!("reserving {additional} entries failed: {e}");
        }
        result
    }

    /// Returns a view into the entry for `hash` and `eq`.
    ///
    /// This performs the same pre-insert growth check as
    /// [`HashTable::insert`], even when the entry turns out to be occupied.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use bucket_hash::hash_table::HashTable;
    /// # use bucket_hash::type_hash::TypeHash;
    /// #
    /// let mut table = HashTable::new();
    /// let hash = "key".type_hash();
    ///
    /// *table.entry(hash, |(k, _): &(&str, i32)| *k == "key").or_insert(("key", 0)) = ("key", 1);
    /// assert_eq!(table.find(hash, |(k, _)| *k == "key"), Some(&("key", 1)));
    /// ```
    pub fn entry(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Entry<'_, V> {
        self.reserve_one();

        let bucket = self.bucket_index(hash);
        let position = self.buckets[bucket].position(hash, eq);
        match position {
            Some(index) => Entry::Occupied(OccupiedEntry {
                table: self,
                bucket,
                index,
            }),
            None => Entry::Vacant(VacantEntry {
                table: self,
                hash,
                bucket,
            }),
        }
    }

    /// Inserts `value`, overwriting the value matching `hash` and `eq` if
    /// there is one. Returns the overwritten value.
    pub fn insert(&mut self, hash: u64, value: V, eq: impl Fn(&V) -> bool) -> Option<V> {
        self.reserve_one();

        let bucket = self.bucket_index(hash);
        let old = self.buckets[bucket].insert(hash, value, eq);
        if old.is_none() {
            self.populated += 1;
        }
        old
    }

    /// Inserts `value` treating the hash as the identity of the value: any
    /// value stored under an equal hash is overwritten, whatever it is.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use bucket_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// table.insert_by_hash(7, "first");
    /// assert_eq!(table.insert_by_hash(7, "second"), Some("first"));
    /// assert_eq!(table.len(), 1);
    /// ```
    pub fn insert_by_hash(&mut self, hash: u64, value: V) -> Option<V> {
        self.insert(hash, value, |_| true)
    }

    /// Finds the value matching `hash` and `eq`.
    pub fn find(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&V> {
        if self.buckets.is_empty() {
            return None;
        }
        self.buckets[self.bucket_index(hash)].find(hash, eq)
    }

    /// Finds the value matching `hash` and `eq` mutably.
    pub fn find_mut(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&mut V> {
        if self.buckets.is_empty() {
            return None;
        }
        let bucket = self.bucket_index(hash);
        self.buckets[bucket].find_mut(hash, eq)
    }

    /// Returns `true` if a value matches `hash` and `eq`. Never fails, even
    /// on an unallocated table.
    #[inline]
    pub fn contains(&self, hash: u64, eq: impl Fn(&V) -> bool) -> bool {
        self.find(hash, eq).is_some()
    }

    /// Removes and returns the value matching `hash` and `eq`.
    ///
    /// A no-op returning `None` when nothing matches, including on an empty
    /// table.
    pub fn remove(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<V> {
        if self.populated == 0 {
            return None;
        }

        let bucket = self.bucket_index(hash);
        let value = self.buckets[bucket].remove(hash, eq)?;
        self.populated -= 1;
        Some(value)
    }

    /// Drops every value. The bucket array is kept, each bucket's storage is
    /// released.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use bucket_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// table.insert_by_hash(1, 1);
    /// table.clear();
    /// assert!(table.is_empty());
    /// assert_eq!(table.bucket_count(), 17);
    /// ```
    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
        self.populated = 0;
    }

    /// Drops every value and releases the bucket array, returning the table
    /// to its unallocated state.
    pub fn reset(&mut self) {
        if !self.buckets.is_empty() {
            log::debug!(
                "releasing {} buckets holding {} entries",
                self.buckets.len(),
                self.populated
            );
        }
        self.buckets = Vec::new();
        self.populated = 0;
    }

    /// Calls `f` once for every value, in unspecified order.
    pub fn for_each(&self, mut f: impl FnMut(&V)) {
        for bucket in &self.buckets {
            for value in bucket.iter() {
                f(value);
            }
        }
    }

    /// Keeps only the values for which `f` returns `true`.
    ///
    /// If `f` panics, the values rejected so far are gone and every other
    /// value is kept.
    pub fn retain(&mut self, mut f: impl FnMut(&mut V) -> bool) {
        let populated = &mut self.populated;
        for bucket in &mut self.buckets {
            bucket.retain(|value| {
                let keep = f(value);
                if !keep {
                    *populated -= 1;
                }
                keep
            });
        }
    }

    /// Returns an iterator over every value, in unspecified order.
    ///
    /// The iterator is double-ended: iterating from the back visits the same
    /// values.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use bucket_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// for i in 0..10u64 {
    ///     table.insert_by_hash(i, i);
    /// }
    ///
    /// let mut forward: Vec<u64> = table.iter().copied().collect();
    /// let mut backward: Vec<u64> = table.iter().rev().copied().collect();
    /// forward.sort();
    /// backward.sort();
    /// assert_eq!(forward, backward);
    /// assert_eq!(forward.len(), 10);
    /// ```
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            buckets: &self.buckets,
            front_bucket: 0,
            front_index: 0,
            back_bucket: self.buckets.len().saturating_sub(1),
            back_index: self.buckets.last().map_or(0, Bucket::len),
            remaining: self.populated,
        }
    }

    /// Returns an iterator over every value, mutably.
    pub fn iter_mut(&mut self) -> IterMut<'_, V> {
        IterMut {
            remaining: self.populated,
            buckets: self.buckets.iter_mut(),
            front: Default::default(),
            back: Default::default(),
        }
    }

    /// Returns an iterator that removes and yields every value.
    ///
    /// The bucket array is kept. Dropping the iterator early still empties
    /// the table.
    pub fn drain(&mut self) -> Drain<'_, V> {
        Drain {
            table: self,
            bucket_index: 0,
            current: Vec::new().into_iter(),
        }
    }

    /// A cursor at the first value, or at the end sentinel if the table is
    /// empty.
    pub fn cursor_front(&self) -> Cursor<'_, V> {
        let mut cursor = self.cursor_end();
        cursor.move_next();
        cursor
    }

    /// A cursor at the last value, or at the end sentinel if the table is
    /// empty.
    pub fn cursor_back(&self) -> Cursor<'_, V> {
        let mut cursor = self.cursor_end();
        cursor.move_prev();
        cursor
    }

    /// A cursor at the end sentinel.
    pub fn cursor_end(&self) -> Cursor<'_, V> {
        Cursor {
            buckets: &self.buckets,
            position: None,
        }
    }

    /// Histogram of bucket lengths: `hist[n]` is the number of buckets holding
    /// exactly `n` values.
    #[cfg(any(test, feature = "stats"))]
    pub fn bucket_histogram(&self) -> Vec<usize> {
        let longest = self.buckets.iter().map(Bucket::len).max().unwrap_or(0);
        let mut hist = alloc::vec![0usize; longest + 1];
        for bucket in &self.buckets {
            hist[bucket.len()] += 1;
        }
        hist
    }

    /// Returns bucket occupancy statistics.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> DebugStats {
        let slot_capacity = self.buckets.iter().map(Bucket::capacity).sum::<usize>();
        DebugStats {
            populated: self.populated,
            bucket_count: self.buckets.len(),
            empty_buckets: self.buckets.iter().filter(|b| b.is_empty()).count(),
            longest_bucket: self.buckets.iter().map(Bucket::len).max().unwrap_or(0),
            load_factor: self.load_factor(),
            slot_capacity,
            total_bytes: self.buckets.capacity() * core::mem::size_of::<Bucket<V>>()
                + slot_capacity * core::mem::size_of::<Slot<V>>(),
        }
    }

    /// Pretty-prints the bucket length histogram using stdout.
    #[cfg(all(any(test, feature = "stats"), feature = "std"))]
    pub fn print_bucket_histogram(&self) {
        let hist = self.bucket_histogram();
        let max = hist.iter().copied().max().unwrap_or(0);
        if self.buckets.is_empty() || max == 0 {
            println!("bucket histogram: empty");
            return;
        }

        let max_bar = 60usize;
        println!("bucket histogram ({} buckets):", self.buckets.len());
        for (len, &count) in hist.iter().enumerate() {
            let width = (count * max_bar).div_ceil(max);
            println!("{:>3} | {} ({})", len, "█".repeat(width), count);
        }
    }
}

impl<V> IntoIterator for HashTable<V> {
    type IntoIter = IntoIter<V>;
    type Item = V;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            remaining: self.populated,
            buckets: self.buckets.into_iter(),
            current: Vec::new().into_iter(),
        }
    }
}

impl<'a, V> IntoIterator for &'a HashTable<V> {
    type IntoIter = Iter<'a, V>;
    type Item = &'a V;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, V> IntoIterator for &'a mut HashTable<V> {
    type IntoIter = IterMut<'a, V>;
    type Item = &'a mut V;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

/// A view into a single entry in the table, which may be vacant or occupied.
///
/// This enum is constructed from the [`entry`] method on [`HashTable`].
///
/// [`entry`]: HashTable::entry
pub enum Entry<'a, V> {
    /// No value matched.
    Vacant(VacantEntry<'a, V>),
    /// A value matched.
    Occupied(OccupiedEntry<'a, V>),
}

impl<'a, V> Entry<'a, V> {
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
    pub fn or_insert_with(self, default: impl FnOnce() -> V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }

    /// Calls `f` on the value if the entry is occupied.
    pub fn and_modify(self, f: impl FnOnce(&mut V)) -> Self {
        match self {
            Entry::Occupied(mut entry) => {
                f(entry.get_mut());
                Entry::Occupied(entry)
            }
            Entry::Vacant(entry) => Entry::Vacant(entry),
        }
    }

    /// Inserts `V::default()` if the entry is vacant and returns a mutable
    /// reference to the value.
    pub fn or_default(self) -> &'a mut V
    where
        V: Default,
    {
        self.or_insert_with(V::default)
    }
}

/// A view into a vacant entry in the table.
pub struct VacantEntry<'a, V> {
    table: &'a mut HashTable<V>,
    hash: u64,
    bucket: usize,
}

impl<'a, V> VacantEntry<'a, V> {
    /// The hash the value will be stored under.
    pub fn hash(&self) -> u64 {
        self.hash
    }

    /// Inserts `value` and returns a mutable reference to it.
    pub fn insert(self, value: V) -> &'a mut V {
        let table = self.table;
        table.populated += 1;
        table.buckets[self.bucket].push(self.hash, value)
    }
}

/// A view into an occupied entry in the table.
pub struct OccupiedEntry<'a, V> {
    table: &'a mut HashTable<V>,
    bucket: usize,
    index: usize,
}

impl<'a, V> OccupiedEntry<'a, V> {
    fn slot(&self) -> &Slot<V> {
        &self.table.buckets[self.bucket].slots()[self.index]
    }

    /// The hash the value is stored under.
    pub fn hash(&self) -> u64 {
        self.slot().hash
    }

    /// Gets a reference to the value.
    pub fn get(&self) -> &V {
        &self.slot().value
    }

    /// Gets a mutable reference to the value.
    pub fn get_mut(&mut self) -> &mut V {
        &mut self.table.buckets[self.bucket].slots_mut()[self.index].value
    }

    /// Converts the entry into a mutable reference to the value.
    pub fn into_mut(self) -> &'a mut V {
        &mut self.table.buckets[self.bucket].slots_mut()[self.index].value
    }

    /// Replaces the value, returning the old one.
    pub fn insert(&mut self, value: V) -> V {
        core::mem::replace(self.get_mut(), value)
    }

    /// Removes the value from the table and returns it.
    pub fn remove(self) -> V {
        let slot = self.table.buckets[self.bucket].remove_at(self.index);
        self.table.populated -= 1;
        slot.value
    }
}

/// An iterator over the values of a [`HashTable`].
///
/// The front walks `(bucket, entry)` positions forward, skipping empty
/// buckets at bucket boundaries; the back walks backward the same way.
pub struct Iter<'a, V> {
    buckets: &'a [Bucket<V>],
    front_bucket: usize,
    front_index: usize,
    back_bucket: usize,
    // One past the next value to yield from the back.
    back_index: usize,
    remaining: usize,
}

impl<V> Clone for Iter<'_, V> {
    fn clone(&self) -> Self {
        Self {
            buckets: self.buckets,
            front_bucket: self.front_bucket,
            front_index: self.front_index,
            back_bucket: self.back_bucket,
            back_index: self.back_index,
            remaining: self.remaining,
        }
    }
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let buckets = self.buckets;
        loop {
            if let Some(slot) = buckets[self.front_bucket].get(self.front_index) {
                self.front_index += 1;
                self.remaining -= 1;
                return Some(&slot.value);
            }
            self.front_bucket += 1;
            self.front_index = 0;
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> DoubleEndedIterator for Iter<'_, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let buckets = self.buckets;
        loop {
            if self.back_index > 0 {
                self.back_index -= 1;
                self.remaining -= 1;
                return Some(&buckets[self.back_bucket].slots()[self.back_index].value);
            }
            self.back_bucket -= 1;
            self.back_index = buckets[self.back_bucket].len();
        }
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}

impl<V> FusedIterator for Iter<'_, V> {}

/// A mutable iterator over the values of a [`HashTable`].
pub struct IterMut<'a, V> {
    buckets: core::slice::IterMut<'a, Bucket<V>>,
    front: core::slice::IterMut<'a, Slot<V>>,
    back: core::slice::IterMut<'a, Slot<V>>,
    remaining: usize,
}

impl<'a, V> Iterator for IterMut<'a, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(slot) = self.front.next() {
                self.remaining -= 1;
                return Some(&mut slot.value);
            }
            match self.buckets.next() {
                Some(bucket) => self.front = bucket.slots_mut().iter_mut(),
                None => {
                    let slot = self.back.next()?;
                    self.remaining -= 1;
                    return Some(&mut slot.value);
                }
            }
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> DoubleEndedIterator for IterMut<'_, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(slot) = self.back.next_back() {
                self.remaining -= 1;
                return Some(&mut slot.value);
            }
            match self.buckets.next_back() {
                Some(bucket) => self.back = bucket.slots_mut().iter_mut(),
                None => {
                    let slot = self.front.next_back()?;
                    self.remaining -= 1;
                    return Some(&mut slot.value);
                }
            }
        }
    }
}

impl<V> ExactSizeIterator for IterMut<'_, V> {}

impl<V> FusedIterator for IterMut<'_, V> {}

/// A draining iterator over the values of a [`HashTable`].
pub struct Drain<'a, V> {
    table: &'a mut HashTable<V>,
    bucket_index: usize,
    current: alloc::vec::IntoIter<Slot<V>>,
}

impl<V> Iterator for Drain<'_, V> {
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(slot) = self.current.next() {
                return Some(slot.value);
            }
            if self.table.populated == 0 {
                return None;
            }
            // Slots leave the load counter as soon as their bucket is taken.
            self.current = self.table.buckets[self.bucket_index].drain();
            self.table.populated -= self.current.len();
            self.bucket_index += 1;
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.table.populated + self.current.len();
        (remaining, Some(remaining))
    }
}

impl<V> ExactSizeIterator for Drain<'_, V> {}

impl<V> FusedIterator for Drain<'_, V> {}

impl<V> Drop for Drain<'_, V> {
    fn drop(&mut self) {
        for _ in &mut *self {}
    }
}

/// An owning iterator over the values of a [`HashTable`].
pub struct IntoIter<V> {
    buckets: alloc::vec::IntoIter<Bucket<V>>,
    current: alloc::vec::IntoIter<Slot<V>>,
    remaining: usize,
}

impl<V> Iterator for IntoIter<V> {
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(slot) = self.current.next() {
                self.remaining -= 1;
                return Some(slot.value);
            }
            self.current = self.buckets.next()?.drain();
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for IntoIter<V> {}

impl<V> FusedIterator for IntoIter<V> {}

/// A bidirectional cursor over the values of a [`HashTable`].
///
/// The cursor sits either on a value, identified by its `(bucket, entry)`
/// position, or on the end sentinel. The sentinel is one past the last value
/// and one before the first: moving forward from the last value reaches it,
/// and moving forward from it wraps to the first value. Moving backward is
/// symmetric.
///
/// # Examples
///
/// ```rust
/// # use bucket_hash::hash_table::HashTable;
/// #
/// let mut table = HashTable::new();
/// table.insert_by_hash(3, 'c');
/// table.insert_by_hash(1, 'a');
///
/// let mut seen = Vec::new();
/// let mut cursor = table.cursor_front();
/// while let Some(value) = cursor.current() {
///     seen.push(*value);
///     cursor.move_next();
/// }
/// assert!(cursor.is_end());
/// assert_eq!(seen, vec!['a', 'c']);
///
/// cursor.move_prev();
/// assert_eq!(cursor.current(), Some(&'c'));
/// ```
pub struct Cursor<'a, V> {
    buckets: &'a [Bucket<V>],
    position: Option<(usize, usize)>,
}

impl<V> Clone for Cursor<'_, V> {
    fn clone(&self) -> Self {
        Self {
            buckets: self.buckets,
            position: self.position,
        }
    }
}

impl<V> Debug for Cursor<'_, V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("Cursor").field(&self.position).finish()
    }
}

impl<'a, V> Cursor<'a, V> {
    fn first_from(&self, bucket: usize) -> Option<(usize, usize)> {
        self.buckets
            .get(bucket..)?
            .iter()
            .position(|b| !b.is_empty())
            .map(|offset| (bucket + offset, 0))
    }

    fn last_before(&self, bucket: usize) -> Option<(usize, usize)> {
        let buckets = &self.buckets[..bucket];
        buckets
            .iter()
            .rposition(|b| !b.is_empty())
            .map(|index| (index, buckets[index].len() - 1))
    }

    fn next_position(&self) -> Option<(usize, usize)> {
        match self.position {
            None => self.first_from(0),
            Some((bucket, index)) if index + 1 < self.buckets[bucket].len() => {
                Some((bucket, index + 1))
            }
            Some((bucket, _)) => self.first_from(bucket + 1),
        }
    }

    fn prev_position(&self) -> Option<(usize, usize)> {
        match self.position {
            None => self.last_before(self.buckets.len()),
            Some((bucket, index)) if index > 0 => Some((bucket, index - 1)),
            Some((bucket, _)) => self.last_before(bucket),
        }
    }

    fn value_at(&self, position: Option<(usize, usize)>) -> Option<&'a V> {
        let buckets = self.buckets;
        let (bucket, index) = position?;
        buckets[bucket].get(index).map(|slot| &slot.value)
    }

    /// Returns `true` if the cursor is on the end sentinel.
    #[inline]
    pub fn is_end(&self) -> bool {
        self.position.is_none()
    }

    /// The `(bucket, entry)` position, `None` at the end sentinel.
    #[inline]
    pub fn position(&self) -> Option<(usize, usize)> {
        self.position
    }

    /// The value under the cursor, `None` at the end sentinel.
    #[inline]
    pub fn current(&self) -> Option<&'a V> {
        self.value_at(self.position)
    }

    /// Moves to the next value, skipping empty buckets.
    pub fn move_next(&mut self) {
        self.position = self.next_position();
    }

    /// Moves to the previous value, skipping empty buckets.
    pub fn move_prev(&mut self) {
        self.position = self.prev_position();
    }

    /// The value [`Cursor::move_next`] would move to.
    pub fn peek_next(&self) -> Option<&'a V> {
        self.value_at(self.next_position())
    }

    /// The value [`Cursor::move_prev`] would move to.
    pub fn peek_prev(&self) -> Option<&'a V> {
        self.value_at(self.prev_position())
    }
}
