use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::hash::BuildHasher;
use core::hash::Hash;

/// A deterministic hash of a value of a concrete type.
///
/// Implementations must return equal hashes for equal values. The containers
/// in this crate select a bucket with `hash % bucket_count`, so the quality of
/// the low bits matters more than the high ones.
///
/// Distinct values are allowed to collide: the containers chain colliding
/// entries in the same bucket and tell them apart by key equality.
///
/// # Examples
///
/// ```rust
/// use bucket_hash::type_hash::TypeHash;
///
/// assert_eq!(7u32.type_hash(), 7);
/// assert_eq!("key".type_hash(), String::from("key").type_hash());
/// ```
pub trait TypeHash {
    /// Returns the hash of `self`.
    fn type_hash(&self) -> u64;
}

/// Source of hashes for keys of type `K`.
///
/// This is the seam the containers are generic over. It is implemented by
/// [`TypeHashing`] for every [`TypeHash`] key, and by every
/// [`BuildHasher`] for every [`Hash`] key, so `std`'s `RandomState` or a
/// keyed SipHash builder plug in unchanged.
pub trait KeyHasher<K: ?Sized> {
    /// Returns the hash of `key`.
    fn hash_key(&self, key: &K) -> u64;
}

/// The default hasher: forwards to [`TypeHash::type_hash`].
///
/// Zero-sized and deterministic across runs and processes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TypeHashing;

impl<K: TypeHash + ?Sized> KeyHasher<K> for TypeHashing {
    #[inline]
    fn hash_key(&self, key: &K) -> u64 {
        key.type_hash()
    }
}

impl<K: Hash + ?Sized, S: BuildHasher> KeyHasher<K> for S {
    #[inline]
    fn hash_key(&self, key: &K) -> u64 {
        self.hash_one(key)
    }
}

/// A fixed-seed foldhash builder, usable as the hasher of any container when
/// keys implement [`Hash`] rather than [`TypeHash`].
#[cfg(feature = "foldhash")]
pub type FoldHashing = foldhash::fast::FixedState;

/// Combines two 32-bit hash values into a third.
///
/// This is Bob Jenkins' 96-bit mix. It is not commutative:
/// `hash_combine(a, b)` and `hash_combine(b, a)` generally differ.
#[inline]
pub fn hash_combine(a: u32, c: u32) -> u32 {
    let mut a = a;
    let mut b: u32 = 0x9e37_79b9;
    let mut c = c;
    a = a.wrapping_add(b);

    a = a.wrapping_sub(b).wrapping_sub(c) ^ (c >> 13);
    b = b.wrapping_sub(c).wrapping_sub(a) ^ (a << 8);
    c = c.wrapping_sub(a).wrapping_sub(b) ^ (b >> 13);
    a = a.wrapping_sub(b).wrapping_sub(c) ^ (c >> 12);
    b = b.wrapping_sub(c).wrapping_sub(a) ^ (a << 16);
    c = c.wrapping_sub(a).wrapping_sub(b) ^ (b >> 5);
    a = a.wrapping_sub(b).wrapping_sub(c) ^ (c >> 3);
    b = b.wrapping_sub(c).wrapping_sub(a) ^ (a << 10);
    c = c.wrapping_sub(a).wrapping_sub(b) ^ (b >> 15);

    c
}

/// Combines two 64-bit hash values. Not commutative.
#[inline]
pub fn hash_combine64(seed: u64, value: u64) -> u64 {
    seed ^ value
        .wrapping_add(0x9e37_79b9_7f4a_7c15)
        .wrapping_add(seed << 6)
        .wrapping_add(seed >> 2)
}

/// Hashes a pointer by its address, mixed with `seed`.
#[inline]
pub fn pointer_hash<T: ?Sized>(ptr: *const T, seed: u32) -> u64 {
    let addr = ptr.cast::<()>().addr();

    cfg_if::cfg_if! {
        if #[cfg(target_pointer_width = "64")] {
            let lo = addr as u32;
            let hi = ((addr as u64) >> 32) as u32;
            hash_combine(lo, hash_combine(hi, seed)) as u64
        } else {
            hash_combine(addr as u32, seed) as u64
        }
    }
}

/// Polynomial string hash: `sum(byte[i] * 53^i)`, wrapping.
#[inline]
fn polynomial_hash(bytes: &[u8]) -> u64 {
    let mut result: u64 = 0;
    let mut power: u64 = 1;
    for &byte in bytes {
        result = result.wrapping_add((byte as u64).wrapping_mul(power));
        power = power.wrapping_mul(53);
    }
    result
}

macro_rules! impl_type_hash_narrow {
    ($($t:ty),*) => {
        $(
            impl TypeHash for $t {
                #[inline]
                fn type_hash(&self) -> u64 {
                    *self as u32 as u64
                }
            }
        )*
    };
}

impl_type_hash_narrow!(u8, i8, u16, i16, u32, i32);

impl TypeHash for u64 {
    #[inline]
    fn type_hash(&self) -> u64 {
        *self
    }
}

impl TypeHash for i64 {
    #[inline]
    fn type_hash(&self) -> u64 {
        *self as u64
    }
}

impl TypeHash for u128 {
    #[inline]
    fn type_hash(&self) -> u64 {
        hash_combine64(*self as u64, (*self >> 64) as u64)
    }
}

impl TypeHash for i128 {
    #[inline]
    fn type_hash(&self) -> u64 {
        (*self as u128).type_hash()
    }
}

cfg_if::cfg_if! {
    if #[cfg(target_pointer_width = "64")] {
        impl TypeHash for usize {
            #[inline]
            fn type_hash(&self) -> u64 {
                *self as u64
            }
        }

        impl TypeHash for isize {
            #[inline]
            fn type_hash(&self) -> u64 {
                *self as u64
            }
        }
    } else {
        impl TypeHash for usize {
            #[inline]
            fn type_hash(&self) -> u64 {
                *self as u32 as u64
            }
        }

        impl TypeHash for isize {
            #[inline]
            fn type_hash(&self) -> u64 {
                *self as u32 as u64
            }
        }
    }
}

impl TypeHash for bool {
    #[inline]
    fn type_hash(&self) -> u64 {
        *self as u64
    }
}

impl TypeHash for char {
    #[inline]
    fn type_hash(&self) -> u64 {
        *self as u32 as u64
    }
}

impl TypeHash for () {
    #[inline]
    fn type_hash(&self) -> u64 {
        0
    }
}

// Floats hash by bit pattern, so `0.0` and `-0.0` differ and every NaN
// payload is its own key.
impl TypeHash for f32 {
    #[inline]
    fn type_hash(&self) -> u64 {
        self.to_bits() as u64
    }
}

impl TypeHash for f64 {
    #[inline]
    fn type_hash(&self) -> u64 {
        self.to_bits()
    }
}

impl TypeHash for str {
    #[inline]
    fn type_hash(&self) -> u64 {
        polynomial_hash(self.as_bytes())
    }
}

impl TypeHash for String {
    #[inline]
    fn type_hash(&self) -> u64 {
        self.as_str().type_hash()
    }
}

impl<T: TypeHash> TypeHash for [T] {
    fn type_hash(&self) -> u64 {
        self.iter()
            .fold(self.len() as u64, |seed, value| {
                hash_combine64(seed, value.type_hash())
            })
    }
}

impl<T: TypeHash, const N: usize> TypeHash for [T; N] {
    #[inline]
    fn type_hash(&self) -> u64 {
        self.as_slice().type_hash()
    }
}

impl<T: TypeHash> TypeHash for Vec<T> {
    #[inline]
    fn type_hash(&self) -> u64 {
        self.as_slice().type_hash()
    }
}

impl<T: TypeHash> TypeHash for Option<T> {
    #[inline]
    fn type_hash(&self) -> u64 {
        match self {
            None => 0,
            Some(value) => hash_combine64(1, value.type_hash()),
        }
    }
}

impl<T: TypeHash + ?Sized> TypeHash for &T {
    #[inline]
    fn type_hash(&self) -> u64 {
        (**self).type_hash()
    }
}

impl<T: TypeHash + ?Sized> TypeHash for &mut T {
    #[inline]
    fn type_hash(&self) -> u64 {
        (**self).type_hash()
    }
}

impl<T: TypeHash + ?Sized> TypeHash for Box<T> {
    #[inline]
    fn type_hash(&self) -> u64 {
        (**self).type_hash()
    }
}

impl<T: ?Sized> TypeHash for *const T {
    #[inline]
    fn type_hash(&self) -> u64 {
        pointer_hash(*self, 0)
    }
}

impl<T: ?Sized> TypeHash for *mut T {
    #[inline]
    fn type_hash(&self) -> u64 {
        pointer_hash(self.cast_const(), 0)
    }
}

macro_rules! impl_type_hash_tuple {
    ($($name:ident)+) => {
        impl<$($name: TypeHash),+> TypeHash for ($($name,)+) {
            #[allow(non_snake_case)]
            fn type_hash(&self) -> u64 {
                let ($($name,)+) = self;
                let mut seed = 0u64;
                $(
                    seed = hash_combine64(seed, $name.type_hash());
                )+
                seed
            }
        }
    };
}

impl_type_hash_tuple!(A);
impl_type_hash_tuple!(A B);
impl_type_hash_tuple!(A B C);
impl_type_hash_tuple!(A B C D);
