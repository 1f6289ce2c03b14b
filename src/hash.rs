use rand::Rng;
use std::fmt::Debug;

/// Prime modulus shared by every hash family instance.
pub const UNIVERSAL_PRIME: u64 = 2_000_000_011;

/// A universal hash family: one instance is one randomly drawn member.
///
/// The rng is always supplied by the caller, so a construction loop owns
/// its own random state and can redraw coefficients without touching any
/// other instance.
pub trait UniversalHash: Clone + Debug + Send + Sync {
    /// Draw a fresh member of the family.
    fn random<R: Rng + ?Sized>(rng: &mut R) -> Self;

    /// Redraw the coefficients in place.
    #[inline]
    fn regenerate<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        *self = Self::random(rng);
    }
}

/// 30-bit limbs per 64-bit key; every limb is below `UNIVERSAL_PRIME`.
const LIMBS: usize = 3;
const LIMB_BITS: u32 = 30;

/// Integer family: h(x) = (a·x + b) mod P.
///
/// Keys are split into 30-bit limbs `x = l0 + l1·2^30 + l2·2^60` and hashed
/// as `(a0·l0 + a1·l1 + a2·l2 + b) mod P`, so two distinct 64-bit keys that
/// happen to be congruent mod P still collide only with probability 1/P.
/// For keys below 2^30 this is exactly `(a0·x + b) mod P`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AffineHash {
    a: [u64; LIMBS], // a0 in [1, P-1], the rest in [0, P-1]
    b: u64,          // [0, P-1]
}

impl AffineHash {
    pub fn with_coefficients(a: [u64; LIMBS], b: u64) -> Self {
        Self {
            a: a.map(|c| c % UNIVERSAL_PRIME),
            b: b % UNIVERSAL_PRIME,
        }
    }

    #[inline]
    pub fn hash_u64(&self, x: u64) -> u64 {
        const MASK: u64 = (1 << LIMB_BITS) - 1;
        let limbs = [x & MASK, (x >> LIMB_BITS) & MASK, x >> (2 * LIMB_BITS)];
        let acc = self
            .a
            .iter()
            .zip(limbs)
            .fold(self.b as u128, |acc, (&a, l)| acc + a as u128 * l as u128);
        (acc % UNIVERSAL_PRIME as u128) as u64
    }
}

impl UniversalHash for AffineHash {
    fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            a: [
                rng.gen_range(1..UNIVERSAL_PRIME),
                rng.gen_range(0..UNIVERSAL_PRIME),
                rng.gen_range(0..UNIVERSAL_PRIME),
            ],
            b: rng.gen_range(0..UNIVERSAL_PRIME),
        }
    }
}

/// Byte-sequence family: polynomial rolling hash with a random base,
/// `poly = fold(acc*base + byte + 1) mod P`, followed by a random affine
/// finalizer `(a*poly + b) mod P`.
///
/// The fold alone ignores `base` for keys of at most one byte (`""` -> 0,
/// `[x]` -> x + 1), so such keys would collide on every draw; the
/// finalizer makes every key length depend on the drawn coefficients.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PolynomialHash {
    base: u64, // [1, P-1]
    a: u64,    // [1, P-1]
    b: u64,    // [0, P-1]
}

impl PolynomialHash {
    pub fn with_coefficients(base: u64, a: u64, b: u64) -> Self {
        Self {
            base: base % UNIVERSAL_PRIME,
            a: a % UNIVERSAL_PRIME,
            b: b % UNIVERSAL_PRIME,
        }
    }

    #[inline]
    pub fn hash_bytes(&self, bytes: &[u8]) -> u64 {
        // acc, base, a < 2^31: every product stays below 2^62.
        let poly = bytes.iter().fold(0u64, |acc, &byte| {
            (acc * self.base + byte as u64 + 1) % UNIVERSAL_PRIME
        });
        (self.a * poly + self.b) % UNIVERSAL_PRIME
    }
}

impl UniversalHash for PolynomialHash {
    fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            base: rng.gen_range(1..UNIVERSAL_PRIME),
            a: rng.gen_range(1..UNIVERSAL_PRIME),
            b: rng.gen_range(0..UNIVERSAL_PRIME),
        }
    }
}

/// A key type with an associated universal hash family.
///
/// Borrowed and owned forms of the same key (`str` and `String`) share a
/// family and must hash identically, so tables keyed by `String` can be
/// queried with `&str`.
pub trait HashKey: Eq {
    type Family: UniversalHash;

    fn hash_with(&self, family: &Self::Family) -> u64;
}

macro_rules! impl_integer_key {
    ($($t:ty),* $(,)?) => {
        $(
            impl HashKey for $t {
                type Family = AffineHash;

                #[inline]
                fn hash_with(&self, family: &AffineHash) -> u64 {
                    // Signed values are sign-extended; distinct keys stay distinct.
                    family.hash_u64(*self as u64)
                }
            }
        )*
    };
}

impl_integer_key!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);

impl HashKey for char {
    type Family = AffineHash;

    #[inline]
    fn hash_with(&self, family: &AffineHash) -> u64 {
        family.hash_u64(*self as u64)
    }
}

macro_rules! impl_bytes_key {
    ($($t:ty => |$k:ident| $bytes:expr;)*) => {
        $(
            impl HashKey for $t {
                type Family = PolynomialHash;

                #[inline]
                fn hash_with(&self, family: &PolynomialHash) -> u64 {
                    let $k = self;
                    family.hash_bytes($bytes)
                }
            }
        )*
    };
}

impl_bytes_key! {
    str => |k| k.as_bytes();
    String => |k| k.as_bytes();
    Box<str> => |k| k.as_bytes();
    [u8] => |k| k;
    Vec<u8> => |k| k.as_slice();
}
