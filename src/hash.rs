//! Hashing of arbitrary bytes into the scalar field and into GT.
//!
//! These helpers are offered for callers that derive identity elements or group-element messages
//! from application data, for example through a [`Mapper`][crate::Mapper]. The scheme itself
//! never calls them.

use crypto_bigint::{NonZero, U256};
use lazy_static::lazy_static;
use sha2::{Digest, Sha256};

use bls12_381_plus::{pairing, G1Affine, G2Affine, Gt, Scalar};

lazy_static! {
    /// The order of the scalar field, minus one.
    static ref ORDER_MINUS_ONE: NonZero<U256> = NonZero::new(U256::from_be_hex(
        "73eda753299d7d483339d80809a1d80553bda402fffe5bfeffffffff00000000",
    ))
    .expect("the group order is larger than one");

    /// The pairing of the two base generators, computed once on first use.
    static ref GT_BASE: Gt = pairing(&G1Affine::generator(), &G2Affine::generator());
}

/// Hashes a byte string to a nonzero scalar.
///
/// The SHA-256 digest of the input is read as an unsigned big-endian integer, reduced modulo
/// `p - 1` and incremented, so the result always lies in `[1, p - 1]`. The reduction skews the
/// distribution slightly towards small values; the mapping is kept as is because existing stored
/// identities depend on it bit for bit.
pub fn hash_to_scalar(bytes: &[u8]) -> Scalar {
    let digest: [u8; 32] = Sha256::digest(bytes).into();
    let reduced = U256::from_be_slice(&digest) % *ORDER_MINUS_ONE;
    Scalar::from_raw(reduced.wrapping_add(&U256::ONE).to_words()).unwrap()
}

/// Hashes a byte string to a non-identity element of GT.
///
/// This is the scalar multiple [`hash_to_scalar`]`(bytes) · e(G1, G2)` of the base pairing, which
/// is cached process-wide.
pub fn hash_to_gt(bytes: &[u8]) -> Gt {
    *GT_BASE * hash_to_scalar(bytes)
}
