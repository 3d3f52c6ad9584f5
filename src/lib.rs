//! Implementation of Hierarchical Identity Based Encryption ([HIBE]), an extension of Identity
//! Based Encryption ([IBE]).
//!
//! # ⚠️ Warning: Cryptographic Hazmat ☣️
//!
//! This crate is made for playing around with HIBE and for prototyping of applications and
//! protocols using HIBE. It has *not* been audited, it is *not* battle tested, and *nobody* claims
//! it to be secure.
//!
//! Use it at **your own risk** and if you know what you are doing!
//!
//! # Introduction
//!
//! In an identity based scheme, a sender encrypts towards an *identity* instead of towards a
//! previously exchanged public key; a trusted authority hands each identity its decryption key.
//! The hierarchical variant arranges identities in ordered tuples such as
//! `(department, team, user)`, and any key holder can issue keys for identities below its own
//! without ever talking to the authority again.
//!
//! The library is not optimized for speed, but rather for usability (for example, it requires the
//! standard library and allocations, and it unconditionally requires `serde` for serialization).
//!
//! # Crate Structure
//!
//! The [`hibe`] submodule contains the scheme itself: [`hibe::BonehBoyenGoh`] together with the
//! [`hibe::Hibe`] (parameter and key generation, delegation), [`hibe::HibeCrypt`] (encryption of
//! group elements) and [`hibe::HibeKem`] (key encapsulation) traits. Those methods work directly
//! on the group elements, as they are defined in the paper.
//!
//! Parameters, private keys and ciphertexts carry a deterministic, fixed-width byte encoding,
//! implemented in [`hibe::wire`]. The encoding is the plain concatenation of the marshalled group
//! elements, without framing or version bytes, so the hierarchy depth of a buffer is recovered
//! from its length alone.
//!
//! Applications that would rather deal in bytes than in group elements can use the [`kem`]
//! submodule: [`kem::HybridKem`] couples the key encapsulation with AES to encrypt arbitrary
//! payloads. [`Mapper`] bridges the two worlds by translating application-level identities into
//! the scalar tuples the scheme consumes, and the [`hash`] module has the low-level helpers for
//! doing that translation by hand.
//!
//! Currently, [`kem::HybridKem`] is hardwired to [`hibe::BonehBoyenGoh`] to keep the amount of
//! generics and generic bounds low. This might change in the future, when more HIBEs might be
//! implemented.
//!
//! # Implemented Algorithms
//!
//! Currenly, this crate implements the HIBE of Boneh, Boyen and Goh, "Hierarchical Identity Based
//! Encryption with Constant Size Ciphertext" ([eprint](https://eprint.iacr.org/2005/015.pdf)).
//! This algorithm lives as [`hibe::BonehBoyenGoh`].
//!
//! The algorithms in this crate are implemented on top of
//! [`bls12_381_plus`](https://crates.io/crates/bls12_381_plus), as it provides better `serde`
//! support and access to the byte representation of all three groups, which the wire encoding
//! needs.
//!
//! [HIBE]: https://cryptowiki.tm.kit.edu/index.php/Hierarchical_Identity-Based_Encryption
//! [IBE]: https://en.wikipedia.org/wiki/Identity-based_encryption
pub mod error;
pub mod hash;
pub mod hibe;
pub mod kem;
mod serde_impl;

use error::Result;

/// A trait to provide byte-level access to objects.
pub trait ByteAccess {
    /// Provides access to the bytes.
    ///
    /// Unlike [`AsRef`], there are no statements made about the performance of this operation: a
    /// fresh vector is allocated, and the byte representation may have to be computed first. For
    /// the types of this crate, the bytes are the canonical wire encoding.
    fn bytes(&self) -> Vec<u8>;

    /// Provide a short fingerprint of the bytes.
    ///
    /// Keys and parameters are far too long to print in full, so displaying code can use this to
    /// show a recognizable prefix instead. By default, the fingerprint consists of the first 16
    /// bytes of [`ByteAccess::bytes`], hex encoded.
    fn fingerprint(&self) -> String {
        hex::encode(&self.bytes()[..16])
    }
}

/// A trait to mark objects that can map from an application-specific identity to a HIBE-specific
/// identity.
///
/// A mapper can be implemented multiple times for a single struct, thereby providing multiple
/// (equivalent) ways to map.
pub trait Mapper<F, T> {
    fn map_identity(&self, input: F) -> Result<Vec<T>>;
}

/// [`Mapper`] is automatically implemented for functions and closures that match the signature of
/// [`Mapper::map_identity`].
impl<X, Y, F: Fn(X) -> Result<Vec<Y>>> Mapper<X, Y> for F {
    fn map_identity(&self, input: X) -> Result<Vec<Y>> {
        self(input)
    }
}
