//! Low-level implementation of HIBE primitives.
//!
//! The structs and traits in this module implement the scheme the way it is defined in the paper.
//! For a higher-level interface, refer to the [`kem`][super::kem] module.
//!
//! To make this module more flexible, all methods that use randomness only use the [`Rng`] bound,
//! not [`CryptoRng`][rand::CryptoRng]. This does not mean that you should use them with insecure
//! randomness, but rather that you need to take care when using these low-level primitives!
//!
//! # Identity Handling
//!
//! An identity is a sequence of "identity elements", and a longer sequence sits deeper down the
//! hierarchy. The element type is chosen by the HIBE algorithm; for [`BonehBoyenGoh`] it is a
//! [`Scalar`][bls12_381_plus::Scalar]. For example:
//!
//! ```ignore
//! let a = &[1];       // A top-level identity
//! let b = &[1, 1];    // ... a descendent of a
//! let c = &[1, 2];    // ... also a descendent of a, and a sibling of b
//! let d = &[2];       // ... a sibling of a
//! ```
//!
//! Every key is bound to at least one identity element; the empty sequence denotes the authority
//! itself, whose "key" is the master key. How deep hierarchies may grow is decided at setup time
//! and recorded in the parameters (see [`Params::max_depth`]).
use super::error::Result;

use rand::Rng;

mod bbg;
pub mod wire;
pub use self::bbg::{BonehBoyenGoh, Ciphertext, Encapsulation, MasterKey, Params, PrivateKey};

/// Main trait for HIBE schemes.
///
/// This trait defines the basic functionality of HIBEs, namely the generation and derivation of
/// secret keys for identities.
///
/// For encryption functionality, the extension [`HibeCrypt`] needs to be used, and for key
/// encapsulation, [`HibeKem`].
///
/// Note that this trait represents a HIBE *algorithm* not a HIBE *instantiation*.
pub trait Hibe {
    /// Type of a single identity's private key.
    type PrivateKey;
    /// Type of the master key, from which every other key is ultimately derived.
    type MasterKey;
    /// Type of the public key.
    ///
    /// This is the public key "of the whole system", often called the *public parameters*: since
    /// identities stand in for per-recipient public keys, encryption needs nothing else. There is
    /// no type for the public key of a single identity.
    type PublicKey;
    /// Type of an identity element.
    ///
    /// The whole identity is represented by multiple [`Identity`][Self::Identity] elements, for
    /// example in a `&[Identity]` slice.
    type Identity;

    /// Set the system up, producing the master public key and the master secret key.
    fn setup<R: Rng>(&self, rng: R) -> Result<(Self::PublicKey, Self::MasterKey)>;

    /// Generate the key for the given identity from the master secret key.
    ///
    /// Parameters:
    ///
    /// * `rng` - The randomness to use.
    /// * `public_key` - The master public key.
    /// * `master_key` - The master secret key.
    /// * `identity` - The identity elements.
    fn generate_key<R: Rng>(
        &self,
        rng: R,
        public_key: &Self::PublicKey,
        master_key: &Self::MasterKey,
        identity: &[Self::Identity],
    ) -> Result<Self::PrivateKey>;

    /// Derives a key from the key of an ancestor identity.
    ///
    /// The identity passed here is the *full* identity of the child, which may extend the
    /// ancestor's identity by more than one element. The elements up to the ancestor's own depth
    /// must be the ones its key was issued for; they are trusted, not verified. If they differ,
    /// the derived key belongs to no identity at all and decrypts nothing.
    ///
    /// Parameters:
    ///
    /// * `rng` - The randomness to use.
    /// * `public_key` - The master public key.
    /// * `parent_key` - The secret key of an ancestor of `identity`.
    /// * `identity` - The full identity to generate the key for.
    fn derive_key<R: Rng>(
        &self,
        rng: R,
        public_key: &Self::PublicKey,
        parent_key: &Self::PrivateKey,
        identity: &[Self::Identity],
    ) -> Result<Self::PrivateKey>;
}

/// HIBE methods to do encryption.
pub trait HibeCrypt: Hibe {
    /// Type of the messages that this HIBE can encrypt.
    type Message;
    /// Type of the resulting ciphertext.
    type Ciphertext;

    /// Encrypt a message for the given identity.
    ///
    /// Parameters:
    ///
    /// * `rng` - The randomness to use.
    /// * `public_key` - The master public key.
    /// * `identity` - The identity for which to encrypt the message.
    /// * `message` - The actual message.
    fn encrypt<R: Rng>(
        &self,
        rng: R,
        public_key: &Self::PublicKey,
        identity: &[Self::Identity],
        message: &Self::Message,
    ) -> Result<Self::Ciphertext>;

    /// Decrypt a message given the secret key.
    ///
    /// This operation is total: the scheme is secure against chosen-plaintext attacks only and
    /// carries no integrity protection, so a ciphertext that was not produced for the key's
    /// identity decrypts to an unpredictable message instead of an error. Callers that need
    /// integrity must layer it on top.
    fn decrypt(&self, key: &Self::PrivateKey, ciphertext: &Self::Ciphertext) -> Self::Message;
}

/// HIBE methods to do key encapsulation.
pub trait HibeKem: Hibe {
    /// Type of the resulting key.
    type Key;
    /// Type of the encapsulation of the key.
    type EncapsulatedKey;

    /// Computes a key encapsulation, returning the generated key and its encapsulation.
    ///
    /// Parameters:
    ///
    /// * `rng` - The randomness to use.
    /// * `public_key` - The master public key.
    /// * `identity` - The identity for which to encapsulate the key.
    fn encapsulate<R: Rng>(
        &self,
        rng: R,
        public_key: &Self::PublicKey,
        identity: &[Self::Identity],
    ) -> Result<(Self::Key, Self::EncapsulatedKey)>;

    /// Decapsulate a previously encapsulated key.
    ///
    /// Like [`HibeCrypt::decrypt`], this is total: a mismatched encapsulation yields a garbage
    /// key rather than an error.
    fn decapsulate(&self, key: &Self::PrivateKey, encapsulation: &Self::EncapsulatedKey)
        -> Self::Key;
}
