//! High-level wrapper around HIBE operations.
//!
//! Group elements are awkward to store and to send, so this module wraps the raw scheme into a
//! byte-oriented interface:
//!
//! * Shared keys coming out of [`HibeKem`] are compressed to `[u8; 16]` (128 bit) with SHA3-256,
//!   ready for use in other cryptographic primitives.
//! * [`HybridKem::encrypt`] and [`HybridKem::decrypt`] move whole byte payloads by combining the
//!   KEM with AES in counter mode, instead of encrypting a single GT element.
//! * Call sites pass application-level identities (say, a list of department names), and a
//!   [`Mapper`] turns them into the scalar tuples the scheme works on.
//! * Everything here requires [`CryptoRng`] randomness, unlike the low-level [`hibe`][crate::hibe]
//!   module which accepts any [`Rng`].
//!
//! There is no integrity protection anywhere in this stack: the underlying scheme is secure
//! against chosen-plaintext attacks only, and counter-mode AES is malleable. Anyone who needs
//! tamper detection has to add a MAC or a signature on top.
//!
//! The wrapper is hardwired to [`BonehBoyenGoh`] so that its signatures stay free of generic
//! bounds. [`HashMapper`] is the default [`Mapper`]; it accepts anything that implements
//! [`std::hash::Hash`] and is collision resistant through SHA3-256.
use super::{
    error::{Error, Result},
    hibe::{BonehBoyenGoh, Encapsulation, Hibe, HibeKem, MasterKey, Params, PrivateKey},
    Mapper,
};

use std::hash::{Hash, Hasher};

use aes::cipher::{KeyIvInit, StreamCipher};
use bls12_381_plus::{Gt, Scalar};
use rand::{CryptoRng, Rng};
use sha3::{Digest, Sha3_256};

type AesCtr = ctr::Ctr64LE<aes::Aes128>;
static IV: [u8; 16] = [0; 16];

/// Compresses a shared GT element into a 128-bit symmetric key.
fn symmetric_key(element: Gt) -> [u8; 16] {
    let mut result = [0; 16];
    result.copy_from_slice(&Sha3_256::digest(element.to_bytes())[..16]);
    result
}

/// High-level implementation of HIBE operations.
///
/// This struct internally uses the [`BonehBoyenGoh`]-HIBE to provide high-level key-encapsulation
/// and encryption, and keeps a [`Mapper`] around to translate the identities it is handed.
///
/// For more information about the differences to [`Hibe`], see the [module-level][self]
/// documentation.
#[derive(Clone, Debug)]
pub struct HybridKem<M> {
    hibe: BonehBoyenGoh,
    mapper: M,
}

impl HybridKem<HashMapper> {
    /// Create a new [`HybridKem`] with the default [`HashMapper`], supporting hierarchies of up
    /// to `max_depth` levels.
    pub fn new(max_depth: usize) -> HybridKem<HashMapper> {
        Self::new_with_mapper(max_depth, HashMapper)
    }
}

impl<M> HybridKem<M> {
    /// Create a new [`HybridKem`] that maps identities with the given [`Mapper`].
    pub fn new_with_mapper(max_depth: usize, mapper: M) -> HybridKem<M> {
        let hibe = BonehBoyenGoh::new(max_depth);
        Self { hibe, mapper }
    }

    /// Wraps an existing [`BonehBoyenGoh`] HIBE, keeping its hierarchy depth.
    pub fn wrap(hibe: BonehBoyenGoh, mapper: M) -> HybridKem<M> {
        Self { hibe, mapper }
    }

    /// Sets up the system, returning the public parameters and the master secret key.
    pub fn setup<R: Rng + CryptoRng>(&self, rng: R) -> Result<(Params, MasterKey)> {
        self.hibe.setup(rng)
    }

    /// Generates the secret key for the given identity using the master secret key.
    pub fn generate_key<I, R: Rng + CryptoRng>(
        &self,
        rng: R,
        public_key: &Params,
        master_key: &MasterKey,
        identity: I,
    ) -> Result<PrivateKey>
    where
        M: Mapper<I, Scalar>,
    {
        let identity = self.mapper.map_identity(identity)?;
        self.hibe.generate_key(rng, public_key, master_key, &identity)
    }

    /// Derives the secret key for an identity from the secret key of one of its ancestors.
    ///
    /// The leading components of `identity` must be the ones the ancestor's key was issued for.
    /// They are not (and cannot be) checked: passing a key that does not belong to an ancestor
    /// produces a key that decrypts nothing.
    pub fn derive_key<I, R: Rng + CryptoRng>(
        &self,
        rng: R,
        public_key: &Params,
        parent_key: &PrivateKey,
        identity: I,
    ) -> Result<PrivateKey>
    where
        M: Mapper<I, Scalar>,
    {
        let identity = self.mapper.map_identity(identity)?;
        self.hibe.derive_key(rng, public_key, parent_key, &identity)
    }

    /// Encapsulate a fresh symmetric key for the given identity.
    ///
    /// Returns the key together with its encapsulation, which can be published.
    pub fn encapsulate<I, R: Rng + CryptoRng>(
        &self,
        rng: R,
        public_key: &Params,
        identity: I,
    ) -> Result<([u8; 16], Encapsulation)>
    where
        M: Mapper<I, Scalar>,
    {
        let identity = self.mapper.map_identity(identity)?;
        let (key, encapsulation) = self.hibe.encapsulate(rng, public_key, &identity)?;
        Ok((symmetric_key(key), encapsulation))
    }

    /// Recover the symmetric key from an encapsulation.
    ///
    /// With the secret key of the identity the encapsulation was made for, this returns the same
    /// bytes that [`HybridKem::encapsulate`] returned. With any other key it returns garbage,
    /// silently.
    pub fn decapsulate(&self, key: &PrivateKey, encapsulation: &Encapsulation) -> [u8; 16] {
        symmetric_key(self.hibe.decapsulate(key, encapsulation))
    }

    /// Encrypt a byte payload for the given identity.
    ///
    /// Internally this encapsulates a symmetric key and applies AES in counter mode to the
    /// payload; the encapsulation travels inside the returned ciphertext, which is therefore a
    /// bit longer than the payload.
    pub fn encrypt<I, R: Rng + CryptoRng>(
        &self,
        rng: R,
        public_key: &Params,
        identity: I,
        payload: &[u8],
    ) -> Result<Vec<u8>>
    where
        M: Mapper<I, Scalar>,
    {
        let (key, encapsulation) = self.encapsulate(rng, public_key, identity)?;
        let mut buffer = Vec::from(payload);
        let mut cipher = AesCtr::new(&key.into(), &IV.into());
        cipher.apply_keystream(&mut buffer);
        Ok(bincode::serialize(&(encapsulation, buffer)).expect("Serialization failed"))
    }

    /// Decrypt a ciphertext previously produced by [`HybridKem::encrypt`], returning the payload.
    ///
    /// Only the outer framing is validated; a ciphertext that was made for a different identity
    /// decrypts to unpredictable bytes.
    pub fn decrypt(&self, key: &PrivateKey, ciphertext: &[u8]) -> Result<Vec<u8>> {
        let (encapsulation, mut buffer): (Encapsulation, Vec<u8>) =
            bincode::deserialize(ciphertext).map_err(|_| Error::MalformedCiphertext)?;
        let key_bytes = self.decapsulate(key, &encapsulation);
        let mut cipher = AesCtr::new(&key_bytes.into(), &IV.into());
        cipher.apply_keystream(&mut buffer);
        Ok(buffer)
    }
}

#[derive(Default)]
struct Sha3Hasher(Sha3_256);

impl Sha3Hasher {
    fn hash_to_scalar(self) -> Scalar {
        let mut bytes = [0; 48];
        bytes[..32].copy_from_slice(&self.0.finalize());
        Scalar::from_okm(&bytes)
    }

    fn hash<H: Hash>(element: &H) -> Scalar {
        let mut hasher = Sha3Hasher::default();
        element.hash(&mut hasher);
        hasher.hash_to_scalar()
    }
}

impl Hasher for Sha3Hasher {
    fn finish(&self) -> u64 {
        u64::from_be_bytes(self.0.clone().finalize()[..8].try_into().unwrap())
    }

    fn write(&mut self, bytes: &[u8]) {
        self.0.update(bytes);
    }
}

/// A [`Mapper`] that works for all types implementing [`std::hash::Hash`].
///
/// This mapper uses the hash implementation to hash objects to [`Scalar`]s, the underlying
/// identity element for [`HybridKem`]. Internally, a SHA3-256 instance is used to provide
/// consistent hashing and collision resistance.
///
/// In order to provide a hierarchy, the mapper does not accept single elements, but rather
/// iterators over elements. The more elements the iterator produces, the deeper down the
/// hierarchy we go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HashMapper;

impl HashMapper {
    /// Create a new [`HashMapper`].
    pub fn new() -> HashMapper {
        HashMapper
    }
}

impl<I, F> Mapper<I, Scalar> for HashMapper
where
    I: IntoIterator<Item = F>,
    F: Hash,
{
    fn map_identity(&self, input: I) -> Result<Vec<Scalar>> {
        Ok(input
            .into_iter()
            .map(|element| Sha3Hasher::hash(&element))
            .collect())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_encrypt_decrypt() {
        let mut rng = rand::thread_rng();
        let kem = HybridKem::new(5);
        let (public_key, master_key) = kem.setup(&mut rng).unwrap();

        let identity = &[1, 2, 3] as &[_];
        let secret_key = kem
            .generate_key(&mut rng, &public_key, &master_key, identity)
            .unwrap();
        let message = b"Hello, world!";
        let ciphertext = kem
            .encrypt(&mut rng, &public_key, identity, message)
            .unwrap();
        let decryption = kem.decrypt(&secret_key, &ciphertext).unwrap();
        assert_eq!(message.as_slice(), decryption.as_slice());
    }

    #[test]
    fn test_encrypt_decrypt_derived() {
        let mut rng = rand::thread_rng();
        let kem = HybridKem::new(5);
        let (public_key, master_key) = kem.setup(&mut rng).unwrap();

        let parent_key = kem
            .generate_key(&mut rng, &public_key, &master_key, &[1])
            .unwrap();
        let child_key = kem
            .derive_key(&mut rng, &public_key, &parent_key, &[1, 2, 3])
            .unwrap();
        let message = b"Hello, world!";
        let ciphertext = kem
            .encrypt(&mut rng, &public_key, &[1, 2, 3], message)
            .unwrap();
        let decryption = kem.decrypt(&child_key, &ciphertext).unwrap();
        assert_eq!(message.as_slice(), decryption.as_slice());
    }

    #[test]
    fn test_decrypt_rejects_garbage_framing() {
        let mut rng = rand::thread_rng();
        let kem = HybridKem::new(5);
        let (public_key, master_key) = kem.setup(&mut rng).unwrap();
        let secret_key = kem
            .generate_key(&mut rng, &public_key, &master_key, &[1])
            .unwrap();
        assert!(kem.decrypt(&secret_key, b"not a ciphertext").is_err());
    }
}
