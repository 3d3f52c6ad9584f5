use std::fmt::{self, Debug};

use super::{Hibe, HibeCrypt, HibeKem};
use crate::error::{Error, Result};
use crate::ByteAccess;

use bls12_381_plus::{
    ff::Field, group::Group, pairing, G1Affine, G1Projective, G2Affine, G2Projective, Gt, Scalar,
};
use once_cell::sync::OnceCell;
use rand::Rng;

/// Draws a uniform scalar from `Zp*`.
///
/// The all-zero scalar would collapse the blinding terms of keys and ciphertexts, so it is
/// rejected and redrawn.
fn random_nonzero_scalar<R: Rng>(mut rng: R) -> Scalar {
    loop {
        let scalar = Scalar::random(&mut rng);
        if !bool::from(scalar.is_zero()) {
            return scalar;
        }
    }
}

/// Public parameters of a HIBE instantiation.
///
/// The parameters are everything a sender needs to encrypt: they carry no secrets and are meant
/// to be published. The number of per-level generators fixes the maximum hierarchy depth (see
/// [`Params::max_depth`]).
#[derive(Clone)]
pub struct Params {
    pub(crate) g: G2Affine,
    pub(crate) g1: G2Affine,
    pub(crate) g2: G1Affine,
    pub(crate) g3: G1Affine,
    pub(crate) h: Vec<G1Affine>,
    /// Memoised `e(g2, g1)`, written at most once.
    pub(crate) pairing: OnceCell<Gt>,
}

impl Params {
    /// The maximum depth of the hierarchy, fixed at setup time.
    pub fn max_depth(&self) -> usize {
        self.h.len()
    }

    /// Returns `e(g2, g1)`, computing and caching it on first use.
    pub(crate) fn pairing(&self) -> Gt {
        *self.pairing.get_or_init(|| pairing(&self.g2, &self.g1))
    }

    /// Folds an identity into a single group element: `g3 + Σ identityⱼ · hⱼ`.
    fn identity_point(&self, identity: &[Scalar]) -> G1Projective {
        self.h
            .iter()
            .zip(identity)
            .map(|(h, i)| h * i)
            .sum::<G1Projective>()
            + self.g3
    }
}

// The pairing cache is a memoised value, not part of the parameters proper.
impl PartialEq for Params {
    fn eq(&self, other: &Self) -> bool {
        self.g == other.g
            && self.g1 == other.g1
            && self.g2 == other.g2
            && self.g3 == other.g3
            && self.h == other.h
    }
}

impl Eq for Params {}

impl Debug for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Params").field(&self.fingerprint()).finish()
    }
}

/// The master secret key.
///
/// Its holder can generate the secret key of any identity in the system. It never needs to leave
/// the authority that ran the setup.
#[derive(Clone, PartialEq, Eq)]
pub struct MasterKey {
    pub(crate) g2_alpha: G1Affine,
}

impl Debug for MasterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MasterKey")
            .field(&self.fingerprint())
            .finish()
    }
}

/// An identity's secret key.
///
/// Besides decryption, the key carries one delegation helper per hierarchy level below its own,
/// which is what allows [`Hibe::derive_key`] to work without the master key.
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKey {
    pub(crate) a0: G1Affine,
    pub(crate) a1: G2Affine,
    pub(crate) b: Vec<G1Affine>,
}

impl PrivateKey {
    /// The number of hierarchy levels this key can still delegate to.
    ///
    /// A key for an identity of length `k` in a system of depth `L` reports `L - k`. A key with
    /// no depth left sits at the bottom of the hierarchy and cannot derive further keys.
    pub fn depth_left(&self) -> usize {
        self.b.len()
    }
}

impl Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PrivateKey")
            .field(&self.fingerprint())
            .finish()
    }
}

/// A ciphertext produced by [`HibeCrypt::encrypt`].
///
/// Ciphertexts have the same size regardless of the depth of the identity they were produced
/// for.
#[derive(Clone, PartialEq, Eq)]
pub struct Ciphertext {
    pub(crate) a: Gt,
    pub(crate) b: G2Affine,
    pub(crate) c: G1Affine,
}

impl Debug for Ciphertext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Ciphertext")
            .field(&self.fingerprint())
            .finish()
    }
}

/// An encapsulated key produced by [`HibeKem::encapsulate`].
#[derive(Clone, PartialEq, Eq)]
pub struct Encapsulation {
    pub(crate) b: G2Affine,
    pub(crate) c: G1Affine,
}

impl Debug for Encapsulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Encapsulation")
            .field(&self.fingerprint())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BonehBoyenGoh {
    max_depth: usize,
}

impl BonehBoyenGoh {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Checks an identity against the depth bound recorded in the parameters.
    ///
    /// The bound in the parameters is authoritative: parameters that arrived over the wire know
    /// their own depth, regardless of what this scheme value was constructed with.
    fn check_identity(&self, public_key: &Params, identity: &[Scalar]) -> Result<()> {
        if identity.is_empty() {
            return Err(Error::EmptyIdentity);
        }
        if identity.len() > public_key.max_depth() {
            return Err(Error::IdentityTooLong);
        }
        Ok(())
    }
}

impl Hibe for BonehBoyenGoh {
    type PrivateKey = PrivateKey;
    type MasterKey = MasterKey;
    type PublicKey = Params;
    type Identity = Scalar;

    fn setup<R: Rng>(&self, mut rng: R) -> Result<(Params, MasterKey)> {
        let alpha = random_nonzero_scalar(&mut rng);
        let g = G2Projective::random(&mut rng);
        let g1 = g * alpha;
        let g2 = G1Projective::random(&mut rng);
        let g3 = G1Projective::random(&mut rng);
        let h = (0..self.max_depth())
            .map(|_| G1Projective::random(&mut rng))
            .map(Into::into)
            .collect();
        Ok((
            Params {
                g: g.into(),
                g1: g1.into(),
                g2: g2.into(),
                g3: g3.into(),
                h,
                pairing: OnceCell::new(),
            },
            MasterKey {
                g2_alpha: (g2 * alpha).into(),
            },
        ))
    }

    fn generate_key<R: Rng>(
        &self,
        mut rng: R,
        public_key: &Params,
        master_key: &MasterKey,
        identity: &[Scalar],
    ) -> Result<PrivateKey> {
        self.check_identity(public_key, identity)?;

        let r = random_nonzero_scalar(&mut rng);
        Ok(PrivateKey {
            a0: (master_key.g2_alpha + public_key.identity_point(identity) * r).into(),
            a1: (public_key.g * r).into(),
            b: public_key.h[identity.len()..]
                .iter()
                .map(|h| (h * r).into())
                .collect(),
        })
    }

    fn derive_key<R: Rng>(
        &self,
        mut rng: R,
        public_key: &Params,
        parent_key: &PrivateKey,
        identity: &[Scalar],
    ) -> Result<PrivateKey> {
        self.check_identity(public_key, identity)?;
        // A key with more delegation helpers than the hierarchy has levels belongs to different
        // parameters.
        let parent_depth = public_key
            .max_depth()
            .checked_sub(parent_key.depth_left())
            .ok_or(Error::NotDescendant)?;
        if identity.len() <= parent_depth {
            return Err(Error::NotDescendant);
        }
        // Levels the child adds below the parent.
        let fresh = identity.len() - parent_depth;

        // The child's effective blinding is the parent's plus a fresh t, so the derived key is
        // distributed like one generated from the master key.
        let t = random_nonzero_scalar(&mut rng);
        let mut a0 = parent_key.a0 + public_key.identity_point(identity) * t;
        for (helper, element) in parent_key.b[..fresh].iter().zip(&identity[parent_depth..]) {
            a0 += helper * element;
        }
        Ok(PrivateKey {
            a0: a0.into(),
            a1: (parent_key.a1 + public_key.g * t).into(),
            b: parent_key.b[fresh..]
                .iter()
                .zip(public_key.h[identity.len()..].iter())
                .map(|(b, h)| b + h * t)
                .map(Into::into)
                .collect(),
        })
    }
}

impl HibeCrypt for BonehBoyenGoh {
    type Message = Gt;

    type Ciphertext = Ciphertext;

    fn encrypt<R: Rng>(
        &self,
        mut rng: R,
        public_key: &Params,
        identity: &[Scalar],
        message: &Gt,
    ) -> Result<Ciphertext> {
        self.check_identity(public_key, identity)?;

        let s = random_nonzero_scalar(&mut rng);
        Ok(Ciphertext {
            a: public_key.pairing() * s + message,
            b: (public_key.g * s).into(),
            c: (public_key.identity_point(identity) * s).into(),
        })
    }

    fn decrypt(&self, key: &PrivateKey, ciphertext: &Ciphertext) -> Gt {
        ciphertext.a + pairing(&ciphertext.c, &key.a1) - pairing(&key.a0, &ciphertext.b)
    }
}

impl HibeKem for BonehBoyenGoh {
    type Key = Gt;

    type EncapsulatedKey = Encapsulation;

    fn encapsulate<R: Rng>(
        &self,
        mut rng: R,
        public_key: &Params,
        identity: &[Scalar],
    ) -> Result<(Gt, Encapsulation)> {
        self.check_identity(public_key, identity)?;

        let s = random_nonzero_scalar(&mut rng);
        Ok((
            public_key.pairing() * s,
            Encapsulation {
                b: (public_key.g * s).into(),
                c: (public_key.identity_point(identity) * s).into(),
            },
        ))
    }

    fn decapsulate(&self, key: &PrivateKey, encapsulation: &Encapsulation) -> Gt {
        pairing(&key.a0, &encapsulation.b) - pairing(&encapsulation.c, &key.a1)
    }
}
