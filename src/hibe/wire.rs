//! Deterministic, fixed-width byte encodings for the HIBE types.
//!
//! Every group element marshals at a fixed width that is a multiple of [`UNIT`], the coordinate
//! width of the underlying base field: an uncompressed G1 point takes two units (affine x and y),
//! a G2 point four units, and a GT element twelve units. A buffer is the plain concatenation of
//! element encodings, without framing or padding, so the variable parts (the per-level generators
//! of [`Params`], the delegation helpers of a [`PrivateKey`]) are sized from the buffer length
//! alone.
//!
//! Decoding validates that the length is a whole number of units, that the slots after the fixed
//! prefix divide evenly into elements, and that every element passes the curve library's own
//! point check. Any violation yields [`Error::MalformedEncoding`] and no value. Trailing bytes
//! are never tolerated.
//!
//! The encoding of each individual element is the one of
//! [`bls12_381_plus`] (big-endian field coordinates); this module fixes only the layout of the
//! slots. The format is unversioned: any change to it is a breaking change.

use once_cell::sync::OnceCell;

use super::bbg::{Ciphertext, Encapsulation, MasterKey, Params, PrivateKey};
use crate::error::{Error, Result};
use crate::ByteAccess;

use bls12_381_plus::{G1Affine, G2Affine, Gt};

/// Width in bytes of a single base-field coordinate.
pub const UNIT: usize = 48;
/// Width in bytes of a marshalled G1 element (uncompressed affine point).
pub const G1_WIDTH: usize = 2 * UNIT;
/// Width in bytes of a marshalled G2 element.
pub const G2_WIDTH: usize = 4 * UNIT;
/// Width in bytes of a marshalled GT element (twelve base-field coefficients).
pub const GT_WIDTH: usize = 12 * UNIT;

/// Fixed prefix of marshalled parameters: `g`, `g1`, `g2` and `g3`.
const PARAMS_PREFIX: usize = 2 * G2_WIDTH + 2 * G1_WIDTH;
/// Fixed prefix of a marshalled private key: `a0` and `a1`.
const KEY_PREFIX: usize = G1_WIDTH + G2_WIDTH;
/// Exact size of a marshalled ciphertext: `a`, `b` and `c`.
const CIPHERTEXT_WIDTH: usize = GT_WIDTH + G2_WIDTH + G1_WIDTH;
/// Exact size of a marshalled encapsulation: `b` and `c`.
const ENCAPSULATION_WIDTH: usize = G2_WIDTH + G1_WIDTH;

fn decode_g1(bytes: &[u8]) -> Result<G1Affine> {
    let bytes: &[u8; G1_WIDTH] = bytes.try_into().map_err(|_| Error::MalformedEncoding)?;
    Option::from(G1Affine::from_uncompressed(bytes)).ok_or(Error::MalformedEncoding)
}

fn decode_g2(bytes: &[u8]) -> Result<G2Affine> {
    let bytes: &[u8; G2_WIDTH] = bytes.try_into().map_err(|_| Error::MalformedEncoding)?;
    Option::from(G2Affine::from_uncompressed(bytes)).ok_or(Error::MalformedEncoding)
}

fn decode_gt(bytes: &[u8]) -> Result<Gt> {
    let bytes: &[u8; GT_WIDTH] = bytes.try_into().map_err(|_| Error::MalformedEncoding)?;
    Option::from(Gt::from_bytes(bytes)).ok_or(Error::MalformedEncoding)
}

impl Params {
    /// Encodes the parameters as `g ‖ g1 ‖ g2 ‖ g3 ‖ h₁ ‖ … ‖ h_L`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(PARAMS_PREFIX + self.h.len() * G1_WIDTH);
        bytes.extend_from_slice(&self.g.to_uncompressed());
        bytes.extend_from_slice(&self.g1.to_uncompressed());
        bytes.extend_from_slice(&self.g2.to_uncompressed());
        bytes.extend_from_slice(&self.g3.to_uncompressed());
        for h in &self.h {
            bytes.extend_from_slice(&h.to_uncompressed());
        }
        bytes
    }

    /// Recovers parameters from an encoded byte slice.
    ///
    /// The maximum depth is recovered from the number of per-level slots after the fixed prefix.
    /// The pairing cache of the returned parameters is empty.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() % UNIT != 0 || bytes.len() < PARAMS_PREFIX {
            return Err(Error::MalformedEncoding);
        }
        let levels = &bytes[PARAMS_PREFIX..];
        if levels.len() % G1_WIDTH != 0 {
            return Err(Error::MalformedEncoding);
        }

        Ok(Params {
            g: decode_g2(&bytes[..G2_WIDTH])?,
            g1: decode_g2(&bytes[G2_WIDTH..2 * G2_WIDTH])?,
            g2: decode_g1(&bytes[2 * G2_WIDTH..2 * G2_WIDTH + G1_WIDTH])?,
            g3: decode_g1(&bytes[2 * G2_WIDTH + G1_WIDTH..PARAMS_PREFIX])?,
            h: levels
                .chunks(G1_WIDTH)
                .map(decode_g1)
                .collect::<Result<_>>()?,
            pairing: OnceCell::new(),
        })
    }
}

impl MasterKey {
    /// Encodes the master key as a single uncompressed G1 element.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.g2_alpha.to_uncompressed().to_vec()
    }

    /// Recovers the master key from an encoded byte slice.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(MasterKey {
            g2_alpha: decode_g1(bytes)?,
        })
    }
}

impl PrivateKey {
    /// Encodes the private key as `a0 ‖ a1 ‖ b_{k+1} ‖ … ‖ b_L`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(KEY_PREFIX + self.b.len() * G1_WIDTH);
        bytes.extend_from_slice(&self.a0.to_uncompressed());
        bytes.extend_from_slice(&self.a1.to_uncompressed());
        for b in &self.b {
            bytes.extend_from_slice(&b.to_uncompressed());
        }
        bytes
    }

    /// Recovers a private key from an encoded byte slice.
    ///
    /// The remaining delegation depth is recovered from the number of helper slots after the
    /// fixed prefix.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() % UNIT != 0 || bytes.len() < KEY_PREFIX {
            return Err(Error::MalformedEncoding);
        }
        let helpers = &bytes[KEY_PREFIX..];
        if helpers.len() % G1_WIDTH != 0 {
            return Err(Error::MalformedEncoding);
        }

        Ok(PrivateKey {
            a0: decode_g1(&bytes[..G1_WIDTH])?,
            a1: decode_g2(&bytes[G1_WIDTH..KEY_PREFIX])?,
            b: helpers
                .chunks(G1_WIDTH)
                .map(decode_g1)
                .collect::<Result<_>>()?,
        })
    }
}

impl Ciphertext {
    /// Encodes the ciphertext as `a ‖ b ‖ c`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(CIPHERTEXT_WIDTH);
        bytes.extend_from_slice(&self.a.to_bytes());
        bytes.extend_from_slice(&self.b.to_uncompressed());
        bytes.extend_from_slice(&self.c.to_uncompressed());
        bytes
    }

    /// Recovers a ciphertext from an encoded byte slice.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != CIPHERTEXT_WIDTH {
            return Err(Error::MalformedEncoding);
        }

        Ok(Ciphertext {
            a: decode_gt(&bytes[..GT_WIDTH])?,
            b: decode_g2(&bytes[GT_WIDTH..GT_WIDTH + G2_WIDTH])?,
            c: decode_g1(&bytes[GT_WIDTH + G2_WIDTH..])?,
        })
    }
}

impl Encapsulation {
    /// Encodes the encapsulation as `b ‖ c`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(ENCAPSULATION_WIDTH);
        bytes.extend_from_slice(&self.b.to_uncompressed());
        bytes.extend_from_slice(&self.c.to_uncompressed());
        bytes
    }

    /// Recovers an encapsulation from an encoded byte slice.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != ENCAPSULATION_WIDTH {
            return Err(Error::MalformedEncoding);
        }

        Ok(Encapsulation {
            b: decode_g2(&bytes[..G2_WIDTH])?,
            c: decode_g1(&bytes[G2_WIDTH..])?,
        })
    }
}

impl ByteAccess for Params {
    fn bytes(&self) -> Vec<u8> {
        self.to_bytes()
    }
}

impl ByteAccess for MasterKey {
    fn bytes(&self) -> Vec<u8> {
        self.to_bytes()
    }
}

impl ByteAccess for PrivateKey {
    fn bytes(&self) -> Vec<u8> {
        self.to_bytes()
    }
}

impl ByteAccess for Ciphertext {
    fn bytes(&self) -> Vec<u8> {
        self.to_bytes()
    }
}

impl ByteAccess for Encapsulation {
    fn bytes(&self) -> Vec<u8> {
        self.to_bytes()
    }
}

#[cfg(test)]
mod test {
    use super::super::{BonehBoyenGoh, Hibe, HibeCrypt};
    use super::*;

    use bls12_381_plus::{pairing, G1Projective, G2Projective, Scalar};
    use bls12_381_plus::group::Group;
    use rand::Rng;

    fn identity() -> [Scalar; 3] {
        [Scalar::from(1u32), Scalar::from(2u32), Scalar::from(3u32)]
    }

    fn message() -> Gt {
        pairing(
            &(G1Projective::generator() * Scalar::from(3u32)).into(),
            &(G2Projective::generator() * Scalar::from(5u32)).into(),
        )
    }

    fn sample<R: Rng>(mut rng: R, max_depth: usize) -> (Params, MasterKey, PrivateKey, Ciphertext) {
        let bbg = BonehBoyenGoh::new(max_depth);
        let (params, master_key) = bbg.setup(&mut rng).unwrap();
        let key = bbg
            .generate_key(&mut rng, &params, &master_key, &identity()[..2])
            .unwrap();
        let ciphertext = bbg
            .encrypt(&mut rng, &params, &identity()[..2], &message())
            .unwrap();
        (params, master_key, key, ciphertext)
    }

    #[test]
    fn params_roundtrip() {
        let (params, _, _, _) = sample(rand::thread_rng(), 4);
        let recovered = Params::from_bytes(&params.to_bytes()).unwrap();
        assert_eq!(recovered, params);
        assert_eq!(recovered.max_depth(), 4);
        assert_eq!(recovered.to_bytes(), params.to_bytes());
    }

    #[test]
    fn params_roundtrip_then_encrypt() {
        let mut rng = rand::thread_rng();
        let bbg = BonehBoyenGoh::new(10);
        let (params, master_key) = bbg.setup(&mut rng).unwrap();
        let key = bbg
            .generate_key(&mut rng, &params, &master_key, &identity()[..1])
            .unwrap();

        let recovered = Params::from_bytes(&params.to_bytes()).unwrap();
        let ciphertext = bbg
            .encrypt(&mut rng, &recovered, &identity()[..1], &message())
            .unwrap();
        assert_eq!(bbg.decrypt(&key, &ciphertext), message());
    }

    #[test]
    fn master_key_roundtrip() {
        let (_, master_key, _, _) = sample(rand::thread_rng(), 3);
        let recovered = MasterKey::from_bytes(&master_key.to_bytes()).unwrap();
        assert_eq!(recovered, master_key);
    }

    #[test]
    fn private_key_roundtrip() {
        let (_, _, key, _) = sample(rand::thread_rng(), 5);
        let encoded = key.to_bytes();
        assert_eq!(encoded.len(), KEY_PREFIX + 3 * G1_WIDTH);
        let recovered = PrivateKey::from_bytes(&encoded).unwrap();
        assert_eq!(recovered, key);
        assert_eq!(recovered.depth_left(), 3);
    }

    #[test]
    fn bottom_level_private_key_roundtrip() {
        let mut rng = rand::thread_rng();
        let bbg = BonehBoyenGoh::new(3);
        let (params, master_key) = bbg.setup(&mut rng).unwrap();
        let key = bbg
            .generate_key(&mut rng, &params, &master_key, &identity())
            .unwrap();
        let recovered = PrivateKey::from_bytes(&key.to_bytes()).unwrap();
        assert_eq!(recovered, key);
        assert_eq!(recovered.depth_left(), 0);
    }

    #[test]
    fn ciphertext_roundtrip() {
        let (_, _, _, ciphertext) = sample(rand::thread_rng(), 3);
        let encoded = ciphertext.to_bytes();
        assert_eq!(encoded.len(), 18 * UNIT);
        let recovered = Ciphertext::from_bytes(&encoded).unwrap();
        assert_eq!(recovered, ciphertext);
    }

    #[test]
    fn ragged_lengths_are_rejected() {
        let (params, _, key, ciphertext) = sample(rand::thread_rng(), 3);

        let mut overlong = params.to_bytes();
        overlong.push(0);
        assert!(Params::from_bytes(&overlong).is_err());

        let encoded = params.to_bytes();
        assert!(Params::from_bytes(&encoded[..encoded.len() - 1]).is_err());

        let mut overlong = key.to_bytes();
        overlong.push(0);
        assert!(PrivateKey::from_bytes(&overlong).is_err());

        let mut overlong = ciphertext.to_bytes();
        overlong.push(0);
        assert!(Ciphertext::from_bytes(&overlong).is_err());
        let encoded = ciphertext.to_bytes();
        assert!(Ciphertext::from_bytes(&encoded[..encoded.len() - UNIT]).is_err());
    }

    #[test]
    fn truncated_prefixes_are_rejected() {
        assert!(Params::from_bytes(&[0; PARAMS_PREFIX - UNIT]).is_err());
        assert!(PrivateKey::from_bytes(&[0; KEY_PREFIX - UNIT]).is_err());
        assert!(Encapsulation::from_bytes(&[0; ENCAPSULATION_WIDTH - UNIT]).is_err());
    }

    #[test]
    fn ragged_slot_counts_are_rejected() {
        // A whole number of units that is not a whole number of per-level elements.
        let (params, _, key, _) = sample(rand::thread_rng(), 3);

        let mut bytes = params.to_bytes();
        bytes.extend_from_slice(&[0; UNIT]);
        assert!(Params::from_bytes(&bytes).is_err());

        let mut bytes = key.to_bytes();
        bytes.extend_from_slice(&[0; UNIT]);
        assert!(PrivateKey::from_bytes(&bytes).is_err());
    }

    #[test]
    fn garbage_elements_are_rejected() {
        let (params, _, key, ciphertext) = sample(rand::thread_rng(), 3);

        let mut bytes = params.to_bytes();
        for byte in bytes[..G2_WIDTH].iter_mut() {
            *byte = 0xff;
        }
        assert!(Params::from_bytes(&bytes).is_err());

        let mut bytes = key.to_bytes();
        for byte in bytes[..G1_WIDTH].iter_mut() {
            *byte = 0xff;
        }
        assert!(PrivateKey::from_bytes(&bytes).is_err());

        let mut bytes = ciphertext.to_bytes();
        for byte in bytes[..GT_WIDTH].iter_mut() {
            *byte = 0xff;
        }
        assert!(Ciphertext::from_bytes(&bytes).is_err());
    }

    #[test]
    fn encapsulation_roundtrip() {
        use super::super::HibeKem;

        let mut rng = rand::thread_rng();
        let bbg = BonehBoyenGoh::new(3);
        let (params, _) = bbg.setup(&mut rng).unwrap();
        let (_, encapsulation) = bbg
            .encapsulate(&mut rng, &params, &identity()[..1])
            .unwrap();
        let recovered = Encapsulation::from_bytes(&encapsulation.to_bytes()).unwrap();
        assert_eq!(recovered, encapsulation);
    }
}
