use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("The supplied identity had no elements")]
    EmptyIdentity,
    #[error("The supplied identity was too long")]
    IdentityTooLong,
    #[error("The supplied identity does not extend the parent key's identity")]
    NotDescendant,
    #[error("The supplied bytes are not a valid encoding")]
    MalformedEncoding,
    #[error("The supplied ciphertext was malformed")]
    MalformedCiphertext,
}

pub type Result<V, E = Error> = std::result::Result<V, E>;
