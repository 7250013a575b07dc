//! Sign, encode and check a transaction before it leaves the process.

use crate::{Error, Result};
use thor_schedule_types::{primitives::to_hex, PrivateKey, Transaction};
use tracing::{debug, info};

/// A signed transaction together with its wire form and the decoded copy used
/// to check it.
#[derive(Clone, Debug)]
pub struct Prepared {
    pub tx: Transaction,
    pub raw: Vec<u8>,
    pub decoded: Transaction,
}

impl Prepared {
    pub fn raw_hex(&self) -> String {
        to_hex(&self.raw)
    }
}

/// Sign `unsigned` with `key`, encode it and decode it back.
///
/// Fails if the decoded transaction differs from the signed one or if its
/// origin is not the signer.
pub fn prepare(unsigned: Transaction, key: &PrivateKey) -> Result<Prepared> {
    let signing_hash = unsigned.signing_hash();
    debug!(?signing_hash, gas = unsigned.body.gas, "signing transaction");
    let tx = unsigned.sign(key)?;

    let raw = tx.encode();
    let decoded = Transaction::decode(&raw)?;
    verify(&tx, &decoded, key)?;

    let id = decoded.id()?;
    info!(?id, size = raw.len(), "transaction prepared");
    Ok(Prepared { tx, raw, decoded })
}

fn verify(tx: &Transaction, decoded: &Transaction, key: &PrivateKey) -> Result<()> {
    if decoded != tx {
        return Err(Error::VerificationFailed {
            context: "decode",
            reason: "decoded transaction differs from the signed one".to_string(),
        });
    }
    let origin = decoded.origin()?;
    let signer = key.address();
    if origin != signer {
        return Err(Error::VerificationFailed {
            context: "signature",
            reason: format!("recovered {origin:?}, expected {signer:?}"),
        });
    }
    Ok(())
}
