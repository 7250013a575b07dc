use crate::{transaction::Clause, Error, Result};

/// Base cost of every transaction.
pub const TX_GAS: u64 = 5_000;
/// Cost of a clause that calls or transfers to an existing address.
pub const CLAUSE_GAS: u64 = 16_000;
/// Cost of a clause that creates a contract (no recipient).
pub const CLAUSE_GAS_CONTRACT_CREATION: u64 = 48_000;
/// Cost of a zero byte of clause data.
pub const ZERO_BYTE_GAS: u64 = 4;
/// Cost of a non-zero byte of clause data.
pub const NON_ZERO_BYTE_GAS: u64 = 68;

/// Gas charged for clause data.
pub fn data_gas(data: &[u8]) -> Result<u64> {
    let zeros = data.iter().filter(|byte| **byte == 0).count() as u64;
    let non_zeros = data.len() as u64 - zeros;
    zeros
        .checked_mul(ZERO_BYTE_GAS)
        .and_then(|gas| gas.checked_add(non_zeros.checked_mul(NON_ZERO_BYTE_GAS)?))
        .ok_or(Error::GasOverflow)
}

/// Minimum gas a transaction with `clauses` must provide before execution.
pub fn intrinsic_gas(clauses: &[Clause]) -> Result<u64> {
    if clauses.is_empty() {
        return Ok(TX_GAS + CLAUSE_GAS);
    }

    clauses.iter().try_fold(TX_GAS, |total, clause| {
        let clause_gas = if clause.to.is_some() {
            CLAUSE_GAS
        } else {
            CLAUSE_GAS_CONTRACT_CREATION
        };
        total
            .checked_add(clause_gas)
            .and_then(|total| total.checked_add(data_gas(&clause.data).ok()?))
            .ok_or(Error::GasOverflow)
    })
}
