use crate::{
    gas,
    primitives::{BlockRef, Bytes32},
    transaction::{Body, Clause, Reserved, Transaction},
    Result,
};

/// Chainable constructor for unsigned transactions.
#[derive(Clone, Debug, Default)]
pub struct Builder {
    body: Body,
    gas: Option<u64>,
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chain_tag(mut self, chain_tag: u8) -> Self {
        self.body.chain_tag = chain_tag;
        self
    }

    pub fn clause(mut self, clause: Clause) -> Self {
        self.body.clauses.push(clause);
        self
    }

    pub fn clauses(mut self, clauses: impl IntoIterator<Item = Clause>) -> Self {
        self.body.clauses.extend(clauses);
        self
    }

    pub fn block_ref(mut self, block_ref: BlockRef) -> Self {
        self.body.block_ref = block_ref;
        self
    }

    pub fn expiration(mut self, expiration: u32) -> Self {
        self.body.expiration = expiration;
        self
    }

    pub fn gas_price_coef(mut self, gas_price_coef: u8) -> Self {
        self.body.gas_price_coef = gas_price_coef;
        self
    }

    pub fn gas(mut self, gas: u64) -> Self {
        self.gas = Some(gas);
        self
    }

    pub fn depends_on(mut self, depends_on: Option<Bytes32>) -> Self {
        self.body.depends_on = depends_on;
        self
    }

    pub fn nonce(mut self, nonce: u64) -> Self {
        self.body.nonce = nonce;
        self
    }

    pub fn features(mut self, features: u32) -> Self {
        self.body.reserved = Reserved::new(features, self.body.reserved.unused().to_vec());
        self
    }

    /// Build the unsigned transaction. Gas defaults to the intrinsic gas of the clauses.
    pub fn build(self) -> Result<Transaction> {
        let mut body = self.body;
        body.gas = match self.gas {
            Some(gas) => gas,
            None => gas::intrinsic_gas(&body.clauses)?,
        };
        Ok(Transaction::new(body))
    }
}

/// Random transaction nonce.
pub fn random_nonce() -> u64 {
    rand::random()
}
