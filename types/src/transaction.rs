//! Thor transactions and their RLP wire format.
//!
//! A transaction is the RLP list
//! `[chainTag, blockRef, expiration, clauses, gasPriceCoef, gas, dependsOn, nonce, reserved]`,
//! followed by the signature when signed. Integers use the minimal big-endian
//! form (zero is the empty string) and absent addresses/hashes are empty strings.

use crate::{
    crypto::{blake2b256, PrivateKey, Signature, SIGNATURE_LENGTH},
    gas,
    primitives::{hex_bytes, to_hex, Address, BlockRef, Bytes32, U256},
    Error, Result,
};
use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};
use serde::{ser::SerializeStruct, Deserialize, Serialize, Serializer};

/// Number of fields in an unsigned transaction.
const UNSIGNED_FIELDS: usize = 9;
/// Number of fields in a signed transaction.
const SIGNED_FIELDS: usize = 10;

/// Single recipient/value/data triple of a transaction.
///
/// A clause without recipient deploys `data` as a contract.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clause {
    pub to: Option<Address>,
    pub value: U256,
    #[serde(with = "hex_bytes", default)]
    pub data: Vec<u8>,
}

impl Clause {
    pub fn transfer(to: Address, value: U256) -> Self {
        Self {
            to: Some(to),
            value,
            data: Vec::new(),
        }
    }
}

impl Encodable for Clause {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(3);
        match &self.to {
            Some(to) => s.append(to),
            None => s.append_empty_data(),
        };
        s.append(&self.value);
        s.append(&self.data);
    }
}

impl Decodable for Clause {
    fn decode(rlp: &Rlp<'_>) -> std::result::Result<Self, DecoderError> {
        if rlp.item_count()? != 3 {
            return Err(DecoderError::RlpIncorrectListLen);
        }
        Ok(Self {
            to: nullable(&rlp.at(0)?)?,
            value: rlp.val_at(1)?,
            data: rlp.val_at(2)?,
        })
    }
}

/// Decode an empty string as `None` and anything else as `T`.
fn nullable<T: Decodable>(rlp: &Rlp<'_>) -> std::result::Result<Option<T>, DecoderError> {
    if rlp.is_data() && rlp.is_empty() {
        return Ok(None);
    }
    rlp.as_val().map(Some)
}

/// Reserved list at the end of the body. The first entry holds the feature bits.
///
/// Trailing empty `unused` entries are dropped on construction, so the value
/// always matches its wire form.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Reserved {
    features: u32,
    unused: Vec<Vec<u8>>,
}

impl Reserved {
    /// Fee delegation (VIP-191).
    pub const DELEGATION: u32 = 1;

    pub fn new(features: u32, mut unused: Vec<Vec<u8>>) -> Self {
        while unused.last().is_some_and(|item| item.is_empty()) {
            unused.pop();
        }
        Self { features, unused }
    }

    pub fn features(&self) -> u32 {
        self.features
    }

    pub fn unused(&self) -> &[Vec<u8>] {
        &self.unused
    }

    pub fn is_delegated(&self) -> bool {
        self.features & Self::DELEGATION == Self::DELEGATION
    }

    /// Entries as written on the wire, trailing empty entries removed.
    fn items(&self) -> Vec<Vec<u8>> {
        let features = self.features.to_be_bytes();
        let start = features.iter().position(|b| *b != 0).unwrap_or(features.len());

        let mut items = Vec::with_capacity(1 + self.unused.len());
        items.push(features[start..].to_vec());
        items.extend(self.unused.iter().cloned());
        while items.last().is_some_and(|item| item.is_empty()) {
            items.pop();
        }
        items
    }

    fn decode(rlp: &Rlp<'_>) -> Result<Self> {
        if !rlp.is_list() {
            return Err(DecoderError::RlpExpectedToBeList.into());
        }
        let items: Vec<Vec<u8>> = rlp.as_list()?;
        if items.last().is_some_and(|item| item.is_empty()) {
            return Err(Error::UntrimmedReserved);
        }
        let features = if items.is_empty() { 0 } else { rlp.val_at(0)? };
        Ok(Self {
            features,
            unused: items.into_iter().skip(1).collect(),
        })
    }
}

impl Encodable for Reserved {
    fn rlp_append(&self, s: &mut RlpStream) {
        let items = self.items();
        s.begin_list(items.len());
        for item in &items {
            s.append(item);
        }
    }
}

impl Serialize for Reserved {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Reserved", 2)?;
        state.serialize_field("features", &self.features)?;
        let unused: Vec<String> = self.unused.iter().map(|item| to_hex(item)).collect();
        state.serialize_field("unused", &unused)?;
        state.end()
    }
}

/// Unsigned part of a transaction.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Body {
    pub chain_tag: u8,
    pub block_ref: BlockRef,
    pub expiration: u32,
    pub clauses: Vec<Clause>,
    pub gas_price_coef: u8,
    pub gas: u64,
    pub depends_on: Option<Bytes32>,
    pub nonce: u64,
    pub reserved: Reserved,
}

impl Body {
    fn append_fields(&self, s: &mut RlpStream) {
        s.append(&self.chain_tag);
        s.append(&self.block_ref.as_u64());
        s.append(&self.expiration);
        s.begin_list(self.clauses.len());
        for clause in &self.clauses {
            s.append(clause);
        }
        s.append(&self.gas_price_coef);
        s.append(&self.gas);
        match &self.depends_on {
            Some(depends_on) => s.append(depends_on),
            None => s.append_empty_data(),
        };
        s.append(&self.nonce);
        s.append(&self.reserved);
    }

    fn decode_fields(rlp: &Rlp<'_>) -> Result<Self> {
        let clauses = rlp.at(3)?;
        if !clauses.is_list() {
            return Err(DecoderError::RlpExpectedToBeList.into());
        }
        Ok(Self {
            chain_tag: rlp.val_at(0)?,
            block_ref: BlockRef::from_u64(rlp.val_at(1)?),
            expiration: rlp.val_at(2)?,
            clauses: clauses.as_list()?,
            gas_price_coef: rlp.val_at(4)?,
            gas: rlp.val_at(5)?,
            depends_on: nullable(&rlp.at(6)?)?,
            nonce: rlp.val_at(7)?,
            reserved: Reserved::decode(&rlp.at(8)?)?,
        })
    }
}

impl Encodable for Body {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(UNSIGNED_FIELDS);
        self.append_fields(s);
    }
}

/// Thor transaction, optionally signed.
///
/// The signature is 65 bytes for a regular transaction and 130 bytes (origin
/// followed by delegator) when fee delegation is enabled.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Transaction {
    pub body: Body,
    pub signature: Option<Vec<u8>>,
}

impl Transaction {
    pub fn new(body: Body) -> Self {
        Self {
            body,
            signature: None,
        }
    }

    pub fn is_delegated(&self) -> bool {
        self.body.reserved.is_delegated()
    }

    pub fn intrinsic_gas(&self) -> Result<u64> {
        gas::intrinsic_gas(&self.body.clauses)
    }

    /// Digest signed by the origin.
    pub fn signing_hash(&self) -> Bytes32 {
        blake2b256(&[&rlp::encode(&self.body)[..]])
    }

    /// Digest signed by the delegator on behalf of `origin`.
    pub fn delegator_signing_hash(&self, origin: &Address) -> Bytes32 {
        blake2b256(&[self.signing_hash().as_bytes(), origin.as_bytes()])
    }

    pub fn with_signature(mut self, signature: Vec<u8>) -> Self {
        self.signature = Some(signature);
        self
    }

    /// Sign a transaction without fee delegation.
    pub fn sign(self, key: &PrivateKey) -> Result<Self> {
        if self.is_delegated() {
            return Err(Error::DelegatorRequired);
        }
        let signature = key.sign(&self.signing_hash())?;
        Ok(self.with_signature(signature.as_bytes().to_vec()))
    }

    /// Sign a delegated transaction with both the origin and the gas payer.
    pub fn sign_delegated(self, origin: &PrivateKey, delegator: &PrivateKey) -> Result<Self> {
        if !self.is_delegated() {
            return Err(Error::NotDelegated);
        }
        let origin_signature = origin.sign(&self.signing_hash())?;
        let delegator_signature =
            delegator.sign(&self.delegator_signing_hash(&origin.address()))?;

        let mut signature = Vec::with_capacity(2 * SIGNATURE_LENGTH);
        signature.extend_from_slice(origin_signature.as_bytes());
        signature.extend_from_slice(delegator_signature.as_bytes());
        Ok(self.with_signature(signature))
    }

    /// Signature length required by the delegation flag.
    fn signature_length(&self) -> usize {
        if self.is_delegated() {
            2 * SIGNATURE_LENGTH
        } else {
            SIGNATURE_LENGTH
        }
    }

    fn check_signature_length(&self, signature: &[u8]) -> Result<()> {
        let expected = self.signature_length();
        if signature.len() != expected {
            return Err(Error::InvalidLength {
                context: "signature",
                expected,
                got: signature.len(),
            });
        }
        Ok(())
    }

    fn signature_parts(&self) -> Result<(Signature, Option<Signature>)> {
        let signature = self.signature.as_deref().ok_or(Error::MissingSignature)?;
        self.check_signature_length(signature)?;
        let origin = Signature::from_slice(&signature[..SIGNATURE_LENGTH])?;
        let delegator = if self.is_delegated() {
            Some(Signature::from_slice(&signature[SIGNATURE_LENGTH..])?)
        } else {
            None
        };
        Ok((origin, delegator))
    }

    /// Address that signed the transaction.
    pub fn origin(&self) -> Result<Address> {
        let (origin, _) = self.signature_parts()?;
        origin.recover(&self.signing_hash())
    }

    /// Address paying for gas, for delegated transactions.
    pub fn delegator(&self) -> Result<Option<Address>> {
        let (origin, delegator) = self.signature_parts()?;
        let Some(delegator) = delegator else {
            return Ok(None);
        };
        let origin = origin.recover(&self.signing_hash())?;
        delegator
            .recover(&self.delegator_signing_hash(&origin))
            .map(Some)
    }

    /// Transaction id, derived from the signing hash and the origin.
    pub fn id(&self) -> Result<Bytes32> {
        let origin = self.origin()?;
        Ok(blake2b256(&[
            self.signing_hash().as_bytes(),
            origin.as_bytes(),
        ]))
    }

    pub fn encode(&self) -> Vec<u8> {
        rlp::encode(self).to_vec()
    }

    pub fn size(&self) -> usize {
        self.encode().len()
    }

    /// Decode a signed or unsigned transaction. The whole input must be consumed.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let rlp = Rlp::new(bytes);
        let total = rlp.payload_info()?.total();
        if total > bytes.len() {
            return Err(DecoderError::RlpIsTooShort.into());
        }
        if total < bytes.len() {
            return Err(Error::TrailingBytes(bytes.len() - total));
        }
        if !rlp.is_list() {
            return Err(DecoderError::RlpExpectedToBeList.into());
        }

        let fields = rlp.item_count()?;
        let signature = match fields {
            UNSIGNED_FIELDS => None,
            SIGNED_FIELDS => Some(rlp.val_at::<Vec<u8>>(UNSIGNED_FIELDS)?),
            _ => return Err(Error::UnexpectedFieldCount(fields)),
        };
        let tx = Self {
            body: Body::decode_fields(&rlp)?,
            signature,
        };
        if let Some(signature) = &tx.signature {
            tx.check_signature_length(signature)?;
        }
        Ok(tx)
    }
}

impl Encodable for Transaction {
    fn rlp_append(&self, s: &mut RlpStream) {
        match &self.signature {
            Some(signature) => {
                s.begin_list(SIGNED_FIELDS);
                self.body.append_fields(s);
                s.append(signature);
            }
            None => {
                s.begin_list(UNSIGNED_FIELDS);
                self.body.append_fields(s);
            }
        }
    }
}

impl Serialize for Transaction {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Transaction", 5)?;
        state.serialize_field("body", &self.body)?;
        state.serialize_field(
            "signature",
            &self.signature.as_deref().map(to_hex),
        )?;
        state.serialize_field("origin", &self.origin().ok())?;
        state.serialize_field("delegator", &self.delegator().ok().flatten())?;
        state.serialize_field("id", &self.id().ok())?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::{parse_address, parse_bytes32, parse_hex};
    use proptest::prelude::*;

    const DEV_KEY: &str = "99f0500549792796c14fed62011a51081dc5b5e68fe8bd8a13b86be829c4fd36";
    const DELEGATOR_KEY: &str = "7b067f53d350f1cf20ec13df416b7b73e88a1dc7331bc904b92108b1e76a08b1";

    fn recipient() -> Address {
        parse_address("0x7567d83b7b8d80addcb281a71d54fc7b3364ffed").unwrap()
    }

    fn two_clause_body() -> Body {
        let data = parse_hex("0x000000606060").unwrap();
        Body {
            chain_tag: 1,
            block_ref: "0x00000000aabbccdd".parse().unwrap(),
            expiration: 32,
            clauses: vec![
                Clause {
                    to: Some(recipient()),
                    value: U256::from(10_000u64),
                    data: data.clone(),
                },
                Clause {
                    to: Some(recipient()),
                    value: U256::from(20_000u64),
                    data,
                },
            ],
            gas_price_coef: 128,
            gas: 21_000,
            depends_on: None,
            nonce: 12_345_678,
            reserved: Reserved::default(),
        }
    }

    const TWO_CLAUSE_ENCODED: &str = "f8540184aabbccdd20f840df947567d83b7b8d80addcb281a71d54fc7b3364ffed82271086000000606060df947567d83b7b8d80addcb281a71d54fc7b3364ffed824e208600000060606081808252088083bc614ec0";

    #[test]
    fn unsigned_encoding_matches_reference() {
        let tx = Transaction::new(two_clause_body());
        assert_eq!(hex::encode(tx.encode()), TWO_CLAUSE_ENCODED);
        assert_eq!(
            tx.signing_hash(),
            parse_bytes32("0x2a1c25ce0d66f45276a5f308b99bf410e2fc7d5b6ea37a49f2ab9f1da9446478")
                .unwrap()
        );
        assert_eq!(tx.intrinsic_gas().unwrap(), 37_432);
        assert!(!tx.is_delegated());
    }

    #[test]
    fn decode_unsigned_reference() {
        let bytes = hex::decode(TWO_CLAUSE_ENCODED).unwrap();
        let tx = Transaction::decode(&bytes).unwrap();
        assert_eq!(tx, Transaction::new(two_clause_body()));
        assert!(matches!(tx.origin(), Err(Error::MissingSignature)));
        assert!(matches!(tx.id(), Err(Error::MissingSignature)));
    }

    #[test]
    fn single_transfer_body_encoding() {
        let body = Body {
            chain_tag: 0xf5,
            block_ref: BlockRef::default(),
            expiration: 32,
            clauses: vec![Clause::transfer(recipient(), U256::from(10_000u64))],
            gas_price_coef: 128,
            gas: 21_000,
            depends_on: None,
            nonce: 12_345_678,
            reserved: Reserved::default(),
        };
        let tx = Transaction::new(body);
        assert_eq!(
            hex::encode(tx.encode()),
            "ea81f58020dad9947567d83b7b8d80addcb281a71d54fc7b3364ffed8227108081808252088083bc614ec0"
        );
        assert_eq!(
            tx.signing_hash(),
            parse_bytes32("0x34952b48412d2f5a0296e9ef3df8bff25a3f50a2a8e9a643f3fe9b82f491eed2")
                .unwrap()
        );
    }

    #[test]
    fn sign_encode_decode() {
        let key = PrivateKey::from_hex(DEV_KEY).unwrap();
        let tx = Transaction::new(two_clause_body()).sign(&key).unwrap();
        assert_eq!(tx.signature.as_ref().unwrap().len(), SIGNATURE_LENGTH);
        assert_eq!(tx.origin().unwrap(), key.address());
        assert_eq!(tx.delegator().unwrap(), None);

        let decoded = Transaction::decode(&tx.encode()).unwrap();
        assert_eq!(decoded, tx);
        assert_eq!(decoded.origin().unwrap(), key.address());
        assert_eq!(decoded.id().unwrap(), tx.id().unwrap());
        assert_eq!(
            decoded.id().unwrap(),
            blake2b256(&[tx.signing_hash().as_bytes(), key.address().as_bytes()])
        );
        // The signature is not part of the signing hash.
        assert_eq!(decoded.signing_hash(), Transaction::new(two_clause_body()).signing_hash());
    }

    #[test]
    fn delegated_transaction() {
        let origin = PrivateKey::from_hex(DEV_KEY).unwrap();
        let delegator = PrivateKey::from_hex(DELEGATOR_KEY).unwrap();
        let mut body = two_clause_body();
        body.reserved = Reserved::new(Reserved::DELEGATION, Vec::new());

        let unsigned = Transaction::new(body);
        assert!(unsigned.is_delegated());
        assert!(matches!(
            unsigned.clone().sign(&origin),
            Err(Error::DelegatorRequired)
        ));

        let tx = unsigned.sign_delegated(&origin, &delegator).unwrap();
        assert_eq!(tx.signature.as_ref().unwrap().len(), 2 * SIGNATURE_LENGTH);

        let decoded = Transaction::decode(&tx.encode()).unwrap();
        assert_eq!(decoded.body.reserved.features(), Reserved::DELEGATION);
        assert_eq!(decoded.origin().unwrap(), origin.address());
        assert_eq!(decoded.delegator().unwrap(), Some(delegator.address()));
    }

    #[test]
    fn sign_delegated_requires_feature() {
        let key = PrivateKey::from_hex(DEV_KEY).unwrap();
        assert!(matches!(
            Transaction::new(two_clause_body()).sign_delegated(&key, &key),
            Err(Error::NotDelegated)
        ));
    }

    #[test]
    fn reserved_features_encoding() {
        let mut body = two_clause_body();
        body.reserved = Reserved::new(1, Vec::new());
        let encoded = Transaction::new(body).encode();
        // Reserved list holds a single `0x01` entry.
        assert_eq!(&encoded[encoded.len() - 2..], &[0xc1, 0x01]);

        let mut body = two_clause_body();
        body.reserved = Reserved::new(0, vec![vec![], vec![]]);
        // Empty unused entries are trimmed away.
        assert!(body.reserved.unused().is_empty());
        assert_eq!(hex::encode(Transaction::new(body).encode()), TWO_CLAUSE_ENCODED);
    }

    #[test]
    fn decode_rejects_untrimmed_reserved() {
        let mut s = RlpStream::new_list(UNSIGNED_FIELDS);
        two_clause_body().append_fields_with_reserved(&mut s, &[vec![1], vec![]]);
        assert!(matches!(
            Transaction::decode(&s.out()),
            Err(Error::UntrimmedReserved)
        ));
    }

    #[test]
    fn decode_keeps_unused_reserved_entries() {
        let mut s = RlpStream::new_list(UNSIGNED_FIELDS);
        two_clause_body().append_fields_with_reserved(&mut s, &[vec![], vec![0xaa]]);
        let bytes = s.out().to_vec();
        let tx = Transaction::decode(&bytes).unwrap();
        assert_eq!(tx.body.reserved.features(), 0);
        assert_eq!(tx.body.reserved.unused(), &[vec![0xaa]]);
        assert_eq!(tx.encode(), bytes);
    }

    #[test]
    fn decode_rejects_malformed_input() {
        assert!(matches!(Transaction::decode(&[]), Err(Error::Rlp(_))));

        let mut bytes = hex::decode(TWO_CLAUSE_ENCODED).unwrap();
        bytes.push(0x00);
        assert!(matches!(Transaction::decode(&bytes), Err(Error::TrailingBytes(1))));

        let bytes = hex::decode(TWO_CLAUSE_ENCODED).unwrap();
        assert!(Transaction::decode(&bytes[..bytes.len() - 1]).is_err());

        let mut s = RlpStream::new_list(3);
        s.append(&1u8).append(&2u8).append(&3u8);
        assert!(matches!(
            Transaction::decode(&s.out()),
            Err(Error::UnexpectedFieldCount(3))
        ));

        // A byte string is not a transaction.
        assert!(matches!(
            Transaction::decode(&rlp::encode(&vec![1u8, 2, 3])),
            Err(Error::Rlp(_))
        ));
    }

    #[test]
    fn decode_rejects_short_recipient() {
        let mut s = RlpStream::new_list(UNSIGNED_FIELDS);
        let body = two_clause_body();
        s.append(&body.chain_tag);
        s.append(&body.block_ref.as_u64());
        s.append(&body.expiration);
        s.begin_list(1);
        s.begin_list(3);
        s.append(&vec![0x75u8, 0x67]);
        s.append(&U256::from(1u64));
        s.append(&Vec::<u8>::new());
        s.append(&body.gas_price_coef);
        s.append(&body.gas);
        s.append_empty_data();
        s.append(&body.nonce);
        s.begin_list(0);
        assert!(matches!(Transaction::decode(&s.out()), Err(Error::Rlp(_))));
    }

    #[test]
    fn wrong_signature_length_is_reported() {
        let tx = Transaction::new(two_clause_body()).with_signature(vec![0u8; 64]);
        assert!(matches!(
            tx.origin(),
            Err(Error::InvalidLength { expected: 65, got: 64, .. })
        ));
        assert!(matches!(
            Transaction::decode(&tx.encode()),
            Err(Error::InvalidLength { expected: 65, got: 64, .. })
        ));
    }

    #[test]
    fn decode_checks_signature_length_against_delegation() {
        let key = PrivateKey::from_hex(DEV_KEY).unwrap();
        let signed = Transaction::new(two_clause_body()).sign(&key).unwrap();

        // A plain 65 byte signature on a delegated body.
        let mut body = two_clause_body();
        body.reserved = Reserved::new(Reserved::DELEGATION, Vec::new());
        let tx = Transaction::new(body).with_signature(signed.signature.clone().unwrap());
        assert!(matches!(
            Transaction::decode(&tx.encode()),
            Err(Error::InvalidLength { expected: 130, got: 65, .. })
        ));

        // A 130 byte signature on a plain body.
        let tx = Transaction::new(two_clause_body()).with_signature(vec![1u8; 130]);
        assert!(matches!(
            Transaction::decode(&tx.encode()),
            Err(Error::InvalidLength { expected: 65, got: 130, .. })
        ));
    }

    #[test]
    fn reserved_constructor_matches_wire_form() {
        let mut body = two_clause_body();
        body.reserved = Reserved::new(1, vec![vec![0xaa], vec![]]);
        assert_eq!(body.reserved.unused(), &[vec![0xaa]]);

        let tx = Transaction::new(body);
        assert_eq!(Transaction::decode(&tx.encode()).unwrap(), tx);
    }

    #[test]
    fn serializes_decoded_view() {
        let key = PrivateKey::from_hex(DEV_KEY).unwrap();
        let tx = Transaction::new(two_clause_body()).sign(&key).unwrap();
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["body"]["chainTag"], 1);
        assert_eq!(json["body"]["blockRef"], "0x00000000aabbccdd");
        assert_eq!(json["body"]["clauses"][0]["value"], "0x2710");
        assert_eq!(json["body"]["clauses"][0]["data"], "0x000000606060");
        assert_eq!(json["body"]["dependsOn"], serde_json::Value::Null);
        assert_eq!(
            json["origin"],
            serde_json::to_value(key.address()).unwrap()
        );
        assert_eq!(json["delegator"], serde_json::Value::Null);
    }

    impl Body {
        /// Write the body fields with an arbitrary reserved list.
        fn append_fields_with_reserved(&self, s: &mut RlpStream, reserved: &[Vec<u8>]) {
            s.append(&self.chain_tag);
            s.append(&self.block_ref.as_u64());
            s.append(&self.expiration);
            s.begin_list(self.clauses.len());
            for clause in &self.clauses {
                s.append(clause);
            }
            s.append(&self.gas_price_coef);
            s.append(&self.gas);
            s.append_empty_data();
            s.append(&self.nonce);
            s.begin_list(reserved.len());
            for item in reserved {
                s.append(item);
            }
        }
    }

    fn arb_clause() -> impl Strategy<Value = Clause> {
        (
            proptest::option::of(any::<[u8; 20]>()),
            any::<u128>(),
            proptest::collection::vec(any::<u8>(), 0..64),
        )
            .prop_map(|(to, value, data)| Clause {
                to: to.map(Address::from),
                value: U256::from(value),
                data,
            })
    }

    proptest! {
        #[test]
        fn decode_inverts_encode(
            chain_tag in any::<u8>(),
            block_ref in any::<u64>(),
            expiration in any::<u32>(),
            clauses in proptest::collection::vec(arb_clause(), 0..4),
            gas_price_coef in any::<u8>(),
            gas in any::<u64>(),
            depends_on in proptest::option::of(any::<[u8; 32]>()),
            nonce in any::<u64>(),
            features in any::<u32>(),
            unused in proptest::collection::vec(proptest::collection::vec(any::<u8>(), 0..4), 0..4),
            signature in proptest::option::of(proptest::collection::vec(any::<u8>(), 2 * SIGNATURE_LENGTH)),
        ) {
            let reserved = Reserved::new(features, unused);
            let signature_length = if reserved.is_delegated() {
                2 * SIGNATURE_LENGTH
            } else {
                SIGNATURE_LENGTH
            };
            let signature = signature.map(|mut signature| {
                signature.truncate(signature_length);
                signature
            });
            let tx = Transaction {
                body: Body {
                    chain_tag,
                    block_ref: BlockRef::from_u64(block_ref),
                    expiration,
                    clauses,
                    gas_price_coef,
                    gas,
                    depends_on: depends_on.map(Bytes32::from),
                    nonce,
                    reserved,
                },
                signature,
            };
            prop_assert_eq!(Transaction::decode(&tx.encode()).unwrap(), tx);
        }
    }
}
