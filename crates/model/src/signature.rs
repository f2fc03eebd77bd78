use {
    alloy::primitives::{Address, B256, Signature, U256},
    anyhow::{Context as _, Result},
    std::fmt::{self, Debug, Formatter},
};

/// An ECDSA signature split into its `(v, r, s)` components, the way the
/// order book expects it.
#[derive(Eq, PartialEq, Clone, Copy, Default, Hash)]
pub struct EcdsaSignature {
    pub r: B256,
    pub s: B256,
    pub v: u8,
}

impl Debug for EcdsaSignature {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_tuple("EcdsaSignature")
            .field(&alloy::primitives::hex::encode_prefixed(self.to_bytes()))
            .finish()
    }
}

impl EcdsaSignature {
    /// Assembles a signature from optionally supplied components.
    ///
    /// Returns `None` unless all three components are present. A `v` of zero
    /// counts as missing because valid message signatures use 27 or 28.
    pub fn from_parts(v: Option<u8>, r: Option<B256>, s: Option<B256>) -> Option<Self> {
        match (v, r, s) {
            (Some(v), Some(r), Some(s)) if v != 0 => Some(Self { r, s, v }),
            _ => None,
        }
    }

    /// r + s + v
    pub fn to_bytes(self) -> [u8; 65] {
        let mut bytes = [0u8; 65];
        bytes[..32].copy_from_slice(self.r.as_slice());
        bytes[32..64].copy_from_slice(self.s.as_slice());
        bytes[64] = self.v;
        bytes
    }

    /// Recovers the address that signed `hash` as an EIP-191 personal
    /// message, i.e. the way wallets sign raw digests.
    pub fn recover(&self, hash: &B256) -> Result<Address> {
        let signature =
            Signature::from_raw(&self.to_bytes()).context("unexpectedly invalid signature")?;
        signature
            .recover_address_from_msg(hash.as_slice())
            .context("failed to recover signer")
    }
}

impl From<Signature> for EcdsaSignature {
    fn from(signature: Signature) -> Self {
        Self {
            r: B256::from(signature.r().to_be_bytes::<32>()),
            s: B256::from(signature.s().to_be_bytes::<32>()),
            v: 27 + u8::from(signature.v()),
        }
    }
}

impl From<EcdsaSignature> for Signature {
    fn from(signature: EcdsaSignature) -> Self {
        Signature::new(
            U256::from_be_bytes(signature.r.0),
            U256::from_be_bytes(signature.s.0),
            signature.v % 2 == 0,
        )
    }
}
