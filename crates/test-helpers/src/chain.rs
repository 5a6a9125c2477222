// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::primitives::{keccak256, Address, Bytes, TxHash, U256};
use alloy::sol_types::{SolCall, SolValue};
use anyhow::{bail, Result};
use async_trait::async_trait;
use cofhe_evm_helpers::contracts::MockZkVerifier;
use cofhe_evm_helpers::{PublicClient, WalletClient};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Handle the fake mock verifier assigns to one plaintext
pub fn fake_ct_hash(
    value: U256,
    utype: u8,
    user: Address,
    security_zone: u8,
    chain_id: U256,
) -> U256 {
    U256::from_be_bytes(
        keccak256(
            (
                value,
                U256::from(utype),
                user,
                U256::from(security_zone),
                chain_id,
            )
                .abi_encode(),
        )
        .0,
    )
}

/// Chain client that answers the mock verifier's `zkVerifyCalcCtHashesPacked` locally.
pub struct FakePublicClient {
    chain_id: Option<u64>,
    fail: bool,
    delay: Duration,
    chain_id_calls: AtomicUsize,
    calls: AtomicUsize,
}

impl FakePublicClient {
    pub fn new(chain_id: u64) -> Self {
        Self {
            chain_id: Some(chain_id),
            fail: false,
            delay: Duration::ZERO,
            chain_id_calls: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
        }
    }

    /// Reports no chain id at all
    pub fn without_chain_id() -> Self {
        Self {
            chain_id: None,
            ..Self::new(0)
        }
    }

    /// Every request errors
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(0)
        }
    }

    /// Delay chain id lookups, to keep a connection attempt in flight
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn chain_id_calls(&self) -> usize {
        self.chain_id_calls.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PublicClient for FakePublicClient {
    async fn get_chain_id(&self) -> Result<Option<u64>> {
        self.chain_id_calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.fail {
            bail!("rpc unreachable");
        }
        Ok(self.chain_id)
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            bail!("rpc unreachable");
        }
        let call = MockZkVerifier::zkVerifyCalcCtHashesPackedCall::abi_decode(&data)?;
        if call.values.len() != call.utypes.len() {
            bail!("execution reverted: length mismatch at {to}");
        }
        let ct_hashes: Vec<U256> = call
            .values
            .iter()
            .zip(&call.utypes)
            .map(|(value, utype)| {
                fake_ct_hash(*value, *utype, call.user, call.securityZone, call.chainId)
            })
            .collect();
        Ok(ct_hashes.abi_encode().into())
    }
}

/// `(to, ct_hashes, values)` of one `insertPackedCtHashes` transaction
pub type RecordedInsert = (Address, Vec<U256>, Vec<U256>);

/// Account client that records `insertPackedCtHashes` transactions.
pub struct FakeWalletClient {
    addresses: Vec<Address>,
    fail_addresses: bool,
    fail_send: bool,
    address_calls: AtomicUsize,
    inserts: Mutex<Vec<RecordedInsert>>,
}

impl FakeWalletClient {
    pub fn new(account: Address) -> Self {
        Self::with_addresses(vec![account])
    }

    pub fn with_addresses(addresses: Vec<Address>) -> Self {
        Self {
            addresses,
            fail_addresses: false,
            fail_send: false,
            address_calls: AtomicUsize::new(0),
            inserts: Mutex::new(vec![]),
        }
    }

    /// Address lookups error
    pub fn failing() -> Self {
        Self {
            fail_addresses: true,
            ..Self::with_addresses(vec![])
        }
    }

    /// Transactions error
    pub fn rejecting_transactions(mut self) -> Self {
        self.fail_send = true;
        self
    }

    pub fn address_calls(&self) -> usize {
        self.address_calls.load(Ordering::SeqCst)
    }

    pub fn inserts(&self) -> Vec<RecordedInsert> {
        self.inserts.lock().map(|i| i.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl WalletClient for FakeWalletClient {
    async fn get_addresses(&self) -> Result<Vec<Address>> {
        self.address_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_addresses {
            bail!("wallet locked");
        }
        Ok(self.addresses.clone())
    }

    async fn send_transaction(&self, to: Address, data: Bytes) -> Result<TxHash> {
        if self.fail_send {
            bail!("user rejected the transaction");
        }
        let call = MockZkVerifier::insertPackedCtHashesCall::abi_decode(&data)?;
        let mut inserts = self
            .inserts
            .lock()
            .map_err(|_| anyhow::anyhow!("insert log poisoned"))?;
        inserts.push((to, call.ctHashes, call.values));
        Ok(TxHash::with_last_byte(inserts.len() as u8))
    }
}
