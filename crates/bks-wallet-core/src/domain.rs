use std::collections::BTreeMap;

use alloy::primitives::{address, Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::state_machine::ConnectionState;

/// Wallet session as seen by a mounted screen. Lives only as long as the bridge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub connected_address: Option<Address>,
    /// Chain id exactly as the provider reports it, e.g. `"0x89"`.
    pub chain_id: Option<String>,
    /// Native balance of `connected_address`, formatted in ether.
    pub balance: Option<String>,
}

impl Session {
    pub fn state(&self) -> ConnectionState {
        if self.connected_address.is_some() {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        }
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }
}

/// Payload of the most recently completed provider request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestResult {
    TransactionHash(B256),
    Signature(Bytes),
    ChainAdded(Value),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RpcMethod {
    #[serde(rename = "eth_requestAccounts")]
    RequestAccounts,
    #[serde(rename = "eth_chainId")]
    ChainId,
    #[serde(rename = "eth_getBalance")]
    GetBalance,
    #[serde(rename = "eth_signTypedData_v4")]
    SignTypedDataV4,
    #[serde(rename = "eth_sendTransaction")]
    SendTransaction,
    #[serde(rename = "wallet_addEthereumChain")]
    AddEthereumChain,
}

impl RpcMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RequestAccounts => "eth_requestAccounts",
            Self::ChainId => "eth_chainId",
            Self::GetBalance => "eth_getBalance",
            Self::SignTypedDataV4 => "eth_signTypedData_v4",
            Self::SendTransaction => "eth_sendTransaction",
            Self::AddEthereumChain => "wallet_addEthereumChain",
        }
    }
}

impl std::fmt::Display for RpcMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Native transfer submitted through `eth_sendTransaction`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    pub to: Address,
    pub value: U256,
}

impl TransactionParams {
    /// 0.0001 ether to the zero address.
    pub const DEFAULT_VALUE_WEI: u64 = 0x5AF3_107A_4000;

    pub fn native_transfer(to: Address, value: U256) -> Self {
        Self {
            from: None,
            to,
            value,
        }
    }

    pub fn with_from(mut self, from: Address) -> Self {
        self.from = Some(from);
        self
    }
}

impl Default for TransactionParams {
    fn default() -> Self {
        Self::native_transfer(Address::ZERO, U256::from(Self::DEFAULT_VALUE_WEI))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub symbol: String,
    pub decimals: u8,
}

/// Network description passed to `wallet_addEthereumChain`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainSpec {
    pub chain_id: String,
    pub chain_name: String,
    pub block_explorer_urls: Vec<String>,
    pub native_currency: NativeCurrency,
    pub rpc_urls: Vec<String>,
}

impl ChainSpec {
    pub fn polygon() -> Self {
        Self {
            chain_id: "0x89".to_owned(),
            chain_name: "Polygon".to_owned(),
            block_explorer_urls: vec!["https://polygonscan.com".to_owned()],
            native_currency: NativeCurrency {
                name: None,
                symbol: "MATIC".to_owned(),
                decimals: 18,
            },
            rpc_urls: vec!["https://polygon-rpc.com/".to_owned()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedField {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl TypedField {
    fn new(name: &str, kind: &str) -> Self {
        Self {
            name: name.to_owned(),
            kind: kind.to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypedDataDomain {
    pub chain_id: u64,
    pub name: String,
    pub verifying_contract: Address,
    pub version: String,
}

/// EIP-712 document sent as the second `eth_signTypedData_v4` parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypedDataPayload {
    pub domain: TypedDataDomain,
    pub message: Value,
    pub primary_type: String,
    pub types: BTreeMap<String, Vec<TypedField>>,
}

impl TypedDataPayload {
    /// The fixed "Ether Mail" demo document offered by the hero screen.
    pub fn ether_mail(chain_id: u64) -> Self {
        let mut types = BTreeMap::new();
        types.insert(
            "EIP712Domain".to_owned(),
            vec![
                TypedField::new("name", "string"),
                TypedField::new("version", "string"),
                TypedField::new("chainId", "uint256"),
                TypedField::new("verifyingContract", "address"),
            ],
        );
        types.insert(
            "Group".to_owned(),
            vec![
                TypedField::new("name", "string"),
                TypedField::new("members", "Person[]"),
            ],
        );
        types.insert(
            "Mail".to_owned(),
            vec![
                TypedField::new("from", "Person"),
                TypedField::new("to", "Person[]"),
                TypedField::new("contents", "string"),
            ],
        );
        types.insert(
            "Person".to_owned(),
            vec![
                TypedField::new("name", "string"),
                TypedField::new("wallets", "address[]"),
            ],
        );

        Self {
            domain: TypedDataDomain {
                chain_id,
                name: "Ether Mail".to_owned(),
                verifying_contract: address!("CcCCccccCCCCcCCCCCCcCcCccCcCCCcCcccccccC"),
                version: "1".to_owned(),
            },
            message: serde_json::json!({
                "contents": "Hello, Bob!",
                "attachedMoneyInEth": 4.2,
                "from": {
                    "name": "Cow",
                    "wallets": [
                        "0xCD2a3d9F938E13CD947Ec05AbC7FE734Df8DD826",
                        "0xDeaDbeefdEAdbeefdEadbEEFdeadbeEFdEaDbeeF"
                    ]
                },
                "to": [{
                    "name": "Bob",
                    "wallets": [
                        "0xbBbBBBBbbBBBbbbBbbBbbbbBBbBbbbbBbBbbBBbB",
                        "0xB0BdaBea57B0BDABeA57b0bdABEA57b0BDabEa57",
                        "0xB0B0b0b0b0b0B000000000000000000000000000"
                    ]
                }]
            }),
            primary_type: "Mail".to_owned(),
            types,
        }
    }
}
