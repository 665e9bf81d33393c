//! Boundary to a Rooch node
//!
//! The RPC transport is not part of this crate. Anything able to run view
//! functions, read object state and submit signed transactions can back a
//! [RoochVDR](super::RoochVDR).

use std::fmt;

use async_trait::async_trait;
use nuwa_did_common::RoochAddress;
use nuwa_key_manager::ChainSigner;
use serde::{Deserialize, Serialize};

use super::types::ObjectID;
use crate::errors::{Result, VDRError};

/// A Move function call with BCS encoded arguments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub module_address: RoochAddress,
    pub module: String,
    pub function: String,
    pub args: Vec<Vec<u8>>,
}

impl FunctionCall {
    pub fn new(module_address: RoochAddress, module: &str, function: &str) -> Self {
        FunctionCall {
            module_address,
            module: module.to_string(),
            function: function.to_string(),
            args: Vec::new(),
        }
    }

    /// Appends a BCS encoded argument
    pub fn arg<T: Serialize>(mut self, value: &T) -> Result<Self> {
        self.args.push(bcs::to_bytes(value)?);
        Ok(self)
    }

    /// `0x3::did::add_service_entry` style function id
    pub fn function_id(&self) -> String {
        let address = hex::encode(self.module_address.as_bytes());
        let address = address.trim_start_matches('0');
        let address = if address.is_empty() { "0" } else { address };
        format!("0x{address}::{}::{}", self.module, self.function)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionStatus {
    Executed,
    MoveAbort { location: String, abort_code: u64 },
    OutOfGas,
    Failed(String),
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionStatus::Executed => f.write_str("executed"),
            ExecutionStatus::MoveAbort {
                location,
                abort_code,
            } => write!(f, "aborted in {location} with code {abort_code}"),
            ExecutionStatus::OutOfGas => f.write_str("out of gas"),
            ExecutionStatus::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionEvent {
    /// Full Move type of the event, `0x3::did::DIDCreatedEvent`
    pub event_type: String,
    /// BCS encoded event payload
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionOutcome {
    pub tx_hash: String,
    pub status: ExecutionStatus,
    pub events: Vec<TransactionEvent>,
}

impl TransactionOutcome {
    pub fn is_executed(&self) -> bool {
        self.status == ExecutionStatus::Executed
    }

    /// Decodes the first event whose type ends with `type_suffix`
    pub fn find_event<T: for<'de> Deserialize<'de>>(&self, type_suffix: &str) -> Result<Option<T>> {
        self.events
            .iter()
            .find(|event| event.event_type.ends_with(type_suffix))
            .map(|event| bcs::from_bytes(&event.data).map_err(VDRError::from))
            .transpose()
    }
}

#[async_trait]
pub trait RoochClient: Send + Sync {
    /// Runs a read-only function and returns its BCS encoded return values
    async fn execute_view_function(&self, call: FunctionCall) -> Result<Vec<Vec<u8>>>;

    /// BCS encoded value of an object, `None` if the object doesn't exist
    async fn get_object_state(&self, object_id: &ObjectID) -> Result<Option<Vec<u8>>>;

    /// Signs the call as `signer`, submits it and waits for execution
    async fn sign_and_execute(
        &self,
        call: FunctionCall,
        signer: &dyn ChainSigner,
    ) -> Result<TransactionOutcome>;
}
