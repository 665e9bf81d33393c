//! In-memory stand-in for a Rooch node running the `did` module

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use ahash::AHashMap as HashMap;
use async_trait::async_trait;
use nuwa_crypto::{KeyType, provider_for};
use nuwa_did_common::{RoochAddress, VerificationRelationship, did_key_public_key};
use nuwa_key_manager::ChainSigner;
use sha3::{Digest, Sha3_256};
use tokio::sync::Mutex;

use super::{
    client::{ExecutionStatus, FunctionCall, RoochClient, TransactionEvent, TransactionOutcome},
    entry,
    types::{
        AccountCap, DIDCreatedEvent, MoveDID, MoveDIDDocument, MoveService, MoveServiceID,
        MoveVerificationMethod, MoveVerificationMethodID, ObjectID, SimpleMap,
        did_document_object_id,
    },
};
use crate::errors::{Result, VDRError};

pub(crate) struct MockRoochClient {
    module: RoochAddress,
    objects: Mutex<HashMap<ObjectID, MoveDIDDocument>>,
    abort_next: AtomicBool,
    sequence: AtomicU64,
}

fn arg<T: for<'de> serde::Deserialize<'de>>(call: &FunctionCall, index: usize) -> Result<T> {
    let bytes = call
        .args
        .get(index)
        .ok_or_else(|| VDRError::Rpc(format!("{} missing argument {index}", call.function)))?;
    Ok(bcs::from_bytes(bytes)?)
}

fn abort(call: &FunctionCall, abort_code: u64) -> ExecutionStatus {
    ExecutionStatus::MoveAbort {
        location: call.function_id(),
        abort_code,
    }
}

fn new_record(
    did: &MoveDID,
    address: RoochAddress,
    key_type: KeyType,
    public_key_multibase: String,
) -> MoveDIDDocument {
    let fragment = "account-key".to_string();
    let mut verification_methods = SimpleMap::default();
    verification_methods.insert(
        fragment.clone(),
        MoveVerificationMethod {
            id: MoveVerificationMethodID {
                did: did.clone(),
                fragment: fragment.clone(),
            },
            type_: key_type.verification_method_type().to_string(),
            controller: did.clone(),
            public_key_multibase,
        },
    );
    let mut record = MoveDIDDocument {
        id: did.clone(),
        controller: vec![did.clone()],
        verification_methods,
        authentication: vec![],
        assertion_method: vec![],
        capability_invocation: vec![],
        capability_delegation: vec![],
        key_agreement: vec![],
        services: SimpleMap::default(),
        also_known_as: vec![],
        account_cap: AccountCap { addr: address },
    };
    for relationship in VerificationRelationship::ALL {
        record.relationship_mut(relationship).push(fragment.clone());
    }
    record
}

impl MockRoochClient {
    pub(crate) fn new(module: RoochAddress) -> Self {
        MockRoochClient {
            module,
            objects: Mutex::new(HashMap::new()),
            abort_next: AtomicBool::new(false),
            sequence: AtomicU64::new(0),
        }
    }

    /// Makes the next transaction abort
    pub(crate) fn abort_next(&self) {
        self.abort_next.store(true, Ordering::SeqCst);
    }

    fn object_id(&self, address: &RoochAddress) -> Result<ObjectID> {
        Ok(did_document_object_id(&address.to_bech32()?, &self.module)?)
    }

    async fn create(
        &self,
        address: RoochAddress,
        key_type: KeyType,
        public_key_multibase: String,
        creation_method: &str,
    ) -> Result<(ExecutionStatus, Vec<TransactionEvent>, Option<MoveDIDDocument>)> {
        let object_id = self.object_id(&address)?;
        let mut objects = self.objects.lock().await;
        if objects.contains_key(&object_id) {
            return Ok((ExecutionStatus::Failed("DID exists".into()), vec![], None));
        }

        let did = MoveDID::rooch(address.to_bech32()?);
        let record = new_record(&did, address, key_type, public_key_multibase);
        let event = DIDCreatedEvent {
            did: did.clone(),
            object_id: object_id.clone(),
            controller: vec![did],
            creator_address: address,
            creation_method: creation_method.to_string(),
        };
        objects.insert(object_id, record.clone());

        let events = vec![TransactionEvent {
            event_type: "0x3::did::DIDCreatedEvent".to_string(),
            data: bcs::to_bytes(&event)?,
        }];
        Ok((ExecutionStatus::Executed, events, Some(record)))
    }

    async fn apply(
        &self,
        call: &FunctionCall,
        sender: RoochAddress,
    ) -> Result<(ExecutionStatus, Vec<TransactionEvent>)> {
        match call.function.as_str() {
            entry::CREATE_DID_FOR_SELF => {
                let multibase: String = arg(call, 0)?;
                let (key_type, _) = nuwa_crypto::KeyMultibaseCodec::decode_with_type(&multibase)?;
                let (status, events, _) = self.create(sender, key_type, multibase, "self").await?;
                return Ok((status, events));
            }
            entry::CREATE_DID_VIA_CADOP => {
                let user_did_key: String = arg(call, 0)?;
                let custodian_key: String = arg(call, 1)?;
                let custodian_vm_type: String = arg(call, 2)?;
                let (key_type, public_key) = did_key_public_key(&user_did_key)?;

                let address = RoochAddress(Sha3_256::digest(user_did_key.as_bytes()).into());
                let multibase =
                    nuwa_crypto::KeyMultibaseCodec::encode_with_type(&public_key, key_type);
                let (status, events, record) =
                    self.create(address, key_type, multibase, "cadop").await?;

                if let Some(mut record) = record {
                    let fragment = "custodian-service-key".to_string();
                    record.verification_methods.insert(
                        fragment.clone(),
                        MoveVerificationMethod {
                            id: MoveVerificationMethodID {
                                did: record.id.clone(),
                                fragment: fragment.clone(),
                            },
                            type_: custodian_vm_type,
                            controller: record.id.clone(),
                            public_key_multibase: custodian_key,
                        },
                    );
                    record.capability_invocation.push(fragment);
                    self.objects
                        .lock()
                        .await
                        .insert(self.object_id(&address)?, record);
                }
                return Ok((status, events));
            }
            _ => {}
        }

        let object_id = self.object_id(&sender)?;
        let mut objects = self.objects.lock().await;
        let Some(record) = objects.get_mut(&object_id) else {
            return Ok((abort(call, 404), vec![]));
        };

        let status = match call.function.as_str() {
            entry::ADD_VERIFICATION_METHOD => {
                let fragment: String = arg(call, 0)?;
                if record.verification_methods.contains_key(&fragment) {
                    return Ok((abort(call, 1), vec![]));
                }
                let codes: Vec<u8> = arg(call, 3)?;
                record.verification_methods.insert(
                    fragment.clone(),
                    MoveVerificationMethod {
                        id: MoveVerificationMethodID {
                            did: record.id.clone(),
                            fragment: fragment.clone(),
                        },
                        type_: arg(call, 1)?,
                        controller: record.id.clone(),
                        public_key_multibase: arg(call, 2)?,
                    },
                );
                for code in codes {
                    if let Some(relationship) = VerificationRelationship::from_code(code) {
                        record.relationship_mut(relationship).push(fragment.clone());
                    }
                }
                ExecutionStatus::Executed
            }
            entry::REMOVE_VERIFICATION_METHOD => {
                let fragment: String = arg(call, 0)?;
                record.verification_methods.remove(&fragment);
                for relationship in VerificationRelationship::ALL {
                    record.relationship_mut(relationship).retain(|f| *f != fragment);
                }
                ExecutionStatus::Executed
            }
            entry::ADD_SERVICE | entry::ADD_SERVICE_WITH_PROPERTIES => {
                let fragment: String = arg(call, 0)?;
                let mut properties = SimpleMap::default();
                if call.function == entry::ADD_SERVICE_WITH_PROPERTIES {
                    let keys: Vec<String> = arg(call, 3)?;
                    let values: Vec<String> = arg(call, 4)?;
                    for (key, value) in keys.into_iter().zip(values) {
                        properties.insert(key, value);
                    }
                }
                record.services.insert(
                    fragment.clone(),
                    MoveService {
                        id: MoveServiceID {
                            did: record.id.clone(),
                            fragment,
                        },
                        type_: arg(call, 1)?,
                        service_endpoint: arg(call, 2)?,
                        properties,
                    },
                );
                ExecutionStatus::Executed
            }
            entry::REMOVE_SERVICE => {
                let fragment: String = arg(call, 0)?;
                record.services.remove(&fragment);
                ExecutionStatus::Executed
            }
            entry::ADD_TO_RELATIONSHIP | entry::REMOVE_FROM_RELATIONSHIP => {
                let fragment: String = arg(call, 0)?;
                let code: u8 = arg(call, 1)?;
                let Some(relationship) = VerificationRelationship::from_code(code) else {
                    return Ok((abort(call, 2), vec![]));
                };
                let list = record.relationship_mut(relationship);
                if call.function == entry::ADD_TO_RELATIONSHIP {
                    list.push(fragment);
                } else {
                    list.retain(|f| *f != fragment);
                }
                ExecutionStatus::Executed
            }
            entry::UPDATE_CONTROLLER => {
                let controllers: Vec<String> = arg(call, 0)?;
                record.controller = controllers
                    .iter()
                    .filter_map(|c| c.strip_prefix("did:rooch:"))
                    .map(MoveDID::rooch)
                    .collect();
                ExecutionStatus::Executed
            }
            other => ExecutionStatus::Failed(format!("unknown function {other}")),
        };
        Ok((status, vec![]))
    }
}

#[async_trait]
impl RoochClient for MockRoochClient {
    async fn execute_view_function(&self, call: FunctionCall) -> Result<Vec<Vec<u8>>> {
        if call.function != entry::EXISTS_DID_FOR_ADDRESS {
            return Err(VDRError::Rpc(format!("unknown view function {}", call.function)));
        }
        let address: RoochAddress = arg(&call, 0)?;
        let exists = self
            .objects
            .lock()
            .await
            .contains_key(&self.object_id(&address)?);
        Ok(vec![bcs::to_bytes(&exists)?])
    }

    async fn get_object_state(&self, object_id: &ObjectID) -> Result<Option<Vec<u8>>> {
        match self.objects.lock().await.get(object_id) {
            Some(record) => Ok(Some(bcs::to_bytes(record)?)),
            None => Ok(None),
        }
    }

    async fn sign_and_execute(
        &self,
        call: FunctionCall,
        signer: &dyn ChainSigner,
    ) -> Result<TransactionOutcome> {
        let payload = bcs::to_bytes(&call)?;
        let signature = signer.sign(&payload).await?;
        if !provider_for(signer.key_type()).verify(&payload, &signature, signer.public_key()) {
            return Err(VDRError::Rpc("invalid transaction signature".to_string()));
        }

        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst);
        let digest = hex::encode(Sha3_256::digest(&payload));
        let tx_hash = format!("0x{digest}{sequence:02x}");

        let (status, events) = if self.abort_next.swap(false, Ordering::SeqCst) {
            (abort(&call, 999), vec![])
        } else {
            self.apply(&call, signer.address()).await?
        };
        Ok(TransactionOutcome {
            tx_hash,
            status,
            events,
        })
    }
}
