use cosmwasm_schema::cw_serde;
use cosmwasm_std::{to_json_binary, Addr, CosmosMsg, Env, HexBinary, StdResult, WasmMsg};
use sha2::{Digest, Sha256};

use crate::error::ContractError;

// bytes of randomness consumed per seed
pub const RANDOMNESS_BYTES: usize = 16;

/// Message understood by the randomness oracle. The oracle answers asynchronously by executing
/// `ExecuteMsg::ReceiveRandomness` on the requesting contract with the same `job_id`.
#[cw_serde]
pub enum OracleExecuteMsg {
    RequestRandomness { job_id: String },
}

pub fn job_id(batch: u64) -> String {
    format!("reveal-batch-{}", batch)
}

pub fn request_randomness_msg(oracle: &Addr, job_id: String) -> StdResult<CosmosMsg> {
    Ok(WasmMsg::Execute {
        contract_addr: oracle.to_string(),
        msg: to_json_binary(&OracleExecuteMsg::RequestRandomness { job_id })?,
        funds: vec![],
    }
    .into())
}

/// Randomness derived from block metadata. Anyone who can see or influence the block can
/// predict it, so this source only deters casual front-running.
pub fn block_randomness(env: &Env, batch: u64) -> u128 {
    let mut hasher = Sha256::new();
    hasher.update(env.block.chain_id.as_bytes());
    hasher.update(env.block.height.to_be_bytes());
    hasher.update(env.block.time.nanos().to_be_bytes());
    if let Some(tx) = &env.transaction {
        hasher.update(tx.index.to_be_bytes());
    }
    hasher.update(env.contract.address.as_bytes());
    hasher.update(batch.to_be_bytes());

    let digest = hasher.finalize();
    let mut bytes = [0u8; RANDOMNESS_BYTES];
    bytes.copy_from_slice(&digest[..RANDOMNESS_BYTES]);
    u128::from_be_bytes(bytes)
}

/// Reads the randomness delivered by the oracle.
///
/// # Errors
/// Returns `InvalidRandomness` if fewer than `RANDOMNESS_BYTES` bytes were delivered.
pub fn oracle_randomness(randomness: &HexBinary) -> Result<u128, ContractError> {
    let bytes: [u8; RANDOMNESS_BYTES] = randomness
        .get(..RANDOMNESS_BYTES)
        .and_then(|slice| slice.try_into().ok())
        .ok_or(ContractError::InvalidRandomness {
            min_bytes: RANDOMNESS_BYTES,
        })?;

    Ok(u128::from_be_bytes(bytes))
}
