use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{to_json_binary, Addr, CosmosMsg, Deps, StdResult, WasmMsg};

/// Execute messages of the collectible registry used by the launchpad.
#[cw_serde]
pub enum RegistryExecuteMsg {
    /// Mints `quantity` new items with sequential ids to `owner`. Either all items are minted or
    /// the whole transaction fails.
    Mint { owner: String, quantity: u64 },
}

#[cw_serde]
#[derive(QueryResponses)]
pub enum RegistryQueryMsg {
    #[returns(NumTokensResponse)]
    NumTokens {},
}

#[cw_serde]
pub struct NumTokensResponse {
    pub count: u64,
}

pub fn mint_msg(collection: &Addr, owner: &Addr, quantity: u64) -> StdResult<CosmosMsg> {
    Ok(WasmMsg::Execute {
        contract_addr: collection.to_string(),
        msg: to_json_binary(&RegistryExecuteMsg::Mint {
            owner: owner.to_string(),
            quantity,
        })?,
        funds: vec![],
    }
    .into())
}

pub fn query_num_tokens(deps: Deps, collection: &Addr) -> StdResult<u64> {
    let response: NumTokensResponse =
        deps.querier
            .query_wasm_smart(collection, &RegistryQueryMsg::NumTokens {})?;
    Ok(response.count)
}
