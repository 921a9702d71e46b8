use std::env::current_dir;
use std::fs::create_dir_all;

use cosmwasm_schema::{export_schema, remove_schemas, schema_for};

use launchpad::msg::{ExecuteMsg, InstantiateMsg};
use launchpad::query::{
    ConfigResponse, CurrentPhaseResponse, CurrentPriceResponse, HasNextRevealResponse,
    MetadataIndexResponse, PendingQueueResponse, PricesResponse, QueryMsg, RegistrySupplyResponse,
    RevealStatusResponse, SaleStatsResponse, ScheduleResponse, UserInfoResponse,
};

fn main() {
    let mut out_dir = current_dir().unwrap();
    out_dir.push("schema");
    create_dir_all(&out_dir).unwrap();
    remove_schemas(&out_dir).unwrap();

    export_schema(&schema_for!(InstantiateMsg), &out_dir);
    export_schema(&schema_for!(ExecuteMsg), &out_dir);
    export_schema(&schema_for!(QueryMsg), &out_dir);

    export_schema(&schema_for!(ConfigResponse), &out_dir);
    export_schema(&schema_for!(ScheduleResponse), &out_dir);
    export_schema(&schema_for!(CurrentPhaseResponse), &out_dir);
    export_schema(&schema_for!(CurrentPriceResponse), &out_dir);
    export_schema(&schema_for!(PricesResponse), &out_dir);
    export_schema(&schema_for!(UserInfoResponse), &out_dir);
    export_schema(&schema_for!(PendingQueueResponse), &out_dir);
    export_schema(&schema_for!(SaleStatsResponse), &out_dir);
    export_schema(&schema_for!(RegistrySupplyResponse), &out_dir);
    export_schema(&schema_for!(RevealStatusResponse), &out_dir);
    export_schema(&schema_for!(HasNextRevealResponse), &out_dir);
    export_schema(&schema_for!(MetadataIndexResponse), &out_dir);
}
