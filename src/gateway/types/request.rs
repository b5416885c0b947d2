use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::wallet::ChangeBalance;

/// Body of `POST /api/v1/wallet`
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangeBalanceRequest {
    /// Older clients send the misspelled `valletId`
    #[serde(alias = "valletId")]
    pub wallet_id: Uuid,
    #[schema(example = 1000)]
    pub amount: i64,
    /// `DEPOSIT` or `WITHDRAW`
    #[schema(example = "DEPOSIT")]
    pub operation_type: String,
}

impl From<ChangeBalanceRequest> for ChangeBalance {
    fn from(req: ChangeBalanceRequest) -> Self {
        ChangeBalance {
            wallet_id: req.wallet_id,
            amount: req.amount,
            operation: req.operation_type,
        }
    }
}
