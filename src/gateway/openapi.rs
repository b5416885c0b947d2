//! OpenAPI / Swagger UI Documentation
//!
//! - Swagger UI: `http://localhost:8080/docs`
//! - OpenAPI JSON: `http://localhost:8080/api-docs/openapi.json`

use utoipa::OpenApi;

use crate::gateway::handlers::HealthResponse;
use crate::gateway::types::ChangeBalanceRequest;
use crate::wallet::service::{BalanceView, WalletList, WalletRef};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Wallet API",
        version = "1.0.0",
        description = "Wallet balances with serializable updates and bounded conflict retry.",
        license(
            name = "MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Development"),
    ),
    paths(
        crate::gateway::handlers::health::health_check,
        crate::gateway::handlers::wallet::change_balance,
        crate::gateway::handlers::wallet::get_balance,
        crate::gateway::handlers::wallet::list_wallets,
    ),
    components(
        schemas(
            HealthResponse,
            ChangeBalanceRequest,
            BalanceView,
            WalletList,
            WalletRef,
        )
    ),
    tags(
        (name = "Wallet", description = "Balance queries and changes"),
        (name = "System", description = "Health checks and system info")
    )
)]
pub struct ApiDoc;
