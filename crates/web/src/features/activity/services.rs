use sqlx::PgPool;
use storage::{
    dto::activity::{CreateRedeployRequest, CreateReviveRequest, RedeployResponse, ReviveResponse},
    error::Result,
    repository::activity::ActivityRepository,
};

/// Log a redeploy; the redeployed player's counter goes up by one
pub async fn record_redeploy(
    pool: &PgPool,
    request: &CreateRedeployRequest,
) -> Result<RedeployResponse> {
    let repo = ActivityRepository::new(pool);
    repo.record_redeploy(request).await
}

/// Log a revive; the reviver's counter goes up by one
pub async fn record_revive(pool: &PgPool, request: &CreateReviveRequest) -> Result<ReviveResponse> {
    let repo = ActivityRepository::new(pool);
    repo.record_revive(request).await
}
