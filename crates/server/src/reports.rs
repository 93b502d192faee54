use api_types::summary::{Summary, SummaryQuery};
use axum::{Json, extract::State};

use crate::{ApiQuery, ServerError, server::ServerState, views};

pub async fn summary(
    State(state): State<ServerState>,
    ApiQuery(query): ApiQuery<SummaryQuery>,
) -> Result<Json<Summary>, ServerError> {
    let summary = state
        .engine
        .summary(query.start_date, query.end_date)
        .await?;
    Ok(Json(views::summary(summary)))
}
