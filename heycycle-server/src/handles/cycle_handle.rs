use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use heycycle_api::restful::{Status, StatusResponse};

use crate::errors::CycleError;
use crate::services::{CycleRunner, StepExecutor};

pub struct CycleState<E> {
    pub runner: Arc<CycleRunner<E>>,
}

impl<E> Clone for CycleState<E> {
    fn clone(&self) -> Self {
        Self {
            runner: self.runner.clone(),
        }
    }
}

pub async fn get_cycle_status<E: StepExecutor + 'static>(
    State(state): State<CycleState<E>>,
) -> Json<StatusResponse> {
    let response = match state.runner.status().await {
        Status::Running => StatusResponse::new(Status::Running, "Cycle is running."),
        _ => StatusResponse::new(Status::Idle, "Cycle is idle."),
    };

    Json(response)
}

pub async fn start_cycle<E: StepExecutor + 'static>(
    State(state): State<CycleState<E>>,
) -> Result<Json<StatusResponse>, CycleError> {
    state.runner.start().await?;

    Ok(Json(StatusResponse::success("Cycle started.")))
}

pub async fn stop_cycle<E: StepExecutor + 'static>(
    State(state): State<CycleState<E>>,
) -> Result<Json<StatusResponse>, CycleError> {
    state.runner.stop().await?;

    Ok(Json(StatusResponse::success("Cycle stopped.")))
}
