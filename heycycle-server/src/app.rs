use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::configs::{SchemaManager, Settings, Storage};
use crate::handles::*;
use crate::repositories::PowerStatusRepository;
use crate::services::{
    CloudClient, ControlExecutor, CycleRunner, CycleSequencer, DeviceService, StatusService,
    StepExecutor, TokenService, TokenStore,
};

/// Services shared by the control surface and the command line.
#[derive(Clone)]
pub struct AppContext {
    pub client: Arc<CloudClient>,
    pub token_service: Arc<TokenService>,
    pub device_service: DeviceService,
    pub status_service: StatusService,
}

impl AppContext {
    pub async fn new(settings: &Settings) -> anyhow::Result<Self> {
        let storage = Arc::new(Storage::new(&settings.database)?);
        storage.create_schema(&SchemaManager::default()).await?;

        let client = Arc::new(CloudClient::new(
            &settings.cloud.base_url,
            settings.cloud.timeout(),
        )?);
        let token_service = Arc::new(TokenService::from_settings(
            client.clone(),
            &settings.cloud,
            TokenStore::new(&settings.token.path),
        )?);

        Ok(Self {
            device_service: DeviceService::new(client.clone()),
            status_service: StatusService::new(PowerStatusRepository::new(storage)),
            client,
            token_service,
        })
    }

    pub fn executor(&self, device_id: &str) -> ControlExecutor {
        ControlExecutor::new(
            self.token_service.clone(),
            self.device_service.clone(),
            self.status_service.clone(),
            device_id,
        )
    }

    pub fn sequencer(&self, settings: &Settings) -> CycleSequencer<ControlExecutor> {
        CycleSequencer::new(
            self.executor(&settings.cloud.device_id),
            settings.cycle.patterns.clone(),
        )
    }

    pub fn runner(&self, settings: &Settings) -> CycleRunner<ControlExecutor> {
        CycleRunner::new(
            self.sequencer(settings),
            &settings.cycle.steps_path,
            settings.cycle.total_runtime(),
        )
    }
}

pub async fn create_app(settings: &Arc<Settings>) -> anyhow::Result<Router> {
    let context = AppContext::new(settings).await?;

    Ok(create_router(Arc::new(context.runner(settings))))
}

pub fn create_router<E: StepExecutor + 'static>(runner: Arc<CycleRunner<E>>) -> Router {
    let cycle = Router::new()
        .route("/", get(get_cycle_status::<E>))
        .route("/start", post(start_cycle::<E>))
        .route("/stop", post(stop_cycle::<E>))
        .with_state(CycleState { runner });

    Router::new()
        .merge(cycle)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
