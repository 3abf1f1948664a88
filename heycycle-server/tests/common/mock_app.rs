use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use heycycle_api::models::{Credentials, PortStates};
use heycycle_server::app::create_router;
use heycycle_server::configs::{Database, SchemaManager, Storage};
use heycycle_server::models::{Step, Token, local_now};
use heycycle_server::repositories::PowerStatusRepository;
use heycycle_server::services::{
    CloudClient, ControlExecutor, CredentialCipher, CycleRunner, CycleSequencer, DeviceService,
    StatusService, TokenService, TokenStore, save_steps,
};
use tempfile::TempDir;

pub const DEVICE_ID: &str = "50450710e8db84f198f8";

pub struct MockApp {
    pub router: Router,
    pub repository: PowerStatusRepository,
    pub steps_path: PathBuf,
    _dir: TempDir,
}

impl MockApp {
    /// Control loop against `base_url` with a cached token and a fog-only step file.
    pub async fn new(base_url: &str, step_duration: u64, total_runtime: Duration) -> Self {
        let dir = tempfile::tempdir().unwrap();

        let storage = Storage::new(&Database {
            url: String::from("sqlite::memory:"),
            clean_start: true,
        })
        .unwrap();
        storage.create_schema(&SchemaManager::default()).await.unwrap();
        let repository = PowerStatusRepository::new(Arc::new(storage));

        let store = TokenStore::new(dir.path().join("token.toml"));
        store.save(&cached_token()).await.unwrap();

        let client = Arc::new(CloudClient::new(base_url, Duration::from_secs(5)).unwrap());
        let token_service = TokenService::new(
            client.clone(),
            CredentialCipher::new("0123456789abcdef0123456789abcdef").unwrap(),
            Credentials::password_grant("client", "secret", "user", "pass"),
            store,
        );
        let executor = ControlExecutor::new(
            Arc::new(token_service),
            DeviceService::new(client),
            StatusService::new(repository.clone()),
            DEVICE_ID,
        );

        let steps_path = dir.path().join("steps.csv");
        save_steps(&steps_path, &fog_steps(step_duration)).unwrap();

        let runner = Arc::new(CycleRunner::new(
            CycleSequencer::new(executor, patterns()),
            &steps_path,
            total_runtime,
        ));

        Self {
            router: create_router(runner),
            repository,
            steps_path,
            _dir: dir,
        }
    }
}

pub fn cached_token() -> Token {
    Token {
        access_token: String::from("cached-token"),
        token_type: String::from("bearer"),
        refresh_token: String::from("refresh"),
        expires_in: Some(86400),
        scope: String::from("openapi"),
        issued_at: Some(local_now()),
    }
}

pub fn fog_steps(duration: u64) -> Vec<Step> {
    vec![
        Step::new("Turning ON fog", PortStates::new(true, false, true), duration),
        Step::new("Turning OFF fog", PortStates::new(false, false, true), duration),
    ]
}

pub fn patterns() -> Vec<Vec<String>> {
    [
        ["Turning ON fog", "Turning OFF fog"],
        ["Turning ON plasma", "Turning OFF plasma"],
        ["Turning ON fog and plasma", "Turning OFF fog and plasma"],
    ]
    .iter()
    .map(|pair| pair.iter().map(|s| s.to_string()).collect())
    .collect()
}
