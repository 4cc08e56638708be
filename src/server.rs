use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use log::{error, info};
use serde::Deserialize;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::config::Config;
use crate::data::{
    BlockOccupancy, ConflictReport, DashboardStats, NewSchedule, RoomTypeCount, ScheduleDetail,
    ScheduleId, ScheduleUpdate,
};
use crate::error::SchedulingError;
use crate::materializer::SlotConfig;
use crate::service;
use crate::store::InMemoryStore;

type Rejection = (StatusCode, String);
type ApiResult<T> = Result<Json<T>, Rejection>;

/// Shared handler state. Writers hold the lock exclusively, so allocation runs never
/// overlap; read-only handlers share it.
#[derive(Clone)]
pub struct AppState {
    store: Arc<RwLock<InMemoryStore>>,
    slot: SlotConfig,
}

impl AppState {
    pub fn new(store: InMemoryStore, slot: SlotConfig) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
            slot,
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, InMemoryStore>, Rejection> {
        self.store.read().map_err(|_| poisoned())
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, InMemoryStore>, Rejection> {
        self.store.write().map_err(|_| poisoned())
    }
}

fn poisoned() -> Rejection {
    error!("store lock poisoned");
    (StatusCode::INTERNAL_SERVER_ERROR, "store unavailable".to_string())
}

fn reject(e: SchedulingError) -> Rejection {
    let status = match e {
        SchedulingError::NotFound { .. } => StatusCode::NOT_FOUND,
        SchedulingError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
        SchedulingError::NoActiveRooms | SchedulingError::Store(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, e.to_string())
}

#[derive(Debug, Deserialize)]
struct DecisionParams {
    status: String,
}

async fn list_handler(State(state): State<AppState>) -> ApiResult<Vec<ScheduleDetail>> {
    let store = state.read()?;
    service::list_schedules(&*store).map(Json).map_err(reject)
}

async fn create_handler(
    State(state): State<AppState>,
    Json(input): Json<NewSchedule>,
) -> Result<(StatusCode, Json<ScheduleDetail>), Rejection> {
    let mut store = state.write()?;
    let created = service::create_schedule(&mut *store, input).map_err(reject)?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn auto_generate_handler(State(state): State<AppState>) -> ApiResult<Vec<ScheduleDetail>> {
    let mut store = state.write()?;
    service::run_auto_scheduling(&mut *store, &state.slot)
        .map(Json)
        .map_err(reject)
}

async fn validate_handler(
    State(state): State<AppState>,
    Path(schedule_id): Path<ScheduleId>,
    Query(params): Query<DecisionParams>,
) -> ApiResult<ScheduleDetail> {
    let mut store = state.write()?;
    service::validate_schedule(&mut *store, schedule_id, &params.status)
        .map(Json)
        .map_err(reject)
}

async fn update_handler(
    State(state): State<AppState>,
    Path(schedule_id): Path<ScheduleId>,
    Json(update): Json<ScheduleUpdate>,
) -> ApiResult<ScheduleDetail> {
    let mut store = state.write()?;
    service::update_schedule(&mut *store, schedule_id, update)
        .map(Json)
        .map_err(reject)
}

async fn delete_handler(
    State(state): State<AppState>,
    Path(schedule_id): Path<ScheduleId>,
) -> Result<StatusCode, Rejection> {
    let mut store = state.write()?;
    service::delete_schedule(&mut *store, schedule_id).map_err(reject)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn conflicts_handler(State(state): State<AppState>) -> ApiResult<Vec<ConflictReport>> {
    let store = state.read()?;
    service::capacity_conflicts(&*store).map(Json).map_err(reject)
}

async fn stats_handler(State(state): State<AppState>) -> ApiResult<DashboardStats> {
    let store = state.read()?;
    service::dashboard_stats(&*store).map(Json).map_err(reject)
}

async fn occupancy_handler(State(state): State<AppState>) -> ApiResult<Vec<BlockOccupancy>> {
    let store = state.read()?;
    service::occupancy_by_block(&*store).map(Json).map_err(reject)
}

async fn distribution_handler(State(state): State<AppState>) -> ApiResult<Vec<RoomTypeCount>> {
    let store = state.read()?;
    service::room_distribution(&*store).map(Json).map_err(reject)
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/v1/schedules", get(list_handler).post(create_handler))
        .route("/v1/schedules/auto-generate", post(auto_generate_handler))
        .route("/v1/schedules/:id/validate", post(validate_handler))
        .route("/v1/schedules/:id", put(update_handler).delete(delete_handler))
        .route("/v1/dashboard/conflicts", get(conflicts_handler))
        .route("/v1/dashboard/stats", get(stats_handler))
        .route("/v1/dashboard/occupancy", get(occupancy_handler))
        .route("/v1/dashboard/room-distribution", get(distribution_handler))
        .with_state(state)
}

pub async fn run_server(config: &Config, store: InMemoryStore) -> anyhow::Result<()> {
    let app = router(AppState::new(store, config.slot.clone()));

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    info!("Server running at http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
