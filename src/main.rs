use std::sync::Arc;

use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use eyre::Result;
use log::{error, info};

use crate::domain::request::{
    ApproveWithdrawRequest, CreateRoomRequest, DeleteRoomRequest, JoinRoomRequest, RegisterRequest,
    StartGameRequest, WinnersQuery, WithdrawPayload,
};
use crate::domain::room::Room;
use crate::error::Error;
use crate::repository::rooms::RoomRepository;
use crate::repository::users::UserRepository;
use crate::repository::withdrawals::WithdrawRepository;
use crate::routes::Api;
use crate::service::admin::{AdminPolicy, OwnerPolicy};
use crate::service::game::{GameService, GameTimings};
use crate::service::notify::{LogNotifier, Notifier};
use crate::service::wallet::WalletService;

mod domain;
mod error;
mod repository;
mod routes;
mod service;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    info!("bingo server starting");

    // repositories
    let room_repository = RoomRepository::new();
    let user_repository = UserRepository::new();
    let withdraw_repository = WithdrawRepository::new();

    // default rooms
    room_repository.upsert(Room::new(
        "room1".to_string(),
        "Quick Bingo".to_string(),
        5,
        50,
    ));
    room_repository.upsert(Room::new(
        "room2".to_string(),
        "High Stakes".to_string(),
        20,
        25,
    ));

    let notifier: Arc<dyn Notifier> = Arc::new(LogNotifier);
    let owner_id = std::env::var("BINGO_OWNER_ID").unwrap_or_default();
    if owner_id.is_empty() {
        info!("BINGO_OWNER_ID is not set; administrative commands are disabled");
    }
    let admin_policy: Arc<dyn AdminPolicy> = Arc::new(OwnerPolicy::new(owner_id));

    // services
    let api = Api {
        game_service: GameService::new(
            room_repository,
            user_repository.clone(),
            GameTimings::default(),
        ),
        wallet_service: WalletService {
            user_repository,
            withdraw_repository,
            notifier,
        },
        admin_policy,
    };

    // routes
    let router = Router::new()
        .route("/api/register", post(register))
        .route("/api/user/{user_id}", get(get_user))
        .route("/api/rooms", get(list_rooms).post(create_room))
        .route("/api/room/{room_id}", get(get_room).delete(delete_room))
        .route("/api/join-room", post(join_room))
        .route("/api/start-game", post(start_game))
        .route("/api/game-state/{room_id}", get(game_state))
        .route("/api/withdraw", post(withdraw))
        .route("/api/approve-withdraw", post(approve_withdraw))
        .route("/api/winners", get(top_winners))
        .layer(Extension(api));

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;
    info!("listening on port {port}");
    axum::serve(listener, router).await?;
    Ok(())
}

async fn register(
    Extension(api): Extension<Api>,
    Json(payload): Json<RegisterRequest>,
) -> impl IntoResponse {
    (StatusCode::OK, Json(api.register(payload))).into_response()
}

async fn get_user(
    Extension(api): Extension<Api>,
    Path(user_id): Path<String>,
) -> impl IntoResponse {
    match api.get_user(&user_id) {
        Ok(user) => (StatusCode::OK, Json(user)).into_response(),
        Err(e) => report_into_response(e).into_response(),
    }
}

async fn list_rooms(Extension(api): Extension<Api>) -> impl IntoResponse {
    (StatusCode::OK, Json(api.list_rooms())).into_response()
}

async fn get_room(
    Extension(api): Extension<Api>,
    Path(room_id): Path<String>,
) -> impl IntoResponse {
    match api.get_room(&room_id) {
        Ok(room) => (StatusCode::OK, Json(room)).into_response(),
        Err(e) => report_into_response(e).into_response(),
    }
}

async fn join_room(
    Extension(api): Extension<Api>,
    Json(payload): Json<JoinRoomRequest>,
) -> impl IntoResponse {
    match api.join_room(payload) {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => report_into_response(e).into_response(),
    }
}

async fn start_game(
    Extension(api): Extension<Api>,
    Json(payload): Json<StartGameRequest>,
) -> impl IntoResponse {
    match api.start_game(payload) {
        Ok(room) => (StatusCode::OK, Json(room)).into_response(),
        Err(e) => report_into_response(e).into_response(),
    }
}

async fn game_state(
    Extension(api): Extension<Api>,
    Path(room_id): Path<String>,
) -> impl IntoResponse {
    match api.game_state(&room_id) {
        Ok(state) => (StatusCode::OK, Json(state)).into_response(),
        Err(e) => report_into_response(e).into_response(),
    }
}

async fn withdraw(
    Extension(api): Extension<Api>,
    Json(payload): Json<WithdrawPayload>,
) -> impl IntoResponse {
    match api.withdraw(payload) {
        Ok(()) => (StatusCode::OK, "Withdrawal request submitted").into_response(),
        Err(e) => report_into_response(e).into_response(),
    }
}

async fn approve_withdraw(
    Extension(api): Extension<Api>,
    Json(payload): Json<ApproveWithdrawRequest>,
) -> impl IntoResponse {
    match api.approve_withdraw(payload) {
        Ok(request) => (StatusCode::OK, Json(request)).into_response(),
        Err(e) => report_into_response(e).into_response(),
    }
}

async fn create_room(
    Extension(api): Extension<Api>,
    Json(payload): Json<CreateRoomRequest>,
) -> impl IntoResponse {
    match api.create_room(payload) {
        Ok(room) => (StatusCode::CREATED, Json(room)).into_response(),
        Err(e) => report_into_response(e).into_response(),
    }
}

async fn delete_room(
    Extension(api): Extension<Api>,
    Path(room_id): Path<String>,
    Json(payload): Json<DeleteRoomRequest>,
) -> impl IntoResponse {
    match api.delete_room(&payload.requested_by, &room_id) {
        Ok(()) => StatusCode::OK.into_response(),
        Err(e) => report_into_response(e).into_response(),
    }
}

async fn top_winners(
    Extension(api): Extension<Api>,
    Query(query): Query<WinnersQuery>,
) -> impl IntoResponse {
    (StatusCode::OK, Json(api.top_winners(query.limit))).into_response()
}

fn report_into_response(e: eyre::Report) -> (StatusCode, String) {
    error!("Error occurred: {:?}", e);
    match e.downcast::<Error>() {
        Ok(error) => error.into_response_tuple(),
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "".to_string()),
    }
}
