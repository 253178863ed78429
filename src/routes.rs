use std::sync::Arc;

use eyre::{ensure, Result};

use crate::domain::request::{
    ApproveWithdrawRequest, CreateRoomRequest, GameState, JoinRoomRequest, JoinRoomResponse,
    RegisterRequest, RoomSummary, StartGameRequest, TopWinner, WithdrawPayload,
};
use crate::domain::room::Room;
use crate::domain::user::User;
use crate::domain::withdraw::WithdrawRequest;
use crate::error::Error;
use crate::service::admin::AdminPolicy;
use crate::service::game::GameService;
use crate::service::wallet::WalletService;

const DEFAULT_WINNERS_LIMIT: usize = 10;

#[derive(Clone)]
pub struct Api {
    pub game_service: GameService,
    pub wallet_service: WalletService,
    pub admin_policy: Arc<dyn AdminPolicy>,
}

impl Api {
    pub fn register(&self, request: RegisterRequest) -> User {
        self.game_service
            .register(&request.user_id, &request.username)
    }

    pub fn get_user(&self, user_id: &str) -> Result<User> {
        self.game_service.get_user(user_id)
    }

    pub fn list_rooms(&self) -> Vec<RoomSummary> {
        self.game_service.list_rooms()
    }

    pub fn get_room(&self, room_id: &str) -> Result<Room> {
        self.game_service.get_room(room_id)
    }

    pub fn join_room(&self, request: JoinRoomRequest) -> Result<JoinRoomResponse> {
        self.game_service
            .join_room(&request.user_id, &request.room_id)
    }

    pub fn start_game(&self, request: StartGameRequest) -> Result<Room> {
        self.game_service.start_game(&request.room_id)
    }

    pub fn game_state(&self, room_id: &str) -> Result<GameState> {
        self.game_service.game_state(room_id)
    }

    pub fn withdraw(&self, request: WithdrawPayload) -> Result<()> {
        self.wallet_service
            .request_withdraw(&request.user_id, request.amount, request.chat_id)
    }

    pub fn approve_withdraw(&self, request: ApproveWithdrawRequest) -> Result<WithdrawRequest> {
        self.ensure_admin(&request.requested_by)?;
        self.wallet_service.approve_withdraw(&request.user_id)
    }

    pub fn create_room(&self, request: CreateRoomRequest) -> Result<Room> {
        self.ensure_admin(&request.requested_by)?;
        self.game_service
            .create_room(request.name, request.bet_amount, request.max_players)
    }

    pub fn delete_room(&self, requested_by: &str, room_id: &str) -> Result<()> {
        self.ensure_admin(requested_by)?;
        self.game_service.delete_room(room_id)
    }

    pub fn top_winners(&self, limit: Option<usize>) -> Vec<TopWinner> {
        self.game_service
            .top_winners(limit.unwrap_or(DEFAULT_WINNERS_LIMIT))
    }

    fn ensure_admin(&self, user_id: &str) -> Result<()> {
        ensure!(self.admin_policy.is_admin(user_id), Error::Unauthorized);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::repository::rooms::RoomRepository;
    use crate::repository::users::UserRepository;
    use crate::repository::withdrawals::WithdrawRepository;
    use crate::service::admin::OwnerPolicy;
    use crate::service::game::GameTimings;
    use crate::service::notify::LogNotifier;

    fn test_api() -> Api {
        let room_repository = RoomRepository::new();
        let user_repository = UserRepository::new();
        Api {
            game_service: GameService::new(
                room_repository,
                user_repository.clone(),
                GameTimings::default(),
            ),
            wallet_service: WalletService {
                user_repository,
                withdraw_repository: WithdrawRepository::new(),
                notifier: Arc::new(LogNotifier),
            },
            admin_policy: Arc::new(OwnerPolicy::new("42".to_string())),
        }
    }

    #[test]
    fn admin_commands_reject_non_owners() {
        let api = test_api();
        let err = api
            .create_room(CreateRoomRequest {
                requested_by: "7".to_string(),
                name: "Side Room".to_string(),
                bet_amount: 10,
                max_players: 20,
            })
            .unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::Unauthorized)));
        assert!(api.list_rooms().is_empty());
    }

    #[test]
    fn owner_can_create_and_delete_rooms() -> Result<()> {
        let api = test_api();
        let room = api.create_room(CreateRoomRequest {
            requested_by: "42".to_string(),
            name: "Side Room".to_string(),
            bet_amount: 10,
            max_players: 20,
        })?;
        assert_eq!(api.list_rooms().len(), 1);

        api.delete_room("42", &room.id)?;
        assert!(api.list_rooms().is_empty());

        let err = api.delete_room("42", &room.id).unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::RoomNotFound)));
        Ok(())
    }
}
