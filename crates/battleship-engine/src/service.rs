//! The match engine: players, matches, placement, shots and win
//! detection on top of the [`Repository`].
//!
//! Every operation is synchronous and short. Entity locks are held only
//! for the duration of one operation, and notifications are delivered
//! after they are released.

use battleship_protocol::{Coordinate, MatchId, PlayerId, ShotOutcome};
use rand::Rng;

use crate::repo::Shared;
use crate::{
    Board, BoardId, Cell, EngineConfig, EngineError, MatchInfo, MatchState,
    NoopNotifier, Notifier, Player, Repository, Ship, ShotResult,
    StartingTurn, TurnRule,
};

/// Notifications collected while locks are held, sent once they are not.
type Outbox = Vec<(PlayerId, String)>;

/// Runs matches between players.
///
/// Safe to share between any number of connection tasks: operations on
/// different matches and boards proceed in parallel, operations on the
/// same match or board are serialized by that entity's lock.
pub struct GameService<N: Notifier = NoopNotifier> {
    repo: Repository,
    notifier: N,
    config: EngineConfig,
}

impl Default for GameService<NoopNotifier> {
    fn default() -> Self {
        Self::new(EngineConfig::default(), NoopNotifier)
    }
}

impl<N: Notifier> GameService<N> {
    pub fn new(config: EngineConfig, notifier: N) -> Self {
        Self {
            repo: Repository::new(),
            notifier,
            config,
        }
    }

    // =====================================================================
    // Players
    // =====================================================================

    /// Registers a new player with no board.
    pub fn create_player(&self) -> Player {
        let player = self.repo.create_player();
        tracing::info!(player_id = %player.id, "player created");
        player
    }

    /// Looks a player up.
    ///
    /// # Errors
    /// [`EngineError::PlayerNotFound`] if the id is unknown.
    pub fn player(&self, id: PlayerId) -> Result<Player, EngineError> {
        self.repo
            .player(id)
            .map(|entry| *entry.lock())
            .ok_or(EngineError::PlayerNotFound(id))
    }

    // =====================================================================
    // Matches
    // =====================================================================

    /// Opens a match with `creator` as its first player.
    ///
    /// # Errors
    /// [`EngineError::PlayerNotFound`] if the creator is unknown.
    pub fn create_match(
        &self,
        creator: PlayerId,
    ) -> Result<MatchInfo, EngineError> {
        self.player(creator)?;
        let info = self.repo.create_match(creator).lock().info();

        tracing::info!(match_id = %info.id, %creator, "match created");
        self.notifier.notify(
            creator,
            &format!("Match {} created. Waiting for an opponent.", info.id.0),
        );
        Ok(info)
    }

    /// Adds the second player and starts the match.
    ///
    /// Both players get a board here if they do not have one yet.
    ///
    /// # Errors
    /// - [`EngineError::MatchNotFound`] / [`EngineError::PlayerNotFound`]
    /// - [`EngineError::MatchFull`] if a second player already joined
    /// - [`EngineError::AlreadyInMatch`] if the creator tries to join
    pub fn join_match(
        &self,
        match_id: MatchId,
        player_id: PlayerId,
    ) -> Result<MatchInfo, EngineError> {
        let entry = self
            .repo
            .find_match(match_id)
            .ok_or(EngineError::MatchNotFound(match_id))?;
        let joiner = self
            .repo
            .player(player_id)
            .ok_or(EngineError::PlayerNotFound(player_id))?;

        let mut outbox = Outbox::new();
        let info = {
            let mut game = entry.lock();
            if game.player2.is_some() || !game.state.is_joinable() {
                return Err(EngineError::MatchFull(match_id));
            }
            if game.player1 == player_id {
                return Err(EngineError::AlreadyInMatch(player_id, match_id));
            }
            let creator_id = game.player1;
            let creator = self
                .repo
                .player(creator_id)
                .ok_or(EngineError::PlayerNotFound(creator_id))?;

            self.ensure_board(&joiner);
            self.ensure_board(&creator);

            let first = self.starting_turn(creator_id, player_id);
            game.player2 = Some(player_id);
            game.state = MatchState::InProgress;
            game.turn = Some(first);

            outbox.push((player_id, format!("You joined match {}.", match_id.0)));
            outbox.push((
                creator_id,
                format!("Player {} joined your match {}.", player_id.0, match_id.0),
            ));
            for participant in [creator_id, player_id] {
                outbox.push((
                    participant,
                    format!("Match {} started. Turn: player {}.", match_id.0, first.0),
                ));
            }
            tracing::info!(%match_id, %player_id, turn = %first, "match started");
            game.info()
        };

        self.deliver(outbox);
        Ok(info)
    }

    /// Every match, sorted by id.
    pub fn list_matches(&self) -> Vec<MatchInfo> {
        self.repo
            .matches()
            .iter()
            .map(|entry| entry.lock().info())
            .collect()
    }

    /// A snapshot of one match.
    ///
    /// # Errors
    /// [`EngineError::MatchNotFound`] if the id is unknown.
    pub fn match_info(&self, id: MatchId) -> Result<MatchInfo, EngineError> {
        self.repo
            .find_match(id)
            .map(|entry| entry.lock().info())
            .ok_or(EngineError::MatchNotFound(id))
    }

    // =====================================================================
    // Boards
    // =====================================================================

    /// Places a ship on the player's board.
    ///
    /// # Errors
    /// - [`EngineError::PlayerNotFound`]
    /// - [`EngineError::NoBoard`] before the player has joined a match
    /// - any placement error from [`Board::place_ship`]
    pub fn place_ship(
        &self,
        player_id: PlayerId,
        cells: &[Coordinate],
    ) -> Result<Ship, EngineError> {
        let board = self.board_of(player_id)?;
        let ship = board.lock().place_ship(cells)?;
        tracing::info!(%player_id, ship_id = %ship.id(), size = ship.size(), "ship placed");
        Ok(ship)
    }

    /// The state of one cell on a player's own board.
    ///
    /// # Errors
    /// [`EngineError::PlayerNotFound`], [`EngineError::NoBoard`], or
    /// [`EngineError::OutOfBounds`].
    pub fn board_cell(
        &self,
        player_id: PlayerId,
        at: Coordinate,
    ) -> Result<Cell, EngineError> {
        let board = self.board_of(player_id)?;
        let cell = board.lock().cell(at).copied();
        cell.ok_or(EngineError::OutOfBounds(at))
    }

    // =====================================================================
    // Shots
    // =====================================================================

    /// `attacker` fires at `target` on the opponent's board.
    ///
    /// Checks run in this order: match exists, match in progress,
    /// attacker holds the turn, match has an opponent for the attacker.
    /// Board errors (off the board, already shot) come back unchanged
    /// and leave the turn where it was.
    ///
    /// Both players are told the outcome. If the defender has no floating
    /// ships left the match finishes and the turn is cleared; otherwise
    /// the turn moves according to the configured [`TurnRule`].
    pub fn shoot(
        &self,
        attacker: PlayerId,
        match_id: MatchId,
        target: Coordinate,
    ) -> Result<ShotResult, EngineError> {
        let entry = self
            .repo
            .find_match(match_id)
            .ok_or(EngineError::MatchNotFound(match_id))?;

        let mut outbox = Outbox::new();
        let result = {
            let mut game = entry.lock();
            if !game.state.is_active() {
                return Err(EngineError::MatchNotInProgress(match_id));
            }
            if game.turn != Some(attacker) {
                return Err(EngineError::NotYourTurn);
            }
            let defender = game
                .opponent_of(attacker)
                .ok_or(EngineError::NoOpponent(match_id, attacker))?;

            let board = self.board_of(defender)?;
            let mut board = board.lock();
            let result = board.resolve_shot(target)?;

            let detail = match (result.outcome, result.ship) {
                (ShotOutcome::Sunk, Some(ship)) => {
                    format!("{} (ship {})", result.outcome, ship.0)
                }
                (outcome, _) => outcome.to_string(),
            };
            outbox.push((attacker, format!("You fired at {target}: {detail}")));
            outbox.push((defender, format!("You were fired at {target}: {detail}")));

            tracing::debug!(
                %match_id,
                %attacker,
                %target,
                outcome = %result.outcome,
                "shot resolved"
            );

            if board.all_sunk() {
                game.state = MatchState::Finished;
                game.turn = None;
                outbox.push((
                    attacker,
                    "Victory! You sank all of your opponent's ships.".to_string(),
                ));
                outbox.push((
                    defender,
                    "Defeat. All of your ships have been sunk.".to_string(),
                ));
                tracing::info!(%match_id, winner = %attacker, "match finished");
            } else if self.passes_turn(result.outcome) {
                game.turn = Some(defender);
                outbox.push((defender, "It's your turn.".to_string()));
            } else {
                outbox.push((attacker, "It's your turn again.".to_string()));
            }
            result
        };

        self.deliver(outbox);
        Ok(result)
    }

    // =====================================================================
    // Internals
    // =====================================================================

    /// Returns the player's board, creating it on first use.
    fn ensure_board(&self, player: &Shared<Player>) -> BoardId {
        let mut player = player.lock();
        if let Some(board) = player.board {
            return board;
        }
        let board = self
            .repo
            .create_board(self.config.board_rows, self.config.board_cols);
        player.board = Some(board);
        tracing::debug!(player_id = %player.id, board_id = %board, "board assigned");
        board
    }

    fn board_of(&self, player_id: PlayerId) -> Result<Shared<Board>, EngineError> {
        let board_id = self
            .player(player_id)?
            .board
            .ok_or(EngineError::NoBoard(player_id))?;
        self.repo
            .board(board_id)
            .ok_or(EngineError::NoBoard(player_id))
    }

    fn starting_turn(&self, creator: PlayerId, joiner: PlayerId) -> PlayerId {
        match self.config.starting_turn {
            StartingTurn::Creator => creator,
            StartingTurn::Random => {
                if rand::rng().random_bool(0.5) {
                    creator
                } else {
                    joiner
                }
            }
        }
    }

    fn passes_turn(&self, outcome: ShotOutcome) -> bool {
        match self.config.turn_rule {
            TurnRule::AlternateEveryShot => true,
            TurnRule::KeepTurnOnHit => outcome == ShotOutcome::Water,
        }
    }

    fn deliver(&self, outbox: Outbox) {
        for (player, message) in outbox {
            self.notifier.notify(player, &message);
        }
    }
}
