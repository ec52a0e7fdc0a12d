use rand::rngs::SmallRng;
use rand::SeedableRng;

use super::{
    board::Board,
    rules::{MemoryEngine, PickError, PickOutcome},
    state::{CardVariant, GameEvent, GameSnapshot, Position, RoundId},
};
use crate::config::GameConfig;

/// 持有棋盘与状态机的一局游戏；重置时负责重新生成棋盘。
#[derive(Debug, Clone)]
pub struct GameSession {
    /// 重置时用于重新洗牌的卡牌种类。
    variants: Vec<CardVariant>,
    board: Board,
    engine: MemoryEngine,
    rng: SmallRng,
}

impl GameSession {
    pub fn new(config: GameConfig) -> Self {
        Self::with_rng(config, SmallRng::from_entropy())
    }

    pub fn with_seed(config: GameConfig, seed: u64) -> Self {
        Self::with_rng(config, SmallRng::seed_from_u64(seed))
    }

    fn with_rng(config: GameConfig, mut rng: SmallRng) -> Self {
        let variants = config.board_size.variants().to_vec();
        let board = Board::generate(&variants, &mut rng);
        let engine = MemoryEngine::new().with_round_delay_ms(config.round_delay_ms);
        Self {
            variants,
            board,
            engine,
            rng,
        }
    }

    pub fn with_board(config: GameConfig, board: Board) -> Self {
        let engine = MemoryEngine::new().with_round_delay_ms(config.round_delay_ms);
        Self {
            variants: board.variants(),
            board,
            engine,
            rng: SmallRng::from_entropy(),
        }
    }

    pub fn pick(&mut self, position: Position) -> Result<PickOutcome, PickError> {
        self.engine.pick(&self.board, position)
    }

    pub fn resolve(&mut self, round_id: RoundId) -> Vec<GameEvent> {
        self.engine.resolve(&self.board, round_id)
    }

    pub fn reset(&mut self) -> Vec<GameEvent> {
        let events = self.engine.reset();
        self.board = Board::generate(&self.variants, &mut self.rng);
        events
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot::capture(&self.engine, &self.board)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn engine(&self) -> &MemoryEngine {
        &self.engine
    }

    pub fn events(&self) -> &[GameEvent] {
        self.engine.event_log()
    }
}
