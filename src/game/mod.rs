//! 游戏核心逻辑模块（棋盘生成、回合状态机等）。

pub mod board;
pub mod rules;
pub mod session;
pub mod state;

pub use board::{Board, BoardError};
pub use rules::{
    MemoryEngine, PendingResolution, PickError, PickOutcome, RoundPhase, ROUND_LENGTH,
    TIME_BETWEEN_ROUNDS_MS,
};
pub use session::GameSession;
pub use state::{
    CardStatus, CardVariant, GameEvent, GameSnapshot, Position, RoundId, CARD_VARIANTS,
};
