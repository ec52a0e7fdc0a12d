use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::board::Board;
use super::rules::{MemoryEngine, RoundPhase};

/// 棋盘上的位置索引。
pub type Position = usize;
/// 回合标识，每次结算或重置后递增。
pub type RoundId = u64;

/// 卡牌种类。每局游戏中每种卡牌恰好出现两次。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CardVariant {
    Pink,
    Green,
    Blue,
    Yellow,
    Red,
    Orange,
    Sky,
    Fuchsia,
}

pub const CARD_VARIANTS: [CardVariant; 8] = [
    CardVariant::Pink,
    CardVariant::Green,
    CardVariant::Blue,
    CardVariant::Yellow,
    CardVariant::Red,
    CardVariant::Orange,
    CardVariant::Sky,
    CardVariant::Fuchsia,
];

impl CardVariant {
    pub fn as_str(self) -> &'static str {
        match self {
            CardVariant::Pink => "pink",
            CardVariant::Green => "green",
            CardVariant::Blue => "blue",
            CardVariant::Yellow => "yellow",
            CardVariant::Red => "red",
            CardVariant::Orange => "orange",
            CardVariant::Sky => "sky",
            CardVariant::Fuchsia => "fuchsia",
        }
    }

    pub fn pair(self) -> [CardVariant; 2] {
        [self, self]
    }
}

impl fmt::Display for CardVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CardVariant {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CARD_VARIANTS
            .iter()
            .copied()
            .find(|variant| variant.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or(())
    }
}

/// 单张卡牌的展示状态。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum CardStatus {
    Hidden,
    PickedCurrentRound,
    CollectedCardVariant,
}

/// 游戏事件流。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum GameEvent {
    CardPicked {
        round_id: RoundId,
        position: Position,
        variant: CardVariant,
    },
    RoundCompleted {
        round_id: RoundId,
        positions: [Position; 2],
        successful: bool,
    },
    RoundResolved {
        round_id: RoundId,
        successful: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        collected: Option<CardVariant>,
        score: i32,
    },
    StaleResolutionDiscarded {
        round_id: RoundId,
        current_round_id: RoundId,
    },
    GameFinished {
        score: i32,
    },
    GameReset {
        round_id: RoundId,
    },
}

/// 提供给前端渲染的只读快照，每次读取时重新计算。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameSnapshot {
    pub score: i32,
    pub round_id: RoundId,
    pub phase: RoundPhase,
    pub board_len: usize,
    pub statuses: Vec<CardStatus>,
    /// 仅包含本回合翻开的卡牌，其余位置不向前端泄露。
    pub revealed: Vec<(Position, CardVariant)>,
    pub current_round: Vec<Position>,
    pub collected: Vec<CardVariant>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_collected: Option<CardVariant>,
    pub is_round_finished: bool,
    pub is_game_finished: bool,
}

impl GameSnapshot {
    pub fn capture(engine: &MemoryEngine, board: &Board) -> Self {
        let statuses = (0..board.len())
            .map(|position| engine.status(board, position))
            .collect();
        let revealed = engine
            .current_round()
            .iter()
            .filter_map(|&position| board.get(position).map(|variant| (position, variant)))
            .collect();

        Self {
            score: engine.score(),
            round_id: engine.round_id(),
            phase: engine.phase(board),
            board_len: board.len(),
            statuses,
            revealed,
            current_round: engine.current_round().to_vec(),
            collected: engine.collected().to_vec(),
            last_collected: engine.last_collected(),
            is_round_finished: engine.is_round_finished(),
            is_game_finished: engine.is_game_finished(board),
        }
    }

    pub fn hidden_count(&self) -> usize {
        self.statuses
            .iter()
            .filter(|status| matches!(status, CardStatus::Hidden))
            .count()
    }
}
