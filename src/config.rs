//! 游戏配置：回合间隔与棋盘大小。

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::game::{CardVariant, CARD_VARIANTS, TIME_BETWEEN_ROUNDS_MS};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Error)]
#[serde(tag = "type")]
pub enum ConfigError {
    #[error("failed to parse game config: {message}")]
    Parse { message: String },
}

/// 棋盘大小，对应四列网格的行数。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BoardSize {
    Small,
    Medium,
    #[default]
    Standard,
}

impl FromStr for BoardSize {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "small" => Ok(BoardSize::Small),
            "medium" => Ok(BoardSize::Medium),
            "standard" | "large" => Ok(BoardSize::Standard),
            _ => Err(()),
        }
    }
}

impl BoardSize {
    pub fn variant_count(self) -> usize {
        match self {
            BoardSize::Small => 4,
            BoardSize::Medium => 6,
            BoardSize::Standard => CARD_VARIANTS.len(),
        }
    }

    pub fn variants(self) -> &'static [CardVariant] {
        &CARD_VARIANTS[..self.variant_count().min(CARD_VARIANTS.len())]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GameConfig {
    pub round_delay_ms: u32,
    pub board_size: BoardSize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            round_delay_ms: TIME_BETWEEN_ROUNDS_MS,
            board_size: BoardSize::default(),
        }
    }
}

impl GameConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|error| ConfigError::Parse {
            message: error.to_string(),
        })
    }

    pub fn with_round_delay_ms(mut self, delay_ms: u32) -> Self {
        self.round_delay_ms = delay_ms;
        self
    }

    pub fn with_board_size(mut self, board_size: BoardSize) -> Self {
        self.board_size = board_size;
        self
    }
}
