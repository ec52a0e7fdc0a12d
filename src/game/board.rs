use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::state::{CardVariant, Position, CARD_VARIANTS};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Error)]
#[serde(tag = "type")]
pub enum BoardError {
    #[error("board has no cards")]
    Empty,
    #[error("card variant {variant} appears {count} times, expected 2")]
    UnpairedVariant { variant: CardVariant, count: usize },
    #[error("unknown card variant {name:?}")]
    UnknownVariant { name: String },
    #[error("variant count {count} is out of range 1..={max}")]
    InvalidVariantCount { count: usize, max: usize },
}

/// 一局游戏的牌面序列，创建后不可变。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "Vec<CardVariant>", into = "Vec<CardVariant>")]
pub struct Board {
    cards: Vec<CardVariant>,
}

impl Board {
    /// 将每种卡牌复制一份后洗牌。
    pub fn generate<R: Rng + ?Sized>(variants: &[CardVariant], rng: &mut R) -> Self {
        let mut cards: Vec<CardVariant> = variants
            .iter()
            .flat_map(|variant| variant.pair())
            .collect();
        cards.shuffle(rng);
        Self { cards }
    }

    pub fn shuffled() -> Self {
        let mut rng = SmallRng::from_entropy();
        Self::generate(&CARD_VARIANTS, &mut rng)
    }

    /// 使用前 `count` 种卡牌生成棋盘。
    pub fn with_variant_count<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Result<Self, BoardError> {
        if count == 0 || count > CARD_VARIANTS.len() {
            return Err(BoardError::InvalidVariantCount {
                count,
                max: CARD_VARIANTS.len(),
            });
        }
        Ok(Self::generate(&CARD_VARIANTS[..count], rng))
    }

    /// 按卡牌名称构建棋盘，名称不区分大小写。
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self, BoardError> {
        let cards = names
            .iter()
            .map(|name| {
                name.as_ref()
                    .parse::<CardVariant>()
                    .map_err(|_| BoardError::UnknownVariant {
                        name: name.as_ref().to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_cards(cards)
    }

    pub fn from_cards(cards: Vec<CardVariant>) -> Result<Self, BoardError> {
        if cards.is_empty() {
            return Err(BoardError::Empty);
        }

        for variant in CARD_VARIANTS {
            let count = cards.iter().filter(|card| **card == variant).count();
            if count != 0 && count != 2 {
                return Err(BoardError::UnpairedVariant { variant, count });
            }
        }

        Ok(Self { cards })
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn get(&self, position: Position) -> Option<CardVariant> {
        self.cards.get(position).copied()
    }

    pub fn cards(&self) -> &[CardVariant] {
        &self.cards
    }

    /// 棋盘上不同卡牌种类的数量。
    pub fn variant_count(&self) -> usize {
        self.cards.len() / 2
    }

    /// 按首次出现顺序列出棋盘上的卡牌种类。
    pub fn variants(&self) -> Vec<CardVariant> {
        let mut seen = Vec::with_capacity(self.variant_count());
        for card in &self.cards {
            if !seen.contains(card) {
                seen.push(*card);
            }
        }
        seen
    }
}

impl TryFrom<Vec<CardVariant>> for Board {
    type Error = BoardError;

    fn try_from(cards: Vec<CardVariant>) -> Result<Self, Self::Error> {
        Self::from_cards(cards)
    }
}

impl From<Board> for Vec<CardVariant> {
    fn from(board: Board) -> Self {
        board.cards
    }
}
