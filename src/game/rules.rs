use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{
    board::Board,
    state::{CardStatus, CardVariant, GameEvent, Position, RoundId},
};

/// 每回合翻开的卡牌数量。
pub const ROUND_LENGTH: usize = 2;
pub const TIME_BETWEEN_ROUNDS_MS: u32 = 2000;

/// 调用方违反约定时返回的错误，前端应将其视为致命错误。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Error)]
#[serde(tag = "type")]
pub enum PickError {
    #[error("card on {position} is already picked")]
    AlreadyPicked { position: Position },
    #[error("too many cards picked, max allowed: {max}")]
    RoundFull { max: usize },
    #[error("position {position} does not exist on board of {len} cards")]
    PositionOutOfBounds { position: Position, len: usize },
    #[error("card variant {variant} is collected")]
    VariantCollected { variant: CardVariant },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum RoundPhase {
    Idle,
    OnePicked,
    Resolving,
    Finished,
}

/// 第二张卡牌翻开时捕获的结算结果，等待延迟结束后执行。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PendingResolution {
    pub round_id: RoundId,
    pub positions: [Position; 2],
    pub variant: CardVariant,
    pub successful: bool,
    pub delay_ms: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PickOutcome {
    pub events: Vec<GameEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending: Option<PendingResolution>,
}

/// 记忆翻牌的回合状态机。棋盘由调用方持有，按引用传入。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MemoryEngine {
    current_round: Vec<Position>,
    collected: Vec<CardVariant>,
    score: i32,
    round_id: RoundId,
    round_delay_ms: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pending: Option<PendingResolution>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    event_log: Vec<GameEvent>,
}

impl Default for MemoryEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self {
            current_round: Vec::with_capacity(ROUND_LENGTH),
            collected: Vec::new(),
            score: 0,
            round_id: 0,
            round_delay_ms: TIME_BETWEEN_ROUNDS_MS,
            pending: None,
            event_log: Vec::new(),
        }
    }

    pub fn with_round_delay_ms(mut self, delay_ms: u32) -> Self {
        self.round_delay_ms = delay_ms;
        self
    }

    fn record_event(&mut self, event: GameEvent, events: &mut Vec<GameEvent>) {
        self.event_log.push(event.clone());
        events.push(event);
    }

    fn ensure_pickable(&self, board: &Board, position: Position) -> Result<CardVariant, PickError> {
        if self.current_round.contains(&position) {
            return Err(PickError::AlreadyPicked { position });
        }
        if self.current_round.len() >= ROUND_LENGTH {
            return Err(PickError::RoundFull { max: ROUND_LENGTH });
        }

        let variant = board.get(position).ok_or(PickError::PositionOutOfBounds {
            position,
            len: board.len(),
        })?;
        if self.collected.contains(&variant) {
            return Err(PickError::VariantCollected { variant });
        }
        Ok(variant)
    }

    pub fn pick(&mut self, board: &Board, position: Position) -> Result<PickOutcome, PickError> {
        let variant = self.ensure_pickable(board, position)?;
        let first = match self.current_round.first() {
            Some(&first) => Some((
                first,
                board.get(first).ok_or(PickError::PositionOutOfBounds {
                    position: first,
                    len: board.len(),
                })?,
            )),
            None => None,
        };

        self.current_round.push(position);

        let mut events = Vec::new();
        self.record_event(
            GameEvent::CardPicked {
                round_id: self.round_id,
                position,
                variant,
            },
            &mut events,
        );

        let Some((first_position, first_variant)) = first else {
            return Ok(PickOutcome {
                events,
                pending: None,
            });
        };

        // 结果在翻开第二张时确定，延迟期间不再重新计算
        let pending = PendingResolution {
            round_id: self.round_id,
            positions: [first_position, position],
            variant,
            successful: first_variant == variant,
            delay_ms: self.round_delay_ms,
        };
        self.pending = Some(pending.clone());
        self.record_event(
            GameEvent::RoundCompleted {
                round_id: pending.round_id,
                positions: pending.positions,
                successful: pending.successful,
            },
            &mut events,
        );

        Ok(PickOutcome {
            events,
            pending: Some(pending),
        })
    }

    /// 执行延迟结算。回合标识不匹配（已重置或已结算）时不改变状态。
    pub fn resolve(&mut self, board: &Board, round_id: RoundId) -> Vec<GameEvent> {
        let mut events = Vec::new();

        let pending = match self.pending.take() {
            Some(pending) if pending.round_id == round_id => pending,
            other => {
                self.pending = other;
                self.record_event(
                    GameEvent::StaleResolutionDiscarded {
                        round_id,
                        current_round_id: self.round_id,
                    },
                    &mut events,
                );
                return events;
            }
        };

        let mut collected = None;
        if pending.successful {
            if !self.collected.contains(&pending.variant) {
                self.collected.push(pending.variant);
            }
            collected = Some(pending.variant);
            self.score += 1;
        } else {
            self.score -= 1;
        }

        self.current_round.clear();
        self.round_id += 1;

        self.record_event(
            GameEvent::RoundResolved {
                round_id: pending.round_id,
                successful: pending.successful,
                collected,
                score: self.score,
            },
            &mut events,
        );

        if pending.successful && self.is_game_finished(board) {
            self.record_event(GameEvent::GameFinished { score: self.score }, &mut events);
        }

        events
    }

    /// 清空回合、已收集卡牌与分数，并作废尚未执行的结算。新棋盘由调用方提供。
    pub fn reset(&mut self) -> Vec<GameEvent> {
        self.current_round.clear();
        self.collected.clear();
        self.score = 0;
        self.pending = None;
        self.round_id += 1;
        self.event_log.clear();

        let mut events = Vec::new();
        self.record_event(
            GameEvent::GameReset {
                round_id: self.round_id,
            },
            &mut events,
        );
        events
    }

    pub fn status(&self, board: &Board, position: Position) -> CardStatus {
        if self.current_round.contains(&position) {
            return CardStatus::PickedCurrentRound;
        }
        match board.get(position) {
            Some(variant) if self.collected.contains(&variant) => CardStatus::CollectedCardVariant,
            _ => CardStatus::Hidden,
        }
    }

    pub fn is_clickable(&self, board: &Board, position: Position) -> bool {
        position < board.len()
            && !self.is_round_finished()
            && matches!(self.status(board, position), CardStatus::Hidden)
    }

    pub fn is_round_finished(&self) -> bool {
        self.current_round.len() == ROUND_LENGTH
    }

    pub fn is_game_finished(&self, board: &Board) -> bool {
        self.collected.len() == board.variant_count()
    }

    pub fn phase(&self, board: &Board) -> RoundPhase {
        if self.is_game_finished(board) {
            return RoundPhase::Finished;
        }
        match self.current_round.len() {
            0 => RoundPhase::Idle,
            1 => RoundPhase::OnePicked,
            _ => RoundPhase::Resolving,
        }
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn round_id(&self) -> RoundId {
        self.round_id
    }

    pub fn round_delay_ms(&self) -> u32 {
        self.round_delay_ms
    }

    pub fn current_round(&self) -> &[Position] {
        &self.current_round
    }

    pub fn collected(&self) -> &[CardVariant] {
        &self.collected
    }

    pub fn last_collected(&self) -> Option<CardVariant> {
        self.collected.last().copied()
    }

    pub fn pending(&self) -> Option<&PendingResolution> {
        self.pending.as_ref()
    }

    pub fn event_log(&self) -> &[GameEvent] {
        &self.event_log
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::CardVariant::{Blue, Green};

    fn test_board() -> Board {
        Board::from_cards(vec![Blue, Green, Green, Blue]).expect("test board should be paired")
    }

    fn play_round(engine: &mut MemoryEngine, board: &Board, a: Position, b: Position) -> Vec<GameEvent> {
        engine.pick(board, a).expect("first pick should succeed");
        let outcome = engine.pick(board, b).expect("second pick should succeed");
        let pending = outcome.pending.expect("second pick should schedule a resolution");
        engine.resolve(board, pending.round_id)
    }

    fn hidden_count(engine: &MemoryEngine, board: &Board) -> usize {
        (0..board.len())
            .filter(|&position| engine.status(board, position) == CardStatus::Hidden)
            .count()
    }

    #[test]
    fn full_game_scenario() {
        let board = test_board();
        let mut engine = MemoryEngine::new();
        assert_eq!(engine.score(), 0);
        assert_eq!(hidden_count(&engine, &board), 4);

        engine.pick(&board, 0).expect("pick blue");
        assert_eq!(engine.status(&board, 0), CardStatus::PickedCurrentRound);
        assert_eq!(hidden_count(&engine, &board), 3);

        let outcome = engine.pick(&board, 1).expect("pick green");
        assert_eq!(hidden_count(&engine, &board), 2);
        assert!(engine.is_round_finished());
        let pending = outcome.pending.expect("round should be pending");
        assert!(!pending.successful);
        assert_eq!(pending.delay_ms, TIME_BETWEEN_ROUNDS_MS);

        engine.resolve(&board, pending.round_id);
        assert_eq!(engine.score(), -1);
        assert_eq!(hidden_count(&engine, &board), 4);

        play_round(&mut engine, &board, 0, 3);
        assert_eq!(engine.score(), 0);
        assert_eq!(engine.status(&board, 0), CardStatus::CollectedCardVariant);
        assert_eq!(engine.status(&board, 3), CardStatus::CollectedCardVariant);
        assert_eq!(hidden_count(&engine, &board), 2);
        assert!(!engine.is_game_finished(&board));

        let events = play_round(&mut engine, &board, 1, 2);
        assert_eq!(engine.score(), 1);
        assert_eq!(hidden_count(&engine, &board), 0);
        assert!(engine.is_game_finished(&board));
        assert_eq!(engine.phase(&board), RoundPhase::Finished);
        assert_eq!(engine.collected(), &[Blue, Green]);
        assert_eq!(engine.last_collected(), Some(Green));
        assert!(events.contains(&GameEvent::GameFinished { score: 1 }));
    }

    #[test]
    fn picking_same_position_twice_is_rejected() {
        let board = test_board();
        let mut engine = MemoryEngine::new();
        engine.pick(&board, 2).expect("first pick should succeed");
        assert_eq!(
            engine.pick(&board, 2),
            Err(PickError::AlreadyPicked { position: 2 })
        );
        assert_eq!(engine.current_round(), &[2]);
    }

    #[test]
    fn picking_while_resolving_is_rejected() {
        let board = test_board();
        let mut engine = MemoryEngine::new();
        engine.pick(&board, 0).expect("first pick");
        engine.pick(&board, 1).expect("second pick");
        assert_eq!(engine.phase(&board), RoundPhase::Resolving);
        assert_eq!(
            engine.pick(&board, 2),
            Err(PickError::RoundFull { max: ROUND_LENGTH })
        );
        assert!(!engine.is_clickable(&board, 2));
    }

    #[test]
    fn picking_outside_board_is_rejected() {
        let board = test_board();
        let mut engine = MemoryEngine::new();
        assert_eq!(
            engine.pick(&board, 4),
            Err(PickError::PositionOutOfBounds { position: 4, len: 4 })
        );
        assert!(engine.current_round().is_empty());
    }

    #[test]
    fn collected_cards_are_inert() {
        let board = test_board();
        let mut engine = MemoryEngine::new();
        play_round(&mut engine, &board, 0, 3);
        assert_eq!(
            engine.pick(&board, 3),
            Err(PickError::VariantCollected { variant: Blue })
        );
        assert!(!engine.is_clickable(&board, 0));
        assert!(engine.is_clickable(&board, 1));
    }

    #[test]
    fn matching_round_collects_variant() {
        let board = test_board();
        let mut engine = MemoryEngine::new();
        let events = play_round(&mut engine, &board, 1, 2);
        assert_eq!(engine.collected(), &[Green]);
        assert_eq!(engine.score(), 1);
        assert!(engine.current_round().is_empty());
        assert!(engine.pending().is_none());
        assert!(matches!(
            events.first(),
            Some(GameEvent::RoundResolved {
                successful: true,
                collected: Some(Green),
                ..
            })
        ));
    }

    #[test]
    fn mismatched_round_only_costs_score() {
        let board = test_board();
        let mut engine = MemoryEngine::new();
        play_round(&mut engine, &board, 3, 2);
        assert!(engine.collected().is_empty());
        assert_eq!(engine.score(), -1);
        assert!(engine.current_round().is_empty());
        assert_eq!(engine.phase(&board), RoundPhase::Idle);
    }

    #[test]
    fn resolution_runs_only_once() {
        let board = test_board();
        let mut engine = MemoryEngine::new();
        engine.pick(&board, 0).expect("first pick");
        let pending = engine
            .pick(&board, 3)
            .expect("second pick")
            .pending
            .expect("pending resolution");

        engine.resolve(&board, pending.round_id);
        let events = engine.resolve(&board, pending.round_id);
        assert_eq!(engine.score(), 1);
        assert!(matches!(
            events.as_slice(),
            [GameEvent::StaleResolutionDiscarded { .. }]
        ));
    }

    #[test]
    fn reset_cancels_pending_resolution() {
        let board = test_board();
        let mut engine = MemoryEngine::new();
        play_round(&mut engine, &board, 0, 1);
        engine.pick(&board, 0).expect("first pick");
        let pending = engine
            .pick(&board, 3)
            .expect("second pick")
            .pending
            .expect("pending resolution");

        engine.reset();
        assert_eq!(engine.score(), 0);
        assert!(engine.collected().is_empty());
        assert!(engine.current_round().is_empty());
        assert!(engine.pending().is_none());

        engine.resolve(&board, pending.round_id);
        assert_eq!(engine.score(), 0);
        assert!(engine.collected().is_empty());
        assert_eq!(hidden_count(&engine, &board), 4);
    }

    #[test]
    fn game_finishes_exactly_when_all_pairs_are_collected() {
        let board = Board::from_cards(vec![Blue, Green, Blue, Green]).expect("paired board");
        let mut engine = MemoryEngine::new();

        play_round(&mut engine, &board, 0, 2);
        assert_eq!(engine.collected().len() * 2 == board.len(), engine.is_game_finished(&board));
        assert!(!engine.is_game_finished(&board));

        play_round(&mut engine, &board, 1, 3);
        assert!(engine.is_game_finished(&board));
        assert_eq!(engine.collected().len() * 2, board.len());
    }

    #[test]
    fn custom_delay_is_carried_by_pending_resolution() {
        let board = test_board();
        let mut engine = MemoryEngine::new().with_round_delay_ms(10);
        engine.pick(&board, 0).expect("first pick");
        let outcome = engine.pick(&board, 1).expect("second pick");
        assert_eq!(outcome.pending.map(|pending| pending.delay_ms), Some(10));
    }
}
