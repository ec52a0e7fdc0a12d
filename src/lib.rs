pub mod config;
pub mod game;
pub mod utils;

use std::cell::RefCell;
use std::rc::Rc;
use std::str::FromStr;

use gloo_timers::future::TimeoutFuture;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;
use web_sys::js_sys::Promise;

pub use config::{BoardSize, ConfigError, GameConfig};
pub use game::{
    Board, BoardError, CardStatus, CardVariant, GameEvent, GameSession, GameSnapshot,
    MemoryEngine, PendingResolution, PickError, PickOutcome, Position, RoundId, RoundPhase,
    CARD_VARIANTS, ROUND_LENGTH, TIME_BETWEEN_ROUNDS_MS,
};
use utils::{log_error, log_events, to_js_error};

#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn start() {
    utils::set_panic_hook();
}

fn parse_config(config_json: Option<String>) -> Result<GameConfig, JsValue> {
    match config_json {
        Some(json) => GameConfig::from_json(&json).map_err(|error| to_js_error(&error)),
        None => Ok(GameConfig::default()),
    }
}

fn parse_board_size(value: &str) -> Result<BoardSize, JsValue> {
    BoardSize::from_str(value).map_err(|_| {
        to_js_error(&ConfigError::Parse {
            message: format!("unknown board size {value:?}"),
        })
    })
}

/// 浏览器端的一局记忆翻牌游戏。
#[wasm_bindgen]
pub struct MemoryGame {
    session: Rc<RefCell<GameSession>>,
}

#[wasm_bindgen]
impl MemoryGame {
    /// `boardSize` 可覆盖配置中的棋盘大小（small / medium / standard）。
    #[wasm_bindgen(constructor)]
    pub fn new(
        config_json: Option<String>,
        board_size: Option<String>,
    ) -> Result<MemoryGame, JsValue> {
        let mut config = parse_config(config_json)?;
        if let Some(size) = board_size.as_deref() {
            config = config.with_board_size(parse_board_size(size)?);
        }
        Ok(Self::from_session(GameSession::new(config)))
    }

    /// 使用固定牌面创建游戏，`cards` 为卡牌名称数组。
    #[wasm_bindgen(js_name = "withBoard")]
    pub fn with_board(cards: JsValue, config_json: Option<String>) -> Result<MemoryGame, JsValue> {
        let config = parse_config(config_json)?;
        let names: Vec<String> = from_value(cards).map_err(JsValue::from)?;
        let board = Board::from_names(&names).map_err(|error| to_js_error(&error))?;
        Ok(Self::from_session(GameSession::with_board(config, board)))
    }

    /// 翻开一张卡牌。违反约定时直接抛出异常；返回的 Promise
    /// 在回合结算完成后（或第一张牌时立即）给出最新快照。
    pub fn pick(&self, position: usize) -> Result<Promise, JsValue> {
        let outcome = self.session.borrow_mut().pick(position).map_err(|error| {
            log_error(&error);
            to_js_error(&error)
        })?;
        log_events(&outcome.events);

        let session = Rc::clone(&self.session);
        Ok(future_to_promise(async move {
            if let Some(pending) = outcome.pending {
                TimeoutFuture::new(pending.delay_ms).await;
                let events = session.borrow_mut().resolve(pending.round_id);
                log_events(&events);
            }
            let snapshot = session.borrow().snapshot();
            to_value(&snapshot).map_err(JsValue::from)
        }))
    }

    /// 重置分数与已收集卡牌，作废待结算回合并重新洗牌。
    pub fn reset(&self) -> Result<JsValue, JsValue> {
        let events = self.session.borrow_mut().reset();
        log_events(&events);
        self.snapshot()
    }

    /// 返回当前状态快照（JS 对象）。
    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        to_value(&self.session.borrow().snapshot()).map_err(JsValue::from)
    }

    /// 返回当前状态快照（JSON 字符串）。
    pub fn snapshot_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.session.borrow().snapshot())
            .map_err(|error| JsValue::from_str(&error.to_string()))
    }

    /// 返回自上次重置以来的事件流（JSON 字符串）。
    #[wasm_bindgen(js_name = "eventsJson")]
    pub fn events_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.session.borrow().events())
            .map_err(|error| JsValue::from_str(&error.to_string()))
    }

    /// 返回当前棋盘的卡牌名称数组。
    pub fn board(&self) -> Result<JsValue, JsValue> {
        to_value(self.session.borrow().board().cards()).map_err(JsValue::from)
    }

    /// 当前分数。
    pub fn score(&self) -> i32 {
        self.session.borrow().engine().score()
    }

    /// 本回合是否已翻开两张卡牌（包括等待结算期间）。
    #[wasm_bindgen(js_name = "isRoundFinished")]
    pub fn is_round_finished(&self) -> bool {
        self.session.borrow().engine().is_round_finished()
    }

    /// 是否已收集全部卡牌种类。
    #[wasm_bindgen(js_name = "isGameFinished")]
    pub fn is_game_finished(&self) -> bool {
        let session = self.session.borrow();
        session.engine().is_game_finished(session.board())
    }
}

impl MemoryGame {
    fn from_session(session: GameSession) -> Self {
        Self {
            session: Rc::new(RefCell::new(session)),
        }
    }
}

/// 生成一副洗好的牌，`variantCount` 缺省时使用全部卡牌种类，超出范围时抛出错误。
#[wasm_bindgen(js_name = "generateBoard")]
pub fn generate_board(variant_count: Option<usize>) -> Result<JsValue, JsValue> {
    let count = variant_count.unwrap_or(CARD_VARIANTS.len());
    let mut rng = SmallRng::from_entropy();
    let board = Board::with_variant_count(count, &mut rng).map_err(|error| to_js_error(&error))?;
    to_value(board.cards()).map_err(JsValue::from)
}

/// 按棋盘大小名称（small / medium / standard）生成一副洗好的牌。
#[wasm_bindgen(js_name = "generateBoardOfSize")]
pub fn generate_board_of_size(board_size: &str) -> Result<JsValue, JsValue> {
    let size = parse_board_size(board_size)?;
    generate_board(Some(size.variant_count()))
}

/// 返回全部卡牌种类名称。
#[wasm_bindgen(js_name = "cardVariants")]
pub fn card_variants() -> Result<JsValue, JsValue> {
    to_value(&CARD_VARIANTS).map_err(JsValue::from)
}
