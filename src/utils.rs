use std::fmt::Display;

use serde::Serialize;
use serde_wasm_bindgen::to_value;
use wasm_bindgen::JsValue;

use crate::game::GameEvent;

/// 将错误序列化为 JS 对象；序列化失败时退回为错误消息字符串。
pub fn to_js_error<E: Serialize + Display>(error: &E) -> JsValue {
    to_value(error).unwrap_or_else(|_| JsValue::from_str(&error.to_string()))
}

#[cfg(target_arch = "wasm32")]
pub fn log_events(events: &[GameEvent]) {
    for event in events {
        match serde_json::to_string(event) {
            Ok(json) => web_sys::console::log_1(&json.into()),
            Err(error) => web_sys::console::error_1(&error.to_string().into()),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn log_events(_events: &[GameEvent]) {}

#[cfg(target_arch = "wasm32")]
pub fn log_error<E: Display>(error: &E) {
    web_sys::console::error_1(&error.to_string().into());
}

#[cfg(not(target_arch = "wasm32"))]
pub fn log_error<E: Display>(_error: &E) {}

#[cfg(feature = "console_error_panic_hook")]
pub fn set_panic_hook() {
    console_error_panic_hook::set_once();
}

#[cfg(not(feature = "console_error_panic_hook"))]
pub fn set_panic_hook() {}
