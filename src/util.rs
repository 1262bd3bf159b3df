use std::str::FromStr;

use log::{Level, LevelFilter, Log, Metadata, Record};
use serde::Serialize;
use serde::de::DeserializeOwned;
use wasm_bindgen::JsValue;

pub const LOG_LEVEL_KEY: &str = "lw_log_level";

/// Routes `log` records to the browser console at the matching severity.
struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = JsValue::from_str(&format!("[{}] {}: {}", record.level(), record.target(), record.args()));
        match record.level() {
            Level::Error => web_sys::console::error_1(&line),
            Level::Warn => web_sys::console::warn_1(&line),
            Level::Info => web_sys::console::info_1(&line),
            Level::Debug | Level::Trace => web_sys::console::debug_1(&line),
        }
    }

    fn flush(&self) {}
}

/// Installs the console logger. The stored `lw_log_level` wins over `default`.
pub fn init_logging(default: LevelFilter) -> Result<(), log::SetLoggerError> {
    let level = storage_get(LOG_LEVEL_KEY)
        .and_then(|raw| LevelFilter::from_str(raw.trim()).ok())
        .unwrap_or(default);
    log::set_logger(&LOGGER)?;
    log::set_max_level(level);
    Ok(())
}

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|win| win.local_storage().ok().flatten())
}

pub fn storage_get(key: &str) -> Option<String> {
    local_storage().and_then(|store| store.get_item(key).ok().flatten())
}

pub fn storage_set(key: &str, value: &str) {
    if let Some(store) = local_storage() {
        if store.set_item(key, value).is_err() {
            log::warn!("localStorage write for {key} rejected");
        }
    }
}

/// Reads and decodes a stored JSON value. Missing keys are `None`; corrupt ones
/// are logged and treated as missing.
pub fn load_json<T: DeserializeOwned>(key: &str) -> Option<T> {
    let raw = storage_get(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            log::warn!("ignoring stored {key}: {err}");
            None
        }
    }
}

pub fn save_json<T: Serialize>(key: &str, value: &T) {
    match serde_json::to_string(value) {
        Ok(s) => storage_set(key, &s),
        Err(err) => log::warn!("could not serialize {key}: {err}"),
    }
}

/// Wall-clock milliseconds since the epoch.
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}
