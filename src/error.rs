use wasm_bindgen::JsValue;

/// Failures on the frame and mount path. None of these are fatal: the frame is
/// skipped and the loop tries again on the next tick.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("canvas is not attached to the document")]
    CanvasDetached,
    #[error("2d context unavailable")]
    ContextUnavailable,
    #[error("browser call failed: {0}")]
    Js(String),
}

impl From<JsValue> for EngineError {
    fn from(value: JsValue) -> Self {
        EngineError::Js(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}
