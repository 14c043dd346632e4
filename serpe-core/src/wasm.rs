//! WASM bindings for serpe-core
//!
//! Provides JavaScript-accessible sessions, quantization and token
//! classification for editor highlighting.

#[cfg(feature = "wasm")]
use wasm_bindgen::prelude::*;

#[cfg(feature = "wasm")]
use crate::config::EngineConfig;
#[cfg(feature = "wasm")]
use crate::engine::Session;
#[cfg(feature = "wasm")]
use crate::parser::UpiError;
use crate::parser::lexer::{Lexer, SpannedToken, Token};

/// A highlight span for syntax highlighting in an editor
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HighlightSpan {
    /// Character offset of the token
    pub start: usize,
    pub end: usize,
    pub token_type: String,
    pub text: String,
}

impl HighlightSpan {
    pub fn from_spanned_token(token: &SpannedToken) -> Self {
        HighlightSpan {
            start: token.span.offset,
            end: token.span.end(),
            token_type: Self::classify_token(&token.token).to_string(),
            text: token.token.to_string(),
        }
    }

    fn classify_token(token: &Token) -> &'static str {
        match token {
            Token::Ident(name) if name.chars().count() == 1 => "function.generator",
            Token::Ident(name) if matches!(name.to_ascii_lowercase().as_str(), "rev" | "inv" | "comp") => {
                "keyword.operator"
            }
            Token::Ident(_) => "constant.preset",
            Token::Digits(_) => "constant.numeric",
            Token::Codec(..) => "constant.codec",
            Token::Morse(_) => "constant.morse",
            Token::Plus | Token::Minus | Token::Tilde => "operator",
            Token::Star | Token::Greater | Token::Semicolon | Token::At | Token::Percent => {
                "operator.progressive"
            }
            Token::Pipe => "keyword.scene",
            Token::LeftParen
            | Token::RightParen
            | Token::LeftBrace
            | Token::RightBrace
            | Token::LeftBracket
            | Token::RightBracket
            | Token::Comma
            | Token::Colon => "punctuation",
            Token::Eof => "",
        }
    }
}

/// Tokenize input and return highlight spans
pub fn tokenize_for_highlighting(input: &str) -> Vec<HighlightSpan> {
    // Handle tokenization errors gracefully
    let tokens = match Lexer::new(input).tokenize() {
        Ok(t) => t,
        Err(_) => return Vec::new(),
    };

    tokens
        .iter()
        .filter(|t| !matches!(t.token, Token::Eof))
        .map(HighlightSpan::from_spanned_token)
        .collect()
}

// ============================================================================
// WASM Bindings
// ============================================================================

#[cfg(feature = "wasm")]
#[wasm_bindgen]
pub fn tokenize(input: &str) -> JsValue {
    let spans = tokenize_for_highlighting(input);
    serde_wasm_bindgen::to_value(&spans).unwrap_or(JsValue::NULL)
}

#[cfg(feature = "wasm")]
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ErrorJS {
    pub message: String,
    pub start: usize,
    pub end: usize,
}

#[cfg(feature = "wasm")]
impl From<UpiError> for ErrorJS {
    fn from(e: UpiError) -> Self {
        ErrorJS {
            start: e.span.offset,
            end: e.span.end(),
            message: e.to_string(),
        }
    }
}

/// A notation session owned by the JavaScript side
#[cfg(feature = "wasm")]
#[wasm_bindgen]
pub struct WasmSession {
    inner: Session,
    // Called with (text, result) after every trigger
    trigger_listener: Option<js_sys::Function>,
}

#[cfg(feature = "wasm")]
#[wasm_bindgen]
impl WasmSession {
    /// `config` may be `undefined` or a partial `EngineConfig` object
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> WasmSession {
        let config: EngineConfig = if config.is_undefined() || config.is_null() {
            EngineConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config).unwrap_or_default()
        };
        WasmSession {
            inner: Session::new(config),
            trigger_listener: None,
        }
    }

    /// Set a JavaScript function to be called after every trigger.
    /// It receives the notation text and the trigger result object, so a host
    /// can redraw without polling.
    #[wasm_bindgen(js_name = setTriggerListener)]
    pub fn set_trigger_listener(&mut self, callback: js_sys::Function) {
        self.trigger_listener = Some(callback);
    }

    #[wasm_bindgen(js_name = clearTriggerListener)]
    pub fn clear_trigger_listener(&mut self) {
        self.trigger_listener = None;
    }

    /// Returns a `ParseResult` object
    pub fn parse(&mut self, text: &str) -> JsValue {
        let result = self.inner.parse(text);
        serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL)
    }

    /// Returns `{ success, pattern, error }`. Throws whatever the trigger
    /// listener throws.
    pub fn trigger(&mut self, text: &str) -> Result<JsValue, JsValue> {
        let result = match self.inner.trigger(text) {
            Ok(pattern) => TriggerResult {
                success: true,
                pattern: Some(pattern.to_string()),
                error: None,
            },
            Err(e) => TriggerResult {
                success: false,
                pattern: None,
                error: Some(e.into()),
            },
        };
        let value = serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL);
        if let Some(listener) = &self.trigger_listener {
            listener.call2(&JsValue::NULL, &JsValue::from_str(text), &value)?;
        }
        Ok(value)
    }

    pub fn reset(&mut self, text: &str) -> bool {
        self.inner.reset(text)
    }

    #[wasm_bindgen(js_name = resetAll)]
    pub fn reset_all(&mut self) {
        self.inner.reset_all()
    }
}

#[cfg(feature = "wasm")]
#[derive(serde::Serialize, serde::Deserialize)]
struct TriggerResult {
    success: bool,
    pattern: Option<String>,
    error: Option<ErrorJS>,
}

/// Quantize a binary pattern string. Returns a `QuantizationResult` object,
/// or `{ error }` for bad input.
#[cfg(feature = "wasm")]
#[wasm_bindgen]
pub fn quantize(pattern: &str, steps: usize, clockwise: bool) -> JsValue {
    #[derive(serde::Serialize)]
    struct QuantizeFailure {
        error: String,
    }

    let outcome = pattern
        .parse::<crate::types::Pattern>()
        .map_err(|e| e.to_string())
        .and_then(|p| crate::engine::quantize(&p, steps, clockwise).map_err(|e| e.to_string()));
    match outcome {
        Ok(result) => serde_wasm_bindgen::to_value(&result),
        Err(error) => serde_wasm_bindgen::to_value(&QuantizeFailure { error }),
    }
    .unwrap_or(JsValue::NULL)
}
