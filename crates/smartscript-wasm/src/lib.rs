//! WASM bindings for SmartScript.
//!
//! Exposes parsing, source reconstruction and tokenizing to JavaScript via
//! wasm-bindgen. Errors are thrown as JS errors carrying the diagnostic.

use wasm_bindgen::prelude::*;

/// Parse a template and return its reconstructed source.
///
/// Throws a JS error if the template does not parse.
#[wasm_bindgen]
pub fn render(source: &str) -> Result<String, JsError> {
    native_render(source).map_err(|e| JsError::new(&e))
}

/// Check a template for errors. Throws the first error found.
#[wasm_bindgen]
pub fn check(source: &str) -> Result<(), JsError> {
    native_render(source)
        .map(|_| ())
        .map_err(|e| JsError::new(&e))
}

/// Tokenize a template.
///
/// Returns a JS array of strings like `"1:3 TAG_NAME FOR"`.
#[wasm_bindgen]
pub fn tokens(source: &str) -> Result<js_sys::Array, JsError> {
    let lines = native_tokens(source).map_err(|e| JsError::new(&e))?;
    Ok(lines.into_iter().map(JsValue::from).collect())
}

/// Get the library version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn native_render(source: &str) -> Result<String, String> {
    let doc = smartscript_parser::Parser::parse(source).map_err(|e| e.to_string())?;
    smartscript_codegen::render(&doc).map_err(|e| e.to_string())
}

fn native_tokens(source: &str) -> Result<Vec<String>, String> {
    let tokens = smartscript_lexer::Scanner::tokenize(source).map_err(|e| e.to_string())?;
    Ok(tokens
        .into_iter()
        .map(|t| format!("{}:{} {}", t.span.line, t.span.column, t.kind))
        .collect())
}
