//! Terminal typesetting engine.
//!
//! Converts the symbolic (LaTeX-flavored) markup the service emits into
//! plain text that reads well in a terminal cell grid. The engine is an
//! injected capability: the renderer only sees `is_available`/`typeset`,
//! and treats an unavailable or failing engine as a reason to fall back to
//! raw markup, never as an error to surface.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct TypesetError(pub String);

pub trait Typesetter: Send {
    fn is_available(&self) -> bool;
    fn typeset(&self, markup: &str) -> Result<String, TypesetError>;
}

/// Symbol substitutions the engine needs before it can typeset anything.
struct SymbolTable {
    commands: HashMap<&'static str, &'static str>,
}

impl SymbolTable {
    fn build() -> Self {
        let mut commands = HashMap::new();
        // Greek
        commands.insert("alpha", "α");
        commands.insert("beta", "β");
        commands.insert("gamma", "γ");
        commands.insert("delta", "δ");
        commands.insert("epsilon", "ε");
        commands.insert("lambda", "λ");
        commands.insert("mu", "μ");
        commands.insert("pi", "π");
        commands.insert("sigma", "σ");
        commands.insert("tau", "τ");
        commands.insert("omega", "ω");
        commands.insert("Lambda", "Λ");
        commands.insert("Sigma", "Σ");
        commands.insert("Omega", "Ω");
        // Operators and relations
        commands.insert("cdot", "·");
        commands.insert("times", "×");
        commands.insert("pm", "±");
        commands.insert("approx", "≈");
        commands.insert("neq", "≠");
        commands.insert("leq", "≤");
        commands.insert("geq", "≥");
        commands.insert("to", "→");
        commands.insert("rightarrow", "→");
        commands.insert("infty", "∞");
        commands.insert("partial", "∂");
        commands.insert("int", "∫");
        commands.insert("sum", "Σ");
        commands.insert("prod", "Π");
        commands.insert("sqrt", "√");
        commands.insert("dot", "d/dt ");
        // Spacing
        commands.insert("quad", "  ");
        commands.insert("qquad", "    ");
        commands.insert(",", " ");
        commands.insert(";", " ");
        commands.insert("!", "");
        commands.insert("\\", "\n");
        Self { commands }
    }

    fn lookup(&self, command: &str) -> Option<&'static str> {
        self.commands.get(command).copied()
    }
}

/// The production engine. Construction is cheap; the symbol table is built
/// by `warm_up`, typically off-thread at startup, and the engine reports
/// itself unavailable until that finishes. Clones share the same table.
#[derive(Clone, Default)]
pub struct MathTypesetter {
    table: Arc<OnceLock<SymbolTable>>,
}

impl MathTypesetter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the symbol table. Idempotent.
    pub fn warm_up(&self) {
        let _ = self.table.set(SymbolTable::build());
    }
}

impl Typesetter for MathTypesetter {
    fn is_available(&self) -> bool {
        self.table.get().is_some()
    }

    fn typeset(&self, markup: &str) -> Result<String, TypesetError> {
        let table = self
            .table
            .get()
            .ok_or_else(|| TypesetError("engine not loaded".to_string()))?;
        let stripped = strip_delimiters(markup);
        let text = render_fragment(&stripped, table)?;
        Ok(collapse_spaces(&text))
    }
}

/// Engine stand-in used when typesetting is disabled in config: never
/// available, so every surface degrades to raw markup after the bounded
/// polling window.
pub struct NullTypesetter;

impl Typesetter for NullTypesetter {
    fn is_available(&self) -> bool {
        false
    }

    fn typeset(&self, _markup: &str) -> Result<String, TypesetError> {
        Err(TypesetError("typesetting disabled".to_string()))
    }
}

fn strip_delimiters(markup: &str) -> String {
    let mut s = markup.trim().to_string();
    for delim in ["$$", "\\[", "\\]", "\\(", "\\)"] {
        s = s.replace(delim, " ");
    }
    s.replace('$', " ")
}

/// Read a `{...}` group starting at `chars`' current position (just past the
/// opening brace) and return its raw content.
fn read_group(chars: &mut std::iter::Peekable<std::str::Chars>) -> Result<String, TypesetError> {
    let mut depth = 1usize;
    let mut content = String::new();
    for c in chars.by_ref() {
        match c {
            '{' => {
                depth += 1;
                content.push(c);
            }
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(content);
                }
                content.push(c);
            }
            _ => content.push(c),
        }
    }
    Err(TypesetError("unbalanced braces".to_string()))
}

fn read_command(chars: &mut std::iter::Peekable<std::str::Chars>) -> String {
    let mut name = String::new();
    while let Some(&c) = chars.peek() {
        if c.is_ascii_alphabetic() {
            name.push(c);
            chars.next();
        } else {
            break;
        }
    }
    if name.is_empty() {
        // Single-character command like `\,` or `\\`.
        if let Some(c) = chars.next() {
            name.push(c);
        }
    }
    name
}

/// Argument of `^` or `_`: either a braced group or a single character.
fn read_script_arg(
    chars: &mut std::iter::Peekable<std::str::Chars>,
) -> Result<String, TypesetError> {
    match chars.next() {
        Some('{') => read_group(chars),
        Some(c) => Ok(c.to_string()),
        None => Ok(String::new()),
    }
}

fn superscript(text: &str) -> String {
    let map = |c| match c {
        '0' => '⁰',
        '1' => '¹',
        '2' => '²',
        '3' => '³',
        '4' => '⁴',
        '5' => '⁵',
        '6' => '⁶',
        '7' => '⁷',
        '8' => '⁸',
        '9' => '⁹',
        '-' => '⁻',
        '+' => '⁺',
        other => other,
    };
    if text.chars().all(|c| matches!(c, '0'..='9' | '-' | '+')) {
        text.chars().map(map).collect()
    } else {
        format!("^({})", text)
    }
}

fn subscript(text: &str) -> String {
    let map = |c| match c {
        '0' => '₀',
        '1' => '₁',
        '2' => '₂',
        '3' => '₃',
        '4' => '₄',
        '5' => '₅',
        '6' => '₆',
        '7' => '₇',
        '8' => '₈',
        '9' => '₉',
        other => other,
    };
    if text.chars().all(|c| c.is_ascii_digit()) {
        text.chars().map(map).collect()
    } else {
        format!("_{}", text)
    }
}

fn render_fragment(fragment: &str, table: &SymbolTable) -> Result<String, TypesetError> {
    let mut out = String::new();
    let mut chars = fragment.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                let name = read_command(&mut chars);
                match name.as_str() {
                    "frac" => {
                        let numerator = expect_group(&mut chars)?;
                        let denominator = expect_group(&mut chars)?;
                        let n = render_fragment(&numerator, table)?;
                        let d = render_fragment(&denominator, table)?;
                        let simple = |s: &str| s.len() <= 5 && !s.contains(' ');
                        if simple(&n) && simple(&d) {
                            out.push_str(&format!("{}/{}", n, d));
                        } else {
                            out.push_str(&format!("({})/({})", n, d));
                        }
                    }
                    "text" | "mathrm" | "mathbf" | "operatorname" => {
                        let body = expect_group(&mut chars)?;
                        out.push_str(&render_fragment(&body, table)?);
                    }
                    "begin" | "end" => {
                        // Environment names (aligned, bmatrix, ...) carry no
                        // terminal glyphs; their content flows through as-is.
                        let env = expect_group(&mut chars)?;
                        if name == "begin" && env.contains("matrix") {
                            out.push_str("[ ");
                        } else if name == "end" && env.contains("matrix") {
                            out.push_str(" ]");
                        }
                    }
                    "left" | "right" => {
                        // The following delimiter character renders itself.
                    }
                    _ => {
                        if let Some(glyph) = table.lookup(&name) {
                            out.push_str(glyph);
                        } else {
                            // Unknown command: keep the name, drop the slash.
                            out.push_str(&name);
                        }
                    }
                }
            }
            '^' => {
                let arg = read_script_arg(&mut chars)?;
                out.push_str(&superscript(&render_fragment(&arg, table)?));
            }
            '_' => {
                let arg = read_script_arg(&mut chars)?;
                out.push_str(&subscript(&render_fragment(&arg, table)?));
            }
            '{' => {
                let group = read_group(&mut chars)?;
                out.push_str(&render_fragment(&group, table)?);
            }
            '}' => return Err(TypesetError("unbalanced braces".to_string())),
            '&' => {}
            _ => out.push(c),
        }
    }
    Ok(out)
}

fn expect_group(chars: &mut std::iter::Peekable<std::str::Chars>) -> Result<String, TypesetError> {
    match chars.next() {
        Some('{') => read_group(chars),
        Some(c) => Ok(c.to_string()),
        None => Err(TypesetError("missing argument".to_string())),
    }
}

fn collapse_spaces(text: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    for line in text.lines() {
        let mut collapsed = String::new();
        let mut last_space = false;
        for c in line.trim().chars() {
            if c == ' ' {
                if !last_space {
                    collapsed.push(' ');
                }
                last_space = true;
            } else {
                collapsed.push(c);
                last_space = false;
            }
        }
        lines.push(collapsed);
    }
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    while lines.first().is_some_and(|l| l.is_empty()) {
        lines.remove(0);
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> MathTypesetter {
        let engine = MathTypesetter::new();
        engine.warm_up();
        engine
    }

    #[test]
    fn unavailable_until_warmed_up() {
        let engine = MathTypesetter::new();
        assert!(!engine.is_available());
        assert!(engine.typeset("x").is_err());
        engine.warm_up();
        assert!(engine.is_available());
    }

    #[test]
    fn typesets_derivative_row() {
        let out = engine()
            .typeset("\\frac{dx}{dt} = 1.0x + 1.0y + 1.0z + 1.0w")
            .unwrap();
        assert_eq!(out, "dx/dt = 1.0x + 1.0y + 1.0z + 1.0w");
    }

    #[test]
    fn typesets_symbols_and_scripts() {
        let out = engine().typeset("\\lambda_1 = e^{-2} \\cdot x_0").unwrap();
        assert_eq!(out, "λ₁ = e⁻² · x₀");
    }

    #[test]
    fn aligned_environment_becomes_lines() {
        let out = engine()
            .typeset("$$\\begin{aligned}a &= 1 \\\\ b &= 2\\end{aligned}$$")
            .unwrap();
        assert_eq!(out, "a = 1\nb = 2");
    }

    #[test]
    fn matrix_environment_gets_brackets() {
        let out = engine().typeset("\\begin{bmatrix}1 & 2\\end{bmatrix}").unwrap();
        assert_eq!(out, "[ 1 2 ]");
    }

    #[test]
    fn long_fraction_is_parenthesized() {
        let out = engine().typeset("\\frac{x + y}{z + w}").unwrap();
        assert_eq!(out, "(x + y)/(z + w)");
    }

    #[test]
    fn unbalanced_braces_fail_the_pass() {
        assert!(engine().typeset("\\frac{dx}{dt").is_err());
        assert!(engine().typeset("x}").is_err());
    }

    #[test]
    fn unknown_commands_keep_their_name() {
        let out = engine().typeset("\\det(A) = 0").unwrap();
        assert_eq!(out, "det(A) = 0");
    }

    #[test]
    fn null_engine_is_never_available() {
        assert!(!NullTypesetter.is_available());
        assert!(NullTypesetter.typeset("x").is_err());
    }
}
