// SPDX-License-Identifier: Apache-2.0

//! Plain-text helpers for exercise HTML.

use std::sync::LazyLock;

use regex::Regex;

static BLOCK_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<\s*/?\s*(?:p|br|li|div|tr|td|th|ul|ol|table|h[1-6])\b[^>]*>")
        .expect("block tag pattern is valid")
});

static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("tag pattern is valid"));

static ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[xX][0-9a-fA-F]+|#[0-9]+|[a-zA-Z]+);").expect("entity pattern is valid")
});

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

fn named_entity(name: &str) -> Option<char> {
    let c = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => ' ',
        "ndash" => '–',
        "mdash" => '—',
        "hellip" => '…',
        "laquo" => '«',
        "raquo" => '»',
        "ordm" => 'º',
        "ordf" => 'ª',
        "deg" => '°',
        "aacute" => 'á',
        "Aacute" => 'Á',
        "agrave" => 'à',
        "Agrave" => 'À',
        "acirc" => 'â',
        "Acirc" => 'Â',
        "atilde" => 'ã',
        "Atilde" => 'Ã',
        "eacute" => 'é',
        "Eacute" => 'É',
        "ecirc" => 'ê',
        "Ecirc" => 'Ê',
        "iacute" => 'í',
        "Iacute" => 'Í',
        "oacute" => 'ó',
        "Oacute" => 'Ó',
        "ocirc" => 'ô',
        "Ocirc" => 'Ô',
        "otilde" => 'õ',
        "Otilde" => 'Õ',
        "uacute" => 'ú',
        "Uacute" => 'Ú',
        "uuml" => 'ü',
        "ccedil" => 'ç',
        "Ccedil" => 'Ç',
        _ => return None,
    };
    Some(c)
}

fn decode_entity(body: &str) -> Option<char> {
    if let Some(hex) = body.strip_prefix("#x").or_else(|| body.strip_prefix("#X")) {
        return u32::from_str_radix(hex, 16).ok().and_then(char::from_u32);
    }
    if let Some(dec) = body.strip_prefix('#') {
        return dec.parse().ok().and_then(char::from_u32);
    }
    named_entity(body)
}

/// Whether `c` is an invisible or non-breaking character to flatten.
fn is_invisible_space(c: char) -> bool {
    matches!(
        c,
        '\u{200b}' | '\u{200e}' | '\u{200f}' | '\u{202f}' | '\u{2060}' | '\u{00a0}'
    )
}

/// Reduces an HTML fragment to a single line of plain text.
///
/// Inline markup is dropped without a separator; block-level tags become a space.
#[must_use]
pub fn html_to_text(html: &str) -> String {
    let blocks = BLOCK_TAG.replace_all(html, " ");
    let stripped = TAG.replace_all(&blocks, "");
    let decoded = ENTITY.replace_all(&stripped, |caps: &regex::Captures<'_>| {
        decode_entity(&caps[1]).map_or_else(|| caps[0].to_string(), String::from)
    });
    let flattened: String = decoded
        .chars()
        .map(|c| if is_invisible_space(c) { ' ' } else { c })
        .collect();
    WHITESPACE.replace_all(&flattened, " ").trim().to_string()
}

/// Greedy word wrap at `width` characters.
///
/// Words longer than `width` are split.
#[must_use]
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut line_len = 0;

    for word in text.split_whitespace() {
        let chars: Vec<char> = word.chars().collect();
        for chunk in chars.chunks(width) {
            let chunk_len = chunk.len();
            if line_len > 0 && line_len + 1 + chunk_len > width {
                lines.push(std::mem::take(&mut line));
                line_len = 0;
            }
            if line_len > 0 {
                line.push(' ');
                line_len += 1;
            }
            line.extend(chunk);
            line_len += chunk_len;
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// File-system safe version of a topic title.
#[must_use]
pub fn file_stem(title: &str) -> String {
    let stem: String = title
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
            c if c.is_control() => ' ',
            c => c,
        })
        .collect();
    let stem = stem.trim().trim_matches('.').to_string();
    if stem.is_empty() {
        "untitled".to_string()
    } else {
        stem
    }
}
