use serde::{Deserialize, Serialize};

/// テキストを保存するキー
pub const TEXT_KEY: &str = "text";

/// デフォルトのストアファイル名
pub const DEFAULT_STORE_PATH: &str = "store.json";

/// タブ入力で挿入するインデント
pub const INDENT: &str = "  ";

/// ストアに保存される形 `{ "value": "..." }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedText {
    pub value: String,
}

impl PersistedText {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

/// Tab キーによるインデント。
///
/// 選択範囲（なければカーソル位置）を2スペースで置き換え、
/// 新しいテキストと置換後のカーソル位置を返す。位置は文字単位。
pub fn indent_with_tab(text: &str, selection_start: usize, selection_end: usize) -> (String, usize) {
    let len = text.chars().count();
    let (start, end) = if selection_start <= selection_end {
        (selection_start, selection_end)
    } else {
        (selection_end, selection_start)
    };
    let start = start.min(len);
    let end = end.min(len);

    let byte_at = |pos: usize| {
        text.char_indices()
            .nth(pos)
            .map(|(i, _)| i)
            .unwrap_or(text.len())
    };

    let mut out = String::with_capacity(text.len() + INDENT.len());
    out.push_str(&text[..byte_at(start)]);
    out.push_str(INDENT);
    out.push_str(&text[byte_at(end)..]);

    (out, start + INDENT.chars().count())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_inserts_two_spaces_at_cursor() {
        let (text, cursor) = indent_with_tab("initial text", 8, 8);
        assert_eq!(text, "initial   text");
        assert_eq!(cursor, 10);
    }

    #[test]
    fn test_tab_replaces_selection() {
        let (text, cursor) = indent_with_tab("initial text", 8, 12);
        assert_eq!(text, "initial   ");
        assert_eq!(cursor, 10);
    }

    #[test]
    fn test_tab_on_empty_text() {
        assert_eq!(indent_with_tab("", 0, 0), ("  ".to_string(), 2));
    }

    #[test]
    fn test_tab_clamps_and_normalizes_range() {
        assert_eq!(indent_with_tab("abc", 10, 10), ("abc  ".to_string(), 5));
        assert_eq!(indent_with_tab("abcdef", 4, 2), ("ab  ef".to_string(), 4));
    }

    #[test]
    fn test_tab_uses_char_offsets() {
        let (text, cursor) = indent_with_tab("メモ帳", 2, 2);
        assert_eq!(text, "メモ  帳");
        assert_eq!(cursor, 4);
    }
}
