//! Экранирование текста для XML атрибутов и символьных данных.

/// Экранирует строку для XML атрибута
pub fn escape_attr(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '\n' => out.push_str("&#10;"),
            _ => out.push(c),
        }
    }
    out
}

/// Экранирует строку для символьных данных XML
pub fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Готовит текст для value ячейки: экранирует и переводит переносы
/// строк в `<br>` (draw.io рендерит value как HTML)
pub fn value_with_breaks(s: &str) -> String {
    escape_attr(s).replace("&#10;", "&lt;br&gt;")
}
