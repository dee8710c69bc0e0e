//! Построчная подготовка исходника и общие утилиты разбора строк.

use drawuml_model::common::Color;

/// Готовит строки к разбору: обрезает пробелы, выбрасывает пустые
/// строки, комментарии (`'…` и блочные `/'…'/`) и разделители
/// `@start*`/`@end*`.
pub fn clean_lines(source: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut in_block_comment = false;

    for raw in source.lines() {
        let line = raw.trim();
        if in_block_comment {
            if line.ends_with("'/") || line.contains("'/") {
                in_block_comment = false;
            }
            continue;
        }
        if line.is_empty() {
            continue;
        }
        if line.starts_with('\'') {
            continue;
        }
        if line.starts_with("/'") {
            if !line.contains("'/") {
                in_block_comment = true;
            }
            continue;
        }
        let lower = line.to_lowercase();
        if lower.starts_with("@start") || lower.starts_with("@end") {
            continue;
        }
        out.push(line.to_string());
    }
    out
}

/// Снимает кавычки с имени, если они есть
pub fn unquote(s: &str) -> String {
    let t = s.trim();
    if t.len() >= 2 && t.starts_with('"') && t.ends_with('"') {
        t[1..t.len() - 1].to_string()
    } else {
        t.to_string()
    }
}

/// Разбирает `имя [as алиас]` в пару (отображаемое имя, код).
///
/// Кавычки допустимы с любой стороны: `"Имя" as Code` даёт код Code,
/// `Code as "Имя"` — тоже. Без `as` код совпадает с именем (в кавычках
/// код выводится из имени).
pub fn split_name_alias(s: &str) -> (String, String) {
    let t = s.trim();
    if let Some(pos) = find_as_keyword(t) {
        let left = t[..pos].trim();
        let right = t[pos + 4..].trim();
        let left_quoted = left.starts_with('"');
        let right_quoted = right.starts_with('"');
        if left_quoted && !right_quoted {
            (unquote(left), right.to_string())
        } else if right_quoted && !left_quoted {
            (unquote(right), left.to_string())
        } else {
            // Обе стороны без кавычек: слева имя, справа код
            (unquote(left), unquote(right))
        }
    } else if t.starts_with('"') {
        let name = unquote(t);
        (name.clone(), drawuml_model::code_from_name(&name))
    } else {
        (t.to_string(), t.to_string())
    }
}

/// Находит ` as ` вне кавычек
fn find_as_keyword(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut in_quotes = false;
    let mut i = 0;
    while i < s.len() {
        match bytes[i] {
            b'"' => in_quotes = !in_quotes,
            b' ' if !in_quotes => {
                if s[i..].starts_with(" as ") {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Отрезает хвостовой токен цвета `#цвет`; возвращает (остаток, цвет)
pub fn take_trailing_color(s: &str) -> (String, Option<Color>) {
    let t = s.trim();
    if let Some(pos) = t.rfind('#') {
        let candidate = &t[pos..];
        // Цветовой токен не содержит пробелов и стоит в конце строки
        if !candidate.contains(' ') && candidate.len() > 1 {
            let rest = t[..pos].trim().to_string();
            return (rest, Some(Color::parse(candidate)));
        }
    }
    (t.to_string(), None)
}

/// Отрезает стереотип `<<…>>`; возвращает (остаток, стереотип)
pub fn take_stereotype(s: &str) -> (String, Option<String>) {
    if let (Some(start), Some(end)) = (s.find("<<"), s.rfind(">>")) {
        if start < end {
            let stereo = s[start + 2..end].trim();
            // Отбрасываем спот-символ `(C,#ABCDEF)` в начале стереотипа
            let stereo = match stereo.find(')') {
                Some(p) if stereo.starts_with('(') => stereo[p + 1..].trim(),
                _ => stereo,
            };
            let mut rest = String::new();
            rest.push_str(&s[..start]);
            rest.push_str(&s[end + 2..]);
            return (rest.trim().to_string(), Some(stereo.to_string()));
        }
    }
    (s.trim().to_string(), None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_lines_skips_comments() {
        let src = "@startuml\n' comment\nAlice -> Bob\n/' block\nstill '/\nBob -> Alice\n@enduml";
        let lines = clean_lines(src);
        assert_eq!(lines, vec!["Alice -> Bob", "Bob -> Alice"]);
    }

    #[test]
    fn test_split_name_alias() {
        assert_eq!(
            split_name_alias("\"Сервис Обработки\" as Processor"),
            ("Сервис Обработки".to_string(), "Processor".to_string())
        );
        assert_eq!(
            split_name_alias("Bob"),
            ("Bob".to_string(), "Bob".to_string())
        );
        assert_eq!(
            split_name_alias("\"Place order\""),
            ("Place order".to_string(), "Placeorder".to_string())
        );
    }

    #[test]
    fn test_take_trailing_color() {
        let (rest, color) = take_trailing_color("Bob #LightBlue");
        assert_eq!(rest, "Bob");
        assert_eq!(color.unwrap().as_str(), "#LightBlue");

        let (rest, color) = take_trailing_color("no color here");
        assert_eq!(rest, "no color here");
        assert!(color.is_none());
    }

    #[test]
    fn test_take_stereotype() {
        let (rest, stereo) = take_stereotype("User <<entity>>");
        assert_eq!(rest, "User");
        assert_eq!(stereo.as_deref(), Some("entity"));

        let (_, spot) = take_stereotype("X <<(C,#FF7700) singleton>>");
        assert_eq!(spot.as_deref(), Some("singleton"));
    }
}
