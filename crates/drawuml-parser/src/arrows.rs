//! Разбор токенов стрелок и связей.
//!
//! Токен сообщения (`->`, `<<--`, `-[#red]->>`, `->o`, `..>`) и токен
//! связи класса/компонента (`<|--`, `*-->`, `o..o`, `-down->`)
//! декомпозируются посимвольно; таблицы декораторов перебираются от
//! длинных последовательностей к коротким, чтобы префикс не украл
//! совпадение у более длинного ключа.

use drawuml_model::common::{Color, DirectionHint, LineStyle, LinkDecor};
use drawuml_model::sequence::{ArrowConfig, ArrowDecoration, ArrowHead, ArrowPart};

/// Таблица декораторов левого конца, от длинных к коротким
const LEFT_DECORS: &[(&str, LinkDecor)] = &[
    ("<|", LinkDecor::Extension),
    ("}|", LinkDecor::OneMany),
    ("}o", LinkDecor::CrowFoot),
    ("||", LinkDecor::One),
    ("|o", LinkDecor::ZeroOne),
    ("()", LinkDecor::Circle),
    ("<", LinkDecor::Arrow),
    ("}", LinkDecor::CrowFoot),
    ("*", LinkDecor::Composition),
    ("o", LinkDecor::Aggregation),
    ("#", LinkDecor::Square),
    ("x", LinkDecor::Cross),
    ("+", LinkDecor::Plus),
    ("^", LinkDecor::Extension),
    ("0", LinkDecor::CircleFilled),
];

/// Таблица декораторов правого конца, от длинных к коротким
const RIGHT_DECORS: &[(&str, LinkDecor)] = &[
    ("|>", LinkDecor::Extension),
    ("|{", LinkDecor::OneMany),
    ("o{", LinkDecor::CrowFoot),
    ("||", LinkDecor::One),
    ("o|", LinkDecor::ZeroOne),
    ("()", LinkDecor::Circle),
    (">", LinkDecor::Arrow),
    ("{", LinkDecor::CrowFoot),
    ("*", LinkDecor::Composition),
    ("o", LinkDecor::Aggregation),
    ("#", LinkDecor::Square),
    ("x", LinkDecor::Cross),
    ("+", LinkDecor::Plus),
    ("^", LinkDecor::Extension),
    ("0", LinkDecor::CircleFilled),
];

/// Символ тела связи
fn is_body_char(c: char) -> bool {
    matches!(c, '-' | '.' | '=' | '~')
}

/// Результат разбора токена связи (class/component/state)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkToken {
    pub left_decor: LinkDecor,
    pub right_decor: LinkDecor,
    pub line_style: LineStyle,
    pub direction: DirectionHint,
    pub color: Option<Color>,
}

/// Вырезает стилевую скобку `[#red]` / `[bold]` из токена.
/// Возвращает (токен без скобки, цвет, стиль из скобки).
fn take_style_bracket(token: &str) -> (String, Option<Color>, Option<LineStyle>) {
    let (Some(start), Some(end)) = (token.find('['), token.find(']')) else {
        return (token.to_string(), None, None);
    };
    if end < start {
        return (token.to_string(), None, None);
    }
    let inner = &token[start + 1..end];
    let mut color = None;
    let mut style = None;
    for part in inner.split(',') {
        let part = part.trim();
        if let Some(c) = part.strip_prefix('#') {
            color = Some(Color::parse(format!("#{}", c)));
        } else {
            style = match part.to_lowercase().as_str() {
                "bold" | "thickness" => Some(LineStyle::Bold),
                "dashed" => Some(LineStyle::Dashed),
                "dotted" => Some(LineStyle::Dotted),
                "hidden" => Some(LineStyle::Hidden),
                "plain" => Some(LineStyle::Solid),
                _ => style,
            };
        }
    }
    let mut rest = String::new();
    rest.push_str(&token[..start]);
    rest.push_str(&token[end + 1..]);
    (rest, color, style)
}

/// Разбирает токен связи класса/компонента/состояния.
///
/// Возвращает `None`, если токен не содержит символов тела.
pub fn parse_link_token(token: &str) -> Option<LinkToken> {
    if !token.chars().any(is_body_char) {
        return None;
    }
    let (token, color, bracket_style) = take_style_bracket(token);

    // Левый декоратор
    let mut rest = token.as_str();
    let mut left_decor = LinkDecor::None;
    for (pat, decor) in LEFT_DECORS {
        if rest.starts_with(pat) && rest.len() > pat.len() {
            let after = &rest[pat.len()..];
            if after.starts_with(is_body_char) {
                left_decor = *decor;
                rest = after;
                break;
            }
        }
    }

    // Правый декоратор
    let mut right_decor = LinkDecor::None;
    for (pat, decor) in RIGHT_DECORS {
        if rest.ends_with(pat) && rest.len() > pat.len() {
            let before = &rest[..rest.len() - pat.len()];
            if before.ends_with(is_body_char) {
                right_decor = *decor;
                rest = before;
                break;
            }
        }
    }

    // Тело: символы линии и, возможно, слово направления. Слово, не
    // являющееся направлением, делает токен недействительным
    let mut direction = DirectionHint::None;
    let mut body_chars: Vec<char> = Vec::new();
    let mut word = String::new();
    fn take_word(word: &mut String, direction: &mut DirectionHint) -> bool {
        if word.is_empty() {
            return true;
        }
        let parsed = DirectionHint::parse(word);
        word.clear();
        if parsed == DirectionHint::None {
            return false;
        }
        *direction = parsed;
        true
    }
    for c in rest.chars() {
        if is_body_char(c) {
            if !take_word(&mut word, &mut direction) {
                return None;
            }
            body_chars.push(c);
        } else if c.is_alphabetic() {
            word.push(c);
        } else {
            return None;
        }
    }
    if !take_word(&mut word, &mut direction) {
        return None;
    }
    if body_chars.is_empty() {
        return None;
    }

    let line_style = bracket_style.unwrap_or(match body_chars[0] {
        '.' => LineStyle::Dashed,
        '=' => LineStyle::Bold,
        '~' => LineStyle::Dotted,
        _ => LineStyle::Solid,
    });

    Some(LinkToken {
        left_decor,
        right_decor,
        line_style,
        direction,
        color,
    })
}

/// Разбирает токен стрелки сообщения sequence диаграммы.
///
/// Возвращает `None`, если токен не похож на стрелку.
pub fn parse_arrow(token: &str) -> Option<ArrowConfig> {
    if !token.chars().any(is_body_char) {
        return None;
    }
    let (token, color, bracket_style) = take_style_bracket(token);
    let mut config = ArrowConfig {
        color,
        ..ArrowConfig::default()
    };

    let mut rest = token.as_str();

    // Декорация и наконечник слева
    if let Some(after) = rest.strip_prefix('o') {
        if after.starts_with('<') || after.starts_with('\\') || after.starts_with('/') {
            config.decoration1 = ArrowDecoration::Circle;
            rest = after;
        }
    } else if let Some(after) = rest.strip_prefix('x') {
        if after.starts_with('<') {
            config.decoration1 = ArrowDecoration::Cross;
            rest = after;
        }
    }
    if let Some(after) = rest.strip_prefix("<<") {
        config.head1 = ArrowHead::Open;
        rest = after;
    } else if let Some(after) = rest.strip_prefix('<') {
        config.head1 = ArrowHead::Filled;
        rest = after;
    } else if let Some(after) = rest.strip_prefix('\\') {
        config.head1 = ArrowHead::Half;
        config.part = ArrowPart::Top;
        rest = after;
    } else if let Some(after) = rest.strip_prefix('/') {
        config.head1 = ArrowHead::Half;
        config.part = ArrowPart::Bottom;
        rest = after;
    }

    // Декорация и наконечник справа
    if let Some(before) = rest.strip_suffix('o') {
        if before.ends_with('>') || before.ends_with(is_body_char) {
            config.decoration2 = ArrowDecoration::Circle;
            rest = before;
        }
    } else if let Some(before) = rest.strip_suffix('x') {
        if before.ends_with('>') || before.ends_with(is_body_char) {
            config.decoration2 = ArrowDecoration::Cross;
            rest = before;
        }
    }
    if let Some(before) = rest.strip_suffix(">>") {
        config.head2 = ArrowHead::Open;
        rest = before;
    } else if let Some(before) = rest.strip_suffix('>') {
        config.head2 = ArrowHead::Filled;
        rest = before;
    } else if let Some(before) = rest.strip_suffix('\\') {
        config.head2 = ArrowHead::Half;
        config.part = ArrowPart::Top;
        rest = before;
    } else if let Some(before) = rest.strip_suffix('/') {
        config.head2 = ArrowHead::Half;
        config.part = ArrowPart::Bottom;
        rest = before;
    }

    if rest.is_empty() || !rest.chars().all(is_body_char) {
        return None;
    }

    config.body = bracket_style.unwrap_or_else(|| match rest.chars().next().unwrap() {
        '.' => LineStyle::Dotted,
        '=' => LineStyle::Bold,
        // Два и более дефиса — пунктир (PlantUML `-->`)
        '-' if rest.len() >= 2 => LineStyle::Dashed,
        _ => LineStyle::Solid,
    });

    // Ни одного наконечника — это не стрелка сообщения
    if config.head1 == ArrowHead::None
        && config.head2 == ArrowHead::None
        && config.decoration1 == ArrowDecoration::None
        && config.decoration2 == ArrowDecoration::None
    {
        return None;
    }

    Some(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_arrow_basic() {
        let a = parse_arrow("->").unwrap();
        assert_eq!(a.head2, ArrowHead::Filled);
        assert_eq!(a.body, LineStyle::Solid);

        let a = parse_arrow("-->").unwrap();
        assert_eq!(a.body, LineStyle::Dashed);

        let a = parse_arrow("..>").unwrap();
        assert_eq!(a.body, LineStyle::Dotted);

        let a = parse_arrow("->>").unwrap();
        assert_eq!(a.head2, ArrowHead::Open);
    }

    #[test]
    fn test_parse_arrow_bidirectional() {
        let a = parse_arrow("<->").unwrap();
        assert!(a.is_bidirectional());
        let a = parse_arrow("<<-->>").unwrap();
        assert_eq!(a.head1, ArrowHead::Open);
        assert_eq!(a.head2, ArrowHead::Open);
        assert_eq!(a.body, LineStyle::Dashed);
    }

    #[test]
    fn test_parse_arrow_decorations() {
        let a = parse_arrow("->o").unwrap();
        assert_eq!(a.decoration2, ArrowDecoration::Circle);
        let a = parse_arrow("->x").unwrap();
        assert_eq!(a.decoration2, ArrowDecoration::Cross);
        let a = parse_arrow("x<-").unwrap();
        assert_eq!(a.decoration1, ArrowDecoration::Cross);
        assert!(a.is_right_to_left());
    }

    #[test]
    fn test_parse_arrow_style_bracket() {
        let a = parse_arrow("-[#red]->").unwrap();
        assert_eq!(a.color.as_ref().unwrap().as_str(), "#red");
        let a = parse_arrow("-[hidden]->").unwrap();
        assert_eq!(a.body, LineStyle::Hidden);
        let a = parse_arrow("-[bold]->").unwrap();
        assert_eq!(a.body, LineStyle::Bold);
    }

    #[test]
    fn test_parse_arrow_rejects_non_arrows() {
        assert!(parse_arrow("--").is_none());
        assert!(parse_arrow("abc").is_none());
        assert!(parse_arrow("==").is_none());
    }

    #[test]
    fn test_parse_link_extension() {
        let link = parse_link_token("<|--").unwrap();
        assert_eq!(link.left_decor, LinkDecor::Extension);
        assert_eq!(link.right_decor, LinkDecor::None);
        assert_eq!(link.line_style, LineStyle::Solid);

        let link = parse_link_token("..|>").unwrap();
        assert_eq!(link.right_decor, LinkDecor::Extension);
        assert_eq!(link.line_style, LineStyle::Dashed);
    }

    #[test]
    fn test_parse_link_composition_aggregation() {
        let link = parse_link_token("*--").unwrap();
        assert_eq!(link.left_decor, LinkDecor::Composition);
        let link = parse_link_token("o--").unwrap();
        assert_eq!(link.left_decor, LinkDecor::Aggregation);
        let link = parse_link_token("--*").unwrap();
        assert_eq!(link.right_decor, LinkDecor::Composition);
    }

    #[test]
    fn test_parse_link_crowfoot() {
        let link = parse_link_token("}|--|{").unwrap();
        assert_eq!(link.left_decor, LinkDecor::OneMany);
        assert_eq!(link.right_decor, LinkDecor::OneMany);
        let link = parse_link_token("}o--o{").unwrap();
        assert_eq!(link.left_decor, LinkDecor::CrowFoot);
        assert_eq!(link.right_decor, LinkDecor::CrowFoot);
    }

    #[test]
    fn test_parse_link_direction() {
        let link = parse_link_token("-down->").unwrap();
        assert_eq!(link.direction, DirectionHint::Down);
        assert_eq!(link.right_decor, LinkDecor::Arrow);
        let link = parse_link_token("-u->").unwrap();
        assert_eq!(link.direction, DirectionHint::Up);
    }

    #[test]
    fn test_parse_link_color() {
        let link = parse_link_token("-[#blue,dashed]->").unwrap();
        assert_eq!(link.color.as_ref().unwrap().as_str(), "#blue");
        assert_eq!(link.line_style, LineStyle::Dashed);
    }

    #[test]
    fn test_parse_link_rejects_plain_word() {
        assert!(parse_link_token("hello").is_none());
    }
}
