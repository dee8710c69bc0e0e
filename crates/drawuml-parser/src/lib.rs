//! # drawuml-parser
//!
//! Толерантные построчные парсеры PlantUML: один проход по строкам,
//! явное состояние (стеки контейнеров/фрагментов, режим многострочного
//! блока), нераспознанные строки молча пропускаются. Таблицы ключевых
//! слов и декораторов перебираются от длинных к коротким.

pub mod arrows;
pub mod error;
pub mod line;
pub mod parsers;

pub use error::ParseError;
pub use parsers::{
    parse_class, parse_component, parse_sequence, parse_state, parse_timing, parse_usecase,
};
pub use drawuml_model::Diagram;

/// Результат парсинга
pub type Result<T> = std::result::Result<T, ParseError>;

/// Семейство диаграммы
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagramKind {
    Sequence,
    Class,
    Component,
    Deployment,
    UseCase,
    State,
    Timing,
    Unknown,
}

/// Парсит PlantUML исходный код: определяет семейство и строит модель.
///
/// # Пример
///
/// ```rust
/// use drawuml_parser::parse;
///
/// let source = "@startuml\nAlice -> Bob: Hello\n@enduml";
/// let diagram = parse(source);
/// assert!(diagram.is_ok());
/// ```
pub fn parse(source: &str) -> Result<Diagram> {
    if source.trim().is_empty() {
        return Err(ParseError::EmptySource);
    }
    match detect_diagram_kind(source) {
        DiagramKind::Sequence => Ok(Diagram::Sequence(parse_sequence(source))),
        DiagramKind::Class => Ok(Diagram::Class(parse_class(source))),
        DiagramKind::Component => Ok(Diagram::Component(parse_component(source))),
        DiagramKind::Deployment => Ok(Diagram::Deployment(parse_component(source))),
        DiagramKind::UseCase => Ok(Diagram::UseCase(parse_usecase(source))),
        DiagramKind::State => Ok(Diagram::State(parse_state(source))),
        DiagramKind::Timing => Ok(Diagram::Timing(parse_timing(source))),
        DiagramKind::Unknown => Err(ParseError::UnknownDiagramType),
    }
}

/// Есть ли в тексте паттерн `[Component]` — одно слово в квадратных
/// скобках (не массив вида users[0])
fn has_component_bracket_pattern(source: &str) -> bool {
    let bytes = source.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'[' {
            let start = i + 1;
            i += 1;
            while i < bytes.len() && bytes[i] != b']' {
                i += 1;
            }
            if i < bytes.len() {
                let content = source[start..i].trim();
                if !content.is_empty()
                    && content != "*"
                    && !content.chars().all(|c| c.is_ascii_digit())
                    && content.chars().next().map(|c| c.is_alphabetic()).unwrap_or(false)
                {
                    return true;
                }
            }
        }
        i += 1;
    }
    false
}

/// Есть ли `state ` в начале какой-либо строки (а не внутри текста
/// сообщения)
fn has_state_keyword(source: &str) -> bool {
    source
        .lines()
        .any(|line| line.trim_start().starts_with("state "))
}

/// Определяет семейство диаграммы по содержимому.
///
/// Порядок проверок фиксирован: специфичные признаки (timing-игроки,
/// `[*]`, ключевые слова классов) проверяются раньше общих (стрелки).
pub fn detect_diagram_kind(source: &str) -> DiagramKind {
    let lower = source.to_lowercase();

    // Timing — robust/concise/clock/binary/analog уникальны
    if lower.contains("robust ")
        || lower.contains("concise ")
        || lower.contains("clock ")
        || lower.contains("binary ")
        || lower.contains("analog ")
    {
        return DiagramKind::Timing;
    }

    // State — [*] и ключевое слово state в начале строки
    if lower.contains("[*] -->")
        || lower.contains("--> [*]")
        || lower.contains("[*] ->")
        || lower.contains("-> [*]")
        || has_state_keyword(&lower)
    {
        return DiagramKind::State;
    }

    // Class — ключевые слова и характерные связи
    if lower.contains("class ")
        || lower.contains("abstract class")
        || lower.contains("<|--")
        || lower.contains("--|>")
        || lower.contains("..|>")
        || lower.contains("<|..")
        || (lower.contains("interface ") && lower.contains("{"))
        || lower.contains("enum ")
    {
        return DiagramKind::Class;
    }

    // Sequence — participant/actor и прочие объявления участников
    if lower.contains("participant ")
        || lower.contains("autonumber")
        || (lower.contains("actor ") && (lower.contains(" -> ") || lower.contains(" --> ")))
        || lower.contains("boundary ")
        || lower.contains("control ")
        || lower.contains("collections ")
        || (lower.contains("box ") && lower.contains("end box"))
        || lower.contains("activate ")
        || lower.contains("deactivate ")
    {
        return DiagramKind::Sequence;
    }

    // UseCase — актёры `:X:` и прецеденты `(Y)` в сокращённой записи
    let has_actor_shorthand = lower.lines().any(|line| {
        let t = line.trim();
        t.starts_with(':') && t[1..].contains(':')
    });
    if lower.contains("usecase ") || (has_actor_shorthand && lower.contains('(')) {
        return DiagramKind::UseCase;
    }

    // Deployment — узлы и артефакты
    if lower.contains("device ")
        || lower.contains("artifact ")
        || (lower.contains("node ") && lower.contains("{"))
    {
        return DiagramKind::Deployment;
    }

    // Component — ключевые слова и [Component] паттерн
    if lower.contains("component ")
        || lower.contains("cloud ")
        || lower.contains("storage ")
        || lower.contains("interface ")
        || (lower.contains("package ") && !lower.contains("class "))
    {
        return DiagramKind::Component;
    }

    if has_component_bracket_pattern(&lower)
        && !lower.contains(" -> ")
        && !lower.contains(" --> ")
    {
        return DiagramKind::Component;
    }

    // Database/node без явных sequence-стрелок — скорее component
    if (lower.contains("database ") || lower.contains("node ") || lower.contains("queue "))
        && !lower.contains(" -> ")
        && !lower.contains(" --> ")
    {
        return DiagramKind::Component;
    }

    // Остальные случаи со стрелками — sequence
    if lower.contains("-->") || lower.contains("->>") || lower.contains("->") {
        return DiagramKind::Sequence;
    }

    DiagramKind::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_sequence() {
        let source = "@startuml\nAlice -> Bob: Hello\n@enduml";
        assert_eq!(detect_diagram_kind(source), DiagramKind::Sequence);
    }

    #[test]
    fn test_detect_class() {
        let source = "@startuml\nclass User\n@enduml";
        assert_eq!(detect_diagram_kind(source), DiagramKind::Class);
    }

    #[test]
    fn test_detect_state() {
        let source = "@startuml\n[*] --> Active\n@enduml";
        assert_eq!(detect_diagram_kind(source), DiagramKind::State);
    }

    #[test]
    fn test_detect_timing() {
        let source = "@startuml\nrobust \"Web Browser\" as WB\nconcise \"Server\" as S\n@enduml";
        assert_eq!(detect_diagram_kind(source), DiagramKind::Timing);
    }

    #[test]
    fn test_detect_component() {
        let source = "@startuml\ncomponent API\n@enduml";
        assert_eq!(detect_diagram_kind(source), DiagramKind::Component);
    }

    #[test]
    fn test_detect_component_brackets() {
        let source = "@startuml\n[Gateway]\n[Service]\n@enduml";
        assert_eq!(detect_diagram_kind(source), DiagramKind::Component);
    }

    #[test]
    fn test_detect_usecase() {
        let source = "@startuml\n:Customer: --> (Place order)\n@enduml";
        assert_eq!(detect_diagram_kind(source), DiagramKind::UseCase);
    }

    #[test]
    fn test_detect_deployment() {
        let source = "@startuml\nnode \"Web Server\" {\n    [Apache]\n}\n@enduml";
        assert_eq!(detect_diagram_kind(source), DiagramKind::Deployment);
    }

    #[test]
    fn test_detect_sequence_message_in_state_text_not_state() {
        // "state updated" внутри текста сообщения не делает диаграмму state
        let source = "@startuml\nparticipant Redux\nRedux --> React: state updated\n@enduml";
        assert_eq!(detect_diagram_kind(source), DiagramKind::Sequence);
    }

    #[test]
    fn test_parse_dispatch() {
        let source = "@startuml\nAlice -> Bob\n@enduml";
        let result = parse(source);
        assert!(matches!(result, Ok(Diagram::Sequence(_))));
    }

    #[test]
    fn test_empty_source() {
        assert!(matches!(parse("  \n "), Err(ParseError::EmptySource)));
    }
}
