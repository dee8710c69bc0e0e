//! Построчный парсер State Diagrams.
//!
//! Составные состояния ведутся явным стеком; `[*]` разворачивается в
//! initial/final псевдосостояния в контексте текущего родителя,
//! `[H]`/`[H*]` — в history. Разделитель `--` внутри составного
//! состояния открывает новый конкурентный регион.

use regex::Regex;

use drawuml_model::common::{LineStyle, NotePosition};
use drawuml_model::state::{
    StateDiagram, StateDirection, StateElement, StateKind, StateNote, Transition,
};

use crate::arrows::parse_link_token;
use crate::line::{clean_lines, split_name_alias, take_stereotype, take_trailing_color, unquote};

/// Парсит state diagram из исходного кода
pub fn parse_state(source: &str) -> StateDiagram {
    let mut parser = StateParser::new();
    for line in clean_lines(source) {
        parser.feed(&line);
    }
    parser.finish()
}

/// Кадр стека составных состояний
struct CompositeFrame {
    code: String,
    regions: Vec<Vec<String>>,
}

enum Mode {
    Normal,
    Note,
    Title,
}

struct Rules {
    title: Regex,
    direction: Regex,
    state_decl: Regex,
    transition: Regex,
    description: Regex,
    note_of: Regex,
    note_on_link: Regex,
}

impl Rules {
    fn new() -> Self {
        Self {
            title: Regex::new(r"^(?i)title\b\s*(.*)$").unwrap(),
            direction: Regex::new(r"^(?i)(left\s+to\s+right|top\s+to\s+bottom)\s+direction$")
                .unwrap(),
            state_decl: Regex::new(r"^(?i)state\s+(.+)$").unwrap(),
            transition: Regex::new(
                r#"^(?P<from>\[\*\]|\[H\*?\]|"[^"]+"|[\w.]+)\s*(?P<link>\S*[-=.~]\S*)\s*(?P<to>\[\*\]|\[H\*?\]|"[^"]+"|[\w.]+)\s*(?::\s*(?P<label>.*))?$"#,
            )
            .unwrap(),
            description: Regex::new(r#"^("[^"]+"|[\w.]+)\s*:\s*(.+)$"#).unwrap(),
            note_of: Regex::new(
                r"^(?i)note\s+(left|right|top|bottom)(?:\s+of\s+([^:]+?))?(?:\s*:\s*(.*))?$",
            )
            .unwrap(),
            note_on_link: Regex::new(
                r"^(?i)note\s+(?:(left|right|top|bottom)\s+)?on\s+link\s*(?::\s*(.*))?$",
            )
            .unwrap(),
        }
    }
}

struct StateParser {
    diagram: StateDiagram,
    composite_stack: Vec<CompositeFrame>,
    mode: Mode,
    buffer: Vec<String>,
    pending_note: Option<StateNote>,
    rules: Rules,
}

impl StateParser {
    fn new() -> Self {
        Self {
            diagram: StateDiagram::new(),
            composite_stack: Vec::new(),
            mode: Mode::Normal,
            buffer: Vec::new(),
            pending_note: None,
            rules: Rules::new(),
        }
    }

    fn current_parent(&self) -> Option<String> {
        self.composite_stack.last().map(|f| f.code.clone())
    }

    /// Регистрирует состояние в текущем контексте
    fn ensure_state(&mut self, code: &str) {
        if !self.diagram.elements.contains_key(code) {
            let mut element = StateElement::new(code, code);
            element.parent = self.current_parent();
            self.diagram.add_element(element);
            self.attach_to_parent(code);
        }
    }

    fn attach_to_parent(&mut self, code: &str) {
        if let Some(frame) = self.composite_stack.last_mut() {
            if !frame.regions.last().map(|r| r.contains(&code.to_string())).unwrap_or(false) {
                frame.regions.last_mut().unwrap().push(code.to_string());
            }
            let parent_code = frame.code.clone();
            if let Some(parent) = self.diagram.elements.get_mut(&parent_code) {
                if !parent.children.contains(&code.to_string()) {
                    parent.children.push(code.to_string());
                }
            }
        }
    }

    /// Код псевдосостояния `[*]`/`[H]`/`[H*]` в текущем контексте
    fn pseudo_code(&mut self, token: &str, is_source: bool) -> String {
        let parent = self.current_parent();
        let suffix = parent.as_deref().unwrap_or("");
        let (base, kind) = match token {
            "[H]" => ("__history", StateKind::History),
            "[H*]" => ("__deep_history", StateKind::DeepHistory),
            // `[*]` слева — initial, справа — final
            _ if is_source => ("__initial", StateKind::Initial),
            _ => ("__final", StateKind::Final),
        };
        let code = if suffix.is_empty() {
            base.to_string()
        } else {
            format!("{}_{}", base, suffix)
        };
        if !self.diagram.elements.contains_key(&code) {
            let mut element = StateElement::pseudo(code.clone(), kind);
            element.parent = parent;
            element.display_name = String::new();
            self.diagram.add_element(element);
            self.attach_to_parent(&code);
        }
        code
    }

    fn feed(&mut self, line: &str) {
        match self.mode {
            Mode::Note => {
                if line.to_lowercase() == "end note" {
                    if let Some(mut note) = self.pending_note.take() {
                        note.text = self.buffer.join("\n");
                        self.diagram.notes.push(note);
                    }
                    self.buffer.clear();
                    self.mode = Mode::Normal;
                } else {
                    self.buffer.push(line.to_string());
                }
            }
            Mode::Title => {
                if line.to_lowercase() == "end title" {
                    self.diagram.title = Some(self.buffer.join("\n"));
                    self.buffer.clear();
                    self.mode = Mode::Normal;
                } else {
                    self.buffer.push(line.to_string());
                }
            }
            Mode::Normal => self.feed_normal(line),
        }
    }

    fn feed_normal(&mut self, line: &str) {
        // Разделитель конкурентных регионов внутри составного состояния
        if (line == "--" || line == "||") && !self.composite_stack.is_empty() {
            if let Some(frame) = self.composite_stack.last_mut() {
                frame.regions.push(Vec::new());
            }
            return;
        }
        if line == "}" {
            if let Some(frame) = self.composite_stack.pop() {
                if frame.regions.len() > 1 {
                    if let Some(element) = self.diagram.elements.get_mut(&frame.code) {
                        element.concurrent_regions = frame.regions;
                    }
                }
            }
            return;
        }
        if self.try_title(line)
            || self.try_direction(line)
            || self.try_state_decl(line)
            || self.try_note(line)
            || self.try_transition(line)
            || self.try_description(line)
        {
            return;
        }
        // hide/scale/skinparam и прочее пропускается
    }

    fn try_title(&mut self, line: &str) -> bool {
        let Some(caps) = self.rules.title.captures(line) else {
            return false;
        };
        let rest = caps[1].trim().to_string();
        if rest.is_empty() {
            self.mode = Mode::Title;
        } else {
            self.diagram.title = Some(rest);
        }
        true
    }

    fn try_direction(&mut self, line: &str) -> bool {
        let Some(caps) = self.rules.direction.captures(line) else {
            return false;
        };
        if caps[1].to_lowercase().starts_with("left") {
            self.diagram.direction = StateDirection::LeftToRight;
        }
        true
    }

    fn try_state_decl(&mut self, line: &str) -> bool {
        let Some(caps) = self.rules.state_decl.captures(line) else {
            return false;
        };
        let mut rest = caps[1].trim().to_string();

        let opens_body = rest.ends_with('{');
        if opens_body {
            rest = rest[..rest.len() - 1].trim().to_string();
        }

        let (rest, color) = take_trailing_color(&rest);
        let (rest, stereotype) = take_stereotype(&rest);
        // Описание прямо в объявлении: `state X : text`
        let (rest, description) = match rest.split_once(" : ") {
            Some((head, desc)) => (head.trim().to_string(), Some(desc.trim().to_string())),
            None => (rest, None),
        };
        let (display_name, code) = split_name_alias(&rest);
        if code.is_empty() {
            return false;
        }

        let kind = stereotype
            .as_deref()
            .map(stereotype_kind)
            .unwrap_or(StateKind::State);

        if let Some(existing) = self.diagram.elements.get_mut(&code) {
            existing.display_name = display_name;
            existing.kind = kind;
            if let Some(c) = color {
                existing.color = Some(c);
            }
            if let Some(s) = stereotype {
                if kind == StateKind::State && !existing.stereotypes.contains(&s) {
                    existing.stereotypes.push(s);
                }
            }
            if let Some(d) = description {
                existing.descriptions.push(d);
            }
        } else {
            let mut element = StateElement::new(code.clone(), display_name);
            element.kind = kind;
            element.color = color;
            element.parent = self.current_parent();
            if kind == StateKind::State {
                if let Some(s) = stereotype {
                    element.stereotypes.push(s);
                }
            }
            if let Some(d) = description {
                element.descriptions.push(d);
            }
            self.diagram.add_element(element);
            self.attach_to_parent(&code);
        }

        if opens_body {
            self.composite_stack.push(CompositeFrame {
                code,
                regions: vec![Vec::new()],
            });
        }
        true
    }

    fn try_note(&mut self, line: &str) -> bool {
        if let Some(caps) = self.rules.note_on_link.captures(line) {
            let position = caps
                .get(1)
                .and_then(|m| NotePosition::parse(m.as_str()))
                .unwrap_or(NotePosition::Top);
            let note = StateNote {
                position,
                text: caps.get(2).map(|m| m.as_str().to_string()).unwrap_or_default(),
                entity_code: None,
                is_on_link: true,
                link_index: self.diagram.transitions.len().checked_sub(1),
            };
            if caps.get(2).is_some() {
                self.diagram.notes.push(note);
            } else {
                self.pending_note = Some(note);
                self.mode = Mode::Note;
            }
            return true;
        }
        let Some(caps) = self.rules.note_of.captures(line) else {
            return false;
        };
        let position = NotePosition::parse(&caps[1]).unwrap_or_default();
        let entity_code = caps.get(2).map(|m| unquote(m.as_str().trim()));
        if let Some(code) = &entity_code {
            self.ensure_state(code);
        }
        let note = StateNote {
            position,
            text: caps.get(3).map(|m| m.as_str().to_string()).unwrap_or_default(),
            entity_code,
            is_on_link: false,
            link_index: None,
        };
        if caps.get(3).is_some() {
            self.diagram.notes.push(note);
        } else {
            self.pending_note = Some(note);
            self.mode = Mode::Note;
        }
        true
    }

    fn try_transition(&mut self, line: &str) -> bool {
        let Some(caps) = self.rules.transition.captures(line) else {
            return false;
        };
        let raw_link = caps.name("link").unwrap().as_str();
        let Some(link) = parse_link_token(raw_link) else {
            return false;
        };

        let from_token = caps.name("from").unwrap().as_str();
        let to_token = caps.name("to").unwrap().as_str();
        let from = if from_token.starts_with('[') {
            self.pseudo_code(from_token, true)
        } else {
            let code = unquote(from_token);
            self.ensure_state(&code);
            code
        };
        let to = if to_token.starts_with('[') {
            self.pseudo_code(to_token, false)
        } else {
            let code = unquote(to_token);
            self.ensure_state(&code);
            code
        };

        let mut transition = Transition::new(from, to);
        transition.label = caps.name("label").map(|m| m.as_str().trim().to_string());
        transition.line_style = match link.line_style {
            // Тело из точек в диаграммах состояний рисуется пунктиром
            LineStyle::Dotted => LineStyle::Dashed,
            other => other,
        };
        transition.color = link.color;
        transition.cross_start = raw_link.starts_with('x');
        transition.circle_end = raw_link.ends_with('o');
        self.diagram.add_transition(transition);
        true
    }

    fn try_description(&mut self, line: &str) -> bool {
        let Some(caps) = self.rules.description.captures(line) else {
            return false;
        };
        let code = unquote(&caps[1]);
        let text = caps[2].trim().to_string();
        self.ensure_state(&code);
        if let Some(element) = self.diagram.elements.get_mut(&code) {
            element.descriptions.push(text);
        }
        true
    }

    fn finish(mut self) -> StateDiagram {
        // Неявное закрытие незакрытых составных состояний
        while let Some(frame) = self.composite_stack.pop() {
            if frame.regions.len() > 1 {
                if let Some(element) = self.diagram.elements.get_mut(&frame.code) {
                    element.concurrent_regions = frame.regions;
                }
            }
        }
        self.diagram
    }
}

/// Тип псевдосостояния по стереотипу объявления
fn stereotype_kind(stereotype: &str) -> StateKind {
    match stereotype.to_lowercase().as_str() {
        "choice" => StateKind::Choice,
        "fork" | "join" => StateKind::ForkJoin,
        "sync" => StateKind::SynchroBar,
        "history" => StateKind::History,
        "deep_history" | "deephistory" => StateKind::DeepHistory,
        "start" => StateKind::Initial,
        "end" => StateKind::Final,
        _ => StateKind::State,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_transitions() {
        let source = "@startuml\n[*] --> Idle\nIdle --> Running : start\nRunning --> Idle : stop\nRunning --> [*] : abort\n@enduml";
        let diagram = parse_state(source);
        assert_eq!(diagram.transitions.len(), 4);
        assert_eq!(diagram.elements["__initial"].kind, StateKind::Initial);
        assert_eq!(diagram.elements["__final"].kind, StateKind::Final);
        assert_eq!(diagram.elements["Idle"].kind, StateKind::State);
        assert_eq!(diagram.elements["Running"].kind, StateKind::State);
        assert_eq!(diagram.transitions[1].label.as_deref(), Some("start"));
    }

    #[test]
    fn test_state_with_alias() {
        let source = "@startuml\nstate \"Долгая обработка\" as Proc\n[*] --> Proc\n@enduml";
        let diagram = parse_state(source);
        assert_eq!(diagram.elements["Proc"].display_name, "Долгая обработка");
    }

    #[test]
    fn test_pseudostates_by_stereotype() {
        let source = "@startuml\nstate c <<choice>>\nstate f <<fork>>\nstate j <<join>>\nstate h <<history>>\n@enduml";
        let diagram = parse_state(source);
        assert_eq!(diagram.elements["c"].kind, StateKind::Choice);
        assert_eq!(diagram.elements["f"].kind, StateKind::ForkJoin);
        assert_eq!(diagram.elements["j"].kind, StateKind::ForkJoin);
        assert_eq!(diagram.elements["h"].kind, StateKind::History);
    }

    #[test]
    fn test_composite_state() {
        let source = "@startuml\nstate Active {\n[*] --> Working\nWorking --> Waiting\n}\nActive --> [*]\n@enduml";
        let diagram = parse_state(source);
        let active = &diagram.elements["Active"];
        assert!(active.is_composite());
        assert!(active.children.contains(&"Working".to_string()));
        assert_eq!(
            diagram.elements["Working"].parent.as_deref(),
            Some("Active")
        );
        // Вложенный [*] получает контекстный код
        assert!(diagram.elements.contains_key("__initial_Active"));
    }

    #[test]
    fn test_concurrent_regions() {
        let source = "@startuml\nstate Fork {\nA --> B\n--\nC --> D\n}\n@enduml";
        let diagram = parse_state(source);
        let fork = &diagram.elements["Fork"];
        assert_eq!(fork.concurrent_regions.len(), 2);
        assert!(fork.concurrent_regions[0].contains(&"A".to_string()));
        assert!(fork.concurrent_regions[1].contains(&"C".to_string()));
    }

    #[test]
    fn test_descriptions() {
        let source = "@startuml\nIdle : ожидание запроса\nIdle : таймаут 30с\n@enduml";
        let diagram = parse_state(source);
        assert_eq!(diagram.elements["Idle"].descriptions.len(), 2);
    }

    #[test]
    fn test_dashed_transition() {
        let source = "@startuml\nA ..> B\n@enduml";
        let diagram = parse_state(source);
        assert_eq!(diagram.transitions[0].line_style, LineStyle::Dashed);
    }

    #[test]
    fn test_left_to_right() {
        let source = "@startuml\nleft to right direction\n[*] --> A\n@enduml";
        let diagram = parse_state(source);
        assert_eq!(diagram.direction, StateDirection::LeftToRight);
    }

    #[test]
    fn test_history_pseudostate() {
        let source = "@startuml\nstate Active {\nA --> B\n}\nResume --> [H]\n@enduml";
        let diagram = parse_state(source);
        assert_eq!(diagram.elements["__history"].kind, StateKind::History);
    }

    #[test]
    fn test_note_on_state() {
        let source = "@startuml\n[*] --> A\nnote right of A : активное состояние\n@enduml";
        let diagram = parse_state(source);
        assert_eq!(diagram.notes.len(), 1);
        assert_eq!(diagram.notes[0].entity_code.as_deref(), Some("A"));
    }
}
