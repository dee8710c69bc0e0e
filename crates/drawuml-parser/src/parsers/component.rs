//! Построчный парсер Component/Deployment и Use-Case диаграмм.
//!
//! Одно семейство моделей; use-case отличается типом по умолчанию для
//! авто-создаваемых элементов и сокращённой формой `:Актёр:` /
//! `(Прецедент)`. Контейнеры образуют дерево через явный стек.

use regex::Regex;

use drawuml_model::common::NotePosition;
use drawuml_model::component::{
    ComponentContainer, ComponentDiagram, ComponentElement, ComponentKind, ComponentNote,
    ComponentRelationship,
};

use crate::arrows::parse_link_token;
use crate::line::{clean_lines, split_name_alias, take_stereotype, take_trailing_color, unquote};

/// Парсит component/deployment diagram
pub fn parse_component(source: &str) -> ComponentDiagram {
    parse_with_default(source, ComponentKind::Component)
}

/// Парсит use-case diagram (авто-создание даёт usecase)
pub fn parse_usecase(source: &str) -> ComponentDiagram {
    parse_with_default(source, ComponentKind::UseCase)
}

fn parse_with_default(source: &str, default_kind: ComponentKind) -> ComponentDiagram {
    let mut parser = ComponentParser::new(default_kind);
    for line in clean_lines(source) {
        parser.feed(&line);
    }
    parser.finish()
}

enum Mode {
    Normal,
    Note,
    Title,
}

struct Rules {
    title: Regex,
    direction: Regex,
    container: Regex,
    element: Regex,
    iface_shorthand: Regex,
    actor_shorthand: Regex,
    usecase_shorthand: Regex,
    component_shorthand: Regex,
    note_of: Regex,
    note_alias: Regex,
    relationship: Regex,
}

impl Rules {
    fn new() -> Self {
        Self {
            title: Regex::new(r"^(?i)title\b\s*(.*)$").unwrap(),
            direction: Regex::new(r"^(?i)(left\s+to\s+right|top\s+to\s+bottom)\s+direction$")
                .unwrap(),
            container: Regex::new(
                r"^(?i)(package|node|cloud|database|folder|frame|rectangle|card|storage|artifact|hexagon|queue|stack|agent|boundary|component)\s+(.+?)\s*\{$",
            )
            .unwrap(),
            element: Regex::new(
                r"^(?i)(component|interface|actor/|actor|usecase/|usecase|agent|artifact|boundary|card|circle|cloud|collections|control|database|entity|file|folder|frame|hexagon|label|node|package|person|process|queue|rectangle|stack|storage|datastore)\s+(.+)$",
            )
            .unwrap(),
            iface_shorthand: Regex::new(r"^\(\)\s+(.+)$").unwrap(),
            actor_shorthand: Regex::new(r"^:([^:]+):(/)?(?:\s+as\s+(\S+))?\s*(#\S+)?$").unwrap(),
            usecase_shorthand: Regex::new(r"^\(([^)]+)\)(/)?(?:\s+as\s+(\S+))?\s*(#\S+)?$")
                .unwrap(),
            component_shorthand: Regex::new(r"^\[([^\]]+)\](?:\s+as\s+(\S+))?\s*(#\S+)?$").unwrap(),
            note_of: Regex::new(
                r"^(?i)note\s+(left|right|top|bottom)(?:\s+of\s+([^:]+?))?(?:\s*:\s*(.*))?$",
            )
            .unwrap(),
            note_alias: Regex::new(r#"^(?i)note\s+"([^"]+)"\s+as\s+(\S+)\s*(#\S+)?$"#).unwrap(),
            relationship: Regex::new(
                r#"^(?P<from>"[^"]+"|\[[^\]]+\]|\([^)]+\)|:[^:]+:|[\w.]+)\s*(?P<link>\S*[-.=~]\S*)\s*(?P<to>"[^"]+"|\[[^\]]+\]|\([^)]+\)|:[^:]+:|[\w.]+)\s*(?::\s*(?P<label>.*))?$"#,
            )
            .unwrap(),
        }
    }
}

struct ComponentParser {
    diagram: ComponentDiagram,
    default_kind: ComponentKind,
    container_stack: Vec<String>,
    mode: Mode,
    buffer: Vec<String>,
    pending_note: Option<ComponentNote>,
    rules: Rules,
}

impl ComponentParser {
    fn new(default_kind: ComponentKind) -> Self {
        Self {
            diagram: ComponentDiagram::new(),
            default_kind,
            container_stack: Vec::new(),
            mode: Mode::Normal,
            buffer: Vec::new(),
            pending_note: None,
            rules: Rules::new(),
        }
    }

    fn current_container(&self) -> Option<String> {
        self.container_stack.last().cloned()
    }

    /// Регистрирует элемент; путь контейнера записывается при создании
    fn add_element(&mut self, mut element: ComponentElement) {
        element.container_path = self.current_container();
        if let Some(path) = &element.container_path {
            if let Some(container) = self.diagram.containers.get_mut(path) {
                container.children.push(element.code.clone());
            }
        }
        self.diagram.add_element(element);
    }

    /// Разрешает ссылку из строки связи в код элемента
    /// (авто-создание с типом по сокращённой форме)
    fn resolve_ref(&mut self, token: &str) -> String {
        let (display, kind) = if let Some(inner) = strip_wrap(token, '[', ']') {
            (inner, ComponentKind::Component)
        } else if let Some(inner) = strip_wrap(token, '(', ')') {
            (inner, ComponentKind::UseCase)
        } else if let Some(inner) = strip_wrap(token, ':', ':') {
            (inner, ComponentKind::Actor)
        } else {
            (unquote(token), self.default_kind)
        };

        // Сначала ищем по коду, затем по отображаемому имени
        if self.diagram.elements.contains_key(&display)
            || self.diagram.containers.contains_key(&display)
        {
            return display;
        }
        if let Some(found) = self
            .diagram
            .elements
            .values()
            .find(|e| e.display_name == display)
        {
            return found.code.clone();
        }
        let code = drawuml_model::code_from_name(&display);
        if !self.diagram.elements.contains_key(&code) {
            self.add_element(ComponentElement::new(code.clone(), display, kind));
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
        if self.try_title(line)
            || self.try_direction(line)
            || self.try_container(line)
            || self.try_element(line)
            || self.try_shorthand(line)
            || self.try_note(line)
            || self.try_relationship(line)
        {
            return;
        }
        if line == "}" {
            self.container_stack.pop();
        }
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
        self.diagram.left_to_right = caps[1].to_lowercase().starts_with("left");
        true
    }

    fn try_container(&mut self, line: &str) -> bool {
        let Some(caps) = self.rules.container.captures(line) else {
            return false;
        };
        let Some(kind) = ComponentKind::parse(&caps[1]) else {
            return false;
        };
        if !kind.is_container() {
            return false;
        }
        let (rest, color) = take_trailing_color(caps[2].trim());
        let (rest, stereotype) = take_stereotype(&rest);
        let (display_name, code) = split_name_alias(&rest);
        let path = match self.current_container() {
            Some(parent) => format!("{}.{}", parent, code),
            None => code.clone(),
        };
        let mut container = ComponentContainer::new(code, display_name, kind, path.clone());
        container.parent = self.current_container();
        container.color = color;
        container.stereotype = stereotype;
        if let Some(parent) = &container.parent {
            if let Some(p) = self.diagram.containers.get_mut(parent) {
                p.sub_containers.push(path.clone());
            }
        }
        self.diagram.containers.insert(path.clone(), container);
        self.container_stack.push(path);
        true
    }

    fn try_element(&mut self, line: &str) -> bool {
        let Some(caps) = self.rules.element.captures(line) else {
            return false;
        };
        let Some(kind) = ComponentKind::parse(&caps[1].to_lowercase()) else {
            return false;
        };
        let (rest, color) = take_trailing_color(caps[2].trim());
        let (rest, stereotype) = take_stereotype(&rest);
        let (display_name, code) = split_name_alias(&rest);
        if code.is_empty() {
            return false;
        }
        let mut element = ComponentElement::new(code, display_name, kind);
        element.color = color;
        element.stereotype = stereotype;
        self.add_element(element);
        true
    }

    fn try_shorthand(&mut self, line: &str) -> bool {
        if let Some(caps) = self.rules.iface_shorthand.captures(line) {
            let (rest, color) = take_trailing_color(caps[1].trim());
            let (display_name, code) = split_name_alias(&rest);
            let mut element = ComponentElement::new(code, display_name, ComponentKind::Interface);
            element.color = color;
            self.add_element(element);
            return true;
        }

        // Сокращённые объявления: [Component], :Актёр:, (Прецедент);
        // суффикс `/` выбирает business-вариант
        let parsed = if let Some(caps) = self.rules.component_shorthand.captures(line) {
            Some((
                unquote(caps[1].trim()),
                ComponentKind::Component,
                caps.get(2).map(|m| m.as_str().to_string()),
                caps.get(3).map(|m| m.as_str().to_string()),
            ))
        } else if let Some(caps) = self.rules.actor_shorthand.captures(line) {
            let kind = if caps.get(2).is_some() {
                ComponentKind::ActorBusiness
            } else {
                ComponentKind::Actor
            };
            Some((
                unquote(caps[1].trim()),
                kind,
                caps.get(3).map(|m| m.as_str().to_string()),
                caps.get(4).map(|m| m.as_str().to_string()),
            ))
        } else if let Some(caps) = self.rules.usecase_shorthand.captures(line) {
            let kind = if caps.get(2).is_some() {
                ComponentKind::UseCaseBusiness
            } else {
                ComponentKind::UseCase
            };
            Some((
                unquote(caps[1].trim()),
                kind,
                caps.get(3).map(|m| m.as_str().to_string()),
                caps.get(4).map(|m| m.as_str().to_string()),
            ))
        } else {
            None
        };

        let Some((display, kind, alias, color)) = parsed else {
            return false;
        };
        let code = alias.unwrap_or_else(|| drawuml_model::code_from_name(&display));
        let mut element = ComponentElement::new(code, display, kind);
        element.color = color.map(|c| c.as_str().into());
        self.add_element(element);
        true
    }

    fn try_note(&mut self, line: &str) -> bool {
        if let Some(caps) = self.rules.note_alias.captures(line) {
            self.diagram.notes.push(ComponentNote {
                position: NotePosition::Right,
                text: caps[1].to_string(),
                entity_code: None,
                color: caps.get(3).map(|m| m.as_str().into()),
                is_on_link: false,
                link_index: None,
            });
            return true;
        }
        let Some(caps) = self.rules.note_of.captures(line) else {
            return false;
        };
        let position = NotePosition::parse(&caps[1]).unwrap_or_default();
        let entity_code = caps.get(2).map(|m| {
            let token = m.as_str().trim();
            self.resolve_ref(token)
        });
        let note = ComponentNote {
            position,
            text: caps.get(3).map(|m| m.as_str().to_string()).unwrap_or_default(),
            entity_code,
            color: None,
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

    fn try_relationship(&mut self, line: &str) -> bool {
        let Some(caps) = self.rules.relationship.captures(line) else {
            return false;
        };
        let Some(link) = parse_link_token(caps.name("link").unwrap().as_str()) else {
            return false;
        };
        let from = self.resolve_ref(caps.name("from").unwrap().as_str());
        let to = self.resolve_ref(caps.name("to").unwrap().as_str());

        let mut rel = ComponentRelationship::new(from, to);
        rel.left_decor = link.left_decor;
        rel.right_decor = link.right_decor;
        rel.line_style = link.line_style;
        rel.direction = link.direction;
        rel.color = link.color;
        rel.label = caps.name("label").map(|m| {
            m.as_str()
                .trim()
                .trim_end_matches(['<', '>'])
                .trim()
                .to_string()
        });
        self.diagram.add_relationship(rel);
        true
    }

    fn finish(self) -> ComponentDiagram {
        self.diagram
    }
}

/// Снимает одиночную обёртку `[x]` / `(x)` / `:x:`
fn strip_wrap(token: &str, open: char, close: char) -> Option<String> {
    let t = token.trim();
    if t.len() >= 2 && t.starts_with(open) && t.ends_with(close) {
        Some(t[open.len_utf8()..t.len() - close.len_utf8()].trim().to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drawuml_model::common::{LineStyle, LinkDecor};

    #[test]
    fn test_usecase_with_extends() {
        let source = "@startuml\n:Customer: --> (Place order)\n(Place order) <.. (Validate) : extends\n@enduml";
        let diagram = parse_usecase(source);
        assert_eq!(diagram.elements.len(), 3);
        assert_eq!(diagram.elements["Customer"].kind, ComponentKind::Actor);
        assert_eq!(diagram.elements["Placeorder"].kind, ComponentKind::UseCase);
        assert_eq!(diagram.elements["Placeorder"].display_name, "Place order");
        assert_eq!(diagram.elements["Validate"].kind, ComponentKind::UseCase);

        assert_eq!(diagram.relationships.len(), 2);
        let assoc = &diagram.relationships[0];
        assert_eq!(assoc.from, "Customer");
        assert_eq!(assoc.to, "Placeorder");
        let ext = &diagram.relationships[1];
        assert_eq!(ext.line_style, LineStyle::Dashed);
        assert_eq!(ext.left_decor, LinkDecor::Arrow);
        assert_eq!(ext.label.as_deref(), Some("extends"));
    }

    #[test]
    fn test_component_shorthand() {
        let source = "@startuml\n[Web Server] as WS\n[Database]\nWS --> [Database]: queries\n@enduml";
        let diagram = parse_component(source);
        assert_eq!(diagram.elements["WS"].display_name, "Web Server");
        assert_eq!(diagram.elements["Database"].kind, ComponentKind::Component);
        assert_eq!(diagram.relationships.len(), 1);
        assert_eq!(diagram.relationships[0].from, "WS");
        assert_eq!(diagram.relationships[0].to, "Database");
    }

    #[test]
    fn test_container_tree() {
        let source = "@startuml\npackage \"Backend\" as BE {\nnode Server {\n[App]\n}\n}\n@enduml";
        let diagram = parse_component(source);
        assert_eq!(diagram.containers.len(), 2);
        assert!(diagram.containers.contains_key("BE"));
        assert!(diagram.containers.contains_key("BE.Server"));
        assert_eq!(
            diagram.containers["BE.Server"].parent.as_deref(),
            Some("BE")
        );
        assert_eq!(
            diagram.elements["App"].container_path.as_deref(),
            Some("BE.Server")
        );
        assert_eq!(diagram.containers["BE.Server"].children, vec!["App"]);
    }

    #[test]
    fn test_element_keywords() {
        let source = "@startuml\ncomponent API\nactor User\ndatabase Store\ncloud Net\n@enduml";
        let diagram = parse_component(source);
        assert_eq!(diagram.elements["API"].kind, ComponentKind::Component);
        assert_eq!(diagram.elements["User"].kind, ComponentKind::Actor);
        assert_eq!(diagram.elements["Store"].kind, ComponentKind::Database);
        assert_eq!(diagram.elements["Net"].kind, ComponentKind::Cloud);
    }

    #[test]
    fn test_business_variants() {
        let source = "@startuml\n:Клиент:/ as C\n(Оплата)/ as P\n@enduml";
        let diagram = parse_usecase(source);
        assert_eq!(diagram.elements["C"].kind, ComponentKind::ActorBusiness);
        assert_eq!(diagram.elements["P"].kind, ComponentKind::UseCaseBusiness);
    }

    #[test]
    fn test_interface_shorthand() {
        let source = "@startuml\n() \"Data Access\" as DA\n[Service] --> DA\n@enduml";
        let diagram = parse_component(source);
        assert_eq!(diagram.elements["DA"].kind, ComponentKind::Interface);
        assert_eq!(diagram.relationships[0].to, "DA");
    }

    #[test]
    fn test_left_to_right_direction() {
        let source = "@startuml\nleft to right direction\n[A] --> [B]\n@enduml";
        let diagram = parse_component(source);
        assert!(diagram.left_to_right);
    }

    #[test]
    fn test_note_of_element() {
        let source = "@startuml\n[Core]\nnote right of Core : центральный модуль\n@enduml";
        let diagram = parse_component(source);
        assert_eq!(diagram.notes.len(), 1);
        assert_eq!(diagram.notes[0].entity_code.as_deref(), Some("Core"));
    }

    #[test]
    fn test_stereotype_on_element() {
        let source = "@startuml\ncomponent Gateway <<proxy>> #LightGreen\n@enduml";
        let diagram = parse_component(source);
        let g = &diagram.elements["Gateway"];
        assert_eq!(g.stereotype.as_deref(), Some("proxy"));
        assert!(g.color.is_some());
    }

    #[test]
    fn test_deployment_keywords() {
        let source = "@startuml\nnode Host {\nartifact app.jar\n}\nHost --> Cloud9\n@enduml";
        let diagram = parse_component(source);
        assert!(diagram.containers.contains_key("Host"));
        assert_eq!(diagram.elements["app.jar"].kind, ComponentKind::Artifact);
    }
}
