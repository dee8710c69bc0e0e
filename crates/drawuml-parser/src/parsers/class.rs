//! Построчный парсер Class Diagrams.
//!
//! Состояние: стек пакетов, режим тела сущности (члены, map-тело,
//! json-тело), многострочные заметки. Тело json собирается до
//! баланса скобок и разбирается через serde_json.

use regex::Regex;

use drawuml_model::class::{
    ClassDiagram, ClassEntity, ClassItem, ClassKind, ClassNote, JsonNode, MapEntry, Member,
    MemberKind, Package, Relationship, Separator, SeparatorStyle, Visibility,
};
use drawuml_model::common::NotePosition;

use crate::arrows::parse_link_token;
use crate::line::{clean_lines, split_name_alias, take_stereotype, take_trailing_color, unquote};

/// Парсит class diagram из исходного кода
pub fn parse_class(source: &str) -> ClassDiagram {
    let mut parser = ClassParser::new();
    for line in clean_lines(source) {
        parser.feed(&line);
    }
    parser.finish()
}

/// Режим разбора
enum Mode {
    Normal,
    /// Тело сущности: члены до `}`
    Body(String),
    /// Тело map: записи до `}`
    MapBody(String),
    /// Тело json: строки до баланса скобок
    JsonBody(String, i32, Vec<String>),
    /// Многострочная заметка
    Note,
    /// Многострочный заголовок
    Title,
}

struct Rules {
    title: Regex,
    hide: Regex,
    show: Regex,
    package: Regex,
    entity: Regex,
    lollipop: Regex,
    note_of: Regex,
    note_alias: Regex,
    note_on_link: Regex,
    relationship: Regex,
    separator: Regex,
}

impl Rules {
    fn new() -> Self {
        Self {
            title: Regex::new(r"^(?i)title\b\s*(.*)$").unwrap(),
            hide: Regex::new(r"^(?i)hide\s+(.+)$").unwrap(),
            show: Regex::new(r"^(?i)show\s+(.+)$").unwrap(),
            package: Regex::new(r"^(?i)(?:package|namespace)\s+(.+?)\s*\{$").unwrap(),
            entity: Regex::new(
                r"^(?i)(abstract\s+class|abstract|class|interface|enum|annotation|entity|protocol|struct|exception|metaclass|stereotype|dataclass|record|circle|diamond|object|map|json)\s+(.+)$",
            )
            .unwrap(),
            lollipop: Regex::new(r"^\(\)\s+(.+)$").unwrap(),
            note_of: Regex::new(
                r"^(?i)note\s+(left|right|top|bottom)(?:\s+of\s+([^:]+?))?(?:\s*:\s*(.*))?$",
            )
            .unwrap(),
            note_alias: Regex::new(r#"^(?i)note\s+"([^"]+)"\s+as\s+(\S+)\s*(#\S+)?$"#).unwrap(),
            note_on_link: Regex::new(r"^(?i)note\s+(?:(left|right|top|bottom)\s+)?on\s+link\s*(?::\s*(.*))?$").unwrap(),
            relationship: Regex::new(
                r#"^(?P<from>"[^"]+"|[\w.:]+)\s*(?:"(?P<ll>[^"]*)")?\s*(?P<link>\S*[-.=~]\S*)\s*(?:"(?P<rl>[^"]*)")?\s*(?P<to>"[^"]+"|[\w.:]+)\s*(?::\s*(?P<label>.*))?$"#,
            )
            .unwrap(),
            separator: Regex::new(r"^(--+|\.\.+|==+|__+)(?:\s*(.+?)\s*(--+|\.\.+|==+|__+))?$")
                .unwrap(),
        }
    }
}

struct ClassParser {
    diagram: ClassDiagram,
    package_stack: Vec<String>,
    mode: Mode,
    buffer: Vec<String>,
    pending_note: Option<ClassNote>,
    rules: Rules,
}

impl ClassParser {
    fn new() -> Self {
        Self {
            diagram: ClassDiagram::new(),
            package_stack: Vec::new(),
            mode: Mode::Normal,
            buffer: Vec::new(),
            pending_note: None,
            rules: Rules::new(),
        }
    }

    fn current_package(&self) -> Option<String> {
        self.package_stack.last().cloned()
    }

    /// Регистрирует сущность по ссылке; наследует текущий пакет
    fn ensure_entity(&mut self, code: &str) {
        if !self.diagram.entities.contains_key(code) {
            let mut entity = ClassEntity::new(code, code);
            entity.package_path = self.current_package();
            if let Some(path) = &entity.package_path {
                if let Some(pkg) = self.diagram.packages.get_mut(path) {
                    pkg.entities.push(code.to_string());
                }
            }
            self.diagram.add_entity(entity);
        }
    }

    fn feed(&mut self, line: &str) {
        match &mut self.mode {
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
            Mode::Body(code) => {
                if line == "}" {
                    self.mode = Mode::Normal;
                    return;
                }
                let code = code.clone();
                self.feed_member(&code, line);
            }
            Mode::MapBody(code) => {
                if line == "}" {
                    self.mode = Mode::Normal;
                    return;
                }
                let code = code.clone();
                self.feed_map_entry(&code, line);
            }
            Mode::JsonBody(code, depth, buf) => {
                buf.push(line.to_string());
                for c in line.chars() {
                    match c {
                        '{' | '[' => *depth += 1,
                        '}' | ']' => *depth -= 1,
                        _ => {}
                    }
                }
                if *depth <= 0 {
                    let code = code.clone();
                    let text = buf.join("\n");
                    // Последняя скобка закрывает тело сущности, не json
                    let trimmed = text.trim_end();
                    let text = trimmed.strip_suffix('}').unwrap_or(trimmed).trim();
                    if let Some(entity) = self.diagram.entities.get_mut(&code) {
                        entity.json_node = Some(parse_json_body(text));
                    }
                    self.mode = Mode::Normal;
                }
            }
            Mode::Normal => self.feed_normal(line),
        }
    }

    fn feed_normal(&mut self, line: &str) {
        if self.try_title(line)
            || self.try_hide_show(line)
            || self.try_package(line)
            || self.try_entity(line)
            || self.try_lollipop(line)
            || self.try_note(line)
            || self.try_relationship(line)
        {
            return;
        }
        // Закрытие пакета
        if line == "}" {
            self.package_stack.pop();
        }
        // Остальное пропускается молча (skinparam, scale, пустые правила)
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

    fn try_hide_show(&mut self, line: &str) -> bool {
        if let Some(caps) = self.rules.hide.captures(line) {
            match caps[1].trim().to_lowercase().as_str() {
                "empty members" => self.diagram.hidden_members.empty_members = true,
                "methods" => self.diagram.hidden_members.methods = true,
                "fields" | "attributes" => self.diagram.hidden_members.fields = true,
                "circle" | "circled character" => self.diagram.hidden_members.circle = true,
                "stereotypes" | "stereotype" => self.diagram.hidden_members.stereotypes = true,
                other => self.diagram.hidden_entities.push(other.to_string()),
            }
            return true;
        }
        if let Some(caps) = self.rules.show.captures(line) {
            match caps[1].trim().to_lowercase().as_str() {
                "methods" => self.diagram.hidden_members.methods = false,
                "fields" | "attributes" => self.diagram.hidden_members.fields = false,
                "circle" | "circled character" => self.diagram.hidden_members.circle = false,
                _ => {}
            }
            return true;
        }
        false
    }

    fn try_package(&mut self, line: &str) -> bool {
        let Some(caps) = self.rules.package.captures(line) else {
            return false;
        };
        let (rest, color) = take_trailing_color(caps[1].trim());
        let (rest, _stereo) = take_stereotype(&rest);
        let (display_name, code) = split_name_alias(&rest);
        let path = match self.current_package() {
            Some(parent) => format!("{}.{}", parent, code),
            None => code.clone(),
        };
        let mut package = Package::new(display_name, path.clone());
        package.parent = self.current_package();
        package.color = color;
        if let Some(parent) = &package.parent {
            if let Some(p) = self.diagram.packages.get_mut(parent) {
                p.sub_packages.push(path.clone());
            }
        }
        self.diagram.packages.insert(path.clone(), package);
        self.package_stack.push(path);
        true
    }

    fn try_entity(&mut self, line: &str) -> bool {
        let Some(caps) = self.rules.entity.captures(line) else {
            return false;
        };
        let keyword = caps[1].to_lowercase().split_whitespace().collect::<Vec<_>>().join(" ");
        let Some(kind) = ClassKind::parse(&keyword) else {
            return false;
        };
        let mut rest = caps[2].trim().to_string();

        let opens_body = rest.ends_with('{');
        if opens_body {
            rest = rest[..rest.len() - 1].trim().to_string();
        }

        let (rest, color) = take_trailing_color(&rest);
        let (rest, stereotype) = take_stereotype(&rest);

        // extends / implements в хвосте объявления
        let (rest, implements) = take_clause(&rest, "implements");
        let (rest, extends) = take_clause(&rest, "extends");

        // Обобщённые параметры сразу после имени
        let (rest, generics) = take_generics(&rest);

        let (display_name, code) = split_name_alias(rest.trim());
        if code.is_empty() {
            return false;
        }

        let mut entity = ClassEntity::new(code.clone(), display_name).with_kind(kind);
        entity.color = color;
        if let Some(s) = stereotype {
            entity.stereotypes.push(s);
        }
        entity.generic_params = generics;
        entity.extends = extends;
        entity.implements = implements;
        entity.package_path = self.current_package();
        if let Some(path) = &entity.package_path {
            if let Some(pkg) = self.diagram.packages.get_mut(path) {
                pkg.entities.push(code.clone());
            }
        }
        // Повторное объявление обновляет сущность на месте
        self.diagram.entities.insert(code.clone(), entity);

        if opens_body {
            self.mode = match kind {
                ClassKind::Map => Mode::MapBody(code),
                ClassKind::Json => Mode::JsonBody(code, 1, Vec::new()),
                _ => Mode::Body(code),
            };
        }
        true
    }

    fn try_lollipop(&mut self, line: &str) -> bool {
        let Some(caps) = self.rules.lollipop.captures(line) else {
            return false;
        };
        let (rest, color) = take_trailing_color(caps[1].trim());
        let (display_name, code) = split_name_alias(&rest);
        if code.is_empty() {
            return false;
        }
        let mut entity = ClassEntity::new(code, display_name).with_kind(ClassKind::LollipopFull);
        entity.color = color;
        entity.package_path = self.current_package();
        self.diagram.add_entity(entity);
        true
    }

    fn try_note(&mut self, line: &str) -> bool {
        if let Some(caps) = self.rules.note_alias.captures(line) {
            self.diagram.notes.push(ClassNote {
                position: NotePosition::Right,
                text: caps[1].to_string(),
                entity_code: None,
                alias: Some(caps[2].to_string()),
                color: caps.get(3).map(|m| m.as_str().into()),
                is_on_link: false,
                link_index: None,
            });
            return true;
        }
        if let Some(caps) = self.rules.note_on_link.captures(line) {
            let position = caps
                .get(1)
                .and_then(|m| NotePosition::parse(m.as_str()))
                .unwrap_or(NotePosition::Top);
            let link_index = self.diagram.relationships.len().checked_sub(1);
            let note = ClassNote {
                position,
                text: caps.get(2).map(|m| m.as_str().to_string()).unwrap_or_default(),
                entity_code: None,
                alias: None,
                color: None,
                is_on_link: true,
                link_index,
            };
            if caps.get(2).is_some() {
                self.diagram.notes.push(note);
            } else {
                self.pending_note = Some(note);
                self.mode = Mode::Note;
            }
            return true;
        }
        if let Some(caps) = self.rules.note_of.captures(line) {
            let position = NotePosition::parse(&caps[1]).unwrap_or_default();
            let entity_code = caps.get(2).map(|m| {
                let (rest, _) = take_trailing_color(m.as_str());
                unquote(&rest)
            });
            let note = ClassNote {
                position,
                text: caps.get(3).map(|m| m.as_str().to_string()).unwrap_or_default(),
                entity_code,
                alias: None,
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
            return true;
        }
        false
    }

    fn try_relationship(&mut self, line: &str) -> bool {
        let Some(caps) = self.rules.relationship.captures(line) else {
            return false;
        };
        let Some(link) = parse_link_token(caps.name("link").unwrap().as_str()) else {
            return false;
        };

        let raw_from = unquote(caps.name("from").unwrap().as_str());
        let raw_to = unquote(caps.name("to").unwrap().as_str());
        // Квалифицированная ассоциация `A::field` указывает на сущность A
        let (from, left_qualifier) = split_qualified(&raw_from);
        let (to, right_qualifier) = split_qualified(&raw_to);
        self.ensure_entity(&from);
        self.ensure_entity(&to);

        let mut rel = Relationship::new(from, to);
        rel.left_decor = link.left_decor;
        rel.right_decor = link.right_decor;
        rel.line_style = link.line_style;
        rel.direction = link.direction;
        rel.color = link.color;
        rel.left_label = caps.name("ll").map(|m| m.as_str().to_string());
        rel.right_label = caps.name("rl").map(|m| m.as_str().to_string());
        rel.left_qualifier = left_qualifier;
        rel.right_qualifier = right_qualifier;
        rel.label = caps.name("label").map(|m| {
            // Направляющий глиф в конце подписи отбрасывается
            m.as_str()
                .trim()
                .trim_end_matches(['<', '>'])
                .trim()
                .to_string()
        });
        self.diagram.add_relationship(rel);
        true
    }

    fn feed_member(&mut self, code: &str, line: &str) {
        if let Some(caps) = self.rules.separator.captures(line) {
            let style = match &caps[1][..1] {
                "." => SeparatorStyle::Dotted,
                "=" => SeparatorStyle::Double,
                "_" => SeparatorStyle::Thick,
                _ => SeparatorStyle::Solid,
            };
            let label = caps.get(2).map(|m| m.as_str().to_string());
            if let Some(entity) = self.diagram.entities.get_mut(code) {
                entity
                    .members
                    .push(ClassItem::Separator(Separator { label, style }));
            }
            return;
        }
        let member = parse_member(line);
        if let Some(entity) = self.diagram.entities.get_mut(code) {
            entity.members.push(ClassItem::Member(member));
        }
    }

    fn feed_map_entry(&mut self, code: &str, line: &str) {
        if let Some((key, value)) = line.split_once("=>") {
            if let Some(entity) = self.diagram.entities.get_mut(code) {
                entity.map_entries.push(MapEntry {
                    key: key.trim().to_string(),
                    value: Some(value.trim().to_string()),
                    linked_target: None,
                });
            }
            return;
        }
        // `key *--> Target` — запись со связью-вылетом
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() == 3 {
            if let Some(link) = parse_link_token(parts[1]) {
                let target = unquote(parts[2]);
                self.ensure_entity(&target);
                let mut rel = Relationship::new(code, target.clone());
                rel.left_decor = link.left_decor;
                rel.right_decor = link.right_decor;
                rel.line_style = link.line_style;
                self.diagram.add_relationship(rel);
                if let Some(entity) = self.diagram.entities.get_mut(code) {
                    entity.map_entries.push(MapEntry {
                        key: parts[0].to_string(),
                        value: None,
                        linked_target: Some(target),
                    });
                }
            }
        }
    }

    fn finish(mut self) -> ClassDiagram {
        // Неявное закрытие незавершённого json-тела
        if let Mode::JsonBody(code, _, buf) = &self.mode {
            if let Some(entity) = self.diagram.entities.get_mut(code) {
                entity.json_node = Some(parse_json_body(&buf.join("\n")));
            }
        }
        self.diagram
    }
}

/// Отрезает `extends A, B` / `implements X` из хвоста объявления
fn take_clause(s: &str, keyword: &str) -> (String, Vec<String>) {
    let lower = s.to_lowercase();
    let pat = format!(" {} ", keyword);
    if let Some(pos) = lower.find(&pat) {
        let names = s[pos + pat.len()..]
            .split(',')
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .collect();
        (s[..pos].trim().to_string(), names)
    } else {
        (s.to_string(), Vec::new())
    }
}

/// Отрезает обобщённые параметры `<T, U>` после имени
fn take_generics(s: &str) -> (String, Option<String>) {
    if let (Some(start), true) = (s.find('<'), s.ends_with('>')) {
        if !s[start..].starts_with("<<") {
            let generics = s[start + 1..s.len() - 1].to_string();
            return (s[..start].to_string(), Some(generics));
        }
    }
    (s.to_string(), None)
}

/// `A::field` -> (A, Some(field))
fn split_qualified(s: &str) -> (String, Option<String>) {
    match s.split_once("::") {
        Some((entity, member)) => (entity.to_string(), Some(member.to_string())),
        None => (s.to_string(), None),
    }
}

/// Разбирает строку члена сущности
fn parse_member(line: &str) -> Member {
    let raw_text = line.to_string();
    let mut rest = line.trim();

    let mut is_static = false;
    let mut is_abstract = false;
    let mut forced_kind: Option<MemberKind> = None;
    // Явные классификаторы {static}/{abstract}/{field}/{method}
    loop {
        let lower = rest.to_lowercase();
        if lower.starts_with("{static}") {
            is_static = true;
            rest = rest[8..].trim_start();
        } else if lower.starts_with("{abstract}") {
            is_abstract = true;
            rest = rest[10..].trim_start();
        } else if lower.starts_with("{field}") {
            forced_kind = Some(MemberKind::Field);
            rest = rest[7..].trim_start();
        } else if lower.starts_with("{method}") {
            forced_kind = Some(MemberKind::Method);
            rest = rest[8..].trim_start();
        } else {
            break;
        }
    }

    let mut visibility = Visibility::None;
    if let Some(first) = rest.chars().next() {
        if let Some(v) = Visibility::parse(first) {
            visibility = v;
            rest = rest[first.len_utf8()..].trim_start();
        }
    }

    let kind = forced_kind.unwrap_or(if rest.contains('(') {
        MemberKind::Method
    } else {
        MemberKind::Field
    });

    let (name, return_type, parameters) = match kind {
        MemberKind::Method => {
            let open = rest.find('(').unwrap_or(rest.len());
            let name = rest[..open].trim().to_string();
            let close = rest.rfind(')').unwrap_or(rest.len());
            let parameters = if open < close {
                Some(rest[open + 1..close].trim().to_string())
            } else {
                None
            };
            let tail = rest.get(close + 1..).unwrap_or("");
            let return_type = tail
                .trim()
                .strip_prefix(':')
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty());
            (name, return_type, parameters)
        }
        MemberKind::Field => match rest.split_once(':') {
            Some((name, ty)) => (
                name.trim().to_string(),
                Some(ty.trim().to_string()),
                None,
            ),
            None => (rest.trim().to_string(), None, None),
        },
    };

    Member {
        raw_text,
        kind,
        visibility,
        name,
        return_type,
        parameters,
        is_static,
        is_abstract,
    }
}

/// Разбирает текст json-тела; не-JSON текст даёт примитивный узел
fn parse_json_body(text: &str) -> JsonNode {
    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(value) => json_value_to_node(&value),
        Err(_) => JsonNode::Primitive(text.to_string()),
    }
}

fn json_value_to_node(value: &serde_json::Value) -> JsonNode {
    match value {
        serde_json::Value::Object(map) => JsonNode::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), json_value_to_node(v)))
                .collect(),
        ),
        serde_json::Value::Array(items) => {
            JsonNode::Array(items.iter().map(json_value_to_node).collect())
        }
        serde_json::Value::String(s) => JsonNode::Primitive(s.clone()),
        other => JsonNode::Primitive(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drawuml_model::common::{LineStyle, LinkDecor};

    #[test]
    fn test_parse_class_with_members() {
        let source = "@startuml\nclass Person {\n  +name : String\n  -age : int\n  +greet() : void\n}\n@enduml";
        let diagram = parse_class(source);
        assert_eq!(diagram.entities.len(), 1);
        let person = &diagram.entities["Person"];
        assert_eq!(person.kind, ClassKind::Class);
        assert_eq!(person.members.len(), 3);

        let fields: Vec<&Member> = person.fields().collect();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].name, "name");
        assert_eq!(fields[0].visibility, Visibility::Public);
        assert_eq!(fields[0].return_type.as_deref(), Some("String"));
        assert_eq!(fields[1].name, "age");
        assert_eq!(fields[1].visibility, Visibility::Private);

        let methods: Vec<&Member> = person.methods().collect();
        assert_eq!(methods.len(), 1);
        assert_eq!(methods[0].name, "greet");
        assert_eq!(methods[0].parameters.as_deref(), Some(""));
        assert_eq!(methods[0].return_type.as_deref(), Some("void"));
    }

    #[test]
    fn test_parse_inheritance() {
        let source = "@startuml\nclass Animal\nclass Dog\nAnimal <|-- Dog\n@enduml";
        let diagram = parse_class(source);
        assert_eq!(diagram.relationships.len(), 1);
        let rel = &diagram.relationships[0];
        assert_eq!(rel.from, "Animal");
        assert_eq!(rel.to, "Dog");
        assert_eq!(rel.left_decor, LinkDecor::Extension);
        assert_eq!(rel.line_style, LineStyle::Solid);
    }

    #[test]
    fn test_parse_realization_dashed() {
        let source = "@startuml\ninterface Comparable\nclass Item\nComparable <|.. Item\n@enduml";
        let diagram = parse_class(source);
        let rel = &diagram.relationships[0];
        assert_eq!(rel.left_decor, LinkDecor::Extension);
        assert_eq!(rel.line_style, LineStyle::Dashed);
        assert_eq!(diagram.entities["Comparable"].kind, ClassKind::Interface);
    }

    #[test]
    fn test_auto_created_entities() {
        let source = "@startuml\nFoo --> Bar : uses\n@enduml";
        let diagram = parse_class(source);
        assert_eq!(diagram.entities.len(), 2);
        assert_eq!(diagram.entities["Foo"].kind, ClassKind::Class);
        assert_eq!(diagram.relationships[0].label.as_deref(), Some("uses"));
    }

    #[test]
    fn test_cardinality_labels() {
        let source = "@startuml\nCustomer \"1\" --> \"many\" Order : places\n@enduml";
        let diagram = parse_class(source);
        let rel = &diagram.relationships[0];
        assert_eq!(rel.left_label.as_deref(), Some("1"));
        assert_eq!(rel.right_label.as_deref(), Some("many"));
        assert_eq!(rel.label.as_deref(), Some("places"));
    }

    #[test]
    fn test_packages_form_tree() {
        let source = "@startuml\npackage outer {\npackage inner {\nclass Deep\n}\n}\n@enduml";
        let diagram = parse_class(source);
        assert_eq!(diagram.packages.len(), 2);
        assert!(diagram.packages.contains_key("outer"));
        assert!(diagram.packages.contains_key("outer.inner"));
        assert_eq!(
            diagram.packages["outer.inner"].parent.as_deref(),
            Some("outer")
        );
        assert_eq!(
            diagram.entities["Deep"].package_path.as_deref(),
            Some("outer.inner")
        );
    }

    #[test]
    fn test_separators_in_body() {
        let source = "@startuml\nclass C {\n  a : int\n  -- group --\n  b : int\n}\n@enduml";
        let diagram = parse_class(source);
        let c = &diagram.entities["C"];
        assert_eq!(c.members.len(), 3);
        let ClassItem::Separator(sep) = &c.members[1] else {
            panic!("Expected Separator");
        };
        assert_eq!(sep.label.as_deref(), Some("group"));
        assert_eq!(sep.style, SeparatorStyle::Solid);
    }

    #[test]
    fn test_static_abstract_modifiers() {
        let source = "@startuml\nclass C {\n  {static} +count : int\n  {abstract} run()\n}\n@enduml";
        let diagram = parse_class(source);
        let c = &diagram.entities["C"];
        let fields: Vec<&Member> = c.fields().collect();
        assert!(fields[0].is_static);
        let methods: Vec<&Member> = c.methods().collect();
        assert!(methods[0].is_abstract);
    }

    #[test]
    fn test_generics_and_stereotype() {
        let source = "@startuml\nclass Container<T> <<collection>>\n@enduml";
        let diagram = parse_class(source);
        let c = &diagram.entities["Container"];
        assert_eq!(c.generic_params.as_deref(), Some("T"));
        assert_eq!(c.stereotypes, vec!["collection"]);
    }

    #[test]
    fn test_extends_implements_clause() {
        let source = "@startuml\nclass ArrayList extends AbstractList implements List, RandomAccess\n@enduml";
        let diagram = parse_class(source);
        let c = &diagram.entities["ArrayList"];
        assert_eq!(c.extends, vec!["AbstractList"]);
        assert_eq!(c.implements, vec!["List", "RandomAccess"]);
    }

    #[test]
    fn test_map_body() {
        let source = "@startuml\nmap Config {\n  host => localhost\n  db *--> Storage\n}\n@enduml";
        let diagram = parse_class(source);
        let config = &diagram.entities["Config"];
        assert_eq!(config.kind, ClassKind::Map);
        assert_eq!(config.map_entries.len(), 2);
        assert_eq!(config.map_entries[0].value.as_deref(), Some("localhost"));
        assert_eq!(config.map_entries[1].linked_target.as_deref(), Some("Storage"));
        // Связь-вылет тоже зарегистрирована
        assert_eq!(diagram.relationships.len(), 1);
        assert_eq!(diagram.relationships[0].to, "Storage");
    }

    #[test]
    fn test_json_body() {
        let source = "@startuml\njson Doc {\n{\"name\": \"test\", \"tags\": [\"a\", \"b\"]}\n}\n@enduml";
        let diagram = parse_class(source);
        let doc = &diagram.entities["Doc"];
        let Some(JsonNode::Object(entries)) = &doc.json_node else {
            panic!("Expected json Object, got {:?}", doc.json_node);
        };
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].0, "name");
    }

    #[test]
    fn test_hide_directives() {
        let source = "@startuml\nhide empty members\nhide methods\nclass A\n@enduml";
        let diagram = parse_class(source);
        assert!(diagram.hidden_members.empty_members);
        assert!(diagram.hidden_members.methods);
    }

    #[test]
    fn test_qualified_association() {
        let source = "@startuml\nOrder::customer --> Customer\n@enduml";
        let diagram = parse_class(source);
        let rel = &diagram.relationships[0];
        assert_eq!(rel.from, "Order");
        assert_eq!(rel.left_qualifier.as_deref(), Some("customer"));
        assert_eq!(rel.to, "Customer");
    }

    #[test]
    fn test_note_of_entity() {
        let source = "@startuml\nclass A\nnote right of A : полезная заметка\n@enduml";
        let diagram = parse_class(source);
        assert_eq!(diagram.notes.len(), 1);
        assert_eq!(diagram.notes[0].entity_code.as_deref(), Some("A"));
        assert_eq!(diagram.notes[0].position, NotePosition::Right);
    }
}
