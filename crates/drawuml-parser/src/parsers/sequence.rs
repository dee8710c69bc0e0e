//! Построчный парсер Sequence Diagrams.
//!
//! Один проход по строкам; состояние парсера — стек фрагментов,
//! открытый box, режим многострочного блока. Нераспознанные строки
//! молча пропускаются.

use regex::Regex;

use drawuml_model::common::{Color, LineStyle, NotePosition};
use drawuml_model::sequence::{
    ArrowConfig, ArrowHead, AutoNumber, AutoNumberCommand, Delay, Divider, ExoKind, ExoMessage,
    Fragment, FragmentKind, FragmentSection, HSpace, LifeEvent, LifeEventKind, Message,
    Participant, ParticipantBox, ParticipantKind, Reference, SequenceDiagram, SequenceElement,
    SequenceNote, SequenceNoteStyle,
};

use crate::arrows::parse_arrow;
use crate::line::{clean_lines, split_name_alias, take_trailing_color, unquote};

/// Парсит sequence diagram из исходного кода
pub fn parse_sequence(source: &str) -> SequenceDiagram {
    let mut parser = SequenceParser::new();
    for line in clean_lines(source) {
        parser.feed(&line);
    }
    parser.finish()
}

/// Кадр стека фрагментов
struct FragmentFrame {
    kind: FragmentKind,
    label: Option<String>,
    color: Option<Color>,
    sections: Vec<FragmentSection>,
    current_condition: Option<String>,
    current_elements: Vec<SequenceElement>,
}

/// Режим многострочного блока
#[derive(PartialEq)]
enum Mode {
    Normal,
    Note,
    Ref,
    Title,
}

/// Скомпилированные правила
struct Rules {
    participant: Regex,
    create: Regex,
    activate: Regex,
    deactivate: Regex,
    destroy: Regex,
    fragment_start: Regex,
    fragment_else: Regex,
    box_start: Regex,
    note_single: Regex,
    note_multi: Regex,
    ref_start: Regex,
    divider: Regex,
    delay: Regex,
    hspace: Regex,
    autonumber: Regex,
    title: Regex,
    return_msg: Regex,
    exo_left: Regex,
    exo_right: Regex,
    message: Regex,
}

impl Rules {
    fn new() -> Self {
        Self {
            participant: Regex::new(
                r"^(?i)(participant|actor|boundary|control|entity|queue|database|collections)\s+(.+)$",
            )
            .unwrap(),
            create: Regex::new(
                r"^(?i)create\s+(?:(participant|actor|boundary|control|entity|queue|database|collections)\s+)?(.+)$",
            )
            .unwrap(),
            activate: Regex::new(r"^(?i)activate\s+(\S+)\s*(#\S+)?$").unwrap(),
            deactivate: Regex::new(r"^(?i)deactivate\s+(\S+)$").unwrap(),
            destroy: Regex::new(r"^(?i)destroy\s+(\S+)$").unwrap(),
            fragment_start: Regex::new(r"^(?i)(alt|opt|loop|par|break|critical|group)\b\s*(.*)$")
                .unwrap(),
            fragment_else: Regex::new(r"^(?i)else\b\s*(.*)$").unwrap(),
            box_start: Regex::new(r"^(?i)box\b\s*(.*)$").unwrap(),
            note_single: Regex::new(
                r"^(?i)(note|hnote|rnote)\s+(left|right|over|across)\s*(?:of\s+)?([^:]*?)\s*:\s*(.*)$",
            )
            .unwrap(),
            note_multi: Regex::new(
                r"^(?i)(note|hnote|rnote)\s+(left|right|over|across)\s*(?:of\s+)?([^:]*)$",
            )
            .unwrap(),
            ref_start: Regex::new(r"^(?i)ref\s+over\s+([^:]+?)(?:\s*:\s*(.*))?$").unwrap(),
            divider: Regex::new(r"^==+\s*(.*?)\s*==*$").unwrap(),
            delay: Regex::new(r"^\.\.\.(?:\s*(.*?)\s*\.\.\.)?$").unwrap(),
            hspace: Regex::new(r"^\|\|(?:(\d+)\|\|)?\|?$").unwrap(),
            autonumber: Regex::new(r"^(?i)autonumber\b\s*(.*)$").unwrap(),
            title: Regex::new(r"^(?i)title\b\s*(.*)$").unwrap(),
            return_msg: Regex::new(r"^(?i)return\b\s*(.*)$").unwrap(),
            exo_left: Regex::new(
                r#"^\[([<>ox\\/=.-]+)\s*("[^"]+"|[\w.@]+)\s*(?::\s*(.*))?$"#,
            )
            .unwrap(),
            exo_right: Regex::new(
                r#"^("[^"]+"|[\w.@]+)\s*([<>ox\\/=.-]+)\]\s*(?::\s*(.*))?$"#,
            )
            .unwrap(),
            message: Regex::new(
                r#"^(?P<par>&)?\s*(?P<from>"[^"]+"|[\w.@]+)\s*(?P<arrow>[<>ox\\/]*(?:[-=.]|\[[^\]]*\])+[<>ox\\/]*)\s*(?P<to>"[^"]+"|[\w.@]+)(?P<rest>(?:\s*&\s*(?:"[^"]+"|[\w.@]+))*)\s*(?P<suffix>\+\+--|--\+\+|\+\+|--|\*\*|!!)?\s*(?::\s*(?P<label>.*))?$"#,
            )
            .unwrap(),
        }
    }
}

/// Построчный парсер с состоянием
struct SequenceParser {
    diagram: SequenceDiagram,
    fragments: Vec<FragmentFrame>,
    open_box: Option<ParticipantBox>,
    mode: Mode,
    buffer: Vec<String>,
    pending_note: Option<SequenceNote>,
    pending_ref: Option<Reference>,
    rules: Rules,
}

impl SequenceParser {
    fn new() -> Self {
        Self {
            diagram: SequenceDiagram::new(),
            fragments: Vec::new(),
            open_box: None,
            mode: Mode::Normal,
            buffer: Vec::new(),
            pending_note: None,
            pending_ref: None,
            rules: Rules::new(),
        }
    }

    /// Добавляет элемент в текущую секцию фрагмента или в диаграмму
    fn push_element(&mut self, element: SequenceElement) {
        if let Some(frame) = self.fragments.last_mut() {
            frame.current_elements.push(element);
        } else {
            self.diagram.add_element(element);
        }
    }

    /// Регистрирует участника по ссылке из сообщения
    fn ensure_participant(&mut self, code: &str) {
        if !self.diagram.participants.contains_key(code) {
            self.diagram.ensure_participant(code);
            if let Some(open) = &mut self.open_box {
                open.participants.push(code.to_string());
            }
        }
    }

    fn feed(&mut self, line: &str) {
        match self.mode {
            Mode::Note => {
                let lower = line.to_lowercase();
                if lower == "end note" || lower == "end hnote" || lower == "end rnote" {
                    if let Some(mut note) = self.pending_note.take() {
                        note.text = self.buffer.join("\n");
                        self.push_element(SequenceElement::Note(note));
                    }
                    self.buffer.clear();
                    self.mode = Mode::Normal;
                } else {
                    self.buffer.push(line.to_string());
                }
            }
            Mode::Ref => {
                if line.to_lowercase() == "end ref" {
                    if let Some(mut r) = self.pending_ref.take() {
                        r.text = self.buffer.join("\n");
                        self.push_element(SequenceElement::Reference(r));
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
        // Порядок правил фиксирован: первое сработавшее выигрывает
        if self.try_title(line)
            || self.try_autonumber(line)
            || self.try_box(line)
            || self.try_participant(line)
            || self.try_create(line)
            || self.try_life_event(line)
            || self.try_fragment(line)
            || self.try_note(line)
            || self.try_ref(line)
            || self.try_divider(line)
            || self.try_delay(line)
            || self.try_hspace(line)
            || self.try_return(line)
            || self.try_exo(line)
            || self.try_message(line)
        {
            return;
        }
        // Нераспознанная строка пропускается молча
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

    fn try_autonumber(&mut self, line: &str) -> bool {
        let Some(caps) = self.rules.autonumber.captures(line) else {
            return false;
        };
        let rest = caps[1].trim();
        let lower = rest.to_lowercase();
        let command = if lower == "stop" {
            AutoNumberCommand::Stop
        } else if lower.starts_with("resume") {
            AutoNumberCommand::Resume
        } else {
            let mut auto = AutoNumber::default();
            let mut nums: Vec<u32> = Vec::new();
            for token in rest.split_whitespace() {
                if let Some(fmt) = token.strip_prefix('"') {
                    auto.format = Some(fmt.trim_end_matches('"').to_string());
                } else if let Ok(n) = token.parse() {
                    nums.push(n);
                }
            }
            if let Some(start) = nums.first() {
                auto.start = *start;
            }
            if let Some(step) = nums.get(1) {
                auto.step = *step;
            }
            if self.diagram.autonumber.is_none() {
                self.diagram.autonumber = Some(auto.clone());
            }
            AutoNumberCommand::Start(auto)
        };
        self.push_element(SequenceElement::Autonumber(command));
        true
    }

    fn try_box(&mut self, line: &str) -> bool {
        let lower = line.to_lowercase();
        if lower == "end box" {
            if let Some(done) = self.open_box.take() {
                self.diagram.boxes.push(done);
            }
            return true;
        }
        // `box` не должен красть `boundary ...` и сообщения от участника box
        let Some(caps) = self.rules.box_start.captures(line) else {
            return false;
        };
        if lower.starts_with("box") && (line.len() == 3 || line[3..].starts_with(' ')) {
            let (rest, color) = take_trailing_color(caps[1].trim());
            let title = if rest.is_empty() {
                None
            } else {
                Some(unquote(&rest))
            };
            self.open_box = Some(ParticipantBox {
                title,
                color,
                participants: Vec::new(),
            });
            return true;
        }
        false
    }

    fn try_participant(&mut self, line: &str) -> bool {
        let Some(caps) = self.rules.participant.captures(line) else {
            return false;
        };
        let kind = ParticipantKind::parse(&caps[1]).unwrap_or_default();
        let mut rest = caps[2].trim().to_string();

        // Вырезается только сам фрагмент `order N`; хвост (цвет,
        // стереотип) сохраняется
        let mut order = None;
        if let Some(pos) = rest.to_lowercase().rfind(" order ") {
            let after = rest[pos + 7..].trim_start().to_string();
            let digits: String = after.chars().take_while(|c| c.is_ascii_digit()).collect();
            if !digits.is_empty() {
                order = digits.parse().ok();
                rest = format!("{} {}", rest[..pos].trim_end(), after[digits.len()..].trim())
                    .trim()
                    .to_string();
            }
        }
        let (rest, color) = take_trailing_color(&rest);
        let (rest, stereotype) = crate::line::take_stereotype(&rest);
        let (display_name, code) = split_name_alias(&rest);
        if code.is_empty() {
            return false;
        }

        let mut participant = Participant::new(code.clone(), display_name).with_kind(kind);
        participant.order = order;
        participant.color = color;
        participant.stereotype = stereotype;
        // Повторное объявление сохраняет позицию первого появления
        if let Some(existing) = self.diagram.participants.get_mut(&code) {
            *existing = participant;
        } else {
            self.diagram.add_participant(participant);
            if let Some(open) = &mut self.open_box {
                open.participants.push(code);
            }
        }
        true
    }

    fn try_create(&mut self, line: &str) -> bool {
        let Some(caps) = self.rules.create.captures(line) else {
            return false;
        };
        let kind = caps
            .get(1)
            .and_then(|m| ParticipantKind::parse(m.as_str()))
            .unwrap_or_default();
        let (display_name, code) = split_name_alias(caps[2].trim());
        self.ensure_participant(&code);
        if let Some(p) = self.diagram.participants.get_mut(&code) {
            p.is_created = true;
            p.kind = kind;
            p.display_name = display_name;
        }
        self.push_element(SequenceElement::Life(LifeEvent {
            participant: code,
            kind: LifeEventKind::Create,
            color: None,
        }));
        true
    }

    fn try_life_event(&mut self, line: &str) -> bool {
        if let Some(caps) = self.rules.activate.captures(line) {
            let code = caps[1].to_string();
            let color = caps.get(2).map(|m| Color::parse(m.as_str()));
            self.ensure_participant(&code);
            self.push_element(SequenceElement::Life(LifeEvent {
                participant: code,
                kind: LifeEventKind::Activate,
                color,
            }));
            return true;
        }
        if let Some(caps) = self.rules.deactivate.captures(line) {
            let code = caps[1].to_string();
            self.push_element(SequenceElement::Life(LifeEvent {
                participant: code,
                kind: LifeEventKind::Deactivate,
                color: None,
            }));
            return true;
        }
        if let Some(caps) = self.rules.destroy.captures(line) {
            let code = caps[1].to_string();
            self.ensure_participant(&code);
            self.push_element(SequenceElement::Life(LifeEvent {
                participant: code,
                kind: LifeEventKind::Destroy,
                color: None,
            }));
            return true;
        }
        false
    }

    fn try_fragment(&mut self, line: &str) -> bool {
        if line.to_lowercase() == "end" {
            if let Some(frame) = self.fragments.pop() {
                let mut sections = frame.sections;
                sections.push(FragmentSection {
                    condition: frame.current_condition,
                    elements: frame.current_elements,
                });
                let fragment = Fragment {
                    kind: frame.kind,
                    label: frame.label,
                    sections,
                    color: frame.color,
                };
                self.push_element(SequenceElement::Fragment(fragment));
            }
            return true;
        }
        if let Some(caps) = self.rules.fragment_else.captures(line) {
            if let Some(frame) = self.fragments.last_mut() {
                let condition = frame.current_condition.take();
                let elements = std::mem::take(&mut frame.current_elements);
                frame.sections.push(FragmentSection {
                    condition,
                    elements,
                });
                let new_condition = caps[1].trim();
                frame.current_condition = if new_condition.is_empty() {
                    None
                } else {
                    Some(new_condition.to_string())
                };
                return true;
            }
            return false;
        }
        let Some(caps) = self.rules.fragment_start.captures(line) else {
            return false;
        };
        let Some(kind) = FragmentKind::parse(&caps[1]) else {
            return false;
        };
        let (rest, color) = take_trailing_color(caps[2].trim());
        let label = if rest.is_empty() { None } else { Some(rest) };
        self.fragments.push(FragmentFrame {
            kind,
            label: label.clone(),
            color,
            sections: Vec::new(),
            current_condition: label,
            current_elements: Vec::new(),
        });
        true
    }

    fn try_note(&mut self, line: &str) -> bool {
        if let Some(caps) = self.rules.note_single.captures(line) {
            let note = self.build_note(&caps[1], &caps[2], &caps[3], Some(caps[4].to_string()));
            self.push_element(SequenceElement::Note(note));
            return true;
        }
        if let Some(caps) = self.rules.note_multi.captures(line) {
            let note = self.build_note(&caps[1], &caps[2], &caps[3], None);
            self.pending_note = Some(note);
            self.mode = Mode::Note;
            return true;
        }
        false
    }

    fn build_note(
        &mut self,
        style: &str,
        position: &str,
        anchors: &str,
        text: Option<String>,
    ) -> SequenceNote {
        let style = match style.to_lowercase().as_str() {
            "hnote" => SequenceNoteStyle::HNote,
            "rnote" => SequenceNoteStyle::RNote,
            _ => SequenceNoteStyle::Note,
        };
        let position_lower = position.to_lowercase();
        let is_across = position_lower == "across";
        let position = NotePosition::parse(&position_lower).unwrap_or(NotePosition::Over);
        let (anchors, color) = take_trailing_color(anchors);
        let participants: Vec<String> = anchors
            .split(',')
            .map(|s| unquote(s.trim()))
            .filter(|s| !s.is_empty())
            .collect();
        for code in &participants {
            self.ensure_participant(code);
        }
        SequenceNote {
            participants,
            position,
            text: text.unwrap_or_default(),
            style,
            color,
            is_across,
        }
    }

    fn try_ref(&mut self, line: &str) -> bool {
        let Some(caps) = self.rules.ref_start.captures(line) else {
            return false;
        };
        let (anchors, color) = take_trailing_color(caps[1].trim());
        let participants: Vec<String> = anchors
            .split(',')
            .map(|s| unquote(s.trim()))
            .filter(|s| !s.is_empty())
            .collect();
        for code in &participants {
            self.ensure_participant(code);
        }
        let reference = Reference {
            participants,
            text: caps.get(2).map(|m| m.as_str().to_string()).unwrap_or_default(),
            color,
        };
        if caps.get(2).is_some() {
            self.push_element(SequenceElement::Reference(reference));
        } else {
            self.pending_ref = Some(reference);
            self.mode = Mode::Ref;
        }
        true
    }

    fn try_divider(&mut self, line: &str) -> bool {
        if !line.starts_with("==") {
            return false;
        }
        let Some(caps) = self.rules.divider.captures(line) else {
            return false;
        };
        self.push_element(SequenceElement::Divider(Divider {
            label: caps[1].trim().to_string(),
        }));
        true
    }

    fn try_delay(&mut self, line: &str) -> bool {
        if !line.starts_with("...") {
            return false;
        }
        let Some(caps) = self.rules.delay.captures(line) else {
            return false;
        };
        let label = caps
            .get(1)
            .map(|m| m.as_str().trim().to_string())
            .filter(|s| !s.is_empty());
        self.push_element(SequenceElement::Delay(Delay { label }));
        true
    }

    fn try_hspace(&mut self, line: &str) -> bool {
        if !line.starts_with("||") {
            return false;
        }
        let Some(caps) = self.rules.hspace.captures(line) else {
            return false;
        };
        let size = caps.get(1).and_then(|m| m.as_str().parse().ok());
        self.push_element(SequenceElement::HSpace(HSpace { size }));
        true
    }

    fn try_return(&mut self, line: &str) -> bool {
        let Some(caps) = self.rules.return_msg.captures(line) else {
            return false;
        };
        let mut message = Message::new("", "", caps[1].trim());
        message.is_return = true;
        message.arrow = ArrowConfig {
            head2: ArrowHead::Filled,
            body: LineStyle::Dashed,
            ..ArrowConfig::default()
        };
        self.push_element(SequenceElement::Message(message));
        true
    }

    fn try_exo(&mut self, line: &str) -> bool {
        if let Some(caps) = self.rules.exo_left.captures(line) {
            if let Some(arrow) = parse_arrow(&caps[1]) {
                let code = unquote(&caps[2]);
                self.ensure_participant(&code);
                let kind = if arrow.is_right_to_left() {
                    ExoKind::ToLeft
                } else {
                    ExoKind::FromLeft
                };
                self.push_element(SequenceElement::Exo(ExoMessage {
                    participant: code,
                    label: caps.get(3).map(|m| m.as_str().to_string()).unwrap_or_default(),
                    arrow,
                    kind,
                }));
                return true;
            }
        }
        if let Some(caps) = self.rules.exo_right.captures(line) {
            if let Some(arrow) = parse_arrow(&caps[2]) {
                let code = unquote(&caps[1]);
                self.ensure_participant(&code);
                let kind = if arrow.is_right_to_left() {
                    ExoKind::FromRight
                } else {
                    ExoKind::ToRight
                };
                self.push_element(SequenceElement::Exo(ExoMessage {
                    participant: code,
                    label: caps.get(3).map(|m| m.as_str().to_string()).unwrap_or_default(),
                    arrow,
                    kind,
                }));
                return true;
            }
        }
        false
    }

    fn try_message(&mut self, line: &str) -> bool {
        let Some(caps) = self.rules.message.captures(line) else {
            return false;
        };
        let Some(arrow) = parse_arrow(caps.name("arrow").unwrap().as_str()) else {
            return false;
        };

        let left = unquote(caps.name("from").unwrap().as_str());
        let right = unquote(caps.name("to").unwrap().as_str());
        // Наконечник только слева: источник и приёмник меняются местами
        let (from, to) = if arrow.is_right_to_left() {
            (right.clone(), left.clone())
        } else {
            (left.clone(), right.clone())
        };
        self.ensure_participant(&from);
        self.ensure_participant(&to);

        let multicast: Vec<String> = caps
            .name("rest")
            .map(|m| {
                m.as_str()
                    .split('&')
                    .map(|s| unquote(s.trim()))
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();
        for code in &multicast {
            self.ensure_participant(code);
        }

        let mut message = Message::new(from.clone(), to.clone(), "");
        message.arrow = arrow;
        message.is_parallel = caps.name("par").is_some();
        message.multicast = multicast;
        message.label = caps
            .name("label")
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default();
        self.push_element(SequenceElement::Message(message));

        // Суффиксы активации добавляют жизненные события после сообщения
        if let Some(suffix) = caps.name("suffix") {
            for event in suffix_events(suffix.as_str(), &from, &to) {
                if event.kind == LifeEventKind::Create {
                    if let Some(p) = self.diagram.participants.get_mut(&event.participant) {
                        p.is_created = true;
                    }
                }
                self.push_element(SequenceElement::Life(event));
            }
        }
        true
    }

    fn finish(mut self) -> SequenceDiagram {
        // Неявное закрытие: незакрытые фрагменты и box сворачиваются
        while let Some(frame) = self.fragments.pop() {
            let mut sections = frame.sections;
            sections.push(FragmentSection {
                condition: frame.current_condition,
                elements: frame.current_elements,
            });
            let fragment = Fragment {
                kind: frame.kind,
                label: frame.label,
                sections,
                color: frame.color,
            };
            if let Some(outer) = self.fragments.last_mut() {
                outer
                    .current_elements
                    .push(SequenceElement::Fragment(fragment));
            } else {
                self.diagram.add_element(SequenceElement::Fragment(fragment));
            }
        }
        if let Some(done) = self.open_box.take() {
            self.diagram.boxes.push(done);
        }
        self.diagram
    }
}

/// Жизненные события для суффикса активации сообщения
fn suffix_events(suffix: &str, from: &str, to: &str) -> Vec<LifeEvent> {
    let event = |participant: &str, kind| LifeEvent {
        participant: participant.to_string(),
        kind,
        color: None,
    };
    match suffix {
        "++" => vec![event(to, LifeEventKind::Activate)],
        "--" => vec![event(from, LifeEventKind::Deactivate)],
        "**" => vec![event(to, LifeEventKind::Create)],
        "!!" => vec![event(to, LifeEventKind::Destroy)],
        "++--" => vec![
            event(to, LifeEventKind::Activate),
            event(from, LifeEventKind::Deactivate),
        ],
        "--++" => vec![
            event(from, LifeEventKind::Deactivate),
            event(to, LifeEventKind::Activate),
        ],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drawuml_model::sequence::ArrowDecoration;

    #[test]
    fn test_parse_basic_sequence() {
        let source = "@startuml\nAlice -> Bob: Hello\nBob --> Alice: Hi back\n@enduml";
        let diagram = parse_sequence(source);
        assert_eq!(diagram.participants.len(), 2);
        let codes: Vec<&String> = diagram.participants.keys().collect();
        assert_eq!(codes, vec!["Alice", "Bob"]);
        assert_eq!(diagram.elements.len(), 2);

        let SequenceElement::Message(first) = &diagram.elements[0] else {
            panic!("Expected Message");
        };
        assert_eq!(first.label, "Hello");
        assert_eq!(first.arrow.body, LineStyle::Solid);
        assert_eq!(first.arrow.head2, ArrowHead::Filled);

        let SequenceElement::Message(second) = &diagram.elements[1] else {
            panic!("Expected Message");
        };
        assert_eq!(second.arrow.body, LineStyle::Dashed);
    }

    #[test]
    fn test_parse_participants_with_types() {
        let source = "@startuml\nparticipant Alice\nactor Bob\ndatabase DB\n@enduml";
        let diagram = parse_sequence(source);
        assert_eq!(diagram.participants["Alice"].kind, ParticipantKind::Participant);
        assert_eq!(diagram.participants["Bob"].kind, ParticipantKind::Actor);
        assert_eq!(diagram.participants["DB"].kind, ParticipantKind::Database);
    }

    #[test]
    fn test_parse_participant_alias_and_order() {
        let source =
            "@startuml\nparticipant \"Сервис Обработки\" as Processor order 10 #LightBlue\n@enduml";
        let diagram = parse_sequence(source);
        let p = &diagram.participants["Processor"];
        assert_eq!(p.display_name, "Сервис Обработки");
        assert_eq!(p.order, Some(10));
        assert!(p.color.is_some());
    }

    #[test]
    fn test_activation_suffix() {
        let source = "@startuml\nAlice -> Bob: Start ++\nBob --> Alice: Done --\n@enduml";
        let diagram = parse_sequence(source);
        assert_eq!(diagram.elements.len(), 4);
        let SequenceElement::Life(ev) = &diagram.elements[1] else {
            panic!("Expected LifeEvent after first message");
        };
        assert_eq!(ev.participant, "Bob");
        assert_eq!(ev.kind, LifeEventKind::Activate);
        let SequenceElement::Life(ev) = &diagram.elements[3] else {
            panic!("Expected LifeEvent after second message");
        };
        assert_eq!(ev.participant, "Bob");
        assert_eq!(ev.kind, LifeEventKind::Deactivate);
    }

    #[test]
    fn test_self_message() {
        let source = "@startuml\nBob -> Bob: internal\n@enduml";
        let diagram = parse_sequence(source);
        let SequenceElement::Message(msg) = &diagram.elements[0] else {
            panic!("Expected Message");
        };
        assert!(msg.is_self_message());
    }

    #[test]
    fn test_fragment_alt_else() {
        let source = "@startuml\nalt Success\nBob --> Alice: OK\nelse Failure\nBob --> Alice: Error\nend\n@enduml";
        let diagram = parse_sequence(source);
        assert_eq!(diagram.elements.len(), 1);
        let SequenceElement::Fragment(frag) = &diagram.elements[0] else {
            panic!("Expected Fragment");
        };
        assert_eq!(frag.kind, FragmentKind::Alt);
        assert_eq!(frag.sections.len(), 2);
        assert_eq!(frag.sections[0].condition.as_deref(), Some("Success"));
        assert_eq!(frag.sections[1].condition.as_deref(), Some("Failure"));
        assert_eq!(frag.sections[0].elements.len(), 1);
    }

    #[test]
    fn test_nested_fragments() {
        let source = "@startuml\nloop 5 times\nopt maybe\nA -> B: x\nend\nend\n@enduml";
        let diagram = parse_sequence(source);
        assert_eq!(diagram.elements.len(), 1);
        let SequenceElement::Fragment(outer) = &diagram.elements[0] else {
            panic!("Expected Fragment");
        };
        assert_eq!(outer.kind, FragmentKind::Loop);
        let SequenceElement::Fragment(inner) = &outer.sections[0].elements[0] else {
            panic!("Expected nested Fragment");
        };
        assert_eq!(inner.kind, FragmentKind::Opt);
    }

    #[test]
    fn test_note_single_and_multiline() {
        let source = "@startuml\nAlice -> Bob: Hi\nnote right of Bob: короткая\nnote over Alice, Bob\nдве\nстроки\nend note\n@enduml";
        let diagram = parse_sequence(source);
        assert_eq!(diagram.elements.len(), 3);
        let SequenceElement::Note(short) = &diagram.elements[1] else {
            panic!("Expected Note");
        };
        assert_eq!(short.position, NotePosition::Right);
        assert_eq!(short.participants, vec!["Bob"]);
        let SequenceElement::Note(long) = &diagram.elements[2] else {
            panic!("Expected Note");
        };
        assert_eq!(long.position, NotePosition::Over);
        assert_eq!(long.text, "две\nстроки");
        assert_eq!(long.participants.len(), 2);
    }

    #[test]
    fn test_divider_and_delay() {
        let source = "@startuml\nA -> B: x\n== Фаза 2 ==\n...5 минут спустя...\nB -> A: y\n@enduml";
        let diagram = parse_sequence(source);
        let SequenceElement::Divider(div) = &diagram.elements[1] else {
            panic!("Expected Divider");
        };
        assert_eq!(div.label, "Фаза 2");
        let SequenceElement::Delay(delay) = &diagram.elements[2] else {
            panic!("Expected Delay");
        };
        assert!(delay.label.as_deref().unwrap().contains("минут"));
    }

    #[test]
    fn test_box_collects_participants() {
        let source = "@startuml\nbox \"Frontend\" #LightBlue\nparticipant React\nparticipant Redux\nend box\nReact -> Redux: go\n@enduml";
        let diagram = parse_sequence(source);
        assert_eq!(diagram.boxes.len(), 1);
        assert_eq!(diagram.boxes[0].title.as_deref(), Some("Frontend"));
        assert_eq!(diagram.boxes[0].participants, vec!["React", "Redux"]);
    }

    #[test]
    fn test_create_and_destroy() {
        let source = "@startuml\ncreate Worker\nAlice -> Worker: go\ndestroy Worker\n@enduml";
        let diagram = parse_sequence(source);
        assert!(diagram.participants["Worker"].is_created);
        let SequenceElement::Life(ev) = &diagram.elements[0] else {
            panic!("Expected Create event");
        };
        assert_eq!(ev.kind, LifeEventKind::Create);
        let SequenceElement::Life(ev) = &diagram.elements[2] else {
            panic!("Expected Destroy event");
        };
        assert_eq!(ev.kind, LifeEventKind::Destroy);
    }

    #[test]
    fn test_exo_messages() {
        let source = "@startuml\n[-> Bob: from outside\nBob ->]: to outside\n@enduml";
        let diagram = parse_sequence(source);
        let SequenceElement::Exo(exo) = &diagram.elements[0] else {
            panic!("Expected ExoMessage");
        };
        assert_eq!(exo.kind, ExoKind::FromLeft);
        assert_eq!(exo.participant, "Bob");
        let SequenceElement::Exo(exo) = &diagram.elements[1] else {
            panic!("Expected ExoMessage");
        };
        assert_eq!(exo.kind, ExoKind::ToRight);
    }

    #[test]
    fn test_return_message() {
        let source = "@startuml\nAlice -> Bob: call ++\nreturn result\n@enduml";
        let diagram = parse_sequence(source);
        let SequenceElement::Message(msg) = diagram.elements.last().unwrap() else {
            panic!("Expected return Message");
        };
        assert!(msg.is_return);
        assert_eq!(msg.label, "result");
        assert_eq!(msg.arrow.body, LineStyle::Dashed);
    }

    #[test]
    fn test_autonumber() {
        let source = "@startuml\nautonumber 10 5\nA -> B: x\nautonumber stop\n@enduml";
        let diagram = parse_sequence(source);
        let auto = diagram.autonumber.as_ref().unwrap();
        assert_eq!(auto.start, 10);
        assert_eq!(auto.step, 5);
        assert!(matches!(
            diagram.elements.last(),
            Some(SequenceElement::Autonumber(AutoNumberCommand::Stop))
        ));
    }

    #[test]
    fn test_lost_message_decoration() {
        let source = "@startuml\nAlice ->x Bob: lost\n@enduml";
        let diagram = parse_sequence(source);
        let SequenceElement::Message(msg) = &diagram.elements[0] else {
            panic!("Expected Message");
        };
        assert_eq!(msg.arrow.decoration2, ArrowDecoration::Cross);
    }

    #[test]
    fn test_unknown_lines_are_skipped() {
        let source = "@startuml\nskinparam backgroundColor white\nhide footbox\nAlice -> Bob: hi\n@enduml";
        let diagram = parse_sequence(source);
        assert_eq!(diagram.elements.len(), 1);
    }

    #[test]
    fn test_unclosed_fragment_implicit_close() {
        let source = "@startuml\nloop forever\nA -> B: x\n@enduml";
        let diagram = parse_sequence(source);
        assert_eq!(diagram.elements.len(), 1);
        assert!(matches!(
            diagram.elements[0],
            SequenceElement::Fragment(_)
        ));
    }
}
