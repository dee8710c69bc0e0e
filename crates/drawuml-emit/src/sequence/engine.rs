//! Эмиттер Sequence Diagrams.
//!
//! Многопроходный обход модели: размещение участников слева направо,
//! заголовки, обход элементов с ведением текущего Y и стеков
//! активаций, затем footers, линии жизни, групповые ячейки и box
//! группировки. Итоговый список ячеек собирается в строгом z-порядке:
//! box -> группы участников -> линии жизни -> активации -> остальные
//! вершины -> рёбра сообщений.

use drawuml_mx::{build_cell, style_replace, CellIdAllocator, CellOptions, Geometry, MxPoint};
use drawuml_model::common::{LineStyle, NotePosition};
use drawuml_model::sequence::{
    ArrowConfig, ArrowDecoration, ArrowHead, AutoNumber, AutoNumberCommand, ExoKind, Fragment,
    LifeEvent, LifeEventKind, Message, Participant, ParticipantKind, Reference, SequenceDiagram,
    SequenceElement, SequenceNote, SequenceNoteStyle,
};

use super::config::SequenceEmitConfig;
use super::metrics::{CompletedActivation, EmitMetrics, ParticipantSlot};
use crate::EmitResult;

/// Словарь стилей по типам участников
const PARTICIPANT_STYLE: &str =
    "rounded=0;whiteSpace=wrap;html=1;fillColor=#FEFECE;strokeColor=#A80036;";
const ACTOR_STYLE: &str =
    "shape=umlActor;verticalLabelPosition=bottom;verticalAlign=top;html=1;outlineConnect=0;";
const BOUNDARY_STYLE: &str =
    "shape=umlBoundary;verticalLabelPosition=bottom;verticalAlign=top;html=1;";
const CONTROL_STYLE: &str =
    "shape=umlControl;verticalLabelPosition=bottom;verticalAlign=top;html=1;";
const ENTITY_STYLE: &str =
    "shape=umlEntity;verticalLabelPosition=bottom;verticalAlign=top;html=1;";
const DATABASE_STYLE: &str =
    "shape=cylinder3;whiteSpace=wrap;html=1;boundedLbl=1;backgroundOutline=1;";
const QUEUE_STYLE: &str = "shape=mxgraph.sysml.queue;whiteSpace=wrap;html=1;";
const COLLECTIONS_STYLE: &str = "shape=mxgraph.basic.layered_rect;whiteSpace=wrap;html=1;";

const GROUP_STYLE: &str = "group;connectable=0;";
const LIFELINE_STYLE: &str = "endArrow=none;dashed=1;html=1;strokeColor=#A80036;";
const ACTIVATION_STYLE: &str =
    "rounded=0;whiteSpace=wrap;html=1;fillColor=#FFFFFF;strokeColor=#A80036;";
const DESTROY_STYLE: &str = "shape=mxgraph.basic.x;html=1;strokeColor=#A80036;";
const NOTE_STYLE: &str = "shape=note;whiteSpace=wrap;html=1;backgroundOutline=1;fillColor=#FEFFDD;";
const HNOTE_STYLE: &str = "shape=hexagon;perimeter=hexagonPerimeter2;whiteSpace=wrap;html=1;fillColor=#FEFFDD;";
const RNOTE_STYLE: &str = "rounded=0;whiteSpace=wrap;html=1;fillColor=#FEFFDD;";
const FRAGMENT_STYLE: &str =
    "rounded=0;dashed=1;fillColor=none;html=1;verticalAlign=top;whiteSpace=wrap;";
const FRAGMENT_LABEL_STYLE: &str = "text;html=1;fontStyle=1;align=left;";
const SECTION_LINE_STYLE: &str = "endArrow=none;dashed=1;html=1;";
const DIVIDER_STYLE: &str = "rounded=0;whiteSpace=wrap;html=1;fillColor=#EEEEEE;";
const DELAY_STYLE: &str = "text;html=1;align=center;fontStyle=2;";
const REF_STYLE: &str =
    "rounded=0;whiteSpace=wrap;html=1;verticalAlign=middle;fillColor=#EEEEEE;";
const TITLE_STYLE: &str = "text;html=1;align=center;fontSize=14;fontStyle=1;";
const BOX_STYLE: &str =
    "rounded=0;whiteSpace=wrap;html=1;verticalAlign=top;fillColor=#DDDDDD;opacity=50;";

/// Стиль заголовка участника по типу
fn participant_style(kind: ParticipantKind) -> &'static str {
    match kind {
        ParticipantKind::Participant => PARTICIPANT_STYLE,
        ParticipantKind::Actor => ACTOR_STYLE,
        ParticipantKind::Boundary => BOUNDARY_STYLE,
        ParticipantKind::Control => CONTROL_STYLE,
        ParticipantKind::Entity => ENTITY_STYLE,
        ParticipantKind::Database => DATABASE_STYLE,
        ParticipantKind::Queue => QUEUE_STYLE,
        ParticipantKind::Collections => COLLECTIONS_STYLE,
    }
}

/// Состояние autonumber при обходе
struct AutoNumberState {
    counter: u32,
    step: u32,
    format: Option<String>,
    active: bool,
}

impl AutoNumberState {
    fn new() -> Self {
        Self {
            counter: 1,
            step: 1,
            format: None,
            active: false,
        }
    }

    fn apply(&mut self, command: &AutoNumberCommand) {
        match command {
            AutoNumberCommand::Start(AutoNumber {
                start,
                step,
                format,
            }) => {
                self.counter = *start;
                self.step = *step;
                self.format = format.clone();
                self.active = true;
            }
            AutoNumberCommand::Stop => self.active = false,
            AutoNumberCommand::Resume => self.active = true,
        }
    }

    /// Префикс очередного сообщения; продвигает счётчик
    fn next_prefix(&mut self) -> Option<String> {
        if !self.active {
            return None;
        }
        let digits = self
            .format
            .as_deref()
            .map(|f| f.chars().filter(|c| *c == '0' || *c == '#').count())
            .unwrap_or(0);
        let text = if digits > 1 {
            format!("{:0width$}", self.counter, width = digits)
        } else {
            self.counter.to_string()
        };
        self.counter += self.step;
        Some(text)
    }
}

/// Накопитель ячеек по слоям z-порядка
#[derive(Default)]
struct Layers {
    boxes: Vec<String>,
    groups: Vec<String>,
    lifelines: Vec<String>,
    activations: Vec<String>,
    vertices: Vec<String>,
    edges: Vec<String>,
}

/// Эмиттер sequence diagram
pub struct SequenceEmitter {
    config: SequenceEmitConfig,
    ids: CellIdAllocator,
}

impl SequenceEmitter {
    /// Создаёт эмиттер с конфигурацией по умолчанию
    pub fn new() -> Self {
        Self {
            config: SequenceEmitConfig::default(),
            ids: CellIdAllocator::default(),
        }
    }

    /// Создаёт эмиттер с заданной конфигурацией
    pub fn with_config(config: SequenceEmitConfig) -> Self {
        Self {
            config,
            ids: CellIdAllocator::default(),
        }
    }

    /// Эмитирует диаграмму; ячейки возвращаются в z-порядке
    pub fn emit(&mut self, diagram: &SequenceDiagram, parent: &str) -> EmitResult {
        let mut metrics = EmitMetrics::new();
        let mut layers = Layers::default();

        let header_y = if diagram.title.is_some() {
            self.config.margin_top + self.config.title_height
        } else {
            self.config.margin_top
        };

        // 1-2. Размещение участников слева направо
        let mut x = self.config.margin_left;
        for participant in diagram.ordered_participants() {
            let width = match participant.kind {
                ParticipantKind::Actor => {
                    self.config
                        .actor_width
                        .max(crate::text_width(&participant.display_name, self.config.char_width))
                }
                _ => self.config.width_for_name(&participant.display_name),
            };
            metrics.participants.insert(
                participant.code.clone(),
                ParticipantSlot {
                    group_id: self.ids.next_id(),
                    x,
                    center_x: x + width / 2.0,
                    width,
                    is_created: participant.is_created,
                    start_y: header_y,
                },
            );
            x += width + self.config.participant_gap;
        }
        let right_edge = x - self.config.participant_gap;

        // 3. Заголовок диаграммы
        if let Some(title) = &diagram.title {
            let cell = CellOptions::vertex(self.ids.next_id())
                .with_value(title.clone())
                .with_style(TITLE_STYLE)
                .with_parent(parent)
                .with_geometry(Geometry::new(
                    self.config.margin_left,
                    self.config.margin_top - 10.0,
                    (right_edge - self.config.margin_left).max(self.config.participant_width),
                    self.config.title_height - 5.0,
                ));
            layers.vertices.push(build_cell(&cell).expect("title cell"));
        }

        // 4. Верхние заголовки (создаваемые участники откладываются)
        for participant in diagram.participants.values() {
            if participant.is_created {
                continue;
            }
            self.emit_participant_header(participant, &metrics, header_y, &mut layers);
        }

        metrics.current_y = header_y + self.config.participant_height + 15.0;
        metrics.last_message_y = metrics.current_y;

        // 5-10. Обход элементов
        let mut autonum = AutoNumberState::new();
        let mut just_created: Vec<String> = Vec::new();
        self.walk_elements(
            &diagram.elements,
            diagram,
            parent,
            &mut metrics,
            &mut layers,
            &mut autonum,
            &mut just_created,
        );

        // Неявное закрытие оставшихся активаций
        let end_y = metrics.current_y + 10.0;
        metrics.finalize(end_y);
        self.drain_completed(&mut metrics, &mut layers);

        // 11. Footers, линии жизни, группы
        let footer_y = end_y + 5.0;
        for (code, participant) in &diagram.participants {
            let Some(slot) = metrics.participants.get(code) else {
                continue;
            };
            let group_y = slot.start_y;
            let group_h = footer_y + self.config.participant_height - group_y;

            // Footer повторяет заголовок внизу
            let footer = CellOptions::vertex(self.ids.next_id())
                .with_value(participant.display_name.clone())
                .with_style(self.colored_style(
                    participant_style(participant.kind),
                    participant.color.as_ref(),
                ))
                .with_parent(slot.group_id.clone())
                .with_geometry(Geometry::new(
                    0.0,
                    footer_y - group_y,
                    slot.width,
                    self.config.participant_height,
                ));
            layers.vertices.push(build_cell(&footer).expect("footer cell"));

            // Линия жизни внутри группы
            let lifeline = CellOptions::edge(self.ids.next_id())
                .with_style(LIFELINE_STYLE)
                .with_parent(slot.group_id.clone())
                .with_endpoints(
                    MxPoint::new(slot.width / 2.0, self.config.participant_height),
                    MxPoint::new(slot.width / 2.0, footer_y - group_y),
                );
            layers
                .lifelines
                .push(build_cell(&lifeline).expect("lifeline cell"));

            // Групповая ячейка участника
            let group = CellOptions::vertex(slot.group_id.clone())
                .with_style(GROUP_STYLE)
                .with_parent(parent)
                .with_geometry(Geometry::new(slot.x, group_y, slot.width, group_h));
            layers.groups.push(build_cell(&group).expect("group cell"));
        }

        // 12. Box группировки в заднем слое
        for participant_box in &diagram.boxes {
            let mut min_x = f64::MAX;
            let mut max_x = f64::MIN;
            for code in &participant_box.participants {
                if let Some(slot) = metrics.participants.get(code) {
                    min_x = min_x.min(slot.x);
                    max_x = max_x.max(slot.x + slot.width);
                }
            }
            if min_x == f64::MAX {
                continue;
            }
            let style = self.colored_style(BOX_STYLE, participant_box.color.as_ref());
            let cell = CellOptions::vertex(self.ids.next_id())
                .with_value(participant_box.title.clone().unwrap_or_default())
                .with_style(style)
                .with_parent(parent)
                .with_geometry(Geometry::new(
                    min_x - self.config.box_padding,
                    header_y - self.config.box_padding,
                    max_x - min_x + self.config.box_padding * 2.0,
                    footer_y + self.config.participant_height - header_y
                        + self.config.box_padding * 2.0,
                ));
            layers.boxes.push(build_cell(&cell).expect("box cell"));
        }

        let mut cells = layers.boxes;
        cells.extend(layers.groups);
        cells.extend(layers.lifelines);
        cells.extend(layers.activations);
        cells.extend(layers.vertices);
        cells.extend(layers.edges);

        EmitResult {
            cells,
            width: right_edge + self.config.margin_left,
            height: footer_y + self.config.participant_height + self.config.margin_top,
        }
    }

    /// Подставляет пользовательский цвет в словарный стиль
    fn colored_style(&self, base: &str, color: Option<&drawuml_model::Color>) -> String {
        match color {
            Some(c) => style_replace(base, "fillColor", &drawuml_mx::color::normalize(c.as_str())),
            None => base.to_string(),
        }
    }

    fn emit_participant_header(
        &mut self,
        participant: &Participant,
        metrics: &EmitMetrics,
        y: f64,
        layers: &mut Layers,
    ) {
        let Some(slot) = metrics.participants.get(&participant.code) else {
            return;
        };
        let value = match &participant.stereotype {
            Some(stereo) => format!("«{}»\n{}", stereo, participant.display_name),
            None => participant.display_name.clone(),
        };
        let cell = CellOptions::vertex(self.ids.next_id())
            .with_value(value)
            .with_style(self.colored_style(
                participant_style(participant.kind),
                participant.color.as_ref(),
            ))
            .with_parent(slot.group_id.clone())
            .with_geometry(Geometry::new(
                0.0,
                y - slot.start_y,
                slot.width,
                self.config.participant_height,
            ));
        layers.vertices.push(build_cell(&cell).expect("header cell"));
    }

    #[allow(clippy::too_many_arguments)]
    fn walk_elements(
        &mut self,
        elements: &[SequenceElement],
        diagram: &SequenceDiagram,
        parent: &str,
        metrics: &mut EmitMetrics,
        layers: &mut Layers,
        autonum: &mut AutoNumberState,
        just_created: &mut Vec<String>,
    ) {
        for element in elements {
            match element {
                SequenceElement::Message(message) => {
                    self.emit_message(message, diagram, parent, metrics, layers, autonum, just_created);
                }
                SequenceElement::Exo(exo) => {
                    self.emit_exo(exo, parent, metrics, layers);
                }
                SequenceElement::Life(event) => {
                    self.emit_life_event(event, diagram, metrics, layers, just_created);
                }
                SequenceElement::Fragment(fragment) => {
                    self.emit_fragment(
                        fragment,
                        diagram,
                        parent,
                        metrics,
                        layers,
                        autonum,
                        just_created,
                    );
                }
                SequenceElement::Note(note) => {
                    self.emit_note(note, parent, metrics, layers);
                }
                SequenceElement::Divider(divider) => {
                    let y = metrics.current_y;
                    let (min_x, max_x) = self.full_span(metrics);
                    let cell = CellOptions::vertex(self.ids.next_id())
                        .with_value(divider.label.clone())
                        .with_style(DIVIDER_STYLE)
                        .with_parent(parent)
                        .with_geometry(Geometry::new(
                            min_x,
                            y,
                            max_x - min_x,
                            self.config.divider_height - 5.0,
                        ));
                    layers.vertices.push(build_cell(&cell).expect("divider cell"));
                    metrics.current_y = y + self.config.divider_height;
                }
                SequenceElement::Delay(delay) => {
                    let y = metrics.current_y;
                    let (min_x, max_x) = self.full_span(metrics);
                    let cell = CellOptions::vertex(self.ids.next_id())
                        .with_value(delay.label.clone().unwrap_or_else(|| "...".to_string()))
                        .with_style(DELAY_STYLE)
                        .with_parent(parent)
                        .with_geometry(Geometry::new(
                            min_x,
                            y,
                            max_x - min_x,
                            self.config.delay_height - 5.0,
                        ));
                    layers.vertices.push(build_cell(&cell).expect("delay cell"));
                    metrics.current_y = y + self.config.delay_height;
                }
                SequenceElement::HSpace(space) => {
                    metrics.current_y += space.size.unwrap_or(25.0);
                }
                SequenceElement::Reference(reference) => {
                    self.emit_reference(reference, parent, metrics, layers);
                }
                SequenceElement::Autonumber(command) => {
                    autonum.apply(command);
                }
            }
        }
    }

    /// Горизонтальный охват всех участников
    fn full_span(&self, metrics: &EmitMetrics) -> (f64, f64) {
        let min_x = metrics
            .participants
            .values()
            .map(|s| s.x)
            .fold(f64::MAX, f64::min);
        let max_x = metrics
            .participants
            .values()
            .map(|s| s.x + s.width)
            .fold(f64::MIN, f64::max);
        if min_x == f64::MAX {
            (self.config.margin_left, self.config.margin_left + 200.0)
        } else {
            (min_x, max_x)
        }
    }

    /// Стиль ребра сообщения из конфигурации стрелки
    fn message_style(&self, arrow: &ArrowConfig) -> String {
        let mut style = String::from("html=1;verticalAlign=bottom;");
        match arrow.body {
            LineStyle::Dashed | LineStyle::Dotted => style.push_str("dashed=1;"),
            LineStyle::Bold => style.push_str("strokeWidth=2;"),
            LineStyle::Hidden => style.push_str("strokeColor=none;"),
            LineStyle::Solid => {}
        }
        let end = match (arrow.decoration2, arrow.head2) {
            (ArrowDecoration::Circle, _) => "endArrow=oval;endFill=0;",
            (ArrowDecoration::Cross, _) => "endArrow=cross;endFill=0;",
            (_, ArrowHead::Open) => "endArrow=open;endFill=0;",
            (_, ArrowHead::Half) => "endArrow=halfCircle;endFill=0;",
            (_, ArrowHead::Filled) => "endArrow=block;endFill=1;",
            (_, ArrowHead::None) => "endArrow=none;",
        };
        style.push_str(end);
        if arrow.is_bidirectional() {
            let start = match arrow.head1 {
                ArrowHead::Open => "startArrow=open;startFill=0;",
                _ => "startArrow=block;startFill=1;",
            };
            style.push_str(start);
        }
        if let Some(color) = &arrow.color {
            style.push_str(&format!(
                "strokeColor={};",
                drawuml_mx::color::normalize(color.as_str())
            ));
        }
        style
    }

    /// X конца стрелки с учётом активаций и свежесозданной цели
    fn endpoint_x(
        &self,
        code: &str,
        metrics: &EmitMetrics,
        approach_from_left: bool,
        just_created: &[String],
    ) -> f64 {
        let Some(slot) = metrics.participants.get(code) else {
            return self.config.margin_left;
        };
        // Свежесозданный участник: стрелка упирается в ближний край блока
        if just_created.iter().any(|c| c == code) {
            return if approach_from_left {
                slot.x
            } else {
                slot.x + slot.width
            };
        }
        let depth = metrics.activation_depth(code);
        if depth > 0 {
            let edge = self.config.activation_width / 2.0
                + (depth as f64 - 1.0) * self.config.activation_width / 2.0;
            if approach_from_left {
                slot.center_x - edge
            } else {
                slot.center_x + edge
            }
        } else {
            slot.center_x
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn emit_message(
        &mut self,
        message: &Message,
        diagram: &SequenceDiagram,
        parent: &str,
        metrics: &mut EmitMetrics,
        layers: &mut Layers,
        autonum: &mut AutoNumberState,
        just_created: &mut Vec<String>,
    ) {
        // return разрешает концы по стеку активаций
        let (from, to) = if message.is_return {
            let source = metrics
                .most_recent_active()
                .map(|s| s.to_string())
                .or_else(|| diagram.participants.keys().next().cloned());
            let Some(source) = source else {
                return;
            };
            let target = metrics
                .next_recent_active(&source)
                .map(|s| s.to_string())
                .or_else(|| diagram.participants.keys().next().cloned())
                .unwrap_or_else(|| source.clone());
            (source, target)
        } else {
            (message.from.clone(), message.to.clone())
        };

        if message.arrow.body == LineStyle::Hidden {
            metrics.current_y += self.config.row_height;
            return;
        }

        metrics.current_y += self.config.row_height;
        let y = metrics.current_y;
        metrics.last_message_y = y;

        let label = match autonum.next_prefix() {
            Some(prefix) if message.label.is_empty() => prefix,
            Some(prefix) => format!("{} {}", prefix, message.label),
            None => message.label.clone(),
        };

        if from == to {
            // Self-сообщение: петля из трёх сегментов через два waypoint
            let x = self.endpoint_x(&from, metrics, false, just_created);
            let loop_x = x + self.config.self_message_width;
            let cell = CellOptions::edge(self.ids.next_id())
                .with_value(label)
                .with_style(self.message_style(&message.arrow))
                .with_parent(parent)
                .with_endpoints(
                    MxPoint::new(x, y),
                    MxPoint::new(x, y + self.config.self_message_height),
                )
                .with_waypoints(vec![
                    MxPoint::new(loop_x, y),
                    MxPoint::new(loop_x, y + self.config.self_message_height),
                ]);
            layers.edges.push(build_cell(&cell).expect("self message cell"));
            metrics.current_y += self.config.self_message_height;
        } else {
            let from_x = metrics.center_x(&from).unwrap_or(self.config.margin_left);
            let to_x = metrics.center_x(&to).unwrap_or(self.config.margin_left);
            let left_to_right = from_x <= to_x;
            let source_x = self.endpoint_x(&from, metrics, !left_to_right, just_created);
            let target_x = self.endpoint_x(&to, metrics, left_to_right, just_created);
            let cell = CellOptions::edge(self.ids.next_id())
                .with_value(label)
                .with_style(self.message_style(&message.arrow))
                .with_parent(parent)
                .with_endpoints(MxPoint::new(source_x, y), MxPoint::new(target_x, y));
            layers.edges.push(build_cell(&cell).expect("message cell"));

            // Мультикаст: дублирующие рёбра к остальным получателям
            for extra in &message.multicast {
                let extra_x = self.endpoint_x(extra, metrics, left_to_right, just_created);
                let cell = CellOptions::edge(self.ids.next_id())
                    .with_style(self.message_style(&message.arrow))
                    .with_parent(parent)
                    .with_endpoints(MxPoint::new(source_x, y), MxPoint::new(extra_x, y));
                layers.edges.push(build_cell(&cell).expect("multicast cell"));
            }
        }
        just_created.retain(|c| c != &from && c != &to);
    }

    fn emit_exo(
        &mut self,
        exo: &drawuml_model::sequence::ExoMessage,
        parent: &str,
        metrics: &mut EmitMetrics,
        layers: &mut Layers,
    ) {
        metrics.current_y += self.config.row_height;
        let y = metrics.current_y;
        metrics.last_message_y = y;

        let center = metrics
            .center_x(&exo.participant)
            .unwrap_or(self.config.margin_left);
        let (min_x, max_x) = self.full_span(metrics);
        let outside_left = min_x - self.config.exo_reach;
        let outside_right = max_x + self.config.exo_reach;

        let (source, target) = match exo.kind {
            ExoKind::FromLeft => (MxPoint::new(outside_left, y), MxPoint::new(center, y)),
            ExoKind::ToLeft => (MxPoint::new(center, y), MxPoint::new(outside_left, y)),
            ExoKind::FromRight => (MxPoint::new(outside_right, y), MxPoint::new(center, y)),
            ExoKind::ToRight => (MxPoint::new(center, y), MxPoint::new(outside_right, y)),
        };
        let cell = CellOptions::edge(self.ids.next_id())
            .with_value(exo.label.clone())
            .with_style(self.message_style(&exo.arrow))
            .with_parent(parent)
            .with_endpoints(source, target);
        layers.edges.push(build_cell(&cell).expect("exo cell"));
    }

    fn emit_life_event(
        &mut self,
        event: &LifeEvent,
        diagram: &SequenceDiagram,
        metrics: &mut EmitMetrics,
        layers: &mut Layers,
        just_created: &mut Vec<String>,
    ) {
        match event.kind {
            LifeEventKind::Activate => {
                metrics.activate(
                    &event.participant,
                    event
                        .color
                        .as_ref()
                        .map(|c| drawuml_mx::color::normalize(c.as_str())),
                );
            }
            LifeEventKind::Deactivate => {
                // Несбалансированный deactivate пропускается
                metrics.deactivate(&event.participant, metrics.last_message_y);
                self.drain_completed(metrics, layers);
            }
            LifeEventKind::Create => {
                let y = metrics.current_y;
                if let Some(slot) = metrics.participants.get_mut(&event.participant) {
                    slot.start_y = y;
                }
                if let Some(participant) = diagram.participants.get(&event.participant) {
                    self.emit_participant_header(participant, metrics, y, layers);
                }
                just_created.push(event.participant.clone());
                metrics.current_y = y + self.config.participant_height + 5.0;
            }
            LifeEventKind::Destroy => {
                let end_y = metrics.last_message_y.max(metrics.current_y);
                metrics.close_all(&event.participant, end_y);
                self.drain_completed(metrics, layers);
                // Маркер X на линии жизни
                if let Some(slot) = metrics.participants.get(&event.participant) {
                    let cell = CellOptions::vertex(self.ids.next_id())
                        .with_style(DESTROY_STYLE)
                        .with_parent(slot.group_id.clone())
                        .with_geometry(Geometry::new(
                            slot.width / 2.0 - 10.0,
                            end_y - slot.start_y + 5.0,
                            20.0,
                            20.0,
                        ));
                    layers.vertices.push(build_cell(&cell).expect("destroy cell"));
                }
                metrics.current_y += 25.0;
            }
        }
    }

    /// Эмитирует все завершённые и ещё не отрисованные активации
    fn drain_completed(&mut self, metrics: &mut EmitMetrics, layers: &mut Layers) {
        let done = std::mem::take(&mut metrics.completed);
        for activation in &done {
            self.emit_activation(activation, metrics, layers);
        }
    }

    /// Эмитирует полосу активации внутри группы участника
    fn emit_activation(
        &mut self,
        activation: &CompletedActivation,
        metrics: &EmitMetrics,
        layers: &mut Layers,
    ) {
        let Some(slot) = metrics.participants.get(&activation.participant) else {
            return;
        };
        let style = match &activation.color {
            Some(color) => style_replace(ACTIVATION_STYLE, "fillColor", color),
            None => ACTIVATION_STYLE.to_string(),
        };
        let x = slot.width / 2.0 - self.config.activation_width / 2.0
            + activation.level as f64 * self.config.activation_width / 2.0;
        let height = (activation.end_y - activation.start_y).max(10.0);
        let cell = CellOptions::vertex(self.ids.next_id())
            .with_style(style)
            .with_parent(slot.group_id.clone())
            .with_geometry(Geometry::new(
                x,
                activation.start_y - slot.start_y,
                self.config.activation_width,
                height,
            ));
        layers
            .activations
            .push(build_cell(&cell).expect("activation cell"));
    }

    #[allow(clippy::too_many_arguments)]
    fn emit_fragment(
        &mut self,
        fragment: &Fragment,
        diagram: &SequenceDiagram,
        parent: &str,
        metrics: &mut EmitMetrics,
        layers: &mut Layers,
        autonum: &mut AutoNumberState,
        just_created: &mut Vec<String>,
    ) {
        let (min_x, max_x) = self.full_span(metrics);
        let left = min_x - self.config.fragment_padding;
        let width = max_x - min_x + self.config.fragment_padding * 2.0;
        let top = metrics.current_y;

        // Заголовок: ключевое слово и условие первой секции
        let mut header = fragment.kind.keyword().to_string();
        if let Some(label) = &fragment.label {
            header.push_str(&format!(" [{}]", label));
        }
        let label_cell = CellOptions::vertex(self.ids.next_id())
            .with_value(header)
            .with_style(FRAGMENT_LABEL_STYLE)
            .with_parent(parent)
            .with_geometry(Geometry::new(
                left + 4.0,
                top,
                width - 8.0,
                self.config.fragment_header_height - 4.0,
            ));
        layers
            .vertices
            .push(build_cell(&label_cell).expect("fragment label cell"));
        metrics.current_y = top + self.config.fragment_header_height;

        // Секции с пунктирными разделителями между ними
        for (index, section) in fragment.sections.iter().enumerate() {
            if index > 0 {
                let y = metrics.current_y + 5.0;
                let line = CellOptions::edge(self.ids.next_id())
                    .with_style(SECTION_LINE_STYLE)
                    .with_parent(parent)
                    .with_endpoints(MxPoint::new(left, y), MxPoint::new(left + width, y));
                layers.edges.push(build_cell(&line).expect("section line cell"));
                if let Some(condition) = &section.condition {
                    let cond_cell = CellOptions::vertex(self.ids.next_id())
                        .with_value(format!("[{}]", condition))
                        .with_style(FRAGMENT_LABEL_STYLE)
                        .with_parent(parent)
                        .with_geometry(Geometry::new(left + 4.0, y, width - 8.0, 15.0));
                    layers
                        .vertices
                        .push(build_cell(&cond_cell).expect("condition cell"));
                }
                metrics.current_y = y + 18.0;
            }
            self.walk_elements(
                &section.elements,
                diagram,
                parent,
                metrics,
                layers,
                autonum,
                just_created,
            );
        }

        let bottom = metrics.current_y + self.config.fragment_padding;
        let style = match &fragment.color {
            Some(color) => style_replace(
                FRAGMENT_STYLE,
                "strokeColor",
                &drawuml_mx::color::normalize(color.as_str()),
            ),
            None => FRAGMENT_STYLE.to_string(),
        };
        // Внешняя пунктирная рамка во всю ширину
        let frame = CellOptions::vertex(self.ids.next_id())
            .with_style(style)
            .with_parent(parent)
            .with_geometry(Geometry::new(left, top, width, bottom - top));
        layers.vertices.push(build_cell(&frame).expect("fragment frame cell"));
        metrics.current_y = bottom + 5.0;
    }

    fn emit_note(
        &mut self,
        note: &SequenceNote,
        parent: &str,
        metrics: &mut EmitMetrics,
        layers: &mut Layers,
    ) {
        let style_base = match note.style {
            SequenceNoteStyle::Note => NOTE_STYLE,
            SequenceNoteStyle::HNote => HNOTE_STYLE,
            SequenceNoteStyle::RNote => RNOTE_STYLE,
        };
        let style = self.colored_style(style_base, note.color.as_ref());

        let longest = note
            .text
            .lines()
            .map(|l| crate::text_width(l, self.config.char_width))
            .fold(0.0, f64::max);
        let width = self.config.note_width.max(longest + 20.0);
        let height = self.config.note_height(&note.text);
        let y = metrics.current_y;

        let x = if note.is_across {
            let (min_x, max_x) = self.full_span(metrics);
            min_x + (max_x - min_x - width) / 2.0
        } else {
            let anchors: Vec<f64> = note
                .participants
                .iter()
                .filter_map(|code| metrics.center_x(code))
                .collect();
            match (note.position, anchors.as_slice()) {
                (NotePosition::Left, [center, ..]) => center - width - 10.0,
                (NotePosition::Right, [center, ..]) => center + 10.0,
                (_, [center]) => center - width / 2.0,
                (_, [first, .., last]) => {
                    let mid = (first + last) / 2.0;
                    mid - width / 2.0
                }
                (NotePosition::Left, []) => self.config.margin_left,
                _ => {
                    let (_, max_x) = self.full_span(metrics);
                    max_x + 10.0
                }
            }
        };

        let cell = CellOptions::vertex(self.ids.next_id())
            .with_value(note.text.clone())
            .with_style(style)
            .with_parent(parent)
            .with_geometry(Geometry::new(x.max(0.0), y, width, height));
        layers.vertices.push(build_cell(&cell).expect("note cell"));
        metrics.current_y = y + height + 5.0;
    }

    fn emit_reference(
        &mut self,
        reference: &Reference,
        parent: &str,
        metrics: &mut EmitMetrics,
        layers: &mut Layers,
    ) {
        let anchors: Vec<&ParticipantSlot> = reference
            .participants
            .iter()
            .filter_map(|code| metrics.participants.get(code))
            .collect();
        let (min_x, max_x) = if anchors.is_empty() {
            self.full_span(metrics)
        } else {
            (
                anchors.iter().map(|s| s.x).fold(f64::MAX, f64::min),
                anchors
                    .iter()
                    .map(|s| s.x + s.width)
                    .fold(f64::MIN, f64::max),
            )
        };
        let y = metrics.current_y;
        let height = self.config.note_height(&reference.text) + 10.0;
        let style = self.colored_style(REF_STYLE, reference.color.as_ref());
        let cell = CellOptions::vertex(self.ids.next_id())
            .with_value(format!("ref\n{}", reference.text))
            .with_style(style)
            .with_parent(parent)
            .with_geometry(Geometry::new(min_x, y, max_x - min_x, height));
        layers.vertices.push(build_cell(&cell).expect("ref cell"));
        metrics.current_y = y + height + 5.0;
    }
}

impl Default for SequenceEmitter {
    fn default() -> Self {
        Self::new()
    }
}
