//! Эмиттер State Diagrams.
//!
//! Три прохода: измерение снизу вверх (лист — по тексту, составное
//! состояние — стопка детей), размещение сверху вниз (топологические
//! слои по переходам верхнего уровня, внутри слоя — поперечная
//! укладка, подсказка left-to-right меняет оси местами), эмиссия:
//! составные контейнеры -> листья -> заметки -> переходы.

use indexmap::IndexMap;

use drawuml_mx::{build_cell, style_replace, CellIdAllocator, CellOptions, Geometry, MxPoint};
use drawuml_model::common::LineStyle;
use drawuml_model::state::{StateDiagram, StateDirection, StateElement, StateKind};

use super::config::StateEmitConfig;
use super::layers::assign_layers;
use crate::EmitResult;

const STATE_STYLE: &str = "rounded=1;whiteSpace=wrap;html=1;arcSize=40;fillColor=#FEFECE;strokeColor=#A80036;";
const COMPOSITE_STYLE: &str =
    "rounded=1;whiteSpace=wrap;html=1;arcSize=20;verticalAlign=top;fillColor=none;container=1;collapsible=0;";
const INITIAL_STYLE: &str = "ellipse;html=1;fillColor=#000000;strokeColor=#000000;";
const FINAL_OUTER_STYLE: &str = "ellipse;html=1;fillColor=none;strokeColor=#000000;";
const FINAL_INNER_STYLE: &str = "ellipse;html=1;fillColor=#000000;strokeColor=#000000;";
const CHOICE_STYLE: &str = "rhombus;whiteSpace=wrap;html=1;fillColor=#FEFECE;strokeColor=#A80036;";
const BAR_STYLE: &str = "rounded=1;html=1;fillColor=#000000;strokeColor=#000000;arcSize=50;";
const HISTORY_STYLE: &str = "ellipse;whiteSpace=wrap;html=1;fillColor=#FEFECE;strokeColor=#A80036;";
const REGION_LINE_STYLE: &str = "endArrow=none;dashed=1;html=1;";
const NOTE_STYLE: &str = "shape=note;whiteSpace=wrap;html=1;backgroundOutline=1;fillColor=#FEFFDD;";
const NOTE_LINK_STYLE: &str = "endArrow=none;dashed=1;html=1;";
const TITLE_STYLE: &str = "text;html=1;align=center;fontSize=14;fontStyle=1;";

#[derive(Debug, Clone, Copy)]
struct Placed {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

/// Эмиттер state diagram
pub struct StateEmitter {
    config: StateEmitConfig,
    ids: CellIdAllocator,
}

impl StateEmitter {
    /// Создаёт эмиттер с конфигурацией по умолчанию
    pub fn new() -> Self {
        Self {
            config: StateEmitConfig::default(),
            ids: CellIdAllocator::default(),
        }
    }

    /// Создаёт эмиттер с заданной конфигурацией
    pub fn with_config(config: StateEmitConfig) -> Self {
        Self {
            config,
            ids: CellIdAllocator::default(),
        }
    }

    /// Эмитирует диаграмму
    pub fn emit(&mut self, diagram: &StateDiagram, parent: &str) -> EmitResult {
        let element_ids: IndexMap<String, String> = diagram
            .elements
            .keys()
            .map(|code| (code.clone(), self.ids.next_id()))
            .collect();

        let mut containers: Vec<String> = Vec::new();
        let mut vertices: Vec<String> = Vec::new();
        let mut notes: Vec<String> = Vec::new();
        let mut edges: Vec<String> = Vec::new();

        let title_offset = if diagram.title.is_some() { 35.0 } else { 0.0 };
        if let Some(title) = &diagram.title {
            let cell = CellOptions::vertex(self.ids.next_id())
                .with_value(title.clone())
                .with_style(TITLE_STYLE)
                .with_parent(parent)
                .with_geometry(Geometry::new(self.config.margin, 5.0, 300.0, 25.0));
            vertices.push(build_cell(&cell).expect("title cell"));
        }

        // Проход 1: измерение (снизу вверх)
        let mut sizes: IndexMap<String, (f64, f64)> = IndexMap::new();
        for element in diagram.elements.values() {
            if element.parent.is_none() {
                self.measure(diagram, element, &mut sizes);
            }
        }

        // Проход 2: размещение верхнего уровня по слоям переходов
        let top_codes: Vec<String> = diagram
            .top_level()
            .map(|e| e.code.clone())
            .collect();
        let ancestor = |code: &str| -> String {
            let mut current = code.to_string();
            while let Some(parent_code) = diagram
                .elements
                .get(&current)
                .and_then(|e| e.parent.clone())
            {
                current = parent_code;
            }
            current
        };
        let layer_edges: Vec<(String, String)> = diagram
            .transitions
            .iter()
            .map(|t| (ancestor(&t.from), ancestor(&t.to)))
            .filter(|(f, t)| f != t)
            .collect();
        let layers = assign_layers(&top_codes, &layer_edges);

        let mut by_layer: IndexMap<usize, Vec<String>> = IndexMap::new();
        for (code, layer) in &layers {
            by_layer.entry(*layer).or_default().push(code.clone());
        }

        let ltr = diagram.direction == StateDirection::LeftToRight;
        let mut placed: IndexMap<String, Placed> = IndexMap::new();
        let mut main_pos = self.config.margin + title_offset;
        let mut cross_extent: f64 = 0.0;
        let max_layer = layers.values().max().copied().unwrap_or(0);
        for layer in 0..=max_layer {
            let Some(codes) = by_layer.get(&layer) else {
                continue;
            };
            // Основная ось — слои, поперечная — соседи по слою
            let layer_main = codes
                .iter()
                .map(|c| {
                    let (w, h) = sizes[c];
                    if ltr {
                        w
                    } else {
                        h
                    }
                })
                .fold(0.0, f64::max);
            let mut cross = self.config.margin;
            for code in codes {
                let (w, h) = sizes[code];
                let (x, y) = if ltr {
                    (main_pos, cross)
                } else {
                    (cross, main_pos)
                };
                placed.insert(
                    code.clone(),
                    Placed {
                        x,
                        y,
                        width: w,
                        height: h,
                    },
                );
                cross += if ltr { h } else { w } + self.config.sibling_gap;
            }
            cross_extent = cross_extent.max(cross - self.config.sibling_gap);
            main_pos += layer_main + self.config.layer_gap;
        }
        let main_extent = main_pos - self.config.layer_gap;

        // Дети составных состояний в локальных координатах
        for element in diagram.elements.values() {
            if element.parent.is_none() && element.is_composite() {
                self.place_children(diagram, element, &sizes, &mut placed);
            }
        }

        // Проход 3: эмиссия
        for element in diagram.elements.values() {
            let Some(slot) = placed.get(&element.code) else {
                continue;
            };
            let cell_parent = element
                .parent
                .as_ref()
                .map(|p| element_ids[p].clone())
                .unwrap_or_else(|| parent.to_string());
            if element.is_composite() {
                let mut style = COMPOSITE_STYLE.to_string();
                if let Some(color) = &element.color {
                    style = style_replace(
                        &style,
                        "fillColor",
                        &drawuml_mx::color::normalize(color.as_str()),
                    );
                }
                if element.line_style == Some(LineStyle::Dashed) {
                    style.push_str("dashed=1;");
                }
                let cell = CellOptions::vertex(element_ids[&element.code].clone())
                    .with_value(element.display_name.clone())
                    .with_style(style)
                    .with_parent(cell_parent)
                    .with_geometry(Geometry::new(slot.x, slot.y, slot.width, slot.height));
                containers.push(build_cell(&cell).expect("composite cell"));

                // Пунктирные разделители конкурентных регионов
                if element.concurrent_regions.len() > 1 {
                    let mut region_y = self.config.composite_header;
                    for region in
                        &element.concurrent_regions[..element.concurrent_regions.len() - 1]
                    {
                        let region_h: f64 = region
                            .iter()
                            .filter_map(|c| sizes.get(c))
                            .map(|(_, h)| h + self.config.sibling_gap)
                            .sum();
                        region_y += region_h + self.config.composite_padding;
                        let line = CellOptions::edge(self.ids.next_id())
                            .with_style(REGION_LINE_STYLE)
                            .with_parent(element_ids[&element.code].clone())
                            .with_endpoints(
                                MxPoint::new(0.0, region_y),
                                MxPoint::new(slot.width, region_y),
                            );
                        edges.push(build_cell(&line).expect("region line cell"));
                    }
                }
            } else {
                self.emit_leaf(element, &element_ids, &cell_parent, *slot, &mut vertices);
            }
        }

        // Заметки
        for note in &diagram.notes {
            let width = self.config.note_width.max(
                crate::text_width(note.text.lines().next().unwrap_or(""), self.config.char_width)
                    + 20.0,
            );
            let height =
                crate::line_count(&note.text) as f64 * self.config.note_line_height + 10.0;
            let (x, y) = match note.entity_code.as_ref().and_then(|c| placed.get(c)) {
                Some(anchor) => (anchor.x + anchor.width + 30.0, anchor.y),
                None => (self.config.margin, main_extent + self.config.margin),
            };
            let note_id = self.ids.next_id();
            let cell = CellOptions::vertex(note_id.clone())
                .with_value(note.text.clone())
                .with_style(NOTE_STYLE)
                .with_parent(parent)
                .with_geometry(Geometry::new(x, y, width, height));
            notes.push(build_cell(&cell).expect("note cell"));
            if let Some(target) = note
                .entity_code
                .as_ref()
                .and_then(|c| element_ids.get(c))
            {
                let link = CellOptions::edge(self.ids.next_id())
                    .with_style(NOTE_LINK_STYLE)
                    .with_parent(parent)
                    .with_source(note_id)
                    .with_target(target.clone());
                edges.push(build_cell(&link).expect("note link cell"));
            }
        }

        // Переходы поверх всего
        for transition in &diagram.transitions {
            let (Some(from_id), Some(to_id)) = (
                element_ids.get(&transition.from),
                element_ids.get(&transition.to),
            ) else {
                continue;
            };
            let mut style = String::from("html=1;rounded=0;");
            match transition.line_style {
                LineStyle::Dashed | LineStyle::Dotted => style.push_str("dashed=1;"),
                LineStyle::Bold => style.push_str("strokeWidth=2;"),
                _ => {}
            }
            if transition.circle_end {
                style.push_str("endArrow=oval;endFill=0;");
            } else {
                style.push_str("endArrow=block;endFill=1;");
            }
            if transition.cross_start {
                style.push_str("startArrow=cross;startFill=0;");
            }
            if let Some(color) = &transition.color {
                style.push_str(&format!(
                    "strokeColor={};",
                    drawuml_mx::color::normalize(color.as_str())
                ));
            }
            let mut cell = CellOptions::edge(self.ids.next_id())
                .with_style(style)
                .with_parent(parent)
                .with_source(from_id.clone())
                .with_target(to_id.clone());
            if let Some(label) = &transition.label {
                cell = cell.with_value(label.clone());
            }
            edges.push(build_cell(&cell).expect("transition cell"));
        }

        let mut cells = containers;
        cells.extend(vertices);
        cells.extend(notes);
        cells.extend(edges);
        EmitResult {
            cells,
            width: if ltr { main_extent } else { cross_extent } + self.config.margin,
            height: if ltr { cross_extent } else { main_extent } + self.config.margin,
        }
    }

    /// Измеряет элемент; составные — стопка детей
    fn measure(
        &self,
        diagram: &StateDiagram,
        element: &StateElement,
        sizes: &mut IndexMap<String, (f64, f64)>,
    ) -> (f64, f64) {
        let size = match element.kind {
            StateKind::Initial | StateKind::Final => {
                (self.config.pseudo_size, self.config.pseudo_size)
            }
            StateKind::Choice => (self.config.choice_size, self.config.choice_size),
            StateKind::ForkJoin | StateKind::SynchroBar => {
                (self.config.bar_length, self.config.bar_thickness)
            }
            StateKind::History | StateKind::DeepHistory => {
                (self.config.pseudo_size + 6.0, self.config.pseudo_size + 6.0)
            }
            StateKind::State => {
                if element.is_composite() {
                    let mut width: f64 = 0.0;
                    let mut height: f64 = 0.0;
                    for child_code in &element.children {
                        if let Some(child) = diagram.elements.get(child_code) {
                            let (w, h) = self.measure(diagram, child, sizes);
                            width = width.max(w);
                            height += h + self.config.sibling_gap;
                        }
                    }
                    let title_w =
                        crate::text_width(&element.display_name, self.config.char_width) + 30.0;
                    (
                        (width + self.config.composite_padding * 2.0).max(title_w),
                        height + self.config.composite_header + self.config.composite_padding,
                    )
                } else {
                    let mut width =
                        crate::text_width(&element.display_name, self.config.char_width) + 30.0;
                    for line in &element.descriptions {
                        width = width.max(crate::text_width(line, self.config.char_width) + 20.0);
                    }
                    (
                        width.max(self.config.state_min_width),
                        self.config.state_height
                            + element.descriptions.len() as f64 * self.config.description_height,
                    )
                }
            }
        };
        sizes.insert(element.code.clone(), size);
        size
    }

    /// Размещает детей составного состояния стопкой в его локальных
    /// координатах (с учётом конкурентных регионов)
    fn place_children(
        &self,
        diagram: &StateDiagram,
        element: &StateElement,
        sizes: &IndexMap<String, (f64, f64)>,
        placed: &mut IndexMap<String, Placed>,
    ) {
        let mut y = self.config.composite_header;
        let regions: Vec<Vec<String>> = if element.concurrent_regions.len() > 1 {
            element.concurrent_regions.clone()
        } else {
            vec![element.children.clone()]
        };
        for region in &regions {
            for child_code in region {
                let Some(&(w, h)) = sizes.get(child_code) else {
                    continue;
                };
                placed.insert(
                    child_code.clone(),
                    Placed {
                        x: self.config.composite_padding,
                        y,
                        width: w,
                        height: h,
                    },
                );
                y += h + self.config.sibling_gap;
                if let Some(child) = diagram.elements.get(child_code) {
                    if child.is_composite() {
                        self.place_children(diagram, child, sizes, placed);
                    }
                }
            }
            y += self.config.composite_padding;
        }
    }

    /// Эмитирует листовое состояние или псевдосостояние
    fn emit_leaf(
        &mut self,
        element: &StateElement,
        element_ids: &IndexMap<String, String>,
        parent: &str,
        slot: Placed,
        vertices: &mut Vec<String>,
    ) {
        let id = element_ids[&element.code].clone();
        match element.kind {
            StateKind::Initial => {
                let cell = CellOptions::vertex(id)
                    .with_style(INITIAL_STYLE)
                    .with_parent(parent)
                    .with_geometry(Geometry::new(slot.x, slot.y, slot.width, slot.height));
                vertices.push(build_cell(&cell).expect("initial cell"));
            }
            StateKind::Final => {
                // Внешнее кольцо и внутренний закрашенный круг
                let cell = CellOptions::vertex(id.clone())
                    .with_style(FINAL_OUTER_STYLE)
                    .with_parent(parent)
                    .with_geometry(Geometry::new(slot.x, slot.y, slot.width, slot.height));
                vertices.push(build_cell(&cell).expect("final outer cell"));
                let inset = slot.width * 0.25;
                let inner = CellOptions::vertex(self.ids.next_id())
                    .with_style(FINAL_INNER_STYLE)
                    .with_parent(id)
                    .with_geometry(Geometry::new(
                        inset,
                        inset,
                        slot.width - inset * 2.0,
                        slot.height - inset * 2.0,
                    ));
                vertices.push(build_cell(&inner).expect("final inner cell"));
            }
            StateKind::Choice => {
                let cell = CellOptions::vertex(id)
                    .with_value(element.display_name.clone())
                    .with_style(CHOICE_STYLE)
                    .with_parent(parent)
                    .with_geometry(Geometry::new(slot.x, slot.y, slot.width, slot.height));
                vertices.push(build_cell(&cell).expect("choice cell"));
            }
            StateKind::ForkJoin | StateKind::SynchroBar => {
                let cell = CellOptions::vertex(id)
                    .with_style(BAR_STYLE)
                    .with_parent(parent)
                    .with_geometry(Geometry::new(slot.x, slot.y, slot.width, slot.height));
                vertices.push(build_cell(&cell).expect("bar cell"));
            }
            StateKind::History | StateKind::DeepHistory => {
                let label = if element.kind == StateKind::History {
                    "H"
                } else {
                    "H*"
                };
                let cell = CellOptions::vertex(id)
                    .with_value(label)
                    .with_style(HISTORY_STYLE)
                    .with_parent(parent)
                    .with_geometry(Geometry::new(slot.x, slot.y, slot.width, slot.height));
                vertices.push(build_cell(&cell).expect("history cell"));
            }
            StateKind::State => {
                let mut value = element.display_name.clone();
                for stereo in &element.stereotypes {
                    value.push_str(&format!("\n«{}»", stereo));
                }
                for line in &element.descriptions {
                    value.push('\n');
                    value.push_str(line);
                }
                let mut style = STATE_STYLE.to_string();
                if let Some(color) = &element.color {
                    style = style_replace(
                        &style,
                        "fillColor",
                        &drawuml_mx::color::normalize(color.as_str()),
                    );
                }
                if element.line_style == Some(LineStyle::Dashed) {
                    style.push_str("dashed=1;");
                }
                let cell = CellOptions::vertex(id)
                    .with_value(value)
                    .with_style(style)
                    .with_parent(parent)
                    .with_geometry(Geometry::new(slot.x, slot.y, slot.width, slot.height));
                vertices.push(build_cell(&cell).expect("state cell"));
            }
        }
    }
}

impl Default for StateEmitter {
    fn default() -> Self {
        Self::new()
    }
}
