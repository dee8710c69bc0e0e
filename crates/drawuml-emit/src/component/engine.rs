//! Эмиттер Component/Deployment/Use-Case диаграмм.
//!
//! Сеточная раскладка: элементы вне контейнеров рядами, контейнеры
//! измеряются снизу вверх и растягиваются под содержимое; элементы
//! внутри контейнера размещаются в его локальных координатах.
//! Z-порядок: контейнеры -> элементы -> заметки -> рёбра.

use indexmap::IndexMap;

use drawuml_mx::{build_cell, style_replace, CellIdAllocator, CellOptions, Geometry};
use drawuml_model::common::{LineStyle, LinkDecor, NotePosition};
use drawuml_model::component::{ComponentDiagram, ComponentElement, ComponentKind};

use super::config::ComponentEmitConfig;
use crate::EmitResult;

const NOTE_STYLE: &str = "shape=note;whiteSpace=wrap;html=1;backgroundOutline=1;fillColor=#FEFFDD;";
const NOTE_LINK_STYLE: &str = "endArrow=none;dashed=1;html=1;";
const TITLE_STYLE: &str = "text;html=1;align=center;fontSize=14;fontStyle=1;";

/// Словарь стилей по типам элементов
fn element_style(kind: ComponentKind) -> &'static str {
    match kind {
        ComponentKind::Component => "shape=component;align=center;spacingLeft=36;html=1;whiteSpace=wrap;",
        ComponentKind::Interface | ComponentKind::Circle => {
            "ellipse;whiteSpace=wrap;html=1;verticalLabelPosition=bottom;verticalAlign=top;"
        }
        ComponentKind::Actor => {
            "shape=umlActor;verticalLabelPosition=bottom;verticalAlign=top;html=1;outlineConnect=0;"
        }
        ComponentKind::ActorBusiness => {
            "shape=umlActor;verticalLabelPosition=bottom;verticalAlign=top;html=1;outlineConnect=0;dashed=1;"
        }
        ComponentKind::UseCase => "ellipse;whiteSpace=wrap;html=1;",
        ComponentKind::UseCaseBusiness => "ellipse;whiteSpace=wrap;html=1;dashed=1;",
        ComponentKind::Agent => "rounded=0;whiteSpace=wrap;html=1;",
        ComponentKind::Artifact | ComponentKind::File => {
            "shape=note;whiteSpace=wrap;html=1;backgroundOutline=1;"
        }
        ComponentKind::Boundary => {
            "shape=mxgraph.sysml.boundary;html=1;verticalLabelPosition=bottom;verticalAlign=top;"
        }
        ComponentKind::Card => "shape=card;whiteSpace=wrap;html=1;",
        ComponentKind::Cloud => "shape=cloud;whiteSpace=wrap;html=1;",
        ComponentKind::Collections | ComponentKind::Stack => {
            "shape=mxgraph.basic.layered_rect;whiteSpace=wrap;html=1;"
        }
        ComponentKind::Control => {
            "shape=mxgraph.sysml.control;html=1;verticalLabelPosition=bottom;verticalAlign=top;"
        }
        ComponentKind::Database => {
            "shape=cylinder3;whiteSpace=wrap;html=1;boundedLbl=1;backgroundOutline=1;"
        }
        ComponentKind::Datastore => "shape=mxgraph.eip.dataStore;html=1;verticalLabelPosition=bottom;",
        ComponentKind::Entity => {
            "shape=mxgraph.sysml.entity;html=1;verticalLabelPosition=bottom;verticalAlign=top;"
        }
        ComponentKind::Folder => "shape=folder;whiteSpace=wrap;html=1;tabWidth=60;tabHeight=16;",
        ComponentKind::Frame => "rounded=0;whiteSpace=wrap;html=1;verticalAlign=top;align=left;spacingLeft=6;",
        ComponentKind::Hexagon => "shape=hexagon;whiteSpace=wrap;html=1;",
        ComponentKind::Label => "text;html=1;align=center;",
        ComponentKind::Node => "shape=process;whiteSpace=wrap;html=1;",
        ComponentKind::Package => "shape=mxgraph.sysml.package;html=1;verticalAlign=top;align=left;spacingLeft=8;",
        ComponentKind::Person => "shape=mxgraph.basic.person;html=1;verticalLabelPosition=bottom;verticalAlign=top;",
        ComponentKind::Process => "shape=mxgraph.flowchart.process;whiteSpace=wrap;html=1;",
        ComponentKind::Queue => {
            "shape=mxgraph.sysml.queue;whiteSpace=wrap;html=1;"
        }
        ComponentKind::Rectangle => "rounded=0;whiteSpace=wrap;html=1;",
        ComponentKind::Storage => "rounded=1;whiteSpace=wrap;html=1;arcSize=40;",
    }
}

/// Стиль контейнера по типу
fn container_style(kind: ComponentKind) -> String {
    let base = match kind {
        ComponentKind::Cloud => "shape=cloud;whiteSpace=wrap;html=1;verticalAlign=top;",
        ComponentKind::Database => {
            "shape=cylinder3;whiteSpace=wrap;html=1;boundedLbl=1;backgroundOutline=1;verticalAlign=top;"
        }
        ComponentKind::Folder => {
            "shape=folder;whiteSpace=wrap;html=1;tabWidth=60;tabHeight=16;verticalAlign=top;"
        }
        ComponentKind::Package => {
            "shape=mxgraph.sysml.package;html=1;verticalAlign=top;align=left;spacingLeft=8;"
        }
        ComponentKind::Node => "shape=process;whiteSpace=wrap;html=1;verticalAlign=top;",
        ComponentKind::Hexagon => "shape=hexagon;whiteSpace=wrap;html=1;verticalAlign=top;",
        _ => "rounded=0;whiteSpace=wrap;html=1;verticalAlign=top;align=left;spacingLeft=6;",
    };
    format!("{}container=1;collapsible=0;", base)
}

/// Декоратор -> (имя стрелки, заливка); таблица фиксирована
fn decor_arrow(decor: LinkDecor) -> Option<(&'static str, u8)> {
    match decor {
        LinkDecor::None => None,
        LinkDecor::Arrow => Some(("open", 0)),
        LinkDecor::Extension => Some(("block", 0)),
        LinkDecor::Composition => Some(("diamond", 1)),
        LinkDecor::Aggregation => Some(("diamond", 0)),
        LinkDecor::Circle => Some(("oval", 0)),
        LinkDecor::CircleFilled => Some(("oval", 1)),
        LinkDecor::Cross => Some(("cross", 0)),
        LinkDecor::Square | LinkDecor::Plus => Some(("box", 0)),
        LinkDecor::CrowFoot => Some(("ERmany", 0)),
        LinkDecor::OneMany => Some(("ERoneToMany", 0)),
        LinkDecor::One => Some(("ERmandOne", 0)),
        LinkDecor::ZeroOne => Some(("ERzeroToOne", 0)),
    }
}

#[derive(Debug, Clone, Copy)]
struct Placed {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

enum ItemKey {
    Element(String),
    Container(String),
}

impl ItemKey {
    fn code(&self) -> &str {
        match self {
            Self::Element(code) => code,
            Self::Container(path) => path,
        }
    }
}

struct GridItem {
    key: ItemKey,
    width: f64,
    height: f64,
}

/// Эмиттер component/deployment/use-case диаграмм
pub struct ComponentEmitter {
    config: ComponentEmitConfig,
    ids: CellIdAllocator,
}

impl ComponentEmitter {
    /// Создаёт эмиттер с конфигурацией по умолчанию
    pub fn new() -> Self {
        Self {
            config: ComponentEmitConfig::default(),
            ids: CellIdAllocator::default(),
        }
    }

    /// Создаёт эмиттер с заданной конфигурацией
    pub fn with_config(config: ComponentEmitConfig) -> Self {
        Self {
            config,
            ids: CellIdAllocator::default(),
        }
    }

    /// Эмитирует диаграмму
    pub fn emit(&mut self, diagram: &ComponentDiagram, parent: &str) -> EmitResult {
        let mut containers: Vec<String> = Vec::new();
        let mut vertices: Vec<String> = Vec::new();
        let mut notes: Vec<String> = Vec::new();
        let mut edges: Vec<String> = Vec::new();

        let element_ids: IndexMap<String, String> = diagram
            .elements
            .keys()
            .map(|code| (code.clone(), self.ids.next_id()))
            .collect();
        let container_ids: IndexMap<String, String> = diagram
            .containers
            .keys()
            .map(|path| (path.clone(), self.ids.next_id()))
            .collect();

        let title_offset = if diagram.title.is_some() { 35.0 } else { 0.0 };
        if let Some(title) = &diagram.title {
            let cell = CellOptions::vertex(self.ids.next_id())
                .with_value(title.clone())
                .with_style(TITLE_STYLE)
                .with_parent(parent)
                .with_geometry(Geometry::new(self.config.margin, 5.0, 400.0, 25.0));
            vertices.push(build_cell(&cell).expect("title cell"));
        }

        // Сетка верхнего уровня
        let mut top_items: Vec<GridItem> = Vec::new();
        for (code, element) in &diagram.elements {
            if element.container_path.is_none() {
                let (w, h) = self.measure_element(element);
                top_items.push(GridItem {
                    key: ItemKey::Element(code.clone()),
                    width: w,
                    height: h,
                });
            }
        }
        for (path, container) in &diagram.containers {
            if container.parent.is_none() {
                let (w, h) = self.measure_container(diagram, path);
                top_items.push(GridItem {
                    key: ItemKey::Container(path.clone()),
                    width: w,
                    height: h,
                });
            }
        }

        let mut placed: IndexMap<String, Placed> = IndexMap::new();
        let bounds = self.place_grid(
            &top_items,
            self.config.margin,
            self.config.margin + title_offset,
            &mut placed,
        );
        for (path, container) in &diagram.containers {
            if container.parent.is_none() {
                self.place_container_children(diagram, path, &mut placed);
            }
        }

        // Контейнеры
        for (path, container) in &diagram.containers {
            let Some(slot) = placed.get(path) else { continue };
            let cell_parent = container
                .parent
                .as_ref()
                .and_then(|p| container_ids.get(p).cloned())
                .unwrap_or_else(|| parent.to_string());
            let mut style = container_style(container.kind);
            if let Some(color) = &container.color {
                style = style_replace(
                    &style,
                    "fillColor",
                    &drawuml_mx::color::normalize(color.as_str()),
                );
            }
            let value = match &container.stereotype {
                Some(stereo) => format!("«{}»\n{}", stereo, container.display_name),
                None => container.display_name.clone(),
            };
            let cell = CellOptions::vertex(container_ids[path].clone())
                .with_value(value)
                .with_style(style)
                .with_parent(cell_parent)
                .with_geometry(Geometry::new(slot.x, slot.y, slot.width, slot.height));
            containers.push(build_cell(&cell).expect("container cell"));
        }

        // Элементы
        for (code, element) in &diagram.elements {
            let Some(slot) = placed.get(code) else { continue };
            let cell_parent = element
                .container_path
                .as_ref()
                .and_then(|p| container_ids.get(p).cloned())
                .unwrap_or_else(|| parent.to_string());
            let mut style = element_style(element.kind).to_string();
            if let Some(color) = &element.color {
                style = style_replace(
                    &style,
                    "fillColor",
                    &drawuml_mx::color::normalize(color.as_str()),
                );
            }
            let value = match &element.stereotype {
                Some(stereo) => format!("«{}»\n{}", stereo, element.display_name),
                None => element.display_name.clone(),
            };
            let cell = CellOptions::vertex(element_ids[code].clone())
                .with_value(value)
                .with_style(style)
                .with_parent(cell_parent)
                .with_geometry(Geometry::new(slot.x, slot.y, slot.width, slot.height));
            vertices.push(build_cell(&cell).expect("element cell"));
        }

        // Заметки
        let mut note_y = bounds.1 + self.config.v_gap;
        for note in &diagram.notes {
            let width = self.config.note_width.max(
                crate::text_width(note.text.lines().next().unwrap_or(""), self.config.char_width)
                    + 20.0,
            );
            let height =
                crate::line_count(&note.text) as f64 * self.config.note_line_height + 10.0;
            let (x, y) = match note.entity_code.as_ref().and_then(|c| placed.get(c)) {
                Some(anchor) => match note.position {
                    NotePosition::Left => (anchor.x - width - 30.0, anchor.y),
                    NotePosition::Top => (anchor.x, anchor.y - height - 25.0),
                    NotePosition::Bottom => (anchor.x, anchor.y + anchor.height + 25.0),
                    _ => (anchor.x + anchor.width + 30.0, anchor.y),
                },
                None => {
                    let pos = (self.config.margin, note_y);
                    note_y += height + 15.0;
                    pos
                }
            };
            let note_id = self.ids.next_id();
            let style = match &note.color {
                Some(c) => style_replace(
                    NOTE_STYLE,
                    "fillColor",
                    &drawuml_mx::color::normalize(c.as_str()),
                ),
                None => NOTE_STYLE.to_string(),
            };
            let cell = CellOptions::vertex(note_id.clone())
                .with_value(note.text.clone())
                .with_style(style)
                .with_parent(parent)
                .with_geometry(Geometry::new(x.max(0.0), y.max(0.0), width, height));
            notes.push(build_cell(&cell).expect("note cell"));

            if let Some(element_id) = note
                .entity_code
                .as_ref()
                .and_then(|c| element_ids.get(c).or_else(|| container_ids.get(c)))
            {
                let link = CellOptions::edge(self.ids.next_id())
                    .with_style(NOTE_LINK_STYLE)
                    .with_parent(parent)
                    .with_source(note_id)
                    .with_target(element_id.clone());
                edges.push(build_cell(&link).expect("note link cell"));
            }
        }

        // Рёбра
        for rel in &diagram.relationships {
            if rel.line_style == LineStyle::Hidden {
                continue;
            }
            let (Some(from_id), Some(to_id)) = (
                element_ids
                    .get(&rel.from)
                    .or_else(|| container_ids.get(&rel.from)),
                element_ids
                    .get(&rel.to)
                    .or_else(|| container_ids.get(&rel.to)),
            ) else {
                continue;
            };
            let mut style = String::from("html=1;rounded=0;");
            match rel.line_style {
                LineStyle::Dashed | LineStyle::Dotted => style.push_str("dashed=1;"),
                LineStyle::Bold => style.push_str("strokeWidth=2;"),
                _ => {}
            }
            match decor_arrow(rel.right_decor) {
                Some((arrow, fill)) => {
                    style.push_str(&format!("endArrow={};endFill={};", arrow, fill))
                }
                None => style.push_str("endArrow=none;"),
            }
            if let Some((arrow, fill)) = decor_arrow(rel.left_decor) {
                style.push_str(&format!("startArrow={};startFill={};", arrow, fill));
            }
            if let Some(color) = &rel.color {
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
            if let Some(label) = &rel.label {
                cell = cell.with_value(label.clone());
            }
            edges.push(build_cell(&cell).expect("relationship cell"));
        }

        let mut cells = containers;
        cells.extend(vertices);
        cells.extend(notes);
        cells.extend(edges);
        EmitResult {
            cells,
            width: bounds.0 + self.config.margin,
            height: note_y.max(bounds.1) + self.config.margin,
        }
    }

    /// Габариты элемента
    fn measure_element(&self, element: &ComponentElement) -> (f64, f64) {
        match element.kind {
            ComponentKind::Actor
            | ComponentKind::ActorBusiness
            | ComponentKind::Boundary
            | ComponentKind::Control
            | ComponentKind::Entity
            | ComponentKind::Person => (40.0, 60.0),
            ComponentKind::Interface | ComponentKind::Circle => (30.0, 30.0),
            ComponentKind::UseCase | ComponentKind::UseCaseBusiness => (
                self.config.width_for_name(&element.display_name) + 20.0,
                self.config.element_height,
            ),
            _ => (
                self.config.width_for_name(&element.display_name),
                self.config.element_height,
            ),
        }
    }

    /// Габариты контейнера (рекурсивно)
    fn measure_container(&self, diagram: &ComponentDiagram, path: &str) -> (f64, f64) {
        let items = self.container_items(diagram, path);
        let (w, h) = self.grid_size(&items);
        (
            w + self.config.container_padding * 2.0,
            h + self.config.container_header + self.config.container_padding * 2.0,
        )
    }

    fn container_items(&self, diagram: &ComponentDiagram, path: &str) -> Vec<GridItem> {
        let mut items = Vec::new();
        if let Some(container) = diagram.containers.get(path) {
            for code in &container.children {
                if let Some(element) = diagram.elements.get(code) {
                    let (w, h) = self.measure_element(element);
                    items.push(GridItem {
                        key: ItemKey::Element(code.clone()),
                        width: w,
                        height: h,
                    });
                }
            }
            for sub in &container.sub_containers {
                let (w, h) = self.measure_container(diagram, sub);
                items.push(GridItem {
                    key: ItemKey::Container(sub.clone()),
                    width: w,
                    height: h,
                });
            }
        }
        items
    }

    fn grid_size(&self, items: &[GridItem]) -> (f64, f64) {
        let mut width: f64 = 0.0;
        let mut height: f64 = 0.0;
        for row in items.chunks(self.config.cols_per_row) {
            let row_w: f64 = row.iter().map(|i| i.width).sum::<f64>()
                + (row.len() as f64 - 1.0) * self.config.h_gap;
            let row_h = row.iter().map(|i| i.height).fold(0.0, f64::max);
            width = width.max(row_w);
            height += row_h + self.config.v_gap;
        }
        (width.max(120.0), (height - self.config.v_gap).max(50.0))
    }

    fn place_grid(
        &self,
        items: &[GridItem],
        origin_x: f64,
        origin_y: f64,
        placed: &mut IndexMap<String, Placed>,
    ) -> (f64, f64) {
        let mut max_x = origin_x;
        let mut y = origin_y;
        for row in items.chunks(self.config.cols_per_row) {
            let mut x = origin_x;
            let row_h = row.iter().map(|i| i.height).fold(0.0, f64::max);
            for item in row {
                placed.insert(
                    item.key.code().to_string(),
                    Placed {
                        x,
                        y,
                        width: item.width,
                        height: item.height,
                    },
                );
                x += item.width + self.config.h_gap;
            }
            max_x = max_x.max(x - self.config.h_gap);
            y += row_h + self.config.v_gap;
        }
        (max_x, y - self.config.v_gap)
    }

    fn place_container_children(
        &self,
        diagram: &ComponentDiagram,
        path: &str,
        placed: &mut IndexMap<String, Placed>,
    ) {
        let items = self.container_items(diagram, path);
        self.place_grid(
            &items,
            self.config.container_padding,
            self.config.container_header + self.config.container_padding,
            placed,
        );
        if let Some(container) = diagram.containers.get(path) {
            for sub in &container.sub_containers {
                self.place_container_children(diagram, sub, placed);
            }
        }
    }
}

impl Default for ComponentEmitter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drawuml_model::component::{ComponentContainer, ComponentRelationship};

    #[test]
    fn test_usecase_scene() {
        let mut d = ComponentDiagram::new();
        d.add_element(ComponentElement::new("Customer", "Customer", ComponentKind::Actor));
        d.add_element(ComponentElement::new(
            "Placeorder",
            "Place order",
            ComponentKind::UseCase,
        ));
        d.add_relationship(ComponentRelationship::new("Customer", "Placeorder"));
        let result = ComponentEmitter::new().emit(&d, "1");
        assert!(result.cells.iter().any(|c| c.contains("shape=umlActor")));
        assert!(result.cells.iter().any(|c| c.contains("ellipse") && c.contains("Place order")));
        assert!(result
            .cells
            .iter()
            .any(|c| c.contains("edge=\"1\"") && c.contains("source=") && c.contains("target=")));
    }

    #[test]
    fn test_container_before_children() {
        let mut d = ComponentDiagram::new();
        d.containers.insert(
            "Srv".into(),
            ComponentContainer::new("Srv", "Server", ComponentKind::Node, "Srv"),
        );
        let mut app = ComponentElement::new("App", "App", ComponentKind::Component);
        app.container_path = Some("Srv".into());
        d.containers.get_mut("Srv").unwrap().children.push("App".into());
        d.add_element(app);
        let result = ComponentEmitter::new().emit(&d, "1");
        let container_pos = result
            .cells
            .iter()
            .position(|c| c.contains("container=1"))
            .unwrap();
        let app_pos = result
            .cells
            .iter()
            .position(|c| c.contains("shape=component"))
            .unwrap();
        assert!(container_pos < app_pos);
    }

    #[test]
    fn test_dashed_extension_edge() {
        let mut d = ComponentDiagram::new();
        d.add_element(ComponentElement::new("A", "A", ComponentKind::UseCase));
        d.add_element(ComponentElement::new("B", "B", ComponentKind::UseCase));
        let mut rel = ComponentRelationship::new("A", "B");
        rel.line_style = LineStyle::Dashed;
        rel.right_decor = LinkDecor::Arrow;
        d.add_relationship(rel);
        let result = ComponentEmitter::new().emit(&d, "1");
        assert!(result
            .cells
            .iter()
            .any(|c| c.contains("dashed=1") && c.contains("endArrow=open")));
    }

    #[test]
    fn test_database_shape() {
        let mut d = ComponentDiagram::new();
        d.add_element(ComponentElement::new("DB", "Store", ComponentKind::Database));
        let result = ComponentEmitter::new().emit(&d, "1");
        assert!(result.cells.iter().any(|c| c.contains("shape=cylinder3")));
    }

    #[test]
    fn test_hidden_relationship_skipped() {
        let mut d = ComponentDiagram::new();
        d.add_element(ComponentElement::new("A", "A", ComponentKind::Component));
        d.add_element(ComponentElement::new("B", "B", ComponentKind::Component));
        let mut rel = ComponentRelationship::new("A", "B");
        rel.line_style = LineStyle::Hidden;
        d.add_relationship(rel);
        let result = ComponentEmitter::new().emit(&d, "1");
        assert!(!result.cells.iter().any(|c| c.contains("edge=\"1\"")));
    }
}
