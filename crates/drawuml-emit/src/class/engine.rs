//! Эмиттер Class Diagrams.
//!
//! Простая сетка: сущности вне пакетов раскладываются рядами по
//! `cols_per_row`, пакеты измеряются снизу вверх и участвуют в сетке
//! как единые элементы, внутренности пакета размещаются рекурсивно в
//! его локальных координатах. Z-порядок: контейнеры -> сущности ->
//! заметки -> рёбра.

use indexmap::IndexMap;

use drawuml_mx::{build_cell, style_replace, CellIdAllocator, CellOptions, Geometry};
use drawuml_model::class::{
    ClassDiagram, ClassEntity, ClassItem, ClassKind, JsonNode, Member, MemberKind,
};
use drawuml_model::common::{LineStyle, LinkDecor, NotePosition};

use super::config::ClassEmitConfig;
use crate::EmitResult;

const SWIMLANE_STYLE: &str = "swimlane;fontStyle=1;align=center;verticalAlign=top;childLayout=stackLayout;horizontal=1;startSize=26;horizontalStack=0;resizeParent=0;collapsible=0;marginBottom=0;html=1;whiteSpace=wrap;container=1;";
const MEMBER_STYLE: &str = "text;strokeColor=none;fillColor=none;align=left;verticalAlign=middle;spacingLeft=4;spacingRight=4;overflow=hidden;rotatable=0;points=[[0,0.5],[1,0.5]];portConstraint=eastwest;html=1;";
const SEPARATOR_STYLE: &str = "line;strokeWidth=1;fillColor=none;align=left;verticalAlign=middle;spacingTop=-1;spacingLeft=3;spacingRight=3;rotatable=0;labelPosition=right;points=[];portConstraint=eastwest;html=1;";
const CIRCLE_STYLE: &str = "ellipse;whiteSpace=wrap;html=1;verticalLabelPosition=bottom;verticalAlign=top;";
const LOLLIPOP_STYLE: &str =
    "ellipse;whiteSpace=wrap;html=1;fillColor=#000000;verticalLabelPosition=bottom;verticalAlign=top;";
const DIAMOND_STYLE: &str = "rhombus;whiteSpace=wrap;html=1;";
const PACKAGE_STYLE: &str =
    "shape=mxgraph.sysml.package;html=1;verticalAlign=top;align=left;spacingLeft=8;container=1;";
const NOTE_STYLE: &str = "shape=note;whiteSpace=wrap;html=1;backgroundOutline=1;fillColor=#FEFFDD;";
const NOTE_LINK_STYLE: &str = "endArrow=none;dashed=1;html=1;";
const TITLE_STYLE: &str = "text;html=1;align=center;fontSize=14;fontStyle=1;";
const LABEL_STYLE: &str = "text;html=1;fontSize=10;";

/// Декоратор -> (имя стрелки draw.io, заливка)
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

/// Позиция размещённого элемента
#[derive(Debug, Clone, Copy)]
struct Placed {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

/// Эмиттер class diagram
pub struct ClassEmitter {
    config: ClassEmitConfig,
    ids: CellIdAllocator,
}

impl ClassEmitter {
    /// Создаёт эмиттер с конфигурацией по умолчанию
    pub fn new() -> Self {
        Self {
            config: ClassEmitConfig::default(),
            ids: CellIdAllocator::default(),
        }
    }

    /// Создаёт эмиттер с заданной конфигурацией
    pub fn with_config(config: ClassEmitConfig) -> Self {
        Self {
            config,
            ids: CellIdAllocator::default(),
        }
    }

    /// Эмитирует диаграмму
    pub fn emit(&mut self, diagram: &ClassDiagram, parent: &str) -> EmitResult {
        let mut containers: Vec<String> = Vec::new();
        let mut vertices: Vec<String> = Vec::new();
        let mut notes: Vec<String> = Vec::new();
        let mut edges: Vec<String> = Vec::new();

        // Идентификаторы ячеек сущностей и пакетов
        let entity_ids: IndexMap<String, String> = diagram
            .entities
            .keys()
            .map(|code| (code.clone(), self.ids.next_id()))
            .collect();
        let package_ids: IndexMap<String, String> = diagram
            .packages
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

        // Сетка верхнего уровня: сущности вне пакетов + пакеты без родителя
        let mut top_items: Vec<GridItem> = Vec::new();
        for (code, entity) in &diagram.entities {
            if entity.package_path.is_none() && !self.is_hidden(diagram, entity) {
                let (w, h) = self.measure_entity(diagram, entity);
                top_items.push(GridItem {
                    key: ItemKey::Entity(code.clone()),
                    width: w,
                    height: h,
                });
            }
        }
        for (path, package) in &diagram.packages {
            if package.parent.is_none() {
                let (w, h) = self.measure_package(diagram, path);
                top_items.push(GridItem {
                    key: ItemKey::Package(path.clone()),
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

        // Рекурсивное размещение внутренностей пакетов
        for (path, package) in &diagram.packages {
            if package.parent.is_none() {
                self.place_package_children(diagram, path, &mut placed);
            }
        }

        // Эмиссия: контейнеры, затем сущности
        for (path, package) in &diagram.packages {
            let Some(slot) = placed.get(path) else { continue };
            let cell_parent = package
                .parent
                .as_ref()
                .and_then(|p| package_ids.get(p).cloned())
                .unwrap_or_else(|| parent.to_string());
            let style = match &package.color {
                Some(c) => style_replace(
                    PACKAGE_STYLE,
                    "fillColor",
                    &drawuml_mx::color::normalize(c.as_str()),
                ),
                None => PACKAGE_STYLE.to_string(),
            };
            let cell = CellOptions::vertex(package_ids[path].clone())
                .with_value(package.name.clone())
                .with_style(style)
                .with_parent(cell_parent)
                .with_geometry(Geometry::new(slot.x, slot.y, slot.width, slot.height));
            containers.push(build_cell(&cell).expect("package cell"));
        }

        for (code, entity) in &diagram.entities {
            if self.is_hidden(diagram, entity) {
                continue;
            }
            let Some(slot) = placed.get(code) else { continue };
            let cell_parent = entity
                .package_path
                .as_ref()
                .and_then(|p| package_ids.get(p).cloned())
                .unwrap_or_else(|| parent.to_string());
            self.emit_entity(diagram, entity, &entity_ids[code], &cell_parent, *slot, &mut vertices);
        }

        // Заметки: рядом с сущностью-якорем, связаны пунктиром
        let mut note_y = bounds.1 + self.config.v_gap;
        for note in &diagram.notes {
            let width = self
                .config
                .note_width
                .max(self.config.padded_text_width(note.text.lines().next().unwrap_or("")));
            let height =
                crate::line_count(&note.text) as f64 * self.config.note_line_height + 10.0;
            let (x, y) = match note.entity_code.as_ref().and_then(|c| placed.get(c)) {
                Some(anchor) => match note.position {
                    NotePosition::Left => (anchor.x - width - 30.0, anchor.y),
                    NotePosition::Top => (anchor.x, anchor.y - height - 30.0),
                    NotePosition::Bottom => (anchor.x, anchor.y + anchor.height + 30.0),
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

            if let Some(entity_id) = note
                .entity_code
                .as_ref()
                .and_then(|c| entity_ids.get(c))
            {
                let link = CellOptions::edge(self.ids.next_id())
                    .with_style(NOTE_LINK_STYLE)
                    .with_parent(parent)
                    .with_source(note_id)
                    .with_target(entity_id.clone());
                edges.push(build_cell(&link).expect("note link cell"));
            }
        }

        // Рёбра связей
        for rel in &diagram.relationships {
            if rel.line_style == LineStyle::Hidden {
                continue;
            }
            let (Some(from_id), Some(to_id)) = (
                entity_ids.get(&rel.from).or_else(|| package_ids.get(&rel.from)),
                entity_ids.get(&rel.to).or_else(|| package_ids.get(&rel.to)),
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
            match decor_arrow(rel.left_decor) {
                Some((arrow, fill)) => {
                    style.push_str(&format!("startArrow={};startFill={};", arrow, fill))
                }
                None => style.push_str("startArrow=none;"),
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

            // Кардинальности — отдельные подписи у концов
            for (text, near_from) in [(&rel.left_label, true), (&rel.right_label, false)] {
                let Some(text) = text else { continue };
                let (Some(a), Some(b)) = (placed.get(&rel.from), placed.get(&rel.to)) else {
                    continue;
                };
                let t = if near_from { 0.2 } else { 0.8 };
                let cx = a.x + a.width / 2.0 + (b.x + b.width / 2.0 - a.x - a.width / 2.0) * t;
                let cy = a.y + a.height / 2.0 + (b.y + b.height / 2.0 - a.y - a.height / 2.0) * t;
                let label_cell = CellOptions::vertex(self.ids.next_id())
                    .with_value(text.clone())
                    .with_style(LABEL_STYLE)
                    .with_parent(parent)
                    .with_geometry(Geometry::new(cx, cy - 18.0, 40.0, 15.0));
                notes.push(build_cell(&label_cell).expect("cardinality cell"));
            }
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

    fn is_hidden(&self, diagram: &ClassDiagram, entity: &ClassEntity) -> bool {
        diagram
            .hidden_entities
            .iter()
            .any(|h| h.eq_ignore_ascii_case(&entity.code))
    }

    /// Видимые члены с учётом hide-директив
    fn visible_members<'a>(
        &self,
        diagram: &ClassDiagram,
        entity: &'a ClassEntity,
    ) -> Vec<&'a ClassItem> {
        entity
            .members
            .iter()
            .filter(|item| match item {
                ClassItem::Member(m) => match m.kind {
                    MemberKind::Field => !diagram.hidden_members.fields,
                    MemberKind::Method => !diagram.hidden_members.methods,
                },
                ClassItem::Separator(_) => true,
            })
            .collect()
    }

    /// Строки содержимого map/json тел
    fn extra_lines(&self, entity: &ClassEntity) -> Vec<String> {
        let mut out = Vec::new();
        for entry in &entity.map_entries {
            match (&entry.value, &entry.linked_target) {
                (Some(value), _) => out.push(format!("{} => {}", entry.key, value)),
                (None, Some(target)) => out.push(format!("{} -> {}", entry.key, target)),
                _ => out.push(entry.key.clone()),
            }
        }
        if let Some(node) = &entity.json_node {
            json_lines(node, "", &mut out);
        }
        out
    }

    /// Строки-декорации заголовка (стереотипы, extends/implements)
    fn header_lines(&self, entity: &ClassEntity) -> Vec<String> {
        let mut out = Vec::new();
        let implicit = match entity.kind {
            ClassKind::Interface => Some("interface"),
            ClassKind::Enum => Some("enumeration"),
            ClassKind::Annotation => Some("annotation"),
            ClassKind::Entity => Some("entity"),
            ClassKind::Protocol => Some("protocol"),
            ClassKind::Struct => Some("struct"),
            ClassKind::Exception => Some("exception"),
            ClassKind::Metaclass => Some("metaclass"),
            ClassKind::StereotypeType => Some("stereotype"),
            ClassKind::Dataclass => Some("dataclass"),
            ClassKind::Record => Some("record"),
            ClassKind::AbstractClass => Some("abstract"),
            _ => None,
        };
        if let Some(tag) = implicit {
            out.push(format!("«{}»", tag));
        }
        for stereo in &entity.stereotypes {
            out.push(format!("«{}»", stereo));
        }
        if !entity.extends.is_empty() {
            out.push(format!("extends {}", entity.extends.join(", ")));
        }
        if !entity.implements.is_empty() {
            out.push(format!("implements {}", entity.implements.join(", ")));
        }
        out
    }

    /// Габариты сущности
    fn measure_entity(&self, diagram: &ClassDiagram, entity: &ClassEntity) -> (f64, f64) {
        match entity.kind {
            ClassKind::Circle | ClassKind::LollipopFull => {
                return (40.0, 40.0 + 15.0);
            }
            ClassKind::Diamond => return (50.0, 50.0),
            _ => {}
        }
        let mut width = self.config.padded_text_width(&entity.display_name);
        if let Some(generics) = &entity.generic_params {
            width = width.max(self.config.padded_text_width(&format!("<{}>", generics)));
        }
        let members = self.visible_members(diagram, entity);
        for item in &members {
            if let ClassItem::Member(m) = item {
                width = width.max(self.config.padded_text_width(&m.raw_text));
            }
        }
        let extra = self.extra_lines(entity);
        for line in &extra {
            width = width.max(self.config.padded_text_width(line));
        }
        let header_extra = self.header_lines(entity).len() as f64 * 14.0;
        let rows = members.len() + extra.len();
        let height = self.config.header_height
            + header_extra
            + rows as f64 * self.config.member_height
            + if rows == 0 { 10.0 } else { 6.0 };
        (width.max(self.config.entity_min_width), height)
    }

    /// Габариты пакета (рекурсивно, снизу вверх)
    fn measure_package(&self, diagram: &ClassDiagram, path: &str) -> (f64, f64) {
        let items = self.package_items(diagram, path);
        let (w, h) = self.grid_size(&items);
        (
            w + self.config.container_padding * 2.0,
            h + self.config.container_header + self.config.container_padding * 2.0,
        )
    }

    fn package_items(&self, diagram: &ClassDiagram, path: &str) -> Vec<GridItem> {
        let mut items = Vec::new();
        if let Some(package) = diagram.packages.get(path) {
            for code in &package.entities {
                if let Some(entity) = diagram.entities.get(code) {
                    if !self.is_hidden(diagram, entity) {
                        let (w, h) = self.measure_entity(diagram, entity);
                        items.push(GridItem {
                            key: ItemKey::Entity(code.clone()),
                            width: w,
                            height: h,
                        });
                    }
                }
            }
            for sub in &package.sub_packages {
                let (w, h) = self.measure_package(diagram, sub);
                items.push(GridItem {
                    key: ItemKey::Package(sub.clone()),
                    width: w,
                    height: h,
                });
            }
        }
        items
    }

    /// Суммарный габарит сетки
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
        (width.max(100.0), (height - self.config.v_gap).max(40.0))
    }

    /// Размещает элементы сеткой; возвращает (макс. X, макс. Y)
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

    /// Рекурсивно размещает содержимое пакета в его локальных
    /// координатах
    fn place_package_children(
        &self,
        diagram: &ClassDiagram,
        path: &str,
        placed: &mut IndexMap<String, Placed>,
    ) {
        let items = self.package_items(diagram, path);
        let origin_x = self.config.container_padding;
        let origin_y = self.config.container_header + self.config.container_padding;
        self.place_grid(&items, origin_x, origin_y, placed);
        if let Some(package) = diagram.packages.get(path) {
            for sub in &package.sub_packages {
                self.place_package_children(diagram, sub, placed);
            }
        }
    }

    /// Эмитирует сущность и ячейки её членов
    fn emit_entity(
        &mut self,
        diagram: &ClassDiagram,
        entity: &ClassEntity,
        cell_id: &str,
        parent: &str,
        slot: Placed,
        vertices: &mut Vec<String>,
    ) {
        match entity.kind {
            ClassKind::Circle | ClassKind::LollipopFull | ClassKind::Diamond => {
                let style = match entity.kind {
                    ClassKind::Diamond => DIAMOND_STYLE,
                    ClassKind::LollipopFull => LOLLIPOP_STYLE,
                    _ => CIRCLE_STYLE,
                };
                let value = if entity.kind == ClassKind::Diamond {
                    String::new()
                } else {
                    entity.display_name.clone()
                };
                let cell = CellOptions::vertex(cell_id.to_string())
                    .with_value(value)
                    .with_style(style)
                    .with_parent(parent)
                    .with_geometry(Geometry::new(slot.x, slot.y, 40.0, 40.0));
                vertices.push(build_cell(&cell).expect("shape entity cell"));
                return;
            }
            _ => {}
        }

        let mut title = String::new();
        for line in self.header_lines(entity) {
            title.push_str(&line);
            title.push('\n');
        }
        title.push_str(&entity.display_name);
        if let Some(generics) = &entity.generic_params {
            title.push_str(&format!("<{}>", generics));
        }

        let mut style = SWIMLANE_STYLE.to_string();
        if entity.kind == ClassKind::AbstractClass {
            style = style_replace(&style, "fontStyle", "3");
        }
        if entity.kind == ClassKind::Object {
            style = style_replace(&style, "fontStyle", "5");
        }
        if let Some(color) = &entity.color {
            style = style_replace(
                &style,
                "fillColor",
                &drawuml_mx::color::normalize(color.as_str()),
            );
        }
        let header_extra = self.header_lines(entity).len() as f64 * 14.0;
        let start_size = self.config.header_height + header_extra;
        style = style_replace(&style, "startSize", &format!("{}", start_size as i64));

        let cell = CellOptions::vertex(cell_id.to_string())
            .with_value(title)
            .with_style(style)
            .with_parent(parent)
            .with_geometry(Geometry::new(slot.x, slot.y, slot.width, slot.height));
        vertices.push(build_cell(&cell).expect("entity cell"));

        // Члены — дочерние ячейки в координатах swimlane
        let mut member_y = start_size;
        let members = self.visible_members(diagram, entity);
        for item in members {
            match item {
                ClassItem::Member(member) => {
                    let cell = CellOptions::vertex(self.ids.next_id())
                        .with_value(member_text(member))
                        .with_style(member_style(member))
                        .with_parent(cell_id.to_string())
                        .with_geometry(Geometry::new(
                            0.0,
                            member_y,
                            slot.width,
                            self.config.member_height,
                        ));
                    vertices.push(build_cell(&cell).expect("member cell"));
                }
                ClassItem::Separator(separator) => {
                    let mut style = SEPARATOR_STYLE.to_string();
                    if separator.style != drawuml_model::class::SeparatorStyle::Solid {
                        style.push_str("dashed=1;");
                    }
                    let cell = CellOptions::vertex(self.ids.next_id())
                        .with_value(separator.label.clone().unwrap_or_default())
                        .with_style(style)
                        .with_parent(cell_id.to_string())
                        .with_geometry(Geometry::new(
                            0.0,
                            member_y,
                            slot.width,
                            self.config.member_height,
                        ));
                    vertices.push(build_cell(&cell).expect("separator cell"));
                }
            }
            member_y += self.config.member_height;
        }
        for line in self.extra_lines(entity) {
            let cell = CellOptions::vertex(self.ids.next_id())
                .with_value(line)
                .with_style(MEMBER_STYLE)
                .with_parent(cell_id.to_string())
                .with_geometry(Geometry::new(
                    0.0,
                    member_y,
                    slot.width,
                    self.config.member_height,
                ));
            vertices.push(build_cell(&cell).expect("extra line cell"));
            member_y += self.config.member_height;
        }
    }
}

impl Default for ClassEmitter {
    fn default() -> Self {
        Self::new()
    }
}

/// Текст члена: видимость + исходный остаток
fn member_text(member: &Member) -> String {
    member.raw_text.trim().to_string()
}

/// Стиль члена: статические подчёркнуты, абстрактные курсивом
fn member_style(member: &Member) -> String {
    let mut style = MEMBER_STYLE.to_string();
    if member.is_static {
        style.push_str("fontStyle=4;");
    } else if member.is_abstract {
        style.push_str("fontStyle=2;");
    }
    style
}

/// Ключ элемента сетки
enum ItemKey {
    Entity(String),
    Package(String),
}

impl ItemKey {
    fn code(&self) -> &str {
        match self {
            Self::Entity(code) => code,
            Self::Package(path) => path,
        }
    }
}

struct GridItem {
    key: ItemKey,
    width: f64,
    height: f64,
}

/// Плоские строки json-дерева
fn json_lines(node: &JsonNode, prefix: &str, out: &mut Vec<String>) {
    match node {
        JsonNode::Object(entries) => {
            for (key, value) in entries {
                match value {
                    JsonNode::Primitive(p) => out.push(format!("{}{}: {}", prefix, key, p)),
                    _ => {
                        out.push(format!("{}{}:", prefix, key));
                        json_lines(value, &format!("{}  ", prefix), out);
                    }
                }
            }
        }
        JsonNode::Array(items) => {
            for item in items {
                match item {
                    JsonNode::Primitive(p) => out.push(format!("{}- {}", prefix, p)),
                    _ => json_lines(item, &format!("{}  ", prefix), out),
                }
            }
        }
        JsonNode::Primitive(p) => out.push(format!("{}{}", prefix, p)),
    }
}
