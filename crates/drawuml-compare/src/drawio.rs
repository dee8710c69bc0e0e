//! Экстрактор нормализованной диаграммы из draw.io XML конвертера.
//!
//! Работает сопоставлением по известным фрагментам стилей
//! (`shape=umlActor`, `container=1`, `endArrow=block;endFill=1` и
//! т.п.) — словарь стилей эмиттера является частью контракта.

use indexmap::IndexMap;
use regex::Regex;

use crate::normalized::{
    normalize_text, NormalizedClass, NormalizedComponent, NormalizedEntity, NormalizedMessage,
    NormalizedParticipant, NormalizedRelation, NormalizedSequence, NormalizedState,
    NormalizedTiming,
};

/// Разобранная ячейка
#[derive(Debug, Clone, Default)]
pub(crate) struct RawCell {
    pub id: String,
    pub value: String,
    pub style: String,
    pub parent: String,
    pub source: String,
    pub target: String,
    pub vertex: bool,
    pub edge: bool,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub source_point: Option<(f64, f64)>,
    pub target_point: Option<(f64, f64)>,
}

/// Разбирает все mxCell документа
pub(crate) fn parse_cells(xml: &str) -> Vec<RawCell> {
    let attr_re = Regex::new(r#"([a-zA-Z]+)="([^"]*)""#).unwrap();
    let point_re =
        Regex::new(r#"<mxPoint x="([^"]+)" y="([^"]+)" as="(sourcePoint|targetPoint)""#).unwrap();
    let geo_re = Regex::new(r#"<mxGeometry ([^>/]*)"#).unwrap();

    let mut cells = Vec::new();
    let starts: Vec<usize> = xml.match_indices("<mxCell").map(|(i, _)| i).collect();
    for (i, &start) in starts.iter().enumerate() {
        let end = starts.get(i + 1).copied().unwrap_or(xml.len());
        let chunk = &xml[start..end];
        let tag_end = chunk.find('>').unwrap_or(chunk.len());
        let tag = &chunk[..tag_end];

        let mut cell = RawCell::default();
        for caps in attr_re.captures_iter(tag) {
            let value = caps[2].to_string();
            match &caps[1] {
                "id" => cell.id = value,
                "value" => cell.value = value,
                "style" => cell.style = value,
                "parent" => cell.parent = value,
                "source" => cell.source = value,
                "target" => cell.target = value,
                "vertex" => cell.vertex = value == "1",
                "edge" => cell.edge = value == "1",
                _ => {}
            }
        }
        if let Some(geo) = geo_re.captures(chunk) {
            for caps in attr_re.captures_iter(&geo[1]) {
                let Ok(value) = caps[2].parse::<f64>() else {
                    continue;
                };
                match &caps[1] {
                    "x" => cell.x = value,
                    "y" => cell.y = value,
                    "width" => cell.width = value,
                    "height" => cell.height = value,
                    _ => {}
                }
            }
        }
        for caps in point_re.captures_iter(chunk) {
            let x: f64 = caps[1].parse().unwrap_or(0.0);
            let y: f64 = caps[2].parse().unwrap_or(0.0);
            if &caps[3] == "sourcePoint" {
                cell.source_point = Some((x, y));
            } else {
                cell.target_point = Some((x, y));
            }
        }
        cells.push(cell);
    }
    cells
}

/// Индекс типа участника по стилю заголовка
fn participant_kind_index(style: &str) -> usize {
    if style.contains("shape=umlActor") {
        1
    } else if style.contains("shape=umlBoundary") {
        2
    } else if style.contains("shape=umlControl") {
        3
    } else if style.contains("shape=umlEntity") {
        4
    } else if style.contains("sysml.queue") {
        5
    } else if style.contains("cylinder3") {
        6
    } else if style.contains("layered_rect") {
        7
    } else {
        0
    }
}

/// Вид наконечника из стиля ребра
fn arrow_kind(style: &str) -> String {
    for kind in ["block", "open", "oval", "cross"] {
        if style.contains(&format!("endArrow={};", kind)) {
            return kind.to_string();
        }
    }
    "none".to_string()
}

/// Экстрактор sequence диаграммы
pub fn extract_sequence(xml: &str) -> NormalizedSequence {
    let cells = parse_cells(xml);
    let mut result = NormalizedSequence::default();

    // Группы участников: style=group, сортировка по X
    let mut groups: Vec<&RawCell> = cells
        .iter()
        .filter(|c| c.vertex && c.style.starts_with("group;"))
        .collect();
    groups.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal));

    let mut centers: Vec<(String, f64)> = Vec::new();
    for group in &groups {
        // Заголовок — первая дочерняя вершина группы с текстом
        let Some(header) = cells
            .iter()
            .find(|c| c.vertex && c.parent == group.id && !c.value.is_empty())
        else {
            continue;
        };
        let name = normalize_text(&header.value);
        centers.push((name.clone(), group.x + group.width / 2.0));
        result.participants.push(NormalizedParticipant {
            name,
            kind_index: participant_kind_index(&header.style),
        });
    }

    let nearest = |x: f64| -> String {
        centers
            .iter()
            .min_by(|a, b| {
                (a.1 - x)
                    .abs()
                    .partial_cmp(&(b.1 - x).abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|(name, _)| name.clone())
            .unwrap_or_default()
    };

    // Сообщения: рёбра со стилем сообщения, сверху вниз
    let mut message_cells: Vec<&RawCell> = cells
        .iter()
        .filter(|c| c.edge && c.style.contains("verticalAlign=bottom"))
        .collect();
    message_cells.sort_by(|a, b| {
        let ay = a.source_point.map(|p| p.1).unwrap_or(0.0);
        let by = b.source_point.map(|p| p.1).unwrap_or(0.0);
        ay.partial_cmp(&by).unwrap_or(std::cmp::Ordering::Equal)
    });
    for cell in message_cells {
        let (Some(sp), Some(tp)) = (cell.source_point, cell.target_point) else {
            continue;
        };
        result.messages.push(NormalizedMessage {
            from: nearest(sp.0),
            to: nearest(tp.0),
            label: normalize_text(&cell.value),
            dashed: cell.style.contains("dashed=1"),
            arrow: arrow_kind(&cell.style),
        });
    }

    // Активации: узкие белые прямоугольники внутри групп
    for cell in &cells {
        if cell.vertex
            && cell.style.contains("fillColor=#FFFFFF")
            && (cell.width - 10.0).abs() < 0.5
        {
            if let Some(group) = groups.iter().find(|g| g.id == cell.parent) {
                let name = nearest(group.x + group.width / 2.0);
                *result.activations.entry(name).or_insert(0) += 1;
            }
        }
    }

    // Фрагменты: подписи вида `alt [cond]`
    for cell in &cells {
        if cell.vertex && cell.style.contains("fontStyle=1;align=left") {
            let first = cell.value.split_whitespace().next().unwrap_or("");
            if matches!(
                first,
                "alt" | "loop" | "opt" | "par" | "break" | "critical" | "group"
            ) {
                result.fragments.push(first.to_string());
            }
        }
    }

    // Заметки и разделители
    for cell in &cells {
        if !cell.vertex {
            continue;
        }
        if cell.style.contains("fillColor=#FEFFDD") {
            result.notes.push(normalize_text(&cell.value));
        } else if cell.style.contains("fillColor=#EEEEEE")
            && !normalize_text(&cell.value).starts_with("ref")
        {
            result.dividers.push(normalize_text(&cell.value));
        }
    }

    result
}

/// Вид связи из пары endArrow/startArrow
fn relation_kind(style: &str) -> String {
    let has = |fragment: &str| style.contains(fragment);
    if has("Arrow=block") && (has("endFill=0") || has("startFill=0")) {
        "extension".to_string()
    } else if has("Arrow=diamond") && has("Fill=1") {
        "composition".to_string()
    } else if has("Arrow=diamond") {
        "aggregation".to_string()
    } else if has("ERmany") || has("ERoneToMany") || has("ERmandOne") || has("ERzeroToOne") {
        "crowfoot".to_string()
    } else if has("dashed=1") {
        "dependency".to_string()
    } else {
        "association".to_string()
    }
}

/// Заголовок сущности: последняя строка значения без «...» строк
fn entity_title(value: &str) -> String {
    value
        .lines()
        .filter(|l| {
            let t = l.trim();
            !t.starts_with('«')
                && !t.starts_with("<<")
                && !t.starts_with("extends ")
                && !t.starts_with("implements ")
        })
        .last()
        .map(normalize_text)
        .unwrap_or_default()
}

/// Вид сущности из строк-декораций значения
fn entity_kind(value: &str) -> String {
    for line in value.lines() {
        let t = normalize_text(line);
        if let Some(tag) = t.strip_prefix("<<") {
            return tag.trim_end_matches(">>").trim().to_string();
        }
    }
    "class".to_string()
}

/// Экстрактор class диаграммы
pub fn extract_class(xml: &str) -> NormalizedClass {
    let cells = parse_cells(xml);
    let mut result = NormalizedClass::default();
    let mut names_by_id: IndexMap<String, String> = IndexMap::new();

    for cell in &cells {
        if cell.vertex && cell.style.contains("swimlane") {
            let name = entity_title(&cell.value);
            let member_count = cells
                .iter()
                .filter(|m| {
                    m.parent == cell.id && m.vertex && m.style.contains("strokeColor=none")
                })
                .count();
            names_by_id.insert(cell.id.clone(), name.clone());
            result.entities.push(NormalizedEntity {
                name,
                kind: entity_kind(&cell.value),
                member_count,
            });
        } else if cell.vertex && cell.style.contains("sysml.package") {
            result.packages.push(normalize_text(&cell.value));
            names_by_id.insert(cell.id.clone(), normalize_text(&cell.value));
        } else if cell.vertex
            && (cell.style.starts_with("ellipse") || cell.style.starts_with("rhombus"))
        {
            let name = normalize_text(&cell.value);
            names_by_id.insert(cell.id.clone(), name.clone());
            result.entities.push(NormalizedEntity {
                name,
                kind: "circle".to_string(),
                member_count: 0,
            });
        } else if cell.vertex && cell.style.contains("shape=note") {
            result.notes.push(normalize_text(&cell.value));
        }
    }

    for cell in &cells {
        if cell.edge && !cell.source.is_empty() && !cell.target.is_empty() {
            if cell.style.contains("endArrow=none") && cell.style.contains("dashed=1") {
                continue; // связь заметки
            }
            let (Some(from), Some(to)) =
                (names_by_id.get(&cell.source), names_by_id.get(&cell.target))
            else {
                continue;
            };
            result.relationships.push(NormalizedRelation {
                from: from.clone(),
                to: to.clone(),
                kind: relation_kind(&cell.style),
                label: normalize_text(&cell.value),
            });
        }
    }
    result
}

/// Вид элемента component диаграммы по стилю
fn component_kind(style: &str) -> Option<&'static str> {
    if style.contains("shape=component") {
        Some("component")
    } else if style.contains("shape=umlActor") {
        Some("actor")
    } else if style.contains("cylinder3") {
        Some("database")
    } else if style.contains("shape=cloud") {
        Some("cloud")
    } else if style.contains("shape=folder") {
        Some("folder")
    } else if style.contains("shape=hexagon") {
        Some("hexagon")
    } else if style.contains("basic.person") {
        Some("person")
    } else if style.starts_with("ellipse") {
        Some("usecase")
    } else if style.contains("shape=card") {
        Some("card")
    } else if style.contains("flowchart.process") || style.contains("shape=process") {
        Some("node")
    } else if style.contains("sysml.queue") {
        Some("queue")
    } else if style.contains("eip.dataStore") {
        Some("datastore")
    } else {
        None
    }
}

/// Экстрактор component/use-case диаграммы
pub fn extract_component(xml: &str) -> NormalizedComponent {
    let cells = parse_cells(xml);
    let mut result = NormalizedComponent::default();
    let mut names_by_id: IndexMap<String, String> = IndexMap::new();

    for cell in &cells {
        if !cell.vertex {
            continue;
        }
        if cell.style.contains("container=1") {
            let name = normalize_text(&cell.value);
            result.containers.push(name.clone());
            names_by_id.insert(cell.id.clone(), name);
        } else if cell.style.contains("shape=note") {
            result.notes.push(normalize_text(&cell.value));
        } else if let Some(kind) = component_kind(&cell.style) {
            let name = normalize_text(&cell.value);
            names_by_id.insert(cell.id.clone(), name.clone());
            result.elements.push((name, kind.to_string()));
        } else if cell.style.starts_with("rounded=0;whiteSpace=wrap")
            && !cell.value.is_empty()
            && !cell.style.contains("fillColor=#EEEEEE")
        {
            let name = normalize_text(&cell.value);
            names_by_id.insert(cell.id.clone(), name.clone());
            result.elements.push((name, "rectangle".to_string()));
        }
    }

    for cell in &cells {
        if cell.edge && !cell.source.is_empty() && !cell.target.is_empty() {
            if cell.style.contains("endArrow=none") && cell.style.contains("dashed=1") {
                continue;
            }
            let (Some(from), Some(to)) =
                (names_by_id.get(&cell.source), names_by_id.get(&cell.target))
            else {
                continue;
            };
            result.relationships.push(NormalizedRelation {
                from: from.clone(),
                to: to.clone(),
                kind: relation_kind(&cell.style),
                label: normalize_text(&cell.value),
            });
        }
    }
    result
}

/// Экстрактор state диаграммы
pub fn extract_state(xml: &str) -> NormalizedState {
    let cells = parse_cells(xml);
    let mut result = NormalizedState::default();
    let mut names_by_id: IndexMap<String, String> = IndexMap::new();

    for cell in &cells {
        if !cell.vertex {
            continue;
        }
        if cell.style.starts_with("ellipse") && cell.style.contains("fillColor=#000000") {
            // Внутренний круг final имеет родителем внешнее кольцо
            let parent_is_ring = cells
                .iter()
                .any(|p| p.id == cell.parent && p.style.contains("fillColor=none"));
            if parent_is_ring {
                result.has_final = true;
            } else {
                result.has_initial = true;
            }
            names_by_id.insert(cell.id.clone(), String::new());
        } else if cell.style.starts_with("ellipse") && cell.style.contains("fillColor=none") {
            result.has_final = true;
            names_by_id.insert(cell.id.clone(), String::new());
        } else if (cell.style.contains("rounded=1") && cell.style.contains("#FEFECE"))
            || cell.style.starts_with("rhombus")
        {
            let name = normalize_text(cell.value.lines().next().unwrap_or(""));
            names_by_id.insert(cell.id.clone(), name.clone());
            if !name.is_empty() {
                result.states.push(name);
            }
        } else if cell.style.contains("container=1") {
            let name = normalize_text(&cell.value);
            names_by_id.insert(cell.id.clone(), name.clone());
            result.states.push(name);
        } else if cell.style.contains("shape=note") {
            result.notes.push(normalize_text(&cell.value));
        }
    }

    for cell in &cells {
        if cell.edge
            && !cell.source.is_empty()
            && !cell.target.is_empty()
            && !cell.style.contains("endArrow=none")
        {
            let from = names_by_id.get(&cell.source).cloned().unwrap_or_default();
            let to = names_by_id.get(&cell.target).cloned().unwrap_or_default();
            result
                .transitions
                .push((from, to, normalize_text(&cell.value)));
        }
    }
    result
}

/// Экстрактор timing диаграммы
pub fn extract_timing(xml: &str) -> NormalizedTiming {
    let cells = parse_cells(xml);
    let mut result = NormalizedTiming::default();

    // Подписи игроков: текст справа-выровненный жирный в колонке слева
    let mut label_cells: Vec<&RawCell> = cells
        .iter()
        .filter(|c| c.vertex && c.style.contains("align=right") && c.style.contains("fontStyle=1"))
        .collect();
    label_cells.sort_by(|a, b| a.y.partial_cmp(&b.y).unwrap_or(std::cmp::Ordering::Equal));
    let lanes: Vec<(String, f64, f64)> = label_cells
        .iter()
        .map(|c| (normalize_text(&c.value), c.y, c.y + c.height))
        .collect();
    for (name, _, _) in &lanes {
        result.players.push(name.clone());
    }

    let lane_of = |y: f64| -> Option<String> {
        lanes
            .iter()
            .find(|(_, top, bottom)| y >= *top - 20.0 && y <= *bottom + 20.0)
            .map(|(name, _, _)| name.clone())
    };

    // Изменения состояний: горизонтальные сегменты и полосы
    for cell in &cells {
        if cell.edge && cell.style.contains("strokeWidth=2") {
            if let Some((_, y)) = cell.source_point {
                if let Some(player) = lane_of(y) {
                    *result.changes.entry(player).or_insert(0) += 1;
                }
            }
        } else if cell.vertex && cell.style.contains("fillColor=#FEFECE") {
            if let Some(player) = lane_of(cell.y) {
                *result.changes.entry(player).or_insert(0) += 1;
            }
        }
    }

    // Диапазон по числовым подписям оси
    let mut times: Vec<f64> = cells
        .iter()
        .filter(|c| c.vertex && c.style.contains("fontSize=10") && c.style.contains("align=center"))
        .filter_map(|c| c.value.parse::<f64>().ok())
        .collect();
    times.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    if let (Some(first), Some(last)) = (times.first(), times.last()) {
        result.time_span = Some((*first, *last));
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cells_attrs_and_points() {
        let xml = r#"<mxCell id="a-1" value="Hello" style="html=1;" edge="1" parent="1"><mxGeometry relative="1" as="geometry"><mxPoint x="10" y="20" as="sourcePoint"/><mxPoint x="30" y="20" as="targetPoint"/></mxGeometry></mxCell>"#;
        let cells = parse_cells(xml);
        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].id, "a-1");
        assert!(cells[0].edge);
        assert_eq!(cells[0].source_point, Some((10.0, 20.0)));
        assert_eq!(cells[0].target_point, Some((30.0, 20.0)));
    }

    #[test]
    fn test_arrow_kind() {
        assert_eq!(arrow_kind("html=1;endArrow=block;endFill=1;"), "block");
        assert_eq!(arrow_kind("endArrow=open;endFill=0;"), "open");
        assert_eq!(arrow_kind("endArrow=none;"), "none");
    }

    #[test]
    fn test_relation_kind_table() {
        assert_eq!(relation_kind("startArrow=block;startFill=0;"), "extension");
        assert_eq!(relation_kind("startArrow=diamond;startFill=1;"), "composition");
        assert_eq!(relation_kind("startArrow=diamond;startFill=0;"), "aggregation");
        assert_eq!(relation_kind("endArrow=open;endFill=0;dashed=1;"), "dependency");
        assert_eq!(relation_kind("endArrow=ERmany;"), "crowfoot");
    }

    #[test]
    fn test_entity_title_skips_decoration() {
        assert_eq!(entity_title("«interface»\nShape"), "shape");
        assert_eq!(entity_kind("«interface»\nShape"), "interface");
        assert_eq!(entity_kind("Plain"), "class");
    }
}
