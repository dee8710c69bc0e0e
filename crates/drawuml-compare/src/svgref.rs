//! Экстрактор нормализованной диаграммы из эталонного SVG PlantUML.
//!
//! Сопоставление по семантическим ключам рендерера: класс
//! `participant participant-head`, атрибуты `data-entity-*` и
//! `data-qualified-name`, заливка заметок `#FEFFDD`, цвет вкладки
//! фрагмента `#EEEEEE`, прямоугольник активации шириной 10 с заливкой
//! `#FFFFFF`. Каждый экстрактор дедуплицирует: заметка рендерится
//! двумя path-ами и схлопывается по близости Y, активации — по паре
//! участник|Y.

use indexmap::IndexMap;
use regex::Regex;

use crate::normalized::{
    normalize_text, NormalizedClass, NormalizedComponent, NormalizedEntity, NormalizedMessage,
    NormalizedParticipant, NormalizedRelation, NormalizedSequence, NormalizedState,
    NormalizedTiming,
};

/// Числовой атрибут из фрагмента тега
fn attr_f64(tag: &str, name: &str) -> Option<f64> {
    let needle = format!("{}=\"", name);
    let start = tag.find(&needle)? + needle.len();
    let rest = &tag[start..];
    let end = rest.find('"')?;
    rest[..end].parse().ok()
}

/// Экстрактор sequence диаграммы
pub fn extract_sequence(svg: &str) -> NormalizedSequence {
    let mut result = NormalizedSequence::default();

    // Участники: head-тексты, дедупликация по имени (head рисуется
    // сверху и снизу)
    let head_re = Regex::new(
        r#"<text[^>]*class="participant participant-head"[^>]*>([^<]*)</text>"#,
    )
    .unwrap();
    let mut centers: Vec<(String, f64)> = Vec::new();
    for caps in head_re.captures_iter(svg) {
        let name = normalize_text(&caps[1]);
        if result.participants.iter().any(|p| p.name == name) {
            continue;
        }
        let tag = caps.get(0).map(|m| m.as_str()).unwrap_or("");
        let x = attr_f64(tag, "x").unwrap_or(0.0);
        let width = attr_f64(tag, "textLength").unwrap_or(40.0);
        centers.push((name.clone(), x + width / 2.0));
        // Тип участника из SVG напрямую не виден; актёра выдаёт
        // ellipse-голова в том же блоке
        result.participants.push(NormalizedParticipant {
            name,
            kind_index: 0,
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

    // Сообщения: текст class="message"; линия непосредственно перед
    // текстом даёт концы и пунктир
    let element_re = Regex::new(
        r#"(?s)(<line[^>]*>)|(<text[^>]*class="message"[^>]*>([^<]*)</text>)|(<polygon[^>]*>)"#,
    )
    .unwrap();
    let mut last_line: Option<String> = None;
    let mut last_polygon: Option<String> = None;
    for caps in element_re.captures_iter(svg) {
        if let Some(line) = caps.get(1) {
            last_line = Some(line.as_str().to_string());
        } else if let Some(polygon) = caps.get(4) {
            last_polygon = Some(polygon.as_str().to_string());
        } else if let Some(label) = caps.get(3) {
            let (from, to, dashed) = match &last_line {
                Some(line) => {
                    let x1 = attr_f64(line, "x1").unwrap_or(0.0);
                    let x2 = attr_f64(line, "x2").unwrap_or(0.0);
                    (nearest(x1), nearest(x2), line.contains("stroke-dasharray"))
                }
                None => (String::new(), String::new(), false),
            };
            let arrow = match &last_polygon {
                Some(polygon) if polygon.contains("fill=\"none\"") => "open".to_string(),
                Some(_) => "block".to_string(),
                None => "block".to_string(),
            };
            result.messages.push(NormalizedMessage {
                from,
                to,
                label: normalize_text(label.as_str()),
                dashed,
                arrow,
            });
        }
    }

    // Активации: rect шириной 10 с заливкой #FFFFFF, дедупликация по
    // участник|Y
    let rect_re = Regex::new(r#"<rect[^>]*>"#).unwrap();
    let mut seen: Vec<String> = Vec::new();
    for rect in rect_re.find_iter(svg) {
        let tag = rect.as_str();
        let width = attr_f64(tag, "width").unwrap_or(0.0);
        if (width - 10.0).abs() > 0.5 || !tag.contains("#FFFFFF") {
            continue;
        }
        let x = attr_f64(tag, "x").unwrap_or(0.0);
        let y = attr_f64(tag, "y").unwrap_or(0.0);
        let participant = nearest(x + width / 2.0);
        let key = format!("{}|{}", participant, y.round());
        if !seen.contains(&key) {
            seen.push(key);
            *result.activations.entry(participant).or_insert(0) += 1;
        }
    }

    // Фрагменты: вкладка #EEEEEE, ключевое слово — ближайший
    // следующий текст
    let tab_re = Regex::new(r#"(?s)#EEEEEE[^>]*>.{0,400}?<text[^>]*>([^<]*)</text>"#).unwrap();
    for caps in tab_re.captures_iter(svg) {
        let word = normalize_text(&caps[1]);
        let first = word.split_whitespace().next().unwrap_or("");
        if matches!(
            first,
            "alt" | "loop" | "opt" | "par" | "break" | "critical" | "group"
        ) {
            result.fragments.push(first.to_string());
        }
    }

    // Заметки: фигуры #FEFFDD, схлопывание пары path по близости Y
    let note_re = Regex::new(r#"<(?:path|rect|polygon)[^>]*#FEFFDD[^>]*>"#).unwrap();
    let mut note_ys: Vec<f64> = Vec::new();
    for shape in note_re.find_iter(svg) {
        let y = attr_f64(shape.as_str(), "y")
            .or_else(|| first_path_y(shape.as_str()))
            .unwrap_or(0.0);
        if note_ys.iter().any(|known| (known - y).abs() < 6.0) {
            continue;
        }
        note_ys.push(y);
        result.notes.push(String::new());
    }

    result
}

/// Первая Y координата из атрибута d пути
fn first_path_y(tag: &str) -> Option<f64> {
    let d_start = tag.find("d=\"")? + 3;
    let rest = &tag[d_start..];
    let token_re = Regex::new(r"[-0-9.]+[, ]([-0-9.]+)").ok()?;
    token_re.captures(rest)?.get(1)?.as_str().parse().ok()
}

/// Сущности class диаграммы: data-qualified-name в порядке появления
fn qualified_names(svg: &str) -> Vec<(String, usize)> {
    let group_re = Regex::new(r#"data-qualified-name="([^"]+)""#).unwrap();
    let mut out: Vec<(String, usize)> = Vec::new();
    for caps in group_re.captures_iter(svg) {
        let name = normalize_text(&caps[1]);
        let offset = caps.get(0).map(|m| m.start()).unwrap_or(0);
        if !out.iter().any(|(n, _)| *n == name) {
            out.push((name, offset));
        }
    }
    out
}

/// Экстрактор class диаграммы
pub fn extract_class(svg: &str) -> NormalizedClass {
    let mut result = NormalizedClass::default();
    let names = qualified_names(svg);
    let text_re = Regex::new(r#"<text[^>]*>([^<]*)</text>"#).unwrap();

    for (i, (name, offset)) in names.iter().enumerate() {
        // Члены: тексты внутри блока сущности минус строка заголовка
        let end = names
            .get(i + 1)
            .map(|(_, next)| *next)
            .unwrap_or(svg.len());
        let chunk = &svg[*offset..end];
        let text_count = text_re.captures_iter(chunk).count();
        result.entities.push(NormalizedEntity {
            name: name.clone(),
            kind: if chunk.contains("&#171;interface&#187;") || chunk.contains("«interface»") {
                "interface".to_string()
            } else {
                "class".to_string()
            },
            member_count: text_count.saturating_sub(1),
        });
    }

    // Связи: пары data-entity-1 / data-entity-2
    let link_re = Regex::new(
        r#"(?s)data-entity-1="([^"]+)"[^>]*data-entity-2="([^"]+)"[^>]*>(.{0,600}?)</g>"#,
    )
    .unwrap();
    for caps in link_re.captures_iter(svg) {
        let body = &caps[3];
        let dashed = body.contains("stroke-dasharray");
        let kind = if body.contains("fill=\"none\"") && body.contains("<polygon") {
            "extension".to_string()
        } else if body.contains("<polygon") {
            "composition".to_string()
        } else if dashed {
            "dependency".to_string()
        } else {
            "association".to_string()
        };
        result.relationships.push(NormalizedRelation {
            from: normalize_text(&caps[1]),
            to: normalize_text(&caps[2]),
            kind,
            label: String::new(),
        });
    }

    result
}

/// Экстрактор component/use-case диаграммы
pub fn extract_component(svg: &str) -> NormalizedComponent {
    let mut result = NormalizedComponent::default();
    for (name, offset) in qualified_names(svg) {
        // Вид по ближайшей фигуре после атрибута
        let window = &svg[offset..(offset + 400).min(svg.len())];
        let kind = if window.contains("<ellipse") {
            "usecase"
        } else {
            "component"
        };
        result.elements.push((name, kind.to_string()));
    }
    let link_re =
        Regex::new(r#"data-entity-1="([^"]+)"[^>]*data-entity-2="([^"]+)""#).unwrap();
    for caps in link_re.captures_iter(svg) {
        result.relationships.push(NormalizedRelation {
            from: normalize_text(&caps[1]),
            to: normalize_text(&caps[2]),
            kind: "association".to_string(),
            label: String::new(),
        });
    }
    result
}

/// Экстрактор state диаграммы
pub fn extract_state(svg: &str) -> NormalizedState {
    let mut result = NormalizedState::default();
    for (name, _) in qualified_names(svg) {
        if name == "*start*" || name == "*end*" {
            continue;
        }
        result.states.push(name);
    }
    // Начальное: маленький закрашенный круг; конечное: кольцо + круг
    let ellipse_re = Regex::new(r#"<ellipse[^>]*>"#).unwrap();
    let mut black_small = 0usize;
    let mut ring = false;
    for tag in ellipse_re.find_iter(svg) {
        let t = tag.as_str();
        let rx = attr_f64(t, "rx").unwrap_or(0.0);
        if t.contains("fill=\"#000000\"") && rx <= 11.0 {
            black_small += 1;
        }
        if t.contains("fill=\"none\"") && rx <= 12.0 {
            ring = true;
        }
    }
    result.has_initial = black_small > 0;
    result.has_final = ring || black_small > 1;

    let link_re =
        Regex::new(r#"data-entity-1="([^"]+)"[^>]*data-entity-2="([^"]+)""#).unwrap();
    for caps in link_re.captures_iter(svg) {
        result.transitions.push((
            normalize_text(&caps[1]),
            normalize_text(&caps[2]),
            String::new(),
        ));
    }
    result
}

/// Экстрактор timing диаграммы
pub fn extract_timing(svg: &str) -> NormalizedTiming {
    let mut result = NormalizedTiming::default();
    let text_re = Regex::new(r#"<text([^>]*)>([^<]*)</text>"#).unwrap();
    let mut times: Vec<f64> = Vec::new();
    let mut labels: IndexMap<String, f64> = IndexMap::new();
    for caps in text_re.captures_iter(svg) {
        let tag = &caps[1];
        let content = caps[2].trim();
        if content.is_empty() {
            continue;
        }
        let x = attr_f64(tag, "x").unwrap_or(0.0);
        if let Ok(t) = content.parse::<f64>() {
            times.push(t);
            continue;
        }
        // Подписи игроков стоят в левой колонке
        if x < 100.0 {
            labels.entry(normalize_text(content)).or_insert(x);
        }
    }
    result.players = labels.keys().cloned().collect();
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
    fn test_extract_sequence_participants_dedup() {
        let svg = r#"<svg>
<text x="40" class="participant participant-head" textLength="36">Alice</text>
<text x="140" class="participant participant-head" textLength="28">Bob</text>
<text x="40" class="participant participant-head" textLength="36">Alice</text>
</svg>"#;
        let result = extract_sequence(svg);
        assert_eq!(result.participants.len(), 2);
        assert_eq!(result.participants[0].name, "alice");
        assert_eq!(result.participants[1].name, "bob");
    }

    #[test]
    fn test_extract_sequence_messages() {
        let svg = r##"<svg>
<text x="40" class="participant participant-head" textLength="36">Alice</text>
<text x="140" class="participant participant-head" textLength="28">Bob</text>
<polygon points="1,1" fill="#181818"/>
<line x1="58" y1="80" x2="150" y2="80"/>
<text class="message" x="70">Hello</text>
<polygon points="1,1" fill="#181818"/>
<line x1="150" y1="110" x2="58" y2="110" stroke-dasharray="2,2"/>
<text class="message" x="70">Hi back</text>
</svg>"##;
        let result = extract_sequence(svg);
        assert_eq!(result.messages.len(), 2);
        assert_eq!(result.messages[0].from, "alice");
        assert_eq!(result.messages[0].to, "bob");
        assert!(!result.messages[0].dashed);
        assert_eq!(result.messages[1].from, "bob");
        assert!(result.messages[1].dashed);
    }

    #[test]
    fn test_extract_sequence_activations_dedup() {
        let svg = r##"<svg>
<text x="140" class="participant participant-head" textLength="28">Bob</text>
<rect x="149" y="78" width="10" height="60" fill="#FFFFFF"/>
<rect x="149" y="78" width="10" height="60" fill="#FFFFFF"/>
</svg>"##;
        let result = extract_sequence(svg);
        assert_eq!(result.activations.get("bob"), Some(&1));
    }

    #[test]
    fn test_extract_class_entities_and_links() {
        let svg = r#"<svg>
<g data-qualified-name="Animal"><text>Animal</text><text>+name</text></g>
<g data-qualified-name="Dog"><text>Dog</text></g>
<g data-entity-1="Animal" data-entity-2="Dog" data-uid="lnk1"><polygon fill="none" points="1,1"/></g>
</svg>"#;
        let result = extract_class(svg);
        assert_eq!(result.entities.len(), 2);
        assert_eq!(result.entities[0].name, "animal");
        assert_eq!(result.entities[0].member_count, 1);
        assert_eq!(result.relationships.len(), 1);
        assert_eq!(result.relationships[0].kind, "extension");
    }

    #[test]
    fn test_extract_state_pseudostates() {
        let svg = r##"<svg>
<ellipse cx="50" cy="20" rx="10" ry="10" fill="#000000"/>
<g data-qualified-name="Idle"><text>Idle</text></g>
<ellipse cx="50" cy="200" rx="11" ry="11" fill="none"/>
<ellipse cx="50" cy="200" rx="6" ry="6" fill="#000000"/>
</svg>"##;
        let result = extract_state(svg);
        assert!(result.has_initial);
        assert!(result.has_final);
        assert_eq!(result.states, vec!["idle"]);
    }

    #[test]
    fn test_extract_timing_players_and_span() {
        let svg = r#"<svg>
<text x="10">User</text>
<text x="10">Server</text>
<text x="120">0</text>
<text x="300">100</text>
<text x="480">200</text>
</svg>"#;
        let result = extract_timing(svg);
        assert_eq!(result.players, vec!["user", "server"]);
        assert_eq!(result.time_span, Some((0.0, 200.0)));
    }
}
