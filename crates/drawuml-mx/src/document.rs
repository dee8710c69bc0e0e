//! Конверт документа draw.io.
//!
//! Снаружи — `<mxfile>` с одной `<diagram>` и `<mxGraphModel>`;
//! внутри — стандартная пара корневых ячеек `0`/`1`, затем
//! `UserObject` с атрибутом `plantUml` (экранированный исходник для
//! обратного преобразования) вокруг групповой ячейки диаграммы, и
//! ячейки вызывающего кода в z-порядке.

use crate::escape::escape_attr;
use crate::{MxError, Result};

/// Параметры конверта
#[derive(Debug, Clone)]
pub struct DocumentOptions {
    /// Имя вкладки диаграммы
    pub diagram_name: String,
    /// Идентификатор UserObject / групповой ячейки
    pub group_id: String,
    /// Габариты группы
    pub width: f64,
    pub height: f64,
}

impl Default for DocumentOptions {
    fn default() -> Self {
        Self {
            diagram_name: "PlantUML Import".to_string(),
            group_id: "puml-root".to_string(),
            width: 0.0,
            height: 0.0,
        }
    }
}

/// Собирает полный XML документ draw.io.
///
/// `plantuml_source` обязателен: его отсутствие — структурная ошибка
/// (атрибут `plantUml` на UserObject входит в контракт).
pub fn build_document(
    cells: &[String],
    plantuml_source: &str,
    opts: &DocumentOptions,
) -> Result<String> {
    if plantuml_source.is_empty() {
        return Err(MxError::MissingSource);
    }

    let mut out = String::with_capacity(1024 + cells.iter().map(|c| c.len()).sum::<usize>());
    out.push_str("<mxfile>");
    out.push_str(&format!(
        "<diagram name=\"{}\">",
        escape_attr(&opts.diagram_name)
    ));
    out.push_str("<mxGraphModel><root>");
    out.push_str("<mxCell id=\"0\"/>");
    out.push_str("<mxCell id=\"1\" parent=\"0\"/>");
    out.push_str(&format!(
        "<UserObject label=\"\" plantUml=\"{}\" id=\"{}\">",
        escape_attr(plantuml_source),
        escape_attr(&opts.group_id)
    ));
    out.push_str(&format!(
        "<mxCell style=\"group;editable=0;connectable=0;\" vertex=\"1\" parent=\"1\">\
         <mxGeometry x=\"0\" y=\"0\" width=\"{}\" height=\"{}\" as=\"geometry\"/>\
         </mxCell>",
        opts.width.round() as i64,
        opts.height.round() as i64
    ));
    out.push_str("</UserObject>");
    for cell in cells {
        out.push_str(cell);
    }
    out.push_str("</root></mxGraphModel></diagram></mxfile>");
    Ok(out)
}

/// Извлекает исходник PlantUML из атрибута `plantUml` документа,
/// произведённого `build_document` (обратное преобразование).
pub fn extract_plantuml_source(xml: &str) -> Option<String> {
    let start = xml.find("plantUml=\"")? + "plantUml=\"".len();
    let rest = &xml[start..];
    let end = rest.find('"')?;
    let escaped = &rest[..end];
    Some(unescape_attr(escaped))
}

/// Обратное экранирование XML атрибута
fn unescape_attr(s: &str) -> String {
    s.replace("&#10;", "\n")
        .replace("&#39;", "'")
        .replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_shape() {
        let cells = vec!["<mxCell id=\"puml-1\" parent=\"1\"/>".to_string()];
        let xml = build_document(&cells, "@startuml\nA -> B\n@enduml", &DocumentOptions::default())
            .unwrap();
        assert!(xml.starts_with("<mxfile>"));
        assert!(xml.contains("<mxCell id=\"0\"/>"));
        assert!(xml.contains("<mxCell id=\"1\" parent=\"0\"/>"));
        assert!(xml.contains("plantUml=\"@startuml&#10;A -&gt; B&#10;@enduml\""));
        assert!(xml.contains("style=\"group;editable=0;connectable=0;\""));
        assert!(xml.ends_with("</root></mxGraphModel></diagram></mxfile>"));
    }

    #[test]
    fn test_missing_source_fails() {
        let err = build_document(&[], "", &DocumentOptions::default());
        assert!(matches!(err, Err(MxError::MissingSource)));
    }

    #[test]
    fn test_source_roundtrip() {
        let source = "@startuml\nAlice -> Bob: \"hi\"\n@enduml";
        let xml = build_document(&[], source, &DocumentOptions::default()).unwrap();
        assert_eq!(extract_plantuml_source(&xml).as_deref(), Some(source));
    }
}
