//! Pipeline конвертации диаграмм

use drawuml_emit::emit_diagram;
use drawuml_mx::{build_document, DocumentOptions};
use drawuml_parser::parse;

use crate::{ConvertOptions, Error, Result};

/// Выполняет полный pipeline: парсинг, эмиссия, конверт документа
pub fn convert_pipeline(source: &str, options: &ConvertOptions) -> Result<String> {
    let source = source.trim();
    if source.is_empty() {
        return Err(Error::EmptySource);
    }

    // 1. Парсинг
    let diagram = parse(source).map_err(|e| Error::Parse(e.to_string()))?;

    // 2. Эмиссия ячеек в z-порядке
    let result = emit_diagram(&diagram, &options.group_id);

    // 3. Конверт документа с исходником в UserObject
    let document_options = DocumentOptions {
        diagram_name: options.diagram_name.clone(),
        group_id: options.group_id.clone(),
        width: result.width,
        height: result.height,
    };
    build_document(&result.cells, source, &document_options)
        .map_err(|e| Error::Document(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_basic() {
        let source = "@startuml\nAlice -> Bob\n@enduml";
        let result = convert_pipeline(source, &ConvertOptions::default());
        assert!(result.is_ok());
        let xml = result.unwrap();
        assert!(xml.contains("<mxfile>"));
        assert!(xml.contains("plantUml="));
    }

    #[test]
    fn test_pipeline_empty_source() {
        let result = convert_pipeline("", &ConvertOptions::default());
        assert!(matches!(result, Err(Error::EmptySource)));
    }

    #[test]
    fn test_pipeline_whitespace_only() {
        let result = convert_pipeline("   \n  \t  ", &ConvertOptions::default());
        assert!(matches!(result, Err(Error::EmptySource)));
    }

    #[test]
    fn test_pipeline_unknown_diagram() {
        let result = convert_pipeline("просто текст без диаграммы", &ConvertOptions::default());
        assert!(matches!(result, Err(Error::Parse(_))));
    }
}
