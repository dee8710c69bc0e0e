//! # drawuml-core
//!
//! Конвертер PlantUML диаграмм в draw.io (mxGraph) XML.
//!
//! Это главный фасад библиотеки, предоставляющий простой API для:
//! - Парсинга PlantUML исходного кода в промежуточную модель
//! - Конвертации в XML документ draw.io
//! - Обратного извлечения исходника из готового документа
//!
//! ## Быстрый старт
//!
//! ```rust
//! use drawuml_core::{convert, ConvertOptions};
//!
//! let source = r#"
//! @startuml
//! Alice -> Bob: Hello
//! Bob --> Alice: Hi
//! @enduml
//! "#;
//!
//! let xml = convert(source, &ConvertOptions::default()).unwrap();
//! assert!(xml.contains("<mxfile>"));
//! ```
//!
//! ## Архитектура
//!
//! Библиотека состоит из нескольких crates:
//!
//! - `drawuml-model` — промежуточные модели всех семейств диаграмм
//! - `drawuml-parser` — толерантные построчные парсеры
//! - `drawuml-mx` — лексический слой mxGraph (ячейки, стили, конверт)
//! - `drawuml-emit` — геометрические эмиттеры по семействам
//! - `drawuml-compare` — харнесс сравнения с эталоном PlantUML

mod error;
mod options;
mod pipeline;

pub use error::{Error, Result};
pub use options::ConvertOptions;

// Re-exports для удобства
pub use drawuml_model::Diagram;
pub use drawuml_mx::extract_plantuml_source;
pub use drawuml_parser::{detect_diagram_kind, DiagramKind};

/// Конвертирует PlantUML диаграмму в XML документ draw.io.
///
/// Выполняет полный pipeline: определение семейства, парсинг в
/// промежуточную модель, геометрическая эмиссия ячеек, сборка
/// конверта документа с исходником в атрибуте `plantUml`.
///
/// # Пример
///
/// ```rust
/// use drawuml_core::{convert, ConvertOptions};
///
/// let source = "@startuml\nAlice -> Bob\n@enduml";
/// let xml = convert(source, &ConvertOptions::default()).unwrap();
/// assert!(xml.contains("mxGraphModel"));
/// ```
pub fn convert(source: &str, options: &ConvertOptions) -> Result<String> {
    pipeline::convert_pipeline(source, options)
}

/// Парсит PlantUML и возвращает промежуточную модель без эмиссии.
///
/// Полезно для анализа структуры диаграммы.
///
/// # Пример
///
/// ```rust
/// use drawuml_core::parse_diagram;
///
/// let source = "@startuml\nAlice -> Bob: Hello\n@enduml";
/// let diagram = parse_diagram(source).unwrap();
/// assert_eq!(diagram.family(), "sequence");
/// ```
pub fn parse_diagram(source: &str) -> Result<Diagram> {
    drawuml_parser::parse(source).map_err(|e| Error::Parse(e.to_string()))
}

/// Обратное преобразование: извлекает исходник и конвертирует заново.
///
/// Документ, произведённый `convert`, несёт оригинальный PlantUML в
/// атрибуте `plantUml`; повторный прогон даёт тот же результат с
/// точностью до перенумерации ячеек.
pub fn reconvert(document: &str, options: &ConvertOptions) -> Result<String> {
    let source = extract_plantuml_source(document)
        .ok_or_else(|| Error::Document("атрибут plantUml не найден".to_string()))?;
    convert(&source, options)
}

/// Информация о версии библиотеки
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_basic_sequence() {
        let source = "@startuml\nAlice -> Bob: Hello\n@enduml";
        let xml = convert(source, &ConvertOptions::default()).unwrap();
        assert!(xml.contains("<mxfile>"));
        assert!(xml.contains("value=\"Hello\""));
    }

    #[test]
    fn test_parse_diagram_family() {
        let source = "@startuml\nclass User\n@enduml";
        let diagram = parse_diagram(source).unwrap();
        assert_eq!(diagram.family(), "class");
    }

    #[test]
    fn test_reconvert_roundtrip() {
        let source = "@startuml\nAlice -> Bob: Hello\n@enduml";
        let options = ConvertOptions::default();
        let first = convert(source, &options).unwrap();
        let second = reconvert(&first, &options).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
