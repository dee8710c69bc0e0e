//! # drawuml-emit
//!
//! Эмиттеры mxCell по семействам диаграмм. Каждый эмиттер владеет
//! аллокатором идентификаторов и конфигурацией с геометрическими
//! константами; результат — список XML фрагментов ячеек в строгом
//! порядке от заднего плана к переднему. Позиции вычисляются
//! детерминированными правилами без итеративного решателя;
//! единственный графовый проход — послойная укладка диаграмм
//! состояний.

pub mod class;
pub mod component;
pub mod sequence;
pub mod state;
pub mod timing;

pub use class::{ClassEmitConfig, ClassEmitter};
pub use component::{ComponentEmitConfig, ComponentEmitter};
pub use sequence::{SequenceEmitConfig, SequenceEmitter};
pub use state::{StateEmitConfig, StateEmitter};
pub use timing::{TimingEmitConfig, TimingEmitter};

use drawuml_model::Diagram;

/// Результат эмиссии: ячейки в z-порядке и габариты диаграммы
#[derive(Debug, Clone, Default)]
pub struct EmitResult {
    /// XML фрагменты `<mxCell>` от заднего плана к переднему
    pub cells: Vec<String>,
    /// Ширина диаграммы
    pub width: f64,
    /// Высота диаграммы
    pub height: f64,
}

/// Эмитирует диаграмму любого семейства с настройками по умолчанию
pub fn emit_diagram(diagram: &Diagram, parent: &str) -> EmitResult {
    match diagram {
        Diagram::Sequence(d) => SequenceEmitter::new().emit(d, parent),
        Diagram::Class(d) => ClassEmitter::new().emit(d, parent),
        Diagram::Component(d) | Diagram::Deployment(d) | Diagram::UseCase(d) => {
            ComponentEmitter::new().emit(d, parent)
        }
        Diagram::State(d) => StateEmitter::new().emit(d, parent),
        Diagram::Timing(d) => TimingEmitter::new().emit(d, parent),
    }
}

/// Оценка ширины текста по количеству символов
pub(crate) fn text_width(text: &str, char_width: f64) -> f64 {
    text.chars().count() as f64 * char_width
}

/// Количество строк текста
pub(crate) fn line_count(text: &str) -> usize {
    text.lines().count().max(1)
}
