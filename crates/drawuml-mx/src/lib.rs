//! # drawuml-mx
//!
//! Лексический слой mxGraph, общий для всех эмиттеров: экранирование
//! XML, сериализация карт стилей, последовательные идентификаторы
//! ячеек, нормализация цветов, построение фрагментов `<mxCell>` и
//! конверта документа draw.io с `UserObject`.

pub mod cell;
pub mod color;
pub mod document;
pub mod escape;
pub mod id;
pub mod style;

pub use cell::{build_cell, CellOptions, Geometry, MxPoint};
pub use document::{build_document, extract_plantuml_source, DocumentOptions};
pub use escape::{escape_attr, escape_text, value_with_breaks};
pub use id::CellIdAllocator;
pub use style::{style_replace, StyleMap};

use thiserror::Error;

/// Результат операций mx-слоя
pub type Result<T> = std::result::Result<T, MxError>;

/// Структурные ошибки построения ячеек и документа.
/// Возникают только при нарушении контракта вызывающим кодом.
#[derive(Error, Debug)]
pub enum MxError {
    /// Ячейка без идентификатора
    #[error("mxCell без id")]
    MissingId,

    /// UserObject без исходника plantUml
    #[error("UserObject без атрибута plantUml")]
    MissingSource,
}
