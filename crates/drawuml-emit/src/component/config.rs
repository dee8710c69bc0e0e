//! Конфигурация эмиттера Component/Use-Case диаграмм.

/// Геометрические константы component диаграмм
#[derive(Debug, Clone)]
pub struct ComponentEmitConfig {
    /// Элементов в ряду сетки
    pub cols_per_row: usize,
    /// Горизонтальный зазор
    pub h_gap: f64,
    /// Вертикальный зазор
    pub v_gap: f64,
    /// Отступ от края
    pub margin: f64,
    /// Минимальная ширина элемента
    pub element_width: f64,
    /// Высота элемента
    pub element_height: f64,
    /// Высота заголовка контейнера
    pub container_header: f64,
    /// Внутренний отступ контейнера
    pub container_padding: f64,
    /// Ширина символа
    pub char_width: f64,
    /// Минимальная ширина заметки
    pub note_width: f64,
    /// Высота строки заметки
    pub note_line_height: f64,
}

impl Default for ComponentEmitConfig {
    fn default() -> Self {
        Self {
            cols_per_row: 4,
            h_gap: 70.0,
            v_gap: 60.0,
            margin: 40.0,
            element_width: 110.0,
            element_height: 55.0,
            container_header: 30.0,
            container_padding: 20.0,
            char_width: 7.0,
            note_width: 120.0,
            note_line_height: 16.0,
        }
    }
}

impl ComponentEmitConfig {
    /// Создаёт конфигурацию по умолчанию
    pub fn new() -> Self {
        Self::default()
    }

    /// Ширина элемента под имя
    pub fn width_for_name(&self, name: &str) -> f64 {
        self.element_width
            .max(crate::text_width(name, self.char_width) + 24.0)
    }
}
