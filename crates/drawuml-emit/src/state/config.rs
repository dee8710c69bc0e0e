//! Конфигурация эмиттера State Diagrams.

/// Геометрические константы диаграмм состояний
#[derive(Debug, Clone)]
pub struct StateEmitConfig {
    /// Отступ от края
    pub margin: f64,
    /// Минимальная ширина состояния
    pub state_min_width: f64,
    /// Высота простого состояния
    pub state_height: f64,
    /// Высота строки описания
    pub description_height: f64,
    /// Диаметр начального/конечного псевдосостояния
    pub pseudo_size: f64,
    /// Сторона ромба выбора
    pub choice_size: f64,
    /// Длина полосы fork/join
    pub bar_length: f64,
    /// Толщина полосы fork/join
    pub bar_thickness: f64,
    /// Зазор между слоями (основная ось)
    pub layer_gap: f64,
    /// Зазор внутри слоя (поперечная ось)
    pub sibling_gap: f64,
    /// Высота заголовка составного состояния
    pub composite_header: f64,
    /// Внутренний отступ составного состояния
    pub composite_padding: f64,
    /// Ширина символа
    pub char_width: f64,
    /// Минимальная ширина заметки
    pub note_width: f64,
    /// Высота строки заметки
    pub note_line_height: f64,
}

impl Default for StateEmitConfig {
    fn default() -> Self {
        Self {
            margin: 40.0,
            state_min_width: 80.0,
            state_height: 40.0,
            description_height: 16.0,
            pseudo_size: 24.0,
            choice_size: 40.0,
            bar_length: 90.0,
            bar_thickness: 10.0,
            layer_gap: 70.0,
            sibling_gap: 50.0,
            composite_header: 30.0,
            composite_padding: 15.0,
            char_width: 7.0,
            note_width: 120.0,
            note_line_height: 16.0,
        }
    }
}

impl StateEmitConfig {
    /// Создаёт конфигурацию по умолчанию
    pub fn new() -> Self {
        Self::default()
    }
}
