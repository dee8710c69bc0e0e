//! Конфигурация эмиттера Timing Diagrams.

/// Геометрические константы временных диаграмм
#[derive(Debug, Clone)]
pub struct TimingEmitConfig {
    /// Отступ от края
    pub margin: f64,
    /// Ширина колонки подписей игроков
    pub label_column: f64,
    /// Пикселей на единицу времени
    pub time_unit_width: f64,
    /// Минимальная ширина оси времени
    pub min_axis_width: f64,
    /// Высота уровня состояния robust игрока
    pub robust_level_height: f64,
    /// Высота полосы concise/rectangle игрока
    pub concise_height: f64,
    /// Высота полосы clock
    pub clock_height: f64,
    /// Высота полосы binary
    pub binary_height: f64,
    /// Высота полосы analog
    pub analog_height: f64,
    /// Зазор между полосами
    pub lane_gap: f64,
    /// Высота засечки оси времени
    pub tick_height: f64,
    /// Ширина символа
    pub char_width: f64,
}

impl Default for TimingEmitConfig {
    fn default() -> Self {
        Self {
            margin: 20.0,
            label_column: 120.0,
            time_unit_width: 4.0,
            min_axis_width: 240.0,
            robust_level_height: 30.0,
            concise_height: 40.0,
            clock_height: 40.0,
            binary_height: 50.0,
            analog_height: 60.0,
            lane_gap: 30.0,
            tick_height: 5.0,
            char_width: 7.0,
        }
    }
}

impl TimingEmitConfig {
    /// Создаёт конфигурацию по умолчанию
    pub fn new() -> Self {
        Self::default()
    }
}
