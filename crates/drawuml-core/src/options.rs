//! Опции конвертации

/// Опции конвертации PlantUML в draw.io
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Имя вкладки диаграммы в документе
    pub diagram_name: String,

    /// Идентификатор корневой групповой ячейки (UserObject)
    pub group_id: String,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            diagram_name: "PlantUML Import".to_string(),
            group_id: "puml-root".to_string(),
        }
    }
}

impl ConvertOptions {
    /// Создаёт опции по умолчанию
    pub fn new() -> Self {
        Self::default()
    }

    /// Устанавливает имя вкладки
    pub fn with_diagram_name(mut self, name: impl Into<String>) -> Self {
        self.diagram_name = name.into();
        self
    }

    /// Устанавливает идентификатор корневой группы
    pub fn with_group_id(mut self, id: impl Into<String>) -> Self {
        self.group_id = id.into();
        self
    }
}
