//! Аллокатор последовательных идентификаторов ячеек.

/// Выдаёт идентификаторы вида `<prefix>-1`, `<prefix>-2`, …
#[derive(Debug, Clone)]
pub struct CellIdAllocator {
    prefix: String,
    next: u32,
}

impl CellIdAllocator {
    /// Создаёт аллокатор с заданным префиксом
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }

    /// Выдаёт следующий идентификатор
    pub fn next_id(&mut self) -> String {
        let id = format!("{}-{}", self.prefix, self.next);
        self.next += 1;
        id
    }

    /// Количество уже выданных идентификаторов
    pub fn issued(&self) -> u32 {
        self.next - 1
    }
}

impl Default for CellIdAllocator {
    fn default() -> Self {
        Self::new("puml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_ids() {
        let mut ids = CellIdAllocator::default();
        assert_eq!(ids.next_id(), "puml-1");
        assert_eq!(ids.next_id(), "puml-2");
        assert_eq!(ids.issued(), 2);
    }

    #[test]
    fn test_custom_prefix() {
        let mut ids = CellIdAllocator::new("seq");
        assert_eq!(ids.next_id(), "seq-1");
    }
}
