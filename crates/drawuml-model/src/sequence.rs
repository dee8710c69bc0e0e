//! Модель Sequence Diagrams (диаграмм последовательностей).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::common::{Color, LineStyle, NotePosition};

/// Диаграмма последовательностей
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SequenceDiagram {
    /// Заголовок диаграммы
    pub title: Option<String>,
    /// Начальная директива autonumber (если была)
    pub autonumber: Option<AutoNumber>,
    /// Участники в порядке появления (код -> участник)
    pub participants: IndexMap<String, Participant>,
    /// Элементы диаграммы в порядке исходного текста
    pub elements: Vec<SequenceElement>,
    /// Box группировки участников
    pub boxes: Vec<ParticipantBox>,
}

impl SequenceDiagram {
    /// Создаёт новую пустую диаграмму
    pub fn new() -> Self {
        Self::default()
    }

    /// Добавляет участника; повторное объявление обновляет тип
    pub fn add_participant(&mut self, participant: Participant) {
        self.participants
            .insert(participant.code.clone(), participant);
    }

    /// Регистрирует участника по первой ссылке (авто-создание)
    pub fn ensure_participant(&mut self, code: &str) {
        if !self.participants.contains_key(code) {
            self.participants
                .insert(code.to_string(), Participant::new(code, code));
        }
    }

    /// Добавляет элемент
    pub fn add_element(&mut self, element: SequenceElement) {
        self.elements.push(element);
    }

    /// Участники, отсортированные по явному `order` (стабильно: равные
    /// и отсутствующие order сохраняют порядок появления)
    pub fn ordered_participants(&self) -> Vec<&Participant> {
        let mut out: Vec<&Participant> = self.participants.values().collect();
        out.sort_by_key(|p| p.order.unwrap_or(i32::MAX));
        out
    }
}

/// Тип участника
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ParticipantKind {
    #[default]
    Participant,
    Actor,
    Boundary,
    Control,
    Entity,
    Queue,
    Database,
    Collections,
}

impl ParticipantKind {
    /// Парсит тип участника из ключевого слова
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "participant" => Some(Self::Participant),
            "actor" => Some(Self::Actor),
            "boundary" => Some(Self::Boundary),
            "control" => Some(Self::Control),
            "entity" => Some(Self::Entity),
            "queue" => Some(Self::Queue),
            "database" => Some(Self::Database),
            "collections" => Some(Self::Collections),
            _ => None,
        }
    }
}

/// Участник диаграммы последовательностей
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    /// Стабильный код (уникален в пределах диаграммы)
    pub code: String,
    /// Отображаемое имя
    pub display_name: String,
    /// Тип участника
    pub kind: ParticipantKind,
    /// Явный порядок для пересортировки
    pub order: Option<i32>,
    /// Цвет фона
    pub color: Option<Color>,
    /// Стереотип
    pub stereotype: Option<String>,
    /// Создаётся событием create — исключён из верхнего ряда заголовков
    pub is_created: bool,
}

impl Participant {
    /// Создаёт нового участника типа по умолчанию
    pub fn new(code: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            display_name: display_name.into(),
            kind: ParticipantKind::Participant,
            order: None,
            color: None,
            stereotype: None,
            is_created: false,
        }
    }

    /// Устанавливает тип
    pub fn with_kind(mut self, kind: ParticipantKind) -> Self {
        self.kind = kind;
        self
    }
}

/// Элемент диаграммы последовательностей
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SequenceElement {
    Message(Message),
    Exo(ExoMessage),
    Life(LifeEvent),
    Fragment(Fragment),
    Note(SequenceNote),
    Divider(Divider),
    Delay(Delay),
    HSpace(HSpace),
    Reference(Reference),
    Autonumber(AutoNumberCommand),
}

/// Наконечник стрелки
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ArrowHead {
    #[default]
    None,
    /// `>` — закрашенный треугольник
    Filled,
    /// `>>` — тонкая (открытая) стрелка
    Open,
    /// `\` или `/` — половинная стрелка
    Half,
}

/// Какая половина стрелки рисуется
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ArrowPart {
    #[default]
    Full,
    Top,
    Bottom,
}

/// Декорация рядом с наконечником
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ArrowDecoration {
    #[default]
    None,
    /// `o` — кружок (найденное сообщение)
    Circle,
    /// `x` — крест (потерянное сообщение)
    Cross,
}

/// Полное описание стрелки сообщения
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArrowConfig {
    /// Наконечник на левом конце
    pub head1: ArrowHead,
    /// Наконечник на правом конце
    pub head2: ArrowHead,
    /// Стиль тела (`-` solid, `.` dotted, `=` bold, hidden из скобок)
    pub body: LineStyle,
    /// Половина стрелки
    pub part: ArrowPart,
    /// Декорация левого конца
    pub decoration1: ArrowDecoration,
    /// Декорация правого конца
    pub decoration2: ArrowDecoration,
    /// Цвет из `[#color]`
    pub color: Option<Color>,
}

impl ArrowConfig {
    /// Обе стороны имеют наконечники — двунаправленная стрелка
    pub fn is_bidirectional(&self) -> bool {
        self.head1 != ArrowHead::None && self.head2 != ArrowHead::None
    }

    /// Направлена справа налево (наконечник только слева)
    pub fn is_right_to_left(&self) -> bool {
        self.head1 != ArrowHead::None && self.head2 == ArrowHead::None
    }
}

/// Сообщение между участниками
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Код отправителя
    pub from: String,
    /// Код получателя
    pub to: String,
    /// Текст сообщения
    pub label: String,
    /// Конфигурация стрелки
    pub arrow: ArrowConfig,
    /// Параллельное сообщение (`&` префикс)
    pub is_parallel: bool,
    /// Дополнительные получатели (`A -> B & C`)
    pub multicast: Vec<String>,
    /// Сообщение-возврат (`return`): концы разрешаются по стеку активаций
    pub is_return: bool,
}

impl Message {
    /// Создаёт новое сообщение со стрелкой по умолчанию
    pub fn new(from: impl Into<String>, to: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            label: label.into(),
            arrow: ArrowConfig {
                head2: ArrowHead::Filled,
                ..ArrowConfig::default()
            },
            is_parallel: false,
            multicast: Vec::new(),
            is_return: false,
        }
    }

    /// Сообщение самому себе
    pub fn is_self_message(&self) -> bool {
        self.from == self.to
    }
}

/// Тип экзо-сообщения (через границу диаграммы)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExoKind {
    FromLeft,
    ToLeft,
    FromRight,
    ToRight,
}

/// Стрелка, пересекающая левую или правую границу диаграммы
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExoMessage {
    /// Код участника на «внутреннем» конце
    pub participant: String,
    /// Текст сообщения
    pub label: String,
    /// Конфигурация стрелки
    pub arrow: ArrowConfig,
    /// Сторона и направление
    pub kind: ExoKind,
}

/// Тип жизненного события
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifeEventKind {
    Activate,
    Deactivate,
    Create,
    Destroy,
}

/// Жизненное событие участника
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifeEvent {
    /// Код участника
    pub participant: String,
    /// Тип события
    pub kind: LifeEventKind,
    /// Цвет активации
    pub color: Option<Color>,
}

/// Тип фрагмента
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FragmentKind {
    Alt,
    Loop,
    Opt,
    Par,
    Break,
    Critical,
    Group,
}

impl FragmentKind {
    /// Парсит тип фрагмента из ключевого слова
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "alt" => Some(Self::Alt),
            "loop" => Some(Self::Loop),
            "opt" => Some(Self::Opt),
            "par" => Some(Self::Par),
            "break" => Some(Self::Break),
            "critical" => Some(Self::Critical),
            "group" => Some(Self::Group),
            _ => None,
        }
    }

    /// Ключевое слово для заголовка рамки
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Alt => "alt",
            Self::Loop => "loop",
            Self::Opt => "opt",
            Self::Par => "par",
            Self::Break => "break",
            Self::Critical => "critical",
            Self::Group => "group",
        }
    }
}

/// Фрагмент (combined fragment)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fragment {
    /// Тип фрагмента
    pub kind: FragmentKind,
    /// Заголовок (текст после ключевого слова)
    pub label: Option<String>,
    /// Секции: непустой список (условие, элементы)
    pub sections: Vec<FragmentSection>,
    /// Цвет рамки
    pub color: Option<Color>,
}

/// Секция фрагмента (для alt: ветка else)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FragmentSection {
    /// Условие секции
    pub condition: Option<String>,
    /// Элементы секции
    pub elements: Vec<SequenceElement>,
}

/// Стиль заметки
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SequenceNoteStyle {
    #[default]
    Note,
    HNote,
    RNote,
}

/// Заметка
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequenceNote {
    /// Коды участников, к которым привязана заметка
    pub participants: Vec<String>,
    /// Позиция относительно участников
    pub position: NotePosition,
    /// Текст (строки соединены `\n`)
    pub text: String,
    /// Стиль (note/hnote/rnote)
    pub style: SequenceNoteStyle,
    /// Цвет фона
    pub color: Option<Color>,
    /// Растянута через всех участников
    pub is_across: bool,
}

/// Разделитель (`== text ==`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Divider {
    pub label: String,
}

/// Задержка (`...text...`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Delay {
    pub label: Option<String>,
}

/// Вертикальный отступ (`|||` или `||45||`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HSpace {
    pub size: Option<f64>,
}

/// Ссылка на другую диаграмму (`ref over ...`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reference {
    /// Охваченные участники
    pub participants: Vec<String>,
    /// Текст ссылки
    pub text: String,
    /// Цвет фона
    pub color: Option<Color>,
}

/// Box группировка участников
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParticipantBox {
    /// Название (в заголовке)
    pub title: Option<String>,
    /// Цвет фона
    pub color: Option<Color>,
    /// Коды участников внутри
    pub participants: Vec<String>,
}

/// Параметры нумерации сообщений
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoNumber {
    /// Начальное значение
    pub start: u32,
    /// Шаг
    pub step: u32,
    /// Строка формата (`0`/`#` — позиции цифр)
    pub format: Option<String>,
}

impl Default for AutoNumber {
    fn default() -> Self {
        Self {
            start: 1,
            step: 1,
            format: None,
        }
    }
}

/// Команда autonumber в потоке элементов
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AutoNumberCommand {
    Start(AutoNumber),
    Stop,
    Resume,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_participant_preserves_order() {
        let mut d = SequenceDiagram::new();
        d.ensure_participant("Alice");
        d.ensure_participant("Bob");
        d.ensure_participant("Alice");
        let codes: Vec<&String> = d.participants.keys().collect();
        assert_eq!(codes, vec!["Alice", "Bob"]);
    }

    #[test]
    fn test_ordered_participants_stable() {
        let mut d = SequenceDiagram::new();
        let mut a = Participant::new("A", "A");
        a.order = Some(20);
        let b = Participant::new("B", "B");
        let mut c = Participant::new("C", "C");
        c.order = Some(10);
        d.add_participant(a);
        d.add_participant(b);
        d.add_participant(c);
        let ordered: Vec<&str> = d.ordered_participants().iter().map(|p| p.code.as_str()).collect();
        // Без order — в конец, с order — по возрастанию
        assert_eq!(ordered, vec!["C", "A", "B"]);
    }

    #[test]
    fn test_self_message() {
        let msg = Message::new("Bob", "Bob", "internal");
        assert!(msg.is_self_message());
        assert_eq!(msg.arrow.head2, ArrowHead::Filled);
    }

    #[test]
    fn test_arrow_direction() {
        let mut arrow = ArrowConfig::default();
        arrow.head1 = ArrowHead::Filled;
        assert!(arrow.is_right_to_left());
        arrow.head2 = ArrowHead::Open;
        assert!(arrow.is_bidirectional());
    }
}
