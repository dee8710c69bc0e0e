//! Модель Class Diagrams (диаграмм классов).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::common::{Color, DirectionHint, LineStyle, LinkDecor, NotePosition};

/// Диаграмма классов
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassDiagram {
    /// Заголовок диаграммы
    pub title: Option<String>,
    /// Сущности в порядке появления (код -> сущность)
    pub entities: IndexMap<String, ClassEntity>,
    /// Пакеты (путь -> пакет)
    pub packages: IndexMap<String, Package>,
    /// Связи между сущностями
    pub relationships: Vec<Relationship>,
    /// Заметки
    pub notes: Vec<ClassNote>,
    /// Подавленные категории членов (hide-директивы)
    pub hidden_members: HiddenMembers,
    /// Скрытые сущности (`hide <name>`)
    pub hidden_entities: Vec<String>,
}

impl ClassDiagram {
    /// Создаёт новую пустую диаграмму
    pub fn new() -> Self {
        Self::default()
    }

    /// Добавляет сущность
    pub fn add_entity(&mut self, entity: ClassEntity) {
        self.entities.insert(entity.code.clone(), entity);
    }

    /// Регистрирует сущность по первой ссылке (авто-создание класса)
    pub fn ensure_entity(&mut self, code: &str) {
        if !self.entities.contains_key(code) {
            self.entities
                .insert(code.to_string(), ClassEntity::new(code, code));
        }
    }

    /// Добавляет связь
    pub fn add_relationship(&mut self, rel: Relationship) {
        self.relationships.push(rel);
    }
}

/// Категории членов, скрытые hide-директивами
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HiddenMembers {
    pub empty_members: bool,
    pub fields: bool,
    pub methods: bool,
    pub circle: bool,
    pub stereotypes: bool,
}

/// Тип сущности
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ClassKind {
    #[default]
    Class,
    Interface,
    AbstractClass,
    Enum,
    Annotation,
    Entity,
    Protocol,
    Struct,
    Exception,
    Metaclass,
    StereotypeType,
    Dataclass,
    Record,
    Circle,
    Diamond,
    Object,
    Map,
    Json,
    /// Закрашенный кружок интерфейса `() "name"`
    LollipopFull,
}

impl ClassKind {
    /// Парсит тип из ключевого слова объявления
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "class" => Some(Self::Class),
            "interface" => Some(Self::Interface),
            "abstract class" | "abstract" => Some(Self::AbstractClass),
            "enum" => Some(Self::Enum),
            "annotation" => Some(Self::Annotation),
            "entity" => Some(Self::Entity),
            "protocol" => Some(Self::Protocol),
            "struct" => Some(Self::Struct),
            "exception" => Some(Self::Exception),
            "metaclass" => Some(Self::Metaclass),
            "stereotype" => Some(Self::StereotypeType),
            "dataclass" => Some(Self::Dataclass),
            "record" => Some(Self::Record),
            "circle" => Some(Self::Circle),
            "diamond" => Some(Self::Diamond),
            "object" => Some(Self::Object),
            "map" => Some(Self::Map),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Сущность диаграммы классов
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassEntity {
    /// Стабильный код
    pub code: String,
    /// Отображаемое имя
    pub display_name: String,
    /// Тип сущности
    pub kind: ClassKind,
    /// Стереотипы (без угловых скобок)
    pub stereotypes: Vec<String>,
    /// Обобщённые параметры `<T, U>`
    pub generic_params: Option<String>,
    /// Имена из `extends` (декорация заголовка, связь не синтезируется)
    pub extends: Vec<String>,
    /// Имена из `implements`
    pub implements: Vec<String>,
    /// Члены и разделители в порядке объявления
    pub members: Vec<ClassItem>,
    /// Записи map-тела
    pub map_entries: Vec<MapEntry>,
    /// Дерево json-тела
    pub json_node: Option<JsonNode>,
    /// Цвет фона
    pub color: Option<Color>,
    /// Путь пакета-владельца (точечная конкатенация кодов)
    pub package_path: Option<String>,
}

impl ClassEntity {
    /// Создаёт новую сущность типа class
    pub fn new(code: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            display_name: display_name.into(),
            kind: ClassKind::Class,
            stereotypes: Vec::new(),
            generic_params: None,
            extends: Vec::new(),
            implements: Vec::new(),
            members: Vec::new(),
            map_entries: Vec::new(),
            json_node: None,
            color: None,
            package_path: None,
        }
    }

    /// Устанавливает тип
    pub fn with_kind(mut self, kind: ClassKind) -> Self {
        self.kind = kind;
        self
    }

    /// Поля сущности
    pub fn fields(&self) -> impl Iterator<Item = &Member> {
        self.members.iter().filter_map(|m| match m {
            ClassItem::Member(member) if member.kind == MemberKind::Field => Some(member),
            _ => None,
        })
    }

    /// Методы сущности
    pub fn methods(&self) -> impl Iterator<Item = &Member> {
        self.members.iter().filter_map(|m| match m {
            ClassItem::Member(member) if member.kind == MemberKind::Method => Some(member),
            _ => None,
        })
    }
}

/// Элемент тела сущности: член или разделитель
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ClassItem {
    Member(Member),
    Separator(Separator),
}

/// Вид члена
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MemberKind {
    #[default]
    Field,
    Method,
}

/// Видимость члена
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Visibility {
    Public,
    Private,
    Protected,
    Package,
    #[default]
    None,
}

impl Visibility {
    /// Парсит префикс видимости
    pub fn parse(c: char) -> Option<Self> {
        match c {
            '+' => Some(Self::Public),
            '-' => Some(Self::Private),
            '#' => Some(Self::Protected),
            '~' => Some(Self::Package),
            _ => None,
        }
    }

    /// Символ UML для отображения
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Public => "+",
            Self::Private => "-",
            Self::Protected => "#",
            Self::Package => "~",
            Self::None => "",
        }
    }
}

/// Член сущности (поле или метод)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Member {
    /// Исходный текст строки члена (нераспознанный остаток сохраняется)
    pub raw_text: String,
    /// Поле или метод
    pub kind: MemberKind,
    /// Видимость
    pub visibility: Visibility,
    /// Имя
    pub name: String,
    /// Тип возврата / тип поля
    pub return_type: Option<String>,
    /// Параметры метода (текст внутри скобок)
    pub parameters: Option<String>,
    /// Статический член
    pub is_static: bool,
    /// Абстрактный член
    pub is_abstract: bool,
}

/// Стиль разделителя членов
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SeparatorStyle {
    /// `--`
    #[default]
    Solid,
    /// `..`
    Dotted,
    /// `==`
    Double,
    /// `__`
    Thick,
}

/// Разделитель внутри тела сущности
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Separator {
    /// Текст между сдвоенными разделителями
    pub label: Option<String>,
    pub style: SeparatorStyle,
}

/// Пакет
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Package {
    /// Имя пакета
    pub name: String,
    /// Полный путь (точечная конкатенация кодов предков)
    pub path: String,
    /// Путь родителя
    pub parent: Option<String>,
    /// Пути вложенных пакетов
    pub sub_packages: Vec<String>,
    /// Коды сущностей внутри
    pub entities: Vec<String>,
    /// Цвет фона
    pub color: Option<Color>,
}

impl Package {
    /// Создаёт пакет
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            parent: None,
            sub_packages: Vec::new(),
            entities: Vec::new(),
            color: None,
        }
    }
}

/// Связь между сущностями
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relationship {
    /// Код левой сущности
    pub from: String,
    /// Код правой сущности
    pub to: String,
    /// Декоратор левого конца
    pub left_decor: LinkDecor,
    /// Декоратор правого конца
    pub right_decor: LinkDecor,
    /// Стиль линии
    pub line_style: LineStyle,
    /// Подпись связи
    pub label: Option<String>,
    /// Кардинальность у левого конца
    pub left_label: Option<String>,
    /// Кардинальность у правого конца
    pub right_label: Option<String>,
    /// Квалификатор левого конца `[key]`
    pub left_qualifier: Option<String>,
    /// Квалификатор правого конца
    pub right_qualifier: Option<String>,
    /// Подсказка направления
    pub direction: DirectionHint,
    /// Цвет линии
    pub color: Option<Color>,
}

impl Relationship {
    /// Создаёт связь без декораторов
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            left_decor: LinkDecor::None,
            right_decor: LinkDecor::None,
            line_style: LineStyle::Solid,
            label: None,
            left_label: None,
            right_label: None,
            left_qualifier: None,
            right_qualifier: None,
            direction: DirectionHint::None,
            color: None,
        }
    }
}

/// Заметка диаграммы классов
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassNote {
    /// Позиция относительно сущности
    pub position: NotePosition,
    /// Текст
    pub text: String,
    /// Код сущности-якоря
    pub entity_code: Option<String>,
    /// Алиас заметки (`note "..." as N`)
    pub alias: Option<String>,
    /// Цвет фона
    pub color: Option<Color>,
    /// Заметка на связи (`note on link`)
    pub is_on_link: bool,
    /// Индекс связи для note on link
    pub link_index: Option<usize>,
}

/// Запись map-тела: `key => value` или `key *--> Target`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapEntry {
    pub key: String,
    pub value: Option<String>,
    /// Цель связи-вылета из записи
    pub linked_target: Option<String>,
}

/// Узел json-тела
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum JsonNode {
    /// Объект: упорядоченные пары ключ-значение
    Object(Vec<(String, JsonNode)>),
    /// Массив
    Array(Vec<JsonNode>),
    /// Примитив (сырой текст)
    Primitive(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility_parse() {
        assert_eq!(Visibility::parse('+'), Some(Visibility::Public));
        assert_eq!(Visibility::parse('-'), Some(Visibility::Private));
        assert_eq!(Visibility::parse('#'), Some(Visibility::Protected));
        assert_eq!(Visibility::parse('~'), Some(Visibility::Package));
        assert_eq!(Visibility::parse('*'), None);
    }

    #[test]
    fn test_class_kind_parse() {
        assert_eq!(ClassKind::parse("abstract class"), Some(ClassKind::AbstractClass));
        assert_eq!(ClassKind::parse("Interface"), Some(ClassKind::Interface));
        assert_eq!(ClassKind::parse("component"), None);
    }

    #[test]
    fn test_fields_and_methods_split() {
        let mut entity = ClassEntity::new("Person", "Person");
        entity.members.push(ClassItem::Member(Member {
            kind: MemberKind::Field,
            name: "name".into(),
            ..Member::default()
        }));
        entity.members.push(ClassItem::Member(Member {
            kind: MemberKind::Method,
            name: "greet".into(),
            ..Member::default()
        }));
        entity.members.push(ClassItem::Separator(Separator {
            label: None,
            style: SeparatorStyle::Solid,
        }));
        assert_eq!(entity.fields().count(), 1);
        assert_eq!(entity.methods().count(), 1);
    }

    #[test]
    fn test_ensure_entity_keeps_existing() {
        let mut d = ClassDiagram::new();
        let mut e = ClassEntity::new("User", "Пользователь");
        e.kind = ClassKind::Interface;
        d.add_entity(e);
        d.ensure_entity("User");
        assert_eq!(d.entities["User"].kind, ClassKind::Interface);
    }
}
