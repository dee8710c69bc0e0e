//! Модель Component/Deployment и Use-Case диаграмм.
//!
//! Оба семейства используют одну модель и различаются только типами
//! элементов; use-case добавляет актёров и прецеденты, deployment —
//! узлы и артефакты.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::common::{Color, DirectionHint, LineStyle, LinkDecor, NotePosition};

/// Диаграмма компонентов / развёртывания / прецедентов
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComponentDiagram {
    /// Заголовок диаграммы
    pub title: Option<String>,
    /// Элементы в порядке появления (код -> элемент)
    pub elements: IndexMap<String, ComponentElement>,
    /// Контейнеры (путь -> контейнер); образуют дерево
    pub containers: IndexMap<String, ComponentContainer>,
    /// Связи
    pub relationships: Vec<ComponentRelationship>,
    /// Заметки
    pub notes: Vec<ComponentNote>,
    /// `left to right direction`
    pub left_to_right: bool,
}

impl ComponentDiagram {
    /// Создаёт новую пустую диаграмму
    pub fn new() -> Self {
        Self::default()
    }

    /// Добавляет элемент
    pub fn add_element(&mut self, element: ComponentElement) {
        self.elements.insert(element.code.clone(), element);
    }

    /// Регистрирует элемент по первой ссылке (авто-создание)
    pub fn ensure_element(&mut self, code: &str, default_kind: ComponentKind) {
        if !self.elements.contains_key(code) && !self.containers.contains_key(code) {
            self.elements.insert(
                code.to_string(),
                ComponentElement::new(code, code, default_kind),
            );
        }
    }

    /// Добавляет связь
    pub fn add_relationship(&mut self, rel: ComponentRelationship) {
        self.relationships.push(rel);
    }

    /// Элементы верхнего уровня (вне контейнеров)
    pub fn top_level_elements(&self) -> impl Iterator<Item = &ComponentElement> {
        self.elements.values().filter(|e| e.container_path.is_none())
    }
}

/// Тип элемента
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ComponentKind {
    #[default]
    Component,
    Interface,
    Actor,
    /// Актёр с суффиксом `/` (business)
    ActorBusiness,
    UseCase,
    /// Прецедент с суффиксом `/` (business)
    UseCaseBusiness,
    Agent,
    Artifact,
    Boundary,
    Card,
    Circle,
    Cloud,
    Collections,
    Control,
    Database,
    Entity,
    File,
    Folder,
    Frame,
    Hexagon,
    Label,
    Node,
    Package,
    Person,
    Process,
    Queue,
    Rectangle,
    Stack,
    Storage,
    Datastore,
}

impl ComponentKind {
    /// Парсит тип из ключевого слова объявления
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "component" => Some(Self::Component),
            "interface" => Some(Self::Interface),
            "actor" => Some(Self::Actor),
            "actor/" => Some(Self::ActorBusiness),
            "usecase" => Some(Self::UseCase),
            "usecase/" => Some(Self::UseCaseBusiness),
            "agent" => Some(Self::Agent),
            "artifact" => Some(Self::Artifact),
            "boundary" => Some(Self::Boundary),
            "card" => Some(Self::Card),
            "circle" => Some(Self::Circle),
            "cloud" => Some(Self::Cloud),
            "collections" => Some(Self::Collections),
            "control" => Some(Self::Control),
            "database" => Some(Self::Database),
            "entity" => Some(Self::Entity),
            "file" => Some(Self::File),
            "folder" => Some(Self::Folder),
            "frame" => Some(Self::Frame),
            "hexagon" => Some(Self::Hexagon),
            "label" => Some(Self::Label),
            "node" => Some(Self::Node),
            "package" => Some(Self::Package),
            "person" => Some(Self::Person),
            "process" => Some(Self::Process),
            "queue" => Some(Self::Queue),
            "rectangle" => Some(Self::Rectangle),
            "stack" => Some(Self::Stack),
            "storage" => Some(Self::Storage),
            "datastore" => Some(Self::Datastore),
            _ => None,
        }
    }

    /// Может ли тип открывать контейнерный блок `{ … }`
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            Self::Package
                | Self::Node
                | Self::Cloud
                | Self::Database
                | Self::Folder
                | Self::Frame
                | Self::Rectangle
                | Self::Card
                | Self::Storage
                | Self::Artifact
                | Self::Hexagon
                | Self::Queue
                | Self::Stack
                | Self::Agent
                | Self::Component
                | Self::Boundary
        )
    }
}

/// Элемент диаграммы
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentElement {
    /// Стабильный код
    pub code: String,
    /// Отображаемое имя
    pub display_name: String,
    /// Тип элемента
    pub kind: ComponentKind,
    /// Стереотип
    pub stereotype: Option<String>,
    /// Цвет фона
    pub color: Option<Color>,
    /// Путь контейнера-владельца (записан при парсинге)
    pub container_path: Option<String>,
}

impl ComponentElement {
    /// Создаёт новый элемент
    pub fn new(
        code: impl Into<String>,
        display_name: impl Into<String>,
        kind: ComponentKind,
    ) -> Self {
        Self {
            code: code.into(),
            display_name: display_name.into(),
            kind,
            stereotype: None,
            color: None,
            container_path: None,
        }
    }
}

/// Контейнер (package/node/cloud/…)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentContainer {
    /// Стабильный код
    pub code: String,
    /// Отображаемое имя
    pub display_name: String,
    /// Тип контейнера
    pub kind: ComponentKind,
    /// Полный путь (точечная конкатенация кодов предков)
    pub path: String,
    /// Путь родительского контейнера
    pub parent: Option<String>,
    /// Коды вложенных элементов
    pub children: Vec<String>,
    /// Пути вложенных контейнеров
    pub sub_containers: Vec<String>,
    /// Стереотип
    pub stereotype: Option<String>,
    /// Цвет фона
    pub color: Option<Color>,
}

impl ComponentContainer {
    /// Создаёт контейнер
    pub fn new(
        code: impl Into<String>,
        display_name: impl Into<String>,
        kind: ComponentKind,
        path: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            display_name: display_name.into(),
            kind,
            path: path.into(),
            parent: None,
            children: Vec::new(),
            sub_containers: Vec::new(),
            stereotype: None,
            color: None,
        }
    }
}

/// Связь между элементами
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentRelationship {
    /// Код левого элемента
    pub from: String,
    /// Код правого элемента
    pub to: String,
    /// Декоратор левого конца
    pub left_decor: LinkDecor,
    /// Декоратор правого конца
    pub right_decor: LinkDecor,
    /// Стиль линии
    pub line_style: LineStyle,
    /// Подпись
    pub label: Option<String>,
    /// Подсказка направления
    pub direction: DirectionHint,
    /// Цвет линии
    pub color: Option<Color>,
}

impl ComponentRelationship {
    /// Создаёт связь без декораторов
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            left_decor: LinkDecor::None,
            right_decor: LinkDecor::None,
            line_style: LineStyle::Solid,
            label: None,
            direction: DirectionHint::None,
            color: None,
        }
    }
}

/// Заметка
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentNote {
    /// Позиция относительно якоря
    pub position: NotePosition,
    /// Текст
    pub text: String,
    /// Код элемента-якоря
    pub entity_code: Option<String>,
    /// Цвет фона
    pub color: Option<Color>,
    /// Заметка на связи
    pub is_on_link: bool,
    /// Индекс связи
    pub link_index: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parse_business_variants() {
        assert_eq!(ComponentKind::parse("usecase/"), Some(ComponentKind::UseCaseBusiness));
        assert_eq!(ComponentKind::parse("actor/"), Some(ComponentKind::ActorBusiness));
    }

    #[test]
    fn test_container_kinds() {
        assert!(ComponentKind::Package.is_container());
        assert!(ComponentKind::Node.is_container());
        assert!(!ComponentKind::Actor.is_container());
        assert!(!ComponentKind::UseCase.is_container());
    }

    #[test]
    fn test_ensure_element_skips_containers() {
        let mut d = ComponentDiagram::new();
        d.containers.insert(
            "Srv".into(),
            ComponentContainer::new("Srv", "Server", ComponentKind::Node, "Srv"),
        );
        d.ensure_element("Srv", ComponentKind::Component);
        assert!(d.elements.is_empty());
    }
}
