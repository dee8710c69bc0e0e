//! Интеграционные тесты class диаграмм.

use drawuml_core::{convert, parse_diagram, ConvertOptions, Diagram};
use drawuml_model::class::{ClassKind, MemberKind, Visibility};

#[test]
fn test_class_with_members() {
    // Person: два поля и метод с типом возврата
    let source = "@startuml\nclass Person {\n  +name : String\n  -age : int\n  +greet() : void\n}\n@enduml";

    let Diagram::Class(model) = parse_diagram(source).unwrap() else {
        panic!("Expected class diagram");
    };
    assert_eq!(model.entities.len(), 1);
    let person = &model.entities["Person"];
    assert_eq!(person.kind, ClassKind::Class);

    let fields: Vec<_> = person.fields().collect();
    assert_eq!(fields.len(), 2);
    assert_eq!(fields[0].name, "name");
    assert_eq!(fields[0].visibility, Visibility::Public);
    assert_eq!(fields[0].return_type.as_deref(), Some("String"));
    assert_eq!(fields[1].name, "age");
    assert_eq!(fields[1].visibility, Visibility::Private);
    assert_eq!(fields[1].return_type.as_deref(), Some("int"));

    let methods: Vec<_> = person.methods().collect();
    assert_eq!(methods.len(), 1);
    assert_eq!(methods[0].name, "greet");
    assert_eq!(methods[0].kind, MemberKind::Method);
    assert_eq!(methods[0].parameters.as_deref(), Some(""));
    assert_eq!(methods[0].return_type.as_deref(), Some("void"));

    let xml = convert(source, &ConvertOptions::default()).unwrap();
    assert!(xml.contains("swimlane"));
    assert!(xml.contains("+name : String"));
    assert!(xml.contains("-age : int"));
    assert!(xml.contains("+greet() : void"));
}

#[test]
fn test_inheritance_and_realization() {
    let source = "@startuml\ninterface Shape\nclass Circle\nShape <|.. Circle\nclass Base\nclass Derived\nBase <|-- Derived\n@enduml";
    let Diagram::Class(model) = parse_diagram(source).unwrap() else {
        panic!("Expected class diagram");
    };
    assert_eq!(model.relationships.len(), 2);
    assert_eq!(model.entities["Shape"].kind, ClassKind::Interface);

    let xml = convert(source, &ConvertOptions::default()).unwrap();
    // Наследование: незакрашенный блок на стороне источника
    assert!(xml.contains("startArrow=block;startFill=0;"));
}

#[test]
fn test_composition_document() {
    let source = "@startuml\nEngine --* Car\n@enduml";
    let xml = convert(source, &ConvertOptions::default()).unwrap();
    assert!(xml.contains("endArrow=diamond;endFill=1;"));
}

#[test]
fn test_package_grouping() {
    let source = "@startuml\npackage core {\nclass Service\n}\nclass Client\nClient --> Service\n@enduml";
    let Diagram::Class(model) = parse_diagram(source).unwrap() else {
        panic!("Expected class diagram");
    };
    assert_eq!(
        model.entities["Service"].package_path.as_deref(),
        Some("core")
    );
    assert!(model.entities["Client"].package_path.is_none());

    let xml = convert(source, &ConvertOptions::default()).unwrap();
    assert!(xml.contains("sysml.package"));
}

#[test]
fn test_map_and_json_entities() {
    let source = "@startuml\nmap Config {\n  host => localhost\n}\njson Payload {\n{\"ok\": true}\n}\n@enduml";
    let Diagram::Class(model) = parse_diagram(source).unwrap() else {
        panic!("Expected class diagram");
    };
    assert_eq!(model.entities["Config"].kind, ClassKind::Map);
    assert_eq!(model.entities["Payload"].kind, ClassKind::Json);

    let xml = convert(source, &ConvertOptions::default()).unwrap();
    assert!(xml.contains("host =&gt; localhost"));
    assert!(xml.contains("ok: true"));
}

#[test]
fn test_hide_empty_members_flag() {
    let source = "@startuml\nhide empty members\nclass A\n@enduml";
    let Diagram::Class(model) = parse_diagram(source).unwrap() else {
        panic!("Expected class diagram");
    };
    assert!(model.hidden_members.empty_members);
}
