//! Сквозные свойства производимых документов: уникальность
//! идентификаторов, корректность родителей, концы рёбер, обратное
//! преобразование.

use drawuml_core::{convert, extract_plantuml_source, parse_diagram, ConvertOptions};

const SOURCES: &[&str] = &[
    "@startuml\nAlice -> Bob: Hello\nBob --> Alice: Hi back\n@enduml",
    "@startuml\nparticipant A\nactor B\nA -> B: go ++\nB -> B: work\nB --> A: done --\nalt ok\nA -> B: again\nend\nnote right of B: заметка\n@enduml",
    "@startuml\nclass Person {\n  +name : String\n  +greet() : void\n}\nclass Admin\nPerson <|-- Admin\n@enduml",
    "@startuml\npackage web {\n[Frontend]\n}\n[Frontend] --> [Backend]\n@enduml",
    "@startuml\n:User: --> (Login)\n@enduml",
    "@startuml\n[*] --> Idle\nIdle --> Busy : job\nBusy --> [*]\n@enduml",
    "@startuml\nrobust \"U\" as U\nconcise \"S\" as S\n@0\nU is A\nS is X\n@50\nU is B\nS is Y\n@enduml",
];

/// Атрибут из фрагмента тега
fn attr<'a>(tag: &'a str, name: &str) -> Option<&'a str> {
    let needle = format!("{}=\"", name);
    let start = tag.find(&needle)? + needle.len();
    let rest = &tag[start..];
    Some(&rest[..rest.find('"')?])
}

/// Открывающие теги ячеек документа в порядке появления
fn cell_tags(xml: &str) -> Vec<&str> {
    let mut tags = Vec::new();
    let mut rest = xml;
    while let Some(pos) = rest.find('<') {
        rest = &rest[pos..];
        if rest.starts_with("<mxCell") || rest.starts_with("<UserObject") {
            let end = rest.find('>').unwrap_or(rest.len());
            tags.push(&rest[..end]);
        }
        rest = &rest[1..];
    }
    tags
}

#[test]
fn test_cell_ids_unique() {
    for source in SOURCES {
        let xml = convert(source, &ConvertOptions::default()).unwrap();
        let mut ids: Vec<&str> = cell_tags(&xml)
            .iter()
            .filter_map(|t| attr(t, "id"))
            .collect();
        let total = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), total, "duplicate ids in: {}", source);
    }
}

#[test]
fn test_parents_reference_earlier_cells() {
    for source in SOURCES {
        let xml = convert(source, &ConvertOptions::default()).unwrap();
        let mut seen: Vec<String> = Vec::new();
        for tag in cell_tags(&xml) {
            let id = attr(tag, "id").unwrap_or("");
            if let Some(parent) = attr(tag, "parent") {
                assert!(
                    seen.iter().any(|s| s == parent),
                    "parent '{}' of '{}' not seen yet in: {}",
                    parent,
                    id,
                    source
                );
            }
            seen.push(id.to_string());
        }
    }
}

#[test]
fn test_edges_have_endpoints() {
    for source in SOURCES {
        let xml = convert(source, &ConvertOptions::default()).unwrap();
        let mut rest = xml.as_str();
        while let Some(pos) = rest.find("<mxCell") {
            rest = &rest[pos..];
            let end = rest.find("</mxCell>").map(|e| e + 9).unwrap_or_else(|| {
                rest.find("/>").map(|e| e + 2).unwrap_or(rest.len())
            });
            let chunk = &rest[..end];
            let tag_end = chunk.find('>').unwrap_or(chunk.len());
            let tag = &chunk[..tag_end];
            if tag.contains("edge=\"1\"") {
                let by_reference =
                    attr(tag, "source").is_some() && attr(tag, "target").is_some();
                let by_points = chunk.contains("as=\"sourcePoint\"")
                    && chunk.contains("as=\"targetPoint\"");
                assert!(
                    by_reference || by_points,
                    "edge without endpoints in: {}\n{}",
                    source,
                    chunk
                );
            }
            rest = &rest[1..];
        }
    }
}

#[test]
fn test_roundtrip_model_equality() {
    // R1: повторный парсинг исходника из UserObject даёт ту же модель
    for source in SOURCES {
        let xml = convert(source, &ConvertOptions::default()).unwrap();
        let embedded = extract_plantuml_source(&xml).unwrap();
        let first = parse_diagram(source.trim()).unwrap();
        let second = parse_diagram(&embedded).unwrap();
        let first_json = serde_json::to_string(&first).unwrap();
        let second_json = serde_json::to_string(&second).unwrap();
        assert_eq!(first_json, second_json, "model mismatch for: {}", source);
    }
}

#[test]
fn test_document_envelope_shape() {
    let xml = convert(
        "@startuml\nAlice -> Bob\n@enduml",
        &ConvertOptions::default(),
    )
    .unwrap();
    assert!(xml.starts_with("<mxfile>"));
    assert!(xml.contains("<diagram name=\"PlantUML Import\">"));
    assert!(xml.contains("<mxCell id=\"0\"/>"));
    assert!(xml.contains("<mxCell id=\"1\" parent=\"0\"/>"));
    assert!(xml.contains("<UserObject label=\"\" plantUml=\""));
    assert!(xml.contains("style=\"group;editable=0;connectable=0;\""));
    assert!(xml.ends_with("</root></mxGraphModel></diagram></mxfile>"));
}
