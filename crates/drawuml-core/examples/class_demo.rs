//! Демо: конвертация class diagram в draw.io XML
//!
//! Запуск: cargo run --example class_demo

use drawuml_core::{convert, ConvertOptions};
use std::fs;

fn main() {
    let source = r#"@startuml
package domain {
    class Person {
        +name : String
        -age : int
        +greet() : void
    }
    class Employee
}
interface Payable
Person <|-- Employee
Payable <|.. Employee
Employee "1" --> "many" Person : manages
@enduml"#;

    let xml = convert(source, &ConvertOptions::default()).expect("конвертация не удалась");
    fs::write("class_demo.drawio", &xml).expect("не удалось записать файл");
    println!("Записан class_demo.drawio ({} байт)", xml.len());
}
