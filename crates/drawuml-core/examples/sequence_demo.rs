//! Демо: конвертация sequence diagram в draw.io XML
//!
//! Запуск: cargo run --example sequence_demo

use drawuml_core::{convert, ConvertOptions};
use std::fs;

fn main() {
    let source = r#"@startuml
title Авторизация пользователя
participant User
participant Server
database DB

User -> Server: Запрос авторизации ++
alt Успех
    Server -> DB: Проверить пользователя
    DB --> Server: Найден
    Server --> User: Токен
else Ошибка
    Server --> User: Ошибка 401
end
deactivate Server
@enduml"#;

    let xml = convert(source, &ConvertOptions::default()).expect("конвертация не удалась");
    fs::write("sequence_demo.drawio", &xml).expect("не удалось записать файл");
    println!("Записан sequence_demo.drawio ({} байт)", xml.len());
}
