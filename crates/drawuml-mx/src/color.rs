//! Нормализация цветов PlantUML в hex.

/// Таблица имён цветов PlantUML (подмножество, встречающееся в
/// реальных диаграммах). Имена сравниваются без регистра.
const NAMED_COLORS: &[(&str, &str)] = &[
    ("aliceblue", "#F0F8FF"),
    ("aqua", "#00FFFF"),
    ("beige", "#F5F5DC"),
    ("black", "#000000"),
    ("blue", "#0000FF"),
    ("brown", "#A52A2A"),
    ("coral", "#FF7F50"),
    ("crimson", "#DC143C"),
    ("cyan", "#00FFFF"),
    ("darkblue", "#00008B"),
    ("darkgray", "#A9A9A9"),
    ("darkgreen", "#006400"),
    ("darkorange", "#FF8C00"),
    ("darkred", "#8B0000"),
    ("gold", "#FFD700"),
    ("gray", "#808080"),
    ("green", "#008000"),
    ("grey", "#808080"),
    ("hotpink", "#FF69B4"),
    ("indigo", "#4B0082"),
    ("ivory", "#FFFFF0"),
    ("khaki", "#F0E68C"),
    ("lavender", "#E6E6FA"),
    ("lightblue", "#ADD8E6"),
    ("lightcoral", "#F08080"),
    ("lightcyan", "#E0FFFF"),
    ("lightgray", "#D3D3D3"),
    ("lightgreen", "#90EE90"),
    ("lightgrey", "#D3D3D3"),
    ("lightpink", "#FFB6C1"),
    ("lightsalmon", "#FFA07A"),
    ("lightskyblue", "#87CEFA"),
    ("lightyellow", "#FFFFE0"),
    ("lime", "#00FF00"),
    ("magenta", "#FF00FF"),
    ("maroon", "#800000"),
    ("navy", "#000080"),
    ("olive", "#808000"),
    ("orange", "#FFA500"),
    ("orchid", "#DA70D6"),
    ("palegreen", "#98FB98"),
    ("pink", "#FFC0CB"),
    ("plum", "#DDA0DD"),
    ("purple", "#800080"),
    ("red", "#FF0000"),
    ("royalblue", "#4169E1"),
    ("salmon", "#FA8072"),
    ("silver", "#C0C0C0"),
    ("skyblue", "#87CEEB"),
    ("springgreen", "#00FF7F"),
    ("tan", "#D2B48C"),
    ("teal", "#008080"),
    ("tomato", "#FF6347"),
    ("turquoise", "#40E0D0"),
    ("violet", "#EE82EE"),
    ("wheat", "#F5DEB3"),
    ("white", "#FFFFFF"),
    ("yellow", "#FFFF00"),
    ("yellowgreen", "#9ACD32"),
];

/// Нормализует цвет PlantUML в `#RRGGBB`.
///
/// Принимает `#FF0000`, `FF0000`, `#F00`, `red`, `#LightBlue`.
/// Неизвестные имена возвращаются как есть (с ведущим `#`, если
/// значение похоже на hex).
pub fn normalize(color: &str) -> String {
    let trimmed = color.trim().trim_start_matches('#');
    if trimmed.is_empty() {
        return String::new();
    }

    let is_hex = (trimmed.len() == 3 || trimmed.len() == 6 || trimmed.len() == 8)
        && trimmed.chars().all(|c| c.is_ascii_hexdigit());
    if is_hex {
        if trimmed.len() == 3 {
            // #RGB -> #RRGGBB
            let mut out = String::with_capacity(7);
            out.push('#');
            for c in trimmed.chars() {
                out.push(c);
                out.push(c);
            }
            return out.to_uppercase();
        }
        return format!("#{}", trimmed.to_uppercase());
    }

    let lower = trimmed.to_lowercase();
    for (name, hex) in NAMED_COLORS {
        if *name == lower {
            return (*hex).to_string();
        }
    }
    trimmed.to_string()
}
