use crate::config::LayoutColorTable;
use crate::events::LayoutCode;

/// Цвет, если в таблице нет ни запрошенной раскладки, ни en-US
pub const FALLBACK_COLOR: &str = "#007ACC";

/// Цвет курсора для раскладки: точное совпадение, затем en-US, затем константа
pub fn resolve_color<'a>(code: &LayoutCode, table: &'a LayoutColorTable) -> &'a str {
    table
        .get(code.as_str())
        .or_else(|| table.get(LayoutCode::DEFAULT))
        .map(String::as_str)
        .unwrap_or(FALLBACK_COLOR)
}
