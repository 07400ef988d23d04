use crate::events::LayoutCode;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Идентификаторы источников ввода macOS (HIToolbox)
const MAC_LAYOUT_IDS: &[(&str, &str)] = &[
    ("com.apple.keylayout.US", "en-US"),
    ("com.apple.keylayout.Russian", "ru"),
    ("com.apple.keylayout.RussianWin", "ru"),
    ("com.apple.keylayout.German", "de"),
    ("com.apple.keylayout.German-QWERTY", "de"),
    ("com.apple.keylayout.French", "fr"),
    ("com.apple.keylayout.French-PC", "fr"),
];

/// Языковые теги Windows (Get-WinUserLanguageList)
const WINDOWS_LANGUAGE_TAGS: &[(&str, &str)] = &[
    ("en-US", "en-US"),
    ("ru-RU", "ru"),
    ("de-DE", "de"),
    ("fr-FR", "fr"),
];

/// Короткие коды XKB (setxkbmap)
const XKB_LAYOUTS: &[(&str, &str)] = &[
    ("us", "en-US"),
    ("ru", "ru"),
    ("de", "de"),
    ("fr", "fr"),
];

pub static MAC_LAYOUTS: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| MAC_LAYOUT_IDS.iter().copied().collect());

pub static WINDOWS_LAYOUTS: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| WINDOWS_LANGUAGE_TAGS.iter().copied().collect());

pub static LINUX_LAYOUTS: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| XKB_LAYOUTS.iter().copied().collect());

/// Известные идентификаторы переводятся по таблице, неизвестные проходят как есть
pub fn normalize_with(table: &HashMap<&'static str, &'static str>, raw: &str) -> LayoutCode {
    let raw = raw.trim();
    match table.get(raw) {
        Some(code) => LayoutCode::from(*code),
        None => LayoutCode::from(raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_mapping() {
        assert_eq!(normalize_with(&MAC_LAYOUTS, "com.apple.keylayout.Russian").as_str(), "ru");
        assert_eq!(normalize_with(&MAC_LAYOUTS, "com.apple.keylayout.French-PC").as_str(), "fr");
        assert_eq!(normalize_with(&WINDOWS_LAYOUTS, "ru-RU").as_str(), "ru");
        assert_eq!(normalize_with(&LINUX_LAYOUTS, "de").as_str(), "de");
        assert_eq!(normalize_with(&LINUX_LAYOUTS, "us").as_str(), "en-US");
    }

    #[test]
    fn test_unknown_values_pass_through() {
        assert_eq!(
            normalize_with(&MAC_LAYOUTS, "com.apple.keylayout.Spanish").as_str(),
            "com.apple.keylayout.Spanish"
        );
        assert_eq!(normalize_with(&WINDOWS_LAYOUTS, "es-ES").as_str(), "es-ES");
        assert_eq!(normalize_with(&LINUX_LAYOUTS, "ua").as_str(), "ua");
    }

    #[test]
    fn test_tables_have_no_duplicate_keys() {
        assert_eq!(MAC_LAYOUTS.len(), MAC_LAYOUT_IDS.len());
        assert_eq!(WINDOWS_LAYOUTS.len(), WINDOWS_LANGUAGE_TAGS.len());
        assert_eq!(LINUX_LAYOUTS.len(), XKB_LAYOUTS.len());
    }
}
