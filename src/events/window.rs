use serde::{Deserialize, Serialize};
use std::fmt;

/// Информация об активном окне
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowInfo {
    pub title: String,
    pub class: String,
}

impl WindowInfo {
    pub fn new(title: String) -> Self {
        Self {
            title,
            class: String::new(),
        }
    }

    pub fn with_class(mut self, class: String) -> Self {
        self.class = class;
        self
    }

    /// Проверить, соответствует ли окно паттерну (регистронезависимо)
    pub fn matches_pattern(&self, pattern: &str) -> bool {
        if pattern.is_empty() {
            return false;
        }
        let pattern_lower = pattern.to_lowercase();
        self.title.to_lowercase().contains(&pattern_lower)
            || self.class.to_lowercase().contains(&pattern_lower)
    }

    /// Проверить, соответствует ли окно любому из паттернов
    pub fn matches_any_pattern(&self, patterns: &[String]) -> bool {
        patterns.iter().any(|pattern| self.matches_pattern(pattern))
    }
}

impl fmt::Display for WindowInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.class.is_empty() {
            write!(f, "\"{}\"", self.title)
        } else {
            write!(f, "\"{}\" ({})", self.title, self.class)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_pattern_matching() {
        let window = WindowInfo::new("main.rs - crate - Visual Studio Code".to_string())
            .with_class("code".to_string());

        assert!(window.matches_pattern("visual studio code"));
        assert!(window.matches_pattern("Code"));
        assert!(!window.matches_pattern("emacs"));

        let patterns = vec!["vim".to_string(), "Visual Studio".to_string()];
        assert!(window.matches_any_pattern(&patterns));

        // В отличие от фильтров окон, пустой список не совпадает ни с чем
        let no_patterns: Vec<String> = vec![];
        assert!(!window.matches_any_pattern(&no_patterns));
        assert!(!window.matches_pattern(""));
    }

    #[test]
    fn test_window_display() {
        let window = WindowInfo::new("Terminal".to_string());
        assert_eq!(window.to_string(), "\"Terminal\"");
        let window = window.with_class("kitty".to_string());
        assert_eq!(window.to_string(), "\"Terminal\" (kitty)");
    }
}
