use crate::cursor_error;
use crate::error::Result;
use crate::events::WindowInfo;
use crate::utils::query_stdout;
use serde_json::Value;
use std::time::Duration;

use super::r#trait::ActiveWindowSource;

/// Sway и совместимые композиторы через `swaymsg -t get_tree`
pub struct SwaySource;

impl SwaySource {
    pub fn new() -> Self {
        Self
    }

    /// Найти в дереве узел с "focused": true
    pub fn find_focused(node: &Value) -> Option<WindowInfo> {
        if node.get("focused").and_then(Value::as_bool) == Some(true) {
            let title = node.get("name").and_then(Value::as_str).unwrap_or_default();
            let class = node
                .get("app_id")
                .and_then(Value::as_str)
                .or_else(|| {
                    node.get("window_properties")
                        .and_then(|props| props.get("class"))
                        .and_then(Value::as_str)
                })
                .unwrap_or_default();
            return Some(WindowInfo::new(title.to_string()).with_class(class.to_string()));
        }

        ["nodes", "floating_nodes"]
            .iter()
            .filter_map(|key| node.get(*key).and_then(Value::as_array))
            .flatten()
            .find_map(Self::find_focused)
    }
}

#[async_trait::async_trait]
impl ActiveWindowSource for SwaySource {
    fn name(&self) -> &'static str {
        "swaymsg"
    }

    async fn get_active_window(&self, timeout: Duration) -> Result<WindowInfo> {
        let tree = query_stdout("swaymsg", &["-t", "get_tree"], timeout).await?;
        let tree: Value = serde_json::from_str(&tree)?;

        Self::find_focused(&tree)
            .ok_or_else(|| cursor_error!(internal, "Активное окно в Sway не найдено"))
    }
}
