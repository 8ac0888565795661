//! Name-indexed tool collection.

use std::sync::Arc;

use crate::tools::{Tool, ToolError};

/// The tools an agent may choose from, in registration order.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tool. Names must be unique.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<(), ToolError> {
        if tool.name() == crate::agent::RESPOND {
            return Err(ToolError::Duplicate(tool.name().to_string()));
        }
        if self.get(tool.name()).is_some() {
            return Err(ToolError::Duplicate(tool.name().to_string()));
        }
        self.tools.push(tool);
        Ok(())
    }

    /// Builder-style [`ToolRegistry::register`].
    pub fn with(mut self, tool: impl Tool + 'static) -> Result<Self, ToolError> {
        self.register(Arc::new(tool))?;
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Tool>> {
        self.tools.iter()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Schema;
    use crate::testing::FnTool;
    use crate::tools::ToolResult;
    use serde_json::Value;

    fn noop(name: &str) -> FnTool {
        FnTool::new(name, Schema::object(), |_| Ok(ToolResult::success(Value::Null)))
    }

    #[test]
    fn keeps_registration_order() {
        let registry = ToolRegistry::new()
            .with(noop("b"))
            .unwrap()
            .with(noop("a"))
            .unwrap();
        assert_eq!(registry.names(), vec!["b", "a"]);
        assert_eq!(registry.len(), 2);
        assert!(registry.get("a").is_some());
        assert!(registry.get("c").is_none());
    }

    #[test]
    fn rejects_duplicates_and_reserved_name() {
        let registry = ToolRegistry::new().with(noop("a")).unwrap();
        assert!(matches!(
            registry.clone().with(noop("a")),
            Err(ToolError::Duplicate(name)) if name == "a"
        ));
        assert!(matches!(
            registry.with(noop("respond")),
            Err(ToolError::Duplicate(_))
        ));
    }

    #[test]
    fn empty_registry_has_no_tools() {
        let registry = ToolRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.names().is_empty());
    }
}
