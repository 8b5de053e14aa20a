// Invocation context module
// Execution metadata supplied alongside each request

use serde::Serialize;

use crate::config::FunctionConfig;

/// Metadata about the current execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationContext {
    pub request_id: String,
    pub function_name: String,
    pub function_version: String,
    pub memory_limit_in_mb: u32,
}

/// Reduced context forwarded to the delegate function
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DelegateContext<'a> {
    pub function_name: &'a str,
    pub function_version: &'a str,
    pub request_id: &'a str,
    pub memory_limit_in_mb: u32,
}

impl InvocationContext {
    /// Build a context for a fresh invocation with a random request id
    pub fn for_function(function: &FunctionConfig) -> Self {
        Self {
            request_id: uuid::Uuid::new_v4().to_string(),
            function_name: function.name.clone(),
            function_version: function.version.clone(),
            memory_limit_in_mb: function.memory_limit_mb,
        }
    }

    /// Fields the delegate is allowed to see
    pub fn for_delegate(&self) -> DelegateContext<'_> {
        DelegateContext {
            function_name: &self.function_name,
            function_version: &self.function_version,
            request_id: &self.request_id,
            memory_limit_in_mb: self.memory_limit_in_mb,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn function() -> FunctionConfig {
        FunctionConfig {
            name: "test-func".to_string(),
            version: "$LATEST".to_string(),
            memory_limit_mb: 256,
        }
    }

    #[test]
    fn test_request_ids_are_unique() {
        let a = InvocationContext::for_function(&function());
        let b = InvocationContext::for_function(&function());
        assert_ne!(a.request_id, b.request_id);
        assert_eq!(a.function_name, "test-func");
        assert_eq!(a.memory_limit_in_mb, 256);
    }

    #[test]
    fn test_delegate_context_shape() {
        let mut ctx = InvocationContext::for_function(&function());
        ctx.request_id = "req-123".to_string();
        let value = serde_json::to_value(ctx.for_delegate()).unwrap();
        assert_eq!(
            value,
            json!({
                "function_name": "test-func",
                "function_version": "$LATEST",
                "request_id": "req-123",
                "memory_limit_in_mb": 256
            })
        );
    }
}
