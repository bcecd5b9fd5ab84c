// Logging utilities for the Quill serializer stack
//
// Thin component-tagged wrapper over the `log` facade:
// - Component-based prefixes ("Resolver", "Registry.Redaction", ...)
// - A scope label (usually the serialization session or service name)
// - `*_args` variants that skip formatting when the level is disabled

use log::{debug, error, info, trace, warn};
use std::fmt::{self, Arguments, Display, Formatter};

/// Predefined components for logging categorization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Serializer,
    Resolver,
    Registry,
    Redaction,
    Custom(&'static str),
}

impl Component {
    /// Get the string representation of the component
    pub fn as_str(&self) -> &str {
        match self {
            Component::Serializer => "Serializer",
            Component::Resolver => "Resolver",
            Component::Registry => "Registry",
            Component::Redaction => "Redaction",
            Component::Custom(name) => name,
        }
    }
}

// Writes "Parent.Child" without allocating a prefix String
struct ComponentPrefixDisplay {
    parent: Option<Component>,
    component: Component,
}

impl Display for ComponentPrefixDisplay {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.parent {
            Some(parent) if parent != Component::Serializer => {
                write!(f, "{}.{}", parent.as_str(), self.component.as_str())
            }
            _ => write!(f, "{}", self.component.as_str()),
        }
    }
}

/// A component-specific logger carrying a scope label
#[derive(Debug, Clone)]
pub struct Logger {
    component: Component,
    scope: String,
    parent_component: Option<Component>,
}

impl Logger {
    /// Create a root logger for a component and scope label
    pub fn new_root(component: Component, scope: &str) -> Self {
        Self {
            component,
            scope: scope.to_string(),
            parent_component: None,
        }
    }

    /// Create a child logger with the same scope but a different component
    pub fn with_component(&self, component: Component) -> Self {
        Self {
            component,
            scope: self.scope.clone(),
            parent_component: Some(self.component),
        }
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn component(&self) -> Component {
        self.component
    }

    fn prefix(&self) -> ComponentPrefixDisplay {
        ComponentPrefixDisplay {
            parent: self.parent_component,
            component: self.component,
        }
    }

    /// Log a trace message using fmt::Arguments
    pub fn trace_args(&self, args: Arguments) {
        if log::log_enabled!(log::Level::Trace) {
            trace!("[{}][{}] {}", self.scope, self.prefix(), args);
        }
    }

    /// Log a debug message
    pub fn debug(&self, message: impl Into<String>) {
        if log::log_enabled!(log::Level::Debug) {
            debug!("[{}][{}] {}", self.scope, self.prefix(), message.into());
        }
    }

    /// Log a debug message using fmt::Arguments (avoids allocating message String)
    pub fn debug_args(&self, args: Arguments) {
        if log::log_enabled!(log::Level::Debug) {
            debug!("[{}][{}] {}", self.scope, self.prefix(), args);
        }
    }

    /// Log an info message
    pub fn info(&self, message: impl Into<String>) {
        if log::log_enabled!(log::Level::Info) {
            info!("[{}][{}] {}", self.scope, self.prefix(), message.into());
        }
    }

    /// Log a warning using fmt::Arguments
    pub fn warn_args(&self, args: Arguments) {
        if log::log_enabled!(log::Level::Warn) {
            warn!("[{}][{}] {}", self.scope, self.prefix(), args);
        }
    }

    /// Log an error using fmt::Arguments
    pub fn error_args(&self, args: Arguments) {
        if log::log_enabled!(log::Level::Error) {
            error!("[{}][{}] {}", self.scope, self.prefix(), args);
        }
    }
}
