//! Schema change notifications.
//!
//! A [`ScriptBuilder`](crate::builder::ScriptBuilder) can carry a
//! [`SignalBus`]; every create and delete primitive publishes a
//! [`SchemaSignal`] to the listeners connected to it.

use std::fmt;

/// Whether an element is being created or deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalEvent {
    /// The element is created.
    Create,
    /// The element is deleted.
    Delete,
}

impl SignalEvent {
    /// Returns `create` or `delete`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Delete => "delete",
        }
    }
}

/// A schema element being created or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SchemaSignal {
    /// Create or delete.
    pub event: SignalEvent,
    /// Element type: `vertex`, `edge`, `property_key` or `composite_index`.
    pub element: &'static str,
    /// Label, key or index name.
    pub name: String,
}

impl SchemaSignal {
    /// Creates a `create` signal.
    #[must_use]
    pub fn create(element: &'static str, name: impl Into<String>) -> Self {
        Self {
            event: SignalEvent::Create,
            element,
            name: name.into(),
        }
    }

    /// Creates a `delete` signal.
    #[must_use]
    pub fn delete(element: &'static str, name: impl Into<String>) -> Self {
        Self {
            event: SignalEvent::Delete,
            element,
            name: name.into(),
        }
    }

    /// Returns the topic, e.g. `migration.create_vertex.person`.
    #[must_use]
    pub fn topic(&self) -> String {
        format!("migration.{}_{}.{}", self.event.as_str(), self.element, self.name)
    }
}

type Listener = Box<dyn Fn(&SchemaSignal) + Send + Sync>;

/// Fan-out of schema signals to connected listeners.
#[derive(Default)]
pub struct SignalBus {
    listeners: Vec<Listener>,
}

impl SignalBus {
    /// Creates a bus with no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Connects a listener.
    pub fn connect<F>(&mut self, listener: F)
    where
        F: Fn(&SchemaSignal) + Send + Sync + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Delivers a signal to every listener, in connection order.
    pub fn send(&self, signal: &SchemaSignal) {
        for listener in &self.listeners {
            listener(signal);
        }
    }

    /// Returns the number of connected listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Returns true if no listener is connected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl fmt::Debug for SignalBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_topic() {
        let signal = SchemaSignal::create("vertex", "person");
        assert_eq!(signal.topic(), "migration.create_vertex.person");
        assert_eq!(
            SchemaSignal::delete("property_key", "person_name").topic(),
            "migration.delete_property_key.person_name"
        );
    }

    #[test]
    fn test_send_reaches_all_listeners() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut bus = SignalBus::new();
        for id in 0..2 {
            let seen = Arc::clone(&seen);
            bus.connect(move |signal| {
                seen.lock().unwrap().push((id, signal.name.clone()));
            });
        }
        assert_eq!(bus.len(), 2);

        bus.send(&SchemaSignal::create("edge", "knows"));
        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![(0, "knows".to_string()), (1, "knows".to_string())]
        );
    }
}
