//! Flat event record extracted from one item group of an event log

use std::fmt;

/// The fifteen leaf tags recognised inside an item group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventField {
    Node,
    Severity,
    DateTime,
    Id,
    MessageId,
    ComponentName,
    ComponentId,
    MessageText,
    Type,
    AssemblyName,
    ProcessName,
    ProcessId,
    ThreadName,
    AppDomain,
    ClusterId,
}

impl EventField {
    /// All fields in column order
    pub const ALL: [EventField; 15] = [
        EventField::Node,
        EventField::Severity,
        EventField::DateTime,
        EventField::Id,
        EventField::MessageId,
        EventField::ComponentName,
        EventField::ComponentId,
        EventField::MessageText,
        EventField::Type,
        EventField::AssemblyName,
        EventField::ProcessName,
        EventField::ProcessId,
        EventField::ThreadName,
        EventField::AppDomain,
        EventField::ClusterId,
    ];

    /// Tag name as it appears in the XML document
    pub fn tag(self) -> &'static str {
        match self {
            EventField::Node => "Node",
            EventField::Severity => "Severity",
            EventField::DateTime => "DateTime",
            EventField::Id => "Id",
            EventField::MessageId => "MessageId",
            EventField::ComponentName => "ComponentName",
            EventField::ComponentId => "ComponentId",
            EventField::MessageText => "MessageText",
            EventField::Type => "Type",
            EventField::AssemblyName => "AssemblyName",
            EventField::ProcessName => "ProcessName",
            EventField::ProcessId => "ProcessId",
            EventField::ThreadName => "ThreadName",
            EventField::AppDomain => "AppDomain",
            EventField::ClusterId => "ClusterId",
        }
    }

    /// Column name in the `event_logs` table
    pub fn column(self) -> &'static str {
        match self {
            EventField::Node => "node",
            EventField::Severity => "severity",
            EventField::DateTime => "datetime",
            EventField::Id => "id",
            EventField::MessageId => "message_id",
            EventField::ComponentName => "component_name",
            EventField::ComponentId => "component_id",
            EventField::MessageText => "message_text",
            EventField::Type => "type",
            EventField::AssemblyName => "assembly_name",
            EventField::ProcessName => "process_name",
            EventField::ProcessId => "process_id",
            EventField::ThreadName => "thread_name",
            EventField::AppDomain => "app_domain",
            EventField::ClusterId => "cluster_id",
        }
    }

    /// Look up a field by its exact (case-sensitive) tag name
    pub fn from_tag(tag: &[u8]) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.tag().as_bytes() == tag)
    }
}

impl fmt::Display for EventField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// One flattened log entry
///
/// Every field is optional: a group that omits a tag leaves that field `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventRecord {
    pub node: Option<String>,
    pub severity: Option<String>,
    pub datetime: Option<String>,
    pub id: Option<String>,
    pub message_id: Option<String>,
    pub component_name: Option<String>,
    pub component_id: Option<String>,
    pub message_text: Option<String>,
    pub r#type: Option<String>,
    pub assembly_name: Option<String>,
    pub process_name: Option<String>,
    pub process_id: Option<String>,
    pub thread_name: Option<String>,
    pub app_domain: Option<String>,
    pub cluster_id: Option<String>,
}

impl EventRecord {
    pub fn get(&self, field: EventField) -> Option<&str> {
        let slot = match field {
            EventField::Node => &self.node,
            EventField::Severity => &self.severity,
            EventField::DateTime => &self.datetime,
            EventField::Id => &self.id,
            EventField::MessageId => &self.message_id,
            EventField::ComponentName => &self.component_name,
            EventField::ComponentId => &self.component_id,
            EventField::MessageText => &self.message_text,
            EventField::Type => &self.r#type,
            EventField::AssemblyName => &self.assembly_name,
            EventField::ProcessName => &self.process_name,
            EventField::ProcessId => &self.process_id,
            EventField::ThreadName => &self.thread_name,
            EventField::AppDomain => &self.app_domain,
            EventField::ClusterId => &self.cluster_id,
        };
        slot.as_deref()
    }

    /// Set a field, replacing any earlier value from the same group
    pub fn set(&mut self, field: EventField, value: Option<String>) {
        let slot = match field {
            EventField::Node => &mut self.node,
            EventField::Severity => &mut self.severity,
            EventField::DateTime => &mut self.datetime,
            EventField::Id => &mut self.id,
            EventField::MessageId => &mut self.message_id,
            EventField::ComponentName => &mut self.component_name,
            EventField::ComponentId => &mut self.component_id,
            EventField::MessageText => &mut self.message_text,
            EventField::Type => &mut self.r#type,
            EventField::AssemblyName => &mut self.assembly_name,
            EventField::ProcessName => &mut self.process_name,
            EventField::ProcessId => &mut self.process_id,
            EventField::ThreadName => &mut self.thread_name,
            EventField::AppDomain => &mut self.app_domain,
            EventField::ClusterId => &mut self.cluster_id,
        };
        *slot = value;
    }

    /// Values in column order, ready for binding
    pub fn values(&self) -> [Option<&str>; 15] {
        EventField::ALL.map(|field| self.get(field))
    }
}
