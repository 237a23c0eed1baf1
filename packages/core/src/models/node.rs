//! Node Data Structures
//!
//! A `Node` is a typed, topic-tagged vertex of the UnionAll graph. Nodes are
//! connected to each other through [`Vector`](super::Vector) edges.
//!
//! # Examples
//!
//! ```rust
//! use unionall_core::models::{Node, NodeTopic, NodeType};
//!
//! let node = Node::new("Air-France!", NodeType::Name, NodeTopic::Commercial);
//! assert_eq!(node.id(), 0);
//! assert_eq!(node.match_name(), "air-france");
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use super::{EditTracked, RecordStatus, ValidationError};

/// Identifier assigned to a node by the store. `0` means "not yet assigned".
pub type NodeId = i64;

/// Minimum node name length accepted from clients
pub const NODE_NAME_MIN_LEN: usize = 3;

/// Maximum node name length accepted from clients
pub const NODE_NAME_MAX_LEN: usize = 256;

/// Characters kept when deriving a match name: word characters, `.`, `@` and `-`
const MATCH_NAME_PATTERN: &str = r"[^\w\.@-]";

/// The kind of value a node represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum NodeType {
    #[default]
    Default,
    Name,
    Description,
    Amount,
    Percentage,
    Date,
    Money,
    Measure,
    Definition,
}

impl NodeType {
    pub const ALL: [NodeType; 9] = [
        NodeType::Default,
        NodeType::Name,
        NodeType::Description,
        NodeType::Amount,
        NodeType::Percentage,
        NodeType::Date,
        NodeType::Money,
        NodeType::Measure,
        NodeType::Definition,
    ];

    /// Stored column value
    pub fn as_i64(self) -> i64 {
        match self {
            NodeType::Default => 0,
            NodeType::Name => 1,
            NodeType::Description => 2,
            NodeType::Amount => 3,
            NodeType::Percentage => 4,
            NodeType::Date => 5,
            NodeType::Money => 6,
            NodeType::Measure => 7,
            NodeType::Definition => 8,
        }
    }

    pub fn from_i64(value: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_i64() == value)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NodeType::Default => "Default",
            NodeType::Name => "Name",
            NodeType::Description => "Description",
            NodeType::Amount => "Amount",
            NodeType::Percentage => "Percentage",
            NodeType::Date => "Date",
            NodeType::Money => "Money",
            NodeType::Measure => "Measure",
            NodeType::Definition => "Definition",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ValidationError::unknown_variant("nodeType", s))
    }
}

/// The topical category a node belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum NodeTopic {
    #[default]
    Default,
    Continent,
    Region,
    Country,
    Institution,
    Organisation,
    Individual,
    Political,
    Financial,
    Economic,
    Industrial,
    Commercial,
    Research,
}

impl NodeTopic {
    pub const ALL: [NodeTopic; 13] = [
        NodeTopic::Default,
        NodeTopic::Continent,
        NodeTopic::Region,
        NodeTopic::Country,
        NodeTopic::Institution,
        NodeTopic::Organisation,
        NodeTopic::Individual,
        NodeTopic::Political,
        NodeTopic::Financial,
        NodeTopic::Economic,
        NodeTopic::Industrial,
        NodeTopic::Commercial,
        NodeTopic::Research,
    ];

    /// Stored column value
    pub fn as_i64(self) -> i64 {
        match self {
            NodeTopic::Default => 0,
            NodeTopic::Continent => 1,
            NodeTopic::Region => 2,
            NodeTopic::Country => 3,
            NodeTopic::Institution => 4,
            NodeTopic::Organisation => 5,
            NodeTopic::Individual => 6,
            NodeTopic::Political => 7,
            NodeTopic::Financial => 8,
            NodeTopic::Economic => 9,
            NodeTopic::Industrial => 10,
            NodeTopic::Commercial => 11,
            NodeTopic::Research => 12,
        }
    }

    pub fn from_i64(value: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_i64() == value)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NodeTopic::Default => "Default",
            NodeTopic::Continent => "Continent",
            NodeTopic::Region => "Region",
            NodeTopic::Country => "Country",
            NodeTopic::Institution => "Institution",
            NodeTopic::Organisation => "Organisation",
            NodeTopic::Individual => "Individual",
            NodeTopic::Political => "Political",
            NodeTopic::Financial => "Financial",
            NodeTopic::Economic => "Economic",
            NodeTopic::Industrial => "Industrial",
            NodeTopic::Commercial => "Commercial",
            NodeTopic::Research => "Research",
        }
    }
}

impl fmt::Display for NodeTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeTopic {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ValidationError::unknown_variant("nodeTopic", s))
    }
}

/// Derive the comparison form of a node name.
///
/// Strips everything except word characters, `.`, `@` and `-`, then lower-cases.
/// If the pattern cannot be compiled this falls back to the untransformed
/// name, lower-cased.
///
/// ```rust
/// # use unionall_core::models::derive_match_name;
/// assert_eq!(derive_match_name("Air-France!"), "air-france");
/// assert_eq!(derive_match_name("air-france"), "air-france");
/// ```
pub fn derive_match_name(name: &str) -> String {
    static MATCH_NAME_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    let regex = MATCH_NAME_REGEX.get_or_init(|| Regex::new(MATCH_NAME_PATTERN).ok());

    match regex {
        Some(regex) => regex.replace_all(name, "").to_lowercase(),
        None => {
            tracing::warn!("Match name pattern unavailable, using lower-cased name");
            name.to_lowercase()
        }
    }
}

/// Check a client supplied node name against the length bounds
pub fn validate_node_name(name: &str) -> Result<(), ValidationError> {
    let len = name.chars().count();
    if len < NODE_NAME_MIN_LEN {
        return Err(ValidationError::TooShort {
            field: "nodeName".to_string(),
            min: NODE_NAME_MIN_LEN,
        });
    }
    if len > NODE_NAME_MAX_LEN {
        return Err(ValidationError::TooLong {
            field: "nodeName".to_string(),
            max: NODE_NAME_MAX_LEN,
        });
    }
    Ok(())
}

/// A typed, topic-tagged vertex.
///
/// `id` is assigned by the store on insert and cannot be changed afterwards.
/// `match_name` always follows `name`; it is recomputed by [`Node::set_name`].
/// `has_edits` is never persisted: the caller sets it to mark an instance as
/// intentionally modified before handing it to an update or delete.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    id: NodeId,
    name: String,
    match_name: String,
    pub node_type: NodeType,
    pub topic: NodeTopic,
    pub status: RecordStatus,
    #[serde(skip)]
    pub has_edits: bool,
}

impl Node {
    /// Create an unsaved, active node
    pub fn new(name: impl Into<String>, node_type: NodeType, topic: NodeTopic) -> Self {
        let name = name.into();
        let match_name = derive_match_name(&name);
        Self {
            id: 0,
            name,
            match_name,
            node_type,
            topic,
            status: RecordStatus::Active,
            has_edits: false,
        }
    }

    /// Rebuild a node from stored column values
    pub(crate) fn from_store(
        id: NodeId,
        name: String,
        match_name: String,
        node_type: NodeType,
        topic: NodeTopic,
        status: RecordStatus,
    ) -> Self {
        Self {
            id,
            name,
            match_name,
            node_type,
            topic,
            status,
            has_edits: false,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn match_name(&self) -> &str {
        &self.match_name
    }

    /// Replace the name and re-derive the match name
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.match_name = derive_match_name(&self.name);
    }

    /// Flip the node to `Deleted` and mark it as edited
    pub fn mark_deleted(&mut self) {
        self.status = RecordStatus::Deleted;
        self.has_edits = true;
    }

    pub fn is_active(&self) -> bool {
        self.status == RecordStatus::Active
    }

    pub(crate) fn assign_id(&mut self, id: NodeId) {
        if self.id == 0 {
            self.id = id;
        }
    }
}

impl EditTracked for Node {
    fn key(&self) -> i64 {
        self.id
    }

    fn has_edits(&self) -> bool {
        self.has_edits
    }

    fn status(&self) -> RecordStatus {
        self.status
    }
}

/// An (id, name) projection used by the name-pair listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeNamePair {
    pub node_id: NodeId,
    pub node_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_name_strips_and_lowercases() {
        let node = Node::new("Air-France!", NodeType::Name, NodeTopic::Commercial);
        assert_eq!(node.match_name(), "air-france");
    }

    #[test]
    fn test_match_name_is_idempotent() {
        let once = derive_match_name("Gross Domestic Product (2018) @ ONS.gov");
        assert_eq!(once, "grossdomesticproduct2018@ons.gov");
        assert_eq!(derive_match_name(&once), once);
    }

    #[test]
    fn test_match_name_keeps_unicode_word_characters() {
        assert_eq!(derive_match_name("Côte d'Ivoire"), "côtedivoire");
    }

    #[test]
    fn test_set_name_rederives_match_name() {
        let mut node = Node::new("France", NodeType::Name, NodeTopic::Country);
        node.set_name("République Française");
        assert_eq!(node.name(), "République Française");
        assert_eq!(node.match_name(), "républiquefrançaise");
    }

    #[test]
    fn test_new_node_is_active_and_unsaved() {
        let node = Node::new("France", NodeType::Name, NodeTopic::Country);
        assert_eq!(node.id(), 0);
        assert!(node.is_active());
        assert!(!node.has_edits);
    }

    #[test]
    fn test_assign_id_only_once() {
        let mut node = Node::new("France", NodeType::Name, NodeTopic::Country);
        node.assign_id(7);
        node.assign_id(9);
        assert_eq!(node.id(), 7);
    }

    #[test]
    fn test_mark_deleted() {
        let mut node = Node::new("France", NodeType::Name, NodeTopic::Country);
        node.mark_deleted();
        assert_eq!(node.status, RecordStatus::Deleted);
        assert!(node.has_edits);
    }

    #[test]
    fn test_enum_codes_round_trip_through_store_values() {
        assert_eq!(NodeType::from_i64(7), Some(NodeType::Measure));
        assert_eq!(NodeTopic::from_i64(12), Some(NodeTopic::Research));
        assert_eq!(NodeTopic::from_i64(13), None);
        assert_eq!(NodeType::Definition.as_i64(), 8);
    }

    #[test]
    fn test_enum_parse_by_name() {
        assert_eq!("Country".parse::<NodeTopic>().unwrap(), NodeTopic::Country);
        assert!("country".parse::<NodeTopic>().is_err());
        assert!("Planet".parse::<NodeType>().is_err());
    }

    #[test]
    fn test_validate_node_name_bounds() {
        assert!(validate_node_name("UK").is_err());
        assert!(validate_node_name("USA").is_ok());
        assert!(validate_node_name(&"x".repeat(256)).is_ok());
        assert!(validate_node_name(&"x".repeat(257)).is_err());
    }

    #[test]
    fn test_serialized_shape_hides_edit_flag() {
        let node = Node::new("France", NodeType::Name, NodeTopic::Country);
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["name"], "France");
        assert_eq!(json["nodeType"], "Name");
        assert_eq!(json["topic"], "Country");
        assert_eq!(json["status"], "Active");
        assert!(json.get("hasEdits").is_none());
    }
}
