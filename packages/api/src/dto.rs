//! Request and response bodies
//!
//! Conversions between wire shapes and core records are written out field by
//! field. Incoming bodies keep every field optional so that a missing field
//! is reported as a validation error rather than a parse failure.

use serde::{Deserialize, Serialize};
use unionall_core::models::{
    validate_node_name, Node, NodeId, NodeTopic, NodeType, Vector, VectorId, ValidationError,
};

/// Node as returned to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDto {
    pub node_id: NodeId,
    pub node_name: String,
    pub node_type: String,
    pub node_topic: String,
}

impl From<&Node> for NodeDto {
    fn from(node: &Node) -> Self {
        Self {
            node_id: node.id(),
            node_name: node.name().to_string(),
            node_type: node.node_type.to_string(),
            node_topic: node.topic.to_string(),
        }
    }
}

/// Editable node fields, used for create, full update and as the PATCH target
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NodeEdit {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_topic: Option<String>,
}

/// A [`NodeEdit`] whose fields all passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidNodeEdit {
    pub name: String,
    pub node_type: NodeType,
    pub topic: NodeTopic,
}

impl NodeEdit {
    /// Project the editable fields of a stored node
    pub fn from_node(node: &Node) -> Self {
        Self {
            node_name: Some(node.name().to_string()),
            node_type: Some(node.node_type.to_string()),
            node_topic: Some(node.topic.to_string()),
        }
    }

    /// Check every field, collecting all failures
    pub fn validate(&self) -> Result<ValidNodeEdit, Vec<ValidationError>> {
        let mut errors = Vec::new();

        let name = match &self.node_name {
            Some(name) => match validate_node_name(name) {
                Ok(()) => Some(name.clone()),
                Err(e) => {
                    errors.push(e);
                    None
                }
            },
            None => {
                errors.push(ValidationError::missing_field("nodeName"));
                None
            }
        };

        let node_type = parse_non_default(self.node_type.as_deref(), "nodeType", NodeType::Default)
            .map_err(|e| errors.push(e))
            .ok();
        let topic = parse_non_default(self.node_topic.as_deref(), "nodeTopic", NodeTopic::Default)
            .map_err(|e| errors.push(e))
            .ok();

        match (name, node_type, topic) {
            (Some(name), Some(node_type), Some(topic)) if errors.is_empty() => Ok(ValidNodeEdit {
                name,
                node_type,
                topic,
            }),
            _ => Err(errors),
        }
    }
}

fn parse_non_default<T>(value: Option<&str>, field: &str, default: T) -> Result<T, ValidationError>
where
    T: std::str::FromStr<Err = ValidationError> + PartialEq,
{
    let value = value.ok_or_else(|| ValidationError::missing_field(field))?;
    let parsed: T = value.parse()?;
    if parsed == default {
        return Err(ValidationError::default_not_allowed(field));
    }
    Ok(parsed)
}

impl ValidNodeEdit {
    pub fn into_node(self) -> Node {
        Node::new(self.name, self.node_type, self.topic)
    }

    /// Overwrite the editable fields of `node` and mark it as edited
    pub fn apply_to(self, node: &mut Node) {
        node.set_name(self.name);
        node.node_type = self.node_type;
        node.topic = self.topic;
        node.has_edits = true;
    }
}

/// Vector as returned to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VectorDto {
    pub vector_id: VectorId,
    pub vector_phrase: String,
    pub node_subject: NodeId,
    pub node_object: NodeId,
    pub node_parent: NodeId,
    pub node_root: NodeId,
}

impl From<&Vector> for VectorDto {
    fn from(vector: &Vector) -> Self {
        Self {
            vector_id: vector.id(),
            vector_phrase: vector.phrase.clone(),
            node_subject: vector.subject,
            node_object: vector.object,
            node_parent: vector.parent,
            node_root: vector.root,
        }
    }
}

/// Editable vector fields; the subject always comes from the request path
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct VectorEdit {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vector_phrase: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_object: Option<NodeId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_parent: Option<NodeId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_root: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidVectorEdit {
    pub phrase: String,
    pub object: NodeId,
    pub parent: NodeId,
    pub root: NodeId,
}

impl VectorEdit {
    pub fn from_vector(vector: &Vector) -> Self {
        Self {
            vector_phrase: Some(vector.phrase.clone()),
            node_object: Some(vector.object),
            node_parent: Some(vector.parent),
            node_root: Some(vector.root),
        }
    }

    pub fn validate(&self) -> Result<ValidVectorEdit, Vec<ValidationError>> {
        let mut errors = Vec::new();

        let phrase = match self.vector_phrase.as_deref().map(str::trim) {
            Some(phrase) if !phrase.is_empty() => Some(phrase.to_string()),
            _ => {
                errors.push(ValidationError::missing_field("vectorPhrase"));
                None
            }
        };

        let object = node_reference(self.node_object, "nodeObject")
            .map_err(|e| errors.push(e))
            .ok();
        let parent = node_reference(self.node_parent, "nodeParent")
            .map_err(|e| errors.push(e))
            .ok();
        let root = node_reference(self.node_root, "nodeRoot")
            .map_err(|e| errors.push(e))
            .ok();

        match (phrase, object, parent, root) {
            (Some(phrase), Some(object), Some(parent), Some(root)) if errors.is_empty() => {
                Ok(ValidVectorEdit {
                    phrase,
                    object,
                    parent,
                    root,
                })
            }
            _ => Err(errors),
        }
    }
}

fn node_reference(value: Option<NodeId>, field: &str) -> Result<NodeId, ValidationError> {
    match value {
        None => Err(ValidationError::missing_field(field)),
        Some(id) if id <= 0 => Err(ValidationError::invalid_reference(field, id)),
        Some(id) => Ok(id),
    }
}

impl ValidVectorEdit {
    pub fn into_vector(self, subject: NodeId) -> Vector {
        Vector::new(self.phrase, subject, self.object, self.parent, self.root)
    }

    pub fn apply_to(self, vector: &mut Vector, subject: NodeId) {
        vector.phrase = self.phrase;
        vector.subject = subject;
        vector.object = self.object;
        vector.parent = self.parent;
        vector.root = self.root;
        vector.has_edits = true;
    }
}

/// Validate a batch, prefixing each failure with its position in the body
pub fn validate_all<E, V>(
    items: &[E],
    validate: impl Fn(&E) -> Result<V, Vec<ValidationError>>,
) -> Result<Vec<V>, Vec<String>> {
    let mut valid = Vec::with_capacity(items.len());
    let mut failures = Vec::new();

    for (index, item) in items.iter().enumerate() {
        match validate(item) {
            Ok(v) => valid.push(v),
            Err(errors) => {
                failures.extend(errors.iter().map(|e| format!("[{}] {}", index, e)));
            }
        }
    }

    if failures.is_empty() {
        Ok(valid)
    } else {
        Err(failures)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn edit(name: &str, node_type: &str, topic: &str) -> NodeEdit {
        NodeEdit {
            node_name: Some(name.to_string()),
            node_type: Some(node_type.to_string()),
            node_topic: Some(topic.to_string()),
        }
    }

    #[test]
    fn test_node_dto_uses_enum_names() {
        let node = Node::new("France", NodeType::Name, NodeTopic::Country);
        let json = serde_json::to_value(NodeDto::from(&node)).unwrap();
        assert_eq!(
            json,
            json!({"nodeId": 0, "nodeName": "France", "nodeType": "Name", "nodeTopic": "Country"})
        );
    }

    #[test]
    fn test_valid_node_edit() {
        let valid = edit("France", "Name", "Country").validate().unwrap();
        let node = valid.into_node();
        assert_eq!(node.name(), "France");
        assert_eq!(node.topic, NodeTopic::Country);
    }

    #[test]
    fn test_node_edit_collects_every_error() {
        let errors = NodeEdit {
            node_name: Some("UK".to_string()),
            node_type: Some("Default".to_string()),
            node_topic: None,
        }
        .validate()
        .unwrap_err();

        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&ValidationError::default_not_allowed("nodeType")));
        assert!(errors.contains(&ValidationError::missing_field("nodeTopic")));
    }

    #[test]
    fn test_unknown_enum_name_is_rejected() {
        let errors = edit("France", "Name", "Planet").validate().unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::unknown_variant("nodeTopic", "Planet")]
        );
    }

    #[test]
    fn test_apply_to_marks_edits_and_rederives_match_name() {
        let mut node = Node::new("France", NodeType::Name, NodeTopic::Country);
        edit("Air-France!", "Name", "Commercial")
            .validate()
            .unwrap()
            .apply_to(&mut node);
        assert!(node.has_edits);
        assert_eq!(node.match_name(), "air-france");
        assert_eq!(node.topic, NodeTopic::Commercial);
    }

    #[test]
    fn test_node_edit_rejects_unknown_fields() {
        let parsed: Result<NodeEdit, _> =
            serde_json::from_value(json!({"nodeName": "France", "nodeId": 4}));
        assert!(parsed.is_err());
    }

    #[test]
    fn test_vector_edit_validation() {
        let valid = VectorEdit {
            vector_phrase: Some(" has capital ".to_string()),
            node_object: Some(2),
            node_parent: Some(1),
            node_root: Some(1),
        }
        .validate()
        .unwrap();
        assert_eq!(valid.phrase, "has capital");

        let errors = VectorEdit {
            vector_phrase: Some("   ".to_string()),
            node_object: Some(0),
            node_parent: None,
            node_root: Some(1),
        }
        .validate()
        .unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&ValidationError::invalid_reference("nodeObject", 0)));
    }

    #[test]
    fn test_vector_subject_comes_from_path() {
        let valid = VectorEdit {
            vector_phrase: Some("borders".to_string()),
            node_object: Some(3),
            node_parent: Some(1),
            node_root: Some(1),
        }
        .validate()
        .unwrap();
        let vector = valid.into_vector(7);
        assert_eq!(vector.subject, 7);
        assert_eq!(VectorDto::from(&vector).node_subject, 7);
    }

    #[test]
    fn test_validate_all_reports_positions() {
        let items = vec![edit("France", "Name", "Country"), edit("UK", "Name", "Country")];
        let failures = validate_all(&items, NodeEdit::validate).unwrap_err();
        assert_eq!(failures.len(), 1);
        assert!(failures[0].starts_with("[1] "));
    }
}
