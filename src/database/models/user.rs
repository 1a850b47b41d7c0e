use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub type Metadata = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

/// Partial profile update; absent fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub metadata: Option<Metadata>,
}

impl UpdateUser {
    pub fn apply_to(self, user: &mut User) {
        if let Some(name) = self.name {
            user.name = name;
        }
        if let Some(email) = self.email {
            user.email = email;
        }
        if let Some(metadata) = self.metadata {
            user.metadata = Some(metadata);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub metadata: Option<Metadata>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serializes_camel_case_without_empty_metadata() {
        let user = User {
            id: "user_1".to_string(),
            email: "a@b.com".to_string(),
            name: "A".to_string(),
            created_at: Utc::now(),
            metadata: None,
        };
        let value = serde_json::to_value(&user).unwrap();
        assert!(value.get("createdAt").is_some());
        assert!(value.get("metadata").is_none());
    }

    #[test]
    fn test_partial_update_leaves_other_fields() {
        let mut user = User {
            id: "user_1".to_string(),
            email: "a@b.com".to_string(),
            name: "A".to_string(),
            created_at: Utc::now(),
            metadata: None,
        };
        let update: UpdateUser = serde_json::from_value(json!({ "name": "B" })).unwrap();
        update.apply_to(&mut user);
        assert_eq!(user.name, "B");
        assert_eq!(user.email, "a@b.com");
    }
}
