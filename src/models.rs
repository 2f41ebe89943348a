use crate::errors::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stored trophy record. Serializes to the wire shape
/// `{id, name, description, imageUrl, createdAt}`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Trophy {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    /// Base64-encoded image payload.
    pub image_url: String,
    pub created_at: DateTime<Utc>,
}

/// Validated input for the record store; `id` and `created_at` are assigned
/// by the store on insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTrophy {
    pub name: String,
    pub description: String,
    pub image_url: String,
}

/// Incoming body for POST /api/trophies. All fields optional at the serde
/// level so presence checks stay in one place.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreateTrophyRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl CreateTrophyRequest {
    /// Presence check on the two required fields, after trimming.
    /// Description is optional and defaults to empty.
    pub fn validate(self) -> Result<NewTrophy, AppError> {
        let name = self.name.as_deref().map(str::trim).unwrap_or_default();
        let image_url = self.image_url.as_deref().map(str::trim).unwrap_or_default();

        if name.is_empty() || image_url.is_empty() {
            return Err(AppError::Validation(
                "Name and imageUrl are required".to_string(),
            ));
        }

        let description = self
            .description
            .as_deref()
            .map(str::trim)
            .unwrap_or_default();

        Ok(NewTrophy {
            name: name.to_string(),
            description: description.to_string(),
            image_url: image_url.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(
        name: Option<&str>,
        description: Option<&str>,
        image_url: Option<&str>,
    ) -> CreateTrophyRequest {
        CreateTrophyRequest {
            name: name.map(String::from),
            description: description.map(String::from),
            image_url: image_url.map(String::from),
        }
    }

    #[test]
    fn valid_request_passes_through_trimmed() {
        let new = request(Some("  Gold Cup "), Some(" First place "), Some("aGVsbG8="))
            .validate()
            .unwrap();
        assert_eq!(new.name, "Gold Cup");
        assert_eq!(new.description, "First place");
        assert_eq!(new.image_url, "aGVsbG8=");
    }

    #[test]
    fn missing_description_defaults_to_empty() {
        let new = request(Some("Cup"), None, Some("aGVsbG8="))
            .validate()
            .unwrap();
        assert_eq!(new.description, "");
    }

    #[test]
    fn missing_name_is_rejected() {
        let err = request(None, None, Some("aGVsbG8=")).validate().unwrap_err();
        assert!(err.to_string().contains("Name and imageUrl are required"));
    }

    #[test]
    fn whitespace_only_name_is_rejected() {
        assert!(request(Some("   "), None, Some("aGVsbG8=")).validate().is_err());
    }

    #[test]
    fn missing_or_blank_image_is_rejected() {
        assert!(request(Some("Cup"), None, None).validate().is_err());
        assert!(request(Some("Cup"), None, Some("")).validate().is_err());
        assert!(request(Some("Cup"), None, Some("  ")).validate().is_err());
    }
}
