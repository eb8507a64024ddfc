//! Wire types for the `/api/User` resource and the form drafts that produce them.

use serde::{Deserialize, Serialize};

/// A stored user as returned by the backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub age: i32,
}

/// Body of `POST /register`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterUser {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub age: i32,
}

/// Body of `PUT /update`. A `None` field is sent as `null` and leaves the stored value unchanged.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    pub id: i64,
    pub updated_name: Option<String>,
    pub updated_email: Option<String>,
    pub updated_phone: Option<String>,
    pub updated_age: Option<i32>,
}

/// Registration form input. Every field is kept as typed text until submit.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub age: String,
}

impl UserDraft {
    /// Build the register payload: an empty phone is sent as `null`, an empty age as `0`.
    pub fn to_payload(&self) -> RegisterUser {
        RegisterUser {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: non_empty(&self.phone),
            age: parse_age(&self.age).unwrap_or(0),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Edit-session input seeded from the selected [`User`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EditDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub age: String,
}

impl EditDraft {
    pub fn from_user(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone().unwrap_or_default(),
            age: user.age.to_string(),
        }
    }

    /// Build the update payload for `id`. Empty fields become `None` ("unchanged").
    pub fn to_payload(&self, id: i64) -> UpdateUser {
        UpdateUser {
            id,
            updated_name: non_empty(&self.name),
            updated_email: non_empty(&self.email),
            updated_phone: non_empty(&self.phone),
            updated_age: parse_age(&self.age),
        }
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() { None } else { Some(s.to_string()) }
}

fn parse_age(s: &str) -> Option<i32> {
    s.trim().parse::<i32>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_payload_maps_empty_phone_to_none_and_age_to_int() {
        let draft = UserDraft {
            name: "Ann".into(),
            email: "ann@x.com".into(),
            phone: String::new(),
            age: "30".into(),
        };
        let payload = draft.to_payload();
        assert_eq!(payload.phone, None);
        assert_eq!(payload.age, 30);

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"name": "Ann", "email": "ann@x.com", "phone": null, "age": 30})
        );
    }

    #[test]
    fn draft_payload_defaults_empty_age_to_zero() {
        let draft = UserDraft { name: "A".into(), email: "a@x.com".into(), ..Default::default() };
        assert_eq!(draft.to_payload().age, 0);
    }

    #[test]
    fn edit_payload_uses_camel_case_and_nulls_for_blank_fields() {
        let edit = EditDraft {
            name: String::new(),
            email: "b@x.com".into(),
            phone: String::new(),
            age: String::new(),
        };
        let json = serde_json::to_value(edit.to_payload(7)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 7,
                "updatedName": null,
                "updatedEmail": "b@x.com",
                "updatedPhone": null,
                "updatedAge": null
            })
        );
    }

    #[test]
    fn edit_draft_seeds_from_user() {
        let user = User { id: 3, name: "Bo".into(), email: "bo@x.com".into(), phone: None, age: 41 };
        let edit = EditDraft::from_user(&user);
        assert_eq!(edit.phone, "");
        assert_eq!(edit.age, "41");
    }

    #[test]
    fn user_tolerates_missing_phone() {
        let user: User =
            serde_json::from_str(r#"{"id":1,"name":"A","email":"a@x.com","age":20}"#).unwrap();
        assert_eq!(user.phone, None);
    }
}
