//! In-memory user directory backing the demo service.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::errors::{Code, Error, FieldViolation};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewUser {
    pub name: String,
    pub email: String,
}

impl NewUser {
    fn violations(&self) -> Vec<FieldViolation> {
        let mut violations = Vec::new();
        if self.name.trim().is_empty() {
            violations.push(FieldViolation::new("name", "required"));
        }
        if !self.email.contains('@') {
            violations.push(FieldViolation::new("email", "must be an email address"));
        }
        violations
    }
}

#[derive(Debug, Default)]
pub struct UserDirectory {
    users: DashMap<String, User>,
    next_id: AtomicU64,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Result<User, Error> {
        self.users
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| Error::not_found("user", id).with_op("users.get"))
    }

    pub fn create(&self, new: NewUser) -> Result<User, Error> {
        const OP: &str = "users.create";

        let violations = new.violations();
        if !violations.is_empty() {
            return Err(Error::bad_request(violations).with_op(OP));
        }
        if self.users.iter().any(|entry| entry.email == new.email) {
            return Err(Error::wrap(OP, format!("email {} is taken", new.email)).with_code(Code::AlreadyExists));
        }

        let id = (self.next_id.fetch_add(1, Ordering::SeqCst) + 1).to_string();
        let user = User {
            id: id.clone(),
            name: new.name,
            email: new.email,
        };
        self.users.insert(id, user.clone());
        tracing::debug!(user_id = %user.id, "User created");
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{Base, DetailRecord};

    fn alice() -> NewUser {
        NewUser {
            name: "Alice".into(),
            email: "alice@example.com".into(),
        }
    }

    #[test]
    fn test_create_then_get() {
        let users = UserDirectory::new();
        let created = users.create(alice()).unwrap();
        assert_eq!(created.id, "1");
        assert_eq!(users.get("1").unwrap(), created);
    }

    #[test]
    fn test_missing_user_is_not_found() {
        let err = UserDirectory::new().get("42").unwrap_err();
        assert_eq!(err.code(), Code::NotFound);
        assert_eq!(err.base(), Some(Base::NotFound));
        assert_eq!(err.ops(), vec!["users.get"]);
    }

    #[test]
    fn test_invalid_input_lists_every_field() {
        let err = UserDirectory::new().create(NewUser::default()).unwrap_err();
        assert_eq!(err.code(), Code::InvalidArgument);
        match err.details().as_slice() {
            [DetailRecord::BadRequest(info)] => assert_eq!(info.field_violations.len(), 2),
            other => panic!("unexpected details {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_email() {
        let users = UserDirectory::new();
        users.create(alice()).unwrap();
        let err = users.create(alice()).unwrap_err();
        assert_eq!(err.code(), Code::AlreadyExists);
    }
}
