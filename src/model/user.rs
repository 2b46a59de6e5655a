use super::*;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub full_name: String,
    #[serde(default)]
    pub is_admin: bool,
}

/// Bearer token issued by the auth service, sent as `X-Auth-Token`.
#[derive(Clone, PartialEq, Eq, Deserialize, Serialize, new)]
#[serde(transparent)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AuthToken(***)")
    }
}

/// A signed-in learner: the token plus the user it was issued for.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, new)]
pub struct Session {
    pub token: AuthToken,
    pub user: User,
}

impl Session {
    pub fn is_admin(&self) -> bool {
        self.user.is_admin
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, new)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub full_name: String,
    #[new(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telegram_username: Option<String>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn token_is_not_logged() {
        let token = AuthToken::new("secret".to_string());
        assert_eq!(format!("{token:?}"), "AuthToken(***)");
        assert_eq!(token.as_str(), "secret");
    }

    #[test]
    fn decode_login_response() {
        let session: Session = serde_json::from_value(json!({
            "token": "abc",
            "user": {"id": 5, "email": "a@b.c", "full_name": "Anna", "is_admin": false}
        }))
        .unwrap();

        assert_eq!(session.user.id, UserId(5));
        assert!(!session.is_admin());
    }
}
