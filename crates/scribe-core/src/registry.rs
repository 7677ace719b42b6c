//! Scenario-scoped identifier registries
//!
//! Steps that create or log in store the identifiers the API returned here;
//! later steps of the same scenario read them back.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRegistry {
    pub token: Option<String>,
    pub user_id: Option<String>,
}

impl TokenRegistry {
    pub fn remove(&mut self) {
        *self = Self::default();
    }

    /// `Authorization` header value for the stored token.
    pub fn bearer(&self) -> Option<String> {
        self.token.as_ref().map(|t| format!("Bearer {t}"))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRegistry {
    pub email: Option<String>,
    pub password: Option<String>,
    pub id: Option<String>,
    pub full_name: Option<String>,
    pub user_name: Option<String>,
}

impl UserRegistry {
    pub fn remove(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRegistry {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
}

impl CategoryRegistry {
    pub fn remove(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRegistry {
    pub id: Option<String>,
    pub author_id: Option<String>,
    pub category_id: Option<String>,
    pub category_name: Option<String>,
    pub author_name: Option<String>,
}

impl ArticleRegistry {
    pub fn remove(&mut self) {
        *self = Self::default();
    }
}

/// All registries of one scenario.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRegistry {
    pub token: TokenRegistry,
    pub user: UserRegistry,
    pub category: CategoryRegistry,
    pub article: ArticleRegistry,
}

impl IdentityRegistry {
    pub fn remove_all(&mut self) {
        self.token.remove();
        self.user.remove();
        self.category.remove();
        self.article.remove();
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
