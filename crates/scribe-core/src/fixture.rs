//! Read-only projections of fixture workbook rows

use crate::tags::ScenarioTag;
use serde::{Deserialize, Serialize};

/// Credentials and identifiers from the scenario sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginFixture {
    pub email: String,
    pub password: String,
    pub user_id: String,
    /// Link to a fuller registration row, empty when absent.
    pub mass_id: String,
}

/// Registration data reached through a scenario's mass id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationFixture {
    pub mass_id: String,
    pub full_name: String,
    pub user_name: String,
    pub email: String,
    pub password: String,
    pub user_id: String,
}

/// Fixture data resolved for one scenario. Never mutated after loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureRecord {
    tag: ScenarioTag,
    login: LoginFixture,
    registration: Option<RegistrationFixture>,
}

impl FixtureRecord {
    pub fn new(
        tag: ScenarioTag,
        login: LoginFixture,
        registration: Option<RegistrationFixture>,
    ) -> Self {
        Self {
            tag,
            login,
            registration,
        }
    }

    pub fn tag(&self) -> &ScenarioTag {
        &self.tag
    }

    pub fn login(&self) -> &LoginFixture {
        &self.login
    }

    pub fn registration(&self) -> Option<&RegistrationFixture> {
        self.registration.as_ref()
    }

    pub fn email(&self) -> &str {
        &self.login.email
    }

    pub fn password(&self) -> &str {
        &self.login.password
    }

    pub fn user_id(&self) -> &str {
        &self.login.user_id
    }

    pub fn mass_id(&self) -> Option<&str> {
        Some(self.login.mass_id.as_str()).filter(|id| !id.is_empty())
    }
}
