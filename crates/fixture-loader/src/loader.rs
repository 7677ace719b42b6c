//! Scenario fixture lookup

use crate::book::{FixtureRow, FixtureSource};
use crate::synthetic;
use scribe_core::{
    FixtureRecord, LoginFixture, RegistrationFixture, Result, ScenarioTag, ScribeError,
};
use tracing::{debug, instrument};

/// Cell value asking for a freshly generated value instead of a literal.
pub const RANDOM_SENTINEL: &str = "RANDOM";

/// Sheet and column names of the fixture workbook.
pub mod sheets {
    pub const SCENARIOS: &str = "TBL_CENARIOS";
    pub const SCENARIO_ID: &str = "ID_CENARIO";
    pub const MASS_ID: &str = "ID_MASSA";
    pub const EMAIL: &str = "EMAIL";
    pub const PASSWORD: &str = "SENHA";
    pub const USER_ID: &str = "ID";

    pub const REGISTRATION: &str = "TBL_CADASTRO";
    pub const FULL_NAME: &str = "NOME_COMPLETO";
    pub const USER_NAME: &str = "NOME_USUARIO";
    pub const REGISTRATION_USER_ID: &str = "ID_USUARIO";
}

pub struct DataFixtureLoader<S> {
    source: S,
}

impl<S: FixtureSource> DataFixtureLoader<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Resolves the scenario row for `tag`, then its registration row when
    /// the scenario row carries a mass id.
    ///
    /// A missing row on either lookup is `FixtureNotFound`.
    #[instrument(skip(self, tag), fields(tag = %tag))]
    pub fn load(&self, tag: &ScenarioTag) -> Result<FixtureRecord> {
        let row = self.lookup(sheets::SCENARIOS, sheets::SCENARIO_ID, tag.as_str())?;

        let login = LoginFixture {
            email: resolve(sheets::EMAIL, row.get(sheets::EMAIL)),
            password: resolve(sheets::PASSWORD, row.get(sheets::PASSWORD)),
            user_id: resolve(sheets::USER_ID, row.get(sheets::USER_ID)),
            mass_id: row.get(sheets::MASS_ID).to_string(),
        };

        let registration = match login.mass_id.as_str() {
            "" => None,
            mass_id => Some(self.load_registration(mass_id)?),
        };

        debug!(
            has_registration = registration.is_some(),
            "Fixture loaded"
        );
        Ok(FixtureRecord::new(tag.clone(), login, registration))
    }

    #[instrument(skip(self))]
    pub fn load_registration(&self, mass_id: &str) -> Result<RegistrationFixture> {
        let row = self.lookup(sheets::REGISTRATION, sheets::MASS_ID, mass_id)?;

        Ok(RegistrationFixture {
            mass_id: mass_id.to_string(),
            full_name: resolve(sheets::FULL_NAME, row.get(sheets::FULL_NAME)),
            user_name: resolve(sheets::USER_NAME, row.get(sheets::USER_NAME)),
            email: resolve(sheets::EMAIL, row.get(sheets::EMAIL)),
            password: resolve(sheets::PASSWORD, row.get(sheets::PASSWORD)),
            user_id: resolve(
                sheets::REGISTRATION_USER_ID,
                row.get(sheets::REGISTRATION_USER_ID),
            ),
        })
    }

    fn lookup(&self, sheet: &str, column: &str, value: &str) -> Result<FixtureRow> {
        self.source
            .sheet(sheet)?
            .find_row(column, value)?
            .ok_or_else(|| ScribeError::FixtureNotFound {
                sheet: sheet.to_string(),
                column: column.to_string(),
                value: value.to_string(),
            })
    }
}

/// Substitutes the `RANDOM` sentinel at read time. Only email and user id
/// columns are generated; any other column keeps the literal text.
fn resolve(column: &str, value: &str) -> String {
    if !value.eq_ignore_ascii_case(RANDOM_SENTINEL) {
        return value.to_string();
    }
    match column {
        sheets::EMAIL => synthetic::email(),
        sheets::USER_ID | sheets::REGISTRATION_USER_ID => synthetic::cpf(),
        _ => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::{FixtureBook, SheetTable};
    use crate::synthetic::is_valid_cpf;
    use pretty_assertions::assert_eq;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    fn book() -> FixtureBook {
        FixtureBook::from_tables([
            SheetTable::new(
                sheets::SCENARIOS,
                row(&["ID_CENARIO", "EMAIL", "SENHA", "ID", "ID_MASSA"]),
                vec![
                    row(&["CT-1001", "a@x.com", "Secret1", "u-1", ""]),
                    row(&["CT-1002", "RANDOM", "Secret2", "random", "M-1"]),
                    row(&["CT-1003", "c@x.com", "Secret3", "u-3", "M-404"]),
                    row(&["CT-1004", "d@x.com", "RANDOM", "u-4", "M-2"]),
                ],
            ),
            SheetTable::new(
                sheets::REGISTRATION,
                row(&["ID_MASSA", "NOME_COMPLETO", "NOME_USUARIO", "EMAIL", "SENHA", "ID_USUARIO"]),
                vec![
                    row(&["M-1", "Ana Souza", "ana", "RANDOM", "Pwd1", "77"]),
                    row(&["M-2", "RANDOM", "bia", "b@x.com", "RANDOM", "RANDOM"]),
                ],
            ),
        ])
    }

    fn tag(raw: &str) -> ScenarioTag {
        ScenarioTag::parse(raw).unwrap()
    }

    #[test]
    fn test_load_plain_row() {
        let loader = DataFixtureLoader::new(book());
        let record = loader.load(&tag("CT-1001")).unwrap();

        assert_eq!(record.email(), "a@x.com");
        assert_eq!(record.password(), "Secret1");
        assert_eq!(record.user_id(), "u-1");
        assert!(record.mass_id().is_none());
        assert!(record.registration().is_none());
    }

    #[test]
    fn test_load_is_idempotent() {
        let loader = DataFixtureLoader::new(book());
        assert_eq!(
            loader.load(&tag("CT-1001")).unwrap(),
            loader.load(&tag("CT-1001")).unwrap()
        );
    }

    #[test]
    fn test_random_sentinel_and_chained_registration() {
        let loader = DataFixtureLoader::new(book());
        let record = loader.load(&tag("CT-1002")).unwrap();

        assert!(record.email().starts_with("random_"));
        assert!(is_valid_cpf(record.user_id()));

        let registration = record.registration().unwrap();
        assert_eq!(registration.full_name, "Ana Souza");
        assert_eq!(registration.user_id, "77");
        assert!(registration.email.ends_with("@exemplo.com"));
    }

    #[test]
    fn test_random_kept_literal_outside_email_and_id_columns() {
        let loader = DataFixtureLoader::new(book());
        let record = loader.load(&tag("CT-1004")).unwrap();

        assert_eq!(record.email(), "d@x.com");
        assert_eq!(record.password(), "RANDOM");

        let registration = record.registration().unwrap();
        assert_eq!(registration.full_name, "RANDOM");
        assert_eq!(registration.password, "RANDOM");
        assert!(is_valid_cpf(&registration.user_id));
    }

    #[test]
    fn test_missing_rows_are_fatal() {
        let loader = DataFixtureLoader::new(book());

        let err = loader.load(&tag("CT-9")).unwrap_err();
        assert!(err.is_fatal_setup());
        assert!(err.to_string().contains("CT-9"));

        let err = loader.load(&tag("CT-1003")).unwrap_err();
        assert!(matches!(
            err,
            ScribeError::FixtureNotFound { ref sheet, ref value, .. }
                if sheet == sheets::REGISTRATION && value == "M-404"
        ));
    }
}
