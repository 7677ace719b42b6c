use super::{suite_config, ApiWorld};
use cucumber::{given, when};
use request_capture::validate::{expect_status, require_field};
use request_capture::ApiRequest;
use scribe_core::{Result, ScribeError};
use serde_json::json;
use tracing::info;

const USERS: &str = "/usuarios";
const LOGIN: &str = "/auth/login";

impl ApiWorld {
    fn fixture_credentials(&self) -> Result<(String, String)> {
        let fixture = self
            .context
            .fixture()
            .ok_or_else(|| ScribeError::ValidationFailed {
                reason: "scenario has no fixture; tag it with @CT-<n>".to_string(),
            })?;
        Ok((fixture.email().to_string(), fixture.password().to_string()))
    }

    async fn login(&mut self, email: String, password: String) -> Result<()> {
        let request = ApiRequest::post(LOGIN).json(&json!({ "email": email, "senha": password }));
        let response = self.send(request).await?.clone();

        if let Some(token) = response.field("token") {
            let registry = &mut self.context.identities_mut().token;
            registry.token = Some(token);
            registry.user_id = response.field("user.id");
            info!(
                target: "automation",
                "Logged in as {}",
                suite_config().loggable(&email)
            );
        }
        Ok(())
    }

    fn user_id(&self) -> Result<String> {
        let identities = self.context.identities();
        identities
            .user
            .id
            .clone()
            .or_else(|| identities.token.user_id.clone())
            .ok_or_else(|| ScribeError::ValidationFailed {
                reason: "no user id stored for this scenario".to_string(),
            })
    }
}

#[given("a user registered from the fixture data")]
async fn given_registered_user(world: &mut ApiWorld) -> Result<()> {
    let registration = world
        .context
        .fixture()
        .and_then(|f| f.registration())
        .cloned()
        .ok_or_else(|| ScribeError::ValidationFailed {
            reason: "fixture row has no registration data".to_string(),
        })?;

    let request = ApiRequest::post(USERS).json(&json!({
        "nome": registration.full_name,
        "nomeUsuario": registration.user_name,
        "email": registration.email,
        "senha": registration.password,
    }));
    let response = world.send(request).await?.clone();
    expect_status(&mut world.context, &response, 201)?;
    let id = require_field(&mut world.context, &response, "id")?;

    let user = &mut world.context.identities_mut().user;
    user.id = Some(id);
    user.email = Some(registration.email);
    user.password = Some(registration.password);
    user.full_name = Some(registration.full_name);
    user.user_name = Some(registration.user_name);
    Ok(())
}

#[when("I log in with the fixture credentials")]
async fn when_login(world: &mut ApiWorld) -> Result<()> {
    let (email, password) = world.fixture_credentials()?;
    world.login(email, password).await
}

#[when("I log in with the registered user's credentials")]
async fn when_login_registered(world: &mut ApiWorld) -> Result<()> {
    let user = world.context.identities().user.clone();
    match (user.email, user.password) {
        (Some(email), Some(password)) => world.login(email, password).await,
        _ => Err(ScribeError::ValidationFailed {
            reason: "no registered user in this scenario".to_string(),
        }),
    }
}

#[when("I log in with an invalid password")]
async fn when_login_invalid(world: &mut ApiWorld) -> Result<()> {
    let (email, _) = world.fixture_credentials()?;
    world.login(email, "invalid-password".to_string()).await
}

#[when("I list users with authentication")]
async fn when_list_users(world: &mut ApiWorld) -> Result<()> {
    let token = world.token()?;
    world.send(ApiRequest::get(USERS).bearer(&token)).await?;
    Ok(())
}

#[when("I list users without authentication")]
async fn when_list_users_anonymous(world: &mut ApiWorld) -> Result<()> {
    world.send(ApiRequest::get(USERS)).await?;
    Ok(())
}

#[when("I fetch the user by id")]
async fn when_fetch_user(world: &mut ApiWorld) -> Result<()> {
    let token = world.token()?;
    let id = world.user_id()?;
    world
        .send(
            ApiRequest::get(format!("{USERS}/{{id}}"))
                .path_param("id", id)
                .bearer(&token),
        )
        .await?;
    Ok(())
}

#[when("I delete the user by id")]
async fn when_delete_user(world: &mut ApiWorld) -> Result<()> {
    let token = world.token()?;
    let id = world.user_id()?;
    world
        .send(
            ApiRequest::delete(format!("{USERS}/{{id}}"))
                .path_param("id", id)
                .bearer(&token),
        )
        .await?;
    world.context.identities_mut().user.remove();
    Ok(())
}
