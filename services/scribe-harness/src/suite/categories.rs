use super::ApiWorld;
use cucumber::{given, when};
use request_capture::validate::{expect_status, require_field};
use request_capture::ApiRequest;
use scribe_core::{Result, ScribeError};
use serde_json::json;

const CATEGORIES: &str = "/categorias";

impl ApiWorld {
    pub(super) async fn create_category(&mut self, name: &str, description: &str) -> Result<String> {
        let token = self.token()?;
        let request = ApiRequest::post(CATEGORIES)
            .bearer(&token)
            .json(&json!({ "nome": name, "descricao": description }));
        let response = self.send(request).await?.clone();
        expect_status(&mut self.context, &response, 201)?;
        let id = require_field(&mut self.context, &response, "id")?;

        let category = &mut self.context.identities_mut().category;
        category.id = Some(id.clone());
        category.name = response.field("nome").or_else(|| Some(name.to_string()));
        category.description = response
            .field("descricao")
            .or_else(|| Some(description.to_string()));
        Ok(id)
    }

    fn category_id(&self) -> Result<String> {
        self.context
            .identities()
            .category
            .id
            .clone()
            .ok_or_else(|| ScribeError::ValidationFailed {
                reason: "no category created in this scenario".to_string(),
            })
    }
}

#[given(expr = "a category named {string} exists")]
async fn given_category(world: &mut ApiWorld, name: String) -> Result<()> {
    world
        .create_category(&name, &format!("{name} created by the suite"))
        .await
        .map(|_| ())
}

#[when("I list categories with authentication")]
async fn when_list_categories(world: &mut ApiWorld) -> Result<()> {
    let token = world.token()?;
    world.send(ApiRequest::get(CATEGORIES).bearer(&token)).await?;
    Ok(())
}

#[when("I fetch the category by id")]
async fn when_fetch_category(world: &mut ApiWorld) -> Result<()> {
    let token = world.token()?;
    let id = world.category_id()?;
    world
        .send(
            ApiRequest::get(format!("{CATEGORIES}/{{id}}"))
                .path_param("id", id)
                .bearer(&token),
        )
        .await?;
    Ok(())
}

#[when(expr = "I rename the category to {string}")]
async fn when_rename_category(world: &mut ApiWorld, name: String) -> Result<()> {
    let token = world.token()?;
    let id = world.category_id()?;
    let description = world
        .context
        .identities()
        .category
        .description
        .clone()
        .unwrap_or_default();
    world
        .send(
            ApiRequest::put(format!("{CATEGORIES}/{{id}}"))
                .path_param("id", id)
                .bearer(&token)
                .json(&json!({ "nome": name, "descricao": description })),
        )
        .await?;
    world.context.identities_mut().category.name = Some(name);
    Ok(())
}

#[when("I delete the category by id")]
async fn when_delete_category(world: &mut ApiWorld) -> Result<()> {
    let token = world.token()?;
    let id = world.category_id()?;
    world
        .send(
            ApiRequest::delete(format!("{CATEGORIES}/{{id}}"))
                .path_param("id", id)
                .bearer(&token),
        )
        .await?;
    world.context.identities_mut().category.remove();
    Ok(())
}
