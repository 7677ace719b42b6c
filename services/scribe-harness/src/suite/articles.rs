use super::ApiWorld;
use chrono::Local;
use cucumber::{given, when};
use request_capture::validate::{expect_status, require_field};
use request_capture::ApiRequest;
use scribe_core::{Result, ScribeError};
use serde_json::json;

const ARTICLES: &str = "/artigos";

impl ApiWorld {
    fn article_id(&self) -> Result<String> {
        self.context
            .identities()
            .article
            .id
            .clone()
            .ok_or_else(|| ScribeError::ValidationFailed {
                reason: "no article created in this scenario".to_string(),
            })
    }
}

#[given(expr = "an article titled {string} exists in a new category")]
async fn given_article(world: &mut ApiWorld, title: String) -> Result<()> {
    let category_name = format!("Category for {title}");
    let category_id = world
        .create_category(&category_name, "Articles created by the suite")
        .await?;
    let token = world.token()?;
    let author = world
        .context
        .identities()
        .user
        .full_name
        .clone()
        .unwrap_or_else(|| "Scribe".to_string());

    let request = ApiRequest::post(ARTICLES).bearer(&token).json(&json!({
        "titulo": title,
        "conteudo": format!("{title} body"),
        "nomeAutor": author,
        "nomeCategoria": category_name,
        "dataPublicacao": Local::now().format("%Y-%m-%d").to_string(),
    }));
    let response = world.send(request).await?.clone();
    expect_status(&mut world.context, &response, 201)?;
    let id = require_field(&mut world.context, &response, "id")?;

    let article = &mut world.context.identities_mut().article;
    article.id = Some(id);
    article.category_id = Some(category_id);
    article.category_name = Some(category_name);
    article.author_name = Some(author);
    Ok(())
}

#[when("I list articles with authentication")]
async fn when_list_articles(world: &mut ApiWorld) -> Result<()> {
    let token = world.token()?;
    world.send(ApiRequest::get(ARTICLES).bearer(&token)).await?;
    Ok(())
}

#[when("I fetch the article by id")]
async fn when_fetch_article(world: &mut ApiWorld) -> Result<()> {
    let token = world.token()?;
    let id = world.article_id()?;
    world
        .send(
            ApiRequest::get(format!("{ARTICLES}/{{id}}"))
                .path_param("id", id)
                .bearer(&token),
        )
        .await?;
    Ok(())
}

#[when("I delete the article by id")]
async fn when_delete_article(world: &mut ApiWorld) -> Result<()> {
    let token = world.token()?;
    let id = world.article_id()?;
    world
        .send(
            ApiRequest::delete(format!("{ARTICLES}/{{id}}"))
                .path_param("id", id)
                .bearer(&token),
        )
        .await?;
    world.context.identities_mut().article.remove();
    Ok(())
}
