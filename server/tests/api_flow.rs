mod common;

use axum::http::{header, Method, StatusCode};
use common::{test_app, unique, PNG_DATA_URI, SITE_URL};
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use foodgram_server::models::NewUser;
use foodgram_server::schema::users;
use serde_json::json;

#[tokio::test]
async fn recipe_round_trip_preserves_tags_and_ingredients() {
    let Some(app) = test_app() else { return };
    let (author_id, token) = app.signup("chef").await;

    let (breakfast, _) = app.tag("b");
    let (lunch, _) = app.tag("l");
    let eggs = app.ingredient(&unique("eggs"), "pcs");
    let milk = app.ingredient(&unique("milk"), "ml");
    let salt = app.ingredient(&unique("salt"), "g");

    let id = app
        .recipe(
            &token,
            "Omelette",
            &[breakfast, lunch],
            &[(eggs, 3), (milk, 100), (salt, 2)],
        )
        .await;

    let response = app.get(&format!("/api/recipes/{}/", id), None).await;
    assert_eq!(response.status, StatusCode::OK);
    let recipe = response.json();

    assert_eq!(recipe["name"], "Omelette");
    assert_eq!(recipe["cooking_time"], 10);
    assert_eq!(recipe["author"]["id"], author_id);
    assert_eq!(recipe["is_favorited"], false);
    assert_eq!(recipe["is_in_shopping_cart"], false);

    let mut tag_ids: Vec<i64> = recipe["tags"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_i64().unwrap())
        .collect();
    tag_ids.sort();
    let mut expected = vec![i64::from(breakfast), i64::from(lunch)];
    expected.sort();
    assert_eq!(tag_ids, expected);

    let ingredients = recipe["ingredients"].as_array().unwrap();
    assert_eq!(ingredients.len(), 3);
    let milk_row = ingredients
        .iter()
        .find(|i| i["id"] == milk)
        .expect("milk listed");
    assert_eq!(milk_row["amount"], 100);
    assert_eq!(milk_row["measurement_unit"], "ml");

    let image_url = recipe["image"].as_str().unwrap();
    let image_path = image_url
        .strip_prefix(SITE_URL)
        .expect("absolute media URL");
    let image = app.get(image_path, None).await;
    assert_eq!(image.status, StatusCode::OK);
    assert_eq!(image.header(header::CONTENT_TYPE), "image/png");
}

#[tokio::test]
async fn recipe_update_replaces_associations_and_requires_author() {
    let Some(app) = test_app() else { return };
    let (_, token) = app.signup("owner").await;
    let (_, stranger) = app.signup("stranger").await;

    let (first_tag, _) = app.tag("f");
    let (second_tag, _) = app.tag("s");
    let flour = app.ingredient(&unique("flour"), "g");
    let sugar = app.ingredient(&unique("sugar"), "g");

    let id = app.recipe(&token, "Cake", &[first_tag], &[(flour, 200)]).await;
    let uri = format!("/api/recipes/{}/", id);

    let update = json!({
        "ingredients": [{"id": sugar, "amount": 50}],
        "tags": [second_tag],
        "name": "Sweet cake",
        "text": "Bake.",
        "cooking_time": 45,
    });

    let forbidden = app
        .request(Method::PATCH, &uri, Some(&stranger), Some(update.clone()))
        .await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);

    let updated = app
        .request(Method::PATCH, &uri, Some(&token), Some(update))
        .await;
    assert_eq!(updated.status, StatusCode::OK, "{}", updated.text());
    let recipe = updated.json();
    assert_eq!(recipe["name"], "Sweet cake");
    assert_eq!(recipe["tags"].as_array().unwrap().len(), 1);
    assert_eq!(recipe["tags"][0]["id"], second_tag);
    assert_eq!(recipe["ingredients"].as_array().unwrap().len(), 1);
    assert_eq!(recipe["ingredients"][0]["id"], sugar);

    let missing_tags = app
        .request(
            Method::PATCH,
            &uri,
            Some(&token),
            Some(json!({
                "ingredients": [{"id": sugar, "amount": 50}],
                "name": "Sweet cake",
                "text": "Bake.",
                "cooking_time": 45,
            })),
        )
        .await;
    assert_eq!(missing_tags.status, StatusCode::BAD_REQUEST);
    assert_eq!(missing_tags.json()["field"], "tags");

    assert_eq!(
        app.delete(&uri, Some(&stranger)).await.status,
        StatusCode::FORBIDDEN
    );
    assert_eq!(
        app.delete(&uri, Some(&token)).await.status,
        StatusCode::NO_CONTENT
    );
    assert_eq!(app.get(&uri, None).await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_recipe_writes_are_rejected() {
    let Some(app) = test_app() else { return };
    let (_, token) = app.signup("strict").await;
    let (tag, _) = app.tag("t");
    let rice = app.ingredient(&unique("rice"), "g");

    let base = json!({
        "ingredients": [{"id": rice, "amount": 1}],
        "tags": [tag],
        "image": PNG_DATA_URI,
        "name": "Rice",
        "text": "Boil.",
        "cooking_time": 0,
    });
    let response = app.post("/api/recipes/", Some(&token), Some(base)).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["field"], "cooking_time");

    let duplicate = json!({
        "ingredients": [{"id": rice, "amount": 1}, {"id": rice, "amount": 2}],
        "tags": [tag],
        "image": PNG_DATA_URI,
        "name": "Rice",
        "text": "Boil.",
        "cooking_time": 5,
    });
    let response = app
        .post("/api/recipes/", Some(&token), Some(duplicate))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["field"], "ingredients");

    let unknown_tag = json!({
        "ingredients": [{"id": rice, "amount": 1}],
        "tags": [i32::MAX],
        "image": PNG_DATA_URI,
        "name": "Rice",
        "text": "Boil.",
        "cooking_time": 5,
    });
    let response = app
        .post("/api/recipes/", Some(&token), Some(unknown_tag))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["field"], "tags");

    let unknown_ingredient = json!({
        "ingredients": [{"id": i32::MAX, "amount": 1}],
        "tags": [tag],
        "image": PNG_DATA_URI,
        "name": "Rice",
        "text": "Boil.",
        "cooking_time": 5,
    });
    let response = app
        .post("/api/recipes/", Some(&token), Some(unknown_ingredient))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["field"], "ingredients");

    let anonymous = app.post("/api/recipes/", None, Some(json!({}))).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn favorite_and_cart_toggles() {
    let Some(app) = test_app() else { return };
    let (_, author) = app.signup("author").await;
    let (_, fan) = app.signup("fan").await;
    let (tag, _) = app.tag("x");
    let oats = app.ingredient(&unique("oats"), "g");
    let id = app.recipe(&author, "Porridge", &[tag], &[(oats, 50)]).await;

    for action in ["favorite", "shopping_cart"] {
        let uri = format!("/api/recipes/{}/{}/", id, action);

        let added = app.post(&uri, Some(&fan), None).await;
        assert_eq!(added.status, StatusCode::CREATED, "{action}");
        let short = added.json();
        assert_eq!(short["id"], id);
        assert_eq!(short["name"], "Porridge");
        assert_eq!(short["cooking_time"], 10);

        let again = app.post(&uri, Some(&fan), None).await;
        assert_eq!(again.status, StatusCode::BAD_REQUEST, "{action}");

        let removed = app.delete(&uri, Some(&fan)).await;
        assert_eq!(removed.status, StatusCode::NO_CONTENT, "{action}");

        let absent = app.delete(&uri, Some(&fan)).await;
        assert_eq!(absent.status, StatusCode::BAD_REQUEST, "{action}");

        let missing = app
            .post(&format!("/api/recipes/{}/{}/", i32::MAX, action), Some(&fan), None)
            .await;
        assert_eq!(missing.status, StatusCode::NOT_FOUND, "{action}");
    }

    app.post(&format!("/api/recipes/{}/favorite/", id), Some(&fan), None)
        .await;
    let seen = app.get(&format!("/api/recipes/{}/", id), Some(&fan)).await;
    assert_eq!(seen.json()["is_favorited"], true);
    let anonymous = app.get(&format!("/api/recipes/{}/", id), None).await;
    assert_eq!(anonymous.json()["is_favorited"], false);
}

#[tokio::test]
async fn subscription_rules() {
    let Some(app) = test_app() else { return };
    let (author_id, author) = app.signup("writer").await;
    let (reader_id, reader) = app.signup("reader").await;
    let (tag, _) = app.tag("y");
    let beans = app.ingredient(&unique("beans"), "g");
    for name in ["Soup", "Stew", "Chili"] {
        app.recipe(&author, name, &[tag], &[(beans, 100)]).await;
    }

    let own = app
        .post(&format!("/api/users/{}/subscribe/", reader_id), Some(&reader), None)
        .await;
    assert_eq!(own.status, StatusCode::BAD_REQUEST);

    let uri = format!("/api/users/{}/subscribe/?recipes_limit=2", author_id);
    let first = app.post(&uri, Some(&reader), None).await;
    assert_eq!(first.status, StatusCode::CREATED, "{}", first.text());
    let entry = first.json();
    assert_eq!(entry["id"], author_id);
    assert_eq!(entry["is_subscribed"], true);
    assert_eq!(entry["recipes_count"], 3);
    assert_eq!(entry["recipes"].as_array().unwrap().len(), 2);

    let again = app.post(&uri, Some(&reader), None).await;
    assert_eq!(again.status, StatusCode::BAD_REQUEST);

    let list = app
        .get("/api/users/subscriptions/?recipes_limit=1", Some(&reader))
        .await;
    assert_eq!(list.status, StatusCode::OK);
    let page = list.json();
    assert_eq!(page["count"], 1);
    assert_eq!(page["results"][0]["recipes"].as_array().unwrap().len(), 1);
    assert_eq!(page["results"][0]["recipes"][0]["name"], "Chili");
    assert_eq!(page["results"][0]["recipes_count"], 3);

    let none = app
        .get("/api/users/subscriptions/?recipes_limit=0", Some(&reader))
        .await;
    let entry = &none.json()["results"][0];
    assert_eq!(entry["recipes"].as_array().unwrap().len(), 0);
    assert_eq!(entry["recipes_count"], 3);

    let profile = app
        .get(&format!("/api/users/{}/", author_id), Some(&reader))
        .await;
    assert_eq!(profile.json()["is_subscribed"], true);

    let plain = format!("/api/users/{}/subscribe/", author_id);
    assert_eq!(
        app.delete(&plain, Some(&reader)).await.status,
        StatusCode::NO_CONTENT
    );
    assert_eq!(
        app.delete(&plain, Some(&reader)).await.status,
        StatusCode::BAD_REQUEST
    );

    let missing = app
        .post(&format!("/api/users/{}/subscribe/", i32::MAX), Some(&reader), None)
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn shopping_list_sums_shared_ingredients() {
    let Some(app) = test_app() else { return };
    let (_, token) = app.signup("shopper").await;
    let (tag, _) = app.tag("z");
    let salt_name = unique("Salt");
    let salt = app.ingredient(&salt_name, "g");
    let water = app.ingredient(&unique("Water"), "ml");

    let soup = app
        .recipe(&token, "Soup", &[tag], &[(salt, 10), (water, 500)])
        .await;
    let bread = app.recipe(&token, "Bread", &[tag], &[(salt, 5)]).await;

    for id in [soup, bread] {
        let added = app
            .post(&format!("/api/recipes/{}/shopping_cart/", id), Some(&token), None)
            .await;
        assert_eq!(added.status, StatusCode::CREATED);
    }

    let download = app
        .get("/api/recipes/download_shopping_cart/", Some(&token))
        .await;
    assert_eq!(download.status, StatusCode::OK);
    assert!(download
        .header(header::CONTENT_DISPOSITION)
        .contains("shopping_list.txt"));

    let text = download.text();
    assert!(text.contains(&format!("{} (g) - 15", salt_name)), "{text}");
    assert!(text.contains("(ml) - 500"), "{text}");
}

#[tokio::test]
async fn recipe_list_filters_and_paginates() {
    let Some(app) = test_app() else { return };
    let (author_id, token) = app.signup("lister").await;
    let (_, viewer) = app.signup("viewer").await;
    let (soups, soup_slug) = app.tag("soup");
    let (mains, _) = app.tag("main");
    let potato = app.ingredient(&unique("potato"), "pcs");

    let mut soup_ids = Vec::new();
    for name in ["Borscht", "Shchi", "Solyanka"] {
        soup_ids.push(app.recipe(&token, name, &[soups], &[(potato, 2)]).await);
    }
    app.recipe(&token, "Cutlets", &[mains], &[(potato, 1)]).await;

    let uri = format!("/api/recipes/?author={}&limit=2", author_id);
    let page = app.get(&uri, None).await.json();
    assert_eq!(page["count"], 4);
    assert_eq!(page["results"].as_array().unwrap().len(), 2);
    assert!(page["previous"].is_null());
    assert_eq!(
        page["next"],
        format!("{}/api/recipes/?author={}&limit=2&page=2", SITE_URL, author_id)
    );

    let past_end = app
        .get(&format!("/api/recipes/?author={}&limit=2&page=5", author_id), None)
        .await;
    assert_eq!(past_end.status, StatusCode::NOT_FOUND);

    let by_tag = app
        .get(&format!("/api/recipes/?author={}&tags={}", author_id, soup_slug), None)
        .await
        .json();
    assert_eq!(by_tag["count"], 3);
    // Newest first
    assert_eq!(by_tag["results"][0]["id"], soup_ids[2]);

    app.post(
        &format!("/api/recipes/{}/favorite/", soup_ids[0]),
        Some(&viewer),
        None,
    )
    .await;
    let favorites = app
        .get("/api/recipes/?is_favorited=1", Some(&viewer))
        .await
        .json();
    assert_eq!(favorites["count"], 1);
    assert_eq!(favorites["results"][0]["id"], soup_ids[0]);
}

#[tokio::test]
async fn short_link_redirects_to_recipe() {
    let Some(app) = test_app() else { return };
    let (_, token) = app.signup("linker").await;
    let (tag, _) = app.tag("w");
    let tea = app.ingredient(&unique("tea"), "g");
    let id = app.recipe(&token, "Tea", &[tag], &[(tea, 3)]).await;

    let link = app
        .get(&format!("/api/recipes/{}/get-link/", id), None)
        .await;
    assert_eq!(link.status, StatusCode::OK);
    let url = link.json()["short-link"].as_str().unwrap().to_string();
    let path = url.strip_prefix(SITE_URL).expect("absolute short link");
    assert!(path.starts_with("/s/"));

    let redirect = app.get(path, None).await;
    assert_eq!(redirect.status, StatusCode::FOUND);
    assert_eq!(
        redirect.header(header::LOCATION),
        format!("/recipes/{}", id)
    );

    assert_eq!(app.get("/s/zzzzzz", None).await.status, StatusCode::NOT_FOUND);
    assert_eq!(app.get("/s/NOPE", None).await.status, StatusCode::NOT_FOUND);
    assert_eq!(app.get("/s/+1", None).await.status, StatusCode::NOT_FOUND);
    let signed = format!("/s/+{}", path.trim_start_matches("/s/"));
    assert_eq!(app.get(&signed, None).await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn login_logout_and_password_change() {
    let Some(app) = test_app() else { return };
    let (user_id, token) = app.signup("session").await;

    let me = app.get("/api/users/me/", Some(&token)).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.json()["id"], user_id);
    assert!(me.json()["avatar"].is_null());

    let email = me.json()["email"].as_str().unwrap().to_string();
    let wrong = app
        .post(
            "/api/auth/token/login/",
            None,
            Some(json!({"email": email, "password": "nope"})),
        )
        .await;
    assert_eq!(wrong.status, StatusCode::BAD_REQUEST);

    let bad_current = app
        .post(
            "/api/users/set_password/",
            Some(&token),
            Some(json!({"current_password": "nope", "new_password": "fresh-pass"})),
        )
        .await;
    assert_eq!(bad_current.status, StatusCode::BAD_REQUEST);

    let changed = app
        .post(
            "/api/users/set_password/",
            Some(&token),
            Some(json!({"current_password": "s3cret-pass", "new_password": "fresh-pass"})),
        )
        .await;
    assert_eq!(changed.status, StatusCode::NO_CONTENT);

    let avatar = app
        .request(
            Method::PUT,
            "/api/users/me/avatar/",
            Some(&token),
            Some(json!({"avatar": PNG_DATA_URI})),
        )
        .await;
    assert_eq!(avatar.status, StatusCode::OK, "{}", avatar.text());
    assert!(avatar.json()["avatar"]
        .as_str()
        .unwrap()
        .starts_with(&format!("{}/media/", SITE_URL)));

    let logout = app.post("/api/auth/token/logout/", Some(&token), None).await;
    assert_eq!(logout.status, StatusCode::NO_CONTENT);

    let after = app.get("/api/users/me/", Some(&token)).await;
    assert_eq!(after.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn duplicate_registration_is_rejected() {
    let Some(app) = test_app() else { return };
    let username = unique("dup");
    let body = json!({
        "email": format!("{}@example.com", username),
        "username": username,
        "first_name": "A",
        "last_name": "B",
        "password": "pw-123456",
    });

    let first = app.post("/api/users/", None, Some(body.clone())).await;
    assert_eq!(first.status, StatusCode::CREATED);

    let second = app.post("/api/users/", None, Some(body)).await;
    assert_eq!(second.status, StatusCode::BAD_REQUEST);
    assert_eq!(second.json()["field"], "email");

    let shouted = app
        .post(
            "/api/users/",
            None,
            Some(json!({
                "email": format!("{}@EXAMPLE.com", username.to_uppercase()),
                "username": unique("dup"),
                "first_name": "A",
                "last_name": "B",
                "password": "pw-123456",
            })),
        )
        .await;
    assert_eq!(shouted.status, StatusCode::BAD_REQUEST);
    assert_eq!(shouted.json()["field"], "email");

    // The database enforces the same rule for writes that skip the API check.
    let mut conn = app.pool.get().expect("connection");
    let direct = diesel::insert_into(users::table)
        .values(NewUser {
            email: &format!("{}@Example.COM", username),
            username: &unique("dup"),
            first_name: "A",
            last_name: "B",
            password_hash: "x",
        })
        .execute(&mut conn);
    assert!(matches!(
        direct,
        Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _))
    ));

    let reserved = app
        .post(
            "/api/users/",
            None,
            Some(json!({
                "email": format!("{}@example.org", unique("me")),
                "username": "me",
                "first_name": "A",
                "last_name": "B",
                "password": "pw-123456",
            })),
        )
        .await;
    assert_eq!(reserved.status, StatusCode::BAD_REQUEST);
    assert_eq!(reserved.json()["field"], "username");
}

#[tokio::test]
async fn malformed_path_and_query_values_get_json_errors() {
    let Some(app) = test_app() else { return };
    let (_, token) = app.signup("typo").await;

    for uri in [
        "/api/recipes/abc/",
        "/api/users/abc/",
        "/api/tags/abc/",
        "/api/ingredients/abc/",
        "/api/recipes/99999999999/",
    ] {
        let response = app.get(uri, Some(&token)).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND, "{uri}");
        let content_type = response.header(header::CONTENT_TYPE);
        assert!(content_type.starts_with("application/json"), "{uri}");
        assert_eq!(response.json()["error"], "Not found.", "{uri}");
    }

    for uri in [
        "/api/recipes/?page=x",
        "/api/recipes/?author=me",
        "/api/users/?limit=many",
        "/api/users/subscriptions/?recipes_limit=-1",
        "/api/users/subscriptions/?page=x",
    ] {
        let response = app.get(uri, Some(&token)).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{uri}");
        let content_type = response.header(header::CONTENT_TYPE);
        assert!(content_type.starts_with("application/json"), "{uri}");
        assert!(response.json()["error"].is_string(), "{uri}");
    }
}

#[tokio::test]
async fn catalog_endpoints_are_public() {
    let Some(app) = test_app() else { return };
    let prefix = unique("Zucchini");
    let id = app.ingredient(&format!("{}-raw", prefix), "g");

    let found = app
        .get(
            &format!("/api/ingredients/?name={}", prefix.to_lowercase()),
            None,
        )
        .await;
    assert_eq!(found.status, StatusCode::OK);
    let list = found.json();
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["id"], id);

    let one = app.get(&format!("/api/ingredients/{}/", id), None).await;
    assert_eq!(one.json()["measurement_unit"], "g");

    let (tag, slug) = app.tag("cat");
    let tag_response = app.get(&format!("/api/tags/{}/", tag), None).await;
    assert_eq!(tag_response.json()["slug"], slug);
    assert_eq!(app.get("/api/tags/", None).await.status, StatusCode::OK);
}
