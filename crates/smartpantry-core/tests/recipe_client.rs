use std::sync::Arc;

use smartpantry_core::{ApiError, IngredientCache, RecipeClient};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn json(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "application/json")
        .set_body_string(body)
}

async fn client_for(server: &MockServer) -> RecipeClient {
    RecipeClient::with_base_url(server.uri()).expect("client should build")
}

#[tokio::test]
async fn lists_ingredients_sorted_without_blanks() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/list.php"))
        .and(query_param("i", "list"))
        .respond_with(json(
            r#"{"meals":[
                {"idIngredient":"2","strIngredient":"Salt","strDescription":null,"strType":null},
                {"idIngredient":"1","strIngredient":" Butter ","strDescription":null,"strType":null},
                {"idIngredient":"3","strIngredient":"","strDescription":null,"strType":null}
            ]}"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let names: Vec<String> = client
        .list_all_ingredients()
        .await
        .expect("catalog should load")
        .into_iter()
        .map(|i| i.name)
        .collect();

    assert_eq!(names, vec!["Butter", "Salt"]);
}

#[tokio::test]
async fn ingredient_detail_encodes_name_and_handles_missing_match() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search.php"))
        .and(query_param("i", "Chicken Breast"))
        .respond_with(json(
            r#"{"ingredients":[{"idIngredient":"5","strIngredient":"Chicken Breast","strDescription":"Lean white meat.","strType":"Meat"}]}"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search.php"))
        .and(query_param("i", "Unobtainium"))
        .respond_with(json(r#"{"ingredients":null}"#))
        .mount(&server)
        .await;

    let client = client_for(&server).await;

    let detail = client
        .fetch_ingredient_detail("Chicken Breast")
        .await
        .expect("request should succeed")
        .expect("ingredient should be found");
    assert_eq!(detail.description.as_deref(), Some("Lean white meat."));
    assert_eq!(detail.kind.as_deref(), Some("Meat"));

    let missing = client
        .fetch_ingredient_detail("Unobtainium")
        .await
        .expect("request should succeed");
    assert_eq!(missing, None);
}

#[tokio::test]
async fn recipe_search_maps_null_meals_to_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search.php"))
        .and(query_param("s", "zzzz"))
        .respond_with(json(r#"{"meals":null}"#))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search.php"))
        .and(query_param("s", "chicken curry"))
        .respond_with(json(
            r#"{"meals":[{"idMeal":"52820","strMeal":"Katsu Chicken curry","strMealThumb":"https://www.themealdb.com/images/media/meals/vwrpps1503068729.jpg"}]}"#,
        ))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    assert!(client.search_recipes("zzzz").await.is_empty());

    let results = client.search_recipes("chicken curry").await;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, "52820");
    assert_eq!(results[0].name, "Katsu Chicken curry");
}

#[tokio::test]
async fn recipe_search_swallows_transport_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search.php"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    assert!(client.search_recipes("soup").await.is_empty());

    // Nothing is listening here at all
    let offline = RecipeClient::with_base_url("http://127.0.0.1:9").expect("client should build");
    assert!(offline.search_recipes("soup").await.is_empty());
}

#[tokio::test]
async fn recipe_detail_flattens_all_twenty_slots() {
    let mut meal = serde_json::json!({
        "idMeal": "52772",
        "strMeal": "Teriyaki Chicken Casserole",
        "strInstructions": "Preheat oven to 350F.",
        "strMealThumb": "https://www.themealdb.com/images/media/meals/wvpsxx1468256321.jpg",
    });
    for i in 1..=20 {
        meal[format!("strIngredient{}", i)] = serde_json::json!(format!("Ingredient {}", i));
        meal[format!("strMeasure{}", i)] = serde_json::json!(if i % 2 == 0 { "" } else { "1 tsp" });
    }
    meal["strIngredient7"] = serde_json::json!("  ");
    let body = serde_json::json!({ "meals": [meal] }).to_string();

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/lookup.php"))
        .and(query_param("i", "52772"))
        .respond_with(json(&body))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let detail = client
        .fetch_recipe_detail("52772")
        .await
        .expect("recipe should be found");

    assert_eq!(detail.name, "Teriyaki Chicken Casserole");
    assert_eq!(detail.ingredient_lines.len(), 19);
    assert_eq!(detail.ingredient_lines[0], "1 tsp Ingredient 1");
    assert_eq!(detail.ingredient_lines[1], "Ingredient 2");
    assert_eq!(detail.ingredient_lines[6], "Ingredient 8");
    assert_eq!(detail.ingredient_lines[18], "Ingredient 20");
}

#[tokio::test]
async fn recipe_lookups_collapse_failures_to_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/lookup.php"))
        .and(query_param("i", "0"))
        .respond_with(json(r#"{"meals":null}"#))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/lookup.php"))
        .and(query_param("i", "500"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/random.php"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    assert_eq!(client.fetch_recipe_detail("0").await, None);
    assert_eq!(client.fetch_recipe_detail("500").await, None);
    assert_eq!(client.fetch_random_recipe().await, None);
}

#[tokio::test]
async fn recipe_lookups_offline_yield_none() {
    // Nothing is listening here at all
    let offline = RecipeClient::with_base_url("http://127.0.0.1:9").expect("client should build");

    assert_eq!(offline.fetch_recipe_detail("52772").await, None);
    assert_eq!(offline.fetch_random_recipe().await, None);
}

#[tokio::test]
async fn ingredient_detail_propagates_transport_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search.php"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client
        .fetch_ingredient_detail("Salt")
        .await
        .expect_err("server error should propagate");
    assert!(matches!(
        err.downcast_ref::<ApiError>(),
        Some(ApiError::ServerError(_))
    ));

    let offline = RecipeClient::with_base_url("http://127.0.0.1:9").expect("client should build");
    assert!(offline.fetch_ingredient_detail("Salt").await.is_err());
}

#[tokio::test]
async fn random_recipe_tolerates_reduced_slots() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/random.php"))
        .respond_with(json(
            r#"{"meals":[{
                "idMeal":"53049","strMeal":"Apam balik","strInstructions":"Mix milk, oil and egg.",
                "strMealThumb":"https://www.themealdb.com/images/media/meals/adxcbq1619787919.jpg",
                "strIngredient1":"Milk","strMeasure1":"200ml",
                "strIngredient2":"Oil","strMeasure2":"60ml",
                "strIngredient3":"Eggs","strMeasure3":"2",
                "strIngredient4":"Flour","strMeasure4":"1600g",
                "strIngredient5":"Baking Powder","strMeasure5":"3 tsp"
            }]}"#,
        ))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let detail = client
        .fetch_random_recipe()
        .await
        .expect("a recipe should be returned");

    assert_eq!(detail.id, "53049");
    assert_eq!(
        detail.ingredient_lines,
        vec!["200ml Milk", "60ml Oil", "2 Eggs", "1600g Flour", "3 tsp Baking Powder"]
    );
}

#[tokio::test]
async fn ingredient_cache_hits_network_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/list.php"))
        .respond_with(json(
            r#"{"meals":[
                {"strIngredient":"Banana"},
                {"strIngredient":"Salt"},
                {"strIngredient":"Anchovy Fillet"}
            ]}"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let cache = IngredientCache::new(Arc::new(client_for(&server).await));

    let first = cache.search("an").await;
    let second = cache.search("AN").await;
    let all = cache.search("").await;

    let names: Vec<&str> = first.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["Anchovy Fillet", "Banana"]);
    assert_eq!(second.len(), 2);
    assert_eq!(all.len(), 3);
    // MockServer verifies the `expect(1)` on drop
}
