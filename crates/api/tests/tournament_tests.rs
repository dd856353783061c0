mod common;

use api::gql::build_schema;
use async_graphql::Variables;
use common::*;
use infra::repos::{TournamentRepo, UserType};
use serde_json::json;

const CREATE_TOURNAMENT: &str = r#"
    mutation CreateTournament($input: CreateTournamentInput!) {
        createTournament(input: $input) {
            id
            title
            entryFee
            maxPlayers
            currentPlayers
            status
            tournamentType
            map
            organizerId
        }
    }
"#;

#[tokio::test]
async fn test_organizer_creates_tournament_with_defaults() {
    let Some(app_state) = setup_test_db().await else { return };
    let schema = build_schema(app_state.clone());

    let organizer = create_test_profile(&app_state, UserType::Organizer).await;

    let variables = Variables::from_json(json!({
        "input": {
            "title": "Erangel Showdown",
            "entryFee": 50,
            "prizePool": 5000,
            "maxPlayers": 64,
            "startDate": "2030-01-01T18:00:00Z"
        }
    }));

    let response = execute_graphql(
        &schema,
        CREATE_TOURNAMENT,
        Some(variables),
        Some(claims_for(&organizer)),
    )
    .await;

    assert!(response.errors.is_empty(), "{:?}", response.errors);
    let data = response.data.into_json().unwrap();
    let created = &data["createTournament"];

    assert_eq!(created["title"], "Erangel Showdown");
    assert_eq!(created["currentPlayers"], 0);
    assert_eq!(created["status"], "UPCOMING");
    assert_eq!(created["tournamentType"], "SQUAD");
    assert_eq!(created["map"], "Erangel");
    assert_eq!(created["organizerId"], organizer.id.to_string());
}

#[tokio::test]
async fn test_missing_start_date_fails_before_insert() {
    let Some(app_state) = setup_test_db().await else { return };
    let schema = build_schema(app_state.clone());

    let organizer = create_test_profile(&app_state, UserType::Organizer).await;
    let title = format!("No Date {}", organizer.id);

    let variables = Variables::from_json(json!({
        "input": { "title": title, "entryFee": 10, "maxPlayers": 20 }
    }));

    let response = execute_graphql(
        &schema,
        CREATE_TOURNAMENT,
        Some(variables),
        Some(claims_for(&organizer)),
    )
    .await;

    assert_eq!(first_error(&response), "Please select a start date");

    let stored = TournamentRepo::new(app_state.db.clone())
        .list_all()
        .await
        .unwrap();
    assert!(stored.iter().all(|t| t.title != title));
}

#[tokio::test]
async fn test_team_cannot_create_tournament() {
    let Some(app_state) = setup_test_db().await else { return };
    let schema = build_schema(app_state.clone());

    let team = create_test_profile(&app_state, UserType::Team).await;

    let variables = Variables::from_json(json!({
        "input": {
            "title": "Unauthorized Cup",
            "maxPlayers": 20,
            "startDate": "2030-01-01T18:00:00Z"
        }
    }));

    let response =
        execute_graphql(&schema, CREATE_TOURNAMENT, Some(variables), Some(claims_for(&team)))
            .await;

    assert!(!response.errors.is_empty());
    let code = response.errors[0]
        .extensions
        .as_ref()
        .and_then(|ext| ext.get("code"))
        .cloned();
    assert_eq!(code, Some(async_graphql::Value::String("FORBIDDEN".to_string())));
}

#[tokio::test]
async fn test_anonymous_cannot_create_tournament() {
    let Some(app_state) = setup_test_db().await else { return };
    let schema = build_schema(app_state);

    let variables = Variables::from_json(json!({
        "input": { "title": "Ghost Cup", "startDate": "2030-01-01T18:00:00Z" }
    }));

    let response = execute_graphql(&schema, CREATE_TOURNAMENT, Some(variables), None).await;
    assert_eq!(
        first_error(&response),
        "You must be logged in to perform this action"
    );
}

#[tokio::test]
async fn test_tournaments_search_and_sort() {
    let Some(app_state) = setup_test_db().await else { return };
    let schema = build_schema(app_state.clone());

    let organizer = create_test_profile(&app_state, UserType::Organizer).await;
    let tag = organizer.id.simple().to_string();
    let cheap = create_test_tournament(&app_state, organizer.id, &format!("{tag} Sanhok"), 10, 50).await;
    let pricey = create_test_tournament(&app_state, organizer.id, &format!("{tag} Miramar"), 50, 50).await;
    let middle = create_test_tournament(&app_state, organizer.id, &format!("{tag} Vikendi"), 30, 50).await;

    let query = r#"
        query Tournaments($search: String, $sortBy: TournamentSort) {
            tournaments(search: $search, sortBy: $sortBy) { id entryFee }
        }
    "#;

    let variables = Variables::from_json(json!({ "search": tag.to_uppercase(), "sortBy": "ENTRY_FEE" }));
    let response = execute_graphql(&schema, query, Some(variables), None).await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);

    let data = response.data.into_json().unwrap();
    let ids: Vec<String> = data["tournaments"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_str().unwrap().to_string())
        .collect();

    assert_eq!(
        ids,
        vec![cheap.id.to_string(), middle.id.to_string(), pricey.id.to_string()]
    );
}

#[tokio::test]
async fn test_dashboard_marks_joined_tournaments() {
    let Some(app_state) = setup_test_db().await else { return };
    let schema = build_schema(app_state.clone());

    let organizer = create_test_profile(&app_state, UserType::Organizer).await;
    let player = create_test_profile(&app_state, UserType::Team).await;
    let tag = player.id.simple().to_string();
    let joined = create_test_tournament(&app_state, organizer.id, &format!("{tag} Joined"), 0, 10).await;
    create_test_tournament(&app_state, organizer.id, &format!("{tag} Other"), 0, 10).await;

    let join = r#"
        mutation Join($id: ID!) { joinTournament(tournamentId: $id) { registration { id } } }
    "#;
    let response = execute_graphql(
        &schema,
        join,
        Some(Variables::from_json(json!({ "id": joined.id.to_string() }))),
        Some(claims_for(&player)),
    )
    .await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);

    let query = r#"
        query Dashboard($search: String) {
            dashboard(search: $search) {
                all { id }
                upcoming { id }
                my { id }
                stats { registered }
                registeredTournamentIds
            }
        }
    "#;
    let response = execute_graphql(
        &schema,
        query,
        Some(Variables::from_json(json!({ "search": tag }))),
        Some(claims_for(&player)),
    )
    .await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);

    let data = response.data.into_json().unwrap();
    let dashboard = &data["dashboard"];
    assert_eq!(dashboard["all"].as_array().unwrap().len(), 2);
    assert_eq!(dashboard["upcoming"].as_array().unwrap().len(), 2);
    assert_eq!(dashboard["my"], json!([{ "id": joined.id.to_string() }]));
    assert_eq!(dashboard["stats"]["registered"], 1);
    assert_eq!(dashboard["registeredTournamentIds"], json!([joined.id.to_string()]));
}
