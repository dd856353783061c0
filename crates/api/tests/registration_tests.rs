mod common;

use api::auth::Session;
use api::gql::build_schema;
use api::gql::domains::registrations::service::{
    confirm_payment, create_pending_registration, join_tournament, ConfirmPaymentParams,
    RegistrationError, TeamDetails,
};
use async_graphql::Variables;
use common::*;
use futures_util::future::join_all;
use infra::repos::{PaymentStatus, RegistrationRepo, TournamentRepo, UserType};
use serde_json::json;

const JOIN: &str = r#"
    mutation Join($id: ID!) {
        joinTournament(tournamentId: $id) {
            registration { id paymentStatus userId }
            tournament { currentPlayers spotsLeft }
        }
    }
"#;

fn session(profile: &infra::models::ProfileRow) -> Session {
    Session::from_claims(Some(&claims_for(profile)))
}

#[tokio::test]
async fn test_join_tournament_marks_payment_completed() {
    let Some(app_state) = setup_test_db().await else { return };
    let schema = build_schema(app_state.clone());

    let organizer = create_test_profile(&app_state, UserType::Organizer).await;
    let player = create_test_profile(&app_state, UserType::Team).await;
    let tournament = create_test_tournament(&app_state, organizer.id, "Join Cup", 25, 10).await;

    let response = execute_graphql(
        &schema,
        JOIN,
        Some(Variables::from_json(json!({ "id": tournament.id.to_string() }))),
        Some(claims_for(&player)),
    )
    .await;

    assert!(response.errors.is_empty(), "{:?}", response.errors);
    let data = response.data.into_json().unwrap();
    let payload = &data["joinTournament"];
    assert_eq!(payload["registration"]["paymentStatus"], "COMPLETED");
    assert_eq!(payload["registration"]["userId"], player.id.to_string());
    assert_eq!(payload["tournament"]["currentPlayers"], 1);
    assert_eq!(payload["tournament"]["spotsLeft"], 9);
}

#[tokio::test]
async fn test_anonymous_join_requires_sign_in() {
    let Some(app_state) = setup_test_db().await else { return };
    let schema = build_schema(app_state.clone());

    let organizer = create_test_profile(&app_state, UserType::Organizer).await;
    let tournament = create_test_tournament(&app_state, organizer.id, "Anon Cup", 0, 10).await;

    let response = execute_graphql(
        &schema,
        JOIN,
        Some(Variables::from_json(json!({ "id": tournament.id.to_string() }))),
        None,
    )
    .await;

    assert_eq!(first_error(&response), "Please sign in to join tournaments");
}

#[tokio::test]
async fn test_second_join_is_rejected() {
    let Some(app_state) = setup_test_db().await else { return };

    let organizer = create_test_profile(&app_state, UserType::Organizer).await;
    let player = create_test_profile(&app_state, UserType::Team).await;
    let tournament = create_test_tournament(&app_state, organizer.id, "Twice Cup", 0, 10).await;

    join_tournament(&app_state.db, &session(&player), tournament.id)
        .await
        .expect("first join succeeds");

    let err = join_tournament(&app_state.db, &session(&player), tournament.id)
        .await
        .unwrap_err();
    assert!(matches!(err, RegistrationError::AlreadyRegistered), "{err:?}");

    let stored = TournamentRepo::new(app_state.db.clone())
        .get(tournament.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.current_players, 1);
}

#[tokio::test]
async fn test_concurrent_joins_create_one_registration() {
    let Some(app_state) = setup_test_db().await else { return };

    let organizer = create_test_profile(&app_state, UserType::Organizer).await;
    let player = create_test_profile(&app_state, UserType::Team).await;
    let tournament = create_test_tournament(&app_state, organizer.id, "Race Cup", 0, 10).await;
    let player_session = session(&player);

    let results = join_all(
        (0..5).map(|_| join_tournament(&app_state.db, &player_session, tournament.id)),
    )
    .await;

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| matches!(e, RegistrationError::AlreadyRegistered)));

    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM tournament_registrations WHERE tournament_id = $1",
    )
    .bind(tournament.id)
    .fetch_one(&app_state.db)
    .await
    .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_concurrent_joins_never_overfill() {
    let Some(app_state) = setup_test_db().await else { return };

    let organizer = create_test_profile(&app_state, UserType::Organizer).await;
    let tournament = create_test_tournament(&app_state, organizer.id, "Tiny Cup", 0, 2).await;

    let mut players = Vec::new();
    for _ in 0..5 {
        players.push(create_test_profile(&app_state, UserType::Team).await);
    }
    let sessions: Vec<Session> = players.iter().map(session).collect();

    let results = join_all(
        sessions
            .iter()
            .map(|s| join_tournament(&app_state.db, s, tournament.id)),
    )
    .await;

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 2);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| matches!(e, RegistrationError::TournamentFull)));

    let stored = TournamentRepo::new(app_state.db.clone())
        .get(tournament.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.current_players, 2);
}

#[tokio::test]
async fn test_join_full_tournament_creates_no_row() {
    let Some(app_state) = setup_test_db().await else { return };

    let organizer = create_test_profile(&app_state, UserType::Organizer).await;
    let first = create_test_profile(&app_state, UserType::Team).await;
    let second = create_test_profile(&app_state, UserType::Team).await;
    let third = create_test_profile(&app_state, UserType::Team).await;
    let tournament = create_test_tournament(&app_state, organizer.id, "Full Cup", 0, 2).await;

    for player in [&first, &second] {
        join_tournament(&app_state.db, &session(player), tournament.id)
            .await
            .unwrap();
    }

    let err = join_tournament(&app_state.db, &session(&third), tournament.id)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Tournament is full");

    let third_rows = RegistrationRepo::new(app_state.db.clone())
        .list_by_user(third.id)
        .await
        .unwrap();
    assert!(third_rows.is_empty());
}

#[tokio::test]
async fn test_confirm_payment_completes_pending_registration() {
    let Some(app_state) = setup_test_db().await else { return };
    let schema = build_schema(app_state.clone());

    let organizer = create_test_profile(&app_state, UserType::Organizer).await;
    let player = create_test_profile(&app_state, UserType::Team).await;
    let tournament = create_test_tournament(&app_state, organizer.id, "Pay Cup", 40, 10).await;

    let pending = create_pending_registration(
        &app_state.db,
        player.id,
        tournament.id,
        TeamDetails {
            team_name: Some("Night Owls".to_string()),
            team_members: vec!["owl1".to_string(), "owl2".to_string()],
        },
    )
    .await
    .unwrap();
    assert_eq!(pending.registration.payment_status, PaymentStatus::Pending);
    assert_eq!(pending.tournament.current_players, 0);

    let mutation = r#"
        mutation Confirm($input: ConfirmPaymentInput!) {
            confirmPayment(input: $input) {
                success
                message
                registration { paymentStatus teamName teamMembers }
                tournament { currentPlayers }
            }
        }
    "#;
    let variables = Variables::from_json(json!({
        "input": {
            "registrationId": pending.registration.id.to_string(),
            "tournamentId": tournament.id.to_string(),
            "paymentProof": "UPI-REF-123"
        }
    }));

    let response =
        execute_graphql(&schema, mutation, Some(variables.clone()), Some(claims_for(&player)))
            .await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);

    let data = response.data.into_json().unwrap();
    let payload = &data["confirmPayment"];
    assert_eq!(payload["success"], true);
    assert_eq!(payload["message"], "Payment confirmed and registration completed");
    assert_eq!(payload["registration"]["paymentStatus"], "COMPLETED");
    assert_eq!(payload["registration"]["teamName"], "Night Owls");
    assert_eq!(payload["tournament"]["currentPlayers"], 1);

    // Completed is terminal: a second confirmation fails and takes no seat.
    let response =
        execute_graphql(&schema, mutation, Some(variables), Some(claims_for(&player))).await;
    assert_eq!(
        first_error(&response),
        "Payment for this registration is already completed"
    );

    let stored = TournamentRepo::new(app_state.db.clone())
        .get(tournament.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.current_players, 1);
}

#[tokio::test]
async fn test_confirm_payment_checks_owner_and_tournament() {
    let Some(app_state) = setup_test_db().await else { return };

    let organizer = create_test_profile(&app_state, UserType::Organizer).await;
    let player = create_test_profile(&app_state, UserType::Team).await;
    let stranger = create_test_profile(&app_state, UserType::Team).await;
    let tournament = create_test_tournament(&app_state, organizer.id, "Owner Cup", 40, 10).await;
    let other = create_test_tournament(&app_state, organizer.id, "Other Cup", 40, 10).await;

    let pending = create_pending_registration(
        &app_state.db,
        player.id,
        tournament.id,
        TeamDetails::default(),
    )
    .await
    .unwrap();

    let err = confirm_payment(
        &app_state.db,
        ConfirmPaymentParams {
            registration_id: pending.registration.id,
            tournament_id: Some(tournament.id),
            owner_id: Some(stranger.id),
            payment_proof: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, RegistrationError::NotOwner), "{err:?}");

    let err = confirm_payment(
        &app_state.db,
        ConfirmPaymentParams {
            registration_id: pending.registration.id,
            tournament_id: Some(other.id),
            owner_id: Some(player.id),
            payment_proof: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, RegistrationError::TournamentMismatch), "{err:?}");
}

#[tokio::test]
async fn test_confirm_payment_on_full_tournament_fails() {
    let Some(app_state) = setup_test_db().await else { return };

    let organizer = create_test_profile(&app_state, UserType::Organizer).await;
    let waiting = create_test_profile(&app_state, UserType::Team).await;
    let joiner = create_test_profile(&app_state, UserType::Team).await;
    let tournament = create_test_tournament(&app_state, organizer.id, "Last Seat", 10, 2).await;

    let pending = create_pending_registration(
        &app_state.db,
        waiting.id,
        tournament.id,
        TeamDetails::default(),
    )
    .await
    .unwrap();

    join_tournament(&app_state.db, &session(&joiner), tournament.id)
        .await
        .unwrap();
    join_tournament(&app_state.db, &session(&organizer), tournament.id)
        .await
        .unwrap();

    let err = confirm_payment(
        &app_state.db,
        ConfirmPaymentParams {
            registration_id: pending.registration.id,
            tournament_id: Some(tournament.id),
            owner_id: Some(waiting.id),
            payment_proof: None,
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.to_string(), "Tournament is full");

    let status: PaymentStatus = sqlx::query_scalar(
        "SELECT payment_status FROM tournament_registrations WHERE id = $1",
    )
    .bind(pending.registration.id)
    .fetch_one(&app_state.db)
    .await
    .unwrap();
    assert_eq!(status, PaymentStatus::Pending);
}

#[tokio::test]
async fn test_my_registrations_and_registered_ids() {
    let Some(app_state) = setup_test_db().await else { return };
    let schema = build_schema(app_state.clone());

    let organizer = create_test_profile(&app_state, UserType::Organizer).await;
    let player = create_test_profile(&app_state, UserType::Team).await;
    let paid = create_test_tournament(&app_state, organizer.id, "Paid Cup", 0, 10).await;
    let unpaid = create_test_tournament(&app_state, organizer.id, "Unpaid Cup", 20, 10).await;

    join_tournament(&app_state.db, &session(&player), paid.id)
        .await
        .unwrap();
    create_pending_registration(&app_state.db, player.id, unpaid.id, TeamDetails::default())
        .await
        .unwrap();

    let query = r#"
        query {
            myRegistrations { tournamentId paymentStatus }
            registeredTournamentIds
        }
    "#;
    let response = execute_graphql(&schema, query, None, Some(claims_for(&player))).await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);

    let data = response.data.into_json().unwrap();
    assert_eq!(data["myRegistrations"].as_array().unwrap().len(), 2);
    assert_eq!(data["registeredTournamentIds"], json!([paid.id.to_string()]));

    let anonymous = execute_graphql(&schema, "query { registeredTournamentIds }", None, None).await;
    assert!(anonymous.errors.is_empty());
    assert_eq!(
        anonymous.data.into_json().unwrap()["registeredTournamentIds"],
        json!([])
    );
}
