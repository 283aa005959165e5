use gophermart::error::AppError;
use gophermart::services::Resolution;
use reqwest::StatusCode;
use rust_decimal::Decimal;
use std::str::FromStr;

mod common;

#[tokio::test]
async fn upload_claims_duplicates_and_conflicts() {
    let Some(app) = common::TestApp::try_spawn().await else { return };
    let (access, _) = app.register_user(&common::unique_username("orders")).await;
    let number = common::luhn_number();

    // Fresh upload is accepted.
    let response = app
        .client
        .post(format!("{}/api/user/orders", app.server_url))
        .header("Authorization", format!("Bearer {access}"))
        .body(number.clone())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["number"], number.as_str());
    assert_eq!(body["status"], "NEW");
    assert!(body.get("accrual").is_none(), "unset accrual must be omitted");
    assert!(body["uploaded_at"].is_string());

    // Re-uploading one's own order echoes the original row.
    let response = app
        .client
        .post(format!("{}/api/user/orders", app.server_url))
        .header("Authorization", format!("Bearer {access}"))
        .body(number.clone())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["number"], number.as_str());

    // Another user cannot claim the same number.
    let (other_access, _) = app.register_user(&common::unique_username("intruder")).await;
    let response = app
        .client
        .post(format!("{}/api/user/orders", app.server_url))
        .header("Authorization", format!("Bearer {other_access}"))
        .body(number.clone())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "service_error");
}

#[tokio::test]
async fn upload_rejects_bad_bodies() {
    let Some(app) = common::TestApp::try_spawn().await else { return };
    let (access, _) = app.register_user(&common::unique_username("badbody")).await;
    let base = format!("{}/api/user/orders", app.server_url);
    let auth = format!("Bearer {access}");

    // Not a Luhn number.
    let response = app.client.post(&base).header("Authorization", &auth).body("178").send().await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // Whitespace-only body.
    let response = app.client.post(&base).header("Authorization", &auth).body("  \n").send().await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // Oversized body.
    let response =
        app.client.post(&base).header("Authorization", &auth).body("9".repeat(600)).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Whitespace around a valid number is tolerated.
    let number = common::luhn_number();
    let response =
        app.client.post(&base).header("Authorization", &auth).body(format!("  {number}\n")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);
}

#[tokio::test]
async fn listing_is_scoped_and_newest_first() {
    let Some(app) = common::TestApp::try_spawn().await else { return };
    let (access, _) = app.register_user(&common::unique_username("list")).await;
    let base = format!("{}/api/user/orders", app.server_url);
    let auth = format!("Bearer {access}");

    // Nothing uploaded yet.
    let response = app.client.get(&base).header("Authorization", &auth).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let first = common::luhn_number();
    let second = common::luhn_number();
    for number in [&first, &second] {
        let response = app.client.post(&base).header("Authorization", &auth).body(number.clone()).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        // Distinct upload instants keep the expected ordering unambiguous.
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }

    let response = app.client.get(&base).header("Authorization", &auth).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    let numbers: Vec<&str> = body.as_array().unwrap().iter().map(|o| o["number"].as_str().unwrap()).collect();
    assert_eq!(numbers, vec![second.as_str(), first.as_str()], "newest upload first");

    // Another user sees none of it.
    let (other_access, _) = app.register_user(&common::unique_username("peeker")).await;
    let response =
        app.client.get(&base).header("Authorization", format!("Bearer {other_access}")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn terminal_orders_refuse_further_transitions() {
    let Some(app) = common::TestApp::try_spawn().await else { return };
    let services = &app.services;

    let user = services.user_service.create_user(&common::unique_username("terminal"), common::TEST_PASSWORD).await.unwrap();
    let number = common::luhn_number();
    services.order_service.create_order(&number, user.id).await.unwrap();

    let accrual = Decimal::from_str("42.5").unwrap();
    let order = services.order_service.mark_processed(&number, Resolution::Processed { accrual }).await.unwrap();
    assert_eq!(order.accrual, Some(accrual));

    // A second settlement of any kind bounces off the terminal-state guard.
    for resolution in [Resolution::Processed { accrual: Decimal::ONE }, Resolution::Invalid] {
        let result = services.order_service.mark_processed(&number, resolution).await;
        assert!(matches!(result, Err(AppError::OrderAlreadyProcessed)), "terminal orders are immutable");
    }

    // The row is untouched and the balance was credited exactly once.
    let balance = services.user_service.get_balance(user.id).await.unwrap();
    assert_eq!(balance.current, accrual);
}

#[tokio::test]
async fn processing_transition_leaves_balance_alone() {
    let Some(app) = common::TestApp::try_spawn().await else { return };
    let services = &app.services;

    let user = services.user_service.create_user(&common::unique_username("pending"), common::TEST_PASSWORD).await.unwrap();
    let number = common::luhn_number();
    services.order_service.create_order(&number, user.id).await.unwrap();

    services.order_service.mark_processing(&number).await.unwrap();

    let orders = services
        .order_service
        .list_orders(&gophermart::adapters::database::order_repo::OrderFilter::for_user(user.id))
        .await
        .unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].status, gophermart::domain::order::OrderStatus::Processing);
    assert_eq!(orders[0].accrual, None);

    let balance = services.user_service.get_balance(user.id).await.unwrap();
    assert_eq!(balance.current, Decimal::ZERO);
}

#[tokio::test]
async fn order_number_uniqueness_at_service_level() {
    let Some(app) = common::TestApp::try_spawn().await else { return };
    let services = &app.services;

    let owner = services.user_service.create_user(&common::unique_username("owner"), common::TEST_PASSWORD).await.unwrap();
    let rival = services.user_service.create_user(&common::unique_username("rival"), common::TEST_PASSWORD).await.unwrap();
    let number = common::luhn_number();

    let created = services.order_service.create_order(&number, owner.id).await.unwrap();

    match services.order_service.create_order(&number, owner.id).await {
        Err(AppError::OrderAlreadyExists(existing)) => assert_eq!(existing.id, created.id),
        other => panic!("expected OrderAlreadyExists, got {other:?}"),
    }

    assert!(matches!(
        services.order_service.create_order(&number, rival.id).await,
        Err(AppError::OrderNumberTaken)
    ));
}
