//! Helper, incident, dashboard and form routes through the real router.

use axum::http::StatusCode;
use helperbase_core::{HelperId, Role};
use helperbase_storage::RecordStore;
use serde_json::json;

#[path = "support/app.rs"]
mod app_support;
use app_support::{create_helper, helper_body, incident_body, TestApp};

#[tokio::test]
async fn helper_crud_cycle() -> Result<(), String> {
    let app = TestApp::new()?;
    let token = app.token_for(Role::Staff).await?;

    let helper_id = create_helper(&app, &token, "Siti Rahayu").await?;
    let uri = format!("/api/v1/helpers/{}", helper_id);

    let fetched = app.get(&uri, &token).await?;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.body["full_name"], "Siti Rahayu");
    assert_eq!(fetched.body["status"], "active");

    let updated = app
        .put(&uri, &token, json!({ "status": "terminated", "employment_end": "2024-12-31" }))
        .await?;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["status"], "terminated");

    let deleted = app.delete(&uri, &token).await?;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);

    let missing = app.get(&uri, &token).await?;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn helper_list_reflects_writes_despite_cache() -> Result<(), String> {
    let app = TestApp::new()?;
    let token = app.token_for(Role::Staff).await?;

    let empty = app.get("/api/v1/helpers", &token).await?;
    assert_eq!(empty.body["total"], 0);

    create_helper(&app, &token, "Ana Reyes").await?;
    create_helper(&app, &token, "Dewi Lestari").await?;

    let listed = app.get("/api/v1/helpers", &token).await?;
    assert_eq!(listed.body["total"], 2);

    let searched = app.get("/api/v1/helpers?search=dewi", &token).await?;
    assert_eq!(searched.body["total"], 1);
    assert_eq!(searched.body["helpers"][0]["full_name"], "Dewi Lestari");
    Ok(())
}

#[tokio::test]
async fn helper_update_shows_through_cached_profile() -> Result<(), String> {
    let app = TestApp::new()?;
    let token = app.token_for(Role::Staff).await?;
    let helper_id = create_helper(&app, &token, "Lina Cruz").await?;
    let uri = format!("/api/v1/helpers/{}", helper_id);

    // Populate the profile cache, then edit.
    app.get(&uri, &token).await?;
    app.put(&uri, &token, json!({ "phone": "+852 9000 1111" })).await?;

    let fetched = app.get(&uri, &token).await?;
    assert_eq!(fetched.body["phone"], "+852 9000 1111");
    Ok(())
}

#[tokio::test]
async fn invalid_helper_rejected() -> Result<(), String> {
    let app = TestApp::new()?;
    let token = app.token_for(Role::Staff).await?;

    let mut body = helper_body("  ");
    let blank = app.post("/api/v1/helpers", &token, body.clone()).await?;
    assert_eq!(blank.status, StatusCode::BAD_REQUEST);

    body["full_name"] = json!("Valid Name");
    body["employment_end"] = json!("2020-01-01");
    let ends_before_start = app.post("/api/v1/helpers", &token, body).await?;
    assert_eq!(ends_before_start.status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn incident_requires_existing_helper() -> Result<(), String> {
    let app = TestApp::new()?;
    let token = app.token_for(Role::Staff).await?;

    let orphan = app
        .post(
            "/api/v1/incidents",
            &token,
            incident_body("0191d6f4-7d3c-7c4e-9a5b-3f2e1d0c9b8a"),
        )
        .await?;
    assert_eq!(orphan.status, StatusCode::NOT_FOUND);
    assert_eq!(orphan.body["code"], "HELPER_NOT_FOUND");
    Ok(())
}

#[tokio::test]
async fn incident_rejected_for_helper_with_stale_cached_profile() -> Result<(), String> {
    let app = TestApp::new()?;
    let token = app.token_for(Role::Staff).await?;
    let helper_id = create_helper(&app, &token, "Maria Santos").await?;

    // Cache the profile, then remove the row without going through the API.
    let profile = app.get(&format!("/api/v1/helpers/{}", helper_id), &token).await?;
    assert_eq!(profile.status, StatusCode::OK);
    let id = uuid::Uuid::parse_str(&helper_id).map_err(|e| e.to_string())?;
    app.store
        .helper_delete(HelperId::new(id))
        .await
        .map_err(|e| e.to_string())?;

    let filed = app
        .post("/api/v1/incidents", &token, incident_body(&helper_id))
        .await?;
    assert_eq!(filed.status, StatusCode::NOT_FOUND);
    assert_eq!(filed.body["code"], "HELPER_NOT_FOUND");
    assert_eq!(app.store.incident_count(), 0);
    Ok(())
}

#[tokio::test]
async fn incident_lifecycle_updates_helper_incidents() -> Result<(), String> {
    let app = TestApp::new()?;
    let (staff, token) = app.user("case.worker@example.org", Role::Staff).await?;
    let helper_id = create_helper(&app, &token, "Maya Putri").await?;
    let helper_incidents = format!("/api/v1/helpers/{}/incidents", helper_id);

    assert_eq!(app.get(&helper_incidents, &token).await?.body["total"], 0);

    let created = app
        .post("/api/v1/incidents", &token, incident_body(&helper_id))
        .await?;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["status"], "open");
    assert_eq!(created.body["reported_by"], staff.email);
    let incident_uri = format!(
        "/api/v1/incidents/{}",
        created.body["incident_id"].as_str().ok_or("incident_id missing")?
    );

    assert_eq!(app.get(&helper_incidents, &token).await?.body["total"], 1);

    let resolved = app
        .put(
            &incident_uri,
            &token,
            json!({ "status": "resolved", "resolution": "Rest days restored" }),
        )
        .await?;
    assert_eq!(resolved.status, StatusCode::OK);
    assert_eq!(resolved.body["status"], "resolved");

    let filtered = app.get("/api/v1/incidents?status=resolved", &token).await?;
    assert_eq!(filtered.body["total"], 1);

    assert_eq!(app.delete(&incident_uri, &token).await?.status, StatusCode::NO_CONTENT);
    assert_eq!(app.get(&helper_incidents, &token).await?.body["total"], 0);
    Ok(())
}

#[tokio::test]
async fn dashboard_counts_follow_mutations() -> Result<(), String> {
    let app = TestApp::new()?;
    let token = app.token_for(Role::Staff).await?;

    let before = app.get("/api/v1/dashboard/metrics", &token).await?;
    assert_eq!(before.status, StatusCode::OK);
    assert_eq!(before.body["total_helpers"], 0);

    let helper_id = create_helper(&app, &token, "Rosa Lim").await?;
    app.post("/api/v1/incidents", &token, incident_body(&helper_id))
        .await?;

    let after = app.get("/api/v1/dashboard/metrics", &token).await?;
    assert_eq!(after.body["total_helpers"], 1);
    assert_eq!(after.body["active_helpers"], 1);
    assert_eq!(after.body["total_incidents"], 1);
    assert_eq!(after.body["open_incidents"], 1);
    Ok(())
}

#[tokio::test]
async fn form_step_reports_field_errors() -> Result<(), String> {
    let app = TestApp::new()?;
    let token = app.token_for(Role::Staff).await?;

    let first = app
        .post(
            "/api/v1/forms/helper/steps/0/validate",
            &token,
            json!({ "full_name": "Ana", "nationality": "Philippines" }),
        )
        .await?;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.body["valid"], true);
    assert_eq!(first.body["is_first_step"], true);
    assert_eq!(first.body["next_step"], 1);

    let missing = app
        .post("/api/v1/forms/incident/steps/1/validate", &token, json!({}))
        .await?;
    assert_eq!(missing.status, StatusCode::OK);
    assert_eq!(missing.body["valid"], false);
    assert_eq!(missing.body["errors"][0]["field"], "severity");

    let out_of_range = app
        .post("/api/v1/forms/helper/steps/3/validate", &token, json!({}))
        .await?;
    assert_eq!(out_of_range.status, StatusCode::BAD_REQUEST);
    Ok(())
}
