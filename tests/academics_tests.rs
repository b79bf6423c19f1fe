// tests/academics_tests.rs

mod common;

use common::{TestApp, exam_payload, spawn_app};
use serde_json::{Value, json};

async fn create(app: &TestApp, token: &str, path: &str, body: Value) -> i64 {
    let response = app.post_json(path, Some(token), &body).await;
    assert_eq!(response.status().as_u16(), 201, "POST {} failed", path);
    let body: Value = response.json().await.unwrap();
    body["id"].as_i64().unwrap()
}

#[tokio::test]
async fn hierarchy_can_be_built_and_browsed() {
    let app = spawn_app().await;
    let token = app.signup("ayse").await;

    let itu = create(&app, &token, "/academics/universities", json!({ "name": "ITU" })).await;
    let boun = create(&app, &token, "/academics/universities", json!({ "name": "Bogazici" })).await;

    let ce = create(
        &app,
        &token,
        "/academics/departments",
        json!({ "name": "Computer Engineering", "university_id": itu }),
    )
    .await;
    create(
        &app,
        &token,
        "/academics/departments",
        json!({ "name": "Physics", "university_id": boun }),
    )
    .await;

    for level in [3, 1, 2] {
        create(
            &app,
            &token,
            "/academics/class-levels",
            json!({ "level": level, "department_id": ce }),
        )
        .await;
    }

    let universities: Vec<Value> = app.get("/academics/universities").await.json().await.unwrap();
    let names: Vec<&str> = universities.iter().map(|u| u["name"].as_str().unwrap()).collect();
    assert_eq!(names, ["Bogazici", "ITU"]);

    let departments: Vec<Value> = app
        .get(&format!("/academics/universities/{}/departments", itu))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(departments.len(), 1);
    assert_eq!(departments[0]["name"], "Computer Engineering");
    assert_eq!(departments[0]["university_id"], itu);

    let levels: Vec<Value> = app
        .get(&format!("/academics/departments/{}/classes", ce))
        .await
        .json()
        .await
        .unwrap();
    let levels: Vec<i64> = levels.iter().map(|l| l["level"].as_i64().unwrap()).collect();
    assert_eq!(levels, [1, 2, 3]);
}

#[tokio::test]
async fn empty_lists_are_ok_but_missing_parents_are_not_found() {
    let app = spawn_app().await;
    let token = app.signup("ayse").await;

    let universities: Vec<Value> = app.get("/academics/universities").await.json().await.unwrap();
    assert!(universities.is_empty());

    let itu = create(&app, &token, "/academics/universities", json!({ "name": "ITU" })).await;
    let departments = app.get(&format!("/academics/universities/{}/departments", itu)).await;
    assert_eq!(departments.status().as_u16(), 200);
    let departments: Vec<Value> = departments.json().await.unwrap();
    assert!(departments.is_empty());

    assert_eq!(
        app.get("/academics/universities/999/departments").await.status().as_u16(),
        404
    );
    assert_eq!(
        app.get("/academics/departments/999/classes").await.status().as_u16(),
        404
    );
}

#[tokio::test]
async fn duplicate_university_name_conflicts() {
    let app = spawn_app().await;
    let token = app.signup("ayse").await;

    create(&app, &token, "/academics/universities", json!({ "name": "ITU" })).await;
    let response = app
        .post_json("/academics/universities", Some(&token), &json!({ "name": "ITU" }))
        .await;

    assert_eq!(response.status().as_u16(), 409);
}

#[tokio::test]
async fn children_of_unknown_parents_are_rejected() {
    let app = spawn_app().await;
    let token = app.signup("ayse").await;

    let department = app
        .post_json(
            "/academics/departments",
            Some(&token),
            &json!({ "name": "Ghost", "university_id": 999 }),
        )
        .await;
    assert_eq!(department.status().as_u16(), 404);

    let level = app
        .post_json(
            "/academics/class-levels",
            Some(&token),
            &json!({ "level": 1, "department_id": 999 }),
        )
        .await;
    assert_eq!(level.status().as_u16(), 404);
}

#[tokio::test]
async fn writes_require_auth_and_valid_input() {
    let app = spawn_app().await;
    let token = app.signup("ayse").await;

    let anonymous = app
        .post_json("/academics/universities", None, &json!({ "name": "ITU" }))
        .await;
    assert_eq!(anonymous.status().as_u16(), 401);

    let blank = app
        .post_json("/academics/universities", Some(&token), &json!({ "name": "" }))
        .await;
    assert_eq!(blank.status().as_u16(), 400);

    let itu = create(&app, &token, "/academics/universities", json!({ "name": "ITU" })).await;
    let ce = create(
        &app,
        &token,
        "/academics/departments",
        json!({ "name": "CE", "university_id": itu }),
    )
    .await;
    let out_of_range = app
        .post_json(
            "/academics/class-levels",
            Some(&token),
            &json!({ "level": 0, "department_id": ce }),
        )
        .await;
    assert_eq!(out_of_range.status().as_u16(), 400);
}

#[tokio::test]
async fn exams_can_be_filtered_by_academic_tags() {
    let app = spawn_app().await;
    let token = app.signup("ayse").await;

    let itu = create(&app, &token, "/academics/universities", json!({ "name": "ITU" })).await;
    let ce = create(
        &app,
        &token,
        "/academics/departments",
        json!({ "name": "CE", "university_id": itu }),
    )
    .await;
    let first_year = create(
        &app,
        &token,
        "/academics/class-levels",
        json!({ "level": 1, "department_id": ce }),
    )
    .await;

    let mut tagged = exam_payload("Tagged", "Calculus I", 2023, "Fall");
    tagged["university_id"] = json!(itu);
    tagged["department_id"] = json!(ce);
    tagged["class_level_id"] = json!(first_year);
    app.create_exam(&token, tagged).await;
    app.create_exam(&token, exam_payload("Untagged", "Calculus I", 2023, "Fall")).await;

    for query in [
        format!("?university_id={}", itu),
        format!("?department_id={}", ce),
        format!("?class_level_id={}&course_name=calc", first_year),
    ] {
        let exams: Vec<Value> = app.get(&format!("/exams{}", query)).await.json().await.unwrap();
        assert_eq!(exams.len(), 1, "query {}", query);
        assert_eq!(exams[0]["title"], "Tagged");
    }

    let none: Vec<Value> = app
        .get(&format!("/exams?university_id={}", itu + 100))
        .await
        .json()
        .await
        .unwrap();
    assert!(none.is_empty());
}
