mod common;

use common::{counts, spawn_app};
use serde_json::{json, Value};

fn percentages(stats: &Value) -> Vec<f64> {
    stats
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["percentage"].as_f64().unwrap())
        .collect()
}

#[tokio::test]
async fn second_vote_from_same_device_is_rejected_with_current_stats() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let question_id = app.create_active_question(&admin, &["A", "B"]).await;

    let response = app.answer_as_device("device-1", question_id, 0).await;
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.unwrap();
    assert_eq!(counts(&body["stats"]), vec![1, 0]);
    assert_eq!(percentages(&body["stats"]), vec![100.0, 0.0]);
    assert_eq!(body["answer"]["optionIndex"], 0);

    let response = app.answer_as_device("device-2", question_id, 1).await;
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.unwrap();
    assert_eq!(counts(&body["stats"]), vec![1, 1]);
    assert_eq!(percentages(&body["stats"]), vec![50.0, 50.0]);

    let response = app.answer_as_device("device-1", question_id, 1).await;
    assert_eq!(response.status(), 409);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "You have already answered this question");
    assert_eq!(counts(&body["stats"]), vec![1, 1]);
    assert_eq!(percentages(&body["stats"]), vec![50.0, 50.0]);
}

#[tokio::test]
async fn answering_requires_an_identity() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let question_id = app.create_active_question(&admin, &["A", "B"]).await;

    let response = app
        .post("/questions/daily/answer")
        .json(&json!({ "questionId": question_id, "optionIndex": 0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    let response = app.answer_as_device("   ", question_id, 0).await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn out_of_range_option_is_rejected() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let question_id = app.create_active_question(&admin, &["A", "B"]).await;

    assert_eq!(app.answer_as_device("d", question_id, 2).await.status(), 400);
    assert_eq!(app.answer_as_device("d", question_id, -1).await.status(), 400);
    // A rejected attempt does not use up the vote.
    assert_eq!(app.answer_as_device("d", question_id, 1).await.status(), 201);
}

#[tokio::test]
async fn inactive_or_unknown_question_cannot_be_answered() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let response = app
        .post("/admin/questions")
        .bearer_auth(&admin)
        .json(&json!({ "title": "Draft", "content": "Not live", "options": ["A", "B"] }))
        .send()
        .await
        .unwrap();
    let draft: Value = response.json().await.unwrap();
    let draft_id = draft["id"].as_i64().unwrap();

    assert_eq!(app.answer_as_device("d", draft_id, 0).await.status(), 404);
    assert_eq!(app.answer_as_device("d", 9999, 0).await.status(), 404);
}

#[tokio::test]
async fn signed_in_user_votes_once_across_devices() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let question_id = app.create_active_question(&admin, &["A", "B"]).await;
    let (_, token) = app.register("Voter", "voter@example.com").await;

    let vote = |device: &'static str| {
        app.post("/questions/daily/answer")
            .bearer_auth(&token)
            .header("X-Device-ID", device)
            .json(&json!({ "questionId": question_id, "optionIndex": 0 }))
            .send()
    };
    assert_eq!(vote("phone").await.unwrap().status(), 201);
    assert_eq!(vote("laptop").await.unwrap().status(), 409);

    // The device alone was never recorded, so it can still vote anonymously.
    assert_eq!(app.answer_as_device("phone", question_id, 1).await.status(), 201);
}

#[tokio::test]
async fn check_answer_reports_stats_only_after_voting() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let question_id = app.create_active_question(&admin, &["A", "B", "C"]).await;
    let path = format!("/questions/{}/check-answer", question_id);

    let body: Value = app
        .get(&path)
        .header("X-Device-ID", "device-1")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["hasAnswered"], false);
    assert!(body.get("stats").is_none());

    app.answer_as_device("device-1", question_id, 2).await;

    let body: Value = app
        .get(&path)
        .header("X-Device-ID", "device-1")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["hasAnswered"], true);
    assert_eq!(counts(&body["stats"]), vec![0, 0, 1]);

    let response = app.get(&path).send().await.unwrap();
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn malformed_answer_body_is_a_json_bad_request() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let question_id = app.create_active_question(&admin, &["A", "B"]).await;

    let response = app
        .post("/questions/daily/answer")
        .header("X-Device-ID", "dev")
        .json(&json!({ "questionId": question_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert!(body["message"].as_str().unwrap().contains("optionIndex"));

    let response = app
        .post("/questions/daily/answer")
        .header("X-Device-ID", "dev")
        .header("Content-Type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert!(body["message"].is_string());

    // Neither attempt was recorded.
    assert_eq!(app.answer_as_device("dev", question_id, 0).await.status(), 201);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn parallel_votes_from_one_device_are_counted_once() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let question_id = app.create_active_question(&admin, &["A", "B"]).await;

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let request = app
                .post("/questions/daily/answer")
                .header("X-Device-ID", "shared-device")
                .json(&json!({ "questionId": question_id, "optionIndex": i % 2 }));
            tokio::spawn(async move { request.send().await.unwrap().status().as_u16() })
        })
        .collect();
    let mut statuses = Vec::new();
    for handle in handles {
        statuses.push(handle.await.unwrap());
    }

    assert_eq!(statuses.iter().filter(|&&s| s == 201).count(), 1);
    assert_eq!(statuses.iter().filter(|&&s| s == 409).count(), 15);

    let stats: Value = app
        .get(&format!("/questions/{}/stats", question_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stats["totalAnswers"], 1);
    assert_eq!(counts(&stats["overall"]).iter().sum::<i64>(), 1);
}
