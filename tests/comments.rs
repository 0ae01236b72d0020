mod common;

use common::spawn_app;
use serde_json::{json, Value};

#[tokio::test]
async fn like_toggles_on_and_off() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let question_id = app.create_active_question(&admin, &["A", "B"]).await;
    let (_, token) = app.register("Cara", "cara@example.com").await;

    let response = app
        .post(&format!("/questions/{}/comments", question_id))
        .bearer_auth(&token)
        .json(&json!({ "content": "  Tough one  " }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    let comment: Value = response.json().await.unwrap();
    assert_eq!(comment["content"], "Tough one");
    assert_eq!(comment["author"]["name"], "Cara");
    let like_path = format!("/comments/{}/like", comment["id"]);

    for expected in [true, false, true] {
        let body: Value = app
            .post(&like_path)
            .bearer_auth(&token)
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["liked"], expected);
    }

    let comments: Value = app
        .get(&format!("/questions/{}/comments", question_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(comments[0]["likeCount"], 1);
    assert_eq!(comments[0]["isLiked"], true);

    let anonymous: Value = app
        .get(&format!("/questions/{}/comments", question_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(anonymous[0]["likeCount"], 1);
    assert_eq!(anonymous[0]["isLiked"], false);
}

#[tokio::test]
async fn comments_are_listed_newest_first() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let question_id = app.create_active_question(&admin, &["A", "B"]).await;
    let (_, token) = app.register("Dan", "dan@example.com").await;

    for content in ["first", "second"] {
        let response = app
            .post("/comments")
            .bearer_auth(&token)
            .json(&json!({ "questionId": question_id, "content": content }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 201);
    }

    let comments: Value = app
        .get(&format!("/questions/{}/comments", question_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(comments[0]["content"], "second");
    assert_eq!(comments[1]["content"], "first");
}

#[tokio::test]
async fn commenting_requires_login_and_valid_content() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let question_id = app.create_active_question(&admin, &["A", "B"]).await;
    let path = format!("/questions/{}/comments", question_id);

    let response = app
        .post(&path)
        .json(&json!({ "content": "hi" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);

    let (_, token) = app.register("Eve", "eve@example.com").await;
    for content in ["   ".to_string(), "x".repeat(1001)] {
        let response = app
            .post(&path)
            .bearer_auth(&token)
            .json(&json!({ "content": content }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 400);
    }

    let response = app
        .post("/questions/999/comments")
        .bearer_auth(&token)
        .json(&json!({ "content": "hello" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn liking_missing_comment_is_not_found() {
    let app = spawn_app().await;
    let (_, token) = app.register("Fay", "fay@example.com").await;
    let response = app
        .post("/comments/77/like")
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
    assert_eq!(app.post("/comments/77/like").send().await.unwrap().status(), 401);
}

#[tokio::test]
async fn comments_of_unknown_question_are_not_found() {
    let app = spawn_app().await;
    let response = app.get("/questions/404/comments").send().await.unwrap();
    assert_eq!(response.status(), 404);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Question not found");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn parallel_like_toggles_leave_a_consistent_count() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let question_id = app.create_active_question(&admin, &["A", "B"]).await;
    let (_, token) = app.register("Gil", "gil@example.com").await;

    let comment: Value = app
        .post(&format!("/questions/{}/comments", question_id))
        .bearer_auth(&token)
        .json(&json!({ "content": "race" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let like_path = format!("/comments/{}/like", comment["id"]);

    let handles: Vec<_> = (0..15)
        .map(|_| {
            let request = app.post(&like_path).bearer_auth(&token);
            tokio::spawn(async move {
                let response = request.send().await.unwrap();
                assert_eq!(response.status(), 200);
                let body: Value = response.json().await.unwrap();
                body["liked"].as_bool().unwrap()
            })
        })
        .collect();
    let mut liked = 0_i64;
    for handle in handles {
        if handle.await.unwrap() {
            liked += 1;
        } else {
            liked -= 1;
        }
    }

    let comments: Value = app
        .get(&format!("/questions/{}/comments", question_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let like_count = comments[0]["likeCount"].as_i64().unwrap();
    assert!(like_count == 0 || like_count == 1);
    assert_eq!(like_count, liked);
    assert_eq!(like_count, 1);
}
