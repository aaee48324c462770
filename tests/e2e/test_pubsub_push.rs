use crate::e2e::helpers;

use helpers::fake_google::FAKE_MP3;
use helpers::fixtures::{item_attributes, push_envelope, push_path};
use helpers::{TestContext, TEST_PROJECT, TEST_TOKEN};
use hyper::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;
use test_context::test_context;

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_synthesize_upload_and_record_item_audio(ctx: &TestContext) {
    let response = ctx
        .client
        .post(&push_path(), &push_envelope(item_attributes("en-US", "item1", "loc1")))
        .await
        .unwrap();

    response.assert_status(StatusCode::NO_CONTENT);

    // Synthesis with the primary voice only
    let synth_calls = ctx.google.calls_labelled("POST synthesize");
    assert_eq!(synth_calls.len(), 1);
    assert_eq!(
        synth_calls[0].json(),
        json!({
            "input": { "text": "Hello" },
            "voice": {
                "languageCode": "en-US",
                "ssmlGender": "FEMALE",
                "name": "en-US-Wavenet-A"
            },
            "audioConfig": {
                "audioEncoding": "MP3",
                "sampleRateHertz": 48000,
                "effectsProfileId": ["handset-class-device"]
            }
        })
    );

    // Upload into the location bucket, private from the start
    let object = ctx
        .google
        .object("loc1", "items/en-US/audio/item1.mp3")
        .expect("object was not uploaded");
    assert_eq!(object.media, FAKE_MP3);
    assert_eq!(object.metadata["contentType"], "audio/mpeg");
    assert_eq!(object.metadata["cacheControl"], "public, max-age=31536000");
    assert_eq!(object.predefined_acl.as_deref(), Some("projectPrivate"));

    // Record update on items/item1
    let commits = ctx.google.calls_labelled("POST commit");
    assert_eq!(commits.len(), 1);
    assert_eq!(
        commits[0].path,
        format!("/v1/projects/{}/databases/(default)/documents:commit", TEST_PROJECT)
    );
    let write = &commits[0].json()["writes"][0];
    assert_eq!(
        write["update"]["name"],
        format!("projects/{}/databases/(default)/documents/items/item1", TEST_PROJECT)
    );
    assert_eq!(
        write["update"]["fields"]["multimedia"]["mapValue"]["fields"]["itemDescriptionAudioPath"]
            ["stringValue"],
        "loc1/items/en-US/audio/item1.mp3"
    );
    assert_eq!(
        write["updateTransforms"][0],
        json!({ "fieldPath": "lastTextToSpeechDate", "setToServerValue": "REQUEST_TIME" })
    );

    // Every Google call is authenticated and billed to the project
    for call in ctx.google.calls() {
        assert_eq!(
            call.authorization.as_deref(),
            Some(format!("Bearer {}", TEST_TOKEN).as_str())
        );
    }
    let upload = &ctx.google.calls_labelled("POST upload")[0];
    assert_eq!(upload.query_param("userProject"), Some(TEST_PROJECT));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_call_services_in_pipeline_order(ctx: &TestContext) {
    ctx.client
        .post(&push_path(), &push_envelope(item_attributes("en-US", "item1", "loc1")))
        .await
        .unwrap()
        .assert_status(StatusCode::NO_CONTENT);

    let labels: Vec<String> = ctx.google.calls().iter().map(|c| c.label()).collect();
    assert_eq!(
        labels,
        vec![
            "POST synthesize",
            "GET bucket",
            "POST create_bucket",
            "POST upload",
            "PATCH bucket",
            "POST commit",
        ]
    );
    assert!(ctx.google.has_bucket("loc1"));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_not_create_existing_bucket(ctx: &TestContext) {
    ctx.google.add_bucket("loc1");

    ctx.client
        .post(&push_path(), &push_envelope(item_attributes("en-US", "item1", "loc1")))
        .await
        .unwrap()
        .assert_status(StatusCode::NO_CONTENT);

    assert!(ctx.google.calls_labelled("POST create_bucket").is_empty());
    assert!(ctx.google.object("loc1", "items/en-US/audio/item1.mp3").is_some());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_fall_back_to_standard_voice(ctx: &TestContext) {
    ctx.google.reject_voice("ko-KR-Wavenet-A");

    ctx.client
        .post(&push_path(), &push_envelope(item_attributes("ko-KR", "item9", "loc1")))
        .await
        .unwrap()
        .assert_status(StatusCode::NO_CONTENT);

    let voices: Vec<String> = ctx
        .google
        .calls_labelled("POST synthesize")
        .iter()
        .map(|c| c.json()["voice"]["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(voices, vec!["ko-KR-Wavenet-A", "ko-KR-Standard-A"]);

    // Upload still proceeds
    assert!(ctx.google.object("loc1", "items/ko-KR/audio/item9.mp3").is_some());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_skip_upload_and_record_when_both_voices_fail(ctx: &TestContext) {
    ctx.google.reject_voice("en-US-Wavenet-A");
    ctx.google.reject_voice("en-US-Standard-A");

    let response = ctx
        .client
        .post(&push_path(), &push_envelope(item_attributes("en-US", "item1", "loc1")))
        .await
        .unwrap();

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(ctx.google.calls_labelled("POST synthesize").len(), 2);
    assert!(ctx.google.calls_labelled("POST upload").is_empty());
    assert!(ctx.google.calls_labelled("POST commit").is_empty());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_not_record_when_upload_fails(ctx: &TestContext) {
    ctx.google.fail_uploads();

    let response = ctx
        .client
        .post(&push_path(), &push_envelope(item_attributes("en-US", "item1", "loc1")))
        .await
        .unwrap();

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(ctx.google.calls_labelled("POST upload").len(), 1);
    assert!(ctx.google.calls_labelled("PATCH bucket").is_empty());
    assert!(ctx.google.calls_labelled("POST commit").is_empty());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_request_redelivery_when_record_update_fails(ctx: &TestContext) {
    ctx.google.fail_commits();

    ctx.client
        .post(&push_path(), &push_envelope(item_attributes("en-US", "missing", "loc1")))
        .await
        .unwrap()
        .assert_status(StatusCode::INTERNAL_SERVER_ERROR);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_acknowledge_and_drop_malformed_events(ctx: &TestContext) {
    let cases = vec![
        json!({ "languageCode": "en-US", "descriptionText": "Hello", "itemId": "item1" }),
        json!({ "languageCode": "en_US", "descriptionText": "Hello", "itemId": "item1", "locationId": "loc1" }),
        json!({ "languageCode": "en-US", "descriptionText": "Hello", "itemId": "a/b", "locationId": "loc1" }),
        json!({ "languageCode": "en-US", "descriptionText": "Hello", "itemId": "item1", "locationId": "Loc 1" }),
        json!({}),
    ];

    for attributes in cases {
        ctx.client
            .post(&push_path(), &push_envelope(attributes))
            .await
            .unwrap()
            .assert_status(StatusCode::NO_CONTENT);
    }

    assert!(ctx.google.calls().is_empty());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_acknowledge_item_ids_that_can_never_be_stored(ctx: &TestContext) {
    let too_long = "a".repeat(1501);
    for item_id in [too_long.as_str(), "item\u{0}1", "..", "__items__", " item1"] {
        ctx.client
            .post(&push_path(), &push_envelope(item_attributes("en-US", item_id, "loc1")))
            .await
            .unwrap()
            .assert_status(StatusCode::NO_CONTENT);
    }

    assert!(ctx.google.calls().is_empty());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_publish_long_item_ids_within_document_id_limit(ctx: &TestContext) {
    let item_id = "a".repeat(300);

    ctx.client
        .post(&push_path(), &push_envelope(item_attributes("en-US", &item_id, "loc1")))
        .await
        .unwrap()
        .assert_status(StatusCode::NO_CONTENT);

    let object = ctx
        .google
        .object("loc1", &format!("items/en-US/audio/{}.mp3", item_id))
        .expect("object uploaded");
    assert_eq!(object.media, FAKE_MP3);
    assert_eq!(ctx.google.calls_labelled("POST commit").len(), 1);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_push_without_valid_token(ctx: &TestContext) {
    let envelope = push_envelope(item_attributes("en-US", "item1", "loc1"));

    ctx.client
        .post("/pubsub/push", &envelope)
        .await
        .unwrap()
        .assert_status(StatusCode::UNAUTHORIZED);

    ctx.client
        .post("/pubsub/push?token=wrong", &envelope)
        .await
        .unwrap()
        .assert_status(StatusCode::UNAUTHORIZED);

    assert!(ctx.google.calls().is_empty());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_leave_no_scratch_files_behind(ctx: &TestContext) {
    for item in ["item1", "item2"] {
        ctx.client
            .post(&push_path(), &push_envelope(item_attributes("en-US", item, "loc1")))
            .await
            .unwrap()
            .assert_status(StatusCode::NO_CONTENT);
    }

    let scratch = ctx.scratch_dir.path().join("synthesized");
    assert_eq!(std::fs::read_dir(scratch).unwrap().count(), 0);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_overwrite_same_object_on_redelivery(ctx: &TestContext) {
    for _ in 0..2 {
        ctx.client
            .post(&push_path(), &push_envelope(item_attributes("en-US", "item1", "loc1")))
            .await
            .unwrap()
            .assert_status(StatusCode::NO_CONTENT);
    }

    let uploads = ctx.google.calls_labelled("POST upload");
    assert_eq!(uploads.len(), 2);
    assert_eq!(uploads[0].path, uploads[1].path);
    assert_eq!(ctx.google.calls_labelled("POST commit").len(), 2);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_isolate_concurrent_invocations(ctx: &TestContext) {
    ctx.google.add_bucket("loc1");

    let mut futures = Vec::new();
    for i in 0..8 {
        let client = ctx.client.clone();
        futures.push(async move {
            client
                .post(
                    &push_path(),
                    &push_envelope(item_attributes("en-US", &format!("item{}", i), "loc1")),
                )
                .await
        });
    }

    for result in futures::future::join_all(futures).await {
        result.unwrap().assert_status(StatusCode::NO_CONTENT);
    }

    for i in 0..8 {
        let object = ctx
            .google
            .object("loc1", &format!("items/en-US/audio/item{}.mp3", i))
            .expect("missing object");
        assert_eq!(object.media, FAKE_MP3);
    }
    assert_eq!(ctx.google.calls_labelled("POST commit").len(), 8);
}
