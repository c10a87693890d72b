// SPDX-License-Identifier: Apache-2.0

//! Exercise extraction end to end against a mock platform.

mod common;

use std::time::Duration;

use eadconnect_core::{ExerciseCourse, ExerciseExtractor, ExerciseSet, FontSource};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn course() -> ExerciseCourse {
    ExerciseCourse {
        id: 100,
        title: "Fundamentos de Redes".to_string(),
        slug: "redes".to_string(),
    }
}

fn topic_body(questions: usize) -> serde_json::Value {
    let question = json!({
        "enunciated": "<p>Qual camada roteia pacotes?</p>",
        "options": [
            {"text": "Enlace", "isCorrect": false, "feedback": ""},
            {"text": "Rede", "isCorrect": true, "feedback": "<b>IP</b> roteia."}
        ]
    });
    json!({
        "topics": [{}, {}, {}, {}, {"content": {"questions": vec![question; questions]}}]
    })
}

#[tokio::test]
async fn extracts_json_pdf_and_archives() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/plataforma/content/academics-main/100/contents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "topics": [
                {"children": []},
                {"children": []},
                {"children": [
                    {"id": 11, "title": "Aula 1"},
                    {"id": 12, "title": "Aula 2"},
                    {"id": 13, "title": "Sem exercícios"}
                ]}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/plataforma/content/academics-main/100/topics/11"))
        .respond_with(ResponseTemplate::new(200).set_body_json(topic_body(2)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/plataforma/content/academics-main/100/topics/12"))
        .respond_with(ResponseTemplate::new(200).set_body_json(topic_body(3)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/plataforma/content/academics-main/100/topics/13"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"topics": []})))
        .mount(&server)
        .await;

    let client = common::authed_client(&server);
    let out = tempfile::tempdir().unwrap();
    let extractor =
        ExerciseExtractor::new(&client, out.path(), Duration::ZERO).with_fonts(FontSource::Builtin);

    let summary = extractor.extract_course(&course()).await.unwrap();

    assert_eq!(summary.topics, 2);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.questions, 5);

    let dumped: ExerciseSet = serde_json::from_str(
        &std::fs::read_to_string(out.path().join("json/redes/11.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(dumped.discipline, "Fundamentos de Redes");
    assert_eq!(dumped.title, "Aula 1");

    assert!(out.path().join("pdfs/redes/Aula 1.pdf").exists());
    assert!(out.path().join("pdfs/redes/Aula 2.pdf").exists());
    assert_eq!(summary.json_archive, Some(out.path().join("json/redes.zip")));
    assert_eq!(summary.pdf_archive, Some(out.path().join("pdfs/redes.zip")));
    assert!(out.path().join("json/redes.zip").exists());
    assert!(out.path().join("pdfs/redes.zip").exists());
}

#[tokio::test]
async fn api_failure_aborts_course() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/plataforma/content/academics-main/100/contents"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = common::authed_client(&server);
    let out = tempfile::tempdir().unwrap();
    let extractor = ExerciseExtractor::new(&client, out.path(), Duration::ZERO);

    assert!(extractor.extract_course(&course()).await.is_err());
}

#[tokio::test]
async fn topic_without_question_list_is_skipped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/plataforma/content/academics-main/100/contents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "topics": [
                {"children": []},
                {"children": []},
                {"children": [
                    {"id": 21, "title": "Leitura"},
                    {"id": 22, "title": "Aula 2"}
                ]}
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/plataforma/content/academics-main/100/topics/21"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "topics": [{}, {}, {}, {}, {"content": {"html": "<p>texto</p>"}}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/plataforma/content/academics-main/100/topics/22"))
        .respond_with(ResponseTemplate::new(200).set_body_json(topic_body(1)))
        .mount(&server)
        .await;

    let client = common::authed_client(&server);
    let out = tempfile::tempdir().unwrap();
    let extractor =
        ExerciseExtractor::new(&client, out.path(), Duration::ZERO).with_fonts(FontSource::Builtin);

    let summary = extractor.extract_course(&course()).await.unwrap();

    assert_eq!(summary.topics, 1);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.questions, 1);
    assert!(!out.path().join("json/redes/21.json").exists());
    assert!(out.path().join("json/redes/22.json").exists());
    assert!(out.path().join("json/redes.zip").exists());
}
