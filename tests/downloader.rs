use pretty_assertions::assert_eq;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use exam_scraper::config::Config;
use exam_scraper::images::{DiagramDownloader, HttpDiagramDownloader};
use exam_scraper::models::{QuestionBlock, Section};
use exam_scraper::parsers::{DiagramResolver, QuestionParser};
use exam_scraper::restructure::aggregate;
use exam_scraper::utils::http::create_client;

#[tokio::test]
async fn downloads_each_url_once_and_counts_failures() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/images/qns/fig1.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0x89, 0x50, 0x4e, 0x47]))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/images/qns/fig2.gif"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"GIF89a".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let fig1 = format!("{}/images/qns/fig1.png", server.uri());
    let fig2 = format!("{}/images/qns/fig2.gif", server.uri());
    let missing = format!("{}/images/qns/missing.png", server.uri());

    let blocks = vec![
        QuestionBlock::new(Section::Objective, "1. Name part X. A. Root B. Stem", vec![fig1.clone()]),
        QuestionBlock::new(
            Section::Objective,
            "2. Name part Y. A. Leaf B. Bark",
            vec![fig1.clone(), missing.clone()],
        ),
        QuestionBlock::new(Section::Objective, "3. No figure here. A. Yes B. No", vec![]),
        QuestionBlock::new(Section::Theory, "1. Draw the cell shown.", vec![fig2.clone()]),
    ];
    let questions = QuestionParser::new(DiagramResolver::default()).parse_blocks(&blocks);
    let (record, _) = aggregate(&questions);

    let output = tempfile::tempdir().unwrap();
    let client = create_client(&Config::default()).unwrap();
    let downloader = HttpDiagramDownloader::new(client, output.path(), 1);
    let summary = downloader.download_all(&record).await;

    assert_eq!(summary.total_questions, 4);
    assert_eq!(summary.questions_with_diagrams, 3);
    assert_eq!(summary.objective_questions, 2);
    assert_eq!(summary.theory_questions, 1);
    assert_eq!(summary.total_images_expected, 4);
    assert_eq!(summary.downloaded_images_count, 3);
    assert_eq!(summary.failed_downloads, 1);
    assert_eq!(summary.downloaded_image_map.len(), 2);
    assert_eq!(
        summary.downloaded_image_map[&fig1],
        "images/objective/question_1/q1_diagram.png"
    );
    assert_eq!(
        summary.downloaded_image_map[&fig2],
        "images/theory/question_1/q1_diagram.gif"
    );

    let saved = std::fs::read(output.path().join("images/objective/question_1/q1_diagram.png")).unwrap();
    assert_eq!(saved, vec![0x89, 0x50, 0x4e, 0x47]);
    assert!(!output.path().join("images/objective/question_2").exists());
}

#[tokio::test]
async fn record_without_diagrams_downloads_nothing() {
    let blocks = vec![QuestionBlock::new(Section::Objective, "1. Pick one. A. Yes B. No", vec![])];
    let questions = QuestionParser::new(DiagramResolver::default()).parse_blocks(&blocks);
    let (record, _) = aggregate(&questions);

    let output = tempfile::tempdir().unwrap();
    let client = create_client(&Config::default()).unwrap();
    let summary = HttpDiagramDownloader::new(client, output.path(), 1)
        .download_all(&record)
        .await;

    assert_eq!(summary.total_questions, 1);
    assert_eq!(summary.total_images_expected, 0);
    assert_eq!(summary.success_rate(), 0.0);
    assert!(!output.path().join("images").exists());
}
