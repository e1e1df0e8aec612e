use pretty_assertions::assert_eq;
use std::sync::Arc;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use exam_scraper::config::Config;
use exam_scraper::runner::{run_batch, Combination};
use exam_scraper::scrapers::{ExamScraper, KuulchatScraper};
use exam_scraper::utils::http::create_client;

const FIRST_PAGE: &str = r#"
    <html><body>
    <h4 class="center">OBJECTIVE TEST</h4>
    <div>
        <div>1. Which organ pumps blood? A. Heart B. Lung C. Liver D. Kidney Solution A. Heart</div>
        <div>2. Identify the part labelled X. A. Root B. Stem C. Leaf D. Flower
            <img src="/images/qns/plant.png">
            <img src="/images/banner-ad.png">
        </div>
    </div>
    <ul class="pagination"><li><a href="?page=2">Next</a></li></ul>
    </body></html>
"#;

const SECOND_PAGE: &str = r#"
    <html><body>
    <h4 class="center">THEORY QUESTIONS</h4>
    <div>
        <div>1. (a) Define respiration (b) State one product Show Solution (a) release of energy (b) carbon dioxide</div>
        <div>Sponsored: affordable website design</div>
    </div>
    </body></html>
"#;

fn test_config(server: &MockServer, output: &std::path::Path) -> Config {
    Config {
        base_url: format!("{}/bece/questions/", server.uri()),
        max_retries: 1,
        download_delay_ms: 0,
        output_dir: output.to_path_buf(),
        ..Config::default()
    }
}

#[tokio::test]
async fn scraper_follows_pagination() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/bece/questions/science-2022/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(FIRST_PAGE))
        .mount(&server)
        .await;

    let output = tempfile::tempdir().unwrap();
    let config = Arc::new(test_config(&server, output.path()));
    let client = create_client(&config).unwrap();
    let scraper = KuulchatScraper::new(config.clone());

    let blocks = scraper.scrape(&client, "science", "2022").await.unwrap();
    // `?page=2` resolves to the same path, so the second page is served the
    // first page's HTML and the loop stops on the repeated next link.
    assert_eq!(blocks.len(), 4);
}

#[tokio::test]
async fn scraper_stops_at_page_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/bece/questions/science-2022/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><body><a class="next" href="more/">Next</a></body></html>"#,
        ))
        .expect(2)
        .mount(&server)
        .await;

    let output = tempfile::tempdir().unwrap();
    let config = Arc::new(Config {
        max_pages: 2,
        ..test_config(&server, output.path())
    });
    let client = create_client(&config).unwrap();
    let scraper = KuulchatScraper::new(config.clone());

    let blocks = scraper.scrape(&client, "science", "2022").await.unwrap();
    assert!(blocks.is_empty());

    let requested: Vec<String> = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|request| request.url.path().to_string())
        .collect();
    assert_eq!(
        requested,
        vec!["/bece/questions/science-2022/", "/bece/questions/science-2022/more/"]
    );
}

#[tokio::test]
async fn batch_keeps_going_after_a_failed_unit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/bece/questions/science-2022/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(FIRST_PAGE.replace("?page=2", "page/2/")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/bece/questions/science-2022/page/2/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SECOND_PAGE))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/images/qns/plant.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"png".to_vec()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/bece/questions/mathematics-2022/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body>Coming soon</body></html>"))
        .mount(&server)
        .await;

    let output = tempfile::tempdir().unwrap();
    let config = Arc::new(test_config(&server, output.path()));
    let client = create_client(&config).unwrap();
    let scraper = KuulchatScraper::new(config.clone());

    let summary = run_batch(
        &config,
        &client,
        &scraper,
        vec![
            Combination::new("english", "2022"),
            Combination::new("mathematics", "2022"),
            Combination::new("science", "2022"),
        ],
    )
    .await;

    assert!(!summary.is_success());
    assert_eq!(summary.succeeded, vec![Combination::new("science", "2022")]);
    let failed: Vec<&Combination> = summary.failed.iter().map(|(c, _)| c).collect();
    assert_eq!(
        failed,
        vec![&Combination::new("english", "2022"), &Combination::new("mathematics", "2022")]
    );
    assert!(summary.failed[1].1.contains("no questions extracted"));

    let dir = output.path().join("science_2022");
    let record: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.join("science_2022.json")).unwrap()).unwrap();
    assert_eq!(record["objectives"].as_array().unwrap().len(), 2);
    assert_eq!(record["objectives"][0]["answer"], "A");
    assert_eq!(record["theory"][0]["subparts"][1]["solution"], "carbon dioxide");
    assert_eq!(
        record["objectives"][1]["diagrams"][0],
        format!("{}/images/qns/plant.png", server.uri())
    );

    assert!(dir.join("science_2022.csv").exists());
    assert!(dir.join("images/objective/question_2/q2_diagram.png").exists());
    let report = std::fs::read_to_string(dir.join("reports/science_2022_image_download_report.txt")).unwrap();
    assert!(report.contains("  Success Rate: 100.00%"));
}
