//! Population pipeline tests: mock World Bank server through chart export.

use crate::error::AppError;
use crate::population::dataset::MAX_PAGES;
use crate::population::export::CHART_FILENAME;
use crate::population::{Observation, PopulationPipeline};
use serde_json::{json, Value};
use tempfile::tempdir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SERIES_PATH: &str = "/v2/country/WLD/indicator/SP.POP.TOTL";

/// World Bank shaped body; `None` values become `null`.
fn world_bank_page(page: u32, pages: u32, rows: &[(i32, Option<f64>)]) -> Value {
    let records: Vec<Value> = rows
        .iter()
        .map(|(year, value)| {
            json!({
                "indicator": {"id": "SP.POP.TOTL", "value": "Population, total"},
                "country": {"id": "1W", "value": "World"},
                "countryiso3code": "WLD",
                "date": year.to_string(),
                "value": value,
                "unit": "",
                "obs_status": "",
                "decimal": 0
            })
        })
        .collect();
    json!([
        {"page": page, "pages": pages, "per_page": rows.len(), "total": rows.len() * pages as usize},
        records
    ])
}

fn linear_population(year: i32) -> f64 {
    3_000_000_000.0 + 80_000_000.0 * (year - 1960) as f64
}

#[tokio::test]
async fn test_pipeline_fetches_all_pages_and_writes_chart() {
    let server = MockServer::start().await;

    let page_two: Vec<(i32, Option<f64>)> =
        (1960..1970).rev().map(|y| (y, Some(linear_population(y)))).collect();
    Mock::given(method("GET"))
        .and(path(SERIES_PATH))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(world_bank_page(2, 2, &page_two)))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;

    // Newest first with a missing latest value, as the live API returns.
    let mut page_one: Vec<(i32, Option<f64>)> = vec![(1980, None)];
    page_one.extend((1970..1980).rev().map(|y| (y, Some(linear_population(y)))));
    Mock::given(method("GET"))
        .and(path(SERIES_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(world_bank_page(1, 2, &page_one)))
        .expect(1)
        .mount(&server)
        .await;

    let out = tempdir().unwrap();
    let url = format!("{}{}?per_page=10&format=json", server.uri(), SERIES_PATH);
    let pipeline = PopulationPipeline::new(url, out.path(), 50).unwrap();

    let report = pipeline.run().await.unwrap();

    assert_eq!(report.observations, 20);
    assert_eq!(report.first_year, 1960);
    assert_eq!(report.last_year, 1979);
    assert!((report.fit.slope - 80_000_000.0).abs() < 1.0);

    let last = report.projected_to.unwrap();
    assert_eq!(last.year, 2029);
    assert!((last.population - linear_population(2029)).abs() <= 2.0);

    assert_eq!(report.chart_path, out.path().join(CHART_FILENAME));
    let svg = std::fs::read_to_string(&report.chart_path).unwrap();
    assert_eq!(svg.matches("<circle").count(), 20);
    assert!(svg.contains("World Population Growth Over Time"));
}

#[tokio::test]
async fn test_pipeline_rejects_dataset_without_values() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SERIES_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(world_bank_page(1, 1, &[(2020, None), (2021, None)])),
        )
        .mount(&server)
        .await;

    let out = tempdir().unwrap();
    let url = format!("{}{}?format=json", server.uri(), SERIES_PATH);
    let err = PopulationPipeline::new(url, out.path(), 50)
        .unwrap()
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Validation(msg) if msg.contains("no numeric observations")));
    assert!(!out.path().join(CHART_FILENAME).exists());
}

#[tokio::test]
async fn test_pipeline_surfaces_api_error_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SERIES_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"message": [{"id": "175", "key": "Invalid format", "value": "The indicator was not found"}]}
        ])))
        .mount(&server)
        .await;

    let out = tempdir().unwrap();
    let url = format!("{}{}?format=json", server.uri(), SERIES_PATH);
    let err = PopulationPipeline::new(url, out.path(), 50)
        .unwrap()
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Validation(msg) if msg.contains("indicator was not found")));
}

#[tokio::test]
async fn test_pipeline_refuses_absurd_page_count() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SERIES_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(world_bank_page(
            1,
            1_000_000_000,
            &[(2000, Some(6.1e9)), (2001, Some(6.2e9))],
        )))
        .expect(1)
        .mount(&server)
        .await;

    let out = tempdir().unwrap();
    let url = format!("{}{}?format=json", server.uri(), SERIES_PATH);
    let err = PopulationPipeline::new(url, out.path(), 50)
        .unwrap()
        .run()
        .await
        .unwrap_err();

    assert!(
        matches!(&err, AppError::Validation(msg) if msg.contains(&MAX_PAGES.to_string())),
        "got {:?}",
        err
    );
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_pipeline_http_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SERIES_PATH))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let out = tempdir().unwrap();
    let url = format!("{}{}", server.uri(), SERIES_PATH);
    let err = PopulationPipeline::new(url, out.path(), 50)
        .unwrap()
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Http(msg) if msg.contains("503")));
}

#[test]
fn test_build_chart_needs_two_years() {
    let pipeline = PopulationPipeline::new("http://localhost/unused", ".", 50).unwrap();
    let single = [Observation {
        year: 2000,
        population: 6.1e9,
    }];
    assert!(matches!(
        pipeline.build_chart(&single),
        Err(AppError::Validation(_))
    ));
}

#[test]
fn test_build_chart_projection_count() {
    let pipeline = PopulationPipeline::new("http://localhost/unused", ".", 7).unwrap();
    let observations: Vec<Observation> = (1990..2000)
        .map(|year| Observation {
            year,
            population: linear_population(year),
        })
        .collect();

    let build = pipeline.build_chart(&observations).unwrap();
    let years: Vec<i32> = build.projections.iter().map(|p| p.year).collect();
    assert_eq!(years, (2000..2007).collect::<Vec<_>>());
    assert!(build.svg.contains(r#"class="projection""#));
}
