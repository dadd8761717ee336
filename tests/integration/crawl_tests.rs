//! Integration tests for the crawler
//!
//! These tests use wiremock to serve a small catalog site and test the full
//! crawl cycle end-to-end, from menu discovery to the CSV file.

use catalog_walker::config::{Config, LoggingConfig, OutputConfig, RestartConfig};
use catalog_walker::crawler::{crawl, crawl_and_export, Coordinator, Fetcher, MISSING_NAME};
use catalog_walker::output::{CsvExporter, CSV_HEADER};
use catalog_walker::CatalogError;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration crawling `base_url` into `output_dir`
fn create_test_config(base_url: &str, categories: &[&str], output_dir: &Path) -> Config {
    Config {
        url: base_url.to_string(),
        categories: categories.iter().map(|c| c.to_string()).collect(),
        delay_range_s: [0.0, 0.0],
        restart: RestartConfig {
            restart_count: 2,
            interval_m: 0.0,
        },
        max_retries: 2,
        pattern_sub_menu: "^lvl[0-9]".to_string(),
        page_size: 60,
        user_agent: "TestBot/1.0".to_string(),
        output: OutputConfig {
            output_directory: output_dir.display().to_string(),
            filename_output: "products.csv".to_string(),
        },
        logging: LoggingConfig::default(),
    }
}

async fn mount_page(server: &MockServer, page_path: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

fn listing(products: &[&str], navigation: &str) -> String {
    let links: String = products
        .iter()
        .map(|p| format!(r#"<div class="item"><a class="name" href="{}">{}</a></div>"#, p, p))
        .collect();
    format!(
        r#"<html><body><div class="catalog-section">{}{}</div></body></html>"#,
        links, navigation
    )
}

/// One offer row: `(article, barcode, packaging, price, promo, available)`
type Offer<'a> = (&'a str, &'a str, &'a str, &'a str, Option<&'a str>, bool);

fn product(name: Option<&str>, country: &str, images: &[&str], offers: &[Offer<'_>]) -> String {
    let title = name
        .map(|n| format!(r#"<div class="catalog-element-right"><h1>{}</h1></div>"#, n))
        .unwrap_or_default();
    let images: String = images
        .iter()
        .map(|href| format!(r#"<a rel="groupimg" href="{}"><img></a>"#, href))
        .collect();
    let rows: String = offers
        .iter()
        .map(|(article, barcode, packaging, price, promo, available)| {
            let price = match promo {
                Some(promo) => format!("<s>{}</s> <span>{}</span>", price, promo),
                None => format!("<span>{}</span>", price),
            };
            let basket = if *available {
                "<span>В корзину</span>"
            } else {
                "<span>Нет в наличии</span>"
            };
            format!(
                r#"<tr class="b-catalog-element-offer">
                    <td><p><b>Артикул:</b> <b>{}</b></p></td>
                    <td><p><b>Штрихкод:</b> <b>{}</b></p></td>
                    <td><p><b>Фасовка:</b> <b>{}</b></p></td>
                    <td><p><b>Цена:</b> {}</p></td>
                    <td>{}</td>
                </tr>"#,
                article, barcode, packaging, price, basket
            )
        })
        .collect();

    format!(
        r#"<html><body><div class="catalog-detail">
            {}
            <div class="catalog-element-offer-left"><p>Страна производства: {}</p></div>
            {}
            <table class="b-catalog-element-offers-table">{}</table>
        </div></body></html>"#,
        title, country, images, rows
    )
}

/// Mounts a catalog with two allowed top-level categories and one ignored one
async fn mount_catalog(server: &MockServer) {
    mount_page(
        server,
        "/",
        r#"<html><body><div id="catalog-menu">
            <a class="catalog-menu-icon" title="Dogs" href="/catalog/dogs/"></a>
            <a class="catalog-menu-icon" title="Fish" href="/catalog/fish/"></a>
            <a class="catalog-menu-icon" title="Cats" href="/catalog/cats/"></a>
        </div></body></html>"#
            .to_string(),
    )
    .await;

    // Not on the allow-list, must never be requested
    Mock::given(method("GET"))
        .and(path("/catalog/fish/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(server)
        .await;

    mount_page(
        server,
        "/catalog/dogs/",
        r#"<html><body><div class="catalog-menu-left">
            <a class="lvl2" href="/catalog/dogs/food/">Food</a>
            <a class="lvl3" href="/catalog/dogs/food/dry/">Dry food</a>
            <a class="lvl2" href="/catalog/dogs/toys/">Toys</a>
            <a class="banner" href="/promo/">Promo</a>
        </div></body></html>"#
            .to_string(),
    )
    .await;

    mount_page(
        server,
        "/catalog/cats/",
        r#"<html><body><div class="catalog-menu-left">
            <a class="lvl2" href="/catalog/cats/beds/">Beds</a>
        </div></body></html>"#
            .to_string(),
    )
    .await;

    // Two listing pages for dry food
    mount_page(
        server,
        "/catalog/dogs/food/dry/",
        listing(
            &["/p/kibble/", "/p/biscuits/"],
            r#"<div class="navigation"><span>1</span><a href="/catalog/dogs/food/dry/page-2/">2</a></div>"#,
        ),
    )
    .await;
    mount_page(
        server,
        "/catalog/dogs/food/dry/page-2/",
        listing(
            &["/p/bone/"],
            r#"<div class="navigation"><a href="/catalog/dogs/food/dry/">1</a><span>2</span></div>"#,
        ),
    )
    .await;

    mount_page(server, "/catalog/dogs/toys/", listing(&["/p/ball/"], "")).await;
    mount_page(server, "/catalog/cats/beds/", listing(&["/p/bed/"], "")).await;

    mount_page(
        server,
        "/p/kibble/",
        product(
            Some("Kibble"),
            "Russia",
            &["/img/kibble-1.jpg", "/img/kibble-2.jpg", "/img/kibble-1.jpg"],
            &[("A1", "B1", "2 кг", "900", Some("850"), true)],
        ),
    )
    .await;

    mount_page(
        server,
        "/p/biscuits/",
        product(
            None,
            "Italy",
            &[],
            &[("A2", "B2", "500 мл", "120", None, false)],
        ),
    )
    .await;

    mount_page(
        server,
        "/p/bone/",
        product(
            Some("Bone"),
            "Germany",
            &["/img/bone.jpg"],
            &[("A3", "B3, B4", "1 шт", "60", None, true)],
        ),
    )
    .await;

    // Same offer as the kibble page plus a row without any identity
    mount_page(
        server,
        "/p/ball/",
        product(
            Some("Ball"),
            "China",
            &[],
            &[
                ("A1", "B1", "2 кг", "900", None, true),
                ("", "", "1 шт", "10", None, true),
            ],
        ),
    )
    .await;

    mount_page(
        server,
        "/p/bed/",
        product(
            Some("Bed"),
            "Poland",
            &[],
            &[("A5", "", "1 шт", "2500", None, true)],
        ),
    )
    .await;
}

fn read_rows(path: &Path) -> Vec<csv::StringRecord> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .quote(b'|')
        .from_path(path)
        .expect("Failed to open CSV output");

    let header = reader.headers().expect("Missing CSV header").clone();
    assert_eq!(header.iter().collect::<Vec<_>>(), CSV_HEADER.to_vec());

    reader
        .records()
        .map(|r| r.expect("Malformed CSV row"))
        .collect()
}

#[tokio::test]
async fn test_full_crawl_exports_deduplicated_rows() {
    let mock_server = MockServer::start().await;
    mount_catalog(&mock_server).await;
    let base_url = mock_server.uri();

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let output_dir = temp_dir.path().join("out");
    let config = create_test_config(&base_url, &["Dogs", "Cats"], &output_dir);
    let output_path = config.output_path();

    let stats = crawl(config).await.expect("Crawl failed");

    assert_eq!(stats.top_level_categories, 2);
    assert_eq!(stats.leaf_categories, 3);
    assert_eq!(stats.product_pages, 5);
    assert_eq!(stats.products, 5);
    assert_eq!(stats.skipped_duplicates, 1);
    assert_eq!(stats.skipped_without_identity, 1);
    assert_eq!(stats.rows_written, 5);

    let rows = read_rows(&output_path);
    assert_eq!(rows.len(), 5);

    // Leaves in discovery order: dry food (two pages), toys, beds
    let articles: Vec<&str> = rows.iter().map(|r| &r[5]).collect();
    assert_eq!(articles, vec!["A1", "A2", "A3", "A3", "A5"]);

    let kibble = &rows[0];
    assert_eq!(&kibble[1], "900");
    assert_eq!(&kibble[2], "850");
    assert_eq!(&kibble[3], "1");
    assert_eq!(&kibble[4], "B1");
    assert_eq!(&kibble[6], "Kibble");
    assert_eq!(&kibble[7], "Dogs|Food|Dry food");
    assert_eq!(&kibble[8], "Russia");
    assert_eq!(&kibble[9], "2 кг");
    assert_eq!(&kibble[12], format!("{}/p/kibble/", base_url));
    assert_eq!(
        &kibble[13],
        format!(
            "{}/img/kibble-1.jpg,{}/img/kibble-2.jpg",
            base_url, base_url
        )
    );

    let biscuits = &rows[1];
    assert_eq!(&biscuits[6], MISSING_NAME);
    assert_eq!(&biscuits[3], "0");
    assert_eq!(&biscuits[2], "");
    assert_eq!(&biscuits[10], "500 мл");

    // Multi-barcode offer expands into one row per barcode
    assert_eq!(&rows[2][4], "B3");
    assert_eq!(&rows[3][4], "B4");
    assert_eq!(&rows[2][11], "1 шт");

    let bed = &rows[4];
    assert_eq!(&bed[4], "");
    assert_eq!(&bed[7], "Cats|Beds");

    mock_server.verify().await;
}

#[tokio::test]
async fn test_discovery_respects_allow_list() {
    let mock_server = MockServer::start().await;
    mount_catalog(&mock_server).await;

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(&mock_server.uri(), &["Cats"], temp_dir.path());

    let mut coordinator = Coordinator::from_config(config).expect("Failed to create coordinator");
    let leaves = coordinator
        .discover_categories()
        .await
        .expect("Discovery failed");

    assert_eq!(leaves.len(), 1);
    assert_eq!(leaves[0].url, "/catalog/cats/beds/");
    assert_eq!(leaves[0].category.path(), "Cats|Beds");

    mock_server.verify().await;
}

#[tokio::test]
async fn test_unreachable_site_aborts_without_export() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .expect(4)
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(&mock_server.uri(), &["Dogs"], temp_dir.path());
    let output_path = config.output_path();

    let fetcher = Fetcher::new(&config).expect("Failed to build fetcher");
    let mut coordinator = Coordinator::new(config, fetcher).expect("Failed to create coordinator");
    let exporter = CsvExporter::new(&output_path);

    let result = crawl_and_export(&mut coordinator, &exporter).await;

    match result {
        Err(CatalogError::ConnectionFailure {
            restarts, attempts, ..
        }) => {
            assert_eq!(restarts, 2);
            assert_eq!(attempts, 4);
        }
        other => panic!("expected ConnectionFailure, got {:?}", other),
    }
    assert!(!output_path.exists());

    mock_server.verify().await;
}
