//! End-to-end scenarios against the live demoqa site.
//!
//! Run with: cargo test -p pagewright-suite --test e2e -- --ignored

use pagewright::{Browser, HelperConfig, StealthConfig};
use pagewright_suite::{data, AccountApi, BasePage, FormEntry, Scenario, SuiteConfig, TextBoxPage};

const BASE_URL: &str = "https://demoqa.com";

/// Check if Chrome is available
fn chrome_available() -> bool {
    eoka::stealth::patcher::find_chrome().is_ok()
}

#[test]
fn test_bundled_suite_file_is_valid() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/configs/demoqa.yaml");
    let config = SuiteConfig::load(path).expect("bundled suite should load");
    assert_eq!(config.name, "demoqa");
    assert!(config.base_url.starts_with("http"));
    assert_eq!(config.scenarios, vec![Scenario::TextBox, Scenario::Account]);
    assert!(config.data.contains_key("permanent_address"));
}

#[tokio::test]
#[ignore = "requires Chrome"]
async fn test_text_box_form_round_trip() {
    if !chrome_available() {
        eprintln!("Chrome not found, skipping test");
        return;
    }

    let browser = Browser::launch_with_config(StealthConfig {
        headless: true,
        viewport_width: 1920,
        viewport_height: 1080,
        ..Default::default()
    })
    .await
    .expect("Failed to launch browser");
    let page = browser
        .new_page("about:blank")
        .await
        .expect("Failed to create page");

    let mut rng = rand::thread_rng();
    let entry = FormEntry {
        full_name: data::full_name(&mut rng),
        email: data::email(&mut rng),
        current_address: data::street_address(&mut rng),
        permanent_address: "4 Privet Drive".into(),
    };
    drop(rng);

    let text_box = TextBoxPage::new(BasePage::new(&page, HelperConfig::default()));
    text_box
        .fill_in_text_box(&format!("{}/text-box", BASE_URL), &entry)
        .await
        .expect("Failed to fill form");
    text_box
        .validate_fill_in_text_box(&entry)
        .await
        .expect("Receipt should match");

    browser.close().await.expect("Failed to close browser");
}

#[tokio::test]
#[ignore = "requires network"]
async fn test_account_lifecycle() {
    let mut api = AccountApi::new(BASE_URL);
    let user_name = data::username(&mut rand::thread_rng());
    let password = api.password().to_string();

    let created = api
        .create_user(&user_name, &password)
        .await
        .expect("Failed to create user");
    assert_eq!(created.username, user_name);

    let token = api
        .generate_token(&user_name, &password)
        .await
        .expect("Failed to generate token");
    assert!(token.token.is_some(), "{}", token.result);

    let fetched = api
        .get_user(&created.user_id)
        .await
        .expect("Failed to get user");
    assert_eq!(fetched.username, user_name);
}
