//! Integration tests for pagewright against a real browser.
//!
//! These tests require Chrome to be installed and available.
//! Run with: cargo test --test integration -- --ignored

use pagewright::{Browser, Error, HelperConfig, InteractionHelper, RecordingSink, Scope};
use std::sync::Arc;

/// Check if Chrome is available
fn chrome_available() -> bool {
    eoka::stealth::patcher::find_chrome().is_ok()
}

const FORM: &str = r#"data:text/html,
    <input id="userName" type="text">
    <input id="userEmail" type="email" value="old@example.com">
    <input id="locked" type="text" disabled>
    <input id="ghost" type="text" style="visibility:hidden">
    <button class="dup">A</button><button class="dup">B</button>
    <div aria-hidden="true"><button id="carousel-next">Next</button></div>
    <button id="submit" onclick="document.getElementById('name').textContent = 'Name:' + document.getElementById('userName').value">Submit</button>
    <p id="name"></p>
    <div style="height:3000px"></div>
    <p id="footer">Footer</p>
"#;

#[tokio::test]
#[ignore = "requires Chrome"]
async fn test_type_click_and_read_back() {
    if !chrome_available() {
        eprintln!("Chrome not found, skipping test");
        return;
    }

    let browser = Browser::launch().await.expect("Failed to launch browser");
    let page = browser
        .new_page("about:blank")
        .await
        .expect("Failed to create page");
    page.goto(FORM).await.expect("Failed to navigate");

    let sink = RecordingSink::new();
    let helper = InteractionHelper::with_sink(
        &page,
        HelperConfig::with_timeout_ms(2_000),
        Arc::new(sink.clone()),
    );

    helper
        .send_keys("#userName", "Jane Doe", false)
        .await
        .expect("Failed to type");
    helper
        .click_element("//button[@id='submit']")
        .await
        .expect("Failed to click");
    let text = helper
        .get_element_text("//p[@id='name']", Some("Name:Jane Doe"))
        .await
        .expect("Failed to read text");
    assert_eq!(text, "Name:Jane Doe");
    assert!(sink.alerts().is_empty(), "alerts: {:?}", sink.alerts());

    browser.close().await.expect("Failed to close browser");
}

#[tokio::test]
#[ignore = "requires Chrome"]
async fn test_send_keys_replaces_existing_value() {
    if !chrome_available() {
        eprintln!("Chrome not found, skipping test");
        return;
    }

    let browser = Browser::launch().await.expect("Failed to launch browser");
    let page = browser
        .new_page("about:blank")
        .await
        .expect("Failed to create page");
    page.goto(FORM).await.expect("Failed to navigate");

    let helper = InteractionHelper::new(&page, HelperConfig::with_timeout_ms(2_000));
    helper
        .send_keys("#userEmail", "hello@example.com", false)
        .await
        .expect("Failed to type");

    let value: String = page
        .evaluate("document.getElementById('userEmail').value")
        .await
        .expect("Failed to read value");
    assert_eq!(value, "hello@example.com");

    browser.close().await.expect("Failed to close browser");
}

#[tokio::test]
#[ignore = "requires Chrome"]
async fn test_validation_failures() {
    if !chrome_available() {
        eprintln!("Chrome not found, skipping test");
        return;
    }

    let browser = Browser::launch().await.expect("Failed to launch browser");
    let page = browser
        .new_page("about:blank")
        .await
        .expect("Failed to create page");
    page.goto(FORM).await.expect("Failed to navigate");

    let helper = InteractionHelper::new(&page, HelperConfig::with_timeout_ms(300));

    let err = helper.locate_element("#nope").await.unwrap_err();
    assert!(matches!(err.root_cause(), Error::NotFound { count: 0, .. }));

    let err = helper.locate_element(".dup").await.unwrap_err();
    assert!(matches!(err.root_cause(), Error::NotFound { count: 2, .. }));

    let err = helper.locate_element("#locked").await.unwrap_err();
    assert!(matches!(err.root_cause(), Error::NotEnabled { .. }));

    let err = helper.locate_element("#ghost").await.unwrap_err();
    assert!(matches!(err.root_cause(), Error::NotVisible { .. }));

    // aria-hidden only affects the accessibility tree; the button is rendered
    helper
        .click_element("#carousel-next")
        .await
        .expect("aria-hidden wrapper should not block the button");

    browser.close().await.expect("Failed to close browser");
}

#[tokio::test]
#[ignore = "requires Chrome"]
async fn test_scroll_to_element() {
    if !chrome_available() {
        eprintln!("Chrome not found, skipping test");
        return;
    }

    let browser = Browser::launch().await.expect("Failed to launch browser");
    let page = browser
        .new_page("about:blank")
        .await
        .expect("Failed to create page");
    page.goto(FORM).await.expect("Failed to navigate");

    let helper = InteractionHelper::new(&page, HelperConfig::with_timeout_ms(2_000));
    helper
        .scroll_to_element("#footer")
        .await
        .expect("Failed to scroll");

    let scroll_y: f64 = page
        .evaluate("window.scrollY")
        .await
        .expect("Failed to read scroll position");
    assert!(scroll_y > 0.0);

    browser.close().await.expect("Failed to close browser");
}

#[tokio::test]
#[ignore = "requires Chrome"]
async fn test_frame_scope() {
    if !chrome_available() {
        eprintln!("Chrome not found, skipping test");
        return;
    }

    let browser = Browser::launch().await.expect("Failed to launch browser");
    let page = browser
        .new_page("about:blank")
        .await
        .expect("Failed to create page");
    page.goto(
        r#"data:text/html,<iframe id="inner" srcdoc="<input id='q'><p id='out'>framed</p>"></iframe>"#,
    )
    .await
    .expect("Failed to navigate");
    page.wait(300).await;

    let helper = InteractionHelper::new(&page, HelperConfig::with_timeout_ms(2_000));
    let framed = helper.within(Scope::frame("#inner"));

    framed
        .send_keys("#q", "inside", false)
        .await
        .expect("Failed to type in frame");
    let text = framed
        .get_element_text("#out", None)
        .await
        .expect("Failed to read in frame");
    assert_eq!(text, "framed");

    browser.close().await.expect("Failed to close browser");
}
