use crate::api::AccountApi;
use crate::config::SuiteConfig;
use crate::data;
use crate::pages::{BasePage, FormEntry, TextBoxPage};
use crate::{Error, Result};
use pagewright::Driver;
use tracing::{debug, info};

/// Key of the fixed permanent address in the suite's `data` map.
pub(crate) const PERMANENT_ADDRESS_KEY: &str = "permanent_address";

/// Random form values, with the permanent address taken from the suite data when set.
pub(crate) fn form_entry(config: &SuiteConfig) -> FormEntry {
    let mut rng = rand::thread_rng();
    let permanent_address = match config.data.get(PERMANENT_ADDRESS_KEY) {
        Some(address) => address.clone(),
        None => {
            debug!("no {} in suite data, generating one", PERMANENT_ADDRESS_KEY);
            data::street_address(&mut rng)
        }
    };
    FormEntry {
        full_name: data::full_name(&mut rng),
        email: data::email(&mut rng),
        current_address: data::street_address(&mut rng),
        permanent_address,
    }
}

/// Submit the text-box form and check the receipt.
pub(crate) async fn text_box<D: Driver>(driver: &D, config: &SuiteConfig) -> Result<()> {
    let url = format!("{}/text-box", config.base_url.trim_end_matches('/'));
    let entry = form_entry(config);
    let page = TextBoxPage::new(BasePage::new(driver, config.helper_config()));

    page.fill_in_text_box(&url, &entry).await?;
    page.validate_fill_in_text_box(&entry).await?;
    info!("Receipt matches the submitted form");
    Ok(())
}

/// Create a user, authorize it and read it back.
pub(crate) async fn account(config: &SuiteConfig) -> Result<()> {
    let mut api = AccountApi::new(&config.base_url);
    let user_name = data::username(&mut rand::thread_rng());
    let password = api.password().to_string();

    let created = api.create_user(&user_name, &password).await?;
    info!("User created with ID: {}", created.user_id);

    let token = api.generate_token(&user_name, &password).await?;
    if token.token.is_none() {
        return Err(Error::AssertionFailed(format!(
            "token was not generated: {}",
            token.result
        )));
    }
    info!("Token generated, expires {}", token.expires.as_deref().unwrap_or("never"));

    let fetched = api.get_user(&created.user_id).await?;
    if fetched.username != user_name {
        return Err(Error::AssertionFailed(format!(
            "expected user {:?}, received {:?}",
            user_name, fetched.username
        )));
    }
    info!("User retrieved: {}", fetched.username);
    Ok(())
}
