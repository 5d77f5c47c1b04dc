use super::BasePage;
use crate::{Error, Result};
use pagewright::{Driver, Page, Sensitivity};
use tracing::info;

const FULL_NAME_INPUT: &str = "//input[@id='userName']";
const EMAIL_INPUT: &str = "//input[@id='userEmail']";
const CURRENT_ADDRESS_INPUT: &str = "//textarea[@id='currentAddress']";
const PERMANENT_ADDRESS_INPUT: &str = "//textarea[@id='permanentAddress']";
const SUBMIT_BUTTON: &str = "//button[@id='submit']";

const NAME_RECEIPT: &str = "//p[@id='name']";
const EMAIL_RECEIPT: &str = "//p[@id='email']";
const CURRENT_ADDRESS_RECEIPT: &str = "//p[@id='currentAddress']";
const PERMANENT_ADDRESS_RECEIPT: &str = "//p[@id='permanentAddress']";

/// Values typed into the text-box form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormEntry {
    pub full_name: String,
    pub email: String,
    pub current_address: String,
    pub permanent_address: String,
}

/// The demoqa text-box form and the receipt it renders on submit.
#[derive(Debug, Clone)]
pub struct TextBoxPage<'p, D: Driver = Page> {
    base: BasePage<'p, D>,
}

impl<'p, D: Driver> TextBoxPage<'p, D> {
    pub fn new(base: BasePage<'p, D>) -> Self {
        Self { base }
    }

    /// Open the form at `url`, fill all four fields and submit.
    pub async fn fill_in_text_box(&self, url: &str, entry: &FormEntry) -> Result<()> {
        let helper = self.base.helper();
        helper.navigate_to(url).await?;
        helper
            .send_keys(FULL_NAME_INPUT, &entry.full_name, Sensitivity::Plain)
            .await?;
        helper
            .send_keys(EMAIL_INPUT, &entry.email, Sensitivity::Plain)
            .await?;
        helper
            .send_keys(CURRENT_ADDRESS_INPUT, &entry.current_address, Sensitivity::Plain)
            .await?;
        helper
            .send_keys(
                PERMANENT_ADDRESS_INPUT,
                &entry.permanent_address,
                Sensitivity::Plain,
            )
            .await?;
        helper.click_element(SUBMIT_BUTTON).await?;
        info!("Submitted text box form for {}", entry.full_name);
        Ok(())
    }

    /// Check that each receipt line shows the value that was submitted.
    pub async fn validate_fill_in_text_box(&self, entry: &FormEntry) -> Result<()> {
        let helper = self.base.helper();
        let receipts = [
            (NAME_RECEIPT, &entry.full_name),
            (EMAIL_RECEIPT, &entry.email),
            (CURRENT_ADDRESS_RECEIPT, &entry.current_address),
            (PERMANENT_ADDRESS_RECEIPT, &entry.permanent_address),
        ];
        for (receipt, expected) in receipts {
            let text = helper.get_element_text(receipt, None).await?;
            verify_the_value(&text, expected)?;
        }
        Ok(())
    }
}

/// Compare the part of a receipt line after its first `:` with `expected`.
///
/// Trailing whitespace is ignored. A line with no colon is compared whole.
pub fn verify_the_value(actual_text: &str, expected: &str) -> Result<()> {
    let value = actual_text
        .split_once(':')
        .map_or(actual_text, |(_, value)| value)
        .trim_end();
    if value == expected {
        Ok(())
    } else {
        Err(Error::AssertionFailed(format!(
            "expected {:?}, received {:?}",
            expected, value
        )))
    }
}
