//! Static fallback payloads served when the model is unavailable or returns
//! unusable output. The catalog is an injected dataset so tests and
//! deployments can substitute alternate fixtures.

use crate::shared::TestCase;
use serde::{Deserialize, Serialize};

const BUILTIN_SCRIPT: &str = r#"
from selenium import webdriver
from selenium.webdriver.common.by import By
from selenium.webdriver.support.ui import WebDriverWait
from selenium.webdriver.support import expected_conditions as EC
import time

# Initialize Driver
driver = webdriver.Chrome()
driver.maximize_window()

try:
    # 1. Load the Page (Replace with local path if needed)
    driver.get("file:///D:/project_assets/checkout.html")

    # 2. Test Case: Verify Discount Code SAVE15
    print("Executing TC-001: Verifying Discount Code...")

    # Add Item
    driver.find_element(By.CSS_SELECTOR, ".add-cart-btn").click()

    # Enter Code
    promo_input = driver.find_element(By.ID, "promo-code")
    promo_input.clear()
    promo_input.send_keys("SAVE15")

    # Click Apply
    driver.find_element(By.ID, "apply-promo-btn").click()
    time.sleep(1) # Wait for JS

    # Assert Price
    total_price = driver.find_element(By.ID, "total-price").text
    assert total_price == "42.50", f"Expected 42.50, but got {total_price}"
    print("TC-001 Passed: Discount applied correctly.")

    # 3. Complete Purchase
    driver.find_element(By.ID, "full-name").send_keys("Harbor Candidate")
    driver.find_element(By.ID, "email-addr").send_keys("candidate@harborqa.dev")
    driver.find_element(By.ID, "pay-now-btn").click()

    print("Full Flow Executed.")

except Exception as e:
    print(f"Test Failed: {e}")

finally:
    time.sleep(5)
    driver.quit()
"#;

/// Fixed replacement payloads for both generation paths. A response built
/// from this catalog is always complete: either the whole test-case list or
/// the whole script, never a hybrid with live output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackCatalog {
    pub test_cases: Vec<TestCase>,
    pub script: String,
}

impl FallbackCatalog {
    /// The built-in three-record dataset and automation-script template.
    pub fn builtin() -> Self {
        Self {
            test_cases: vec![
                TestCase {
                    id: "TC-001".to_string(),
                    title: "Verify Discount Code SAVE15".to_string(),
                    description: "Ensure the 15% discount is applied correctly to the total."
                        .to_string(),
                    steps: vec![
                        "Add item to cart".to_string(),
                        "Enter 'SAVE15' in promo field".to_string(),
                        "Click Apply".to_string(),
                    ],
                    expected_result: "Total price updates from $50.00 to $42.50".to_string(),
                },
                TestCase {
                    id: "TC-002".to_string(),
                    title: "Verify Invalid Code".to_string(),
                    description: "Ensure system rejects non-existent codes.".to_string(),
                    steps: vec![
                        "Enter 'INVALID99'".to_string(),
                        "Click Apply".to_string(),
                    ],
                    expected_result: "Error message 'Invalid Code' is displayed in red".to_string(),
                },
                TestCase {
                    id: "TC-003".to_string(),
                    title: "Verify Payment Flow".to_string(),
                    description: "Ensure 'Pay Now' works with valid data.".to_string(),
                    steps: vec![
                        "Fill Name/Email".to_string(),
                        "Select Standard Shipping".to_string(),
                        "Click Pay Now".to_string(),
                    ],
                    expected_result: "Success message 'Payment Successful!' displayed".to_string(),
                },
            ],
            script: BUILTIN_SCRIPT.trim_start().to_string(),
        }
    }

    /// Loads an alternate catalog from JSON, for tests and
    /// configuration-supplied fixtures.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
