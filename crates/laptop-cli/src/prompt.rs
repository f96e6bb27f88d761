//! Interactive terminal form.
//!
//! Walks the user through every field of the prediction form:
//! 1. Pick each text field from the values seen in the raw snapshot
//! 2. Enter the numeric fields within their allowed ranges
//! 3. Submit; incomplete forms are rejected before any prediction
//! 4. Show the quoted price, then offer another round

use crate::currency::PriceQuote;
use crate::form::{FormOptions, PredictionForm, numeric_range};
use dialoguer::{Confirm, Input, Select};
use laptop_learning::PredictionService;
use laptop_processing::FEATURE_COLUMNS;
use tracing::{info, warn};

const SKIP_CHOICE: &str = "(leave empty)";

/// Prompt for every field once.
pub fn fill_form(options: &FormOptions) -> dialoguer::Result<PredictionForm> {
    let mut form = PredictionForm::default();

    for column in FEATURE_COLUMNS {
        if let Some(range) = numeric_range(column) {
            let value: f64 = Input::new()
                .with_prompt(format!("{column} ({} - {})", range.min, range.max))
                .default(0.0)
                .validate_with(|v: &f64| -> Result<(), String> {
                    if range.contains(*v) {
                        Ok(())
                    } else {
                        Err(format!("enter a value between {} and {}", range.min, range.max))
                    }
                })
                .interact_text()?;
            form.set_number(column, value);
            continue;
        }

        let mut items = vec![SKIP_CHOICE];
        items.extend(options.choices(column).iter().map(String::as_str));
        let selection = Select::new()
            .with_prompt(column)
            .items(&items)
            .default(0)
            .interact()?;
        if selection > 0 {
            form.set_text(column, items[selection].to_string());
        }
    }

    Ok(form)
}

/// Run prediction rounds until the user stops.
///
/// Each submit is one synchronous request to the service.
pub fn run_session(options: &FormOptions, service: &PredictionService) -> dialoguer::Result<()> {
    println!("\n  Laptop Price Prediction\n");

    loop {
        let form = fill_form(options)?;
        match form.submit() {
            Ok(record) => match service.predict(&record) {
                Some(price) => {
                    info!("Predicted {:.2} EUR for {} {}", price, record.company, record.product);
                    println!("\n{}\n", PriceQuote::from_base(price));
                }
                None => println!("\n  Prediction unavailable, see the log for details.\n"),
            },
            Err(e) => {
                warn!("Form rejected: {}", e);
                println!("\n  {e}\n");
            }
        }

        let again = Confirm::new()
            .with_prompt("Predict another laptop?")
            .default(false)
            .interact()?;
        if !again {
            return Ok(());
        }
    }
}
