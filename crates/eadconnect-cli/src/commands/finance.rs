// SPDX-License-Identifier: Apache-2.0

//! Service-portal financial queries (app token).

use anyhow::{Context, Result, bail};
use dialoguer::Confirm;
use eadconnect_core::{AppConfig, DebtsQuery, EducationClient};
use serde_json::Value;
use tracing::{debug, instrument};

use super::types::FinanceResult;
use crate::cli::FinanceCommand;
use crate::session;

/// Registration number from the `my-informations` payload.
fn registration_number(info: &Value) -> Option<String> {
    ["academicRecord", "registrationNumber", "registration"]
        .iter()
        .find_map(|key| {
            info.get(*key)
                .or_else(|| info.get("data").and_then(|d| d.get(*key)))
        })
        .and_then(|value| match value {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
}

async fn debts(client: &EducationClient, status: String) -> Result<Value> {
    let info = client.get_my_info().await?;
    let registration = registration_number(&info);
    debug!(found = registration.is_some(), "Registration number lookup");

    let query = DebtsQuery {
        registration_number: registration,
        status,
        ..DebtsQuery::default()
    };
    client
        .get_debts(&query)
        .await
        .context("Failed to fetch debts")
}

async fn pay(client: &EducationClient, data: &Value) -> Result<Value> {
    let info = client.get_my_info().await?;
    let Some(registration) = registration_number(&info) else {
        bail!("Student record has no registration number");
    };
    client
        .create_payment(&registration, data)
        .await
        .context("Failed to create PIX charge")
}

/// Asks before `finance pay` creates a charge.
///
/// Returns `false` when the user declines. Without a terminal the charge
/// needs `--yes`.
pub fn confirm(command: &FinanceCommand, interactive: bool) -> Result<bool> {
    let FinanceCommand::Pay { yes, .. } = command else {
        return Ok(true);
    };
    if *yes {
        return Ok(true);
    }
    if !interactive {
        bail!("Refusing to create a PIX charge without --yes");
    }
    Confirm::new()
        .with_prompt("Create a PIX charge now?")
        .default(false)
        .interact()
        .context("Failed to read confirmation")
}

/// Runs one finance subcommand.
#[instrument(skip(config))]
pub async fn run(config: &AppConfig, command: FinanceCommand) -> Result<FinanceResult> {
    let client = session::financial_client(config).await?;

    let (title, data) = match command {
        FinanceCommand::Info => ("Student record", client.get_my_info().await?),
        FinanceCommand::Debts { status } => ("Debts", debts(&client, status).await?),
        FinanceCommand::Slip { contract_id } => {
            ("Slip", client.get_contract_slip(contract_id).await?)
        }
        FinanceCommand::Methods => ("Payment methods", client.get_payment_methods().await?),
        FinanceCommand::Settings => ("Payment settings", client.get_payment_settings().await?),
        FinanceCommand::Pay { data, .. } => ("PIX charge", pay(&client, &data).await?),
    };

    Ok(FinanceResult {
        title: title.to_string(),
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_registration_number_top_level_or_nested() {
        assert_eq!(
            registration_number(&json!({"academicRecord": "2024001"})),
            Some("2024001".to_string())
        );
        assert_eq!(
            registration_number(&json!({"data": {"registrationNumber": 42}})),
            Some("42".to_string())
        );
        assert_eq!(registration_number(&json!({"academicRecord": ""})), None);
    }

    #[test]
    fn test_confirm_only_guards_payments() {
        assert!(confirm(&FinanceCommand::Methods, false).unwrap());

        let pay = |yes| FinanceCommand::Pay {
            data: json!({}),
            yes,
        };
        assert!(confirm(&pay(true), false).unwrap());
        assert!(confirm(&pay(false), false).is_err());
    }
}
