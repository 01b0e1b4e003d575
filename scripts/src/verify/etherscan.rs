//! A [`Verifier`] for Etherscan-compatible explorer APIs (Etherscan, BscScan, ...)

use std::time::Duration;

use alloy::primitives::{hex, Address};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::{
    config::ExplorerConfig,
    constants::{
        ALREADY_VERIFIED_MESSAGE, STANDARD_JSON_CODE_FORMAT, VERIFICATION_PASSED,
        VERIFICATION_PENDING,
    },
    errors::ScriptError,
    verify::{VerificationRequest, Verifier},
};

/// Timeout of a single explorer request
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Number of status polls before giving up on a pending verification
const MAX_STATUS_POLLS: usize = 30;

/// The envelope every explorer answer comes in
#[derive(Debug, Deserialize)]
pub struct EtherscanResponse {
    /// `"1"` on success, `"0"` otherwise
    pub status: String,
    /// `"OK"` / `"NOTOK"`
    pub message: String,
    /// Payload, or error text
    pub result: Value,
}

impl EtherscanResponse {
    /// The result as text, whatever its JSON type
    fn result_text(&self) -> String {
        match &self.result {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Where a submitted verification stands
#[derive(Debug, PartialEq, Eq)]
pub enum VerificationStatus {
    /// Still in the explorer's queue
    Pending,
    /// Source matched
    Passed,
    /// Rejected, with the explorer's reason
    Failed(String),
}

/// Verifies contracts through an Etherscan-compatible HTTP API
pub struct EtherscanVerifier {
    /// HTTP client
    client: Client,
    /// Base url of the API
    api_url: String,
    /// API key
    api_key: String,
    /// Interval between two status polls
    poll_interval: Duration,
}

impl EtherscanVerifier {
    /// Builds a verifier for the given explorer, failing when it has no API key
    pub fn new(explorer: &ExplorerConfig, poll_interval: Duration) -> Result<Self, ScriptError> {
        let api_key = explorer.api_key.clone().ok_or_else(|| {
            ScriptError::Verification(format!(
                "no API key configured for the explorer at {}",
                explorer.api_url
            ))
        })?;

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ScriptError::Verification(e.to_string()))?;

        Ok(Self {
            client,
            api_url: explorer.api_url.clone(),
            api_key,
            poll_interval,
        })
    }

    /// Whether the explorer already holds the source of `address`
    async fn is_verified(&self, address: Address) -> Result<bool, ScriptError> {
        let address = format!("{:#x}", address);
        let response = self
            .get(&[
                ("module", "contract"),
                ("action", "getsourcecode"),
                ("address", &address),
            ])
            .await?;

        Ok(source_is_present(&response))
    }

    /// Submits the source, returning the GUID to poll
    async fn submit(&self, request: &VerificationRequest) -> Result<String, ScriptError> {
        let mut form = verification_form(request)?;
        form.push(("apikey", self.api_key.clone()));

        let response = self
            .client
            .post(&self.api_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| ScriptError::Verification(e.to_string()))?;

        let response = parse_response(response).await?;
        interpret_submission(&response)
    }

    /// Fetches the status of a submitted verification
    async fn status(&self, guid: &str) -> Result<VerificationStatus, ScriptError> {
        let response = self
            .get(&[
                ("module", "contract"),
                ("action", "checkverifystatus"),
                ("guid", guid),
            ])
            .await?;

        Ok(interpret_status(&response))
    }

    /// Sends a GET request with the given query and the API key
    async fn get(&self, query: &[(&str, &str)]) -> Result<EtherscanResponse, ScriptError> {
        let response = self
            .client
            .get(&self.api_url)
            .query(query)
            .query(&[("apikey", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| ScriptError::Verification(e.to_string()))?;

        parse_response(response).await
    }
}

#[async_trait]
impl Verifier for EtherscanVerifier {
    async fn verify(&self, request: &VerificationRequest) -> Result<(), ScriptError> {
        if self.is_verified(request.address).await? {
            return Err(ScriptError::Verification(ALREADY_VERIFIED_MESSAGE.to_string()));
        }

        let guid = self.submit(request).await?;
        info!("Submitted source for verification, guid {}", guid);

        for _ in 0..MAX_STATUS_POLLS {
            tokio::time::sleep(self.poll_interval).await;

            match self.status(&guid).await? {
                VerificationStatus::Pending => continue,
                VerificationStatus::Passed => return Ok(()),
                VerificationStatus::Failed(reason) => {
                    return Err(ScriptError::Verification(reason))
                }
            }
        }

        Err(ScriptError::Verification(format!(
            "verification {} still pending after {} polls",
            guid, MAX_STATUS_POLLS
        )))
    }
}

/// Checks the HTTP status and decodes the envelope
async fn parse_response(response: reqwest::Response) -> Result<EtherscanResponse, ScriptError> {
    if !response.status().is_success() {
        return Err(ScriptError::Verification(format!(
            "explorer API request failed: {}",
            response.status()
        )));
    }

    response
        .json::<EtherscanResponse>()
        .await
        .map_err(|e| ScriptError::Verification(e.to_string()))
}

/// The form fields of a `verifysourcecode` submission, API key excluded
pub fn verification_form(
    request: &VerificationRequest,
) -> Result<Vec<(&'static str, String)>, ScriptError> {
    let (Some(compiler_version), Some(input)) =
        (&request.compiler_version, &request.standard_json_input)
    else {
        return Err(ScriptError::Verification(format!(
            "no build info for {}, recompile the contracts to verify them",
            request.contract_name
        )));
    };

    Ok(vec![
        ("module", "contract".to_string()),
        ("action", "verifysourcecode".to_string()),
        ("contractaddress", format!("{:#x}", request.address)),
        ("sourceCode", input.to_string()),
        ("codeformat", STANDARD_JSON_CODE_FORMAT.to_string()),
        ("contractname", request.contract_name.clone()),
        ("compilerversion", format!("v{}", compiler_version)),
        // The misspelling is part of the API
        ("constructorArguements", hex::encode(&request.constructor_args)),
    ])
}

/// The GUID of an accepted submission, or the explorer's reason for refusing it
pub fn interpret_submission(response: &EtherscanResponse) -> Result<String, ScriptError> {
    if response.status == "1" {
        Ok(response.result_text())
    } else {
        Err(ScriptError::Verification(response.result_text()))
    }
}

/// Maps a `checkverifystatus` answer to a status
pub fn interpret_status(response: &EtherscanResponse) -> VerificationStatus {
    match response.result_text().as_str() {
        VERIFICATION_PENDING => VerificationStatus::Pending,
        VERIFICATION_PASSED => VerificationStatus::Passed,
        other => VerificationStatus::Failed(other.to_string()),
    }
}

/// Whether a `getsourcecode` answer carries source code
pub fn source_is_present(response: &EtherscanResponse) -> bool {
    response
        .result
        .as_array()
        .and_then(|entries| entries.first())
        .and_then(|entry| entry.get("SourceCode"))
        .and_then(Value::as_str)
        .is_some_and(|source| !source.is_empty())
}
