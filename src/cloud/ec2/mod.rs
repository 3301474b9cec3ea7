//! EC2 Query API client (`DescribeInstances`, `StartInstances`, `StopInstances`).

mod credentials;
mod sigv4;
mod xml;

pub use credentials::Credentials;

use super::traits::CloudControl;
use crate::config::Ec2Config;
use crate::error::CloudError;
use crate::instances::InstanceState;
use anyhow::{Context, Result};
use chrono::Utc;
use reqwest::Client;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use url::Url;

const API_VERSION: &str = "2016-11-15";
const SERVICE: &str = "ec2";

pub struct Ec2Client {
    client: Client,
    endpoint: Url,
    region: String,
    credentials: Credentials,
}

impl Ec2Client {
    pub fn from_config(config: &Ec2Config) -> Result<Self> {
        let credentials = Credentials::resolve(config)?;
        Self::new(
            &config.endpoint_url(),
            &config.region,
            credentials,
            config.request_timeout(),
        )
    }

    pub fn new(
        endpoint: &str,
        region: &str,
        credentials: Credentials,
        timeout: Duration,
    ) -> Result<Self> {
        let endpoint =
            Url::parse(endpoint).with_context(|| format!("Invalid EC2 endpoint: {endpoint}"))?;
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .context("Failed to build EC2 HTTP client")?;
        Ok(Self {
            client,
            endpoint,
            region: region.to_string(),
            credentials,
        })
    }

    fn host(&self) -> Result<String> {
        let host = self
            .endpoint
            .host_str()
            .ok_or_else(|| anyhow::anyhow!("EC2 endpoint has no host: {}", self.endpoint))?;
        Ok(match self.endpoint.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        })
    }

    /// Signed single-instance action; returns the response body.
    async fn call(&self, action: &str, instance_id: &str) -> Result<String> {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("Action", action)
            .append_pair("Version", API_VERSION)
            .append_pair("InstanceId.1", instance_id)
            .finish();

        let host = self.host()?;
        let signed = sigv4::sign(
            &self.credentials,
            &sigv4::RequestToSign {
                host: &host,
                region: &self.region,
                service: SERVICE,
                body: &body,
                at: Utc::now(),
            },
        )?;

        let mut request = self
            .client
            .post(self.endpoint.clone())
            .header("content-type", sigv4::FORM_CONTENT_TYPE)
            .header("x-amz-date", &signed.amz_date)
            .header("authorization", &signed.authorization);
        if let Some(token) = signed.security_token.as_deref() {
            request = request.header("x-amz-security-token", token);
        }

        let response = request
            .body(body)
            .send()
            .await
            .with_context(|| format!("{action} request for {instance_id} failed"))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .with_context(|| format!("{action} response for {instance_id} unreadable"))?;

        if !status.is_success() {
            let (code, message) = xml::parse_error(&text)
                .unwrap_or_else(|| (status.as_u16().to_string(), truncate(&text, 200)));
            return Err(CloudError::Api {
                action: action.to_string(),
                code,
                message,
            }
            .into());
        }

        tracing::debug!(%action, %instance_id, "EC2 call succeeded");
        Ok(text)
    }
}

impl CloudControl for Ec2Client {
    fn name(&self) -> &str {
        "ec2"
    }

    fn describe_state<'a>(
        &'a self,
        instance_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<InstanceState>> + Send + 'a>> {
        Box::pin(async move {
            let body = self.call("DescribeInstances", instance_id).await?;
            Ok(xml::parse_instance_state(&body, instance_id)?)
        })
    }

    fn start<'a>(
        &'a self,
        instance_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            self.call("StartInstances", instance_id).await?;
            Ok(())
        })
    }

    fn stop<'a>(
        &'a self,
        instance_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            self.call("StopInstances", instance_id).await?;
            Ok(())
        })
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
