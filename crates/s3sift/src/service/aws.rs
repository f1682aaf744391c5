//! S3 Select over the AWS SDK.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::operation::select_object_content::SelectObjectContentOutput;
use aws_sdk_s3::primitives::Blob;
use aws_sdk_s3::types::{
    CompressionType, ExpressionType, InputSerialization, JsonInput, JsonOutput, JsonType,
    OutputSerialization, SelectObjectContentEventStream,
};
use s3sift_select::{BoxError, EventStream, SelectEvent};

use super::{InputFormat, OutputFormat, SelectRequest, SelectService};
use crate::config::ClientConfig;
use crate::error::{Error, Result};

/// [`SelectService`] backed by the S3 `SelectObjectContent` API.
#[derive(Debug, Clone)]
pub struct AwsSelectService {
    client: Client,
}

impl AwsSelectService {
    /// Wraps an existing S3 client.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a client from `config`, falling back to the default AWS
    /// provider chain for anything `config` leaves unset.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Client`] if no region is configured anywhere.
    pub async fn from_config(config: &ClientConfig) -> Result<Self> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &config.region {
            loader = loader.region(Region::new(region.clone()));
        }
        if let Some(profile) = &config.profile {
            loader = loader.profile_name(profile);
        }
        if let Some(endpoint_url) = &config.endpoint_url {
            loader = loader.endpoint_url(endpoint_url);
        }
        let shared = loader.load().await;

        let Some(region) = shared.region() else {
            return Err(Error::Client(
                "no AWS region configured; pass --region, set it in the config file, or set AWS_REGION"
                    .to_string(),
            ));
        };
        let force_path_style = config.force_path_style.unwrap_or(false);
        tracing::debug!(
            region = %region,
            endpoint_url = ?config.endpoint_url,
            force_path_style,
            "Created S3 client"
        );

        let s3_config = aws_sdk_s3::config::Builder::from(&shared)
            .force_path_style(force_path_style)
            .build();
        Ok(Self::new(Client::from_conf(s3_config)))
    }
}

#[async_trait]
impl SelectService for AwsSelectService {
    async fn select(&self, request: &SelectRequest) -> Result<Box<dyn EventStream>> {
        let output = self
            .client
            .select_object_content()
            .bucket(&request.locator.bucket)
            .key(&request.locator.key)
            .expression_type(ExpressionType::Sql)
            .expression(request.query.as_str())
            .input_serialization(input_serialization(request.input))
            .output_serialization(output_serialization(request.output))
            .send()
            .await
            .map_err(|e| Error::RequestRejected(DisplayErrorContext(&e).to_string().into()))?;

        Ok(Box::new(AwsEventStream::new(output)))
    }
}

fn input_serialization(format: InputFormat) -> InputSerialization {
    match format {
        InputFormat::JsonLinesGzip => InputSerialization::builder()
            .json(JsonInput::builder().r#type(JsonType::Lines).build())
            .compression_type(CompressionType::Gzip)
            .build(),
    }
}

fn output_serialization(format: OutputFormat) -> OutputSerialization {
    match format {
        OutputFormat::Json => OutputSerialization::builder()
            .json(JsonOutput::builder().build())
            .build(),
    }
}

/// Event stream over a `SelectObjectContent` response.
///
/// Dropping it drops the SDK receiver, which closes the connection.
struct AwsEventStream {
    output: SelectObjectContentOutput,
    terminal_error: Option<BoxError>,
    finished: bool,
}

impl AwsEventStream {
    fn new(output: SelectObjectContentOutput) -> Self {
        Self {
            output,
            terminal_error: None,
            finished: false,
        }
    }
}

#[async_trait]
impl EventStream for AwsEventStream {
    async fn next_event(&mut self) -> Option<SelectEvent> {
        while !self.finished {
            match self.output.payload.recv().await {
                Ok(Some(event)) => {
                    if let Some(event) = map_event(event) {
                        return Some(event);
                    }
                }
                Ok(None) => self.finished = true,
                Err(e) => {
                    self.terminal_error = Some(DisplayErrorContext(&e).to_string().into());
                    self.finished = true;
                }
            }
        }
        None
    }

    fn take_error(&mut self) -> Option<BoxError> {
        self.terminal_error.take()
    }
}

fn map_event(event: SelectObjectContentEventStream) -> Option<SelectEvent> {
    match event {
        SelectObjectContentEventStream::Records(records) => Some(SelectEvent::Records(
            records.payload.map(Blob::into_inner).unwrap_or_default(),
        )),
        SelectObjectContentEventStream::Stats(stats) => {
            let details = stats.details();
            Some(SelectEvent::Stats {
                bytes_scanned: details.and_then(|d| d.bytes_scanned()).unwrap_or_default(),
                bytes_processed: details.and_then(|d| d.bytes_processed()).unwrap_or_default(),
                bytes_returned: details.and_then(|d| d.bytes_returned()).unwrap_or_default(),
            })
        }
        SelectObjectContentEventStream::Progress(progress) => {
            let details = progress.details();
            Some(SelectEvent::Progress {
                bytes_scanned: details.and_then(|d| d.bytes_scanned()).unwrap_or_default(),
                bytes_processed: details.and_then(|d| d.bytes_processed()).unwrap_or_default(),
                bytes_returned: details.and_then(|d| d.bytes_returned()).unwrap_or_default(),
            })
        }
        SelectObjectContentEventStream::Cont(_) => Some(SelectEvent::Continuation),
        SelectObjectContentEventStream::End(_) => Some(SelectEvent::End),
        other => {
            tracing::trace!(event = ?other, "Skipping unrecognised select event");
            None
        }
    }
}
