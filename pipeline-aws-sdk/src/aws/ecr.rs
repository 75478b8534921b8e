//! Amazon ECR client wrapper: listing and deleting images, registry login.

use async_trait::async_trait;
use aws_sdk_ecr::error::DisplayErrorContext;
use aws_sdk_ecr::types::{ImageIdentifier as ApiImageIdentifier, ListImagesFilter, TagStatus};
use aws_sdk_ecr::Client as EcrApi;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use pipeline_aws_core::{collect_all, ImageIdentifier, Page, PageFetcher, StepError, StepResult};
use serde::Serialize;

/// BatchDeleteImage accepts at most this many image ids per call.
const MAX_IMAGES_PER_DELETE: usize = 100;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListImagesConfig {
    pub repository_name: String,
    pub registry_id: Option<String>,
    /// `TAGGED`, `UNTAGGED` or `ANY`.
    pub tag_status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteImagesConfig {
    pub repository_name: String,
    pub registry_id: Option<String>,
    pub image_ids: Vec<ImageIdentifier>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageDeleteFailure {
    pub image: Option<ImageIdentifier>,
    pub code: Option<String>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeleteImagesReport {
    pub deleted: Vec<ImageIdentifier>,
    pub failures: Vec<ImageDeleteFailure>,
}

/// Registry credentials obtained from `GetAuthorizationToken`.
#[derive(Clone, PartialEq, Eq)]
pub struct EcrLogin {
    pub username: String,
    pub password: String,
    pub endpoint: String,
}

impl EcrLogin {
    pub fn docker_login_command(&self) -> String {
        format!(
            "docker login -u {} -p {} {}",
            self.username, self.password, self.endpoint
        )
    }
}

impl std::fmt::Debug for EcrLogin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EcrLogin")
            .field("username", &self.username)
            .field("password", &"** redacted **")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

/// Split a base64 `user:password` authorization token.
pub fn decode_authorization_token(token: &str) -> StepResult<(String, String)> {
    let decoded = STANDARD
        .decode(token)
        .map_err(|e| StepError::api(format!("ECR authorization token is not base64: {e}")))?;
    let decoded = String::from_utf8(decoded)
        .map_err(|e| StepError::api(format!("ECR authorization token is not UTF-8: {e}")))?;
    decoded
        .split_once(':')
        .map(|(user, password)| (user.to_string(), password.to_string()))
        .ok_or_else(|| StepError::api("ECR authorization token has no ':' separator"))
}

fn from_api(id: &ApiImageIdentifier) -> ImageIdentifier {
    ImageIdentifier {
        digest: id.image_digest().map(str::to_string),
        tag: id.image_tag().map(str::to_string),
    }
}

fn to_api(id: &ImageIdentifier) -> ApiImageIdentifier {
    ApiImageIdentifier::builder()
        .set_image_digest(id.digest.clone())
        .set_image_tag(id.tag.clone())
        .build()
}

/// One `ListImages` call per page.
pub struct EcrImagePages {
    client: EcrApi,
    config: ListImagesConfig,
}

impl EcrImagePages {
    pub fn new(client: EcrApi, config: ListImagesConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl PageFetcher<ImageIdentifier> for EcrImagePages {
    async fn fetch_page(&self, token: Option<String>) -> StepResult<Page<ImageIdentifier>> {
        let filter = self
            .config
            .tag_status
            .as_deref()
            .map(|status| ListImagesFilter::builder().tag_status(TagStatus::from(status)).build());

        let response = self
            .client
            .list_images()
            .repository_name(&self.config.repository_name)
            .set_registry_id(self.config.registry_id.clone())
            .set_filter(filter)
            .set_next_token(token)
            .send()
            .await
            .map_err(|e| {
                StepError::api(format!(
                    "ECR ListImages failed for repository '{}': {}",
                    self.config.repository_name,
                    DisplayErrorContext(&e)
                ))
            })?;

        Ok(Page::new(
            response.image_ids().iter().map(from_api).collect(),
            response.next_token().map(str::to_string),
        ))
    }
}

pub struct EcrClient {
    client: EcrApi,
}

impl EcrClient {
    pub fn new(client: EcrApi) -> Self {
        Self { client }
    }

    /// List every image in a repository, following `nextToken` until the last page.
    ///
    /// # Arguments
    ///
    /// * `config` - repository, optional registry id and tag status filter
    pub async fn list_images(&self, config: &ListImagesConfig) -> StepResult<Vec<ImageIdentifier>> {
        let pages = EcrImagePages::new(self.client.clone(), config.clone());
        collect_all(&pages).await
    }

    /// Delete images in batches. Per-image failures are reported, not raised.
    pub async fn delete_images(&self, config: &DeleteImagesConfig) -> StepResult<DeleteImagesReport> {
        let mut report = DeleteImagesReport::default();
        for batch in config.image_ids.chunks(MAX_IMAGES_PER_DELETE) {
            let response = self
                .client
                .batch_delete_image()
                .repository_name(&config.repository_name)
                .set_registry_id(config.registry_id.clone())
                .set_image_ids(Some(batch.iter().map(to_api).collect()))
                .send()
                .await
                .map_err(|e| {
                    StepError::api(format!(
                        "ECR BatchDeleteImage failed for repository '{}': {}",
                        config.repository_name,
                        DisplayErrorContext(&e)
                    ))
                })?;

            report
                .deleted
                .extend(response.image_ids().iter().map(from_api));
            for failure in response.failures() {
                log::warn!(
                    "Could not delete image {:?}: {}",
                    failure.image_id(),
                    failure.failure_reason().unwrap_or("unknown reason")
                );
                report.failures.push(ImageDeleteFailure {
                    image: failure.image_id().map(from_api),
                    code: failure.failure_code().map(|code| code.as_str().to_string()),
                    reason: failure.failure_reason().map(str::to_string),
                });
            }
        }
        Ok(report)
    }

    /// Fetch registry credentials for the default registry, or the given ones.
    pub async fn login(&self, registry_ids: Vec<String>) -> StepResult<EcrLogin> {
        let registry_ids = (!registry_ids.is_empty()).then_some(registry_ids);
        let response = self
            .client
            .get_authorization_token()
            .set_registry_ids(registry_ids)
            .send()
            .await
            .map_err(|e| {
                StepError::api(format!(
                    "ECR GetAuthorizationToken failed: {}",
                    DisplayErrorContext(&e)
                ))
            })?;

        let data = response
            .authorization_data()
            .first()
            .ok_or_else(|| StepError::api("ECR GetAuthorizationToken returned no authorization data"))?;
        let token = data
            .authorization_token()
            .ok_or_else(|| StepError::api("ECR authorization data has no token"))?;
        let endpoint = data
            .proxy_endpoint()
            .ok_or_else(|| StepError::api("ECR authorization data has no proxy endpoint"))?;

        let (username, password) = decode_authorization_token(token)?;
        Ok(EcrLogin {
            username,
            password,
            endpoint: endpoint.to_string(),
        })
    }
}
