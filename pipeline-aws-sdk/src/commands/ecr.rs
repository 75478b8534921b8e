//! ECR steps: list and delete images, registry login

use pipeline_aws_core::{ImageIdentifier, StepResult};

use crate::aws::ecr::{DeleteImagesConfig, DeleteImagesReport, EcrClient, EcrLogin, ListImagesConfig};

impl super::service::PipelineStepsService {
    /// List the images of a repository.
    pub async fn list_images(&self, config: &ListImagesConfig) -> StepResult<Vec<ImageIdentifier>> {
        let images = EcrClient::new(self.factory.ecr()).list_images(config).await?;
        log::info!(
            "Found {} images in repository {}",
            images.len(),
            config.repository_name
        );
        Ok(images)
    }

    pub async fn delete_images(&self, config: &DeleteImagesConfig) -> StepResult<DeleteImagesReport> {
        let report = EcrClient::new(self.factory.ecr())
            .delete_images(config)
            .await?;
        log::info!(
            "Deleted {} images from repository {} ({} failures)",
            report.deleted.len(),
            config.repository_name,
            report.failures.len()
        );
        Ok(report)
    }

    pub async fn ecr_login(&self, registry_ids: Vec<String>) -> StepResult<EcrLogin> {
        let login = EcrClient::new(self.factory.ecr()).login(registry_ids).await?;
        log::info!("Obtained ECR credentials for {}", login.endpoint);
        Ok(login)
    }
}
