use std::path::Path;

use taxflow_core::backend::UploadDocument;
use taxflow_core::error::Result;
use taxflow_core::review::ReviewForm;
use taxflow_core::session::{Stage, StageKind, WorkflowSession};
use taxflow_core::{BackendCall, TaxflowError};

use super::{StatusMessage, TaxWorkflow, WorkflowEvent};
use crate::view;

impl TaxWorkflow {
    /// Reads a document from disk and uploads it.
    ///
    /// A file that cannot be read is reported on the status line like any
    /// other local validation failure, without touching the backend.
    pub async fn upload_file(&self, path: &Path) -> Result<()> {
        match UploadDocument::from_path(path).await {
            Ok(document) => self.upload(Some(document)).await,
            Err(err) => {
                let mut state = self.state.write().await;
                state.clear_status();
                self.reject(state, TaxflowError::unreadable_document(path, err))
                    .await
            }
        }
    }

    /// Uploads the selected document and opens the review form.
    ///
    /// `None` means no file was selected. On success the returned session
    /// replaces any previous one. On failure the workflow returns to the
    /// stage it was in before the upload and keeps its previous session.
    ///
    /// # Errors
    ///
    /// `NoFileSelected` or `InvalidStage` before any network call, or
    /// `Remote` if the backend rejects the upload.
    pub async fn upload(&self, document: Option<UploadDocument>) -> Result<()> {
        let document = {
            let mut state = self.state.write().await;
            state.clear_status();

            let Some(document) = document else {
                return self.reject(state, TaxflowError::NoFileSelected).await;
            };
            let kind = state.stage_kind();
            if kind.is_busy() {
                return self
                    .reject(state, TaxflowError::invalid_stage("upload a document", kind))
                    .await;
            }
            state.stage_mut().begin_upload()?;
            document
        };
        self.publish(vec![
            WorkflowEvent::Status(None),
            WorkflowEvent::StageChanged(StageKind::Uploading),
        ])
        .await;

        tracing::info!(
            "[Upload] Uploading {} ({} bytes)",
            document.file_name,
            document.bytes.len()
        );
        let outcome = self.backend.upload_document(&document).await;

        let mut state = self.state.write().await;
        match outcome {
            Ok(response) => {
                tracing::info!("[Upload] Session {} created", response.session_id);
                let form = ReviewForm::from_extraction(&response.extracted_data);
                let form_view = view::render_review(&form, false);

                state.install_session(WorkflowSession::new(
                    response.session_id,
                    response.extracted_data,
                ));
                state.stage_mut().advance(Stage::Reviewing { form })?;
                let kind = state.stage_kind();
                drop(state);

                self.publish(vec![
                    WorkflowEvent::StageChanged(kind),
                    WorkflowEvent::ReviewForm(form_view),
                ])
                .await;
                Ok(())
            }
            Err(source) => {
                tracing::warn!("[Upload] Upload of {} failed: {}", document.file_name, source);
                let err = TaxflowError::remote(BackendCall::Upload, source);

                state.stage_mut().abort_upload()?;
                let status = StatusMessage::error(err.to_string());
                state.set_status(status.clone());
                let kind = state.stage_kind();
                drop(state);

                self.publish(vec![
                    WorkflowEvent::StageChanged(kind),
                    WorkflowEvent::Status(Some(status)),
                ])
                .await;
                Err(err)
            }
        }
    }
}
