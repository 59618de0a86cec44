use taxflow_core::backend::CalculateTaxRequest;
use taxflow_core::error::Result;
use taxflow_core::extraction::TaxRegime;
use taxflow_core::review::ReviewForm;
use taxflow_core::session::{Stage, StageKind};
use taxflow_core::{BackendCall, BackendError, TaxflowError};

use super::{StatusMessage, TaxWorkflow, WorkflowEvent};
use crate::view;

/// Interim status between a persisted review and the tax result.
pub(crate) const REVIEW_SAVED_MESSAGE: &str = "Data submitted successfully! Calculating tax...";

impl TaxWorkflow {
    /// Replaces the text of one review input, addressed by field name.
    pub async fn update_field(&self, name: &str, value: impl Into<String>) -> Result<()> {
        self.edit_form("edit the review form", |form| {
            form.set_value_by_name(name, value)
        })
        .await
    }

    /// Sets the regime control on the review form.
    pub async fn select_regime(&self, regime: TaxRegime) -> Result<()> {
        self.edit_form("select a regime", |form| {
            form.set_regime(regime);
            Ok(())
        })
        .await
    }

    async fn edit_form<F>(&self, action: &'static str, edit: F) -> Result<()>
    where
        F: FnOnce(&mut ReviewForm) -> Result<()>,
    {
        let mut state = self.state.write().await;
        let kind = state.stage_kind();
        let edited = match state.stage_mut() {
            Stage::Reviewing { form } => edit(&mut *form).map(|_| view::render_review(form, false)),
            _ => Err(TaxflowError::invalid_stage(action, kind)),
        };

        match edited {
            Ok(form_view) => {
                drop(state);
                self.publish(vec![WorkflowEvent::ReviewForm(form_view)]).await;
                Ok(())
            }
            Err(err) => self.reject(state, err).await,
        }
    }

    /// Persists the reviewed values, then requests the tax comparison.
    ///
    /// The two calls run strictly in sequence and the second is skipped if
    /// the first fails. Either failure returns the workflow to the editable
    /// form. On success the form is dropped and, when both regimes came
    /// back, the comparison is shown and the chat is opened.
    ///
    /// # Errors
    ///
    /// `NoSession` or `InvalidStage` before any network call, or `Remote`
    /// naming the call that failed. A failed chat bootstrap is reported in
    /// the chat panel and does not fail the submission.
    pub async fn submit_review(&self) -> Result<()> {
        let (session_id, form) = {
            let mut state = self.state.write().await;
            state.clear_status();

            let Some(session_id) = state.session_id().map(str::to_string) else {
                return self.reject(state, TaxflowError::NoSession).await;
            };
            let form = match state.stage() {
                Stage::Reviewing { form } => form.clone(),
                other => {
                    let err = TaxflowError::invalid_stage("submit the review", other.kind());
                    return self.reject(state, err).await;
                }
            };
            state.stage_mut().advance(Stage::Submitting { form: form.clone() })?;
            (session_id, form)
        };
        self.publish(vec![
            WorkflowEvent::Status(None),
            WorkflowEvent::StageChanged(StageKind::Submitting),
            WorkflowEvent::ReviewForm(view::render_review(&form, true)),
        ])
        .await;

        let submission = form.submission();
        tracing::info!(
            "[Review] Submitting {} values for session {}",
            submission.len(),
            session_id
        );
        if let Err(source) = self.backend.submit_review(&session_id, &submission).await {
            return self
                .return_to_review(form, BackendCall::SubmitReview, source)
                .await;
        }

        let saved = StatusMessage::success(REVIEW_SAVED_MESSAGE);
        self.state.write().await.set_status(saved.clone());
        self.publish(vec![WorkflowEvent::Status(Some(saved))]).await;

        let request = CalculateTaxRequest {
            session_id,
            data: submission,
        };
        let computation = match self.backend.calculate_tax(&request).await {
            Ok(computation) => computation,
            Err(source) => {
                return self
                    .return_to_review(form, BackendCall::CalculateTax, source)
                    .await;
            }
        };

        let comparison = {
            let mut state = self.state.write().await;
            state.stage_mut().advance(Stage::Comparing {
                computation: computation.clone(),
            })?;

            let comparison = computation.into_comparison();
            if let Some(comparison) = comparison {
                state.stage_mut().advance(Stage::ChatLoading { comparison })?;
            }
            comparison
        };

        let mut events = vec![WorkflowEvent::ReviewFormHidden];
        match comparison {
            Some(comparison) => {
                tracing::info!("[Review] Tax comparison received");
                events.push(WorkflowEvent::Comparison(view::render_comparison(
                    &comparison,
                )));
                events.push(WorkflowEvent::StageChanged(StageKind::ChatLoading));
            }
            None => {
                tracing::info!("[Review] Tax result lacks a regime; comparison hidden");
                events.push(WorkflowEvent::StageChanged(StageKind::Comparing));
            }
        }
        self.publish(events).await;

        if comparison.is_some() {
            if let Err(err) = self.start_chat().await {
                tracing::debug!("[Review] Chat bootstrap failed: {}", err);
            }
        }
        Ok(())
    }

    /// Puts the form back in front of the user after a failed call.
    async fn return_to_review(
        &self,
        form: ReviewForm,
        call: BackendCall,
        source: BackendError,
    ) -> Result<()> {
        tracing::warn!("[Review] {} failed: {}", call, source);
        let err = TaxflowError::remote(call, source);
        let form_view = view::render_review(&form, false);

        let mut state = self.state.write().await;
        state.stage_mut().advance(Stage::Reviewing { form })?;
        let status = StatusMessage::error(err.to_string());
        state.set_status(status.clone());
        drop(state);

        self.publish(vec![
            WorkflowEvent::StageChanged(StageKind::Reviewing),
            WorkflowEvent::Status(Some(status)),
            WorkflowEvent::ReviewForm(form_view),
        ])
        .await;
        Err(err)
    }
}
