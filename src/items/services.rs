use serde::Serialize;
use tracing::{info, instrument, warn};

use super::dto::FormSnapshot;
use super::photos::{upload_photo, PhotoFile};
use super::repo::ItemStore;
use super::repo_types::{Item, ItemStatus, NewItem};
use crate::error::{AppError, AppResult};
use crate::storage::StorageClient;

pub const UPLOAD_FAILED_MESSAGE: &str = "error uploading photo";
pub const POSTED_MESSAGE: &str = "Item posted successfully!";

/// A photo is a file, a typed URL, or nothing; never both.
#[derive(Debug, Clone)]
pub enum PhotoInput {
    None,
    File(PhotoFile),
    Url(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionState {
    Idle,
    Submitting,
    Success,
    Failed,
}

/// The posting form and its submission lifecycle.
///
/// `Idle -> Submitting -> Success | Failed`, back to `Idle` on the next edit.
/// There is no idempotency key: submitting the same content twice stores two items.
#[derive(Debug)]
pub struct PostForm {
    title: String,
    description: String,
    status: ItemStatus,
    photo: PhotoInput,
    posted_by: String,
    state: SubmissionState,
    message: Option<String>,
}

impl PostForm {
    pub fn new(posted_by: impl Into<String>) -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            status: ItemStatus::Lost,
            photo: PhotoInput::None,
            posted_by: posted_by.into(),
            state: SubmissionState::Idle,
            message: None,
        }
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.touch();
        self.title = title.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.touch();
        self.description = description.into();
    }

    pub fn set_status(&mut self, status: ItemStatus) {
        self.touch();
        self.status = status;
    }

    /// Replaces any typed URL.
    pub fn select_file(&mut self, file: PhotoFile) {
        self.touch();
        self.photo = PhotoInput::File(file);
    }

    /// Replaces any selected file. A blank URL means no photo.
    pub fn type_photo_url(&mut self, url: impl Into<String>) {
        self.touch();
        let url = url.into();
        self.photo = if url.trim().is_empty() {
            PhotoInput::None
        } else {
            PhotoInput::Url(url)
        };
    }

    pub fn state(&self) -> SubmissionState {
        self.state
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    #[cfg(test)]
    pub fn photo(&self) -> &PhotoInput {
        &self.photo
    }

    pub fn snapshot(&self) -> FormSnapshot {
        FormSnapshot {
            state: self.state,
            title: self.title.clone(),
            description: self.description.clone(),
            status: self.status,
            posted_by: self.posted_by.clone(),
            has_photo: !matches!(self.photo, PhotoInput::None),
        }
    }

    fn touch(&mut self) {
        if matches!(self.state, SubmissionState::Success | SubmissionState::Failed) {
            self.state = SubmissionState::Idle;
        }
    }

    /// Uploads the photo if a file is selected, then inserts the item.
    ///
    /// A failed upload aborts before anything is inserted. On success title,
    /// description and photo are cleared; status and poster are kept.
    #[instrument(skip_all, fields(status = %self.status, posted_by = %self.posted_by))]
    pub async fn submit(
        &mut self,
        store: &dyn ItemStore,
        storage: &dyn StorageClient,
    ) -> AppResult<Item> {
        if self.state == SubmissionState::Submitting {
            return Err(AppError::Validation("a submission is already in progress".into()));
        }
        self.state = SubmissionState::Submitting;
        self.message = None;

        match self.persist(store, storage).await {
            Ok(item) => {
                info!(item_id = %item.id, "item posted");
                self.state = SubmissionState::Success;
                self.message = Some(POSTED_MESSAGE.into());
                self.title.clear();
                self.description.clear();
                self.photo = PhotoInput::None;
                Ok(item)
            }
            Err(e) => {
                warn!(error = %e, "item submission failed");
                self.state = SubmissionState::Failed;
                self.message = Some(e.to_string());
                Err(e)
            }
        }
    }

    async fn persist(&self, store: &dyn ItemStore, storage: &dyn StorageClient) -> AppResult<Item> {
        let mut draft = NewItem {
            title: self.title.clone(),
            description: self.description.clone(),
            status: self.status,
            posted_by: self.posted_by.clone(),
            photo_url: None,
        };
        draft.validate()?;

        draft.photo_url = Some(match &self.photo {
            PhotoInput::File(file) => upload_photo(storage, file)
                .await
                .ok_or_else(|| AppError::Upload(UPLOAD_FAILED_MESSAGE.into()))?,
            PhotoInput::Url(url) => url.clone(),
            PhotoInput::None => String::new(),
        });

        store.insert(draft).await
    }
}
