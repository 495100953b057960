use serde::{Deserialize, Serialize};
use url::Url;
use warden_core::{AppError, AppResult, NonEmptyString};

use crate::identifier::uuid_identifier;

uuid_identifier!(
    /// Unique identifier for a registered application.
    ApplicationId
);

/// Client application that owns a set of roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    id: ApplicationId,
    url: Url,
    name: NonEmptyString,
    description: Option<String>,
    is_active: bool,
}

impl Application {
    /// Creates a validated, active application definition.
    pub fn new(
        url: &str,
        name: impl Into<String>,
        description: Option<String>,
    ) -> AppResult<Self> {
        let url = Url::parse(url.trim())
            .map_err(|error| AppError::Validation(format!("invalid application url: {error}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(AppError::Validation(format!(
                "application url must use http or https, got '{}'",
                url.scheme()
            )));
        }

        let description = description.and_then(|value| {
            let trimmed = value.trim().to_owned();
            (!trimmed.is_empty()).then_some(trimmed)
        });

        Ok(Self {
            id: ApplicationId::new(),
            url,
            name: NonEmptyString::new(name)?,
            description,
            is_active: true,
        })
    }

    /// Returns the application identifier.
    #[must_use]
    pub fn id(&self) -> ApplicationId {
        self.id
    }

    /// Returns the application base URL.
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &NonEmptyString {
        &self.name
    }

    /// Returns an optional description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns whether the application is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Sets the activation flag. Returns `true` when the value changed.
    pub fn set_active(&mut self, is_active: bool) -> bool {
        let changed = self.is_active != is_active;
        self.is_active = is_active;
        changed
    }
}
