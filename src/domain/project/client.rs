//! Projects sub-client — tab listings and floor-price lookup.

use crate::client::MarketClient;
use crate::domain::project::Project;
use crate::error::{HttpError, SdkError};
use crate::shared::{ProjectId, TabId};

/// Sub-client for project operations.
pub struct Projects<'a> {
    pub(crate) client: &'a MarketClient,
}

impl<'a> Projects<'a> {
    /// List every project on a catalog tab.
    pub async fn tab_items(&self, tab_id: &TabId) -> Result<Vec<Project>, SdkError> {
        let resp = self.client.http.get_tab_items(tab_id).await?;
        Ok(resp.data.projects.into_iter().map(Project::from).collect())
    }

    /// Get one project from a tab by id.
    ///
    /// The backend has no per-project endpoint; this fetches the tab and
    /// linear-scans the listing. A well-formed response without the requested
    /// id is `HttpError::NotFound`.
    pub async fn find(&self, tab_id: &TabId, project_id: &ProjectId) -> Result<Project, SdkError> {
        let resp = self.client.http.get_tab_items(tab_id).await?;
        for record in resp.data.projects {
            if record.project_id == *project_id {
                return Ok(record.into());
            }
        }

        Err(SdkError::Http(HttpError::NotFound(format!(
            "Project not found on tab: {}",
            project_id
        ))))
    }
}
