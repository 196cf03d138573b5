use crate::broker::message::LinkEvent;

/// Marker left in `projectID` when an upstream link concatenates parameters,
/// as in `projectID=8609960target=project`.
const CONCATENATION_MARKER: &str = "target=";

/// Identifiers read from a caught link's query string.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct LinkQuery {
    pub org_id: Option<String>,
    pub project_id: Option<String>,
    pub action: Option<String>,
}

/// A link that passed intake and will be published and redirected.
#[derive(Debug, Clone, PartialEq)]
pub struct AcceptedLink {
    pub org_id: Option<String>,
    pub project_id: String,
    pub action: String,
}

impl LinkQuery {
    /// Picks the known keys out of decoded query pairs. The first occurrence wins.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut query = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "orgID" => &mut query.org_id,
                "projectID" => &mut query.project_id,
                "action" => &mut query.action,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        query
    }

    /// Truncates `projectID` at an embedded `target=` marker.
    pub fn repaired(mut self) -> Self {
        if let Some(project_id) = self.project_id.as_mut() {
            if let Some(at) = project_id.find(CONCATENATION_MARKER) {
                project_id.truncate(at);
            }
        }
        self
    }

    /// Accepts the link only for a non-empty `projectID` and the expected action.
    pub fn accept(self, expected_action: &str) -> Option<AcceptedLink> {
        let project_id = self.project_id.filter(|p| !p.is_empty())?;
        let action = self.action.filter(|a| a == expected_action)?;

        Some(AcceptedLink {
            org_id: self.org_id,
            project_id,
            action,
        })
    }
}

impl AcceptedLink {
    /// Where the caller is sent back to: the project's activity page.
    pub fn redirect_url(&self, base: &str) -> String {
        format!(
            "{}/#/project/{}/activity",
            base.trim_end_matches('/'),
            urlencoding::encode(&self.project_id)
        )
    }

    pub fn into_event(self, from_ip: Option<String>, user_agent: Option<String>) -> LinkEvent {
        let mut event = LinkEvent::new(self.project_id, self.action);
        event.org_id = self.org_id;
        event.from_ip = from_ip;
        event.user_agent = user_agent;
        event
    }
}
